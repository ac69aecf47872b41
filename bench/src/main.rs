use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;

use lazyac::{Statistics, Transition};

use clap::Parser;
use rand::seq::SliceRandom;

const TRIALS: usize = 10;
const SAMPLES: usize = 1000;

#[derive(Parser, Debug)]
#[clap(name = "measure", about = "A program to measure the performance.")]
struct Args {
    #[clap(short = 'k', long)]
    keys_filename: String,

    #[clap(short = 't', long)]
    texts_filename: Option<String>,
}

macro_rules! lazyac_common {
    ($pma:ident, $keys:ident, $queries:ident, $texts:ident) => {
        let start = Instant::now();
        let pma = lazyac::$pma::from_patterns(&$keys).unwrap();
        let duration = start.elapsed();
        print_heap_bytes(pma.heap_bytes());
        println!("num_elems: {}", pma.num_elems());
        println!("constr_sec: {:.3}", duration.as_secs_f64());

        {
            // Warmup
            let mut dummy = 0usize;
            for q in &$queries {
                dummy += pma.exact_match(q).unwrap() as usize;
            }
            // Measure
            let start = Instant::now();
            for _ in 0..TRIALS {
                for q in &$queries {
                    dummy += pma.exact_match(q).unwrap() as usize;
                }
            }
            let duration = start.elapsed();
            println!(
                "exact_match: {:.3} [us/query]",
                duration.as_secs_f64() * 1000000. / TRIALS as f64 / SAMPLES as f64
            );
            println!("dummy: {}", dummy);
        }

        if let Some(texts) = $texts.as_ref() {
            // Warmup
            let mut dummy = 0;
            let start = Instant::now();
            for text in texts {
                for m in pma.find_overlapping_iter(text) {
                    dummy += m.end() + m.value() as usize;
                }
            }
            let duration = start.elapsed();
            println!(
                "find_overlapping_cold: {:.3} [us/text]",
                duration.as_secs_f64() * 1000000. / texts.len() as f64
            );
            // Measure
            let start = Instant::now();
            for _ in 0..TRIALS {
                for text in texts {
                    for m in pma.find_overlapping_iter(text) {
                        dummy += m.end() + m.value() as usize;
                    }
                }
            }
            let duration = start.elapsed();
            println!(
                "find_overlapping: {:.3} [us/text]",
                duration.as_secs_f64() * 1000000. / TRIALS as f64 / texts.len() as f64
            );
            println!("dummy: {}", dummy);
        }
        print_heap_bytes(pma.heap_bytes());
        println!("num_resolved: {}", pma.num_resolved());
    };
}

fn main() {
    let args = Args::parse();

    println!("keys_filename: {}", &args.keys_filename);
    let mut keys: Vec<_> = load_file(&args.keys_filename)
        .into_iter()
        .filter(|key| !key.is_empty())
        .collect();
    keys.sort_unstable();
    keys.dedup();
    let queries = random_sample(&keys);
    let texts = if let Some(texts_filename) = args.texts_filename {
        println!("texts_filename: {}", &texts_filename);
        Some(load_file(&texts_filename))
    } else {
        None
    };

    println!("#keys: {}", keys.len());
    {
        println!("[lazyac/automaton]");
        lazyac_common!(Automaton, keys, queries, texts);
    }
    {
        println!("[lazyac/frozen]");
        lazyac_common!(FrozenAutomaton, keys, queries, texts);
    }
    {
        println!("[daachorse]");
        let start = Instant::now();
        let pma = daachorse::DoubleArrayAhoCorasick::new(&keys).unwrap();
        let duration = start.elapsed();
        print_heap_bytes(pma.heap_bytes());
        println!("constr_sec: {:.3}", duration.as_secs_f64());

        if let Some(texts) = texts.as_ref() {
            // Warmup
            let mut dummy = 0;
            for text in texts {
                for m in pma.find_overlapping_iter(text) {
                    dummy += m.end() + m.value() as usize;
                }
            }
            // Measure
            let start = Instant::now();
            for _ in 0..TRIALS {
                for text in texts {
                    for m in pma.find_overlapping_iter(text) {
                        dummy += m.end() + m.value() as usize;
                    }
                }
            }
            let duration = start.elapsed();
            println!(
                "find_overlapping: {:.3} [us/text]",
                duration.as_secs_f64() * 1000000. / TRIALS as f64 / texts.len() as f64
            );
            println!("dummy: {}", dummy);
        }
    }
}

fn print_heap_bytes(bytes: usize) {
    println!(
        "heap_bytes: {} bytes, {:.3} MiB",
        bytes,
        bytes as f64 / (1024.0 * 1024.0)
    );
}

fn load_file<P>(path: P) -> Vec<String>
where
    P: AsRef<Path>,
{
    let file = File::open(path).unwrap();
    let buf = BufReader::new(file);
    buf.lines().map(|line| line.unwrap()).collect()
}

fn random_sample(keys: &[String]) -> Vec<String> {
    let mut rng = rand::thread_rng();
    keys.choose_multiple(&mut rng, SAMPLES).cloned().collect()
}
