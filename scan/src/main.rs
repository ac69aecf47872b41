use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use lazyac::{Automaton, Match, Transition};

use clap::Parser;

#[derive(Parser, Debug)]
#[clap(name = "scan", about = "A program to find dictionary patterns in texts.")]
struct Args {
    /// Dictionary file with one pattern per line.
    #[clap(short = 'i', long)]
    dict_path: PathBuf,

    /// Text file scanned line by line.
    #[clap(short = 't', long)]
    text_path: PathBuf,

    /// Reports patterns that are suffixes of other matches too.
    #[clap(short = 'o', long)]
    overlapping: bool,

    /// Resolves the whole transition table before scanning.
    #[clap(short = 'f', long)]
    frozen: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let mut patterns = BufReader::new(File::open(&args.dict_path)?)
        .lines()
        .collect::<Result<Vec<_>, _>>()?;
    patterns.retain(|pattern| !pattern.is_empty());
    let pma = Automaton::from_patterns(&patterns)?;

    let reader = BufReader::new(File::open(&args.text_path)?);
    let stdout = std::io::stdout();
    let mut writer = BufWriter::new(stdout.lock());

    if args.frozen {
        scan(&pma.freeze(), reader, &mut writer, &patterns, args.overlapping)?;
    } else {
        scan(&pma, reader, &mut writer, &patterns, args.overlapping)?;
    }
    writer.flush()?;

    Ok(())
}

fn scan<A, R, W>(
    pma: &A,
    reader: R,
    writer: &mut W,
    patterns: &[String],
    overlapping: bool,
) -> Result<(), Box<dyn Error>>
where
    A: Transition,
    R: BufRead,
    W: Write,
{
    let mut matches: Vec<Match> = vec![];
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        matches.clear();
        if overlapping {
            matches.extend(pma.find_overlapping_iter(&line));
        } else {
            matches.extend(pma.find_iter(&line));
        }
        for m in &matches {
            writeln!(
                writer,
                "{}:{}-{}\t{}",
                line_no + 1,
                m.start(),
                m.end(),
                patterns[m.value() as usize]
            )?;
        }
    }
    Ok(())
}
