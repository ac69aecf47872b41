use crate::INVALID_IDX;

const NUM_BYTES: usize = 1 << 8;

/// Maps raw bytes into a dense code space in order of first appearance.
#[derive(Clone)]
pub struct CodeMapper {
    table: [u32; NUM_BYTES],
    inv: [u8; NUM_BYTES],
    alphabet_size: u32,
}

impl Default for CodeMapper {
    fn default() -> Self {
        Self {
            table: [INVALID_IDX; NUM_BYTES],
            inv: [0; NUM_BYTES],
            alphabet_size: 0,
        }
    }
}

impl CodeMapper {
    /// Assigns codes to every byte of `patterns`, scanning them in order.
    pub fn new<I, P>(patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        let mut mapper = Self::default();
        for pattern in patterns {
            for &b in pattern.as_ref() {
                mapper.assign(b);
            }
        }
        mapper
    }

    #[inline(always)]
    fn assign(&mut self, b: u8) {
        if self.table[usize::from(b)] == INVALID_IDX {
            self.table[usize::from(b)] = self.alphabet_size;
            self.inv[self.alphabet_size as usize] = b;
            self.alphabet_size += 1;
        }
    }

    #[inline]
    pub const fn alphabet_size(&self) -> u32 {
        self.alphabet_size
    }

    #[inline(always)]
    pub fn get(&self, b: u8) -> Option<u32> {
        let code = self.table[usize::from(b)];
        if code == INVALID_IDX {
            None
        } else {
            Some(code)
        }
    }

    #[cfg(feature = "pattern-iter")]
    #[inline(always)]
    pub fn get_inv(&self, code: u32) -> u8 {
        debug_assert!(code < self.alphabet_size);
        self.inv[code as usize]
    }
}
