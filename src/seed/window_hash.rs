//! Rolling window hash over nucleotide sequences.
//!
//! Encoding: A=0, C=1, G=2, T/U=3. The window code is the 2-bit packing of the last
//! `window_size` residues, so windows of up to 32 residues hash without collisions.
//! Any other residue breaks the window; hashing resumes once `window_size` valid
//! residues follow it.

use crate::core::HashingRegion;
use crate::error::ScanError;

/// Largest window representable in a `u64` code.
pub const MAX_WINDOW_SIZE: usize = 32;

/// Lookup table for ASCII to 2-bit encoding (0xFF = invalid/ambiguous)
const ENCODE_LUT: [u8; 256] = {
    let mut lut = [0xFFu8; 256];
    lut[b'A' as usize] = 0;
    lut[b'a' as usize] = 0;
    lut[b'C' as usize] = 1;
    lut[b'c' as usize] = 1;
    lut[b'G' as usize] = 2;
    lut[b'g' as usize] = 2;
    lut[b'T' as usize] = 3;
    lut[b't' as usize] = 3;
    lut[b'U' as usize] = 3;
    lut[b'u' as usize] = 3;
    lut
};

/// Stateful window hash. Not shared between threads: every scanning task gets its
/// own instance from a [`HashFunctionFactory`].
pub trait WindowHashFunction: Send {
    fn window_size(&self) -> usize;

    /// Forget the residues seen so far.
    fn reset(&mut self);

    fn set_region(&mut self, region: HashingRegion);

    fn region(&self) -> HashingRegion;

    /// Push one residue. Returns the hash of the window ending at it, or `None`
    /// while no full valid window is available.
    fn hash_step(&mut self, residue: u8) -> Option<u64>;

    /// Hash of a complete window, independent of the rolling state.
    fn hash_window(&self, window: &[u8]) -> Option<u64>;
}

/// Builds one independent hash function per scanning task.
pub trait HashFunctionFactory: Sync {
    type Function: WindowHashFunction;

    fn build(&self, region: HashingRegion) -> Self::Function;
}

/// 2-bit rolling k-mer code.
#[derive(Debug, Clone)]
pub struct RollingKmerHash {
    window_size: usize,
    mask: u64,
    code: u64,
    valid: usize,
    region: HashingRegion,
}

impl RollingKmerHash {
    pub fn new(window_size: usize) -> Result<Self, ScanError> {
        if window_size == 0 || window_size > MAX_WINDOW_SIZE {
            return Err(ScanError::InvalidConfig(format!(
                "window size must be in 1..={}, got {}",
                MAX_WINDOW_SIZE, window_size
            )));
        }
        let mask = if window_size == MAX_WINDOW_SIZE {
            u64::MAX
        } else {
            (1u64 << (2 * window_size)) - 1
        };
        Ok(Self {
            window_size,
            mask,
            code: 0,
            valid: 0,
            region: HashingRegion::NONE,
        })
    }
}

impl WindowHashFunction for RollingKmerHash {
    fn window_size(&self) -> usize {
        self.window_size
    }

    fn reset(&mut self) {
        self.code = 0;
        self.valid = 0;
    }

    fn set_region(&mut self, region: HashingRegion) {
        self.region = region;
    }

    fn region(&self) -> HashingRegion {
        self.region
    }

    #[inline]
    fn hash_step(&mut self, residue: u8) -> Option<u64> {
        let bits = ENCODE_LUT[residue as usize];
        if bits == 0xFF {
            self.reset();
            return None;
        }
        self.code = ((self.code << 2) | bits as u64) & self.mask;
        if self.valid < self.window_size {
            self.valid += 1;
        }
        (self.valid == self.window_size).then_some(self.code)
    }

    fn hash_window(&self, window: &[u8]) -> Option<u64> {
        if window.len() != self.window_size {
            return None;
        }
        window.iter().try_fold(0u64, |code, &residue| {
            let bits = ENCODE_LUT[residue as usize];
            (bits != 0xFF).then(|| (code << 2) | bits as u64)
        })
    }
}

/// Factory for [`RollingKmerHash`].
#[derive(Debug, Clone)]
pub struct RollingKmerFactory {
    prototype: RollingKmerHash,
}

impl RollingKmerFactory {
    pub fn new(window_size: usize) -> Result<Self, ScanError> {
        Ok(Self {
            prototype: RollingKmerHash::new(window_size)?,
        })
    }

    pub fn window_size(&self) -> usize {
        self.prototype.window_size
    }
}

impl HashFunctionFactory for RollingKmerFactory {
    type Function = RollingKmerHash;

    fn build(&self, region: HashingRegion) -> RollingKmerHash {
        let mut function = self.prototype.clone();
        function.reset();
        function.set_region(region);
        function
    }
}
