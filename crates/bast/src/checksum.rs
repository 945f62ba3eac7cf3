//! Adler-32 over the payload that follows the header.

const MOD_ADLER: u32 = 65_521;

/// Largest number of bytes that can be summed before `b` may overflow a u32.
const NMAX: usize = 5_552;

/// Streaming Adler-32 hasher.
#[derive(Debug, Clone, Copy)]
pub struct Adler32 {
    a: u32,
    b: u32,
}

impl Adler32 {
    pub fn new() -> Self {
        Self { a: 1, b: 0 }
    }

    pub fn update(&mut self, bytes: &[u8]) {
        for chunk in bytes.chunks(NMAX) {
            for &byte in chunk {
                self.a += u32::from(byte);
                self.b += self.a;
            }
            self.a %= MOD_ADLER;
            self.b %= MOD_ADLER;
        }
    }

    #[must_use]
    pub fn finish(&self) -> u32 {
        (self.b << 16) | self.a
    }
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}

/// Adler-32 of `bytes` in one call.
#[must_use]
pub fn adler32(bytes: &[u8]) -> u32 {
    let mut h = Adler32::new();
    h.update(bytes);
    h.finish()
}
