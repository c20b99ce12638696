//! Sources of secure random bytes, and the refillable pool the sampler reads from.

use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::GenerateError;

/// A supplier of cryptographically secure random bytes.
///
/// Implemented for every `rand` generator that is marked `CryptoRng`, so `rand::rngs::OsRng` and
/// `rand::thread_rng()` can be handed straight to the generator.
pub trait EntropySource {
    /// Fill `dest` with secure random bytes.
    fn fill_secure(&mut self, dest: &mut [u8]) -> Result<(), GenerateError>;

    /// Return `len` freshly sourced secure random bytes.
    fn secure_bytes(&mut self, len: usize) -> Result<Vec<u8>, GenerateError> {
        let mut bytes = vec![0u8; len];
        self.fill_secure(&mut bytes)?;
        Ok(bytes)
    }
}

impl<R> EntropySource for R
where
    R: RngCore + CryptoRng + ?Sized,
{
    fn fill_secure(&mut self, dest: &mut [u8]) -> Result<(), GenerateError> {
        self.try_fill_bytes(dest).map_err(|err| {
            log::error!("secure random generator failed: {}", err);
            GenerateError::EntropyUnavailable(err)
        })
    }
}

/// A buffer of secure random bytes consumed four at a time, refilled from its source when
/// exhausted.
///
/// A pool belongs to one generation attempt; it is wiped when dropped.
pub struct EntropyPool {
    bytes: Vec<u8>,
    cursor: usize,
}

impl EntropyPool {
    /// Create a pool holding at least `len` bytes, rounded up to a whole number of draws.
    pub fn new<E>(source: &mut E, len: usize) -> Result<EntropyPool, GenerateError>
    where
        E: EntropySource + ?Sized,
    {
        let len = len.max(4).div_ceil(4) * 4;
        Ok(EntropyPool {
            bytes: source.secure_bytes(len)?,
            cursor: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Read the next big-endian `u32`, refilling the pool first if it has been used up.
    pub fn next_u32<E>(&mut self, source: &mut E) -> Result<u32, GenerateError>
    where
        E: EntropySource + ?Sized,
    {
        if self.cursor >= self.bytes.len() {
            self.refill(source)?;
        }
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.bytes[self.cursor..self.cursor + 4]);
        self.cursor += 4;
        Ok(u32::from_be_bytes(word))
    }

    fn refill<E>(&mut self, source: &mut E) -> Result<(), GenerateError>
    where
        E: EntropySource + ?Sized,
    {
        let len = self.bytes.len();
        log::trace!("refilling {}-byte entropy pool", len);
        self.bytes.zeroize();
        self.bytes = source.secure_bytes(len)?;
        self.cursor = 0;
        Ok(())
    }
}

impl Drop for EntropyPool {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// Generators used by the tests in this crate.
#[cfg(test)]
pub(crate) mod test_rng {
    use std::collections::VecDeque;

    use rand::{CryptoRng, RngCore};

    /// Always fails, as if the operating system could not supply randomness.
    pub(crate) struct FailingRng;

    impl RngCore for FailingRng {
        fn next_u32(&mut self) -> u32 {
            panic!("FailingRng only supports try_fill_bytes")
        }

        fn next_u64(&mut self) -> u64 {
            panic!("FailingRng only supports try_fill_bytes")
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {
            panic!("FailingRng only supports try_fill_bytes")
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new("entropy source unavailable"))
        }
    }

    impl CryptoRng for FailingRng {}

    /// Hands out a fixed script of bytes, then fails.
    pub(crate) struct ScriptedRng {
        bytes: VecDeque<u8>,
        pub(crate) requests: Vec<usize>,
    }

    impl ScriptedRng {
        pub(crate) fn new(bytes: &[u8]) -> ScriptedRng {
            ScriptedRng {
                bytes: bytes.iter().copied().collect(),
                requests: Vec::new(),
            }
        }
    }

    impl RngCore for ScriptedRng {
        fn next_u32(&mut self) -> u32 {
            let mut buf = [0u8; 4];
            self.fill_bytes(&mut buf);
            u32::from_le_bytes(buf)
        }

        fn next_u64(&mut self) -> u64 {
            let mut buf = [0u8; 8];
            self.fill_bytes(&mut buf);
            u64::from_le_bytes(buf)
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            self.try_fill_bytes(dest).expect("script exhausted")
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.requests.push(dest.len());
            if self.bytes.len() < dest.len() {
                return Err(rand::Error::new("script exhausted"));
            }
            for b in dest.iter_mut() {
                *b = self.bytes.pop_front().unwrap();
            }
            Ok(())
        }
    }

    impl CryptoRng for ScriptedRng {}
}
