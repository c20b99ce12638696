//! Drawing characters from a charset without modulo bias.

use crate::entropy::{EntropyPool, EntropySource};
use crate::GenerateError;

const U32_RANGE: u64 = 1 << 32;

/// Samples uniformly from character sets using words taken from an [`EntropyPool`].
///
/// A raw 32-bit draw is only reduced modulo the charset size when it falls below the largest
/// multiple of that size that fits in 32 bits; anything above is thrown away and redrawn.
/// Otherwise the low end of a charset whose size doesn't divide 2^32 would come up slightly more
/// often than the rest.
pub struct UnbiasedSampler<'a, E: ?Sized> {
    source: &'a mut E,
    pool: EntropyPool,
}

impl<'a, E> UnbiasedSampler<'a, E>
where
    E: EntropySource + ?Sized,
{
    /// Create a sampler backed by a fresh pool of `pool_len` bytes.
    pub fn new(source: &'a mut E, pool_len: usize) -> Result<Self, GenerateError> {
        let pool = EntropyPool::new(&mut *source, pool_len)?;
        Ok(UnbiasedSampler { source, pool })
    }

    /// Draw one element of `charset`.
    pub fn sample<T: Copy>(&mut self, charset: &[T]) -> Result<T, GenerateError> {
        let limit = acceptance_limit(charset.len())?;
        let size = charset.len() as u64;
        loop {
            let value = u64::from(self.pool.next_u32(&mut *self.source)?);
            if value < limit {
                return Ok(charset[(value % size) as usize]);
            }
        }
    }

    /// Give the entropy source back, discarding the pool.
    pub fn into_source(self) -> &'a mut E {
        self.source
    }
}

/// The number of 32-bit values that can be accepted for a charset of `size` elements.
fn acceptance_limit(size: usize) -> Result<u64, GenerateError> {
    let size_u64 = u64::try_from(size).map_err(|_| GenerateError::InvalidCharset(size))?;
    if size_u64 == 0 || size_u64 > U32_RANGE {
        return Err(GenerateError::InvalidCharset(size));
    }
    Ok(U32_RANGE - U32_RANGE % size_u64)
}
