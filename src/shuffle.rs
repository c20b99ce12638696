//! Fisher-Yates shuffling driven by a secure entropy source.

use crate::entropy::EntropySource;
use crate::GenerateError;

/// Permute `items` in place, uniformly over all permutations.
///
/// Walks from the last index down to 1, swapping each element with one at a uniformly chosen
/// index no greater than its own. If the source fails part way through, the error is returned and
/// `items` is left partially shuffled.
pub fn crypto_shuffle<T, E>(source: &mut E, items: &mut [T]) -> Result<(), GenerateError>
where
    E: EntropySource + ?Sized,
{
    if items.len() <= 1 {
        return Ok(());
    }
    for i in (1..items.len()).rev() {
        let j = uniform_index(source, i as u64 + 1)?;
        items.swap(i, j);
    }
    Ok(())
}

/// Draw an integer uniformly from `0..bound`, rejecting 64-bit draws that would bias the result.
fn uniform_index<E>(source: &mut E, bound: u64) -> Result<usize, GenerateError>
where
    E: EntropySource + ?Sized,
{
    debug_assert!(bound > 0);
    let range = 1u128 << 64;
    let limit = range - range % u128::from(bound);
    let mut word = [0u8; 8];
    loop {
        source.fill_secure(&mut word)?;
        let value = u64::from_be_bytes(word);
        if u128::from(value) < limit {
            // `value % bound` < `bound`, which came from a slice index.
            return Ok((value % bound) as usize);
        }
    }
}
