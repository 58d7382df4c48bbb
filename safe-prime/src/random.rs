//! Candidate sampling from a cryptographically secure random source
//!
//! Every function here pulls its bytes through [`RngCore::try_fill_bytes`],
//! so a failing source surfaces as [`SafePrimeError::EntropyUnavailable`]
//! instead of a panic or a silently weakened value.

use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};

use crate::error::{Result, SafePrimeError};

/// Draw a uniformly random integer below `2^bits`.
fn uniform_bits<R: RngCore + CryptoRng + ?Sized>(rng: &mut R, bits: u64) -> Result<BigUint> {
    let byte_len = usize::try_from(bits.div_ceil(8)).map_err(|_| {
        SafePrimeError::InvalidParameter(format!("{} bits do not fit in memory", bits))
    })?;
    let mut buf = vec![0u8; byte_len];
    rng.try_fill_bytes(&mut buf)?;

    let excess = (byte_len as u64) * 8 - bits;
    Ok(BigUint::from_bytes_be(&buf) >> excess)
}

/// Random odd integer with exactly `bits` bits.
///
/// The most significant bit is forced to 1 so the bit length is exact,
/// and the least significant bit is forced to 1 so the value is odd.
/// For `bits == 1` this is always 1.
///
/// # Example
///
/// ```rust
/// use rand::rngs::OsRng;
/// use safe_prime::random::next_bits;
///
/// let n = next_bits(&mut OsRng, 64).unwrap();
/// assert_eq!(n.bits(), 64);
/// assert!(n.bit(0));
/// ```
pub fn next_bits<R: RngCore + CryptoRng + ?Sized>(rng: &mut R, bits: u64) -> Result<BigUint> {
    if bits == 0 {
        return Err(SafePrimeError::InvalidParameter(
            "bit length must be positive".to_string(),
        ));
    }

    let mut n = uniform_bits(rng, bits)?;
    n.set_bit(bits - 1, true);
    n.set_bit(0, true);
    Ok(n)
}

/// Uniform random integer in `[low, high)`, by rejection sampling.
pub fn random_in_range<R: RngCore + CryptoRng + ?Sized>(
    rng: &mut R,
    low: &BigUint,
    high: &BigUint,
) -> Result<BigUint> {
    if low >= high {
        return Err(SafePrimeError::InvalidParameter(format!(
            "empty range [{}, {})",
            low, high
        )));
    }

    let span = high - low;
    let bits = span.bits();
    loop {
        let x = uniform_bits(rng, bits)?;
        if x < span {
            return Ok(low + x);
        }
    }
}
