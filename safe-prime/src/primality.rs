//! Probabilistic primality testing
//!
//! Candidates go through trial division by the odd primes below 256 first,
//! which settles every `n < 257²` outright and cheaply rejects most large
//! composites. Survivors get `rounds` Miller-Rabin rounds with witnesses
//! drawn uniformly from `[2, n - 2]`.
//!
//! The false-positive probability of Miller-Rabin is at most `4^-rounds`,
//! see [`miller_rabin_error_bound`].

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::error::{Result, SafePrimeError};
use crate::random::random_in_range;

/// Odd primes below 256, used for trial division and the combined sieve.
pub const SMALL_PRIMES: [u32; 53] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

/// Below this bound trial division by [`SMALL_PRIMES`] is a complete test.
const TRIAL_DIVISION_LIMIT: u32 = 257 * 257;

/// Upper bound on the Miller-Rabin false-positive probability for `rounds` rounds.
pub fn miller_rabin_error_bound(rounds: u32) -> f64 {
    0.25f64.powi(i32::try_from(rounds).unwrap_or(i32::MAX))
}

/// True when some listed small prime strictly below `n` divides `n`.
///
/// Used by the search loop to discard candidates before the expensive
/// Miller-Rabin rounds. A small prime itself never counts as having a factor.
pub fn has_small_factor(n: &BigUint) -> bool {
    SMALL_PRIMES
        .iter()
        .any(|&p| (n % p).is_zero() && *n != BigUint::from(p))
}

/// Decide `n` by trial division alone, if possible.
///
/// Expects `n` odd and greater than 3.
fn trial_division(n: &BigUint) -> Option<bool> {
    for &p in SMALL_PRIMES.iter() {
        if (n % p).is_zero() {
            return Some(*n == BigUint::from(p));
        }
    }

    match n.to_u32() {
        Some(small) if small < TRIAL_DIVISION_LIMIT => Some(true),
        _ => None,
    }
}

/// Miller-Rabin with `rounds` random witnesses. Expects `n` odd and `n > 4`.
fn miller_rabin<R: RngCore + CryptoRng + ?Sized>(
    n: &BigUint,
    rounds: u32,
    rng: &mut R,
) -> Result<bool> {
    let two = BigUint::from(2u32);
    let n_minus_1 = n - 1u32;

    // n - 1 = 2^s * d with d odd
    let s = n_minus_1.trailing_zeros().unwrap_or(0);
    let d = &n_minus_1 >> s;

    'witness: for _ in 0..rounds {
        let a = random_in_range(rng, &two, &n_minus_1)?;
        let mut x = a.modpow(&d, n);

        if x.is_one() || x == n_minus_1 {
            continue;
        }

        for _ in 1..s {
            x = (&x * &x) % n;
            if x == n_minus_1 {
                continue 'witness;
            }
            if x.is_one() {
                return Ok(false);
            }
        }

        return Ok(false);
    }

    Ok(true)
}

/// Test `n` for primality with witnesses drawn from `rng`.
///
/// Returns `Ok(false)` for 0, 1 and every even number above 2.
/// `rounds` must be at least 1.
///
/// # Errors
///
/// [`SafePrimeError::InvalidParameter`] for `rounds == 0`,
/// [`SafePrimeError::EntropyUnavailable`] if `rng` fails while picking
/// witnesses.
pub fn is_probably_prime_with_rng<R: RngCore + CryptoRng + ?Sized>(
    n: &BigUint,
    rounds: u32,
    rng: &mut R,
) -> Result<bool> {
    if rounds == 0 {
        return Err(SafePrimeError::InvalidParameter(
            "primality test needs at least one round".to_string(),
        ));
    }

    match n.to_u32() {
        Some(0) | Some(1) => return Ok(false),
        Some(2) | Some(3) => return Ok(true),
        _ => {}
    }
    if n.is_even() {
        return Ok(false);
    }

    if let Some(decided) = trial_division(n) {
        return Ok(decided);
    }

    miller_rabin(n, rounds, rng)
}

/// Test `n` for primality with witnesses from the operating system's
/// entropy source.
///
/// # Example
///
/// ```rust
/// use num_bigint::BigUint;
/// use safe_prime::is_probably_prime;
///
/// assert!(is_probably_prime(&BigUint::from(7919u32), 40).unwrap());
/// assert!(!is_probably_prime(&BigUint::from(221u32), 40).unwrap());
/// ```
pub fn is_probably_prime(n: &BigUint, rounds: u32) -> Result<bool> {
    is_probably_prime_with_rng(n, rounds, &mut OsRng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::tests::FailingRng;
    use num_traits::Num;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn big(v: u64) -> BigUint {
        BigUint::from(v)
    }

    fn naive_is_prime(n: u64) -> bool {
        if n < 2 {
            return false;
        }
        (2..).take_while(|d| d * d <= n).all(|d| n % d != 0)
    }

    #[test]
    fn test_small_values() {
        assert!(!is_probably_prime(&big(0), 40).unwrap());
        assert!(!is_probably_prime(&big(1), 40).unwrap());
        assert!(is_probably_prime(&big(2), 40).unwrap());
        assert!(is_probably_prime(&big(3), 40).unwrap());
        assert!(!is_probably_prime(&big(4), 40).unwrap());
    }

    #[test]
    fn test_even_numbers_rejected() {
        for n in (4u64..2000).step_by(2) {
            assert!(!is_probably_prime(&big(n), 10).unwrap(), "{} accepted", n);
        }
        let huge_even = BigUint::one() << 521u32;
        assert!(!is_probably_prime(&huge_even, 10).unwrap());
    }

    #[test]
    fn test_known_primes() {
        for p in [2u64, 3, 5, 7, 11, 13, 101, 7919] {
            assert!(is_probably_prime(&big(p), 40).unwrap(), "{} rejected", p);
        }
    }

    #[test]
    fn test_known_safe_primes_and_their_halves() {
        for p in [5u64, 7, 11, 23, 47, 59, 83, 107, 167, 179, 227, 263, 347, 359] {
            assert!(is_probably_prime(&big(p), 40).unwrap());
            assert!(is_probably_prime(&big((p - 1) / 2), 40).unwrap());
        }
    }

    #[test]
    fn test_known_composites() {
        for n in [9u64, 15, 21, 25, 49, 221, 561, 1105, 1729, 2465, 7917] {
            assert!(!is_probably_prime(&big(n), 40).unwrap(), "{} accepted", n);
        }
    }

    #[test]
    fn test_agrees_with_naive_below_limit() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        for n in 0u64..5000 {
            assert_eq!(
                is_probably_prime_with_rng(&big(n), 8, &mut rng).unwrap(),
                naive_is_prime(n),
                "disagreement at {}",
                n
            );
        }
    }

    #[test]
    fn test_large_prime_and_composite() {
        // 2^127 - 1 is a Mersenne prime
        let m127 = (BigUint::one() << 127u32) - 1u32;
        assert!(is_probably_prime(&m127, 40).unwrap());

        // 2^128 + 1 = 59649589127497217 * 5704689200685129054721
        let f7 = (BigUint::one() << 128u32) + 1u32;
        assert!(!is_probably_prime(&f7, 40).unwrap());

        // RFC 3526 group 5 (1536-bit MODP) prime is a safe prime
        let modp = BigUint::from_str_radix(
            "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD1\
             29024E088A67CC74020BBEA63B139B22514A08798E3404DD\
             EF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245\
             E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED\
             EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3D\
             C2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F\
             83655D23DCA3AD961C62F356208552BB9ED529077096966D\
             670C354E4ABC9804F1746C08CA237327FFFFFFFFFFFFFFFF",
            16,
        )
        .unwrap();
        assert!(is_probably_prime(&modp, 20).unwrap());
        assert!(is_probably_prime(&((&modp - 1u32) >> 1u32), 20).unwrap());
    }

    #[test]
    fn test_carmichael_numbers_rejected() {
        // Chernick Carmichael numbers whose factors all exceed 256, so
        // only Miller-Rabin can reject them
        for n in [118901521u64, 172947529, 216821881, 228842209, 257 * 263] {
            assert!(!is_probably_prime(&big(n), 40).unwrap(), "{} accepted", n);
        }
    }

    #[test]
    fn test_zero_rounds_rejected() {
        assert!(matches!(
            is_probably_prime(&big(7919), 0),
            Err(SafePrimeError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_failing_rng_only_matters_for_miller_rabin() {
        // decided by trial division, no randomness needed
        assert!(is_probably_prime_with_rng(&big(7919), 40, &mut FailingRng).unwrap());

        let m127 = (BigUint::one() << 127u32) - 1u32;
        assert!(matches!(
            is_probably_prime_with_rng(&m127, 40, &mut FailingRng),
            Err(SafePrimeError::EntropyUnavailable(_))
        ));
    }

    #[test]
    fn test_has_small_factor() {
        assert!(!has_small_factor(&big(7)));
        assert!(!has_small_factor(&big(251)));
        assert!(!has_small_factor(&big(257)));
        assert!(has_small_factor(&big(15)));
        assert!(has_small_factor(&big(221)));
        assert!(has_small_factor(&(big(251) * big(1_000_003))));
    }

    #[test]
    fn test_error_bound() {
        assert_eq!(miller_rabin_error_bound(1), 0.25);
        assert_eq!(miller_rabin_error_bound(40), 2f64.powi(-80));
    }
}
