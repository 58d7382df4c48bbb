//! Safe prime search loop
//!
//! Each iteration samples an odd candidate `p` with the exact bit length,
//! derives `q = (p - 1) / 2`, sieves both against the small primes and only
//! then runs Miller-Rabin, first on `q` and then on `p`.

use std::fmt;

use log::{debug, trace, warn};
use num_bigint::BigUint;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::cancel::CancellationToken;
use crate::error::{Result, SafePrimeError};
use crate::params::SafePrimeRequest;
use crate::primality::{has_small_factor, is_probably_prime, is_probably_prime_with_rng};
use crate::random::next_bits;

/// A safe prime `p = 2q + 1` together with its Sophie Germain prime `q`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafePrime {
    p: BigUint,
    q: BigUint,
    iterations: u64,
}

impl SafePrime {
    /// The safe prime `p`.
    pub fn safe_prime(&self) -> &BigUint {
        &self.p
    }

    /// The Sophie Germain prime `q = (p - 1) / 2`.
    pub fn prime(&self) -> &BigUint {
        &self.q
    }

    /// Number of candidates sampled before this one was accepted.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn bits(&self) -> u64 {
        self.p.bits()
    }

    pub fn into_inner(self) -> BigUint {
        self.p
    }

    /// Upper-case hexadecimal representation of `p`.
    pub fn to_hex(&self) -> String {
        format!("{:X}", self.p)
    }

    /// Re-check `p == 2q + 1` and the primality of both with fresh witnesses.
    pub fn validate(&self, rounds: u32) -> Result<bool> {
        if self.p != (&self.q << 1u32) + 1u32 {
            return Ok(false);
        }
        Ok(is_probably_prime(&self.q, rounds)? && is_probably_prime(&self.p, rounds)?)
    }
}

impl fmt::Display for SafePrime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.p)
    }
}

/// Safe prime generator owning its random source.
///
/// [`SafePrimeGenerator::new`] reads from the operating system's entropy
/// source and is what production code should use. Seeded generators from
/// [`SafePrimeGenerator::from_seed`] reproduce the same primes for the same
/// seed and exist for testing.
///
/// # Example
///
/// ```rust
/// use safe_prime::{SafePrimeGenerator, SafePrimeRequest};
///
/// let mut generator = SafePrimeGenerator::new();
/// let safe = generator.generate(&SafePrimeRequest::new(64)).unwrap();
/// assert_eq!(safe.bits(), 64);
/// ```
#[derive(Debug)]
pub struct SafePrimeGenerator<R = OsRng> {
    rng: R,
}

impl SafePrimeGenerator<OsRng> {
    pub fn new() -> Self {
        Self { rng: OsRng }
    }
}

impl Default for SafePrimeGenerator<OsRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl SafePrimeGenerator<ChaCha20Rng> {
    /// Deterministic generator, for tests and reproducible runs only.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Restart the deterministic stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        debug!("reseeding deterministic generator");
        self.rng = ChaCha20Rng::seed_from_u64(seed);
    }
}

impl<R: RngCore + CryptoRng> SafePrimeGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Search for a safe prime matching `request`.
    ///
    /// # Errors
    ///
    /// - [`SafePrimeError::InvalidParameter`] if the request does not validate
    /// - [`SafePrimeError::EntropyUnavailable`] if the random source fails
    /// - [`SafePrimeError::GenerationExhausted`] if the iteration budget runs out
    pub fn generate(&mut self, request: &SafePrimeRequest) -> Result<SafePrime> {
        self.generate_with_cancel(request, &CancellationToken::new())
    }

    /// Like [`generate`](Self::generate), but gives up with
    /// [`SafePrimeError::Cancelled`] once `cancel` is set. The token is
    /// checked between candidates, never inside a Miller-Rabin round.
    pub fn generate_with_cancel(
        &mut self,
        request: &SafePrimeRequest,
        cancel: &CancellationToken,
    ) -> Result<SafePrime> {
        request.validate()?;

        let bits = request.bit_length;
        let budget = request.iteration_budget();
        debug!(
            "searching for {}-bit safe prime ({} rounds, budget {})",
            bits, request.certainty, budget
        );

        for iteration in 1..=budget {
            if cancel.is_cancelled() {
                debug!("search cancelled after {} candidates", iteration - 1);
                return Err(SafePrimeError::Cancelled);
            }

            let mut p = next_bits(&mut self.rng, bits)?;
            // above 7 every safe prime is 3 mod 4, since q has to be odd
            if bits >= 4 {
                p.set_bit(1, true);
            }
            let q = &p >> 1u32;

            if has_small_factor(&q) || has_small_factor(&p) {
                continue;
            }

            if !is_probably_prime_with_rng(&q, request.certainty, &mut self.rng)? {
                trace!("candidate {}: q composite", iteration);
                continue;
            }

            if !is_probably_prime_with_rng(&p, request.certainty, &mut self.rng)? {
                trace!("candidate {}: q prime, p composite", iteration);
                continue;
            }

            debug!("found {}-bit safe prime after {} candidates", bits, iteration);
            return Ok(SafePrime {
                p,
                q,
                iterations: iteration,
            });
        }

        warn!("no {}-bit safe prime within {} candidates", bits, budget);
        Err(SafePrimeError::GenerationExhausted {
            bit_length: bits,
            iterations: budget,
        })
    }
}

/// Generate a safe prime of exactly `bit_length` bits using OS entropy.
///
/// Both the result `p` and `(p - 1) / 2` pass `certainty` Miller-Rabin
/// rounds; [`DEFAULT_CERTAINTY`](crate::DEFAULT_CERTAINTY) is the usual choice.
///
/// # Example
///
/// ```rust
/// use safe_prime::{generate_safe_prime, DEFAULT_CERTAINTY};
///
/// let p = generate_safe_prime(16, DEFAULT_CERTAINTY).unwrap();
/// assert_eq!(p.bits(), 16);
/// ```
pub fn generate_safe_prime(bit_length: u64, certainty: u32) -> Result<BigUint> {
    generate_safe_prime_with_rng(bit_length, certainty, OsRng)
}

/// [`generate_safe_prime`] with an injected random source.
pub fn generate_safe_prime_with_rng<R: RngCore + CryptoRng>(
    bit_length: u64,
    certainty: u32,
    rng: R,
) -> Result<BigUint> {
    let request = SafePrimeRequest::new(bit_length).with_certainty(certainty);
    SafePrimeGenerator::with_rng(rng)
        .generate(&request)
        .map(SafePrime::into_inner)
}
