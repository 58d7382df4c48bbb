//! # Safe Prime Library
//!
//! This library generates safe primes: primes `p = 2q + 1` where `q` is
//! prime as well, as used for Diffie-Hellman groups.
//!
//! ## Components
//!
//! - **Sampler** ([`random`]) - odd candidates of an exact bit length from a
//!   cryptographically secure source
//! - **Primality tester** ([`primality`]) - trial division followed by
//!   Miller-Rabin with a configurable number of rounds
//! - **Search loop** ([`generator`]) - samples and tests until `p` and `q`
//!   are both probably prime or the iteration budget runs out
//! - **Parallel search** ([`parallel`]) - the same loop on several threads
//!
//! ## Usage
//!
//! ```rust
//! use safe_prime::{generate_safe_prime, is_probably_prime, DEFAULT_CERTAINTY};
//!
//! let p = generate_safe_prime(64, DEFAULT_CERTAINTY)?;
//! let q = (&p - 1u32) >> 1u32;
//!
//! assert_eq!(p.bits(), 64);
//! assert!(is_probably_prime(&q, DEFAULT_CERTAINTY)?);
//! # Ok::<(), safe_prime::SafePrimeError>(())
//! ```
//!
//! ## Randomness
//!
//! Production code draws from the operating system through
//! [`rand::rngs::OsRng`]. Any `RngCore + CryptoRng` source can be injected
//! with [`SafePrimeGenerator::with_rng`], and
//! [`SafePrimeGenerator::from_seed`] gives a reproducible ChaCha20 stream
//! for tests. Failures of the source are reported as
//! [`SafePrimeError::EntropyUnavailable`], never papered over.

pub mod cancel;
pub mod error;
pub mod generator;
pub mod parallel;
pub mod params;
pub mod primality;
pub mod random;

pub use cancel::CancellationToken;
pub use error::{Result, SafePrimeError};
pub use generator::{
    generate_safe_prime, generate_safe_prime_with_rng, SafePrime, SafePrimeGenerator,
};
pub use parallel::{generate_parallel, generate_parallel_with_cancel, MAX_THREADS};
pub use params::{
    bit_length_from_signed, SafePrimeRequest, DEFAULT_CERTAINTY, MAX_BIT_LENGTH, MAX_CERTAINTY,
    MIN_BIT_LENGTH,
};
pub use primality::{is_probably_prime, is_probably_prime_with_rng, miller_rabin_error_bound};

pub use num_bigint::BigUint;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
