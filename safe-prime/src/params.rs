//! Generation parameters and their validation

use crate::error::{Result, SafePrimeError};

/// Smallest bit length that admits a safe prime (5 = 2*2 + 1, 7 = 2*3 + 1).
pub const MIN_BIT_LENGTH: u64 = 3;

/// Largest bit length accepted by [`SafePrimeRequest::validate`].
pub const MAX_BIT_LENGTH: u64 = 16384;

/// Default Miller-Rabin rounds. Each tested number is wrongly accepted with
/// probability at most `4^-40 = 2^-80`.
pub const DEFAULT_CERTAINTY: u32 = 40;

/// Largest accepted number of Miller-Rabin rounds.
pub const MAX_CERTAINTY: u32 = 256;

/// Floor of the default iteration budget, so tiny bit lengths still get
/// plenty of attempts.
const MIN_ITERATION_BUDGET: u64 = 4096;

/// Input to a safe prime search.
///
/// # Example
///
/// ```rust
/// use safe_prime::SafePrimeRequest;
///
/// let request = SafePrimeRequest::new(512).with_certainty(64);
/// assert!(request.validate().is_ok());
/// assert!(SafePrimeRequest::new(2).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafePrimeRequest {
    /// Exact bit length of the safe prime `p`
    pub bit_length: u64,
    /// Miller-Rabin rounds applied to both `p` and `q`
    pub certainty: u32,
    /// Number of sampled candidates before giving up. `None` picks
    /// [`SafePrimeRequest::default_iteration_budget`].
    pub max_iterations: Option<u64>,
}

impl SafePrimeRequest {
    pub fn new(bit_length: u64) -> Self {
        Self {
            bit_length,
            certainty: DEFAULT_CERTAINTY,
            max_iterations: None,
        }
    }

    pub fn with_certainty(mut self, certainty: u32) -> Self {
        self.certainty = certainty;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Iteration budget used when none is set: `max(4096, 32 * bits²)`.
    ///
    /// A random `b`-bit candidate is a safe prime with probability roughly
    /// proportional to `1 / b²`, so this sits a few hundred times above the
    /// expected number of draws.
    pub fn default_iteration_budget(bit_length: u64) -> u64 {
        bit_length
            .saturating_mul(bit_length)
            .saturating_mul(32)
            .max(MIN_ITERATION_BUDGET)
    }

    /// The effective iteration budget for this request.
    pub fn iteration_budget(&self) -> u64 {
        self.max_iterations
            .unwrap_or_else(|| Self::default_iteration_budget(self.bit_length))
    }

    /// Check every field; called before any randomness is consumed.
    pub fn validate(&self) -> Result<()> {
        if self.bit_length < MIN_BIT_LENGTH || self.bit_length > MAX_BIT_LENGTH {
            return Err(SafePrimeError::InvalidParameter(format!(
                "bit length must be between {} and {}, got {}",
                MIN_BIT_LENGTH, MAX_BIT_LENGTH, self.bit_length
            )));
        }

        if self.certainty == 0 || self.certainty > MAX_CERTAINTY {
            return Err(SafePrimeError::InvalidParameter(format!(
                "certainty must be between 1 and {}, got {}",
                MAX_CERTAINTY, self.certainty
            )));
        }

        if self.max_iterations == Some(0) {
            return Err(SafePrimeError::InvalidParameter(
                "max iterations must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Convert a signed bit length from an outer layer, rejecting negatives.
pub fn bit_length_from_signed(bit_length: i64) -> Result<u64> {
    u64::try_from(bit_length).map_err(|_| {
        SafePrimeError::InvalidParameter(format!(
            "bit length must be positive, got {}",
            bit_length
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = SafePrimeRequest::new(1024);
        assert_eq!(request.certainty, DEFAULT_CERTAINTY);
        assert_eq!(request.max_iterations, None);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_bit_length_bounds() {
        for bits in [0u64, 1, 2, MAX_BIT_LENGTH + 1] {
            assert!(matches!(
                SafePrimeRequest::new(bits).validate(),
                Err(SafePrimeError::InvalidParameter(_))
            ));
        }
        assert!(SafePrimeRequest::new(MIN_BIT_LENGTH).validate().is_ok());
        assert!(SafePrimeRequest::new(MAX_BIT_LENGTH).validate().is_ok());
    }

    #[test]
    fn test_certainty_bounds() {
        let base = SafePrimeRequest::new(64);
        assert!(base.with_certainty(0).validate().is_err());
        assert!(base.with_certainty(MAX_CERTAINTY + 1).validate().is_err());
        assert!(base.with_certainty(1).validate().is_ok());
        assert!(base.with_certainty(MAX_CERTAINTY).validate().is_ok());
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let request = SafePrimeRequest::new(64).with_max_iterations(0);
        assert!(matches!(
            request.validate(),
            Err(SafePrimeError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_iteration_budget() {
        assert_eq!(SafePrimeRequest::new(3).iteration_budget(), 4096);
        assert_eq!(SafePrimeRequest::new(2048).iteration_budget(), 32 * 2048 * 2048);
        assert_eq!(
            SafePrimeRequest::new(2048).with_max_iterations(7).iteration_budget(),
            7
        );
        assert_eq!(SafePrimeRequest::default_iteration_budget(u64::MAX), u64::MAX);
    }

    #[test]
    fn test_signed_bit_length() {
        assert_eq!(bit_length_from_signed(16).unwrap(), 16);
        assert_eq!(bit_length_from_signed(0).unwrap(), 0);
        assert!(matches!(
            bit_length_from_signed(-8),
            Err(SafePrimeError::InvalidParameter(_))
        ));
    }
}
