//! Password gating for notes.
//!
//! The gate turns a plaintext password into a one-way digest at creation
//! time and checks a supplied plaintext against that digest at read time.
//! It knows nothing about notes; [`crate::NoteStore`] consumes it as a
//! capability.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::{Deserialize, Serialize};

use crate::error::{GhostError, Result};

/// Default Argon2id parameters.
///
/// Notes live for at most three days, so the cost is tuned for request
/// latency rather than long-term storage:
/// - Memory: 19 MiB (19 * 1024 KiB)
/// - Iterations: 2
/// - Parallelism: 1
const DEFAULT_MEMORY_KIB: u32 = 19 * 1024;
const DEFAULT_ITERATIONS: u32 = 2;
const DEFAULT_PARALLELISM: u32 = 1;

/// Salt length in bytes.
const SALT_LENGTH: usize = 16;

/// One-way hash capability used to gate notes behind a password.
pub trait AccessGate: Send + Sync {
    /// Hash a plaintext password into a self-describing digest.
    fn hash(&self, plain: &str) -> Result<String>;

    /// Check a plaintext password against a digest produced by [`AccessGate::hash`].
    ///
    /// Returns `Ok(false)` on mismatch. Errors are reserved for malformed
    /// digests and failures of the primitive itself.
    fn verify(&self, plain: &str, digest: &str) -> Result<bool>;
}

/// Cost parameters for [`Argon2Gate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HasherParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HasherParams {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_MEMORY_KIB,
            iterations: DEFAULT_ITERATIONS,
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

/// [`AccessGate`] backed by Argon2id.
///
/// Digests are PHC strings (`$argon2id$v=19$m=...`) that carry their own
/// salt and parameters, so changing [`HasherParams`] never invalidates
/// digests already stored.
#[derive(Clone)]
pub struct Argon2Gate {
    argon2: Argon2<'static>,
    params: HasherParams,
}

impl Argon2Gate {
    /// Create a gate with the given cost parameters.
    ///
    /// # Errors
    ///
    /// Returns `GhostError::Internal` if Argon2 rejects the parameters
    /// (e.g. memory below `8 * parallelism` KiB).
    pub fn new(params: HasherParams) -> Result<Self> {
        let argon2_params = argon2::Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            None,
        )
        .map_err(|e| GhostError::Internal(format!("Failed to create Argon2 params: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(
                argon2::Algorithm::Argon2id,
                argon2::Version::V0x13,
                argon2_params,
            ),
            params,
        })
    }

    /// The cost parameters new digests are produced with.
    pub fn params(&self) -> HasherParams {
        self.params
    }
}

impl Default for Argon2Gate {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
            params: HasherParams {
                memory_kib: argon2::Params::DEFAULT_M_COST,
                iterations: argon2::Params::DEFAULT_T_COST,
                parallelism: argon2::Params::DEFAULT_P_COST,
            },
        }
    }
}

impl std::fmt::Debug for Argon2Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Gate")
            .field("params", &self.params)
            .finish()
    }
}

impl AccessGate for Argon2Gate {
    fn hash(&self, plain: &str) -> Result<String> {
        let mut salt_bytes = [0u8; SALT_LENGTH];
        getrandom::getrandom(&mut salt_bytes)
            .map_err(|e| GhostError::Internal(format!("Failed to generate salt: {}", e)))?;
        let salt = SaltString::encode_b64(&salt_bytes)?;

        let digest = self.argon2.hash_password(plain.as_bytes(), &salt)?;
        Ok(digest.to_string())
    }

    fn verify(&self, plain: &str, digest: &str) -> Result<bool> {
        let parsed = PasswordHash::new(digest)?;
        match self.argon2.verify_password(plain.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_gate() -> Argon2Gate {
        Argon2Gate::new(HasherParams {
            memory_kib: 256,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_then_verify() {
        let gate = cheap_gate();
        let digest = gate.hash("correct horse").unwrap();

        assert!(digest.starts_with("$argon2id$"));
        assert!(gate.verify("correct horse", &digest).unwrap());
        assert!(!gate.verify("correct horsf", &digest).unwrap());
        assert!(!gate.verify("", &digest).unwrap());
    }

    #[test]
    fn test_hash_is_salted() {
        let gate = cheap_gate();
        let first = gate.hash("same").unwrap();
        let second = gate.hash("same").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_digest_carries_its_own_params() {
        let digest = cheap_gate().hash("pw").unwrap();

        // A gate with different cost settings still verifies older digests.
        let other = Argon2Gate::new(HasherParams {
            memory_kib: 512,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        assert!(other.verify("pw", &digest).unwrap());
    }

    #[test]
    fn test_malformed_digest_is_internal_error() {
        let gate = cheap_gate();
        let result = gate.verify("pw", "not-a-phc-string");
        assert!(matches!(result, Err(GhostError::Internal(_))));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let result = Argon2Gate::new(HasherParams {
            memory_kib: 1,
            iterations: 1,
            parallelism: 1,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_hides_internals() {
        let debug = format!("{:?}", cheap_gate());
        assert!(debug.contains("memory_kib: 256"));
    }
}
