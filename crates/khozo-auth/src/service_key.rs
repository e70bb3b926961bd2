//! Shared-key check for internal (worker / scheduler) endpoints.

use khozo_core::config::AuthConfig;
use khozo_core::error::AppError;

/// Compares presented keys against the configured service key.
#[derive(Clone)]
pub struct ServiceKeyVerifier {
    expected: String,
}

impl std::fmt::Debug for ServiceKeyVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceKeyVerifier").finish_non_exhaustive()
    }
}

impl ServiceKeyVerifier {
    /// Creates a verifier from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            expected: config.service_key.clone(),
        }
    }

    /// Accepts `presented` only if it equals the configured key.
    pub fn verify(&self, presented: &str) -> Result<(), AppError> {
        if self.expected.is_empty() || !constant_time_eq(presented.as_bytes(), self.expected.as_bytes())
        {
            return Err(AppError::authentication("Invalid service key"));
        }
        Ok(())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify() {
        let verifier = ServiceKeyVerifier::new(&AuthConfig {
            service_key: "k3y".into(),
            ..Default::default()
        });
        assert!(verifier.verify("k3y").is_ok());
        assert!(verifier.verify("k3z").is_err());
        assert!(verifier.verify("").is_err());
    }

    #[test]
    fn test_empty_configured_key_rejects_everything() {
        let verifier = ServiceKeyVerifier::new(&AuthConfig {
            service_key: String::new(),
            ..Default::default()
        });
        assert!(verifier.verify("").is_err());
    }
}
