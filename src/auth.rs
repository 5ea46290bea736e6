//! Static-token gate checked before a run starts.

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("unauthorized: missing or invalid token")]
    Unauthorized,
}

/// Compares a presented token against the configured one.
///
/// With no configured token the gate is open.
#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    token: Option<String>,
}

impl AccessGate {
    pub fn new(token: Option<String>) -> Self {
        Self { token: token.filter(|t| !t.is_empty()) }
    }

    pub fn verify(&self, presented: Option<&str>) -> Result<(), AuthError> {
        let Some(expected) = &self.token else {
            debug!("No auth token configured, gate is open");
            return Ok(());
        };

        match presented {
            Some(token) if constant_time_eq(token.as_bytes(), expected.as_bytes()) => Ok(()),
            _ => Err(AuthError::Unauthorized),
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
