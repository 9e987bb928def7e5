//! Error type shared by every fallible operation in the crate.
//!
//! Most of the simulation cannot fail: stale handles are skipped, missing
//! assets degrade to blank placeholders. What remains are construction-time
//! mistakes (an unknown bullet id, a shooter wired without the components its
//! attack needs) and bad input files.

use std::fmt;

/// Convenience alias used across the crate.
pub type Result<T, E = SimError> = std::result::Result<T, E>;

/// Errors that can occur while building or configuring the simulation.
#[derive(Debug)]
pub enum SimError {
    /// A registry lookup (bullet, enemy, boss) used an id that doesn't exist.
    UnknownDescriptor { kind: &'static str, id: u32 },
    /// An entity is missing a sibling component required by another one.
    InvalidEntityConfiguration(String),
    /// A component was constructed with an out-of-range parameter.
    InvalidParameter(String),
    /// A configuration or level-set file could not be parsed.
    Config(serde_json::Error),
    /// A file could not be read.
    Io(std::io::Error),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::UnknownDescriptor { kind, id } => write!(f, "no {kind} with id {id}"),
            SimError::InvalidEntityConfiguration(e) => {
                write!(f, "invalid entity configuration: {e}")
            }
            SimError::InvalidParameter(e) => write!(f, "invalid parameter: {e}"),
            SimError::Config(e) => write!(f, "config parse failed: {e}"),
            SimError::Io(e) => write!(f, "i/o error: {e}"),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Config(e) => Some(e),
            SimError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        SimError::Config(e)
    }
}

impl From<std::io::Error> for SimError {
    fn from(e: std::io::Error) -> Self {
        SimError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_descriptor_message() {
        let err = SimError::UnknownDescriptor { kind: "axis bullet", id: 42 };
        assert_eq!(err.to_string(), "no axis bullet with id 42");
    }

    #[test]
    fn json_error_converts() {
        let parse: std::result::Result<u32, _> = serde_json::from_str("nope");
        let err: SimError = parse.unwrap_err().into();
        assert!(matches!(err, SimError::Config(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
