//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, levels within capacity)
//! - Detect duplicate pot registrations
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("timeouts.read_secs must be greater than zero")]
    ZeroReadTimeout,

    #[error("listener.max_connections must be greater than zero")]
    ZeroMaxConnections,

    #[error("listener.host must not be empty")]
    EmptyHost,

    #[error("pot id '{0}' must be non-empty and contain no '/', '?' or whitespace")]
    InvalidPotId(String),

    #[error("pot '{0}' must have a capacity greater than zero")]
    ZeroCapacity(String),

    #[error("pot '{id}' level {level} exceeds capacity {capacity}")]
    LevelExceedsCapacity { id: String, level: u32, capacity: u32 },

    #[error("pot '{0}' is registered more than once")]
    DuplicatePot(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.timeouts.read_secs == 0 {
        errors.push(ValidationError::ZeroReadTimeout);
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroMaxConnections);
    }
    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }

    let mut seen = HashSet::new();
    for pot in &config.pots {
        let valid_id = !pot.id.is_empty()
            && !pot.id.contains(|c: char| c == '/' || c == '?' || c.is_whitespace());
        if !valid_id {
            errors.push(ValidationError::InvalidPotId(pot.id.clone()));
        }
        if pot.capacity == 0 {
            errors.push(ValidationError::ZeroCapacity(pot.id.clone()));
        }
        if pot.level > pot.capacity {
            errors.push(ValidationError::LevelExceedsCapacity {
                id: pot.id.clone(),
                level: pot.level,
                capacity: pot.capacity,
            });
        }
        if !seen.insert(pot.id.as_str()) {
            errors.push(ValidationError::DuplicatePot(pot.id.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PotConfig;
    use crate::pot::PotKind;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(validate_config(&ServerConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ServerConfig::default();
        config.timeouts.read_secs = 0;
        config.listener.max_connections = 0;
        config.pots = vec![
            PotConfig::new("a/b", PotKind::Coffee, 0, 0, &[]),
            PotConfig::new("pot-1", PotKind::Coffee, 2, 5, &[]),
            PotConfig::new("pot-1", PotKind::Teapot, 2, 2, &[]),
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroReadTimeout,
                ValidationError::ZeroMaxConnections,
                ValidationError::InvalidPotId("a/b".into()),
                ValidationError::ZeroCapacity("a/b".into()),
                ValidationError::LevelExceedsCapacity {
                    id: "pot-1".into(),
                    level: 5,
                    capacity: 2
                },
                ValidationError::DuplicatePot("pot-1".into()),
            ]
        );
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::LevelExceedsCapacity {
            id: "pot-1".into(),
            level: 9,
            capacity: 6,
        };
        assert_eq!(err.to_string(), "pot 'pot-1' level 9 exceeds capacity 6");
    }
}
