use crate::*;
use std::env::var;

/// Default bound on confirmation attempts per card and node
pub const DEFAULT_MAX_CONFIRMATION_ATTEMPTS: u32 = 5;

/// Deployment configuration of the confirmation protocol
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ConfirmationConfig {
    pub max_confirmation_attempts: u32,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        ConfirmationConfig {
            max_confirmation_attempts: DEFAULT_MAX_CONFIRMATION_ATTEMPTS,
        }
    }
}

impl ConfirmationConfig {
    pub fn new(max_confirmation_attempts: u32) -> Result<Self, Error> {
        if max_confirmation_attempts == 0 {
            return Err(Error::Config(
                "max_confirmation_attempts must be at least 1".to_owned(),
            ));
        }
        Ok(ConfirmationConfig {
            max_confirmation_attempts,
        })
    }

    /// Read the configuration from `VOTECAST_MAX_CONFIRMATION_ATTEMPTS`, falling back to the default.
    pub fn from_env() -> Result<Self, Error> {
        match var("VOTECAST_MAX_CONFIRMATION_ATTEMPTS") {
            Ok(val) => {
                let max = val.trim().parse::<u32>().map_err(|e| {
                    Error::Config(format!(
                        "VOTECAST_MAX_CONFIRMATION_ATTEMPTS {:?}: {}",
                        val, e
                    ))
                })?;
                ConfirmationConfig::new(max)
            }
            Err(_e) => Ok(ConfirmationConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config() {
        assert_eq!(
            ConfirmationConfig::default().max_confirmation_attempts,
            DEFAULT_MAX_CONFIRMATION_ATTEMPTS
        );
        assert_eq!(ConfirmationConfig::new(3).unwrap().max_confirmation_attempts, 3);
        assert!(ConfirmationConfig::new(0).is_err());
    }
}
