use ed25519_dalek::SecretKey;
use std::env::var;
use std::path::PathBuf;

pub struct Config {
    pub secret_key: Option<SecretKey>,
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Read the configuration from the environment. Only `dispute` needs it.
    pub fn from_env() -> Result<Self, String> {
        let secret_key = match var("VOTECAST_SECRET_KEY") {
            Ok(val) => Some(
                parse_secret_key(&val).map_err(|e| format!("invalid VOTECAST_SECRET_KEY: {}", e))?,
            ),
            Err(_e) => None,
        };

        let output_dir = match var("VOTECAST_OUTPUT_DIR") {
            Ok(val) => Some(PathBuf::from(super::expand(&val))),
            Err(_e) => None,
        };

        Ok(Config {
            secret_key,
            output_dir,
        })
    }
}

/// Parse a hex encoded ed25519 secret key
pub fn parse_secret_key(val: &str) -> Result<SecretKey, String> {
    let bytes = hex::decode(val.trim()).map_err(|e| e.to_string())?;
    SecretKey::from_bytes(&bytes).map_err(|e| e.to_string())
}
