/// Signing key material
///
/// Decodes the configured base64 shared secret into HMAC key material once at
/// startup. The keys are read-only and process-wide; there is no runtime
/// rotation.

use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::error::{AppError, ConfigError};

#[derive(Clone)]
pub struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    /// Builds key material from a base64-encoded secret.
    ///
    /// # Errors
    /// Returns a configuration error if the secret is not valid base64. This
    /// is a startup failure, never a per-request one.
    pub fn from_base64_secret(secret: &str) -> Result<Self, AppError> {
        let encoding = EncodingKey::from_base64_secret(secret).map_err(|e| {
            AppError::Config(ConfigError::InvalidValue(format!(
                "jwt base64_secret: {}",
                e
            )))
        })?;
        let decoding = DecodingKey::from_base64_secret(secret).map_err(|e| {
            AppError::Config(ConfigError::InvalidValue(format!(
                "jwt base64_secret: {}",
                e
            )))
        })?;

        Ok(Self { encoding, decoding })
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}
