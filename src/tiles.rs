//! Map tile credential (Mapbox access token) and its one-shot verification.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::error::RenderError;

const TOKEN_CHECK_URL: &str = "https://api.mapbox.com/tokens/v2";
const STYLE_TILES: &str = "https://api.mapbox.com/styles/v1/mapbox/light-v11/tiles/256/{z}/{x}/{y}";
const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("map tile token is empty")]
    Empty,
    #[error("map tile token must be a public token starting with `pk.`")]
    NotPublic,
}

/// Outcome of checking the token against the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialStatus {
    /// Verification disabled; only the token shape was checked.
    Unchecked,
    Verified,
    Rejected(String),
    Unreachable(String),
}

#[derive(Debug, Clone)]
pub struct TileCredential {
    token: String,
    status: CredentialStatus,
}

#[derive(Deserialize)]
struct TokenCheck {
    code: String,
}

impl TileCredential {
    /// Accept a public token (`pk.` prefix). Anything else is refused up front.
    pub fn new(token: impl Into<String>) -> Result<Self, TokenError> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(TokenError::Empty);
        }
        if !token.starts_with("pk.") {
            return Err(TokenError::NotPublic);
        }
        Ok(Self {
            token,
            status: CredentialStatus::Unchecked,
        })
    }

    /// Ask the provider whether the token is valid. Synchronous, no retry.
    pub fn verify(&mut self) -> &CredentialStatus {
        self.status = match Self::query(&self.token) {
            Ok(code) if code == "TokenValid" => CredentialStatus::Verified,
            Ok(code) => CredentialStatus::Rejected(code),
            Err(e) => CredentialStatus::Unreachable(e.to_string()),
        };

        match &self.status {
            CredentialStatus::Verified => tracing::info!("map tile token verified"),
            other => tracing::warn!(status = ?other, "map tile token not usable, point map disabled"),
        }
        &self.status
    }

    fn query(token: &str) -> Result<String, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(CHECK_TIMEOUT)
            .build()?;
        let check: TokenCheck = client
            .get(TOKEN_CHECK_URL)
            .query(&[("access_token", token)])
            .send()?
            .json()?;
        Ok(check.code)
    }

    /// Fail unless the token may be used for rendering.
    pub fn ensure_usable(&self) -> Result<(), RenderError> {
        match &self.status {
            CredentialStatus::Unchecked | CredentialStatus::Verified => Ok(()),
            CredentialStatus::Rejected(code) => Err(RenderError::ExternalService(format!(
                "map tile token rejected ({code})"
            ))),
            CredentialStatus::Unreachable(why) => Err(RenderError::ExternalService(format!(
                "map tile service unreachable: {why}"
            ))),
        }
    }

    /// Raster tile URL template with the token attached.
    pub fn tile_url_template(&self) -> String {
        format!("{STYLE_TILES}?access_token={}", self.token)
    }

    #[cfg(test)]
    pub(crate) fn with_status(mut self, status: CredentialStatus) -> Self {
        self.status = status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shape() {
        assert_eq!(TileCredential::new("").unwrap_err(), TokenError::Empty);
        assert_eq!(
            TileCredential::new("sk.secret").unwrap_err(),
            TokenError::NotPublic
        );
        let cred = TileCredential::new("  pk.abc.def ").unwrap();
        assert_eq!(cred.status, CredentialStatus::Unchecked);
        assert!(cred.tile_url_template().ends_with("?access_token=pk.abc.def"));
    }

    #[test]
    fn test_only_failed_checks_block_rendering() {
        let cred = TileCredential::new("pk.abc").unwrap();
        assert!(cred.ensure_usable().is_ok());
        assert!(cred
            .clone()
            .with_status(CredentialStatus::Verified)
            .ensure_usable()
            .is_ok());

        let err = cred
            .clone()
            .with_status(CredentialStatus::Rejected("TokenInvalid".into()))
            .ensure_usable()
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ExternalService);

        let err = cred
            .with_status(CredentialStatus::Unreachable("timeout".into()))
            .ensure_usable()
            .unwrap_err();
        assert!(err.to_string().contains("unreachable"));
    }
}
