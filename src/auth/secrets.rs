//! OAuth client secrets, as downloaded from the Google Cloud console.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{PhotosError, Result};

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Client identity used to start the consent flow.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Load the secrets file, accepting either an `installed` or a `web` client.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            PhotosError::InvalidClientSecrets(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    /// Parse the secrets from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let file: SecretsFile = serde_json::from_str(text)?;

        let secrets = file.installed.or(file.web).ok_or_else(|| {
            PhotosError::InvalidClientSecrets(
                "expected an \"installed\" or \"web\" client".to_string(),
            )
        })?;

        if secrets.client_id.is_empty() {
            return Err(PhotosError::InvalidClientSecrets(
                "client_id is empty".to_string(),
            ));
        }

        Ok(secrets)
    }
}
