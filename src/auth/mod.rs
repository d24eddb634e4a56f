//! OAuth credentials for the Photos Library API.
//!
//! [`Authenticator::credentials`] returns usable credentials, reusing the
//! token file when possible:
//! - a valid stored token is returned as is
//! - an expired token with a refresh token is refreshed
//! - otherwise, or when the refresh fails, the interactive consent flow runs
//!
//! Anything newly obtained is written back to the token file.

pub mod flow;
pub mod pkce;
pub mod secrets;
pub mod token;

pub use flow::{ConsentPrompt, InstalledAppFlow, PrintPrompt};
pub use secrets::ClientSecrets;
pub use token::StoredToken;

use chrono::Utc;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::Result;

/// Loads, refreshes or obtains user credentials.
pub struct Authenticator {
    client: Client,
    token_file: PathBuf,
    client_secrets_file: PathBuf,
    scopes: Vec<String>,
    redirect_port: u16,
    prompt: Box<dyn ConsentPrompt>,
}

impl Authenticator {
    pub fn new(client: Client, settings: &Settings) -> Self {
        Self {
            client,
            token_file: settings.token_file.clone(),
            client_secrets_file: settings.client_secrets_file.clone(),
            scopes: settings.scopes.clone(),
            redirect_port: settings.redirect_port,
            prompt: Box::new(PrintPrompt),
        }
    }

    /// Replace how the consent URL is shown to the user.
    pub fn with_prompt<P: ConsentPrompt + 'static>(mut self, prompt: P) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    pub fn token_file(&self) -> &Path {
        &self.token_file
    }

    /// Return usable credentials, saving them if they changed.
    pub async fn credentials(&self) -> Result<StoredToken> {
        let stored = self.load_stored();

        if let Some(token) = &stored {
            if token.is_valid(Utc::now()) {
                info!("Using stored credentials from {}", self.token_file.display());
                return Ok(token.clone());
            }
        }

        let token = match stored {
            Some(mut token) if token.is_expired(Utc::now()) && token.has_refresh_token() => {
                match flow::refresh(&self.client, &mut token).await {
                    Ok(()) => token,
                    Err(e) => {
                        warn!("Could not refresh credentials, starting login: {}", e);
                        self.interactive().await?
                    }
                }
            }
            _ => self.interactive().await?,
        };

        token.save(&self.token_file)?;
        info!("Credentials saved to {}", self.token_file.display());

        Ok(token)
    }

    /// Read the token file; unusable files count as missing.
    fn load_stored(&self) -> Option<StoredToken> {
        if !self.token_file.exists() {
            return None;
        }

        match StoredToken::load(&self.token_file) {
            Ok(token) if token.covers_scopes(&self.scopes) => Some(token),
            Ok(_) => {
                warn!(
                    "Stored credentials in {} lack the requested scopes",
                    self.token_file.display()
                );
                None
            }
            Err(e) => {
                warn!(
                    "Ignoring unreadable token file {}: {}",
                    self.token_file.display(),
                    e
                );
                None
            }
        }
    }

    async fn interactive(&self) -> Result<StoredToken> {
        let flow = InstalledAppFlow::from_client_secrets_file(
            self.client.clone(),
            &self.client_secrets_file,
            self.scopes.clone(),
        )?;
        flow.run_local_server(self.redirect_port, self.prompt.as_ref())
            .await
    }
}
