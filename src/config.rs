//! Runtime settings shared by the summary and download workflows.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Read-only access to the Photos library.
pub const READONLY_SCOPE: &str = "https://www.googleapis.com/auth/photoslibrary.readonly";

/// Default location of the stored user credentials.
pub const DEFAULT_TOKEN_FILE: &str = "token.json";

/// Default location of the OAuth client secrets.
pub const DEFAULT_CLIENT_SECRETS_FILE: &str = "client_secret.json";

/// Largest page the Library API will return.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Settings for a [`Photoscoop`](crate::Photoscoop) session.
///
/// The defaults reproduce the plain script behaviour: credentials next to the
/// working directory, full pages, a one second pause after every ten
/// downloads.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Where the authorized-user token is read from and saved to.
    pub token_file: PathBuf,
    /// OAuth client secrets used for the interactive flow.
    pub client_secrets_file: PathBuf,
    /// Scopes requested from the user.
    pub scopes: Vec<String>,
    /// Loopback port for the consent redirect (0 picks a free one).
    pub redirect_port: u16,
    /// Items requested per page.
    pub page_size: u32,
    /// Download target directory.
    pub output_dir: PathBuf,
    /// Number of downloads between pauses.
    pub batch_size: usize,
    /// Pause inserted after each batch.
    pub batch_pause: Duration,
    /// Re-download files that already exist.
    pub overwrite: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            client_secrets_file: PathBuf::from(DEFAULT_CLIENT_SECRETS_FILE),
            scopes: vec![READONLY_SCOPE.to_string()],
            redirect_port: 0,
            page_size: MAX_PAGE_SIZE,
            output_dir: PathBuf::from("downloads"),
            batch_size: 10,
            batch_pause: Duration::from_secs(1),
            overwrite: false,
        }
    }
}

impl Settings {
    pub fn with_token_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.token_file = path.as_ref().to_path_buf();
        self
    }

    pub fn with_client_secrets_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.client_secrets_file = path.as_ref().to_path_buf();
        self
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_redirect_port(mut self, port: u16) -> Self {
        self.redirect_port = port;
        self
    }

    /// Set the page size, clamped to what the API accepts.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = clamp_page_size(page_size);
        self
    }

    pub fn with_output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = path.as_ref().to_path_buf();
        self
    }

    /// Set the batch size. Zero disables pausing.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_batch_pause(mut self, pause: Duration) -> Self {
        self.batch_pause = pause;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`.
pub fn clamp_page_size(page_size: u32) -> u32 {
    page_size.clamp(1, MAX_PAGE_SIZE)
}
