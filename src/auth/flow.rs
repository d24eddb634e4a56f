//! Installed-application OAuth flow.
//!
//! The user is sent to the consent page, Google redirects back to a
//! short-lived listener on the loopback interface, and the received code is
//! exchanged for tokens.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Router;
use chrono::Utc;
use reqwest::{Client, Url};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, error, info};

use super::pkce::{generate_state, PkcePair};
use super::secrets::ClientSecrets;
use super::token::{StoredToken, TokenResponse};
use crate::error::{PhotosError, Result};

/// Page shown in the browser once the redirect arrived.
const SUCCESS_MESSAGE: &str =
    "The authentication flow has completed. You may close this window.";

/// Shows the consent URL to the user.
pub trait ConsentPrompt: Send + Sync {
    fn present(&self, authorization_url: &str);
}

/// Prints the consent URL on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintPrompt;

impl ConsentPrompt for PrintPrompt {
    fn present(&self, authorization_url: &str) {
        println!(
            "Please visit this URL to authorize this application: {}",
            authorization_url
        );
    }
}

/// Authorization-code flow with a loopback redirect.
#[derive(Debug, Clone)]
pub struct InstalledAppFlow {
    client: Client,
    secrets: ClientSecrets,
    scopes: Vec<String>,
}

impl InstalledAppFlow {
    pub fn new(client: Client, secrets: ClientSecrets, scopes: Vec<String>) -> Self {
        Self {
            client,
            secrets,
            scopes,
        }
    }

    /// Create a flow from a client secrets file on disk.
    pub fn from_client_secrets_file<P: AsRef<Path>>(
        client: Client,
        path: P,
        scopes: Vec<String>,
    ) -> Result<Self> {
        let secrets = ClientSecrets::from_file(path)?;
        Ok(Self::new(client, secrets, scopes))
    }

    pub fn secrets(&self) -> &ClientSecrets {
        &self.secrets
    }

    /// Build the consent page URL.
    pub fn authorization_url(
        &self,
        redirect_uri: &str,
        state: &str,
        code_challenge: &str,
    ) -> Result<String> {
        let mut url = Url::parse(&self.secrets.auth_uri)
            .map_err(|e| PhotosError::InvalidClientSecrets(format!("auth_uri: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.secrets.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", &self.scopes.join(" "))
            .append_pair("state", state)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("code_challenge", code_challenge)
            .append_pair("code_challenge_method", "S256");

        Ok(url.to_string())
    }

    /// Run the full interactive flow.
    ///
    /// Binds `127.0.0.1:port` (0 for any free port), presents the consent
    /// URL and waits for the browser redirect.
    pub async fn run_local_server(
        &self,
        port: u16,
        prompt: &dyn ConsentPrompt,
    ) -> Result<StoredToken> {
        let listener = TcpListener::bind(("127.0.0.1", port)).await?;
        let port = listener.local_addr()?.port();
        let redirect_uri = format!("http://localhost:{}/", port);

        let pkce = PkcePair::generate();
        let state = generate_state();
        let url = self.authorization_url(&redirect_uri, &state, &pkce.challenge)?;

        info!("Waiting for authorization redirect on port {}", port);
        prompt.present(&url);

        let params = receive_redirect(listener).await?;

        if let Some(err) = params.get("error") {
            return Err(PhotosError::Authorization(format!(
                "consent was not granted: {}",
                err
            )));
        }

        if params.get("state").map(String::as_str) != Some(state.as_str()) {
            return Err(PhotosError::Authorization(
                "state mismatch in redirect".to_string(),
            ));
        }

        let code = params
            .get("code")
            .ok_or_else(|| PhotosError::Authorization("no code in redirect".to_string()))?;

        self.exchange_code(code, &redirect_uri, &pkce.verifier).await
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        code_verifier: &str,
    ) -> Result<StoredToken> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.secrets.client_id.as_str()),
            ("client_secret", self.secrets.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
            ("code_verifier", code_verifier),
        ];

        let response = request_token(&self.client, &self.secrets.token_uri, &form).await?;
        info!("Authorization code exchanged");

        Ok(StoredToken::from_response(
            response,
            &self.secrets,
            &self.scopes,
            Utc::now(),
        ))
    }
}

/// Refresh an expired access token in place.
pub async fn refresh(client: &Client, token: &mut StoredToken) -> Result<()> {
    let refresh_token = token
        .refresh_token
        .clone()
        .ok_or_else(|| PhotosError::BadCredentials("no refresh token".to_string()))?;

    let form = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token.as_str()),
        ("client_id", token.client_id.as_str()),
        ("client_secret", token.client_secret.as_str()),
    ];

    let response = request_token(client, &token.token_uri, &form).await?;
    token.apply_response(response, Utc::now());
    info!("Access token refreshed");

    Ok(())
}

/// POST a form to the token endpoint.
async fn request_token(
    client: &Client,
    token_uri: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse> {
    debug!("POST {}", token_uri);

    let response = client.post(token_uri).form(form).send().await?;
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let detail = serde_json::from_str::<Value>(&text)
            .ok()
            .map(|v| {
                let error = v.get("error").and_then(|e| e.as_str()).unwrap_or("unknown");
                match v.get("error_description").and_then(|d| d.as_str()) {
                    Some(description) => format!("{}: {}", error, description),
                    None => error.to_string(),
                }
            })
            .unwrap_or(text);
        error!("Token endpoint returned {}: {}", status, detail);
        return Err(PhotosError::BadCredentials(format!(
            "token endpoint returned {}: {}",
            status.as_u16(),
            detail
        )));
    }

    Ok(serde_json::from_str(&text)?)
}

/// Hands the first authorization response over to the waiting flow.
#[derive(Clone)]
struct RedirectState {
    sender: Arc<Mutex<Option<oneshot::Sender<HashMap<String, String>>>>>,
}

async fn respond_to_redirect(
    State(state): State<RedirectState>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, &'static str) {
    if !params.contains_key("code") && !params.contains_key("error") {
        return (StatusCode::NOT_FOUND, "Not found");
    }

    if let Some(sender) = state.sender.lock().await.take() {
        let _ = sender.send(params);
    }
    (StatusCode::OK, SUCCESS_MESSAGE)
}

/// Serve the loopback listener until a request carries `code` or `error`.
///
/// Connections are served concurrently, so idle or malformed ones do not
/// hold up the redirect.
async fn receive_redirect(listener: TcpListener) -> Result<HashMap<String, String>> {
    let (sender, receiver) = oneshot::channel();
    let app = Router::new()
        .fallback(respond_to_redirect)
        .with_state(RedirectState {
            sender: Arc::new(Mutex::new(Some(sender))),
        });

    let server = tokio::spawn(async move { axum::serve(listener, app).await });

    // The sender lives in the router, so a stopped server closes the channel.
    let params = receiver
        .await
        .map_err(|_| PhotosError::Authorization("redirect listener stopped".to_string()));

    server.abort();
    params
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use mockito::Matcher;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpStream;

    pub(crate) fn test_secrets(token_uri: String) -> ClientSecrets {
        ClientSecrets {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            auth_uri: "https://accounts.example.com/o/oauth2/auth".to_string(),
            token_uri,
            redirect_uris: vec!["http://localhost".to_string()],
        }
    }

    /// Traffic that reaches the listener before the browser does.
    #[derive(Debug, Default, Clone, Copy)]
    pub(crate) enum Preconnect {
        #[default]
        None,
        /// A connection that is opened and never written to.
        Idle,
        /// A request line that is not UTF-8.
        Garbage,
    }

    /// Plays the browser: follows the consent URL straight to the redirect.
    #[derive(Default)]
    pub(crate) struct RedirectingPrompt {
        pub code: &'static str,
        pub state_override: Option<&'static str>,
        pub preconnect: Preconnect,
    }

    impl ConsentPrompt for RedirectingPrompt {
        fn present(&self, authorization_url: &str) {
            let url = Url::parse(authorization_url).unwrap();
            let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
            let state = self
                .state_override
                .map(str::to_string)
                .unwrap_or_else(|| params["state"].clone());
            let base = params["redirect_uri"].replace("localhost", "127.0.0.1");
            let favicon = format!("{}favicon.ico", base);
            let redirect = format!("{}?code={}&state={}", base, self.code, state);
            let addr = base
                .trim_start_matches("http://")
                .trim_end_matches('/')
                .to_string();
            let preconnect = self.preconnect;

            tokio::spawn(async move {
                // Held open until the redirect went through.
                let _early = match preconnect {
                    Preconnect::None => None,
                    Preconnect::Idle => Some(TcpStream::connect(&addr).await.unwrap()),
                    Preconnect::Garbage => {
                        let mut stream = TcpStream::connect(&addr).await.unwrap();
                        stream.write_all(b"\xff\xfe /\r\n\r\n").await.unwrap();
                        Some(stream)
                    }
                };

                let client = Client::new();
                let _ = client.get(favicon).send().await;
                let _ = client.get(redirect).send().await;
            });
        }
    }

    #[test]
    fn test_authorization_url() {
        let flow = InstalledAppFlow::new(
            Client::new(),
            test_secrets("https://oauth.example.com/token".to_string()),
            vec![crate::config::READONLY_SCOPE.to_string()],
        );
        let url = flow
            .authorization_url("http://localhost:8080/", "state-1", "challenge-1")
            .unwrap();
        let url = Url::parse(&url).unwrap();
        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("accounts.example.com"));
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["client_id"], "client-id");
        assert_eq!(params["redirect_uri"], "http://localhost:8080/");
        assert_eq!(params["scope"], crate::config::READONLY_SCOPE);
        assert_eq!(params["state"], "state-1");
        assert_eq!(params["access_type"], "offline");
        assert_eq!(params["code_challenge"], "challenge-1");
        assert_eq!(params["code_challenge_method"], "S256");
    }

    #[tokio::test]
    async fn test_run_local_server_exchanges_code() {
        let mut server = mockito::Server::new_async().await;
        let token_mock = server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("grant_type=authorization_code".to_string()),
                Matcher::Regex("code=auth-code".to_string()),
                Matcher::Regex("code_verifier=".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"access_token": "ya29.fresh", "expires_in": 3599,
                    "refresh_token": "1//refresh", "token_type": "Bearer"}"#,
            )
            .create_async()
            .await;

        let flow = InstalledAppFlow::new(
            Client::new(),
            test_secrets(format!("{}/token", server.url())),
            vec![crate::config::READONLY_SCOPE.to_string()],
        );
        let prompt = RedirectingPrompt {
            code: "auth-code",
            ..Default::default()
        };

        let token = flow.run_local_server(0, &prompt).await.unwrap();

        token_mock.assert_async().await;
        assert_eq!(token.token.as_deref(), Some("ya29.fresh"));
        assert_eq!(token.refresh_token.as_deref(), Some("1//refresh"));
        assert_eq!(token.client_id, "client-id");
        assert!(token.is_valid(Utc::now()));
    }

    #[tokio::test]
    async fn test_run_local_server_rejects_state_mismatch() {
        let flow = InstalledAppFlow::new(
            Client::new(),
            test_secrets("http://127.0.0.1:9/token".to_string()),
            vec![crate::config::READONLY_SCOPE.to_string()],
        );
        let prompt = RedirectingPrompt {
            code: "auth-code",
            state_override: Some("forged"),
            ..Default::default()
        };

        let err = flow.run_local_server(0, &prompt).await.unwrap_err();
        assert!(matches!(err, PhotosError::Authorization(_)));
    }

    fn token_server_mock(server: &mut mockito::ServerGuard) -> mockito::Mock {
        server
            .mock("POST", "/token")
            .match_body(Matcher::Regex("code=4%2F0Ab".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "ya29.fresh", "expires_in": 3599}"#)
    }

    async fn login_after(preconnect: Preconnect) {
        let mut server = mockito::Server::new_async().await;
        let token_mock = token_server_mock(&mut server).create_async().await;

        let flow = InstalledAppFlow::new(
            Client::new(),
            test_secrets(format!("{}/token", server.url())),
            vec![crate::config::READONLY_SCOPE.to_string()],
        );
        // The code arrives percent-encoded, as Google sends it.
        let prompt = RedirectingPrompt {
            code: "4%2F0Ab",
            preconnect,
            ..Default::default()
        };

        let token = tokio::time::timeout(Duration::from_secs(5), flow.run_local_server(0, &prompt))
            .await
            .expect("login hung on an early connection")
            .unwrap();

        token_mock.assert_async().await;
        assert_eq!(token.token.as_deref(), Some("ya29.fresh"));
    }

    #[tokio::test]
    async fn test_idle_connection_does_not_block_redirect() {
        login_after(Preconnect::Idle).await;
    }

    #[tokio::test]
    async fn test_malformed_request_does_not_abort_login() {
        login_after(Preconnect::Garbage).await;
    }

    #[tokio::test]
    async fn test_refresh_failure_is_bad_credentials() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error": "invalid_grant", "error_description": "Token has been expired or revoked."}"#)
            .create_async()
            .await;

        let mut token = StoredToken::from_response(
            TokenResponse {
                access_token: "old".to_string(),
                expires_in: Some(0),
                refresh_token: Some("1//refresh".to_string()),
                scope: None,
                token_type: None,
            },
            &test_secrets(format!("{}/token", server.url())),
            &[],
            Utc::now(),
        );

        let err = refresh(&Client::new(), &mut token).await.unwrap_err();
        match err {
            PhotosError::BadCredentials(msg) => assert!(msg.contains("invalid_grant")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
