//! # Log Viewer
//!
//! Read-only HTML listing of the message archive, behind HTTP Basic auth.
//!
//! Credentials are compared by verifying HMAC-SHA256 tags under a per-process random key,
//! which keeps the comparison constant-time and independent of the secret's length.
//! With no username or password configured every request is rejected.

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Basic};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::config::WebConfig;
use crate::domain::types::LoggedMessage;
use crate::infrastructure::store::RecordStore;
use crate::strings::logs;

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct BasicAuth {
    username: String,
    password: String,
    realm: String,
    key: [u8; 32],
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("realm", &self.realm)
            .finish()
    }
}

impl BasicAuth {
    pub fn new(username: &str, password: &str, realm: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            realm: realm.to_string(),
            key: rand::random(),
        }
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        if self.username.is_empty() || self.password.is_empty() {
            return false;
        }
        // Both halves are always checked.
        let user_ok = self.matches(username, &self.username);
        let pass_ok = self.matches(password, &self.password);
        user_ok & pass_ok
    }

    fn matches(&self, supplied: &str, expected: &str) -> bool {
        let (Ok(mut expected_mac), Ok(mut supplied_mac)) = (
            HmacSha256::new_from_slice(&self.key),
            HmacSha256::new_from_slice(&self.key),
        ) else {
            return false;
        };
        expected_mac.update(expected.as_bytes());
        let expected_tag = expected_mac.finalize().into_bytes();
        supplied_mac.update(supplied.as_bytes());
        supplied_mac.verify_slice(&expected_tag).is_ok()
    }
}

#[derive(Clone)]
pub struct WebState {
    pub store: Arc<RecordStore>,
    pub auth: BasicAuth,
}

pub fn router(state: WebState) -> Router {
    Router::new().route("/", get(list_messages)).with_state(state)
}

pub async fn serve(config: &WebConfig, store: Arc<RecordStore>) -> Result<()> {
    let state = WebState {
        store,
        auth: BasicAuth::new(&config.username, &config.password, &config.realm),
    };
    if state.auth.username.is_empty() || state.auth.password.is_empty() {
        tracing::warn!("Web viewer has no credentials configured, every request will be rejected");
    }

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind web viewer to {}", config.bind))?;
    tracing::info!("{}", logs::web_listening(&config.bind));

    axum::serve(listener, router(state))
        .await
        .context("web viewer stopped")?;
    Ok(())
}

async fn list_messages(State(state): State<WebState>, headers: HeaderMap) -> Response {
    let authorized = headers
        .typed_get::<Authorization<Basic>>()
        .is_some_and(|creds| state.auth.verify(creds.username(), creds.password()));
    if !authorized {
        return unauthorized(&state.auth.realm);
    }

    match state.store.all_logged_messages() {
        Ok(messages) => Html(render_page(&messages)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Web viewer failed to read the archive");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read messages.\n").into_response()
        }
    }
}

fn unauthorized(realm: &str) -> Response {
    let mut response = (StatusCode::UNAUTHORIZED, "Unauthorised.\n").into_response();
    let challenge = format!("Basic realm=\"{}\"", realm.replace('"', "'"));
    if let Ok(value) = HeaderValue::from_str(&challenge) {
        response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
    }
    response
}

pub fn render_page(messages: &[LoggedMessage]) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Logged Messages</title></head>\n<body>\n<table>\n<tr><th>ID</th><th>Channel</th><th>Username</th><th>Message</th><th>Sent</th></tr>\n",
    );
    for m in messages {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            m.id,
            escape(&m.channel),
            escape(&m.username),
            escape(&m.message),
            m.sent_at.format("%Y-%m-%d %H:%M:%S"),
        ));
    }
    html.push_str("</table>\n</body>\n</html>\n");
    html
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
