//! Shared-secret authentication.
//!
//! The token travels as a `?token=` query parameter. A single
//! [`TokenAuthority`] is established at startup and decides, per request,
//! whether the caller may see the page or reach the dispatcher.

use axum::extract::{Query, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use ifw_core::config::ProfileStore;
use ifw_core::error::{IfwError, Result};
use rand::Rng;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Generate a random 64-character hex token from 32 bytes of entropy.
pub fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// Compare two byte strings without short-circuiting on the first mismatch.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b) {
        diff |= x ^ y;
    }
    diff == 0
}

/// How long a token lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkMode {
    /// Fresh token per process, never written anywhere.
    #[default]
    Ephemeral,
    /// Token persisted in the profile and reused across runs.
    Permanent {
        /// Replace the stored token with a new one.
        refresh: bool,
    },
}

impl LinkMode {
    pub fn is_permanent(&self) -> bool {
        matches!(self, LinkMode::Permanent { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing token")]
    Missing,
    #[error("invalid token")]
    Invalid,
}

impl From<AuthError> for IfwError {
    fn from(err: AuthError) -> Self {
        IfwError::Auth(err.to_string())
    }
}

/// Process-wide token state.
pub struct TokenAuthority {
    token: Option<String>,
    link: LinkMode,
    first_run: bool,
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("enforced", &self.token.is_some())
            .field("link", &self.link)
            .field("first_run", &self.first_run)
            .finish()
    }
}

impl TokenAuthority {
    /// Decide the token for this process.
    ///
    /// With `enforce` off every request passes and `link` is ignored. In
    /// permanent mode a stored token is reused unless `refresh` is set; a new
    /// one is written back through `store`.
    pub fn establish(enforce: bool, link: LinkMode, store: &mut dyn ProfileStore) -> Result<Self> {
        if !enforce {
            tracing::warn!("Security token disabled, every request will be accepted");
            return Ok(Self {
                token: None,
                link: LinkMode::Ephemeral,
                first_run: false,
            });
        }

        match link {
            LinkMode::Ephemeral => {
                tracing::info!("Generated ephemeral token");
                Ok(Self {
                    token: Some(generate_token()),
                    link,
                    first_run: false,
                })
            }
            LinkMode::Permanent { refresh } => {
                let stored = if refresh { None } else { store.stored_token() };
                match stored {
                    Some(token) => {
                        tracing::info!("Reusing permanent token");
                        Ok(Self {
                            token: Some(token),
                            link,
                            first_run: false,
                        })
                    }
                    None => {
                        let token = generate_token();
                        store.persist_token(&token)?;
                        tracing::info!(refresh, "Generated and stored permanent token");
                        Ok(Self {
                            token: Some(token),
                            link,
                            first_run: true,
                        })
                    }
                }
            }
        }
    }

    /// Authority with a fixed token, or none.
    pub fn with_token(token: Option<String>, link: LinkMode) -> Self {
        Self {
            token,
            link,
            first_run: false,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn enforced(&self) -> bool {
        self.token.is_some()
    }

    pub fn link(&self) -> LinkMode {
        self.link
    }

    /// A permanent token was created during this startup.
    pub fn first_run(&self) -> bool {
        self.first_run
    }

    /// Whether `GET /` needs the token. Permanent links serve the page bare.
    pub fn page_requires_token(&self) -> bool {
        self.enforced() && !self.link.is_permanent()
    }

    /// Check a request token.
    pub fn verify(&self, candidate: Option<&str>) -> std::result::Result<(), AuthError> {
        let Some(expected) = self.token.as_deref() else {
            return Ok(());
        };
        let candidate = candidate.ok_or(AuthError::Missing)?;
        if constant_time_eq(candidate.as_bytes(), expected.as_bytes()) {
            Ok(())
        } else {
            Err(AuthError::Invalid)
        }
    }

    /// Check a page request, honouring the permanent-link exemption.
    pub fn verify_page(&self, candidate: Option<&str>) -> std::result::Result<(), AuthError> {
        if self.page_requires_token() {
            self.verify(candidate)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn query_token(req: &Request) -> Option<String> {
    Query::<TokenQuery>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(q)| q.token)
}

/// Middleware guarding routes that reach the dispatcher.
///
/// Returns 403 if the token is missing or wrong; the handler is never run.
pub async fn require_token(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let token = query_token(&req);
    match state.authority.verify(token.as_deref()) {
        Ok(()) => next.run(req).await,
        Err(e) => {
            tracing::warn!(path = %req.uri().path(), reason = %e, "Rejected request");
            ApiError::from(e).into_response()
        }
    }
}

/// Middleware guarding the editing page.
pub async fn require_page_token(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let token = query_token(&req);
    match state.authority.verify_page(token.as_deref()) {
        Ok(()) => next.run(req).await,
        Err(e) => {
            tracing::warn!(path = %req.uri().path(), reason = %e, "Rejected page request");
            ApiError::from(e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifw_core::config::MemoryStore;

    #[test]
    fn test_generate_token_shape() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn test_ephemeral_requires_token_everywhere() {
        let mut store = MemoryStore::default();
        let auth = TokenAuthority::establish(true, LinkMode::Ephemeral, &mut store).unwrap();
        let token = auth.token().unwrap().to_string();

        assert_eq!(store.writes, 0);
        assert!(auth.page_requires_token());
        assert!(!auth.first_run());
        assert_eq!(auth.verify(None), Err(AuthError::Missing));
        assert_eq!(auth.verify(Some("nope")), Err(AuthError::Invalid));
        assert_eq!(auth.verify(Some(&token)), Ok(()));
        assert_eq!(auth.verify_page(None), Err(AuthError::Missing));
    }

    #[test]
    fn test_permanent_first_run_persists() {
        let mut store = MemoryStore::default();
        let auth =
            TokenAuthority::establish(true, LinkMode::Permanent { refresh: false }, &mut store)
                .unwrap();
        assert!(auth.first_run());
        assert_eq!(store.writes, 1);
        assert_eq!(store.token.as_deref(), auth.token());
        assert!(!auth.page_requires_token());
        assert_eq!(auth.verify_page(None), Ok(()));
        assert_eq!(auth.verify(None), Err(AuthError::Missing));
    }

    #[test]
    fn test_permanent_subsequent_run_reuses() {
        let mut store = MemoryStore::with_token("stored-token");
        let auth =
            TokenAuthority::establish(true, LinkMode::Permanent { refresh: false }, &mut store)
                .unwrap();
        assert!(!auth.first_run());
        assert_eq!(store.writes, 0);
        assert_eq!(auth.token(), Some("stored-token"));
        assert_eq!(auth.verify(Some("stored-token")), Ok(()));
    }

    #[test]
    fn test_permanent_refresh_replaces() {
        let mut store = MemoryStore::with_token("old-token");
        let auth =
            TokenAuthority::establish(true, LinkMode::Permanent { refresh: true }, &mut store)
                .unwrap();
        assert!(auth.first_run());
        assert_eq!(store.writes, 1);
        assert_ne!(auth.token(), Some("old-token"));
        assert_eq!(auth.verify(Some("old-token")), Err(AuthError::Invalid));
    }

    #[test]
    fn test_disabled_accepts_everything() {
        let mut store = MemoryStore::with_token("stored");
        let auth =
            TokenAuthority::establish(false, LinkMode::Permanent { refresh: true }, &mut store)
                .unwrap();
        assert!(!auth.enforced());
        assert_eq!(store.writes, 0);
        assert_eq!(auth.link(), LinkMode::Ephemeral);
        assert_eq!(auth.verify(None), Ok(()));
        assert_eq!(auth.verify(Some("anything")), Ok(()));
        assert_eq!(auth.verify_page(None), Ok(()));
    }

    #[test]
    fn test_debug_hides_token() {
        let auth = TokenAuthority::with_token(Some("secret-value".into()), LinkMode::Ephemeral);
        assert!(!format!("{:?}", auth).contains("secret-value"));
    }
}
