// Login session: the bearer token plus the identity claims it carries, and
// on-disk persistence of the token between runs.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use squad_core::team::UserId;

use crate::config::SessionConfig;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("malformed session token: {0}")]
    MalformedToken(String),

    #[error("session file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    Student,
    Teacher,
}

impl UserType {
    pub fn label(&self) -> &'static str {
        match self {
            UserType::Student => "student",
            UserType::Teacher => "teacher",
        }
    }
}

/// Identity fields read from the token payload. The signature is not checked
/// here; the backend verifies every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: UserId,
    pub name: String,
    #[serde(default)]
    pub house: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub email: Option<String>,
    /// Standard expiry, seconds since the epoch. Absent on long-lived tokens.
    #[serde(default)]
    pub exp: Option<i64>,
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|at| at <= now)
    }
}

/// Decode the payload segment of a JWT.
pub fn decode_claims(token: &str) -> Result<Claims, SessionError> {
    let mut parts = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_sig), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(SessionError::MalformedToken(
            "expected three dot-separated segments".into(),
        ));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| SessionError::MalformedToken(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| SessionError::MalformedToken(format!("payload is not valid claims: {e}")))
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The authenticated context handed to everything that talks to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    claims: Claims,
}

impl Session {
    pub fn from_token(token: impl Into<String>) -> Result<Self, SessionError> {
        let token = token.into();
        let claims = decode_claims(&token)?;
        Ok(Session { token, claims })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn user_id(&self) -> UserId {
        self.claims.user_id
    }

    pub fn is_admin(&self) -> bool {
        self.claims.is_admin
    }

    pub fn display_name(&self) -> &str {
        &self.claims.name
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Stores the raw token in a single file. A store without a path keeps
/// nothing, which is how `session.persist = false` is honoured.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: Option<PathBuf>,
}

impl SessionStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        SessionStore {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        SessionStore { path: None }
    }

    /// `<platform data dir>/session.token`, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "squad", "squad").map(|dirs| dirs.data_dir().join("session.token"))
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        if !config.persist {
            return SessionStore::disabled();
        }
        match SessionStore::default_path() {
            Some(path) => SessionStore::at(path),
            None => {
                info!("no platform data directory, session will not persist");
                SessionStore::disabled()
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read the saved session. Missing files and expired tokens yield `None`.
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        let Some(path) = &self.path else {
            return Ok(None);
        };
        let token = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SessionError::Io {
                    path: path.clone(),
                    source,
                })
            }
        };

        let session = Session::from_token(token.trim())?;
        if session.claims().is_expired(Utc::now()) {
            info!("saved session has expired");
            return Ok(None);
        }
        debug!(user_id = session.user_id(), "restored saved session");
        Ok(Some(session))
    }

    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let io_err = |source| SessionError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, session.token()).map_err(io_err)?;
        debug!(path = %path.display(), "session saved");
        Ok(())
    }

    /// Forget the saved token (logout).
    pub fn clear(&self) -> Result<(), SessionError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::Io {
                path: path.clone(),
                source,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// Build an unsigned token around `claims`, for tests here and in the other
/// modules.
#[cfg(test)]
pub(crate) fn test_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2ln")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    #[test]
    fn decodes_backend_claims() {
        let token = test_token(&json!({"user_id": 7, "name": "Asha", "house": "Tata"}));
        let session = Session::from_token(token).unwrap();
        assert_eq!(session.user_id(), 7);
        assert_eq!(session.display_name(), "Asha");
        assert_eq!(session.claims().house.as_deref(), Some("Tata"));
        assert!(!session.is_admin());
    }

    #[test]
    fn decodes_admin_flag() {
        let token = test_token(&json!({"user_id": 1, "name": "Admin", "is_admin": true}));
        assert!(Session::from_token(token).unwrap().is_admin());
    }

    #[test]
    fn rejects_wrong_segment_count() {
        assert!(matches!(
            decode_claims("abc.def"),
            Err(SessionError::MalformedToken(_))
        ));
        assert!(decode_claims("a.b.c.d").is_err());
    }

    #[test]
    fn rejects_non_json_payload() {
        let payload = URL_SAFE_NO_PAD.encode("not json");
        assert!(decode_claims(&format!("h.{payload}.s")).is_err());
    }

    #[test]
    fn expiry_is_checked_against_now() {
        let claims = Claims {
            user_id: 1,
            name: "x".into(),
            house: None,
            is_admin: false,
            email: None,
            exp: Some(1_000),
        };
        assert!(claims.is_expired(Utc::now()));

        let no_exp = Claims { exp: None, ..claims };
        assert!(!no_exp.is_expired(Utc::now()));
    }

    #[test]
    fn store_round_trip_and_clear() {
        let dir = std::env::temp_dir().join("squad_session_test_store");
        let _ = fs::remove_dir_all(&dir);
        let store = SessionStore::at(dir.join("nested/session.token"));

        assert!(store.load().unwrap().is_none());

        let session =
            Session::from_token(test_token(&json!({"user_id": 3, "name": "Ravi"}))).unwrap();
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        // Clearing twice is fine.
        store.clear().unwrap();

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn store_drops_expired_session() {
        let dir = std::env::temp_dir().join("squad_session_test_expired");
        let _ = fs::remove_dir_all(&dir);
        let store = SessionStore::at(dir.join("session.token"));
        let token = test_token(&json!({"user_id": 3, "name": "Ravi", "exp": 1000}));
        store.save(&Session::from_token(token).unwrap()).unwrap();

        assert!(store.load().unwrap().is_none());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn disabled_store_keeps_nothing() {
        let store = SessionStore::from_config(&SessionConfig { persist: false });
        assert!(store.path().is_none());
        let session = Session::from_token(test_token(&json!({"user_id": 1, "name": "a"}))).unwrap();
        store.save(&session).unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
