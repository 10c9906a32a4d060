//! Process-wide session store.
//!
//! Holds the bearer token written by the (external) authentication flow. The
//! token is read fresh on every call to [`Session::token`], so a logout is
//! observed by the next action that starts, never by one already in flight.
//!
//! The store is persisted to `session.toml` next to the config file. A
//! `BOOMFEED_TOKEN` environment variable overrides the file at load time.

use parking_lot::RwLock;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Environment variable that overrides the persisted token.
pub const TOKEN_ENV_VAR: &str = "BOOMFEED_TOKEN";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to access session file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid session file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to encode session: {0}")]
    Encode(#[from] toml::ser::Error),
}

#[derive(Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
}

#[derive(Default)]
struct SessionState {
    token: Option<SecretString>,
    user_id: Option<String>,
}

/// Shared handle to the current login session.
#[derive(Clone, Default)]
pub struct Session {
    state: Arc<RwLock<SessionState>>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Session")
            .field("token", &state.token.as_ref().map(|_| "[REDACTED]"))
            .field("user_id", &state.user_id)
            .field("path", &self.path)
            .finish()
    }
}

impl Session {
    /// A session that lives only in memory (tests, `--api-url` one-offs).
    pub fn in_memory(token: Option<&str>, user_id: Option<&str>) -> Self {
        let session = Self::default();
        {
            let mut state = session.state.write();
            state.token = token.map(|t| SecretString::from(t.to_owned()));
            state.user_id = user_id.map(str::to_owned);
        }
        session
    }

    /// Load the persisted session at `path`. A missing file is a logged-out session.
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let file = match std::fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => SessionFile::default(),
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No session file, starting logged out");
                SessionFile::default()
            }
            Err(e) => return Err(SessionError::Io(e)),
        };

        let env_token = std::env::var(TOKEN_ENV_VAR)
            .ok()
            .filter(|t| !t.trim().is_empty());
        if env_token.is_some() {
            tracing::info!("Using session token from {}", TOKEN_ENV_VAR);
        }

        let token = env_token.or(file.token).map(SecretString::from);
        Ok(Self {
            state: Arc::new(RwLock::new(SessionState {
                token,
                user_id: file.user_id,
            })),
            path: Some(path.to_path_buf()),
        })
    }

    /// The current bearer token, if logged in.
    pub fn token(&self) -> Option<SecretString> {
        self.state
            .read()
            .token
            .as_ref()
            .map(|t| SecretString::from(t.expose_secret().to_owned()))
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.read().token.is_some()
    }

    pub fn user_id(&self) -> Option<String> {
        self.state.read().user_id.clone()
    }

    /// Store a new token (and optionally the user id) and persist it.
    pub fn set(&self, token: &str, user_id: Option<&str>) -> Result<(), SessionError> {
        {
            let mut state = self.state.write();
            state.token = Some(SecretString::from(token.to_owned()));
            state.user_id = user_id.map(str::to_owned);
        }
        self.persist()
    }

    /// Forget the token and user id.
    pub fn clear(&self) -> Result<(), SessionError> {
        {
            let mut state = self.state.write();
            state.token = None;
            state.user_id = None;
        }
        match &self.path {
            Some(path) => match std::fs::remove_file(path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(SessionError::Io(e)),
            },
            None => Ok(()),
        }
    }

    fn persist(&self) -> Result<(), SessionError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let file = {
            let state = self.state.read();
            SessionFile {
                token: state.token.as_ref().map(|t| t.expose_secret().to_owned()),
                user_id: state.user_id.clone(),
            }
        };
        let content = toml::to_string(&file)?;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        // The token is a credential: user-only access from the moment the file exists
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut out = options.open(path)?;

        // `mode` only applies on creation; tighten a file left by an older run
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = out.set_permissions(std::fs::Permissions::from_mode(0o600)) {
                tracing::warn!(path = %path.display(), error = %e, "Failed to restrict session file permissions");
            }
        }
        out.write_all(content.as_bytes())?;

        tracing::info!(path = %path.display(), "Session saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("boomfeed_session_test_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join("session.toml")
    }

    #[test]
    fn test_in_memory_token_roundtrip() {
        let session = Session::in_memory(Some("abc"), Some("u1"));
        assert!(session.is_logged_in());
        assert_eq!(session.token().unwrap().expose_secret(), "abc");
        assert_eq!(session.user_id().as_deref(), Some("u1"));
    }

    #[test]
    fn test_clear_is_seen_by_next_read() {
        let session = Session::in_memory(Some("abc"), None);
        let other_handle = session.clone();
        session.clear().unwrap();
        assert!(other_handle.token().is_none());
        assert!(!other_handle.is_logged_in());
    }

    #[test]
    fn test_missing_file_is_logged_out() {
        let path = temp_path("missing");
        std::fs::remove_file(&path).ok();
        let session = Session::load(&path).unwrap();
        if std::env::var(TOKEN_ENV_VAR).is_err() {
            assert!(!session.is_logged_in());
        }
    }

    #[test]
    fn test_set_persists_and_reloads() {
        let path = temp_path("persist");
        let session = Session::load(&path).unwrap();
        session.set("persisted-token", Some("u42")).unwrap();

        let reloaded = Session::load(&path).unwrap();
        assert_eq!(reloaded.user_id().as_deref(), Some("u42"));
        if std::env::var(TOKEN_ENV_VAR).is_err() {
            assert_eq!(reloaded.token().unwrap().expose_secret(), "persisted-token");
        }

        reloaded.clear().unwrap();
        assert!(!path.exists());
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_user_only() {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_path("mode");
        std::fs::remove_file(&path).ok();
        let session = Session::load(&path).unwrap();
        session.set("secret-token", None).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        // A pre-existing world-readable file is tightened on the next write
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        session.set("rotated-token", None).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let path = temp_path("invalid");
        std::fs::write(&path, "token = [not toml").unwrap();
        assert!(matches!(Session::load(&path), Err(SessionError::Parse(_))));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_debug_masks_token() {
        let session = Session::in_memory(Some("super-secret"), None);
        let debug = format!("{:?}", session);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
