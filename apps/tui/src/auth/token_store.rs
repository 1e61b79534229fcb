use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("failed to access token file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("token file {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Guest,
    User,
}

impl TokenKind {
    /// How long the backend honours a token of this kind.
    pub fn lifetime(self) -> Duration {
        match self {
            Self::Guest => Duration::days(1),
            Self::User => Duration::days(30),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::User => "user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    pub kind: TokenKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub issued_at: DateTime<Utc>,
}

impl StoredToken {
    pub fn guest(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            kind: TokenKind::Guest,
            email: None,
            issued_at: Utc::now(),
        }
    }

    pub fn user(token: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            kind: TokenKind::User,
            email: Some(email.into()),
            issued_at: Utc::now(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + self.kind.lifetime()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

/// A JSON file holding at most one session token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<StoredToken>, TokenStoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(self.io_error(source)),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| TokenStoreError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    pub fn save(&self, token: &StoredToken) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
            }
        }

        let json = serde_json::to_string_pretty(token).map_err(|source| {
            TokenStoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, json).map_err(|source| self.io_error(source))?;

        info!(path = %self.path.display(), kind = token.kind.label(), "saved session token");
        Ok(())
    }

    /// Removes the file. Clearing an absent token is not an error.
    pub fn clear(&self) -> Result<(), TokenStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "cleared session token");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    /// The token to attach to requests, if one is stored and still valid.
    /// Unreadable files count as no token.
    pub fn active_token(&self, now: DateTime<Utc>) -> Option<StoredToken> {
        match self.load() {
            Ok(Some(token)) if token.is_expired(now) => {
                debug!(kind = token.kind.label(), "stored token has expired");
                None
            }
            Ok(token) => token,
            Err(err) => {
                warn!(%err, "ignoring unreadable token file");
                None
            }
        }
    }

    fn io_error(&self, source: io::Error) -> TokenStoreError {
        TokenStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
