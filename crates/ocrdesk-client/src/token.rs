//! Persisted bearer token.
//!
//! One token is shared by every outgoing request of the process. It is read
//! from disk at startup, replaced by the login page and removed on logout or
//! when the backend answers 401.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Process-wide bearer token, optionally persisted to a file.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    inner: Arc<TokenStoreInner>,
}

#[derive(Debug, Default)]
struct TokenStoreInner {
    token: RwLock<Option<String>>,
    path: Option<PathBuf>,
}

impl TokenStore {
    /// Store that lives only in memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Store backed by `path`, loading whatever token is already there.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let token = match fs::read_to_string(&path) {
            Ok(content) => normalize(&content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e),
        };
        if token.is_some() {
            tracing::debug!(path = %path.display(), "Loaded persisted API token");
        }
        Ok(Self {
            inner: Arc::new(TokenStoreInner {
                token: RwLock::new(token),
                path: Some(path),
            }),
        })
    }

    /// Current token, if any.
    pub fn get(&self) -> Option<String> {
        self.inner
            .token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }

    /// Replace the token and persist it. Blank input clears the token instead.
    pub fn set(&self, token: &str) -> io::Result<()> {
        let Some(token) = normalize(token) else {
            return self.clear();
        };
        if let Some(path) = &self.inner.path {
            ensure_parent_dir(path)?;
            fs::write(path, &token)?;
        }
        *self.inner.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token);
        Ok(())
    }

    /// Forget the token in memory and on disk.
    pub fn clear(&self) -> io::Result<()> {
        *self.inner.token.write().unwrap_or_else(|e| e.into_inner()) = None;
        if let Some(path) = &self.inner.path {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Backing file, if persistent.
    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }
}

fn normalize(raw: &str) -> Option<String> {
    let token = raw.trim();
    let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn ensure_parent_dir(file_path: &Path) -> io::Result<()> {
    if let Some(parent) = file_path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
