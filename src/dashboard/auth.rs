use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use thiserror::Error;

const USERNAME: &str = "admin";
const PASSWORD: &str = "admin123";

/// Shown on the login screen.
pub const CREDENTIALS_HINT: &str = "Hint: admin / admin123";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error("Invalid username or password")]
    InvalidCredentials,
}

pub fn check_credentials(username: &str, password: &str) -> Result<(), LoginError> {
    if username == USERNAME && password == PASSWORD {
        Ok(())
    } else {
        Err(LoginError::InvalidCredentials)
    }
}

/// Remembers the logged-in username between runs in a single file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> anyhow::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let username = contents.trim();
                Ok((!username.is_empty()).then(|| username.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading session {}", self.path.display())),
        }
    }

    pub fn save(&self, username: &str) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        std::fs::write(&self.path, username)
            .with_context(|| format!("writing session {}", self.path.display()))
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing session {}", self.path.display())),
        }
    }
}
