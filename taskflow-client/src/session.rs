use serde::{Deserialize, Serialize};
use shared_types::{LoginResponse, RegisterResponse};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{ClientError, Result};

/// The signed-in user and the bearer token sent with every call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: RegisterResponse,
    pub access_token: String,
}

impl Session {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Self {
            user: response.user,
            access_token: response.access_token,
        }
    }
}

/// JSON file holding at most one [`Session`]
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open_default() -> Result<Self> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| ClientError::Config("Could not find local data directory".to_string()))?;
        Ok(Self::new(data_dir.join("taskflow").join("session.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<Session>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Like [`load`](Self::load) but a missing session is an error
    pub fn require(&self) -> Result<Session> {
        self.load()?.ok_or(ClientError::NotAuthenticated)
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            user: RegisterResponse {
                id: Uuid::new_v4(),
                email: "ada@example.com".to_string(),
                message: "Login successful".to_string(),
            },
            access_token: "token".to_string(),
        }
    }

    #[test]
    fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));

        assert_eq!(store.load().unwrap(), None);

        let session = session();
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session.clone()));
        assert_eq!(store.require().unwrap().user_id(), session.user.id);

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn test_require_without_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));

        let err = store.require().unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
        assert_eq!(err.to_string(), "User not authenticated");
    }

    #[test]
    fn test_corrupt_file_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let err = SessionStore::new(path).load().unwrap_err();
        assert!(matches!(err, ClientError::Json(_)));
    }
}
