//! Authenticated session state.
//!
//! The current user lives in an [`AppContext`] that is passed explicitly to
//! every view that needs it. The credential survives restarts through a
//! [`SessionStore`]; the context reads it once on start-up and clears it on
//! logout.

use crate::error::SessionError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Role claim carried by the bearer credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// The role an admin switches a user to from the user table.
    pub fn toggled(&self) -> Role {
        match self {
            Role::User => Role::Admin,
            Role::Admin => Role::User,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The logged-in user as returned by the login and register endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Backend identifier of the user
    #[serde(rename = "_id")]
    pub id: String,

    pub username: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub role: Role,

    /// Bearer token sent with every authenticated request
    pub token: String,
}

/// Persistence for the credential between runs
pub trait SessionStore {
    fn load(&self) -> Result<Option<AuthUser>, SessionError>;
    fn save(&self, user: &AuthUser) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// Stores the credential as a JSON file
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<AuthUser>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save(&self, user: &AuthUser) -> Result<(), SessionError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(user)?;
        let mut file = File::create(&self.path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps the credential in memory only
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: RwLock<Option<AuthUser>>,
}

impl MemorySessionStore {
    pub fn with_user(user: AuthUser) -> Self {
        Self {
            slot: RwLock::new(Some(user)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<AuthUser>, SessionError> {
        Ok(self.slot.read().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, user: &AuthUser) -> Result<(), SessionError> {
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

/// Application-level session context
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppContext {
    user: Option<AuthUser>,
}

impl AppContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_user(user: AuthUser) -> Self {
        Self { user: Some(user) }
    }

    /// Start-up: read the persisted credential.
    ///
    /// A missing or unreadable credential yields an anonymous context; the
    /// reason is logged.
    pub fn init(store: &impl SessionStore) -> Self {
        match store.load() {
            Ok(Some(user)) => {
                debug!("restored session for {}", user.username);
                Self::with_user(user)
            }
            Ok(None) => Self::anonymous(),
            Err(e) => {
                warn!("ignoring persisted session: {}", e);
                Self::anonymous()
            }
        }
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.user
            .as_ref()
            .map(|u| u.token.as_str())
            .filter(|t| !t.is_empty())
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Persist `user` and make it the current user.
    pub fn sign_in(&mut self, store: &impl SessionStore, user: AuthUser) -> Result<(), SessionError> {
        store.save(&user)?;
        self.user = Some(user);
        Ok(())
    }

    /// Teardown: forget the current user and the persisted credential.
    ///
    /// The in-memory user is cleared even when the store fails.
    pub fn logout(&mut self, store: &impl SessionStore) -> Result<(), SessionError> {
        self.user = None;
        store.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AuthUser {
        AuthUser {
            id: "u1".into(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            role: Role::Admin,
            token: "tok".into(),
        }
    }

    #[test]
    fn file_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested/session.json"));
        assert_eq!(store.load().unwrap(), None);

        let mut ctx = AppContext::anonymous();
        ctx.sign_in(&store, alice()).unwrap();
        assert!(store.path().exists());

        let restored = AppContext::init(&store);
        assert_eq!(restored.user().unwrap().username, "alice");
        assert_eq!(restored.role(), Some(Role::Admin));

        ctx.logout(&store).unwrap();
        assert!(!ctx.is_authenticated());
        assert!(!store.path().exists());
        // clearing twice is fine
        ctx.logout(&store).unwrap();
    }

    #[test]
    fn corrupt_session_file_means_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        let store = FileSessionStore::new(&path);
        assert!(store.load().is_err());
        assert!(!AppContext::init(&store).is_authenticated());
    }

    #[test]
    fn empty_token_is_not_authenticated() {
        let mut user = alice();
        user.token.clear();
        let ctx = AppContext::with_user(user);
        assert!(ctx.user().is_some());
        assert_eq!(ctx.token(), None);
        assert!(!ctx.is_authenticated());
    }

    #[test]
    fn role_wire_format() {
        let user: AuthUser = serde_json::from_str(
            r#"{"_id":"u2","username":"bob","email":"b@x","role":"admin","token":"t"}"#,
        )
        .unwrap();
        assert_eq!(user.role, Role::Admin);
        let user: AuthUser =
            serde_json::from_str(r#"{"_id":"u3","username":"carol","token":"t"}"#).unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(Role::User.toggled(), Role::Admin);
    }

    #[test]
    fn memory_store() {
        let store = MemorySessionStore::default();
        assert!(!AppContext::init(&store).is_authenticated());
        store.save(&alice()).unwrap();
        assert!(AppContext::init(&store).is_authenticated());
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
