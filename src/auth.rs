use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

const AUTH_FILE_NAME: &str = ".studyplan-auth.json";

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub(crate) enum Role {
    #[serde(rename = "ROLE_MENTEE")]
    Mentee,
    #[serde(rename = "ROLE_MENTOR")]
    Mentor,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Mentee => write!(f, "mentee"),
            Role::Mentor => write!(f, "mentor"),
        }
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Role, ParseRoleError> {
        match s {
            "mentee" | "ROLE_MENTEE" => Ok(Role::Mentee),
            "mentor" | "ROLE_MENTOR" => Ok(Role::Mentor),
            _ => Err(ParseRoleError(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unknown role {0:?}; expected \"mentee\" or \"mentor\"")]
pub(crate) struct ParseRoleError(String);

/// The persisted login: who is signed in and as what
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthState {
    access_token: Option<String>,
    role: Option<Role>,
    is_authenticated: bool,
}

impl AuthState {
    pub(crate) fn signed_in(access_token: String, role: Role) -> AuthState {
        AuthState {
            access_token: Some(access_token),
            role: Some(role),
            is_authenticated: true,
        }
    }

    pub(crate) fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub(crate) fn role(&self) -> Option<Role> {
        self.role
    }
}

/// An `AuthState` backed by a JSON file, written through on every change
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct AuthStore {
    path: PathBuf,
    state: AuthState,
}

impl AuthStore {
    /// Reads the store at `path`.  A missing file means nobody is signed in.
    pub(crate) fn load(path: PathBuf) -> Result<AuthStore, AuthError> {
        let state = match fs::read_to_string(&path) {
            Ok(src) => serde_json::from_str(&src).map_err(|source| AuthError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => AuthState::default(),
            Err(source) => return Err(AuthError::Read { path, source }),
        };
        Ok(AuthStore { path, state })
    }

    pub(crate) fn state(&self) -> &AuthState {
        &self.state
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn set_auth(&mut self, access_token: String, role: Role) -> Result<(), AuthError> {
        self.state = AuthState::signed_in(access_token, role);
        self.persist()?;
        tracing::info!(%role, "signed in");
        Ok(())
    }

    pub(crate) fn logout(&mut self) -> Result<(), AuthError> {
        self.state = AuthState::default();
        self.persist()?;
        tracing::info!("signed out");
        Ok(())
    }

    fn persist(&self) -> Result<(), AuthError> {
        let src = serde_json::to_string_pretty(&self.state)?;
        fs::write(&self.path, src).map_err(|source| AuthError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Where the auth store lives when no `--auth-file` is given
pub(crate) fn default_auth_path() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(AUTH_FILE_NAME),
        None => PathBuf::from(AUTH_FILE_NAME),
    }
}

#[derive(Debug, Error)]
pub(crate) enum AuthError {
    #[error("failed to read auth file {}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write auth file {}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to parse auth file {}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize auth state")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_signed_out() {
        let dir = tempdir().unwrap();
        let store = AuthStore::load(dir.path().join("auth.json")).unwrap();
        assert!(!store.state().is_authenticated());
        assert_eq!(store.state().role(), None);
    }

    #[test]
    fn test_set_auth_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auth.json");
        let mut store = AuthStore::load(path.clone()).unwrap();
        store
            .set_auth(String::from("tok-123"), Role::Mentor)
            .unwrap();
        let src = fs::read_to_string(&path).unwrap();
        let json = serde_json::from_str::<serde_json::Value>(&src).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "accessToken": "tok-123",
                "role": "ROLE_MENTOR",
                "isAuthenticated": true,
            })
        );
        let reloaded = AuthStore::load(path).unwrap();
        assert_eq!(reloaded, store);
        assert_eq!(
            reloaded.state(),
            &AuthState::signed_in(String::from("tok-123"), Role::Mentor)
        );
    }

    #[test]
    fn test_logout_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auth.json");
        let mut store = AuthStore::load(path.clone()).unwrap();
        store.set_auth(String::from("t"), Role::Mentee).unwrap();
        store.logout().unwrap();
        let reloaded = AuthStore::load(path).unwrap();
        assert_eq!(reloaded.state(), &AuthState::default());
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auth.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            AuthStore::load(path),
            Err(AuthError::Parse { .. })
        ));
    }

    #[test]
    fn test_parse_role() {
        assert_eq!("mentee".parse::<Role>(), Ok(Role::Mentee));
        assert_eq!("ROLE_MENTOR".parse::<Role>(), Ok(Role::Mentor));
        assert!("admin".parse::<Role>().is_err());
    }
}
