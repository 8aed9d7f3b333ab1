//! Login and user-switching use-cases.
//!
//! # Responsibility
//! - Check a roster name + PIN pair and persist the active user.
//! - Gate the administrator-only "clear all data" action.
//!
//! # Invariants
//! - PINs are never logged.
//! - A stored `currentUser` outside the roster reads as logged out.

use crate::model::user::User;
use crate::repo::kv_store::{KvStore, RepoError};
use crate::repo::profile_repo::ProfileRepository;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static PIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").expect("valid pin regex"));

/// Errors from login/logout/admin use-cases.
#[derive(Debug)]
pub enum AuthError {
    /// No name was selected.
    MissingUsername,
    /// No PIN was entered.
    MissingPin,
    /// PIN is not exactly four digits.
    MalformedPin,
    UnknownUser(String),
    IncorrectPin(User),
    /// Administrator action attempted by someone else (or nobody).
    AdminRequired(Option<User>),
    Repo(RepoError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingUsername => write!(f, "please select your name"),
            Self::MissingPin => write!(f, "please enter your password"),
            Self::MalformedPin => write!(f, "password must be exactly 4 digits"),
            Self::UnknownUser(name) => write!(f, "unknown user `{name}`"),
            Self::IncorrectPin(_) => write!(f, "incorrect password"),
            Self::AdminRequired(_) => write!(
                f,
                "only the administrator can clear all data; log in as {} first",
                User::Maria
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Authentication service over key/value storage.
pub struct AuthService<S: KvStore> {
    store: S,
}

impl<S: KvStore> AuthService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Verifies `username` + `pin` and makes the user active.
    pub fn login(&self, username: &str, pin: &str) -> Result<User, AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::MissingUsername);
        }
        if pin.is_empty() {
            return Err(AuthError::MissingPin);
        }
        if !PIN_RE.is_match(pin) {
            return Err(AuthError::MalformedPin);
        }
        let user: User = username
            .parse()
            .map_err(|_| AuthError::UnknownUser(username.to_string()))?;
        if user.pin() != pin {
            warn!("event=login module=auth status=error user={user} error_code=incorrect_pin");
            return Err(AuthError::IncorrectPin(user));
        }

        self.store.save_current_user(user)?;
        info!("event=login module=auth status=ok user={user}");
        Ok(user)
    }

    /// Clears the active user.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.clear_current_user()?;
        info!("event=logout module=auth status=ok");
        Ok(())
    }

    /// Returns the active user, if any.
    pub fn current_user(&self) -> Result<Option<User>, AuthError> {
        let stored = self.store.load_current_user()?;
        Ok(stored.and_then(|name| match name.parse::<User>() {
            Ok(user) => Some(user),
            Err(err) => {
                warn!("event=current_user module=auth status=error error_code=unknown_user error={err}");
                None
            }
        }))
    }

    /// Removes every stored key. Administrator only.
    ///
    /// Returns the number of keys removed.
    pub fn clear_all_data(&self) -> Result<usize, AuthError> {
        let current = self.current_user()?;
        match current {
            Some(user) if user.is_admin() => {}
            other => return Err(AuthError::AdminRequired(other)),
        }
        let keys = self.store.get_all_keys()?;
        self.store.multi_remove(&keys)?;
        info!(
            "event=clear_all_data module=auth status=ok removed_keys={}",
            keys.len()
        );
        Ok(keys.len())
    }
}
