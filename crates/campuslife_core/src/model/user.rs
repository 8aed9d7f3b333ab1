//! User roster model.
//!
//! # Responsibility
//! - Define the closed set of app users and their fixed PINs.
//!
//! # Invariants
//! - Users are static; there is no create/delete lifecycle.
//! - Exactly one user (`Maria`) holds the administrator role.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One of the fixed app users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum User {
    Maria,
    Reni,
    Luna,
    Sheila,
}

impl User {
    /// Every user in roster order.
    pub const ALL: [User; 4] = [User::Maria, User::Reni, User::Luna, User::Sheila];

    /// Display and storage name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Maria => "Maria",
            Self::Reni => "Reni",
            Self::Luna => "Luna",
            Self::Sheila => "Sheila",
        }
    }

    /// Hard-coded 4-digit PIN. Compared in plaintext.
    pub fn pin(self) -> &'static str {
        match self {
            Self::Maria => "0919",
            Self::Reni => "0312",
            Self::Luna => "0924",
            Self::Sheila => "9012",
        }
    }

    /// Whether this user may run administrator actions such as clearing all data.
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Maria)
    }
}

impl Display for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for names outside the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownUser(pub String);

impl Display for UnknownUser {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown user `{}`", self.0)
    }
}

impl std::error::Error for UnknownUser {}

impl FromStr for User {
    type Err = UnknownUser;

    /// Parses a roster name, ignoring surrounding whitespace and ASCII case.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        User::ALL
            .into_iter()
            .find(|user| user.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownUser(trimmed.to_string()))
    }
}
