//! Avatar customization use-cases.

use crate::model::avatar::{AvatarConfig, AvatarSlot, InvalidAvatarOption};
use crate::model::user::User;
use crate::repo::kv_store::RepoError;
use crate::repo::profile_repo::ProfileRepository;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from avatar use-cases.
#[derive(Debug)]
pub enum AvatarError {
    InvalidOption(InvalidAvatarOption),
    Repo(RepoError),
}

impl Display for AvatarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidOption(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AvatarError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidOption(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<InvalidAvatarOption> for AvatarError {
    fn from(value: InvalidAvatarOption) -> Self {
        Self::InvalidOption(value)
    }
}

impl From<RepoError> for AvatarError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub struct AvatarService<R: ProfileRepository> {
    repo: R,
}

impl<R: ProfileRepository> AvatarService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Stored avatar, or the all-`none` default.
    pub fn load_avatar(&self, user: User) -> Result<AvatarConfig, AvatarError> {
        Ok(self.repo.load_avatar(user)?.unwrap_or_default())
    }

    pub fn save_avatar(&self, user: User, avatar: &AvatarConfig) -> Result<(), AvatarError> {
        avatar.validate()?;
        self.repo.save_avatar(user, avatar)?;
        info!("event=avatar_save module=avatar status=ok user={user}");
        Ok(())
    }

    /// Changes one slot and persists the result.
    pub fn set_option(
        &self,
        user: User,
        slot: AvatarSlot,
        value: &str,
    ) -> Result<AvatarConfig, AvatarError> {
        let mut avatar = self.load_avatar(user)?;
        avatar.set(slot, value)?;
        self.save_avatar(user, &avatar)?;
        Ok(avatar)
    }
}
