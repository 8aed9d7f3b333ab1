//! Session, tutorial and avatar persistence.
//!
//! # Invariants
//! - `currentUser` holds the raw roster name of the logged-in user.
//! - `tutorialShown` is considered set only when it equals `"true"`.

use crate::model::avatar::AvatarConfig;
use crate::model::user::User;
use crate::repo::kv_store::{KvStore, RepoResult};

pub const CURRENT_USER_KEY: &str = "currentUser";
pub const TUTORIAL_SHOWN_KEY: &str = "tutorialShown";

/// Storage key for one user's avatar.
pub fn avatar_key(user: User) -> String {
    format!("avatar_{}", user.name())
}

/// Repository interface for profile-level state.
pub trait ProfileRepository {
    fn load_current_user(&self) -> RepoResult<Option<String>>;
    fn save_current_user(&self, user: User) -> RepoResult<()>;
    fn clear_current_user(&self) -> RepoResult<()>;
    fn tutorial_shown(&self) -> RepoResult<bool>;
    fn set_tutorial_shown(&self, shown: bool) -> RepoResult<()>;
    fn load_avatar(&self, user: User) -> RepoResult<Option<AvatarConfig>>;
    fn save_avatar(&self, user: User, avatar: &AvatarConfig) -> RepoResult<()>;
}

impl<S: KvStore> ProfileRepository for S {
    fn load_current_user(&self) -> RepoResult<Option<String>> {
        self.get_item(CURRENT_USER_KEY)
    }

    fn save_current_user(&self, user: User) -> RepoResult<()> {
        self.set_item(CURRENT_USER_KEY, user.name())
    }

    fn clear_current_user(&self) -> RepoResult<()> {
        self.remove_item(CURRENT_USER_KEY)
    }

    fn tutorial_shown(&self) -> RepoResult<bool> {
        Ok(self.get_item(TUTORIAL_SHOWN_KEY)?.as_deref() == Some("true"))
    }

    fn set_tutorial_shown(&self, shown: bool) -> RepoResult<()> {
        if shown {
            self.set_item(TUTORIAL_SHOWN_KEY, "true")
        } else {
            self.remove_item(TUTORIAL_SHOWN_KEY)
        }
    }

    fn load_avatar(&self, user: User) -> RepoResult<Option<AvatarConfig>> {
        self.get_json(&avatar_key(user))
    }

    fn save_avatar(&self, user: User, avatar: &AvatarConfig) -> RepoResult<()> {
        self.set_json(&avatar_key(user), avatar)
    }
}
