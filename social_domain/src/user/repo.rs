use entrait::entrait_export as entrait;

use super::description::Description;
use crate::error::RwResult;
use crate::post::PostId;
use crate::user::UserId;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct User {
    pub user_id: UserId,
    pub name: String,
    pub image: String,
    pub description: Description,
}

/// The minimal identity of a user, as shown in follower lists.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Identity {
    pub user_id: UserId,
    pub name: String,
    pub image: String,
}

/// Result of the aggregate profile fetch.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProfileRecord {
    pub user: User,
    pub followers: Vec<Identity>,
    pub followings: Vec<Identity>,
    /// Owned posts, oldest first.
    pub post_ids: Vec<PostId>,
}

#[derive(Debug, Eq, PartialEq)]
pub struct Following(pub bool);

#[entrait(UserRepoImpl, delegate_by = DelegateUserRepo, mock_api = UserRepoMock)]
pub trait UserRepo {
    async fn find_profile(&self, user_id: UserId) -> RwResult<Option<ProfileRecord>>;

    async fn find_identity(&self, user_id: UserId) -> RwResult<Option<Identity>>;

    async fn list_users(&self) -> RwResult<Vec<User>>;

    async fn list_following_ids(&self, user_id: UserId) -> RwResult<Vec<UserId>>;

    async fn is_following(&self, follower: UserId, followed: UserId) -> RwResult<Following>;

    async fn set_description(&self, user_id: UserId, description: &Description) -> RwResult<()>;

    /// Idempotent: an existing edge is left alone.
    async fn insert_follow(&self, follower: UserId, followed: UserId) -> RwResult<()>;

    /// Idempotent: removing a missing edge succeeds.
    async fn delete_follow(&self, follower: UserId, followed: UserId) -> RwResult<()>;
}
