use entrait::entrait_export as entrait;

use super::{ImageLink, PostId};
use crate::error::RwResult;
use crate::search::SearchPattern;
use crate::timestamp::Timestamptz;
use crate::user::UserId;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Post {
    pub post_id: PostId,
    pub user_id: UserId,
    pub description: String,
    pub image_link: String,
    pub created_at: Timestamptz,
}

#[entrait(PostRepoImpl, delegate_by = DelegatePostRepo, mock_api = PostRepoMock)]
pub trait PostRepo {
    /// Case-insensitive match of `pattern` anywhere in the description, in storage order.
    async fn find_posts_by_description(&self, pattern: &SearchPattern) -> RwResult<Vec<Post>>;

    /// One pair per known post. Unknown ids are left out.
    async fn find_images(&self, post_ids: &[PostId]) -> RwResult<Vec<ImageLink>>;

    async fn find_liked_posts(&self, user_id: UserId) -> RwResult<Vec<Post>>;
}
