pub mod image;
pub mod repo;

use crate::error::RwResult;
use crate::timestamp::Timestamptz;
use crate::user::auth::{Authenticate, Token};
use crate::user::UserId;
use repo::PostRepo;

use entrait::entrait_export as entrait;
use itertools::Itertools;
use uuid::Uuid;

#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct PostId(pub Uuid);

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub creator: UserId,
    pub description: String,
    pub image_link: String,
    pub created_at: Timestamptz,
}

impl From<repo::Post> for Post {
    fn from(q: repo::Post) -> Self {
        Self {
            id: q.post_id,
            creator: q.user_id,
            description: q.description,
            image_link: q.image_link,
            created_at: q.created_at,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageLink {
    pub post_id: PostId,
    pub image_link: String,
}

#[entrait(pub ResolveImages, mock_api=ResolveImagesMock)]
pub async fn resolve_images(
    deps: &(impl Authenticate + PostRepo),
    token: Token,
    post_ids: Vec<PostId>,
) -> RwResult<Vec<ImageLink>> {
    deps.authenticate(token)?;
    find_images_batched(deps, &post_ids).await
}

/// Resolve images for a batch of posts in a single store call, skipping the call for an empty batch.
pub(crate) async fn find_images_batched(
    deps: &impl PostRepo,
    post_ids: &[PostId],
) -> RwResult<Vec<ImageLink>> {
    if post_ids.is_empty() {
        return Ok(vec![]);
    }
    let unique_ids = post_ids.iter().copied().unique().collect_vec();
    deps.find_images(&unique_ids).await
}

/// Image of a post within a resolved batch, or `""` when the batch has none for it.
pub(crate) fn image_of(images: &[ImageLink], post_id: PostId) -> String {
    images
        .iter()
        .find(|image| image.post_id == post_id)
        .map(|image| image.image_link.clone())
        .unwrap_or_default()
}
