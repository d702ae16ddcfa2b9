pub mod screen;

use crate::error::{RwError, RwResult};
use crate::post::repo::PostRepo;
use crate::post::{find_images_batched, image_of, PostId};
use crate::timestamp::Timestamptz;
use crate::user::auth::{Authenticate, Token};
use crate::user::repo::{Identity, UserRepo};
use crate::user::{viewer_of, UserId, Viewer};

use entrait::entrait_export as entrait;
use std::collections::HashSet;

/// Everything the profile screen renders.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub user_id: UserId,
    pub name: String,
    pub image: String,
    pub description: String,
    pub followers: Vec<FollowEntry>,
    pub followings: Vec<FollowEntry>,
    pub posts: Vec<PostTile>,
    pub liked_posts: Vec<PostTile>,
    pub viewer: Viewer,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FollowEntry {
    pub user_id: UserId,
    pub name: String,
    pub image: String,
    pub is_followed: bool,
}

impl FollowEntry {
    fn new(identity: Identity, is_followed: bool) -> Self {
        Self {
            user_id: identity.user_id,
            name: identity.name,
            image: identity.image,
            is_followed,
        }
    }
}

/// A cell of the post grid.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostTile {
    pub id: PostId,
    pub image_link: String,
    pub description: String,
    pub created_at: Option<Timestamptz>,
}

#[entrait(pub FetchProfileView, mock_api=FetchProfileViewMock)]
pub async fn fetch_profile_view(
    deps: &(impl Authenticate + UserRepo + PostRepo),
    token: Token,
    user_id: UserId,
) -> RwResult<ProfileView> {
    let current_user_id = deps.authenticate(token)?;

    let profile = deps
        .find_profile(user_id)
        .await?
        .ok_or(RwError::ProfileNotFound)?;

    let following_ids: HashSet<UserId> = profile
        .followings
        .iter()
        .map(|following| following.user_id)
        .collect();
    let followers = profile
        .followers
        .into_iter()
        .map(|follower| {
            let is_followed = following_ids.contains(&follower.user_id);
            FollowEntry::new(follower, is_followed)
        })
        .collect();
    // Everyone in a followings list is followed by definition.
    let followings = profile
        .followings
        .into_iter()
        .map(|following| FollowEntry::new(following, true))
        .collect();

    let description = profile.user.description.into_inner();

    let images = find_images_batched(deps, &profile.post_ids).await?;
    let posts = profile
        .post_ids
        .iter()
        .map(|post_id| PostTile {
            id: *post_id,
            image_link: image_of(&images, *post_id),
            description: description.clone(),
            created_at: None,
        })
        .collect();

    let liked = deps.find_liked_posts(user_id).await?;
    let liked_ids: Vec<PostId> = liked.iter().map(|post| post.post_id).collect();
    let liked_images = find_images_batched(deps, &liked_ids).await?;
    let liked_posts = liked
        .into_iter()
        .map(|post| PostTile {
            id: post.post_id,
            image_link: image_of(&liked_images, post.post_id),
            description: post.description,
            created_at: Some(post.created_at),
        })
        .collect();

    let viewer = viewer_of(deps, current_user_id).await?;

    Ok(ProfileView {
        user_id: profile.user.user_id,
        name: profile.user.name,
        image: profile.user.image,
        description,
        followers,
        followings,
        posts,
        liked_posts,
        viewer,
    })
}
