pub mod auth;
pub mod description;
pub mod repo;

use auth::{Authenticate, Token};
use description::Description;

use crate::error::{RwError, RwResult};

use entrait::entrait_export as entrait;
use uuid::Uuid;

#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user as listed in search results.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub image: String,
    pub description: String,
}

impl From<repo::User> for UserSummary {
    fn from(user: repo::User) -> Self {
        Self {
            id: user.user_id,
            name: user.name,
            image: user.image,
            description: user.description.into_inner(),
        }
    }
}

/// The signed-in caller's own minimal identity.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Viewer {
    pub user_id: UserId,
    pub name: String,
    pub image: String,
    pub followings: Vec<UserId>,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FollowStatus {
    pub user_id: UserId,
    pub following: bool,
}

#[entrait(pub FetchViewer, mock_api=FetchViewerMock)]
pub async fn fetch_viewer(
    deps: &(impl Authenticate + repo::UserRepo),
    token: Token,
) -> RwResult<Viewer> {
    let current_user_id = deps.authenticate(token)?;
    viewer_of(deps, current_user_id).await
}

pub(crate) async fn viewer_of(deps: &impl repo::UserRepo, user_id: UserId) -> RwResult<Viewer> {
    // Neither lookup depends on the other.
    let (identity, followings) = futures::try_join!(
        deps.find_identity(user_id),
        deps.list_following_ids(user_id)
    )?;
    let identity = identity.ok_or(RwError::CurrentUserDoesNotExist)?;

    Ok(Viewer {
        user_id: identity.user_id,
        name: identity.name,
        image: identity.image,
        followings,
    })
}

#[entrait(pub UpdateDescription, mock_api=UpdateDescriptionMock)]
pub async fn update_description(
    deps: &(impl Authenticate + repo::UserRepo),
    token: Token,
    description: String,
) -> RwResult<Description> {
    let current_user_id = deps.authenticate(token)?;
    let description = Description::try_from(description)?;

    deps.set_description(current_user_id, &description).await?;

    Ok(description)
}

#[entrait(pub Follow, mock_api=FollowMock)]
pub async fn follow(
    deps: &(impl Authenticate + repo::UserRepo),
    token: Token,
    user_id: UserId,
    value: bool,
) -> RwResult<FollowStatus> {
    let current_user_id = deps.authenticate(token)?;
    if value {
        if current_user_id == user_id {
            return Err(RwError::Forbidden);
        }
        deps.insert_follow(current_user_id, user_id).await?;
    } else {
        deps.delete_follow(current_user_id, user_id).await?;
    }

    // Report what the store says, not what was asked for.
    let repo::Following(following) = deps.is_following(current_user_id, user_id).await?;

    Ok(FollowStatus { user_id, following })
}

#[cfg(test)]
mod tests {
    use super::auth::authenticate::AuthenticateMock;
    use super::repo::UserRepoMock;
    use super::*;

    use assert_matches::*;
    use unimock::*;

    fn me() -> UserId {
        UserId(Uuid::parse_str("20a626ba-c7d3-44c7-981a-e880f81c126f").unwrap())
    }

    fn other() -> UserId {
        UserId(Uuid::parse_str("5d2b8f3a-04d6-4b8e-a6df-2a0bb5cbb7f1").unwrap())
    }

    fn mock_authenticate() -> impl unimock::Clause {
        AuthenticateMock::authenticate
            .next_call(matching!(_))
            .returns(Ok(me()))
    }

    #[tokio::test]
    async fn description_over_limit_is_rejected_before_persistence() {
        // No `set_description` clause: calling it would panic.
        let deps = Unimock::new(mock_authenticate());

        assert_matches!(
            update_description(&deps, Token::from_token("t"), "x".repeat(251)).await,
            Err(RwError::DescriptionTooLong)
        );
    }

    #[tokio::test]
    async fn description_at_limit_is_persisted() {
        let deps = Unimock::new((
            mock_authenticate(),
            UserRepoMock::set_description
                .next_call(matching!(UserId(_), _))
                .returns(Ok(())),
        ));

        let description = update_description(&deps, Token::from_token("t"), "x".repeat(250))
            .await
            .unwrap();
        assert_eq!(250, description.as_ref().len());
    }

    #[tokio::test]
    async fn following_twice_returns_to_the_starting_state() {
        let deps = Unimock::new((
            mock_authenticate(),
            UserRepoMock::insert_follow
                .next_call(matching!(_, _))
                .returns(Ok(())),
            UserRepoMock::is_following
                .next_call(matching!(_, _))
                .returns(Ok(repo::Following(true))),
            mock_authenticate(),
            UserRepoMock::delete_follow
                .next_call(matching!(_, _))
                .returns(Ok(())),
            UserRepoMock::is_following
                .next_call(matching!(_, _))
                .returns(Ok(repo::Following(false))),
        ));

        let followed = follow(&deps, Token::from_token("t"), other(), true)
            .await
            .unwrap();
        assert!(followed.following);

        let unfollowed = follow(&deps, Token::from_token("t"), other(), false)
            .await
            .unwrap();
        assert!(!unfollowed.following);
        assert_eq!(other(), unfollowed.user_id);
    }

    #[tokio::test]
    async fn following_yourself_is_forbidden() {
        let deps = Unimock::new(mock_authenticate());

        assert_matches!(
            follow(&deps, Token::from_token("t"), me(), true).await,
            Err(RwError::Forbidden)
        );
    }

    #[tokio::test]
    async fn viewer_combines_identity_and_followings() {
        let deps = Unimock::new((
            mock_authenticate(),
            UserRepoMock::find_identity
                .next_call(matching!(_))
                .returns(Ok(Some(repo::Identity {
                    user_id: me(),
                    name: "Me".to_string(),
                    image: "https://img/me".to_string(),
                }))),
            UserRepoMock::list_following_ids
                .next_call(matching!(_))
                .returns(Ok(vec![other()])),
        ));

        let viewer = fetch_viewer(&deps, Token::from_token("t")).await.unwrap();

        assert_eq!(me(), viewer.user_id);
        assert_eq!(vec![other()], viewer.followings);
    }
}
