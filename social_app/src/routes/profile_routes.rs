use social_domain::error::RwResult;
use social_domain::post::{ImageLink, PostId};
use social_domain::profile::ProfileView;
use social_domain::user::auth::Token;
use social_domain::user::{FollowStatus, UserId, Viewer};

use axum::extract::{Extension, Path};
use axum::routing::{get, post, put};
use axum::Json;

#[derive(serde::Serialize, serde::Deserialize, Debug)]
struct ProfileBody {
    profile: ProfileView,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
struct FollowBody {
    follow: FollowStatus,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
struct ViewerBody {
    user: Viewer,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
struct DescriptionBody {
    description: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ImagesBody {
    post_ids: Vec<PostId>,
}

pub struct ProfileRoutes<D>(std::marker::PhantomData<D>);

impl<D> ProfileRoutes<D>
where
    D: social_domain::profile::FetchProfileView
        + social_domain::user::Follow
        + social_domain::user::UpdateDescription
        + social_domain::user::FetchViewer
        + social_domain::post::ResolveImages
        + Sized
        + Clone
        + Send
        + Sync
        + 'static,
{
    pub fn router() -> axum::Router {
        axum::Router::new()
            .route("/profiles/:user_id", get(Self::get_profile))
            .route(
                "/profiles/:user_id/follow",
                post(Self::follow_user).delete(Self::unfollow_user),
            )
            .route("/user", get(Self::current_viewer))
            .route("/user/description", put(Self::update_description))
            .route("/images", post(Self::resolve_images))
    }

    async fn get_profile(
        Extension(deps): Extension<D>,
        token: Token,
        Path(user_id): Path<UserId>,
    ) -> RwResult<Json<ProfileBody>> {
        Ok(Json(ProfileBody {
            profile: deps.fetch_profile_view(token, user_id).await?,
        }))
    }

    async fn follow_user(
        Extension(deps): Extension<D>,
        token: Token,
        Path(user_id): Path<UserId>,
    ) -> RwResult<Json<FollowBody>> {
        Ok(Json(FollowBody {
            follow: deps.follow(token, user_id, true).await?,
        }))
    }

    async fn unfollow_user(
        Extension(deps): Extension<D>,
        token: Token,
        Path(user_id): Path<UserId>,
    ) -> RwResult<Json<FollowBody>> {
        Ok(Json(FollowBody {
            follow: deps.follow(token, user_id, false).await?,
        }))
    }

    async fn current_viewer(
        Extension(deps): Extension<D>,
        token: Token,
    ) -> RwResult<Json<ViewerBody>> {
        Ok(Json(ViewerBody {
            user: deps.fetch_viewer(token).await?,
        }))
    }

    async fn update_description(
        Extension(deps): Extension<D>,
        token: Token,
        Json(body): Json<DescriptionBody>,
    ) -> RwResult<()> {
        deps.update_description(token, body.description).await?;
        Ok(())
    }

    async fn resolve_images(
        Extension(deps): Extension<D>,
        token: Token,
        Json(body): Json<ImagesBody>,
    ) -> RwResult<Json<Vec<ImageLink>>> {
        Ok(Json(deps.resolve_images(token, body.post_ids).await?))
    }
}
