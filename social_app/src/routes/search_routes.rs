use social_domain::error::{RwError, RwResult};
use social_domain::search::{SearchParams, SearchResults};
use social_domain::user::auth::Token;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Extension, Query};
use axum::routing::get;
use axum::Json;

#[derive(serde::Serialize, serde::Deserialize, Debug)]
struct SearchBody {
    results: SearchResults,
}

pub struct SearchRoutes<D>(std::marker::PhantomData<D>);

impl<D> SearchRoutes<D>
where
    D: social_domain::search::Search + Sized + Clone + Send + Sync + 'static,
{
    pub fn router() -> axum::Router {
        axum::Router::new().route("/search", get(Self::search))
    }

    async fn search(
        Extension(deps): Extension<D>,
        token: Token,
        params: Result<Query<SearchParams>, QueryRejection>,
    ) -> RwResult<Json<SearchBody>> {
        // e.g. a repeated `query` parameter
        let Query(params) = params.map_err(|rejection| {
            tracing::debug!("malformed search query: {rejection}");
            RwError::invalid_request("Invalid query parameters")
        })?;

        Ok(Json(SearchBody {
            results: deps.search(token, params).await?,
        }))
    }
}
