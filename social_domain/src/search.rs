use crate::error::{RwError, RwResult};
use crate::post::repo::PostRepo;
use crate::post::Post;
use crate::user::auth::{Authenticate, Token};
use crate::user::repo::UserRepo;
use crate::user::UserSummary;

use entrait::entrait_export as entrait;
use std::str::FromStr;

/// Raw query string of `GET /api/search`. Both fields are required, but are
/// validated by [`search`] so that the caller gets a proper error body.
#[derive(serde::Deserialize, serde::Serialize, Default, Clone, Debug, Eq, PartialEq)]
#[serde(default)]
pub struct SearchParams {
    pub query: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SearchType {
    Posts,
    Users,
}

impl FromStr for SearchType {
    type Err = RwError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "posts" => Ok(Self::Posts),
            "users" => Ok(Self::Users),
            _ => Err(RwError::invalid_request("Invalid type")),
        }
    }
}

/// Literal, case-insensitive substring pattern.
///
/// The text is never interpreted as a regular expression: [`SearchPattern::regex`]
/// escapes it, so `a.b` only matches a literal dot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchPattern {
    text: String,
    folded: String,
}

impl SearchPattern {
    pub fn literal(text: &str) -> Self {
        Self {
            text: text.to_string(),
            folded: text.to_lowercase(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Escaped regular expression source for case-insensitive engines (PostgreSQL `~*`).
    pub fn regex(&self) -> String {
        regex::escape(&self.text)
    }

    pub fn matches(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.folded)
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Eq, PartialEq)]
#[serde(untagged)]
pub enum SearchResults {
    Posts(Vec<Post>),
    Users(Vec<UserSummary>),
}

impl SearchResults {
    pub fn len(&self) -> usize {
        match self {
            Self::Posts(posts) => posts.len(),
            Self::Users(users) => users.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[entrait(pub Search, mock_api=SearchMock)]
pub async fn search(
    deps: &(impl Authenticate + PostRepo + UserRepo),
    token: Token,
    params: SearchParams,
) -> RwResult<SearchResults> {
    deps.authenticate(token)?;

    let (query, kind) = match (params.query.as_deref(), params.kind.as_deref()) {
        (Some(query), Some(kind)) if !query.is_empty() && !kind.is_empty() => (query, kind),
        _ => return Err(RwError::invalid_request("Query and type are required")),
    };
    let pattern = SearchPattern::literal(query);

    let results = match kind.parse::<SearchType>()? {
        SearchType::Posts => SearchResults::Posts(
            deps.find_posts_by_description(&pattern)
                .await?
                .into_iter()
                .map(Into::into)
                .collect(),
        ),
        SearchType::Users => SearchResults::Users(
            deps.list_users()
                .await?
                .into_iter()
                .filter(|user| pattern.matches(&user.name))
                .map(Into::into)
                .collect(),
        ),
    };

    tracing::debug!(query, kind, hits = results.len(), "search");

    Ok(results)
}
