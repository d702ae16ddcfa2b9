//! Session verification.
//!
//! Sessions are issued by the identity provider as HS384 JWTs carrying the
//! user id in `sub` and a unix `exp`. This service only verifies them.

use super::UserId;
use crate::error::{RwError, RwResult};
use crate::{GetConfig, System};

use axum_extra::TypedHeader;
use entrait::entrait_export as entrait;
use headers::authorization::Credentials;
use headers::Authorization;
use http::HeaderValue;
use jwt::VerifyWithKey;

#[derive(serde::Serialize, serde::Deserialize)]
struct SessionClaims {
    sub: UserId,
    exp: i64,
}

#[entrait(pub Authenticate, mock_api=AuthenticateMock)]
pub mod authenticate {
    use super::*;

    pub fn authenticate(deps: &(impl System + GetConfig), token: Token) -> RwResult<UserId> {
        let key = deps.get_jwt_signing_key();
        let claims: SessionClaims = token
            .token()
            .verify_with_key(key)
            .map_err(|_| RwError::Unauthorized)?;

        // A session is valid up to and including its `exp` second.
        if claims.exp < deps.get_current_time().unix_timestamp() {
            tracing::debug!(user_id = %claims.sub, "session expired");
            return Err(RwError::Unauthorized);
        }

        Ok(claims.sub)
    }
}

/// Credential of the `Authorization: Token <jwt>` scheme, without the scheme prefix.
#[derive(Debug)]
pub struct Token(String);

impl Token {
    pub fn from_token(token: &str) -> Self {
        Self(token.to_string())
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl Credentials for Token {
    const SCHEME: &'static str = "Token";

    fn decode(value: &HeaderValue) -> Option<Self> {
        // The scheme itself has already been matched, case-insensitively.
        let credential = value.to_str().ok()?.get(Self::SCHEME.len()..)?.trim();
        if credential.is_empty() {
            return None;
        }

        Some(Token(credential.to_string()))
    }

    fn encode(&self) -> HeaderValue {
        HeaderValue::from_str(&format!("{} {}", Self::SCHEME, self.0))
            .expect("token was decoded from a header value")
    }
}

#[async_trait::async_trait]
impl<S> axum::extract::FromRequestParts<S> for Token
where
    S: Send + Sync,
{
    type Rejection = RwError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(token)) =
            TypedHeader::<Authorization<Token>>::from_request_parts(parts, state)
                .await
                .map_err(|_| RwError::Unauthorized)?;

        Ok(token)
    }
}
