use crate::config::Config;
use social_db::{Db, GetDb, PgPostRepo, PgUserRepo};
use social_domain::post::repo::DelegatePostRepo;
use social_domain::user::repo::DelegateUserRepo;

use std::sync::Arc;
use time::OffsetDateTime;

#[derive(Clone)]
pub struct App {
    pub config: Arc<Config>,
    pub db: Db,
}

impl GetDb for App {
    fn get_db(&self) -> &Db {
        &self.db
    }
}

impl social_domain::System for App {
    fn get_current_time(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

impl social_domain::GetConfig for App {
    fn get_jwt_signing_key(&self) -> &hmac::Hmac<sha2::Sha384> {
        &self.config.jwt_signing_key.0
    }
}

impl DelegateUserRepo<Self> for App {
    type Target = PgUserRepo;
}

impl DelegatePostRepo<Self> for App {
    type Target = PgPostRepo;
}
