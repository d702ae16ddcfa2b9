use crate::GetDb;

use social_domain::error::RwResult;
use social_domain::post::repo::*;
use social_domain::post::{ImageLink, PostId};
use social_domain::search::SearchPattern;
use social_domain::timestamp::Timestamptz;
use social_domain::user::UserId;

use entrait::*;
use uuid::Uuid;

pub struct PgPostRepo;

#[derive(sqlx::FromRow)]
struct PostRow {
    post_id: Uuid,
    user_id: Uuid,
    description: String,
    image_link: String,
    created_at: Timestamptz,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            post_id: PostId(row.post_id),
            user_id: UserId(row.user_id),
            description: row.description,
            image_link: row.image_link,
            created_at: row.created_at,
        }
    }
}

#[entrait]
impl social_domain::post::repo::PostRepoImpl for PgPostRepo {
    pub async fn find_posts_by_description(
        deps: &impl GetDb,
        pattern: &SearchPattern,
    ) -> RwResult<Vec<Post>> {
        // The pattern is escaped, so `~*` is a case-insensitive substring match.
        let rows = sqlx::query_as::<_, PostRow>(
            // language=PostgreSQL
            r#"
            SELECT post_id, user_id, description, image_link, created_at
            FROM app.post
            WHERE description ~* $1
            ORDER BY created_at, post_id
            "#,
        )
        .bind(pattern.regex())
        .fetch_all(&deps.get_db().pg_pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn find_images(deps: &impl GetDb, post_ids: &[PostId]) -> RwResult<Vec<ImageLink>> {
        let ids: Vec<Uuid> = post_ids.iter().map(|post_id| post_id.0).collect();

        let rows = sqlx::query_as::<_, (Uuid, String)>(
            r#"SELECT post_id, image_link FROM app.post WHERE post_id = ANY($1)"#,
        )
        .bind(ids)
        .fetch_all(&deps.get_db().pg_pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(post_id, image_link)| ImageLink {
                post_id: PostId(post_id),
                image_link,
            })
            .collect())
    }

    pub async fn find_liked_posts(deps: &impl GetDb, UserId(user_id): UserId) -> RwResult<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(
            // language=PostgreSQL
            r#"
            SELECT post.post_id, post.user_id, post.description, post.image_link, post.created_at
            FROM app.post_like
            INNER JOIN app.post post ON post.post_id = post_like.post_id
            WHERE post_like.user_id = $1
            ORDER BY post_like.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&deps.get_db().pg_pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
