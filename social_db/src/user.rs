use crate::DbResultExt;
use crate::GetDb;

use social_domain::error::{RwError, RwResult};
use social_domain::post::PostId;
use social_domain::user::description::Description;
use social_domain::user::repo::*;
use social_domain::user::UserId;

use entrait::*;
use uuid::Uuid;

pub struct PgUserRepo;

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    name: String,
    image: String,
    description: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            user_id: UserId(row.user_id),
            name: row.name,
            image: row.image,
            description: Description::valid(row.description),
        }
    }
}

#[derive(sqlx::FromRow)]
struct IdentityRow {
    user_id: Uuid,
    name: String,
    image: String,
}

impl From<IdentityRow> for Identity {
    fn from(row: IdentityRow) -> Self {
        Identity {
            user_id: UserId(row.user_id),
            name: row.name,
            image: row.image,
        }
    }
}

#[entrait]
impl social_domain::user::repo::UserRepoImpl for PgUserRepo {
    pub async fn find_profile(
        deps: &impl GetDb,
        UserId(user_id): UserId,
    ) -> RwResult<Option<ProfileRecord>> {
        // All four reads see the same snapshot of the follow graph.
        let mut tx = deps.get_db().pg_pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let Some(user) = sqlx::query_as::<_, UserRow>(
            r#"SELECT user_id, name, image, description FROM app.user WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };

        let followers = sqlx::query_as::<_, IdentityRow>(
            // language=PostgreSQL
            r#"
            SELECT "user".user_id, "user".name, "user".image
            FROM app.follow
            INNER JOIN app.user "user" ON "user".user_id = follow.following_user_id
            WHERE follow.followed_user_id = $1
            ORDER BY follow.created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        let followings = sqlx::query_as::<_, IdentityRow>(
            // language=PostgreSQL
            r#"
            SELECT "user".user_id, "user".name, "user".image
            FROM app.follow
            INNER JOIN app.user "user" ON "user".user_id = follow.followed_user_id
            WHERE follow.following_user_id = $1
            ORDER BY follow.created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        let post_ids = sqlx::query_scalar::<_, Uuid>(
            r#"SELECT post_id FROM app.post WHERE user_id = $1 ORDER BY created_at, post_id"#,
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(ProfileRecord {
            user: user.into(),
            followers: followers.into_iter().map(Into::into).collect(),
            followings: followings.into_iter().map(Into::into).collect(),
            post_ids: post_ids.into_iter().map(PostId).collect(),
        }))
    }

    pub async fn find_identity(
        deps: &impl GetDb,
        UserId(user_id): UserId,
    ) -> RwResult<Option<Identity>> {
        let record = sqlx::query_as::<_, IdentityRow>(
            r#"SELECT user_id, name, image FROM app.user WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&deps.get_db().pg_pool)
        .await?;

        Ok(record.map(Into::into))
    }

    pub async fn list_users(deps: &impl GetDb) -> RwResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"SELECT user_id, name, image, description FROM app.user"#,
        )
        .fetch_all(&deps.get_db().pg_pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn list_following_ids(
        deps: &impl GetDb,
        UserId(user_id): UserId,
    ) -> RwResult<Vec<UserId>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"SELECT followed_user_id FROM app.follow WHERE following_user_id = $1 ORDER BY created_at"#,
        )
        .bind(user_id)
        .fetch_all(&deps.get_db().pg_pool)
        .await?;

        Ok(ids.into_iter().map(UserId).collect())
    }

    pub async fn is_following(
        deps: &impl GetDb,
        follower: UserId,
        followed: UserId,
    ) -> RwResult<Following> {
        let following = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM app.follow
                WHERE following_user_id = $1 AND followed_user_id = $2
            )
            "#,
        )
        .bind(follower.0)
        .bind(followed.0)
        .fetch_one(&deps.get_db().pg_pool)
        .await?;

        Ok(Following(following))
    }

    pub async fn set_description(
        deps: &impl GetDb,
        UserId(user_id): UserId,
        description: &Description,
    ) -> RwResult<()> {
        sqlx::query_scalar::<_, Uuid>(
            r#"UPDATE app.user SET description = $1 WHERE user_id = $2 RETURNING user_id"#,
        )
        .bind(description.as_ref())
        .bind(user_id)
        .fetch_optional(&deps.get_db().pg_pool)
        .await
        .on_constraint("user_description_length", |_| RwError::DescriptionTooLong)?
        .map(|_| ())
        .ok_or(RwError::CurrentUserDoesNotExist)
    }

    pub async fn insert_follow(
        deps: &impl GetDb,
        follower: UserId,
        followed: UserId,
    ) -> RwResult<()> {
        let (user_exists, inserted) = sqlx::query_as::<_, (bool, bool)>(
            // language=PostgreSQL
            r#"
            WITH target AS (
                SELECT user_id FROM app.user WHERE user_id = $2
            ), insertion AS (
                INSERT INTO app.follow (following_user_id, followed_user_id)
                    SELECT $1, user_id FROM target
                ON CONFLICT DO NOTHING
                RETURNING 1
            )
            SELECT
                EXISTS(SELECT 1 FROM target),
                EXISTS(SELECT 1 FROM insertion)
            "#,
        )
        .bind(follower.0)
        .bind(followed.0)
        .fetch_one(&deps.get_db().pg_pool)
        .await
        .on_constraint("follow_following_user_id_fkey", |_| {
            RwError::CurrentUserDoesNotExist
        })
        .on_constraint("user_cannot_follow_self", |_| RwError::Forbidden)?;

        if !user_exists {
            return Err(RwError::ProfileNotFound);
        }
        tracing::debug!(%follower, %followed, inserted, "follow");
        Ok(())
    }

    pub async fn delete_follow(
        deps: &impl GetDb,
        follower: UserId,
        followed: UserId,
    ) -> RwResult<()> {
        let (existed, deleted) = sqlx::query_as::<_, (bool, bool)>(
            // language=PostgreSQL
            r#"
            WITH target AS (
                SELECT user_id FROM app.user WHERE user_id = $2
            ),
            deleted_follow AS (
                DELETE FROM app.follow
                WHERE following_user_id = $1
                AND followed_user_id = (SELECT user_id FROM target)
                RETURNING 1
            )
            SELECT
                EXISTS(SELECT 1 FROM target),
                EXISTS(SELECT 1 FROM deleted_follow)
            "#,
        )
        .bind(follower.0)
        .bind(followed.0)
        .fetch_one(&deps.get_db().pg_pool)
        .await?;

        if !existed {
            return Err(RwError::ProfileNotFound);
        }
        // Unfollowing someone that was never followed is not an error.
        tracing::debug!(%follower, %followed, deleted, "unfollow");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_test_db;
    use crate::fixtures::*;

    use assert_matches::*;

    #[tokio::test]
    #[ignore = "needs a PostgreSQL server at DATABASE_URL"]
    async fn should_fetch_profile_aggregate() -> RwResult<()> {
        let db = create_test_db().await;
        let alice = insert_user(&db, "alice").await;
        let bob = insert_user(&db, "bob").await;
        let carol = insert_user(&db, "carol").await;
        let post = insert_post(&db, alice, "first").await;

        db.insert_follow(bob, alice).await?;
        db.insert_follow(alice, carol).await?;

        let profile = db.find_profile(alice).await?.unwrap();

        assert_eq!("alice", profile.user.name);
        assert_eq!(vec![bob], profile.followers.iter().map(|f| f.user_id).collect::<Vec<_>>());
        assert_eq!(vec![carol], profile.followings.iter().map(|f| f.user_id).collect::<Vec<_>>());
        assert_eq!(vec![post], profile.post_ids);
        Ok(())
    }

    #[tokio::test]
    #[ignore = "needs a PostgreSQL server at DATABASE_URL"]
    async fn profile_lists_come_from_one_snapshot() -> RwResult<()> {
        let db = create_test_db().await;
        let alice = insert_user(&db, "alice").await;
        let carol = insert_user(&db, "carol").await;

        // Mutual follow edges always appear and disappear together.
        let pool = db.pg_pool.clone();
        let writer = tokio::spawn(async move {
            for _ in 0..50 {
                sqlx::query(
                    r#"INSERT INTO app.follow (following_user_id, followed_user_id) VALUES ($1, $2), ($2, $1)"#,
                )
                .bind(alice.0)
                .bind(carol.0)
                .execute(&pool)
                .await
                .unwrap();
                sqlx::query(r#"DELETE FROM app.follow WHERE following_user_id IN ($1, $2)"#)
                    .bind(alice.0)
                    .bind(carol.0)
                    .execute(&pool)
                    .await
                    .unwrap();
            }
        });

        for _ in 0..50 {
            let profile = db.find_profile(alice).await?.unwrap();
            assert_eq!(profile.followers.len(), profile.followings.len());
        }
        writer.await.unwrap();
        Ok(())
    }

    #[tokio::test]
    #[ignore = "needs a PostgreSQL server at DATABASE_URL"]
    async fn unknown_profile_is_none() -> RwResult<()> {
        let db = create_test_db().await;
        assert!(db.find_profile(UserId(Uuid::new_v4())).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    #[ignore = "needs a PostgreSQL server at DATABASE_URL"]
    async fn following_and_unfollowing_should_work() -> RwResult<()> {
        let db = create_test_db().await;
        let alice = insert_user(&db, "alice").await;
        let bob = insert_user(&db, "bob").await;

        db.insert_follow(alice, bob).await?;
        assert_eq!(Following(true), db.is_following(alice, bob).await?);

        // Idempotent
        db.insert_follow(alice, bob).await?;
        assert_eq!(vec![bob], db.list_following_ids(alice).await?);

        assert_matches!(
            db.insert_follow(alice, UserId(Uuid::new_v4()))
                .await
                .unwrap_err(),
            RwError::ProfileNotFound
        );

        db.delete_follow(alice, bob).await?;
        db.delete_follow(alice, bob).await?;

        assert_eq!(Following(false), db.is_following(alice, bob).await?);
        Ok(())
    }

    #[tokio::test]
    #[ignore = "needs a PostgreSQL server at DATABASE_URL"]
    async fn following_yourself_is_forbidden() -> RwResult<()> {
        let db = create_test_db().await;
        let alice = insert_user(&db, "alice").await;

        assert_matches!(
            db.insert_follow(alice, alice).await.unwrap_err(),
            RwError::Forbidden
        );
        Ok(())
    }

    #[tokio::test]
    #[ignore = "needs a PostgreSQL server at DATABASE_URL"]
    async fn should_update_description() -> RwResult<()> {
        let db = create_test_db().await;
        let alice = insert_user(&db, "alice").await;

        db.set_description(alice, &"new bio".parse()?).await?;

        let users = db.list_users().await?;
        assert_eq!("new bio", users[0].description.as_ref());

        assert_matches!(
            db.set_description(UserId(Uuid::new_v4()), &"x".parse()?)
                .await
                .unwrap_err(),
            RwError::CurrentUserDoesNotExist
        );
        Ok(())
    }
}
