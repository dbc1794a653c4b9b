use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;

use crate::db::operations::format_naive_iso;
use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub role: String,
    pub avatar_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: String,
    pub user_id: String,
    pub plan: String,
    pub status: String,
    pub started_at: String,
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub user_id: String,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub user_id: String,
    pub code: String,
    pub name: String,
    pub unlocked_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub id: String,
    pub user_id: String,
    pub lesson_id: String,
    pub status: String,
    pub score: Option<f64>,
    pub completed_at: Option<String>,
}

pub async fn get_user(proxy: &DatabaseProxy, user_id: &str) -> Result<Option<User>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT "id", "email", "username", "role"::text as "role", "avatarUrl",
               "createdAt", "updatedAt"
        FROM "users"
        WHERE "id" = $1
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(proxy.pool())
    .await?;
    Ok(row.map(|r| map_user(&r)))
}

pub async fn update_user_role(
    proxy: &DatabaseProxy,
    user_id: &str,
    role: &str,
) -> Result<u64, sqlx::Error> {
    let now = Utc::now().naive_utc();
    let result = sqlx::query(
        r#"UPDATE "users" SET "role" = $1, "updatedAt" = $2 WHERE "id" = $3"#,
    )
    .bind(role)
    .bind(now)
    .bind(user_id)
    .execute(proxy.pool())
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete_user(proxy: &DatabaseProxy, user_id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(r#"DELETE FROM "users" WHERE "id" = $1"#)
        .bind(user_id)
        .execute(proxy.pool())
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_user_sessions(
    proxy: &DatabaseProxy,
    user_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(r#"DELETE FROM "sessions" WHERE "userId" = $1"#)
        .bind(user_id)
        .execute(proxy.pool())
        .await?;
    Ok(result.rows_affected())
}

pub async fn get_membership_by_user(
    proxy: &DatabaseProxy,
    user_id: &str,
) -> Result<Option<Membership>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT * FROM "memberships"
        WHERE "userId" = $1
        ORDER BY "startedAt" DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(proxy.pool())
    .await?;
    Ok(row.map(|r| map_membership(&r)))
}

pub async fn get_streak_by_user(
    proxy: &DatabaseProxy,
    user_id: &str,
) -> Result<Option<Streak>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT * FROM "streaks" WHERE "userId" = $1 LIMIT 1"#)
        .bind(user_id)
        .fetch_optional(proxy.pool())
        .await?;
    Ok(row.map(|r| map_streak(&r)))
}

pub async fn get_achievements_by_user(
    proxy: &DatabaseProxy,
    user_id: &str,
) -> Result<Vec<Achievement>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT * FROM "achievements" WHERE "userId" = $1 ORDER BY "unlockedAt" DESC"#,
    )
    .bind(user_id)
    .fetch_all(proxy.pool())
    .await?;
    Ok(rows.iter().map(map_achievement).collect())
}

pub async fn count_achievements_by_user(
    proxy: &DatabaseProxy,
    user_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(r#"SELECT COUNT(*) FROM "achievements" WHERE "userId" = $1"#)
        .bind(user_id)
        .fetch_one(proxy.pool())
        .await
}

pub async fn get_progress_by_user(
    proxy: &DatabaseProxy,
    user_id: &str,
    limit: i64,
) -> Result<Vec<ProgressRecord>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM "progress_records"
        WHERE "userId" = $1
        ORDER BY "completedAt" DESC NULLS LAST
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(proxy.pool())
    .await?;
    Ok(rows.iter().map(map_progress_record).collect())
}

pub async fn count_progress_by_user(
    proxy: &DatabaseProxy,
    user_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(r#"SELECT COUNT(*) FROM "progress_records" WHERE "userId" = $1"#)
        .bind(user_id)
        .fetch_one(proxy.pool())
        .await
}

fn map_user(row: &sqlx::postgres::PgRow) -> User {
    let created_at: NaiveDateTime = row
        .try_get("createdAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at: NaiveDateTime = row
        .try_get("updatedAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    User {
        id: row.try_get("id").unwrap_or_default(),
        email: row.try_get("email").unwrap_or_default(),
        username: row.try_get("username").unwrap_or_default(),
        role: row.try_get("role").unwrap_or_else(|_| "USER".to_string()),
        avatar_url: row.try_get("avatarUrl").ok().flatten(),
        created_at: format_naive_iso(created_at),
        updated_at: format_naive_iso(updated_at),
    }
}

fn map_membership(row: &sqlx::postgres::PgRow) -> Membership {
    let started_at: NaiveDateTime = row
        .try_get("startedAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let expires_at: Option<NaiveDateTime> = row.try_get("expiresAt").ok().flatten();
    Membership {
        id: row.try_get("id").unwrap_or_default(),
        user_id: row.try_get("userId").unwrap_or_default(),
        plan: row.try_get("plan").unwrap_or_else(|_| "FREE".to_string()),
        status: row.try_get("status").unwrap_or_else(|_| "ACTIVE".to_string()),
        started_at: format_naive_iso(started_at),
        expires_at: expires_at.map(format_naive_iso),
    }
}

fn map_streak(row: &sqlx::postgres::PgRow) -> Streak {
    let last_activity: Option<NaiveDateTime> = row.try_get("lastActivityDate").ok().flatten();
    Streak {
        user_id: row.try_get("userId").unwrap_or_default(),
        current_streak: row.try_get("currentStreak").unwrap_or(0),
        longest_streak: row.try_get("longestStreak").unwrap_or(0),
        last_activity_date: last_activity.map(format_naive_iso),
    }
}

fn map_achievement(row: &sqlx::postgres::PgRow) -> Achievement {
    let unlocked_at: NaiveDateTime = row
        .try_get("unlockedAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    Achievement {
        id: row.try_get("id").unwrap_or_default(),
        user_id: row.try_get("userId").unwrap_or_default(),
        code: row.try_get("code").unwrap_or_default(),
        name: row.try_get("name").unwrap_or_default(),
        unlocked_at: format_naive_iso(unlocked_at),
    }
}

fn map_progress_record(row: &sqlx::postgres::PgRow) -> ProgressRecord {
    let completed_at: Option<NaiveDateTime> = row.try_get("completedAt").ok().flatten();
    ProgressRecord {
        id: row.try_get("id").unwrap_or_default(),
        user_id: row.try_get("userId").unwrap_or_default(),
        lesson_id: row.try_get("lessonId").unwrap_or_default(),
        status: row
            .try_get("status")
            .unwrap_or_else(|_| "IN_PROGRESS".to_string()),
        score: row.try_get("score").ok().flatten(),
        completed_at: completed_at.map(format_naive_iso),
    }
}
