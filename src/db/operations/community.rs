use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Row};

use crate::db::operations::format_naive_iso;
use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumTopic {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub body: String,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub reply_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumReply {
    pub id: String,
    pub topic_id: String,
    pub author_id: String,
    pub body: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct TopicFilter {
    pub is_pinned: Option<bool>,
    pub is_locked: Option<bool>,
    pub search: Option<String>,
}

pub async fn count_topics(
    proxy: &DatabaseProxy,
    filter: &TopicFilter,
) -> Result<i64, sqlx::Error> {
    let mut qb = QueryBuilder::<sqlx::Postgres>::new(
        r#"SELECT COUNT(*) as "count" FROM "forum_topics" WHERE 1=1"#,
    );
    push_topic_filters(&mut qb, filter);
    let row = qb.build().fetch_one(proxy.pool()).await?;
    Ok(row.try_get::<i64, _>("count").unwrap_or(0))
}

pub async fn select_topics(
    proxy: &DatabaseProxy,
    filter: &TopicFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<ForumTopic>, sqlx::Error> {
    let mut qb = QueryBuilder::<sqlx::Postgres>::new(r#"SELECT * FROM "forum_topics" WHERE 1=1"#);
    push_topic_filters(&mut qb, filter);
    qb.push(" ORDER BY \"isPinned\" DESC, \"createdAt\" DESC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let rows = qb.build().fetch_all(proxy.pool()).await?;
    Ok(rows.iter().map(map_topic).collect())
}

fn push_topic_filters(qb: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &TopicFilter) {
    if let Some(is_pinned) = filter.is_pinned {
        qb.push(" AND \"isPinned\" = ");
        qb.push_bind(is_pinned);
    }
    if let Some(is_locked) = filter.is_locked {
        qb.push(" AND \"isLocked\" = ");
        qb.push_bind(is_locked);
    }
    if let Some(ref search) = filter.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (\"title\" ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR \"body\" ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
}

pub async fn get_topic(
    proxy: &DatabaseProxy,
    topic_id: &str,
) -> Result<Option<ForumTopic>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT * FROM "forum_topics" WHERE "id" = $1 LIMIT 1"#)
        .bind(topic_id)
        .fetch_optional(proxy.pool())
        .await?;
    Ok(row.map(|r| map_topic(&r)))
}

pub async fn update_topic(proxy: &DatabaseProxy, topic: &ForumTopic) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    sqlx::query(
        r#"
        UPDATE "forum_topics"
        SET "title" = $1, "body" = $2, "isPinned" = $3, "isLocked" = $4, "updatedAt" = $5
        WHERE "id" = $6
        "#,
    )
    .bind(&topic.title)
    .bind(&topic.body)
    .bind(topic.is_pinned)
    .bind(topic.is_locked)
    .bind(now)
    .bind(&topic.id)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn set_topic_pinned(
    proxy: &DatabaseProxy,
    topic_id: &str,
    pinned: bool,
) -> Result<u64, sqlx::Error> {
    let now = Utc::now().naive_utc();
    let result = sqlx::query(
        r#"UPDATE "forum_topics" SET "isPinned" = $1, "updatedAt" = $2 WHERE "id" = $3"#,
    )
    .bind(pinned)
    .bind(now)
    .bind(topic_id)
    .execute(proxy.pool())
    .await?;
    Ok(result.rows_affected())
}

pub async fn set_topic_locked(
    proxy: &DatabaseProxy,
    topic_id: &str,
    locked: bool,
) -> Result<u64, sqlx::Error> {
    let now = Utc::now().naive_utc();
    let result = sqlx::query(
        r#"UPDATE "forum_topics" SET "isLocked" = $1, "updatedAt" = $2 WHERE "id" = $3"#,
    )
    .bind(locked)
    .bind(now)
    .bind(topic_id)
    .execute(proxy.pool())
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete_topic(proxy: &DatabaseProxy, topic_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(r#"DELETE FROM "forum_topics" WHERE "id" = $1"#)
        .bind(topic_id)
        .execute(proxy.pool())
        .await?;
    Ok(())
}

pub async fn get_replies_by_topic(
    proxy: &DatabaseProxy,
    topic_id: &str,
) -> Result<Vec<ForumReply>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT * FROM "forum_replies" WHERE "topicId" = $1 ORDER BY "createdAt" ASC"#,
    )
    .bind(topic_id)
    .fetch_all(proxy.pool())
    .await?;
    Ok(rows.iter().map(map_reply).collect())
}

pub async fn get_reply(
    proxy: &DatabaseProxy,
    reply_id: &str,
) -> Result<Option<ForumReply>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT * FROM "forum_replies" WHERE "id" = $1 LIMIT 1"#)
        .bind(reply_id)
        .fetch_optional(proxy.pool())
        .await?;
    Ok(row.map(|r| map_reply(&r)))
}

pub async fn insert_reply(proxy: &DatabaseProxy, reply: &ForumReply) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    let mut tx = proxy.pool().begin().await?;

    sqlx::query(
        r#"
        INSERT INTO "forum_replies" ("id", "topicId", "authorId", "body", "createdAt")
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(&reply.id)
    .bind(&reply.topic_id)
    .bind(&reply.author_id)
    .bind(&reply.body)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"UPDATE "forum_topics" SET "replyCount" = "replyCount" + 1, "updatedAt" = $1 WHERE "id" = $2"#,
    )
    .bind(now)
    .bind(&reply.topic_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn delete_reply(
    proxy: &DatabaseProxy,
    topic_id: &str,
    reply_id: &str,
) -> Result<u64, sqlx::Error> {
    let now = Utc::now().naive_utc();
    let mut tx = proxy.pool().begin().await?;

    let result = sqlx::query(
        r#"DELETE FROM "forum_replies" WHERE "id" = $1 AND "topicId" = $2"#,
    )
    .bind(reply_id)
    .bind(topic_id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() > 0 {
        sqlx::query(
            r#"
            UPDATE "forum_topics"
            SET "replyCount" = GREATEST("replyCount" - 1, 0), "updatedAt" = $1
            WHERE "id" = $2
            "#,
        )
        .bind(now)
        .bind(topic_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(result.rows_affected())
}

fn map_topic(row: &sqlx::postgres::PgRow) -> ForumTopic {
    let created_at: NaiveDateTime = row
        .try_get("createdAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at: NaiveDateTime = row
        .try_get("updatedAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    ForumTopic {
        id: row.try_get("id").unwrap_or_default(),
        author_id: row.try_get("authorId").unwrap_or_default(),
        title: row.try_get("title").unwrap_or_default(),
        body: row.try_get("body").unwrap_or_default(),
        is_pinned: row.try_get("isPinned").unwrap_or(false),
        is_locked: row.try_get("isLocked").unwrap_or(false),
        reply_count: row.try_get("replyCount").unwrap_or(0),
        created_at: format_naive_iso(created_at),
        updated_at: format_naive_iso(updated_at),
    }
}

fn map_reply(row: &sqlx::postgres::PgRow) -> ForumReply {
    let created_at: NaiveDateTime = row
        .try_get("createdAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    ForumReply {
        id: row.try_get("id").unwrap_or_default(),
        topic_id: row.try_get("topicId").unwrap_or_default(),
        author_id: row.try_get("authorId").unwrap_or_default(),
        body: row.try_get("body").unwrap_or_default(),
        created_at: format_naive_iso(created_at),
    }
}
