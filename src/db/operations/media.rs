use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Row};

use crate::db::operations::format_naive_iso;
use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dialog {
    pub id: String,
    pub title: String,
    pub language: String,
    pub level: String,
    pub audio_url: Option<String>,
    pub lines: serde_json::Value,
    pub is_published: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Podcast {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub audio_url: String,
    pub cover_image: Option<String>,
    pub duration_seconds: Option<i32>,
    pub episode_number: Option<i32>,
    pub is_published: bool,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub cover_image: Option<String>,
    pub language: String,
    pub level: String,
    pub is_published: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct MediaFilter {
    pub language: Option<String>,
    pub level: Option<String>,
    pub is_published: Option<bool>,
    pub search: Option<String>,
}

pub async fn count_dialogs(
    proxy: &DatabaseProxy,
    filter: &MediaFilter,
) -> Result<i64, sqlx::Error> {
    let mut qb =
        QueryBuilder::<sqlx::Postgres>::new(r#"SELECT COUNT(*) as "count" FROM "dialogs" WHERE 1=1"#);
    push_media_filters(&mut qb, filter, &["title"]);
    let row = qb.build().fetch_one(proxy.pool()).await?;
    Ok(row.try_get::<i64, _>("count").unwrap_or(0))
}

pub async fn select_dialogs(
    proxy: &DatabaseProxy,
    filter: &MediaFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Dialog>, sqlx::Error> {
    let mut qb = QueryBuilder::<sqlx::Postgres>::new(r#"SELECT * FROM "dialogs" WHERE 1=1"#);
    push_media_filters(&mut qb, filter, &["title"]);
    qb.push(" ORDER BY \"createdAt\" DESC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let rows = qb.build().fetch_all(proxy.pool()).await?;
    Ok(rows.iter().map(map_dialog).collect())
}

fn push_media_filters(
    qb: &mut QueryBuilder<'_, sqlx::Postgres>,
    filter: &MediaFilter,
    search_columns: &[&str],
) {
    if let Some(ref language) = filter.language {
        qb.push(" AND \"language\" = ");
        qb.push_bind(language.clone());
    }
    if let Some(ref level) = filter.level {
        qb.push(" AND \"level\" = ");
        qb.push_bind(level.clone());
    }
    if let Some(is_published) = filter.is_published {
        qb.push(" AND \"isPublished\" = ");
        qb.push_bind(is_published);
    }
    if let Some(ref search) = filter.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (");
        for (index, column) in search_columns.iter().enumerate() {
            if index > 0 {
                qb.push(" OR ");
            }
            qb.push(format!("\"{column}\" ILIKE "));
            qb.push_bind(pattern.clone());
        }
        qb.push(")");
    }
}

pub async fn get_dialog(
    proxy: &DatabaseProxy,
    dialog_id: &str,
) -> Result<Option<Dialog>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT * FROM "dialogs" WHERE "id" = $1 LIMIT 1"#)
        .bind(dialog_id)
        .fetch_optional(proxy.pool())
        .await?;
    Ok(row.map(|r| map_dialog(&r)))
}

pub async fn insert_dialog(proxy: &DatabaseProxy, dialog: &Dialog) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    sqlx::query(
        r#"
        INSERT INTO "dialogs" (
            "id", "title", "language", "level", "audioUrl", "lines",
            "isPublished", "createdAt", "updatedAt"
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(&dialog.id)
    .bind(&dialog.title)
    .bind(&dialog.language)
    .bind(&dialog.level)
    .bind(&dialog.audio_url)
    .bind(&dialog.lines)
    .bind(dialog.is_published)
    .bind(now)
    .bind(now)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn update_dialog(proxy: &DatabaseProxy, dialog: &Dialog) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    sqlx::query(
        r#"
        UPDATE "dialogs"
        SET "title" = $1, "language" = $2, "level" = $3, "audioUrl" = $4,
            "lines" = $5, "isPublished" = $6, "updatedAt" = $7
        WHERE "id" = $8
        "#,
    )
    .bind(&dialog.title)
    .bind(&dialog.language)
    .bind(&dialog.level)
    .bind(&dialog.audio_url)
    .bind(&dialog.lines)
    .bind(dialog.is_published)
    .bind(now)
    .bind(&dialog.id)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn delete_dialog(proxy: &DatabaseProxy, dialog_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(r#"DELETE FROM "dialogs" WHERE "id" = $1"#)
        .bind(dialog_id)
        .execute(proxy.pool())
        .await?;
    Ok(())
}

pub async fn count_podcasts(
    proxy: &DatabaseProxy,
    filter: &MediaFilter,
) -> Result<i64, sqlx::Error> {
    let mut qb =
        QueryBuilder::<sqlx::Postgres>::new(r#"SELECT COUNT(*) as "count" FROM "podcasts" WHERE 1=1"#);
    push_podcast_filters(&mut qb, filter);
    let row = qb.build().fetch_one(proxy.pool()).await?;
    Ok(row.try_get::<i64, _>("count").unwrap_or(0))
}

pub async fn select_podcasts(
    proxy: &DatabaseProxy,
    filter: &MediaFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Podcast>, sqlx::Error> {
    let mut qb = QueryBuilder::<sqlx::Postgres>::new(r#"SELECT * FROM "podcasts" WHERE 1=1"#);
    push_podcast_filters(&mut qb, filter);
    qb.push(" ORDER BY \"episodeNumber\" DESC NULLS LAST, \"createdAt\" DESC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let rows = qb.build().fetch_all(proxy.pool()).await?;
    Ok(rows.iter().map(map_podcast).collect())
}

fn push_podcast_filters(qb: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &MediaFilter) {
    if let Some(is_published) = filter.is_published {
        qb.push(" AND \"isPublished\" = ");
        qb.push_bind(is_published);
    }
    if let Some(ref search) = filter.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND \"title\" ILIKE ");
        qb.push_bind(pattern);
    }
}

pub async fn get_podcast(
    proxy: &DatabaseProxy,
    podcast_id: &str,
) -> Result<Option<Podcast>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT * FROM "podcasts" WHERE "id" = $1 LIMIT 1"#)
        .bind(podcast_id)
        .fetch_optional(proxy.pool())
        .await?;
    Ok(row.map(|r| map_podcast(&r)))
}

pub async fn insert_podcast(proxy: &DatabaseProxy, podcast: &Podcast) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    let published_at = podcast
        .published_at
        .as_ref()
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.naive_utc());

    sqlx::query(
        r#"
        INSERT INTO "podcasts" (
            "id", "title", "description", "audioUrl", "coverImage",
            "durationSeconds", "episodeNumber", "isPublished", "publishedAt",
            "createdAt", "updatedAt"
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(&podcast.id)
    .bind(&podcast.title)
    .bind(&podcast.description)
    .bind(&podcast.audio_url)
    .bind(&podcast.cover_image)
    .bind(podcast.duration_seconds)
    .bind(podcast.episode_number)
    .bind(podcast.is_published)
    .bind(published_at)
    .bind(now)
    .bind(now)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn update_podcast(proxy: &DatabaseProxy, podcast: &Podcast) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    let published_at = podcast
        .published_at
        .as_ref()
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.naive_utc());

    sqlx::query(
        r#"
        UPDATE "podcasts"
        SET "title" = $1, "description" = $2, "audioUrl" = $3, "coverImage" = $4,
            "durationSeconds" = $5, "episodeNumber" = $6, "isPublished" = $7,
            "publishedAt" = $8, "updatedAt" = $9
        WHERE "id" = $10
        "#,
    )
    .bind(&podcast.title)
    .bind(&podcast.description)
    .bind(&podcast.audio_url)
    .bind(&podcast.cover_image)
    .bind(podcast.duration_seconds)
    .bind(podcast.episode_number)
    .bind(podcast.is_published)
    .bind(published_at)
    .bind(now)
    .bind(&podcast.id)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn delete_podcast(proxy: &DatabaseProxy, podcast_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(r#"DELETE FROM "podcasts" WHERE "id" = $1"#)
        .bind(podcast_id)
        .execute(proxy.pool())
        .await?;
    Ok(())
}

pub async fn count_stories(
    proxy: &DatabaseProxy,
    filter: &MediaFilter,
) -> Result<i64, sqlx::Error> {
    let mut qb =
        QueryBuilder::<sqlx::Postgres>::new(r#"SELECT COUNT(*) as "count" FROM "stories" WHERE 1=1"#);
    push_media_filters(&mut qb, filter, &["title", "slug"]);
    let row = qb.build().fetch_one(proxy.pool()).await?;
    Ok(row.try_get::<i64, _>("count").unwrap_or(0))
}

pub async fn select_stories(
    proxy: &DatabaseProxy,
    filter: &MediaFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Story>, sqlx::Error> {
    let mut qb = QueryBuilder::<sqlx::Postgres>::new(r#"SELECT * FROM "stories" WHERE 1=1"#);
    push_media_filters(&mut qb, filter, &["title", "slug"]);
    qb.push(" ORDER BY \"createdAt\" DESC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let rows = qb.build().fetch_all(proxy.pool()).await?;
    Ok(rows.iter().map(map_story).collect())
}

pub async fn get_story(
    proxy: &DatabaseProxy,
    story_id: &str,
) -> Result<Option<Story>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT * FROM "stories" WHERE "id" = $1 LIMIT 1"#)
        .bind(story_id)
        .fetch_optional(proxy.pool())
        .await?;
    Ok(row.map(|r| map_story(&r)))
}

pub async fn insert_story(proxy: &DatabaseProxy, story: &Story) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    sqlx::query(
        r#"
        INSERT INTO "stories" (
            "id", "title", "slug", "body", "coverImage", "language", "level",
            "isPublished", "createdAt", "updatedAt"
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(&story.id)
    .bind(&story.title)
    .bind(&story.slug)
    .bind(&story.body)
    .bind(&story.cover_image)
    .bind(&story.language)
    .bind(&story.level)
    .bind(story.is_published)
    .bind(now)
    .bind(now)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn update_story(proxy: &DatabaseProxy, story: &Story) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    sqlx::query(
        r#"
        UPDATE "stories"
        SET "title" = $1, "slug" = $2, "body" = $3, "coverImage" = $4,
            "language" = $5, "level" = $6, "isPublished" = $7, "updatedAt" = $8
        WHERE "id" = $9
        "#,
    )
    .bind(&story.title)
    .bind(&story.slug)
    .bind(&story.body)
    .bind(&story.cover_image)
    .bind(&story.language)
    .bind(&story.level)
    .bind(story.is_published)
    .bind(now)
    .bind(&story.id)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn delete_story(proxy: &DatabaseProxy, story_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(r#"DELETE FROM "stories" WHERE "id" = $1"#)
        .bind(story_id)
        .execute(proxy.pool())
        .await?;
    Ok(())
}

fn map_dialog(row: &sqlx::postgres::PgRow) -> Dialog {
    let created_at: NaiveDateTime = row
        .try_get("createdAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at: NaiveDateTime = row
        .try_get("updatedAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    Dialog {
        id: row.try_get("id").unwrap_or_default(),
        title: row.try_get("title").unwrap_or_default(),
        language: row.try_get("language").unwrap_or_default(),
        level: row
            .try_get("level")
            .unwrap_or_else(|_| "BEGINNER".to_string()),
        audio_url: row.try_get("audioUrl").ok().flatten(),
        lines: row
            .try_get("lines")
            .unwrap_or(serde_json::Value::Array(Vec::new())),
        is_published: row.try_get("isPublished").unwrap_or(false),
        created_at: format_naive_iso(created_at),
        updated_at: format_naive_iso(updated_at),
    }
}

fn map_podcast(row: &sqlx::postgres::PgRow) -> Podcast {
    let created_at: NaiveDateTime = row
        .try_get("createdAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at: NaiveDateTime = row
        .try_get("updatedAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let published_at: Option<NaiveDateTime> = row.try_get("publishedAt").ok().flatten();
    Podcast {
        id: row.try_get("id").unwrap_or_default(),
        title: row.try_get("title").unwrap_or_default(),
        description: row.try_get("description").ok().flatten(),
        audio_url: row.try_get("audioUrl").unwrap_or_default(),
        cover_image: row.try_get("coverImage").ok().flatten(),
        duration_seconds: row.try_get("durationSeconds").ok().flatten(),
        episode_number: row.try_get("episodeNumber").ok().flatten(),
        is_published: row.try_get("isPublished").unwrap_or(false),
        published_at: published_at.map(format_naive_iso),
        created_at: format_naive_iso(created_at),
        updated_at: format_naive_iso(updated_at),
    }
}

fn map_story(row: &sqlx::postgres::PgRow) -> Story {
    let created_at: NaiveDateTime = row
        .try_get("createdAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at: NaiveDateTime = row
        .try_get("updatedAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    Story {
        id: row.try_get("id").unwrap_or_default(),
        title: row.try_get("title").unwrap_or_default(),
        slug: row.try_get("slug").unwrap_or_default(),
        body: row.try_get("body").unwrap_or_default(),
        cover_image: row.try_get("coverImage").ok().flatten(),
        language: row.try_get("language").unwrap_or_default(),
        level: row
            .try_get("level")
            .unwrap_or_else(|_| "BEGINNER".to_string()),
        is_published: row.try_get("isPublished").unwrap_or(false),
        created_at: format_naive_iso(created_at),
        updated_at: format_naive_iso(updated_at),
    }
}
