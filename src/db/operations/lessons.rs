use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Row};

use crate::db::operations::format_naive_iso;
use crate::db::operations::vocabulary::{map_sentence, map_word, Sentence, Word};
use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub video_url: Option<String>,
    pub duration_minutes: Option<i32>,
    pub sort_order: i32,
    pub is_published: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct LessonFilter {
    pub course_id: Option<String>,
    pub is_published: Option<bool>,
    pub search: Option<String>,
}

pub async fn count_lessons(
    proxy: &DatabaseProxy,
    filter: &LessonFilter,
) -> Result<i64, sqlx::Error> {
    let mut qb =
        QueryBuilder::<sqlx::Postgres>::new(r#"SELECT COUNT(*) as "count" FROM "lessons" WHERE 1=1"#);
    push_lesson_filters(&mut qb, filter);
    let row = qb.build().fetch_one(proxy.pool()).await?;
    Ok(row.try_get::<i64, _>("count").unwrap_or(0))
}

pub async fn select_lessons(
    proxy: &DatabaseProxy,
    filter: &LessonFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Lesson>, sqlx::Error> {
    let mut qb = QueryBuilder::<sqlx::Postgres>::new(r#"SELECT * FROM "lessons" WHERE 1=1"#);
    push_lesson_filters(&mut qb, filter);
    qb.push(" ORDER BY \"sortOrder\" ASC, \"createdAt\" ASC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let rows = qb.build().fetch_all(proxy.pool()).await?;
    Ok(rows.iter().map(map_lesson).collect())
}

fn push_lesson_filters(qb: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &LessonFilter) {
    if let Some(ref course_id) = filter.course_id {
        qb.push(" AND \"courseId\" = ");
        qb.push_bind(course_id.clone());
    }
    if let Some(is_published) = filter.is_published {
        qb.push(" AND \"isPublished\" = ");
        qb.push_bind(is_published);
    }
    if let Some(ref search) = filter.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (\"title\" ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR \"slug\" ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
}

pub async fn get_lesson(
    proxy: &DatabaseProxy,
    lesson_id: &str,
) -> Result<Option<Lesson>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT * FROM "lessons" WHERE "id" = $1 LIMIT 1"#)
        .bind(lesson_id)
        .fetch_optional(proxy.pool())
        .await?;
    Ok(row.map(|r| map_lesson(&r)))
}

pub async fn insert_lesson(proxy: &DatabaseProxy, lesson: &Lesson) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    sqlx::query(
        r#"
        INSERT INTO "lessons" (
            "id", "courseId", "title", "slug", "summary", "videoUrl",
            "durationMinutes", "sortOrder", "isPublished", "createdAt", "updatedAt"
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(&lesson.id)
    .bind(&lesson.course_id)
    .bind(&lesson.title)
    .bind(&lesson.slug)
    .bind(&lesson.summary)
    .bind(&lesson.video_url)
    .bind(lesson.duration_minutes)
    .bind(lesson.sort_order)
    .bind(lesson.is_published)
    .bind(now)
    .bind(now)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn update_lesson(proxy: &DatabaseProxy, lesson: &Lesson) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    sqlx::query(
        r#"
        UPDATE "lessons"
        SET "courseId" = $1, "title" = $2, "slug" = $3, "summary" = $4,
            "videoUrl" = $5, "durationMinutes" = $6, "sortOrder" = $7,
            "isPublished" = $8, "updatedAt" = $9
        WHERE "id" = $10
        "#,
    )
    .bind(&lesson.course_id)
    .bind(&lesson.title)
    .bind(&lesson.slug)
    .bind(&lesson.summary)
    .bind(&lesson.video_url)
    .bind(lesson.duration_minutes)
    .bind(lesson.sort_order)
    .bind(lesson.is_published)
    .bind(now)
    .bind(&lesson.id)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn delete_lesson(proxy: &DatabaseProxy, lesson_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(r#"DELETE FROM "lessons" WHERE "id" = $1"#)
        .bind(lesson_id)
        .execute(proxy.pool())
        .await?;
    Ok(())
}

pub async fn get_lesson_words(
    proxy: &DatabaseProxy,
    lesson_id: &str,
) -> Result<Vec<Word>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT w.*
        FROM "lesson_words" lw
        JOIN "words" w ON w."id" = lw."wordId"
        WHERE lw."lessonId" = $1
        ORDER BY lw."sortOrder" ASC
        "#,
    )
    .bind(lesson_id)
    .fetch_all(proxy.pool())
    .await?;
    Ok(rows.iter().map(map_word).collect())
}

pub async fn get_lesson_sentences(
    proxy: &DatabaseProxy,
    lesson_id: &str,
) -> Result<Vec<Sentence>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT s.*
        FROM "lesson_sentences" ls
        JOIN "sentences" s ON s."id" = ls."sentenceId"
        WHERE ls."lessonId" = $1
        ORDER BY ls."sortOrder" ASC
        "#,
    )
    .bind(lesson_id)
    .fetch_all(proxy.pool())
    .await?;
    Ok(rows.iter().map(map_sentence).collect())
}

pub async fn attach_word(
    proxy: &DatabaseProxy,
    lesson_id: &str,
    word_id: &str,
) -> Result<(), sqlx::Error> {
    let next_order: i32 = sqlx::query_scalar(
        r#"SELECT COALESCE(MAX("sortOrder") + 1, 0) FROM "lesson_words" WHERE "lessonId" = $1"#,
    )
    .bind(lesson_id)
    .fetch_one(proxy.pool())
    .await?;

    sqlx::query(
        r#"
        INSERT INTO "lesson_words" ("lessonId", "wordId", "sortOrder")
        VALUES ($1, $2, $3)
        ON CONFLICT ("lessonId", "wordId") DO NOTHING
        "#,
    )
    .bind(lesson_id)
    .bind(word_id)
    .bind(next_order)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn detach_word(
    proxy: &DatabaseProxy,
    lesson_id: &str,
    word_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"DELETE FROM "lesson_words" WHERE "lessonId" = $1 AND "wordId" = $2"#,
    )
    .bind(lesson_id)
    .bind(word_id)
    .execute(proxy.pool())
    .await?;
    Ok(result.rows_affected())
}

/// Replaces the word attachments of a lesson with the submitted set,
/// preserving the submitted order.
pub async fn replace_lesson_words(
    proxy: &DatabaseProxy,
    lesson_id: &str,
    word_ids: &[String],
) -> Result<(), sqlx::Error> {
    let mut tx = proxy.pool().begin().await?;

    sqlx::query(r#"DELETE FROM "lesson_words" WHERE "lessonId" = $1"#)
        .bind(lesson_id)
        .execute(&mut *tx)
        .await?;

    for (index, word_id) in word_ids.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO "lesson_words" ("lessonId", "wordId", "sortOrder")
            VALUES ($1, $2, $3)
            ON CONFLICT ("lessonId", "wordId") DO NOTHING
            "#,
        )
        .bind(lesson_id)
        .bind(word_id)
        .bind(index as i32)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn attach_sentence(
    proxy: &DatabaseProxy,
    lesson_id: &str,
    sentence_id: &str,
) -> Result<(), sqlx::Error> {
    let next_order: i32 = sqlx::query_scalar(
        r#"SELECT COALESCE(MAX("sortOrder") + 1, 0) FROM "lesson_sentences" WHERE "lessonId" = $1"#,
    )
    .bind(lesson_id)
    .fetch_one(proxy.pool())
    .await?;

    sqlx::query(
        r#"
        INSERT INTO "lesson_sentences" ("lessonId", "sentenceId", "sortOrder")
        VALUES ($1, $2, $3)
        ON CONFLICT ("lessonId", "sentenceId") DO NOTHING
        "#,
    )
    .bind(lesson_id)
    .bind(sentence_id)
    .bind(next_order)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn detach_sentence(
    proxy: &DatabaseProxy,
    lesson_id: &str,
    sentence_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"DELETE FROM "lesson_sentences" WHERE "lessonId" = $1 AND "sentenceId" = $2"#,
    )
    .bind(lesson_id)
    .bind(sentence_id)
    .execute(proxy.pool())
    .await?;
    Ok(result.rows_affected())
}

pub async fn replace_lesson_sentences(
    proxy: &DatabaseProxy,
    lesson_id: &str,
    sentence_ids: &[String],
) -> Result<(), sqlx::Error> {
    let mut tx = proxy.pool().begin().await?;

    sqlx::query(r#"DELETE FROM "lesson_sentences" WHERE "lessonId" = $1"#)
        .bind(lesson_id)
        .execute(&mut *tx)
        .await?;

    for (index, sentence_id) in sentence_ids.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO "lesson_sentences" ("lessonId", "sentenceId", "sortOrder")
            VALUES ($1, $2, $3)
            ON CONFLICT ("lessonId", "sentenceId") DO NOTHING
            "#,
        )
        .bind(lesson_id)
        .bind(sentence_id)
        .bind(index as i32)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

fn map_lesson(row: &sqlx::postgres::PgRow) -> Lesson {
    let created_at: NaiveDateTime = row
        .try_get("createdAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at: NaiveDateTime = row
        .try_get("updatedAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    Lesson {
        id: row.try_get("id").unwrap_or_default(),
        course_id: row.try_get("courseId").unwrap_or_default(),
        title: row.try_get("title").unwrap_or_default(),
        slug: row.try_get("slug").unwrap_or_default(),
        summary: row.try_get("summary").ok().flatten(),
        video_url: row.try_get("videoUrl").ok().flatten(),
        duration_minutes: row.try_get("durationMinutes").ok().flatten(),
        sort_order: row.try_get("sortOrder").unwrap_or(0),
        is_published: row.try_get("isPublished").unwrap_or(false),
        created_at: format_naive_iso(created_at),
        updated_at: format_naive_iso(updated_at),
    }
}
