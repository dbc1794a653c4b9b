use serde::Serialize;

use crate::db::DatabaseProxy;
use crate::services::AdminError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatistics {
    pub total_users: i64,
    pub total_categories: i64,
    pub total_courses: i64,
    pub published_courses: i64,
    pub total_lessons: i64,
    pub total_words: i64,
    pub total_sentences: i64,
    pub total_exams: i64,
    pub total_forum_topics: i64,
}

pub async fn get_system_statistics(
    proxy: &DatabaseProxy,
) -> Result<SystemStatistics, AdminError> {
    let pool = proxy.pool();

    let total_users: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "users""#)
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    let total_categories: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "categories""#)
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    let total_courses: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "courses""#)
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    let published_courses: i64 =
        sqlx::query_scalar(r#"SELECT COUNT(*) FROM "courses" WHERE "isPublished" = true"#)
            .fetch_one(pool)
            .await
            .unwrap_or(0);

    let total_lessons: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "lessons""#)
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    let total_words: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "words""#)
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    let total_sentences: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "sentences""#)
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    let total_exams: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "exams""#)
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    let total_forum_topics: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "forum_topics""#)
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok(SystemStatistics {
        total_users,
        total_categories,
        total_courses,
        published_courses,
        total_lessons,
        total_words,
        total_sentences,
        total_exams,
        total_forum_topics,
    })
}
