use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Row};

use crate::db::operations::format_naive_iso;
use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: String,
    pub term: String,
    pub translation: String,
    pub phonetic: Option<String>,
    pub part_of_speech: Option<String>,
    pub language: String,
    pub audio_url: Option<String>,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentence {
    pub id: String,
    pub text: String,
    pub translation: String,
    pub language: String,
    pub audio_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct VocabularyFilter {
    pub language: Option<String>,
    pub search: Option<String>,
}

pub async fn count_words(
    proxy: &DatabaseProxy,
    filter: &VocabularyFilter,
) -> Result<i64, sqlx::Error> {
    let mut qb =
        QueryBuilder::<sqlx::Postgres>::new(r#"SELECT COUNT(*) as "count" FROM "words" WHERE 1=1"#);
    if let Some(ref language) = filter.language {
        qb.push(" AND \"language\" = ");
        qb.push_bind(language.clone());
    }
    if let Some(ref search) = filter.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (\"term\" ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR \"translation\" ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
    let row = qb.build().fetch_one(proxy.pool()).await?;
    Ok(row.try_get::<i64, _>("count").unwrap_or(0))
}

pub async fn select_words(
    proxy: &DatabaseProxy,
    filter: &VocabularyFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Word>, sqlx::Error> {
    let mut qb = QueryBuilder::<sqlx::Postgres>::new(r#"SELECT * FROM "words" WHERE 1=1"#);
    if let Some(ref language) = filter.language {
        qb.push(" AND \"language\" = ");
        qb.push_bind(language.clone());
    }
    if let Some(ref search) = filter.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (\"term\" ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR \"translation\" ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
    qb.push(" ORDER BY \"term\" ASC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let rows = qb.build().fetch_all(proxy.pool()).await?;
    Ok(rows.iter().map(map_word).collect())
}

pub async fn get_word(proxy: &DatabaseProxy, word_id: &str) -> Result<Option<Word>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT * FROM "words" WHERE "id" = $1 LIMIT 1"#)
        .bind(word_id)
        .fetch_optional(proxy.pool())
        .await?;
    Ok(row.map(|r| map_word(&r)))
}

pub async fn insert_word(proxy: &DatabaseProxy, word: &Word) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    sqlx::query(
        r#"
        INSERT INTO "words" (
            "id", "term", "translation", "phonetic", "partOfSpeech",
            "language", "audioUrl", "imageUrl", "createdAt", "updatedAt"
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(&word.id)
    .bind(&word.term)
    .bind(&word.translation)
    .bind(&word.phonetic)
    .bind(&word.part_of_speech)
    .bind(&word.language)
    .bind(&word.audio_url)
    .bind(&word.image_url)
    .bind(now)
    .bind(now)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn update_word(proxy: &DatabaseProxy, word: &Word) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    sqlx::query(
        r#"
        UPDATE "words"
        SET "term" = $1, "translation" = $2, "phonetic" = $3, "partOfSpeech" = $4,
            "language" = $5, "audioUrl" = $6, "imageUrl" = $7, "updatedAt" = $8
        WHERE "id" = $9
        "#,
    )
    .bind(&word.term)
    .bind(&word.translation)
    .bind(&word.phonetic)
    .bind(&word.part_of_speech)
    .bind(&word.language)
    .bind(&word.audio_url)
    .bind(&word.image_url)
    .bind(now)
    .bind(&word.id)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn delete_word(proxy: &DatabaseProxy, word_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(r#"DELETE FROM "words" WHERE "id" = $1"#)
        .bind(word_id)
        .execute(proxy.pool())
        .await?;
    Ok(())
}

pub async fn count_sentences(
    proxy: &DatabaseProxy,
    filter: &VocabularyFilter,
) -> Result<i64, sqlx::Error> {
    let mut qb = QueryBuilder::<sqlx::Postgres>::new(
        r#"SELECT COUNT(*) as "count" FROM "sentences" WHERE 1=1"#,
    );
    if let Some(ref language) = filter.language {
        qb.push(" AND \"language\" = ");
        qb.push_bind(language.clone());
    }
    if let Some(ref search) = filter.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (\"text\" ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR \"translation\" ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
    let row = qb.build().fetch_one(proxy.pool()).await?;
    Ok(row.try_get::<i64, _>("count").unwrap_or(0))
}

pub async fn select_sentences(
    proxy: &DatabaseProxy,
    filter: &VocabularyFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Sentence>, sqlx::Error> {
    let mut qb = QueryBuilder::<sqlx::Postgres>::new(r#"SELECT * FROM "sentences" WHERE 1=1"#);
    if let Some(ref language) = filter.language {
        qb.push(" AND \"language\" = ");
        qb.push_bind(language.clone());
    }
    if let Some(ref search) = filter.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (\"text\" ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR \"translation\" ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
    qb.push(" ORDER BY \"createdAt\" DESC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let rows = qb.build().fetch_all(proxy.pool()).await?;
    Ok(rows.iter().map(map_sentence).collect())
}

pub async fn get_sentence(
    proxy: &DatabaseProxy,
    sentence_id: &str,
) -> Result<Option<Sentence>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT * FROM "sentences" WHERE "id" = $1 LIMIT 1"#)
        .bind(sentence_id)
        .fetch_optional(proxy.pool())
        .await?;
    Ok(row.map(|r| map_sentence(&r)))
}

pub async fn insert_sentence(
    proxy: &DatabaseProxy,
    sentence: &Sentence,
) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    sqlx::query(
        r#"
        INSERT INTO "sentences" (
            "id", "text", "translation", "language", "audioUrl", "createdAt", "updatedAt"
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(&sentence.id)
    .bind(&sentence.text)
    .bind(&sentence.translation)
    .bind(&sentence.language)
    .bind(&sentence.audio_url)
    .bind(now)
    .bind(now)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn update_sentence(
    proxy: &DatabaseProxy,
    sentence: &Sentence,
) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    sqlx::query(
        r#"
        UPDATE "sentences"
        SET "text" = $1, "translation" = $2, "language" = $3, "audioUrl" = $4, "updatedAt" = $5
        WHERE "id" = $6
        "#,
    )
    .bind(&sentence.text)
    .bind(&sentence.translation)
    .bind(&sentence.language)
    .bind(&sentence.audio_url)
    .bind(now)
    .bind(&sentence.id)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn delete_sentence(proxy: &DatabaseProxy, sentence_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(r#"DELETE FROM "sentences" WHERE "id" = $1"#)
        .bind(sentence_id)
        .execute(proxy.pool())
        .await?;
    Ok(())
}

pub(crate) fn map_word(row: &sqlx::postgres::PgRow) -> Word {
    let created_at: NaiveDateTime = row
        .try_get("createdAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at: NaiveDateTime = row
        .try_get("updatedAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    Word {
        id: row.try_get("id").unwrap_or_default(),
        term: row.try_get("term").unwrap_or_default(),
        translation: row.try_get("translation").unwrap_or_default(),
        phonetic: row.try_get("phonetic").ok().flatten(),
        part_of_speech: row.try_get("partOfSpeech").ok().flatten(),
        language: row.try_get("language").unwrap_or_default(),
        audio_url: row.try_get("audioUrl").ok().flatten(),
        image_url: row.try_get("imageUrl").ok().flatten(),
        created_at: format_naive_iso(created_at),
        updated_at: format_naive_iso(updated_at),
    }
}

pub(crate) fn map_sentence(row: &sqlx::postgres::PgRow) -> Sentence {
    let created_at: NaiveDateTime = row
        .try_get("createdAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at: NaiveDateTime = row
        .try_get("updatedAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    Sentence {
        id: row.try_get("id").unwrap_or_default(),
        text: row.try_get("text").unwrap_or_default(),
        translation: row.try_get("translation").unwrap_or_default(),
        language: row.try_get("language").unwrap_or_default(),
        audio_url: row.try_get("audioUrl").ok().flatten(),
        created_at: format_naive_iso(created_at),
        updated_at: format_naive_iso(updated_at),
    }
}
