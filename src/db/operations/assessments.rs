use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Row};

use crate::db::operations::format_naive_iso;
use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub module_id: String,
    pub title: String,
    pub content: serde_json::Value,
    pub sort_order: i32,
    pub is_published: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub content: serde_json::Value,
    pub explanation: Option<String>,
    pub difficulty: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: String,
    pub course_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub pass_score: i32,
    pub duration_minutes: i32,
    pub is_published: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// One exam slot: the join row plus the question it points at.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamQuestion {
    pub id: String,
    pub question_id: String,
    pub sort_order: i32,
    pub points: i32,
    pub content: serde_json::Value,
    pub explanation: Option<String>,
    pub difficulty: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct ExerciseFilter {
    pub module_id: Option<String>,
    pub content_type: Option<String>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct QuestionFilter {
    pub content_type: Option<String>,
    pub difficulty: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct ExamFilter {
    pub course_id: Option<String>,
    pub is_published: Option<bool>,
    pub search: Option<String>,
}

pub async fn count_exercises(
    proxy: &DatabaseProxy,
    filter: &ExerciseFilter,
) -> Result<i64, sqlx::Error> {
    let mut qb =
        QueryBuilder::<sqlx::Postgres>::new(r#"SELECT COUNT(*) as "count" FROM "exercises" WHERE 1=1"#);
    push_exercise_filters(&mut qb, filter);
    let row = qb.build().fetch_one(proxy.pool()).await?;
    Ok(row.try_get::<i64, _>("count").unwrap_or(0))
}

pub async fn select_exercises(
    proxy: &DatabaseProxy,
    filter: &ExerciseFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Exercise>, sqlx::Error> {
    let mut qb = QueryBuilder::<sqlx::Postgres>::new(r#"SELECT * FROM "exercises" WHERE 1=1"#);
    push_exercise_filters(&mut qb, filter);
    qb.push(" ORDER BY \"sortOrder\" ASC, \"createdAt\" ASC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let rows = qb.build().fetch_all(proxy.pool()).await?;
    Ok(rows.iter().map(map_exercise).collect())
}

fn push_exercise_filters(qb: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &ExerciseFilter) {
    if let Some(ref module_id) = filter.module_id {
        qb.push(" AND \"moduleId\" = ");
        qb.push_bind(module_id.clone());
    }
    if let Some(ref content_type) = filter.content_type {
        qb.push(" AND \"content\"->>'type' = ");
        qb.push_bind(content_type.clone());
    }
    if let Some(is_published) = filter.is_published {
        qb.push(" AND \"isPublished\" = ");
        qb.push_bind(is_published);
    }
}

pub async fn get_exercise(
    proxy: &DatabaseProxy,
    exercise_id: &str,
) -> Result<Option<Exercise>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT * FROM "exercises" WHERE "id" = $1 LIMIT 1"#)
        .bind(exercise_id)
        .fetch_optional(proxy.pool())
        .await?;
    Ok(row.map(|r| map_exercise(&r)))
}

pub async fn insert_exercise(
    proxy: &DatabaseProxy,
    exercise: &Exercise,
) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    sqlx::query(
        r#"
        INSERT INTO "exercises" (
            "id", "moduleId", "title", "content", "sortOrder", "isPublished",
            "createdAt", "updatedAt"
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(&exercise.id)
    .bind(&exercise.module_id)
    .bind(&exercise.title)
    .bind(&exercise.content)
    .bind(exercise.sort_order)
    .bind(exercise.is_published)
    .bind(now)
    .bind(now)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn update_exercise(
    proxy: &DatabaseProxy,
    exercise: &Exercise,
) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    sqlx::query(
        r#"
        UPDATE "exercises"
        SET "moduleId" = $1, "title" = $2, "content" = $3, "sortOrder" = $4,
            "isPublished" = $5, "updatedAt" = $6
        WHERE "id" = $7
        "#,
    )
    .bind(&exercise.module_id)
    .bind(&exercise.title)
    .bind(&exercise.content)
    .bind(exercise.sort_order)
    .bind(exercise.is_published)
    .bind(now)
    .bind(&exercise.id)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn delete_exercise(proxy: &DatabaseProxy, exercise_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(r#"DELETE FROM "exercises" WHERE "id" = $1"#)
        .bind(exercise_id)
        .execute(proxy.pool())
        .await?;
    Ok(())
}

pub async fn count_questions(
    proxy: &DatabaseProxy,
    filter: &QuestionFilter,
) -> Result<i64, sqlx::Error> {
    let mut qb =
        QueryBuilder::<sqlx::Postgres>::new(r#"SELECT COUNT(*) as "count" FROM "questions" WHERE 1=1"#);
    push_question_filters(&mut qb, filter);
    let row = qb.build().fetch_one(proxy.pool()).await?;
    Ok(row.try_get::<i64, _>("count").unwrap_or(0))
}

pub async fn select_questions(
    proxy: &DatabaseProxy,
    filter: &QuestionFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Question>, sqlx::Error> {
    let mut qb = QueryBuilder::<sqlx::Postgres>::new(r#"SELECT * FROM "questions" WHERE 1=1"#);
    push_question_filters(&mut qb, filter);
    qb.push(" ORDER BY \"createdAt\" DESC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let rows = qb.build().fetch_all(proxy.pool()).await?;
    Ok(rows.iter().map(map_question).collect())
}

fn push_question_filters(qb: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &QuestionFilter) {
    if let Some(ref content_type) = filter.content_type {
        qb.push(" AND \"content\"->>'type' = ");
        qb.push_bind(content_type.clone());
    }
    if let Some(difficulty) = filter.difficulty {
        qb.push(" AND \"difficulty\" = ");
        qb.push_bind(difficulty);
    }
}

pub async fn get_question(
    proxy: &DatabaseProxy,
    question_id: &str,
) -> Result<Option<Question>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT * FROM "questions" WHERE "id" = $1 LIMIT 1"#)
        .bind(question_id)
        .fetch_optional(proxy.pool())
        .await?;
    Ok(row.map(|r| map_question(&r)))
}

pub async fn insert_question(
    proxy: &DatabaseProxy,
    question: &Question,
) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    sqlx::query(
        r#"
        INSERT INTO "questions" (
            "id", "content", "explanation", "difficulty", "createdAt", "updatedAt"
        ) VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(&question.id)
    .bind(&question.content)
    .bind(&question.explanation)
    .bind(question.difficulty)
    .bind(now)
    .bind(now)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn update_question(
    proxy: &DatabaseProxy,
    question: &Question,
) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    sqlx::query(
        r#"
        UPDATE "questions"
        SET "content" = $1, "explanation" = $2, "difficulty" = $3, "updatedAt" = $4
        WHERE "id" = $5
        "#,
    )
    .bind(&question.content)
    .bind(&question.explanation)
    .bind(question.difficulty)
    .bind(now)
    .bind(&question.id)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn delete_question(proxy: &DatabaseProxy, question_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(r#"DELETE FROM "questions" WHERE "id" = $1"#)
        .bind(question_id)
        .execute(proxy.pool())
        .await?;
    Ok(())
}

pub async fn count_exams(proxy: &DatabaseProxy, filter: &ExamFilter) -> Result<i64, sqlx::Error> {
    let mut qb =
        QueryBuilder::<sqlx::Postgres>::new(r#"SELECT COUNT(*) as "count" FROM "exams" WHERE 1=1"#);
    push_exam_filters(&mut qb, filter);
    let row = qb.build().fetch_one(proxy.pool()).await?;
    Ok(row.try_get::<i64, _>("count").unwrap_or(0))
}

pub async fn select_exams(
    proxy: &DatabaseProxy,
    filter: &ExamFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Exam>, sqlx::Error> {
    let mut qb = QueryBuilder::<sqlx::Postgres>::new(r#"SELECT * FROM "exams" WHERE 1=1"#);
    push_exam_filters(&mut qb, filter);
    qb.push(" ORDER BY \"createdAt\" DESC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let rows = qb.build().fetch_all(proxy.pool()).await?;
    Ok(rows.iter().map(map_exam).collect())
}

fn push_exam_filters(qb: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &ExamFilter) {
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
        qb.push(" AND \"title\" ILIKE ");
        qb.push_bind(pattern);
    }
}

pub async fn get_exam(proxy: &DatabaseProxy, exam_id: &str) -> Result<Option<Exam>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT * FROM "exams" WHERE "id" = $1 LIMIT 1"#)
        .bind(exam_id)
        .fetch_optional(proxy.pool())
        .await?;
    Ok(row.map(|r| map_exam(&r)))
}

pub async fn insert_exam(proxy: &DatabaseProxy, exam: &Exam) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    sqlx::query(
        r#"
        INSERT INTO "exams" (
            "id", "courseId", "title", "description", "passScore",
            "durationMinutes", "isPublished", "createdAt", "updatedAt"
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(&exam.id)
    .bind(&exam.course_id)
    .bind(&exam.title)
    .bind(&exam.description)
    .bind(exam.pass_score)
    .bind(exam.duration_minutes)
    .bind(exam.is_published)
    .bind(now)
    .bind(now)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn update_exam(proxy: &DatabaseProxy, exam: &Exam) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    sqlx::query(
        r#"
        UPDATE "exams"
        SET "courseId" = $1, "title" = $2, "description" = $3, "passScore" = $4,
            "durationMinutes" = $5, "isPublished" = $6, "updatedAt" = $7
        WHERE "id" = $8
        "#,
    )
    .bind(&exam.course_id)
    .bind(&exam.title)
    .bind(&exam.description)
    .bind(exam.pass_score)
    .bind(exam.duration_minutes)
    .bind(exam.is_published)
    .bind(now)
    .bind(&exam.id)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn delete_exam(proxy: &DatabaseProxy, exam_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(r#"DELETE FROM "exams" WHERE "id" = $1"#)
        .bind(exam_id)
        .execute(proxy.pool())
        .await?;
    Ok(())
}

pub async fn get_exam_questions(
    proxy: &DatabaseProxy,
    exam_id: &str,
) -> Result<Vec<ExamQuestion>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT
          eq."id" as "id",
          eq."questionId" as "questionId",
          eq."sortOrder" as "sortOrder",
          eq."points" as "points",
          q."content" as "content",
          q."explanation" as "explanation",
          q."difficulty" as "difficulty"
        FROM "exam_questions" eq
        JOIN "questions" q ON q."id" = eq."questionId"
        WHERE eq."examId" = $1
        ORDER BY eq."sortOrder" ASC
        "#,
    )
    .bind(exam_id)
    .fetch_all(proxy.pool())
    .await?;

    Ok(rows
        .iter()
        .map(|row| ExamQuestion {
            id: row.try_get("id").unwrap_or_default(),
            question_id: row.try_get("questionId").unwrap_or_default(),
            sort_order: row.try_get("sortOrder").unwrap_or(0),
            points: row.try_get("points").unwrap_or(1),
            content: row
                .try_get("content")
                .unwrap_or(serde_json::Value::Null),
            explanation: row.try_get("explanation").ok().flatten(),
            difficulty: row.try_get("difficulty").ok().flatten(),
        })
        .collect())
}

pub async fn attach_exam_question(
    proxy: &DatabaseProxy,
    exam_id: &str,
    question_id: &str,
    points: i32,
) -> Result<String, sqlx::Error> {
    let next_order: i32 = sqlx::query_scalar(
        r#"SELECT COALESCE(MAX("sortOrder") + 1, 0) FROM "exam_questions" WHERE "examId" = $1"#,
    )
    .bind(exam_id)
    .fetch_one(proxy.pool())
    .await?;

    let id = uuid::Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO "exam_questions" ("id", "examId", "questionId", "sortOrder", "points")
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT ("examId", "questionId") DO NOTHING
        "#,
    )
    .bind(&id)
    .bind(exam_id)
    .bind(question_id)
    .bind(next_order)
    .bind(points)
    .execute(proxy.pool())
    .await?;
    Ok(id)
}

pub async fn detach_exam_question(
    proxy: &DatabaseProxy,
    exam_id: &str,
    question_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"DELETE FROM "exam_questions" WHERE "examId" = $1 AND "questionId" = $2"#,
    )
    .bind(exam_id)
    .bind(question_id)
    .execute(proxy.pool())
    .await?;
    Ok(result.rows_affected())
}

/// Rewrites the ordering of an exam's question slots to match the submitted
/// id sequence. Ids not attached to the exam are ignored.
pub async fn reorder_exam_questions(
    proxy: &DatabaseProxy,
    exam_id: &str,
    question_ids: &[String],
) -> Result<(), sqlx::Error> {
    let mut tx = proxy.pool().begin().await?;

    for (index, question_id) in question_ids.iter().enumerate() {
        sqlx::query(
            r#"UPDATE "exam_questions" SET "sortOrder" = $1 WHERE "examId" = $2 AND "questionId" = $3"#,
        )
        .bind(index as i32)
        .bind(exam_id)
        .bind(question_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

fn map_exercise(row: &sqlx::postgres::PgRow) -> Exercise {
    let created_at: NaiveDateTime = row
        .try_get("createdAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at: NaiveDateTime = row
        .try_get("updatedAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    Exercise {
        id: row.try_get("id").unwrap_or_default(),
        module_id: row.try_get("moduleId").unwrap_or_default(),
        title: row.try_get("title").unwrap_or_default(),
        content: row.try_get("content").unwrap_or(serde_json::Value::Null),
        sort_order: row.try_get("sortOrder").unwrap_or(0),
        is_published: row.try_get("isPublished").unwrap_or(false),
        created_at: format_naive_iso(created_at),
        updated_at: format_naive_iso(updated_at),
    }
}

fn map_question(row: &sqlx::postgres::PgRow) -> Question {
    let created_at: NaiveDateTime = row
        .try_get("createdAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at: NaiveDateTime = row
        .try_get("updatedAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    Question {
        id: row.try_get("id").unwrap_or_default(),
        content: row.try_get("content").unwrap_or(serde_json::Value::Null),
        explanation: row.try_get("explanation").ok().flatten(),
        difficulty: row.try_get("difficulty").ok().flatten(),
        created_at: format_naive_iso(created_at),
        updated_at: format_naive_iso(updated_at),
    }
}

fn map_exam(row: &sqlx::postgres::PgRow) -> Exam {
    let created_at: NaiveDateTime = row
        .try_get("createdAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at: NaiveDateTime = row
        .try_get("updatedAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    Exam {
        id: row.try_get("id").unwrap_or_default(),
        course_id: row.try_get("courseId").ok().flatten(),
        title: row.try_get("title").unwrap_or_default(),
        description: row.try_get("description").ok().flatten(),
        pass_score: row.try_get("passScore").unwrap_or(60),
        duration_minutes: row.try_get("durationMinutes").unwrap_or(30),
        is_published: row.try_get("isPublished").unwrap_or(false),
        created_at: format_naive_iso(created_at),
        updated_at: format_naive_iso(updated_at),
    }
}
