use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Row};

use crate::db::operations::format_naive_iso;
use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub color: Option<String>,
    pub is_featured: bool,
    pub sort_order: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub category_id: String,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub language: String,
    pub level: String,
    pub is_published: bool,
    pub sort_order: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseModule {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub sort_order: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct CourseFilter {
    pub category_id: Option<String>,
    pub language: Option<String>,
    pub level: Option<String>,
    pub is_published: Option<bool>,
    pub search: Option<String>,
}

pub async fn count_categories(
    proxy: &DatabaseProxy,
    search: Option<&str>,
) -> Result<i64, sqlx::Error> {
    let mut qb =
        QueryBuilder::<sqlx::Postgres>::new(r#"SELECT COUNT(*) as "count" FROM "categories" WHERE 1=1"#);
    if let Some(search) = search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (\"name\" ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR \"slug\" ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
    let row = qb.build().fetch_one(proxy.pool()).await?;
    Ok(row.try_get::<i64, _>("count").unwrap_or(0))
}

pub async fn select_categories(
    proxy: &DatabaseProxy,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Category>, sqlx::Error> {
    let mut qb = QueryBuilder::<sqlx::Postgres>::new(r#"SELECT * FROM "categories" WHERE 1=1"#);
    if let Some(search) = search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (\"name\" ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR \"slug\" ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
    qb.push(" ORDER BY \"sortOrder\" ASC, \"createdAt\" ASC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let rows = qb.build().fetch_all(proxy.pool()).await?;
    Ok(rows.iter().map(map_category).collect())
}

pub async fn all_categories(proxy: &DatabaseProxy) -> Result<Vec<Category>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT * FROM "categories" ORDER BY "sortOrder" ASC, "createdAt" ASC"#,
    )
    .fetch_all(proxy.pool())
    .await?;
    Ok(rows.iter().map(map_category).collect())
}

pub async fn get_category(
    proxy: &DatabaseProxy,
    category_id: &str,
) -> Result<Option<Category>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT * FROM "categories" WHERE "id" = $1 LIMIT 1"#)
        .bind(category_id)
        .fetch_optional(proxy.pool())
        .await?;
    Ok(row.map(|r| map_category(&r)))
}

pub async fn insert_category(
    proxy: &DatabaseProxy,
    category: &Category,
) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    sqlx::query(
        r#"
        INSERT INTO "categories" (
            "id", "name", "slug", "description", "iconUrl", "color",
            "isFeatured", "sortOrder", "createdAt", "updatedAt"
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(&category.id)
    .bind(&category.name)
    .bind(&category.slug)
    .bind(&category.description)
    .bind(&category.icon_url)
    .bind(&category.color)
    .bind(category.is_featured)
    .bind(category.sort_order)
    .bind(now)
    .bind(now)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn update_category(
    proxy: &DatabaseProxy,
    category: &Category,
) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    sqlx::query(
        r#"
        UPDATE "categories"
        SET "name" = $1, "slug" = $2, "description" = $3, "iconUrl" = $4,
            "color" = $5, "sortOrder" = $6, "updatedAt" = $7
        WHERE "id" = $8
        "#,
    )
    .bind(&category.name)
    .bind(&category.slug)
    .bind(&category.description)
    .bind(&category.icon_url)
    .bind(&category.color)
    .bind(category.sort_order)
    .bind(now)
    .bind(&category.id)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn delete_category(proxy: &DatabaseProxy, category_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(r#"DELETE FROM "categories" WHERE "id" = $1"#)
        .bind(category_id)
        .execute(proxy.pool())
        .await?;
    Ok(())
}

pub async fn clear_featured(proxy: &DatabaseProxy) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    sqlx::query(
        r#"UPDATE "categories" SET "isFeatured" = false, "updatedAt" = $1 WHERE "isFeatured" = true"#,
    )
    .bind(now)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn mark_featured(proxy: &DatabaseProxy, category_id: &str) -> Result<u64, sqlx::Error> {
    let now = Utc::now().naive_utc();
    let result = sqlx::query(
        r#"UPDATE "categories" SET "isFeatured" = true, "updatedAt" = $1 WHERE "id" = $2"#,
    )
    .bind(now)
    .bind(category_id)
    .execute(proxy.pool())
    .await?;
    Ok(result.rows_affected())
}

pub async fn count_courses(
    proxy: &DatabaseProxy,
    filter: &CourseFilter,
) -> Result<i64, sqlx::Error> {
    let mut qb =
        QueryBuilder::<sqlx::Postgres>::new(r#"SELECT COUNT(*) as "count" FROM "courses" WHERE 1=1"#);
    push_course_filters(&mut qb, filter);
    let row = qb.build().fetch_one(proxy.pool()).await?;
    Ok(row.try_get::<i64, _>("count").unwrap_or(0))
}

pub async fn select_courses(
    proxy: &DatabaseProxy,
    filter: &CourseFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Course>, sqlx::Error> {
    let mut qb = QueryBuilder::<sqlx::Postgres>::new(r#"SELECT * FROM "courses" WHERE 1=1"#);
    push_course_filters(&mut qb, filter);
    qb.push(" ORDER BY \"sortOrder\" ASC, \"createdAt\" DESC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let rows = qb.build().fetch_all(proxy.pool()).await?;
    Ok(rows.iter().map(map_course).collect())
}

fn push_course_filters(qb: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &CourseFilter) {
    if let Some(ref category_id) = filter.category_id {
        qb.push(" AND \"categoryId\" = ");
        qb.push_bind(category_id.clone());
    }
    if let Some(ref language) = filter.language {
        qb.push(" AND \"language\" = ");
        qb.push_bind(language.clone());
    }
    if let Some(ref level) = filter.level {
        qb.push(" AND \"level\"::text = ");
        qb.push_bind(level.clone());
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

pub async fn get_course(
    proxy: &DatabaseProxy,
    course_id: &str,
) -> Result<Option<Course>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT * FROM "courses" WHERE "id" = $1 LIMIT 1"#)
        .bind(course_id)
        .fetch_optional(proxy.pool())
        .await?;
    Ok(row.map(|r| map_course(&r)))
}

pub async fn insert_course(proxy: &DatabaseProxy, course: &Course) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    sqlx::query(
        r#"
        INSERT INTO "courses" (
            "id", "categoryId", "title", "slug", "description", "coverImage",
            "language", "level", "isPublished", "sortOrder", "createdAt", "updatedAt"
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(&course.id)
    .bind(&course.category_id)
    .bind(&course.title)
    .bind(&course.slug)
    .bind(&course.description)
    .bind(&course.cover_image)
    .bind(&course.language)
    .bind(&course.level)
    .bind(course.is_published)
    .bind(course.sort_order)
    .bind(now)
    .bind(now)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn update_course(proxy: &DatabaseProxy, course: &Course) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    sqlx::query(
        r#"
        UPDATE "courses"
        SET "categoryId" = $1, "title" = $2, "slug" = $3, "description" = $4,
            "coverImage" = $5, "language" = $6, "level" = $7, "isPublished" = $8,
            "sortOrder" = $9, "updatedAt" = $10
        WHERE "id" = $11
        "#,
    )
    .bind(&course.category_id)
    .bind(&course.title)
    .bind(&course.slug)
    .bind(&course.description)
    .bind(&course.cover_image)
    .bind(&course.language)
    .bind(&course.level)
    .bind(course.is_published)
    .bind(course.sort_order)
    .bind(now)
    .bind(&course.id)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn delete_course(proxy: &DatabaseProxy, course_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(r#"DELETE FROM "courses" WHERE "id" = $1"#)
        .bind(course_id)
        .execute(proxy.pool())
        .await?;
    Ok(())
}

pub async fn get_modules_by_course(
    proxy: &DatabaseProxy,
    course_id: &str,
) -> Result<Vec<CourseModule>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT * FROM "modules" WHERE "courseId" = $1 ORDER BY "sortOrder" ASC, "createdAt" ASC"#,
    )
    .bind(course_id)
    .fetch_all(proxy.pool())
    .await?;
    Ok(rows.iter().map(map_module).collect())
}

pub async fn get_module(
    proxy: &DatabaseProxy,
    module_id: &str,
) -> Result<Option<CourseModule>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT * FROM "modules" WHERE "id" = $1 LIMIT 1"#)
        .bind(module_id)
        .fetch_optional(proxy.pool())
        .await?;
    Ok(row.map(|r| map_module(&r)))
}

pub async fn insert_module(
    proxy: &DatabaseProxy,
    module: &CourseModule,
) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    sqlx::query(
        r#"
        INSERT INTO "modules" ("id", "courseId", "title", "sortOrder", "createdAt", "updatedAt")
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(&module.id)
    .bind(&module.course_id)
    .bind(&module.title)
    .bind(module.sort_order)
    .bind(now)
    .bind(now)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn update_module(
    proxy: &DatabaseProxy,
    module: &CourseModule,
) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    sqlx::query(
        r#"UPDATE "modules" SET "title" = $1, "sortOrder" = $2, "updatedAt" = $3 WHERE "id" = $4"#,
    )
    .bind(&module.title)
    .bind(module.sort_order)
    .bind(now)
    .bind(&module.id)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn delete_module(proxy: &DatabaseProxy, module_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(r#"DELETE FROM "modules" WHERE "id" = $1"#)
        .bind(module_id)
        .execute(proxy.pool())
        .await?;
    Ok(())
}

fn map_category(row: &sqlx::postgres::PgRow) -> Category {
    let created_at: NaiveDateTime = row
        .try_get("createdAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at: NaiveDateTime = row
        .try_get("updatedAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    Category {
        id: row.try_get("id").unwrap_or_default(),
        name: row.try_get("name").unwrap_or_default(),
        slug: row.try_get("slug").unwrap_or_default(),
        description: row.try_get("description").ok().flatten(),
        icon_url: row.try_get("iconUrl").ok().flatten(),
        color: row.try_get("color").ok().flatten(),
        is_featured: row.try_get("isFeatured").unwrap_or(false),
        sort_order: row.try_get("sortOrder").unwrap_or(0),
        created_at: format_naive_iso(created_at),
        updated_at: format_naive_iso(updated_at),
    }
}

fn map_course(row: &sqlx::postgres::PgRow) -> Course {
    let created_at: NaiveDateTime = row
        .try_get("createdAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at: NaiveDateTime = row
        .try_get("updatedAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    Course {
        id: row.try_get("id").unwrap_or_default(),
        category_id: row.try_get("categoryId").unwrap_or_default(),
        title: row.try_get("title").unwrap_or_default(),
        slug: row.try_get("slug").unwrap_or_default(),
        description: row.try_get("description").ok().flatten(),
        cover_image: row.try_get("coverImage").ok().flatten(),
        language: row.try_get("language").unwrap_or_default(),
        level: row
            .try_get("level")
            .unwrap_or_else(|_| "BEGINNER".to_string()),
        is_published: row.try_get("isPublished").unwrap_or(false),
        sort_order: row.try_get("sortOrder").unwrap_or(0),
        created_at: format_naive_iso(created_at),
        updated_at: format_naive_iso(updated_at),
    }
}

fn map_module(row: &sqlx::postgres::PgRow) -> CourseModule {
    let created_at: NaiveDateTime = row
        .try_get("createdAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at: NaiveDateTime = row
        .try_get("updatedAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    CourseModule {
        id: row.try_get("id").unwrap_or_default(),
        course_id: row.try_get("courseId").unwrap_or_default(),
        title: row.try_get("title").unwrap_or_default(),
        sort_order: row.try_get("sortOrder").unwrap_or(0),
        created_at: format_naive_iso(created_at),
        updated_at: format_naive_iso(updated_at),
    }
}
