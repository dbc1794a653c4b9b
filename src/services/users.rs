use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use sqlx::{QueryBuilder, Row};

use crate::db::operations::user::{self, Achievement, Membership, ProgressRecord, Streak};
use crate::db::operations::format_naive_iso;
use crate::db::DatabaseProxy;
use crate::services::listing::{build_pagination, Pagination};
use crate::services::AdminError;

#[derive(Debug, Clone)]
pub struct ListUsersParams {
    pub page: i64,
    pub page_size: i64,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListItem {
    pub id: String,
    pub email: String,
    pub username: String,
    pub role: String,
    pub avatar_url: Option<String>,
    pub created_at: String,
    pub membership_plan: Option<String>,
    pub lessons_completed: i64,
    pub last_activity_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResult {
    pub users: Vec<UserListItem>,
    pub total: i64,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetailCounts {
    pub achievements: i64,
    pub progress_records: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    pub id: String,
    pub email: String,
    pub username: String,
    pub role: String,
    pub avatar_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub membership: Option<Membership>,
    pub streak: Option<Streak>,
    #[serde(rename = "_count")]
    pub count: UserDetailCounts,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRoleResult {
    pub id: String,
    pub email: String,
    pub username: String,
    pub role: String,
    pub updated_at: String,
}

pub async fn list_users(
    proxy: &DatabaseProxy,
    params: ListUsersParams,
) -> Result<UserListResult, AdminError> {
    let page = params.page.max(1);
    let page_size = params.page_size.clamp(1, 200);
    let offset = (page - 1) * page_size;
    let search = crate::services::listing::normalize_search(params.search.as_deref());

    let total = count_users(proxy, search.as_deref()).await?;

    let users = if total == 0 {
        Vec::new()
    } else {
        select_users(proxy, search.as_deref(), page_size, offset).await?
    };

    Ok(UserListResult {
        users,
        total,
        pagination: build_pagination(page, page_size, total),
    })
}

pub async fn get_user_detail(
    proxy: &DatabaseProxy,
    user_id: &str,
) -> Result<UserDetail, AdminError> {
    let Some(found) = user::get_user(proxy, user_id).await? else {
        return Err(AdminError::NotFound("user not found".to_string()));
    };

    let membership = user::get_membership_by_user(proxy, user_id).await?;
    let streak = user::get_streak_by_user(proxy, user_id).await?;
    let achievements = user::count_achievements_by_user(proxy, user_id).await?;
    let progress_records = user::count_progress_by_user(proxy, user_id).await?;

    Ok(UserDetail {
        id: found.id,
        email: found.email,
        username: found.username,
        role: found.role,
        avatar_url: found.avatar_url,
        created_at: found.created_at,
        updated_at: found.updated_at,
        membership,
        streak,
        count: UserDetailCounts {
            achievements,
            progress_records,
        },
    })
}

pub async fn update_user_role(
    proxy: &DatabaseProxy,
    user_id: &str,
    role: &str,
    acting_admin_id: &str,
) -> Result<UpdateUserRoleResult, AdminError> {
    let normalized = role.trim().to_ascii_uppercase();
    if normalized != "USER" && normalized != "ADMIN" {
        return Err(AdminError::Validation(
            "role must be USER or ADMIN".to_string(),
        ));
    }

    if user_id == acting_admin_id && normalized != "ADMIN" {
        return Err(AdminError::Forbidden(
            "admins cannot demote themselves".to_string(),
        ));
    }

    let affected = user::update_user_role(proxy, user_id, &normalized).await?;
    if affected == 0 {
        return Err(AdminError::NotFound("user not found".to_string()));
    }

    // role changes invalidate every open session of that user
    let _ = user::delete_user_sessions(proxy, user_id).await;

    let Some(updated) = user::get_user(proxy, user_id).await? else {
        return Err(AdminError::NotFound("user not found".to_string()));
    };

    Ok(UpdateUserRoleResult {
        id: updated.id,
        email: updated.email,
        username: updated.username,
        role: updated.role,
        updated_at: updated.updated_at,
    })
}

pub async fn delete_user(
    proxy: &DatabaseProxy,
    user_id: &str,
    acting_admin_id: &str,
) -> Result<(), AdminError> {
    if user_id == acting_admin_id {
        return Err(AdminError::Forbidden(
            "admins cannot delete their own account".to_string(),
        ));
    }

    let _ = user::delete_user_sessions(proxy, user_id).await;

    let affected = user::delete_user(proxy, user_id).await?;
    if affected == 0 {
        return Err(AdminError::NotFound("user not found".to_string()));
    }
    Ok(())
}

pub async fn list_user_progress(
    proxy: &DatabaseProxy,
    user_id: &str,
    limit: i64,
) -> Result<Vec<ProgressRecord>, AdminError> {
    if user::get_user(proxy, user_id).await?.is_none() {
        return Err(AdminError::NotFound("user not found".to_string()));
    }
    Ok(user::get_progress_by_user(proxy, user_id, limit).await?)
}

pub async fn list_user_achievements(
    proxy: &DatabaseProxy,
    user_id: &str,
) -> Result<Vec<Achievement>, AdminError> {
    if user::get_user(proxy, user_id).await?.is_none() {
        return Err(AdminError::NotFound("user not found".to_string()));
    }
    Ok(user::get_achievements_by_user(proxy, user_id).await?)
}

async fn count_users(proxy: &DatabaseProxy, search: Option<&str>) -> Result<i64, sqlx::Error> {
    let mut qb =
        QueryBuilder::<sqlx::Postgres>::new(r#"SELECT COUNT(*) as "count" FROM "users" u WHERE 1=1"#);
    if let Some(search) = search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (u.\"email\" ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR u.\"username\" ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
    let row = qb.build().fetch_one(proxy.pool()).await?;
    Ok(row.try_get::<i64, _>("count").unwrap_or(0))
}

async fn select_users(
    proxy: &DatabaseProxy,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<UserListItem>, sqlx::Error> {
    let mut qb = QueryBuilder::<sqlx::Postgres>::new(
        r#"
        SELECT
          u."id" as "id",
          u."email" as "email",
          u."username" as "username",
          u."role"::text as "role",
          u."avatarUrl" as "avatarUrl",
          u."createdAt" as "createdAt",
          m."plan" as "membershipPlan",
          COALESCE(progress."lessonsCompleted", 0) as "lessonsCompleted",
          progress."lastActivityAt" as "lastActivityAt"
        FROM "users" u
        LEFT JOIN (
          SELECT
            pr."userId" as "userId",
            COUNT(*) FILTER (WHERE pr."status" = 'COMPLETED') as "lessonsCompleted",
            MAX(pr."completedAt") as "lastActivityAt"
          FROM "progress_records" pr
          GROUP BY pr."userId"
        ) progress ON progress."userId" = u."id"
        LEFT JOIN (
          SELECT DISTINCT ON ("userId") "userId", "plan"
          FROM "memberships"
          ORDER BY "userId", "startedAt" DESC
        ) m ON m."userId" = u."id"
        WHERE 1=1
        "#,
    );
    if let Some(search) = search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (u.\"email\" ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR u.\"username\" ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
    qb.push(" ORDER BY u.\"createdAt\" DESC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let rows = qb.build().fetch_all(proxy.pool()).await?;
    Ok(rows.into_iter().map(map_user_list_item).collect())
}

fn map_user_list_item(row: sqlx::postgres::PgRow) -> UserListItem {
    let created_at: NaiveDateTime = row
        .try_get("createdAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let last_activity: Option<NaiveDateTime> = row.try_get("lastActivityAt").ok().flatten();
    UserListItem {
        id: row.try_get("id").unwrap_or_default(),
        email: row.try_get("email").unwrap_or_default(),
        username: row.try_get("username").unwrap_or_default(),
        role: row.try_get("role").unwrap_or_else(|_| "USER".to_string()),
        avatar_url: row.try_get("avatarUrl").ok().flatten(),
        created_at: format_naive_iso(created_at),
        membership_plan: row.try_get("membershipPlan").ok().flatten(),
        lessons_completed: row.try_get("lessonsCompleted").unwrap_or(0),
        last_activity_at: last_activity.map(format_naive_iso),
    }
}
