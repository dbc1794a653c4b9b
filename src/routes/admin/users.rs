use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Serialize)]
struct SuccessResponse<T> {
    success: bool,
    data: T,
}

#[derive(Serialize)]
struct MessageResponse {
    success: bool,
    message: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListUsersQuery {
    page: Option<i64>,
    page_size: Option<i64>,
    search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateUserRoleRequest {
    role: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgressQuery {
    limit: Option<i64>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user).delete(delete_user))
        .route("/:id/role", put(update_user_role))
        .route("/:id/progress", get(get_user_progress))
        .route("/:id/achievements", get(get_user_achievements))
}

async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let params = crate::services::users::ListUsersParams {
        page: query.page.unwrap_or(1).max(1),
        page_size: query.page_size.unwrap_or(20).clamp(1, 200),
        search: query.search,
    };

    match crate::services::users::list_users(proxy.as_ref(), params).await {
        Ok(data) => Json(SuccessResponse {
            success: true,
            data,
        })
        .into_response(),
        Err(err) => super::admin_error_response(err),
    }
}

async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match crate::services::users::get_user_detail(proxy.as_ref(), &id).await {
        Ok(data) => Json(SuccessResponse {
            success: true,
            data,
        })
        .into_response(),
        Err(err) => super::admin_error_response(err),
    }
}

async fn update_user_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(admin): Extension<crate::auth::AuthUser>,
    Json(payload): Json<UpdateUserRoleRequest>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match crate::services::users::update_user_role(proxy.as_ref(), &id, &payload.role, &admin.id)
        .await
    {
        Ok(data) => Json(SuccessResponse {
            success: true,
            data,
        })
        .into_response(),
        Err(err) => super::admin_error_response(err),
    }
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(admin): Extension<crate::auth::AuthUser>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match crate::services::users::delete_user(proxy.as_ref(), &id, &admin.id).await {
        Ok(()) => Json(MessageResponse {
            success: true,
            message: "user deleted",
        })
        .into_response(),
        Err(err) => super::admin_error_response(err),
    }
}

async fn get_user_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ProgressQuery>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    match crate::services::users::list_user_progress(proxy.as_ref(), &id, limit).await {
        Ok(data) => Json(SuccessResponse {
            success: true,
            data,
        })
        .into_response(),
        Err(err) => super::admin_error_response(err),
    }
}

async fn get_user_achievements(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match crate::services::users::list_user_achievements(proxy.as_ref(), &id).await {
        Ok(data) => Json(SuccessResponse {
            success: true,
            data,
        })
        .into_response(),
        Err(err) => super::admin_error_response(err),
    }
}
