use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::operations::catalog::{self, Category};
use crate::response::json_error;
use crate::services::listing::{self, Pagination};
use crate::services::slug::resolve_slug;
use crate::state::AppState;

#[derive(Serialize)]
struct SuccessResponse<T> {
    success: bool,
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    page: Option<i64>,
    page_size: Option<i64>,
    search: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryListData {
    categories: Vec<Category>,
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCategoryInput {
    name: String,
    slug: Option<String>,
    description: Option<String>,
    icon_url: Option<String>,
    color: Option<String>,
    sort_order: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateCategoryInput {
    name: Option<String>,
    slug: Option<String>,
    description: Option<String>,
    icon_url: Option<String>,
    color: Option<String>,
    sort_order: Option<i32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteCategoryData {
    deleted: bool,
    promoted: Option<Category>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/:id/featured", put(feature_category))
}

async fn list_categories(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let page = listing::clamp_page(query.page);
    let page_size = listing::clamp_page_size(query.page_size);
    let offset = (page - 1) * page_size;
    let search = listing::normalize_search(query.search.as_deref());

    let total = match catalog::count_categories(proxy.as_ref(), search.as_deref()).await {
        Ok(total) => total,
        Err(err) => return super::sql_error_response(err),
    };

    let categories = if total == 0 {
        Vec::new()
    } else {
        match catalog::select_categories(proxy.as_ref(), search.as_deref(), page_size, offset).await
        {
            Ok(rows) => rows,
            Err(err) => return super::sql_error_response(err),
        }
    };

    Json(SuccessResponse {
        success: true,
        data: CategoryListData {
            categories,
            pagination: listing::build_pagination(page, page_size, total),
        },
    })
    .into_response()
}

async fn get_category(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match catalog::get_category(proxy.as_ref(), &id).await {
        Ok(Some(category)) => Json(SuccessResponse {
            success: true,
            data: category,
        })
        .into_response(),
        Ok(None) => {
            json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "category not found").into_response()
        }
        Err(err) => super::sql_error_response(err),
    }
}

async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CreateCategoryInput>,
) -> Response {
    if input.name.trim().is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "category name must not be empty",
        )
        .into_response();
    }

    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    let category = Category {
        id: uuid::Uuid::new_v4().to_string(),
        name: input.name.trim().to_string(),
        slug: resolve_slug(input.slug.as_deref(), &input.name),
        description: input.description,
        icon_url: input.icon_url,
        color: input.color,
        is_featured: false,
        sort_order: input.sort_order.unwrap_or(0),
        created_at: now.clone(),
        updated_at: now,
    };

    if let Err(err) = catalog::insert_category(proxy.as_ref(), &category).await {
        return super::sql_error_response(err);
    }

    (
        StatusCode::CREATED,
        Json(SuccessResponse {
            success: true,
            data: category,
        }),
    )
        .into_response()
}

async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateCategoryInput>,
) -> Response {
    if let Some(ref name) = input.name {
        if name.trim().is_empty() {
            return json_error(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "category name must not be empty",
            )
            .into_response();
        }
    }

    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let mut category = match catalog::get_category(proxy.as_ref(), &id).await {
        Ok(Some(category)) => category,
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "category not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    };

    if let Some(name) = input.name {
        category.name = name.trim().to_string();
    }
    if let Some(slug) = input.slug {
        category.slug = resolve_slug(Some(&slug), &category.name);
    }
    if let Some(description) = input.description {
        category.description = Some(description);
    }
    if let Some(icon_url) = input.icon_url {
        category.icon_url = Some(icon_url);
    }
    if let Some(color) = input.color {
        category.color = Some(color);
    }
    if let Some(sort_order) = input.sort_order {
        category.sort_order = sort_order;
    }

    if let Err(err) = catalog::update_category(proxy.as_ref(), &category).await {
        return super::sql_error_response(err);
    }

    match catalog::get_category(proxy.as_ref(), &id).await {
        Ok(Some(updated)) => Json(SuccessResponse {
            success: true,
            data: updated,
        })
        .into_response(),
        Ok(None) => {
            json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "category not found").into_response()
        }
        Err(err) => super::sql_error_response(err),
    }
}

async fn delete_category(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match crate::services::catalog::delete_category(proxy.as_ref(), &id).await {
        Ok(promoted) => Json(SuccessResponse {
            success: true,
            data: DeleteCategoryData {
                deleted: true,
                promoted,
            },
        })
        .into_response(),
        Err(err) => super::admin_error_response(err),
    }
}

async fn feature_category(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match crate::services::catalog::feature_category(proxy.as_ref(), &id).await {
        Ok(category) => Json(SuccessResponse {
            success: true,
            data: category,
        })
        .into_response(),
        Err(err) => super::admin_error_response(err),
    }
}
