use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::operations::media::{self, MediaFilter, Story};
use crate::response::json_error;
use crate::services::catalog::validate_level;
use crate::services::listing::{self, Pagination};
use crate::services::slug::resolve_slug;
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
struct ListQuery {
    page: Option<i64>,
    page_size: Option<i64>,
    search: Option<String>,
    language: Option<String>,
    level: Option<String>,
    is_published: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoryListData {
    stories: Vec<Story>,
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateStoryInput {
    title: String,
    slug: Option<String>,
    body: String,
    cover_image: Option<String>,
    language: String,
    level: String,
    is_published: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateStoryInput {
    title: Option<String>,
    slug: Option<String>,
    body: Option<String>,
    cover_image: Option<String>,
    language: Option<String>,
    level: Option<String>,
    is_published: Option<bool>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stories).post(create_story))
        .route(
            "/:id",
            get(get_story).put(update_story).delete(delete_story),
        )
}

async fn list_stories(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let page = listing::clamp_page(query.page);
    let page_size = listing::clamp_page_size(query.page_size);
    let offset = (page - 1) * page_size;

    let level = match query.level.as_deref() {
        Some(raw) => match validate_level(raw) {
            Ok(level) => Some(level),
            Err(err) => return super::admin_error_response(err),
        },
        None => None,
    };

    let filter = MediaFilter {
        language: query.language,
        level,
        is_published: query.is_published,
        search: listing::normalize_search(query.search.as_deref()),
    };

    let total = match media::count_stories(proxy.as_ref(), &filter).await {
        Ok(total) => total,
        Err(err) => return super::sql_error_response(err),
    };

    let stories = if total == 0 {
        Vec::new()
    } else {
        match media::select_stories(proxy.as_ref(), &filter, page_size, offset).await {
            Ok(rows) => rows,
            Err(err) => return super::sql_error_response(err),
        }
    };

    Json(SuccessResponse {
        success: true,
        data: StoryListData {
            stories,
            pagination: listing::build_pagination(page, page_size, total),
        },
    })
    .into_response()
}

async fn get_story(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match media::get_story(proxy.as_ref(), &id).await {
        Ok(Some(story)) => Json(SuccessResponse {
            success: true,
            data: story,
        })
        .into_response(),
        Ok(None) => {
            json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "story not found").into_response()
        }
        Err(err) => super::sql_error_response(err),
    }
}

async fn create_story(
    State(state): State<AppState>,
    Json(input): Json<CreateStoryInput>,
) -> Response {
    if input.title.trim().is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "story title must not be empty",
        )
        .into_response();
    }
    if input.body.trim().is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "story body must not be empty",
        )
        .into_response();
    }
    let level = match validate_level(&input.level) {
        Ok(level) => level,
        Err(err) => return super::admin_error_response(err),
    };

    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    let story = Story {
        id: uuid::Uuid::new_v4().to_string(),
        title: input.title.trim().to_string(),
        slug: resolve_slug(input.slug.as_deref(), &input.title),
        body: input.body,
        cover_image: input.cover_image,
        language: input.language.trim().to_string(),
        level,
        is_published: input.is_published.unwrap_or(false),
        created_at: now.clone(),
        updated_at: now,
    };

    if let Err(err) = media::insert_story(proxy.as_ref(), &story).await {
        return super::sql_error_response(err);
    }

    (
        StatusCode::CREATED,
        Json(SuccessResponse {
            success: true,
            data: story,
        }),
    )
        .into_response()
}

async fn update_story(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateStoryInput>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let mut story = match media::get_story(proxy.as_ref(), &id).await {
        Ok(Some(story)) => story,
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "story not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    };

    if let Some(title) = input.title {
        if title.trim().is_empty() {
            return json_error(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "story title must not be empty",
            )
            .into_response();
        }
        story.title = title.trim().to_string();
    }
    if let Some(slug) = input.slug {
        story.slug = resolve_slug(Some(&slug), &story.title);
    }
    if let Some(body) = input.body {
        if body.trim().is_empty() {
            return json_error(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "story body must not be empty",
            )
            .into_response();
        }
        story.body = body;
    }
    if let Some(cover_image) = input.cover_image {
        story.cover_image = Some(cover_image);
    }
    if let Some(language) = input.language {
        story.language = language.trim().to_string();
    }
    if let Some(ref level) = input.level {
        match validate_level(level) {
            Ok(level) => story.level = level,
            Err(err) => return super::admin_error_response(err),
        }
    }
    if let Some(is_published) = input.is_published {
        story.is_published = is_published;
    }

    if let Err(err) = media::update_story(proxy.as_ref(), &story).await {
        return super::sql_error_response(err);
    }

    match media::get_story(proxy.as_ref(), &id).await {
        Ok(Some(updated)) => Json(SuccessResponse {
            success: true,
            data: updated,
        })
        .into_response(),
        Ok(None) => {
            json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "story not found").into_response()
        }
        Err(err) => super::sql_error_response(err),
    }
}

async fn delete_story(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match media::get_story(proxy.as_ref(), &id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "story not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    match media::delete_story(proxy.as_ref(), &id).await {
        Ok(()) => Json(MessageResponse {
            success: true,
            message: "story deleted",
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}
