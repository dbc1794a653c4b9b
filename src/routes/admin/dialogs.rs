use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::operations::media::{self, Dialog, MediaFilter};
use crate::response::json_error;
use crate::services::catalog::validate_level;
use crate::services::content::{validate_dialog_lines, DialogLine};
use crate::services::listing::{self, Pagination};
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
struct DialogListData {
    dialogs: Vec<Dialog>,
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDialogInput {
    title: String,
    language: String,
    level: String,
    audio_url: Option<String>,
    lines: Vec<DialogLine>,
    is_published: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateDialogInput {
    title: Option<String>,
    language: Option<String>,
    level: Option<String>,
    audio_url: Option<String>,
    lines: Option<Vec<DialogLine>>,
    is_published: Option<bool>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_dialogs).post(create_dialog))
        .route(
            "/:id",
            get(get_dialog).put(update_dialog).delete(delete_dialog),
        )
}

async fn list_dialogs(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
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

    let total = match media::count_dialogs(proxy.as_ref(), &filter).await {
        Ok(total) => total,
        Err(err) => return super::sql_error_response(err),
    };

    let dialogs = if total == 0 {
        Vec::new()
    } else {
        match media::select_dialogs(proxy.as_ref(), &filter, page_size, offset).await {
            Ok(rows) => rows,
            Err(err) => return super::sql_error_response(err),
        }
    };

    Json(SuccessResponse {
        success: true,
        data: DialogListData {
            dialogs,
            pagination: listing::build_pagination(page, page_size, total),
        },
    })
    .into_response()
}

async fn get_dialog(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match media::get_dialog(proxy.as_ref(), &id).await {
        Ok(Some(dialog)) => Json(SuccessResponse {
            success: true,
            data: dialog,
        })
        .into_response(),
        Ok(None) => {
            json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "dialog not found").into_response()
        }
        Err(err) => super::sql_error_response(err),
    }
}

async fn create_dialog(
    State(state): State<AppState>,
    Json(input): Json<CreateDialogInput>,
) -> Response {
    if input.title.trim().is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "dialog title must not be empty",
        )
        .into_response();
    }
    let level = match validate_level(&input.level) {
        Ok(level) => level,
        Err(err) => return super::admin_error_response(err),
    };
    if let Err(message) = validate_dialog_lines(&input.lines) {
        return json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message).into_response();
    }

    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    let dialog = Dialog {
        id: uuid::Uuid::new_v4().to_string(),
        title: input.title.trim().to_string(),
        language: input.language.trim().to_string(),
        level,
        audio_url: input.audio_url,
        lines: serde_json::to_value(&input.lines).unwrap_or_default(),
        is_published: input.is_published.unwrap_or(false),
        created_at: now.clone(),
        updated_at: now,
    };

    if let Err(err) = media::insert_dialog(proxy.as_ref(), &dialog).await {
        return super::sql_error_response(err);
    }

    (
        StatusCode::CREATED,
        Json(SuccessResponse {
            success: true,
            data: dialog,
        }),
    )
        .into_response()
}

async fn update_dialog(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateDialogInput>,
) -> Response {
    if let Some(ref lines) = input.lines {
        if let Err(message) = validate_dialog_lines(lines) {
            return json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
                .into_response();
        }
    }

    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let mut dialog = match media::get_dialog(proxy.as_ref(), &id).await {
        Ok(Some(dialog)) => dialog,
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "dialog not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    };

    if let Some(title) = input.title {
        if title.trim().is_empty() {
            return json_error(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "dialog title must not be empty",
            )
            .into_response();
        }
        dialog.title = title.trim().to_string();
    }
    if let Some(language) = input.language {
        dialog.language = language.trim().to_string();
    }
    if let Some(ref level) = input.level {
        match validate_level(level) {
            Ok(level) => dialog.level = level,
            Err(err) => return super::admin_error_response(err),
        }
    }
    if let Some(audio_url) = input.audio_url {
        dialog.audio_url = Some(audio_url);
    }
    if let Some(lines) = input.lines {
        dialog.lines = serde_json::to_value(&lines).unwrap_or_default();
    }
    if let Some(is_published) = input.is_published {
        dialog.is_published = is_published;
    }

    if let Err(err) = media::update_dialog(proxy.as_ref(), &dialog).await {
        return super::sql_error_response(err);
    }

    match media::get_dialog(proxy.as_ref(), &id).await {
        Ok(Some(updated)) => Json(SuccessResponse {
            success: true,
            data: updated,
        })
        .into_response(),
        Ok(None) => {
            json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "dialog not found").into_response()
        }
        Err(err) => super::sql_error_response(err),
    }
}

async fn delete_dialog(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match media::get_dialog(proxy.as_ref(), &id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "dialog not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    match media::delete_dialog(proxy.as_ref(), &id).await {
        Ok(()) => Json(MessageResponse {
            success: true,
            message: "dialog deleted",
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}
