use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::operations::assessments::{self, Exercise, ExerciseFilter};
use crate::db::operations::catalog;
use crate::response::json_error;
use crate::services::content::validate_content;
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
    module_id: Option<String>,
    #[serde(rename = "type")]
    content_type: Option<String>,
    is_published: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExerciseListData {
    exercises: Vec<Exercise>,
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateExerciseInput {
    module_id: String,
    title: String,
    content: serde_json::Value,
    sort_order: Option<i32>,
    is_published: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateExerciseInput {
    module_id: Option<String>,
    title: Option<String>,
    content: Option<serde_json::Value>,
    sort_order: Option<i32>,
    is_published: Option<bool>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_exercises).post(create_exercise))
        .route(
            "/:id",
            get(get_exercise).put(update_exercise).delete(delete_exercise),
        )
}

async fn list_exercises(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let page = listing::clamp_page(query.page);
    let page_size = listing::clamp_page_size(query.page_size);
    let offset = (page - 1) * page_size;

    let filter = ExerciseFilter {
        module_id: query.module_id,
        content_type: query.content_type,
        is_published: query.is_published,
    };

    let total = match assessments::count_exercises(proxy.as_ref(), &filter).await {
        Ok(total) => total,
        Err(err) => return super::sql_error_response(err),
    };

    let exercises = if total == 0 {
        Vec::new()
    } else {
        match assessments::select_exercises(proxy.as_ref(), &filter, page_size, offset).await {
            Ok(rows) => rows,
            Err(err) => return super::sql_error_response(err),
        }
    };

    Json(SuccessResponse {
        success: true,
        data: ExerciseListData {
            exercises,
            pagination: listing::build_pagination(page, page_size, total),
        },
    })
    .into_response()
}

async fn get_exercise(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match assessments::get_exercise(proxy.as_ref(), &id).await {
        Ok(Some(exercise)) => Json(SuccessResponse {
            success: true,
            data: exercise,
        })
        .into_response(),
        Ok(None) => {
            json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "exercise not found").into_response()
        }
        Err(err) => super::sql_error_response(err),
    }
}

async fn create_exercise(
    State(state): State<AppState>,
    Json(input): Json<CreateExerciseInput>,
) -> Response {
    if input.title.trim().is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "exercise title must not be empty",
        )
        .into_response();
    }
    if let Err(message) = validate_content(&input.content) {
        return json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message).into_response();
    }

    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match catalog::get_module(proxy.as_ref(), &input.module_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "module not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    let exercise = Exercise {
        id: uuid::Uuid::new_v4().to_string(),
        module_id: input.module_id,
        title: input.title.trim().to_string(),
        content: input.content,
        sort_order: input.sort_order.unwrap_or(0),
        is_published: input.is_published.unwrap_or(false),
        created_at: now.clone(),
        updated_at: now,
    };

    if let Err(err) = assessments::insert_exercise(proxy.as_ref(), &exercise).await {
        return super::sql_error_response(err);
    }

    (
        StatusCode::CREATED,
        Json(SuccessResponse {
            success: true,
            data: exercise,
        }),
    )
        .into_response()
}

async fn update_exercise(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateExerciseInput>,
) -> Response {
    if let Some(ref content) = input.content {
        if let Err(message) = validate_content(content) {
            return json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
                .into_response();
        }
    }

    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let mut exercise = match assessments::get_exercise(proxy.as_ref(), &id).await {
        Ok(Some(exercise)) => exercise,
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "exercise not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    };

    if let Some(module_id) = input.module_id {
        match catalog::get_module(proxy.as_ref(), &module_id).await {
            Ok(Some(_)) => exercise.module_id = module_id,
            Ok(None) => {
                return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "module not found")
                    .into_response()
            }
            Err(err) => return super::sql_error_response(err),
        }
    }
    if let Some(title) = input.title {
        if title.trim().is_empty() {
            return json_error(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "exercise title must not be empty",
            )
            .into_response();
        }
        exercise.title = title.trim().to_string();
    }
    if let Some(content) = input.content {
        exercise.content = content;
    }
    if let Some(sort_order) = input.sort_order {
        exercise.sort_order = sort_order;
    }
    if let Some(is_published) = input.is_published {
        exercise.is_published = is_published;
    }

    if let Err(err) = assessments::update_exercise(proxy.as_ref(), &exercise).await {
        return super::sql_error_response(err);
    }

    match assessments::get_exercise(proxy.as_ref(), &id).await {
        Ok(Some(updated)) => Json(SuccessResponse {
            success: true,
            data: updated,
        })
        .into_response(),
        Ok(None) => {
            json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "exercise not found").into_response()
        }
        Err(err) => super::sql_error_response(err),
    }
}

async fn delete_exercise(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match assessments::get_exercise(proxy.as_ref(), &id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "exercise not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    match assessments::delete_exercise(proxy.as_ref(), &id).await {
        Ok(()) => Json(MessageResponse {
            success: true,
            message: "exercise deleted",
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}
