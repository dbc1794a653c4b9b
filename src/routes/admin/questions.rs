use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::operations::assessments::{self, Question, QuestionFilter};
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
    #[serde(rename = "type")]
    content_type: Option<String>,
    difficulty: Option<i32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionListData {
    questions: Vec<Question>,
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateQuestionInput {
    content: serde_json::Value,
    explanation: Option<String>,
    difficulty: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateQuestionInput {
    content: Option<serde_json::Value>,
    explanation: Option<String>,
    difficulty: Option<i32>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_questions).post(create_question))
        .route(
            "/:id",
            get(get_question).put(update_question).delete(delete_question),
        )
}

async fn list_questions(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let page = listing::clamp_page(query.page);
    let page_size = listing::clamp_page_size(query.page_size);
    let offset = (page - 1) * page_size;

    let filter = QuestionFilter {
        content_type: query.content_type,
        difficulty: query.difficulty,
    };

    let total = match assessments::count_questions(proxy.as_ref(), &filter).await {
        Ok(total) => total,
        Err(err) => return super::sql_error_response(err),
    };

    let questions = if total == 0 {
        Vec::new()
    } else {
        match assessments::select_questions(proxy.as_ref(), &filter, page_size, offset).await {
            Ok(rows) => rows,
            Err(err) => return super::sql_error_response(err),
        }
    };

    Json(SuccessResponse {
        success: true,
        data: QuestionListData {
            questions,
            pagination: listing::build_pagination(page, page_size, total),
        },
    })
    .into_response()
}

async fn get_question(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match assessments::get_question(proxy.as_ref(), &id).await {
        Ok(Some(question)) => Json(SuccessResponse {
            success: true,
            data: question,
        })
        .into_response(),
        Ok(None) => {
            json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "question not found").into_response()
        }
        Err(err) => super::sql_error_response(err),
    }
}

async fn create_question(
    State(state): State<AppState>,
    Json(input): Json<CreateQuestionInput>,
) -> Response {
    if let Err(message) = validate_content(&input.content) {
        return json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message).into_response();
    }

    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    let question = Question {
        id: uuid::Uuid::new_v4().to_string(),
        content: input.content,
        explanation: input.explanation,
        difficulty: input.difficulty,
        created_at: now.clone(),
        updated_at: now,
    };

    if let Err(err) = assessments::insert_question(proxy.as_ref(), &question).await {
        return super::sql_error_response(err);
    }

    (
        StatusCode::CREATED,
        Json(SuccessResponse {
            success: true,
            data: question,
        }),
    )
        .into_response()
}

async fn update_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateQuestionInput>,
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

    let mut question = match assessments::get_question(proxy.as_ref(), &id).await {
        Ok(Some(question)) => question,
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "question not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    };

    if let Some(content) = input.content {
        question.content = content;
    }
    if let Some(explanation) = input.explanation {
        question.explanation = Some(explanation);
    }
    if let Some(difficulty) = input.difficulty {
        question.difficulty = Some(difficulty);
    }

    if let Err(err) = assessments::update_question(proxy.as_ref(), &question).await {
        return super::sql_error_response(err);
    }

    match assessments::get_question(proxy.as_ref(), &id).await {
        Ok(Some(updated)) => Json(SuccessResponse {
            success: true,
            data: updated,
        })
        .into_response(),
        Ok(None) => {
            json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "question not found").into_response()
        }
        Err(err) => super::sql_error_response(err),
    }
}

async fn delete_question(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match assessments::get_question(proxy.as_ref(), &id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "question not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    match assessments::delete_question(proxy.as_ref(), &id).await {
        Ok(()) => Json(MessageResponse {
            success: true,
            message: "question deleted",
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}
