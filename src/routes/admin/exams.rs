use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::operations::assessments::{self, Exam, ExamFilter, ExamQuestion};
use crate::db::operations::catalog;
use crate::response::json_error;
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
    course_id: Option<String>,
    is_published: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExamListData {
    exams: Vec<Exam>,
    pagination: Pagination,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExamDetailData {
    #[serde(flatten)]
    exam: Exam,
    questions: Vec<ExamQuestion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateExamInput {
    course_id: Option<String>,
    title: String,
    description: Option<String>,
    pass_score: Option<i32>,
    duration_minutes: Option<i32>,
    is_published: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateExamInput {
    course_id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    pass_score: Option<i32>,
    duration_minutes: Option<i32>,
    is_published: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttachQuestionInput {
    question_id: String,
    points: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReorderQuestionsInput {
    question_ids: Vec<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_exams).post(create_exam))
        .route("/:id", get(get_exam).put(update_exam).delete(delete_exam))
        .route(
            "/:id/questions",
            axum::routing::post(attach_question).put(reorder_questions),
        )
        .route("/:examId/questions/:questionId", delete(detach_question))
}

async fn list_exams(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let page = listing::clamp_page(query.page);
    let page_size = listing::clamp_page_size(query.page_size);
    let offset = (page - 1) * page_size;

    let filter = ExamFilter {
        course_id: query.course_id,
        is_published: query.is_published,
        search: listing::normalize_search(query.search.as_deref()),
    };

    let total = match assessments::count_exams(proxy.as_ref(), &filter).await {
        Ok(total) => total,
        Err(err) => return super::sql_error_response(err),
    };

    let exams = if total == 0 {
        Vec::new()
    } else {
        match assessments::select_exams(proxy.as_ref(), &filter, page_size, offset).await {
            Ok(rows) => rows,
            Err(err) => return super::sql_error_response(err),
        }
    };

    Json(SuccessResponse {
        success: true,
        data: ExamListData {
            exams,
            pagination: listing::build_pagination(page, page_size, total),
        },
    })
    .into_response()
}

async fn get_exam(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let exam = match assessments::get_exam(proxy.as_ref(), &id).await {
        Ok(Some(exam)) => exam,
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "exam not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    };

    let questions = match assessments::get_exam_questions(proxy.as_ref(), &id).await {
        Ok(questions) => questions,
        Err(err) => return super::sql_error_response(err),
    };

    Json(SuccessResponse {
        success: true,
        data: ExamDetailData { exam, questions },
    })
    .into_response()
}

async fn create_exam(State(state): State<AppState>, Json(input): Json<CreateExamInput>) -> Response {
    if input.title.trim().is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "exam title must not be empty",
        )
        .into_response();
    }
    let pass_score = input.pass_score.unwrap_or(60);
    if !(0..=100).contains(&pass_score) {
        return json_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "passScore must be between 0 and 100",
        )
        .into_response();
    }

    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    if let Some(ref course_id) = input.course_id {
        match catalog::get_course(proxy.as_ref(), course_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "course not found")
                    .into_response()
            }
            Err(err) => return super::sql_error_response(err),
        }
    }

    let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    let exam = Exam {
        id: uuid::Uuid::new_v4().to_string(),
        course_id: input.course_id,
        title: input.title.trim().to_string(),
        description: input.description,
        pass_score,
        duration_minutes: input.duration_minutes.unwrap_or(30).max(1),
        is_published: input.is_published.unwrap_or(false),
        created_at: now.clone(),
        updated_at: now,
    };

    if let Err(err) = assessments::insert_exam(proxy.as_ref(), &exam).await {
        return super::sql_error_response(err);
    }

    (
        StatusCode::CREATED,
        Json(SuccessResponse {
            success: true,
            data: exam,
        }),
    )
        .into_response()
}

async fn update_exam(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateExamInput>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let mut exam = match assessments::get_exam(proxy.as_ref(), &id).await {
        Ok(Some(exam)) => exam,
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "exam not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    };

    if let Some(course_id) = input.course_id {
        match catalog::get_course(proxy.as_ref(), &course_id).await {
            Ok(Some(_)) => exam.course_id = Some(course_id),
            Ok(None) => {
                return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "course not found")
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
                "exam title must not be empty",
            )
            .into_response();
        }
        exam.title = title.trim().to_string();
    }
    if let Some(description) = input.description {
        exam.description = Some(description);
    }
    if let Some(pass_score) = input.pass_score {
        if !(0..=100).contains(&pass_score) {
            return json_error(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "passScore must be between 0 and 100",
            )
            .into_response();
        }
        exam.pass_score = pass_score;
    }
    if let Some(duration_minutes) = input.duration_minutes {
        exam.duration_minutes = duration_minutes.max(1);
    }
    if let Some(is_published) = input.is_published {
        exam.is_published = is_published;
    }

    if let Err(err) = assessments::update_exam(proxy.as_ref(), &exam).await {
        return super::sql_error_response(err);
    }

    match assessments::get_exam(proxy.as_ref(), &id).await {
        Ok(Some(updated)) => Json(SuccessResponse {
            success: true,
            data: updated,
        })
        .into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "exam not found").into_response(),
        Err(err) => super::sql_error_response(err),
    }
}

async fn delete_exam(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match assessments::get_exam(proxy.as_ref(), &id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "exam not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    match assessments::delete_exam(proxy.as_ref(), &id).await {
        Ok(()) => Json(MessageResponse {
            success: true,
            message: "exam deleted",
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}

async fn attach_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<AttachQuestionInput>,
) -> Response {
    let points = input.points.unwrap_or(1);
    if points < 1 {
        return json_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "points must be at least 1",
        )
        .into_response();
    }

    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match assessments::get_exam(proxy.as_ref(), &id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "exam not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    match assessments::get_question(proxy.as_ref(), &input.question_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "question not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    if let Err(err) =
        assessments::attach_exam_question(proxy.as_ref(), &id, &input.question_id, points).await
    {
        return super::sql_error_response(err);
    }

    match assessments::get_exam_questions(proxy.as_ref(), &id).await {
        Ok(questions) => Json(SuccessResponse {
            success: true,
            data: questions,
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}

async fn detach_question(
    State(state): State<AppState>,
    Path((exam_id, question_id)): Path<(String, String)>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match assessments::detach_exam_question(proxy.as_ref(), &exam_id, &question_id).await {
        Ok(0) => json_error(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "question is not attached to this exam",
        )
        .into_response(),
        Ok(_) => Json(MessageResponse {
            success: true,
            message: "question detached",
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}

async fn reorder_questions(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ReorderQuestionsInput>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match assessments::get_exam(proxy.as_ref(), &id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "exam not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    if let Err(err) =
        assessments::reorder_exam_questions(proxy.as_ref(), &id, &input.question_ids).await
    {
        return super::sql_error_response(err);
    }

    match assessments::get_exam_questions(proxy.as_ref(), &id).await {
        Ok(questions) => Json(SuccessResponse {
            success: true,
            data: questions,
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}
