use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::operations::lessons::{self, Lesson, LessonFilter};
use crate::db::operations::vocabulary::{self, Sentence, Word};
use crate::db::operations::catalog;
use crate::response::json_error;
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
    course_id: Option<String>,
    is_published: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LessonListData {
    lessons: Vec<Lesson>,
    pagination: Pagination,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LessonDetailData {
    #[serde(flatten)]
    lesson: Lesson,
    words: Vec<Word>,
    sentences: Vec<Sentence>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateLessonInput {
    course_id: String,
    title: String,
    slug: Option<String>,
    summary: Option<String>,
    video_url: Option<String>,
    duration_minutes: Option<i32>,
    sort_order: Option<i32>,
    is_published: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateLessonInput {
    course_id: Option<String>,
    title: Option<String>,
    slug: Option<String>,
    summary: Option<String>,
    video_url: Option<String>,
    duration_minutes: Option<i32>,
    sort_order: Option<i32>,
    is_published: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttachWordInput {
    word_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplaceWordsInput {
    word_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttachSentenceInput {
    sentence_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplaceSentencesInput {
    sentence_ids: Vec<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_lessons).post(create_lesson))
        .route(
            "/:id",
            get(get_lesson).put(update_lesson).delete(delete_lesson),
        )
        .route("/:id/words", put(replace_words).post(attach_word))
        .route("/:id/words/:wordId", delete(detach_word))
        .route("/:id/sentences", put(replace_sentences).post(attach_sentence))
        .route("/:id/sentences/:sentenceId", delete(detach_sentence))
}

async fn list_lessons(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let page = listing::clamp_page(query.page);
    let page_size = listing::clamp_page_size(query.page_size);
    let offset = (page - 1) * page_size;

    let filter = LessonFilter {
        course_id: query.course_id,
        is_published: query.is_published,
        search: listing::normalize_search(query.search.as_deref()),
    };

    let total = match lessons::count_lessons(proxy.as_ref(), &filter).await {
        Ok(total) => total,
        Err(err) => return super::sql_error_response(err),
    };

    let rows = if total == 0 {
        Vec::new()
    } else {
        match lessons::select_lessons(proxy.as_ref(), &filter, page_size, offset).await {
            Ok(rows) => rows,
            Err(err) => return super::sql_error_response(err),
        }
    };

    Json(SuccessResponse {
        success: true,
        data: LessonListData {
            lessons: rows,
            pagination: listing::build_pagination(page, page_size, total),
        },
    })
    .into_response()
}

async fn get_lesson(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let lesson = match lessons::get_lesson(proxy.as_ref(), &id).await {
        Ok(Some(lesson)) => lesson,
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "lesson not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    };

    let words = match lessons::get_lesson_words(proxy.as_ref(), &id).await {
        Ok(words) => words,
        Err(err) => return super::sql_error_response(err),
    };
    let sentences = match lessons::get_lesson_sentences(proxy.as_ref(), &id).await {
        Ok(sentences) => sentences,
        Err(err) => return super::sql_error_response(err),
    };

    Json(SuccessResponse {
        success: true,
        data: LessonDetailData {
            lesson,
            words,
            sentences,
        },
    })
    .into_response()
}

async fn create_lesson(
    State(state): State<AppState>,
    Json(input): Json<CreateLessonInput>,
) -> Response {
    if input.title.trim().is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "lesson title must not be empty",
        )
        .into_response();
    }

    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match catalog::get_course(proxy.as_ref(), &input.course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "course not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    let lesson = Lesson {
        id: uuid::Uuid::new_v4().to_string(),
        course_id: input.course_id,
        title: input.title.trim().to_string(),
        slug: resolve_slug(input.slug.as_deref(), &input.title),
        summary: input.summary,
        video_url: input.video_url,
        duration_minutes: input.duration_minutes,
        sort_order: input.sort_order.unwrap_or(0),
        is_published: input.is_published.unwrap_or(false),
        created_at: now.clone(),
        updated_at: now,
    };

    if let Err(err) = lessons::insert_lesson(proxy.as_ref(), &lesson).await {
        return super::sql_error_response(err);
    }

    (
        StatusCode::CREATED,
        Json(SuccessResponse {
            success: true,
            data: lesson,
        }),
    )
        .into_response()
}

async fn update_lesson(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateLessonInput>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let mut lesson = match lessons::get_lesson(proxy.as_ref(), &id).await {
        Ok(Some(lesson)) => lesson,
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "lesson not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    };

    if let Some(course_id) = input.course_id {
        match catalog::get_course(proxy.as_ref(), &course_id).await {
            Ok(Some(_)) => lesson.course_id = course_id,
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
                "lesson title must not be empty",
            )
            .into_response();
        }
        lesson.title = title.trim().to_string();
    }
    if let Some(slug) = input.slug {
        lesson.slug = resolve_slug(Some(&slug), &lesson.title);
    }
    if let Some(summary) = input.summary {
        lesson.summary = Some(summary);
    }
    if let Some(video_url) = input.video_url {
        lesson.video_url = Some(video_url);
    }
    if let Some(duration_minutes) = input.duration_minutes {
        lesson.duration_minutes = Some(duration_minutes);
    }
    if let Some(sort_order) = input.sort_order {
        lesson.sort_order = sort_order;
    }
    if let Some(is_published) = input.is_published {
        lesson.is_published = is_published;
    }

    if let Err(err) = lessons::update_lesson(proxy.as_ref(), &lesson).await {
        return super::sql_error_response(err);
    }

    match lessons::get_lesson(proxy.as_ref(), &id).await {
        Ok(Some(updated)) => Json(SuccessResponse {
            success: true,
            data: updated,
        })
        .into_response(),
        Ok(None) => {
            json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "lesson not found").into_response()
        }
        Err(err) => super::sql_error_response(err),
    }
}

async fn delete_lesson(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match lessons::get_lesson(proxy.as_ref(), &id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "lesson not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    match lessons::delete_lesson(proxy.as_ref(), &id).await {
        Ok(()) => Json(MessageResponse {
            success: true,
            message: "lesson deleted",
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}

async fn attach_word(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<AttachWordInput>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match lessons::get_lesson(proxy.as_ref(), &id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "lesson not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    match vocabulary::get_word(proxy.as_ref(), &input.word_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "word not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    if let Err(err) = lessons::attach_word(proxy.as_ref(), &id, &input.word_id).await {
        return super::sql_error_response(err);
    }

    match lessons::get_lesson_words(proxy.as_ref(), &id).await {
        Ok(words) => Json(SuccessResponse {
            success: true,
            data: words,
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}

async fn detach_word(
    State(state): State<AppState>,
    Path((id, word_id)): Path<(String, String)>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match lessons::detach_word(proxy.as_ref(), &id, &word_id).await {
        Ok(0) => json_error(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "word is not attached to this lesson",
        )
        .into_response(),
        Ok(_) => Json(MessageResponse {
            success: true,
            message: "word detached",
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}

async fn replace_words(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ReplaceWordsInput>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match lessons::get_lesson(proxy.as_ref(), &id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "lesson not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    if let Err(err) = lessons::replace_lesson_words(proxy.as_ref(), &id, &input.word_ids).await {
        return super::sql_error_response(err);
    }

    match lessons::get_lesson_words(proxy.as_ref(), &id).await {
        Ok(words) => Json(SuccessResponse {
            success: true,
            data: words,
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}

async fn attach_sentence(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<AttachSentenceInput>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match lessons::get_lesson(proxy.as_ref(), &id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "lesson not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    match vocabulary::get_sentence(proxy.as_ref(), &input.sentence_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "sentence not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    if let Err(err) = lessons::attach_sentence(proxy.as_ref(), &id, &input.sentence_id).await {
        return super::sql_error_response(err);
    }

    match lessons::get_lesson_sentences(proxy.as_ref(), &id).await {
        Ok(sentences) => Json(SuccessResponse {
            success: true,
            data: sentences,
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}

async fn detach_sentence(
    State(state): State<AppState>,
    Path((id, sentence_id)): Path<(String, String)>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match lessons::detach_sentence(proxy.as_ref(), &id, &sentence_id).await {
        Ok(0) => json_error(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "sentence is not attached to this lesson",
        )
        .into_response(),
        Ok(_) => Json(MessageResponse {
            success: true,
            message: "sentence detached",
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}

async fn replace_sentences(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ReplaceSentencesInput>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match lessons::get_lesson(proxy.as_ref(), &id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "lesson not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    if let Err(err) =
        lessons::replace_lesson_sentences(proxy.as_ref(), &id, &input.sentence_ids).await
    {
        return super::sql_error_response(err);
    }

    match lessons::get_lesson_sentences(proxy.as_ref(), &id).await {
        Ok(sentences) => Json(SuccessResponse {
            success: true,
            data: sentences,
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}
