use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::operations::vocabulary::{self, Sentence, VocabularyFilter};
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
    language: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SentenceListData {
    sentences: Vec<Sentence>,
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSentenceInput {
    text: String,
    translation: String,
    language: String,
    audio_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateSentenceInput {
    text: Option<String>,
    translation: Option<String>,
    language: Option<String>,
    audio_url: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sentences).post(create_sentence))
        .route(
            "/:id",
            get(get_sentence).put(update_sentence).delete(delete_sentence),
        )
}

async fn list_sentences(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let page = listing::clamp_page(query.page);
    let page_size = listing::clamp_page_size(query.page_size);
    let offset = (page - 1) * page_size;

    let filter = VocabularyFilter {
        language: query.language,
        search: listing::normalize_search(query.search.as_deref()),
    };

    let total = match vocabulary::count_sentences(proxy.as_ref(), &filter).await {
        Ok(total) => total,
        Err(err) => return super::sql_error_response(err),
    };

    let sentences = if total == 0 {
        Vec::new()
    } else {
        match vocabulary::select_sentences(proxy.as_ref(), &filter, page_size, offset).await {
            Ok(rows) => rows,
            Err(err) => return super::sql_error_response(err),
        }
    };

    Json(SuccessResponse {
        success: true,
        data: SentenceListData {
            sentences,
            pagination: listing::build_pagination(page, page_size, total),
        },
    })
    .into_response()
}

async fn get_sentence(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match vocabulary::get_sentence(proxy.as_ref(), &id).await {
        Ok(Some(sentence)) => Json(SuccessResponse {
            success: true,
            data: sentence,
        })
        .into_response(),
        Ok(None) => {
            json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "sentence not found").into_response()
        }
        Err(err) => super::sql_error_response(err),
    }
}

async fn create_sentence(
    State(state): State<AppState>,
    Json(input): Json<CreateSentenceInput>,
) -> Response {
    if input.text.trim().is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "sentence text must not be empty",
        )
        .into_response();
    }
    if input.translation.trim().is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "sentence translation must not be empty",
        )
        .into_response();
    }
    if input.language.trim().is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "sentence language must not be empty",
        )
        .into_response();
    }

    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    let sentence = Sentence {
        id: uuid::Uuid::new_v4().to_string(),
        text: input.text.trim().to_string(),
        translation: input.translation.trim().to_string(),
        language: input.language.trim().to_string(),
        audio_url: input.audio_url,
        created_at: now.clone(),
        updated_at: now,
    };

    if let Err(err) = vocabulary::insert_sentence(proxy.as_ref(), &sentence).await {
        return super::sql_error_response(err);
    }

    (
        StatusCode::CREATED,
        Json(SuccessResponse {
            success: true,
            data: sentence,
        }),
    )
        .into_response()
}

async fn update_sentence(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateSentenceInput>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let mut sentence = match vocabulary::get_sentence(proxy.as_ref(), &id).await {
        Ok(Some(sentence)) => sentence,
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "sentence not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    };

    if let Some(text) = input.text {
        if text.trim().is_empty() {
            return json_error(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "sentence text must not be empty",
            )
            .into_response();
        }
        sentence.text = text.trim().to_string();
    }
    if let Some(translation) = input.translation {
        if translation.trim().is_empty() {
            return json_error(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "sentence translation must not be empty",
            )
            .into_response();
        }
        sentence.translation = translation.trim().to_string();
    }
    if let Some(language) = input.language {
        sentence.language = language.trim().to_string();
    }
    if let Some(audio_url) = input.audio_url {
        sentence.audio_url = Some(audio_url);
    }

    if let Err(err) = vocabulary::update_sentence(proxy.as_ref(), &sentence).await {
        return super::sql_error_response(err);
    }

    match vocabulary::get_sentence(proxy.as_ref(), &id).await {
        Ok(Some(updated)) => Json(SuccessResponse {
            success: true,
            data: updated,
        })
        .into_response(),
        Ok(None) => {
            json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "sentence not found").into_response()
        }
        Err(err) => super::sql_error_response(err),
    }
}

async fn delete_sentence(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match vocabulary::get_sentence(proxy.as_ref(), &id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "sentence not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    match vocabulary::delete_sentence(proxy.as_ref(), &id).await {
        Ok(()) => Json(MessageResponse {
            success: true,
            message: "sentence deleted",
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}
