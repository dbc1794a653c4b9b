use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::operations::vocabulary::{self, VocabularyFilter, Word};
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
struct WordListData {
    words: Vec<Word>,
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WordInput {
    term: String,
    translation: String,
    phonetic: Option<String>,
    part_of_speech: Option<String>,
    language: String,
    audio_url: Option<String>,
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateWordInput {
    term: Option<String>,
    translation: Option<String>,
    phonetic: Option<String>,
    part_of_speech: Option<String>,
    language: Option<String>,
    audio_url: Option<String>,
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchCreateWordsInput {
    words: Vec<WordInput>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchCreateResult {
    count: usize,
    words: Vec<Word>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_words).post(create_word))
        .route("/batch", post(batch_create_words))
        .route("/:id", get(get_word).put(update_word).delete(delete_word))
}

fn validate_word_input(input: &WordInput) -> Result<(), &'static str> {
    if input.term.trim().is_empty() {
        return Err("word term must not be empty");
    }
    if input.translation.trim().is_empty() {
        return Err("word translation must not be empty");
    }
    if input.language.trim().is_empty() {
        return Err("word language must not be empty");
    }
    Ok(())
}

fn word_from_input(input: WordInput) -> Word {
    let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    Word {
        id: uuid::Uuid::new_v4().to_string(),
        term: input.term.trim().to_string(),
        translation: input.translation.trim().to_string(),
        phonetic: input.phonetic,
        part_of_speech: input.part_of_speech,
        language: input.language.trim().to_string(),
        audio_url: input.audio_url,
        image_url: input.image_url,
        created_at: now.clone(),
        updated_at: now,
    }
}

async fn list_words(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
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

    let total = match vocabulary::count_words(proxy.as_ref(), &filter).await {
        Ok(total) => total,
        Err(err) => return super::sql_error_response(err),
    };

    let words = if total == 0 {
        Vec::new()
    } else {
        match vocabulary::select_words(proxy.as_ref(), &filter, page_size, offset).await {
            Ok(rows) => rows,
            Err(err) => return super::sql_error_response(err),
        }
    };

    Json(SuccessResponse {
        success: true,
        data: WordListData {
            words,
            pagination: listing::build_pagination(page, page_size, total),
        },
    })
    .into_response()
}

async fn get_word(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match vocabulary::get_word(proxy.as_ref(), &id).await {
        Ok(Some(word)) => Json(SuccessResponse {
            success: true,
            data: word,
        })
        .into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "word not found").into_response(),
        Err(err) => super::sql_error_response(err),
    }
}

async fn create_word(State(state): State<AppState>, Json(input): Json<WordInput>) -> Response {
    if let Err(message) = validate_word_input(&input) {
        return json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message).into_response();
    }

    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let word = word_from_input(input);
    if let Err(err) = vocabulary::insert_word(proxy.as_ref(), &word).await {
        return super::sql_error_response(err);
    }

    (
        StatusCode::CREATED,
        Json(SuccessResponse {
            success: true,
            data: word,
        }),
    )
        .into_response()
}

async fn batch_create_words(
    State(state): State<AppState>,
    Json(input): Json<BatchCreateWordsInput>,
) -> Response {
    if input.words.is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "word list must not be empty",
        )
        .into_response();
    }
    for word in &input.words {
        if let Err(message) = validate_word_input(word) {
            return json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
                .into_response();
        }
    }

    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let mut created = Vec::with_capacity(input.words.len());
    for word_input in input.words {
        let word = word_from_input(word_input);
        if let Err(err) = vocabulary::insert_word(proxy.as_ref(), &word).await {
            return super::sql_error_response(err);
        }
        created.push(word);
    }

    let count = created.len();
    (
        StatusCode::CREATED,
        Json(SuccessResponse {
            success: true,
            data: BatchCreateResult {
                count,
                words: created,
            },
        }),
    )
        .into_response()
}

async fn update_word(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateWordInput>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let mut word = match vocabulary::get_word(proxy.as_ref(), &id).await {
        Ok(Some(word)) => word,
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "word not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    };

    if let Some(term) = input.term {
        if term.trim().is_empty() {
            return json_error(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "word term must not be empty",
            )
            .into_response();
        }
        word.term = term.trim().to_string();
    }
    if let Some(translation) = input.translation {
        if translation.trim().is_empty() {
            return json_error(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "word translation must not be empty",
            )
            .into_response();
        }
        word.translation = translation.trim().to_string();
    }
    if let Some(phonetic) = input.phonetic {
        word.phonetic = Some(phonetic);
    }
    if let Some(part_of_speech) = input.part_of_speech {
        word.part_of_speech = Some(part_of_speech);
    }
    if let Some(language) = input.language {
        word.language = language.trim().to_string();
    }
    if let Some(audio_url) = input.audio_url {
        word.audio_url = Some(audio_url);
    }
    if let Some(image_url) = input.image_url {
        word.image_url = Some(image_url);
    }

    if let Err(err) = vocabulary::update_word(proxy.as_ref(), &word).await {
        return super::sql_error_response(err);
    }

    match vocabulary::get_word(proxy.as_ref(), &id).await {
        Ok(Some(updated)) => Json(SuccessResponse {
            success: true,
            data: updated,
        })
        .into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "word not found").into_response(),
        Err(err) => super::sql_error_response(err),
    }
}

async fn delete_word(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match vocabulary::get_word(proxy.as_ref(), &id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "word not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    match vocabulary::delete_word(proxy.as_ref(), &id).await {
        Ok(()) => Json(MessageResponse {
            success: true,
            message: "word deleted",
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}
