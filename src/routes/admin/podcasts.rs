use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::operations::media::{self, MediaFilter, Podcast};
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
    is_published: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PodcastListData {
    podcasts: Vec<Podcast>,
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePodcastInput {
    title: String,
    description: Option<String>,
    audio_url: String,
    cover_image: Option<String>,
    duration_seconds: Option<i32>,
    episode_number: Option<i32>,
    is_published: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePodcastInput {
    title: Option<String>,
    description: Option<String>,
    audio_url: Option<String>,
    cover_image: Option<String>,
    duration_seconds: Option<i32>,
    episode_number: Option<i32>,
    is_published: Option<bool>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_podcasts).post(create_podcast))
        .route(
            "/:id",
            get(get_podcast).put(update_podcast).delete(delete_podcast),
        )
}

async fn list_podcasts(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let page = listing::clamp_page(query.page);
    let page_size = listing::clamp_page_size(query.page_size);
    let offset = (page - 1) * page_size;

    let filter = MediaFilter {
        is_published: query.is_published,
        search: listing::normalize_search(query.search.as_deref()),
        ..MediaFilter::default()
    };

    let total = match media::count_podcasts(proxy.as_ref(), &filter).await {
        Ok(total) => total,
        Err(err) => return super::sql_error_response(err),
    };

    let podcasts = if total == 0 {
        Vec::new()
    } else {
        match media::select_podcasts(proxy.as_ref(), &filter, page_size, offset).await {
            Ok(rows) => rows,
            Err(err) => return super::sql_error_response(err),
        }
    };

    Json(SuccessResponse {
        success: true,
        data: PodcastListData {
            podcasts,
            pagination: listing::build_pagination(page, page_size, total),
        },
    })
    .into_response()
}

async fn get_podcast(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match media::get_podcast(proxy.as_ref(), &id).await {
        Ok(Some(podcast)) => Json(SuccessResponse {
            success: true,
            data: podcast,
        })
        .into_response(),
        Ok(None) => {
            json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "podcast not found").into_response()
        }
        Err(err) => super::sql_error_response(err),
    }
}

async fn create_podcast(
    State(state): State<AppState>,
    Json(input): Json<CreatePodcastInput>,
) -> Response {
    if input.title.trim().is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "podcast title must not be empty",
        )
        .into_response();
    }
    if input.audio_url.trim().is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "podcast audioUrl must not be empty",
        )
        .into_response();
    }

    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let is_published = input.is_published.unwrap_or(false);
    let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    let podcast = Podcast {
        id: uuid::Uuid::new_v4().to_string(),
        title: input.title.trim().to_string(),
        description: input.description,
        audio_url: input.audio_url.trim().to_string(),
        cover_image: input.cover_image,
        duration_seconds: input.duration_seconds,
        episode_number: input.episode_number,
        is_published,
        published_at: if is_published { Some(now.clone()) } else { None },
        created_at: now.clone(),
        updated_at: now,
    };

    if let Err(err) = media::insert_podcast(proxy.as_ref(), &podcast).await {
        return super::sql_error_response(err);
    }

    (
        StatusCode::CREATED,
        Json(SuccessResponse {
            success: true,
            data: podcast,
        }),
    )
        .into_response()
}

async fn update_podcast(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdatePodcastInput>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let mut podcast = match media::get_podcast(proxy.as_ref(), &id).await {
        Ok(Some(podcast)) => podcast,
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "podcast not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    };

    if let Some(title) = input.title {
        if title.trim().is_empty() {
            return json_error(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "podcast title must not be empty",
            )
            .into_response();
        }
        podcast.title = title.trim().to_string();
    }
    if let Some(description) = input.description {
        podcast.description = Some(description);
    }
    if let Some(audio_url) = input.audio_url {
        if audio_url.trim().is_empty() {
            return json_error(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "podcast audioUrl must not be empty",
            )
            .into_response();
        }
        podcast.audio_url = audio_url.trim().to_string();
    }
    if let Some(cover_image) = input.cover_image {
        podcast.cover_image = Some(cover_image);
    }
    if let Some(duration_seconds) = input.duration_seconds {
        podcast.duration_seconds = Some(duration_seconds);
    }
    if let Some(episode_number) = input.episode_number {
        podcast.episode_number = Some(episode_number);
    }
    if let Some(is_published) = input.is_published {
        // first publish stamps the publication time
        if is_published && podcast.published_at.is_none() {
            podcast.published_at =
                Some(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true));
        }
        podcast.is_published = is_published;
    }

    if let Err(err) = media::update_podcast(proxy.as_ref(), &podcast).await {
        return super::sql_error_response(err);
    }

    match media::get_podcast(proxy.as_ref(), &id).await {
        Ok(Some(updated)) => Json(SuccessResponse {
            success: true,
            data: updated,
        })
        .into_response(),
        Ok(None) => {
            json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "podcast not found").into_response()
        }
        Err(err) => super::sql_error_response(err),
    }
}

async fn delete_podcast(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match media::get_podcast(proxy.as_ref(), &id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "podcast not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    match media::delete_podcast(proxy.as_ref(), &id).await {
        Ok(()) => Json(MessageResponse {
            success: true,
            message: "podcast deleted",
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}
