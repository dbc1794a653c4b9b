use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::operations::community::{self, ForumReply, ForumTopic, TopicFilter};
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
    is_pinned: Option<bool>,
    is_locked: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TopicListData {
    topics: Vec<ForumTopic>,
    pagination: Pagination,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TopicDetailData {
    #[serde(flatten)]
    topic: ForumTopic,
    replies: Vec<ForumReply>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateTopicInput {
    title: Option<String>,
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PinInput {
    pinned: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LockInput {
    locked: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateReplyInput {
    body: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/topics", get(list_topics))
        .route(
            "/topics/:id",
            get(get_topic).put(update_topic).delete(delete_topic),
        )
        .route("/topics/:id/pin", put(pin_topic))
        .route("/topics/:id/lock", put(lock_topic))
        .route("/topics/:id/replies", post(create_reply))
        .route("/topics/:topicId/replies/:id", delete(delete_reply))
}

async fn list_topics(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let page = listing::clamp_page(query.page);
    let page_size = listing::clamp_page_size(query.page_size);
    let offset = (page - 1) * page_size;

    let filter = TopicFilter {
        is_pinned: query.is_pinned,
        is_locked: query.is_locked,
        search: listing::normalize_search(query.search.as_deref()),
    };

    let total = match community::count_topics(proxy.as_ref(), &filter).await {
        Ok(total) => total,
        Err(err) => return super::sql_error_response(err),
    };

    let topics = if total == 0 {
        Vec::new()
    } else {
        match community::select_topics(proxy.as_ref(), &filter, page_size, offset).await {
            Ok(rows) => rows,
            Err(err) => return super::sql_error_response(err),
        }
    };

    Json(SuccessResponse {
        success: true,
        data: TopicListData {
            topics,
            pagination: listing::build_pagination(page, page_size, total),
        },
    })
    .into_response()
}

async fn get_topic(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let topic = match community::get_topic(proxy.as_ref(), &id).await {
        Ok(Some(topic)) => topic,
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "topic not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    };

    let replies = match community::get_replies_by_topic(proxy.as_ref(), &id).await {
        Ok(replies) => replies,
        Err(err) => return super::sql_error_response(err),
    };

    Json(SuccessResponse {
        success: true,
        data: TopicDetailData { topic, replies },
    })
    .into_response()
}

async fn update_topic(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateTopicInput>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let mut topic = match community::get_topic(proxy.as_ref(), &id).await {
        Ok(Some(topic)) => topic,
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "topic not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    };

    if let Some(title) = input.title {
        if title.trim().is_empty() {
            return json_error(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "topic title must not be empty",
            )
            .into_response();
        }
        topic.title = title.trim().to_string();
    }
    if let Some(body) = input.body {
        if body.trim().is_empty() {
            return json_error(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "topic body must not be empty",
            )
            .into_response();
        }
        topic.body = body;
    }

    if let Err(err) = community::update_topic(proxy.as_ref(), &topic).await {
        return super::sql_error_response(err);
    }

    match community::get_topic(proxy.as_ref(), &id).await {
        Ok(Some(updated)) => Json(SuccessResponse {
            success: true,
            data: updated,
        })
        .into_response(),
        Ok(None) => {
            json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "topic not found").into_response()
        }
        Err(err) => super::sql_error_response(err),
    }
}

async fn delete_topic(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match community::get_topic(proxy.as_ref(), &id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "topic not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    match community::delete_topic(proxy.as_ref(), &id).await {
        Ok(()) => Json(MessageResponse {
            success: true,
            message: "topic deleted",
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}

async fn pin_topic(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<PinInput>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match community::set_topic_pinned(proxy.as_ref(), &id, input.pinned).await {
        Ok(0) => json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "topic not found").into_response(),
        Ok(_) => Json(MessageResponse {
            success: true,
            message: if input.pinned {
                "topic pinned"
            } else {
                "topic unpinned"
            },
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}

async fn lock_topic(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<LockInput>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match community::set_topic_locked(proxy.as_ref(), &id, input.locked).await {
        Ok(0) => json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "topic not found").into_response(),
        Ok(_) => Json(MessageResponse {
            success: true,
            message: if input.locked {
                "topic locked"
            } else {
                "topic unlocked"
            },
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}

async fn create_reply(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(admin): Extension<crate::auth::AuthUser>,
    Json(input): Json<CreateReplyInput>,
) -> Response {
    if input.body.trim().is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "reply body must not be empty",
        )
        .into_response();
    }

    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match community::get_topic(proxy.as_ref(), &id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "topic not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    let reply = ForumReply {
        id: uuid::Uuid::new_v4().to_string(),
        topic_id: id,
        author_id: admin.id,
        body: input.body,
        created_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    };

    if let Err(err) = community::insert_reply(proxy.as_ref(), &reply).await {
        return super::sql_error_response(err);
    }

    (
        StatusCode::CREATED,
        Json(SuccessResponse {
            success: true,
            data: reply,
        }),
    )
        .into_response()
}

async fn delete_reply(
    State(state): State<AppState>,
    Path((topic_id, id)): Path<(String, String)>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match community::delete_reply(proxy.as_ref(), &topic_id, &id).await {
        Ok(0) => json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "reply not found").into_response(),
        Ok(_) => Json(MessageResponse {
            success: true,
            message: "reply deleted",
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}
