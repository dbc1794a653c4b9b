use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Router;

use crate::response::json_error;
use crate::state::AppState;

mod categories;
mod courses;
mod dialogs;
mod exams;
mod exercises;
mod forum;
mod lessons;
mod podcasts;
mod questions;
mod sentences;
mod statistics;
mod stories;
mod users;
mod words;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/categories", categories::router())
        .nest("/courses", courses::router())
        .nest("/lessons", lessons::router())
        .nest("/exercises", exercises::router())
        .nest("/questions", questions::router())
        .nest("/exams", exams::router())
        .nest("/dialogs", dialogs::router())
        .nest("/podcasts", podcasts::router())
        .nest("/stories", stories::router())
        .nest("/forum", forum::router())
        .nest("/words", words::router())
        .nest("/sentences", sentences::router())
        .nest("/users", users::router())
        .route("/statistics", axum::routing::get(statistics::get_statistics))
}

pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = crate::auth::extract_token(req.headers());
    let Some(token) = token else {
        return json_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "missing auth token")
            .into_response();
    };

    let Some(proxy) = state.db_proxy() else {
        return json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "DATABASE_UNAVAILABLE",
            "database unavailable",
        )
        .into_response();
    };

    match crate::auth::verify_request_token(proxy.as_ref(), &token).await {
        Ok(user) => {
            if user.role != "ADMIN" {
                return json_error(
                    StatusCode::FORBIDDEN,
                    "FORBIDDEN",
                    "admin privileges required",
                )
                .into_response();
            }
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(_err) => json_error(
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "authentication failed, please sign in again",
        )
        .into_response(),
    }
}

pub(super) fn db_unavailable() -> Response {
    json_error(
        StatusCode::SERVICE_UNAVAILABLE,
        "DATABASE_UNAVAILABLE",
        "database unavailable",
    )
    .into_response()
}

pub(super) fn sql_error_response(err: sqlx::Error) -> Response {
    tracing::warn!(error = %err, "admin query failed");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "internal server error",
    )
    .into_response()
}

pub(super) fn admin_error_response(err: crate::services::AdminError) -> Response {
    match err {
        crate::services::AdminError::Validation(message) => {
            json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message).into_response()
        }
        crate::services::AdminError::NotFound(message) => {
            json_error(StatusCode::NOT_FOUND, "NOT_FOUND", message).into_response()
        }
        crate::services::AdminError::Forbidden(message) => {
            json_error(StatusCode::FORBIDDEN, "FORBIDDEN", message).into_response()
        }
        crate::services::AdminError::Unavailable => db_unavailable(),
        crate::services::AdminError::Sql(err) => sql_error_response(err),
    }
}
