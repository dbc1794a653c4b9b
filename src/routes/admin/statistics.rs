use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct SuccessResponse<T> {
    success: bool,
    data: T,
}

pub async fn get_statistics(State(state): State<AppState>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match crate::services::statistics::get_system_statistics(proxy.as_ref()).await {
        Ok(data) => Json(SuccessResponse {
            success: true,
            data,
        })
        .into_response(),
        Err(err) => super::admin_error_response(err),
    }
}
