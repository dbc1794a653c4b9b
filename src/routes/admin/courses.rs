use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::operations::catalog::{self, Course, CourseFilter, CourseModule};
use crate::response::json_error;
use crate::services::catalog::validate_level;
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
    category_id: Option<String>,
    language: Option<String>,
    level: Option<String>,
    is_published: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CourseListData {
    courses: Vec<Course>,
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCourseInput {
    category_id: String,
    title: String,
    slug: Option<String>,
    description: Option<String>,
    cover_image: Option<String>,
    language: String,
    level: String,
    is_published: Option<bool>,
    sort_order: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateCourseInput {
    category_id: Option<String>,
    title: Option<String>,
    slug: Option<String>,
    description: Option<String>,
    cover_image: Option<String>,
    language: Option<String>,
    level: Option<String>,
    is_published: Option<bool>,
    sort_order: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateModuleInput {
    title: String,
    sort_order: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateModuleInput {
    title: Option<String>,
    sort_order: Option<i32>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route(
            "/:id",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/:id/modules", get(list_modules).post(create_module))
        .route(
            "/:courseId/modules/:id",
            axum::routing::put(update_module).delete(delete_module),
        )
}

async fn list_courses(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let page = listing::clamp_page(query.page);
    let page_size = listing::clamp_page_size(query.page_size);
    let offset = (page - 1) * page_size;

    let level = match query.level.as_deref() {
        Some(raw) => match validate_level(raw) {
            Ok(level) => Some(level),
            Err(err) => return super::admin_error_response(err),
        },
        None => None,
    };

    let filter = CourseFilter {
        category_id: query.category_id,
        language: query.language,
        level,
        is_published: query.is_published,
        search: listing::normalize_search(query.search.as_deref()),
    };

    let total = match catalog::count_courses(proxy.as_ref(), &filter).await {
        Ok(total) => total,
        Err(err) => return super::sql_error_response(err),
    };

    let courses = if total == 0 {
        Vec::new()
    } else {
        match catalog::select_courses(proxy.as_ref(), &filter, page_size, offset).await {
            Ok(rows) => rows,
            Err(err) => return super::sql_error_response(err),
        }
    };

    Json(SuccessResponse {
        success: true,
        data: CourseListData {
            courses,
            pagination: listing::build_pagination(page, page_size, total),
        },
    })
    .into_response()
}

async fn get_course(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match catalog::get_course(proxy.as_ref(), &id).await {
        Ok(Some(course)) => Json(SuccessResponse {
            success: true,
            data: course,
        })
        .into_response(),
        Ok(None) => {
            json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "course not found").into_response()
        }
        Err(err) => super::sql_error_response(err),
    }
}

async fn create_course(
    State(state): State<AppState>,
    Json(input): Json<CreateCourseInput>,
) -> Response {
    if input.title.trim().is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "course title must not be empty",
        )
        .into_response();
    }
    if input.language.trim().is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "course language must not be empty",
        )
        .into_response();
    }
    let level = match validate_level(&input.level) {
        Ok(level) => level,
        Err(err) => return super::admin_error_response(err),
    };

    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match catalog::get_category(proxy.as_ref(), &input.category_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "category not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    let course = Course {
        id: uuid::Uuid::new_v4().to_string(),
        category_id: input.category_id,
        title: input.title.trim().to_string(),
        slug: resolve_slug(input.slug.as_deref(), &input.title),
        description: input.description,
        cover_image: input.cover_image,
        language: input.language.trim().to_string(),
        level,
        is_published: input.is_published.unwrap_or(false),
        sort_order: input.sort_order.unwrap_or(0),
        created_at: now.clone(),
        updated_at: now,
    };

    if let Err(err) = catalog::insert_course(proxy.as_ref(), &course).await {
        return super::sql_error_response(err);
    }

    (
        StatusCode::CREATED,
        Json(SuccessResponse {
            success: true,
            data: course,
        }),
    )
        .into_response()
}

async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateCourseInput>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let mut course = match catalog::get_course(proxy.as_ref(), &id).await {
        Ok(Some(course)) => course,
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "course not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    };

    if let Some(category_id) = input.category_id {
        match catalog::get_category(proxy.as_ref(), &category_id).await {
            Ok(Some(_)) => course.category_id = category_id,
            Ok(None) => {
                return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "category not found")
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
                "course title must not be empty",
            )
            .into_response();
        }
        course.title = title.trim().to_string();
    }
    if let Some(slug) = input.slug {
        course.slug = resolve_slug(Some(&slug), &course.title);
    }
    if let Some(description) = input.description {
        course.description = Some(description);
    }
    if let Some(cover_image) = input.cover_image {
        course.cover_image = Some(cover_image);
    }
    if let Some(language) = input.language {
        course.language = language.trim().to_string();
    }
    if let Some(ref level) = input.level {
        match validate_level(level) {
            Ok(level) => course.level = level,
            Err(err) => return super::admin_error_response(err),
        }
    }
    if let Some(is_published) = input.is_published {
        course.is_published = is_published;
    }
    if let Some(sort_order) = input.sort_order {
        course.sort_order = sort_order;
    }

    if let Err(err) = catalog::update_course(proxy.as_ref(), &course).await {
        return super::sql_error_response(err);
    }

    match catalog::get_course(proxy.as_ref(), &id).await {
        Ok(Some(updated)) => Json(SuccessResponse {
            success: true,
            data: updated,
        })
        .into_response(),
        Ok(None) => {
            json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "course not found").into_response()
        }
        Err(err) => super::sql_error_response(err),
    }
}

async fn delete_course(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match catalog::get_course(proxy.as_ref(), &id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "course not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    match catalog::delete_course(proxy.as_ref(), &id).await {
        Ok(()) => Json(MessageResponse {
            success: true,
            message: "course deleted",
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}

async fn list_modules(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match catalog::get_course(proxy.as_ref(), &id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "course not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    match catalog::get_modules_by_course(proxy.as_ref(), &id).await {
        Ok(modules) => Json(SuccessResponse {
            success: true,
            data: modules,
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}

async fn create_module(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CreateModuleInput>,
) -> Response {
    if input.title.trim().is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "module title must not be empty",
        )
        .into_response();
    }

    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match catalog::get_course(proxy.as_ref(), &id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "course not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    let module = CourseModule {
        id: uuid::Uuid::new_v4().to_string(),
        course_id: id,
        title: input.title.trim().to_string(),
        sort_order: input.sort_order.unwrap_or(0),
        created_at: now.clone(),
        updated_at: now,
    };

    if let Err(err) = catalog::insert_module(proxy.as_ref(), &module).await {
        return super::sql_error_response(err);
    }

    (
        StatusCode::CREATED,
        Json(SuccessResponse {
            success: true,
            data: module,
        }),
    )
        .into_response()
}

async fn update_module(
    State(state): State<AppState>,
    Path((course_id, id)): Path<(String, String)>,
    Json(input): Json<UpdateModuleInput>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    let mut module = match catalog::get_module(proxy.as_ref(), &id).await {
        Ok(Some(module)) if module.course_id == course_id => module,
        Ok(_) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "module not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    };

    if let Some(title) = input.title {
        if title.trim().is_empty() {
            return json_error(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "module title must not be empty",
            )
            .into_response();
        }
        module.title = title.trim().to_string();
    }
    if let Some(sort_order) = input.sort_order {
        module.sort_order = sort_order;
    }

    if let Err(err) = catalog::update_module(proxy.as_ref(), &module).await {
        return super::sql_error_response(err);
    }

    Json(SuccessResponse {
        success: true,
        data: module,
    })
    .into_response()
}

async fn delete_module(
    State(state): State<AppState>,
    Path((course_id, id)): Path<(String, String)>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return super::db_unavailable();
    };

    match catalog::get_module(proxy.as_ref(), &id).await {
        Ok(Some(module)) if module.course_id == course_id => {}
        Ok(_) => {
            return json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "module not found")
                .into_response()
        }
        Err(err) => return super::sql_error_response(err),
    }

    match catalog::delete_module(proxy.as_ref(), &id).await {
        Ok(()) => Json(MessageResponse {
            success: true,
            message: "module deleted",
        })
        .into_response(),
        Err(err) => super::sql_error_response(err),
    }
}
