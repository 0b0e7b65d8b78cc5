use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Local;
use tracing::info;

use crate::{
    AppState,
    error::ApiError,
    models::{Friend, FriendPayload, NewsFeed, ScheduleEntry, ScheduleResponse},
    schedule::decode_all,
    validation::{validate_friend_update, validate_new_friend},
};

#[utoipa::path(get, path = "/", tag = "campus")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Högskolan Dalarna Campus API",
        "endpoints": {
            "/duschema": "Get the public schedule as JSON",
            "/duschema.ical": "Download the public schedule as iCal file",
            "/dunews": "Get the latest news articles",
            "/api/v1/friends": "Friends register"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "campus")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(get, path = "/healthz/ready", tag = "campus")]
pub async fn healthz_ready() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(
    get,
    path = "/hello/{name}",
    params(("name" = String, Path, description = "Name to greet")),
    responses((status = 200, description = "Greeting", content_type = "text/plain")),
    tag = "campus"
)]
pub async fn hello(Path(name): Path<String>) -> String {
    let now = Local::now().format("%A, %d %B, %Y at %X");
    format!("Hello there, {name}! It's {now}")
}

async fn fetch_schedule(state: &AppState) -> Result<Vec<ScheduleEntry>, ApiError> {
    let descriptors = state.scraper.fetch_booking_descriptors().await?;
    let entries = decode_all(&descriptors);
    info!(count = entries.len(), "decoded schedule entries");
    Ok(entries)
}

#[utoipa::path(
    get,
    path = "/duschema",
    responses(
        (status = 200, description = "Decoded schedule entries", body = ScheduleResponse),
        (status = 500, description = "Schedule page could not be fetched"),
        (status = 504, description = "Schedule page timed out")
    ),
    tag = "schedule"
)]
pub async fn get_schedule(
    State(state): State<AppState>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let entries = fetch_schedule(&state).await?;
    Ok(Json(ScheduleResponse::success(entries)))
}

#[utoipa::path(
    get,
    path = "/duschema.ical",
    responses(
        (status = 200, description = "iCal file", content_type = "text/calendar"),
        (status = 404, description = "No schedule entries could be placed in time"),
        (status = 500, description = "Schedule page could not be fetched")
    ),
    tag = "schedule"
)]
pub async fn get_schedule_ical(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = fetch_schedule(&state).await?;
    let body = state
        .exporter
        .generate(&entries)
        .ok_or_else(|| ApiError::NotFound("No schedule entries found".into()))?;

    Ok((
        StatusCode::OK,
        [
            ("content-type", "text/calendar"),
            (
                "content-disposition",
                "attachment; filename=du_schedule.ics",
            ),
        ],
        body,
    ))
}

#[utoipa::path(
    get,
    path = "/dunews",
    responses(
        (status = 200, description = "Latest news", body = NewsFeed),
        (status = 500, description = "News page could not be fetched"),
        (status = 504, description = "News page timed out")
    ),
    tag = "news"
)]
pub async fn get_news(State(state): State<AppState>) -> Result<Json<NewsFeed>, ApiError> {
    let articles = state.scraper.fetch_news().await?;
    Ok(Json(NewsFeed {
        source: state.settings.news_source.clone(),
        count: articles.len(),
        articles,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/friends",
    responses((status = 200, description = "All friends ordered by id", body = [Friend])),
    tag = "friends"
)]
pub async fn list_friends(State(state): State<AppState>) -> Result<Json<Vec<Friend>>, ApiError> {
    Ok(Json(state.friends.all().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/friends/{friend_id}",
    params(("friend_id" = i64, Path, description = "Friend id")),
    responses(
        (status = 200, description = "Friend", body = Friend),
        (status = 404, description = "Unknown friend")
    ),
    tag = "friends"
)]
pub async fn get_friend(
    State(state): State<AppState>,
    Path(friend_id): Path<i64>,
) -> Result<Json<Friend>, ApiError> {
    state
        .friends
        .get(friend_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Friend with ID {friend_id} not found")))
}

#[utoipa::path(
    post,
    path = "/api/v1/friends",
    request_body = FriendPayload,
    responses(
        (status = 201, description = "Friend created", body = Friend),
        (status = 400, description = "Missing fields, invalid values or duplicate id")
    ),
    tag = "friends"
)]
pub async fn create_friend(
    State(state): State<AppState>,
    Json(payload): Json<FriendPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let friend = validate_new_friend(payload)?;
    let friend = state.friends.add(friend).await?;
    info!(id = friend.id, "friend created");
    Ok((StatusCode::CREATED, Json(friend)))
}

#[utoipa::path(
    put,
    path = "/api/v1/friends/{friend_id}",
    params(("friend_id" = i64, Path, description = "Friend id")),
    request_body = FriendPayload,
    responses(
        (status = 200, description = "Updated friend", body = Friend),
        (status = 400, description = "Invalid values"),
        (status = 404, description = "Unknown friend")
    ),
    tag = "friends"
)]
pub async fn update_friend(
    State(state): State<AppState>,
    Path(friend_id): Path<i64>,
    Json(payload): Json<FriendPayload>,
) -> Result<Json<Friend>, ApiError> {
    if state.friends.get(friend_id).await?.is_none() {
        return Err(ApiError::NotFound(format!(
            "Friend with ID {friend_id} not found"
        )));
    }
    let changes = validate_friend_update(payload)?;
    Ok(Json(state.friends.update(friend_id, changes).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/friends/{friend_id}",
    params(("friend_id" = i64, Path, description = "Friend id")),
    responses(
        (status = 200, description = "Friend deleted"),
        (status = 404, description = "Unknown friend")
    ),
    tag = "friends"
)]
pub async fn delete_friend(
    State(state): State<AppState>,
    Path(friend_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.friends.delete(friend_id).await?;
    info!(id = friend_id, "friend deleted");
    Ok(Json(
        serde_json::json!({ "message": format!("Friend {friend_id} deleted") }),
    ))
}
