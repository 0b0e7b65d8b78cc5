use utoipa::OpenApi;

use crate::models::{Friend, FriendPayload, NewsArticle, NewsFeed, ScheduleEntry, ScheduleResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::hello,
        crate::handlers::get_schedule,
        crate::handlers::get_schedule_ical,
        crate::handlers::get_news,
        crate::handlers::list_friends,
        crate::handlers::get_friend,
        crate::handlers::create_friend,
        crate::handlers::update_friend,
        crate::handlers::delete_friend
    ),
    components(schemas(
        ScheduleEntry,
        ScheduleResponse,
        NewsArticle,
        NewsFeed,
        Friend,
        FriendPayload
    )),
    tags(
        (name = "campus", description = "Service index and health"),
        (name = "schedule", description = "Public schedule scraped from TimeEdit"),
        (name = "news", description = "News scraped from du.se"),
        (name = "friends", description = "File-backed friends register")
    ),
)]
pub struct ApiDoc;
