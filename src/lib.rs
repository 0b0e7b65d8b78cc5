pub mod error;
pub mod friends;
pub mod handlers;
pub mod ical;
pub mod models;
pub mod openapi;
pub mod schedule;
pub mod scraper;
pub mod settings;
pub mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get};
use handlers::{
    create_friend, delete_friend, get_friend, get_news, get_schedule, get_schedule_ical,
    healthz_live, healthz_ready, hello, list_friends, root, update_friend,
};
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::friends::{FriendRepository, JsonFileStorage};
use crate::ical::ScheduleExporter;
use crate::openapi::ApiDoc;
use crate::scraper::{CampusScraper, ScrapeError};
use crate::settings::Settings;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub scraper: Arc<CampusScraper>,
    pub exporter: Arc<ScheduleExporter>,
    pub friends: Arc<FriendRepository>,
}

impl AppState {
    pub fn new(settings: Settings, friends: FriendRepository) -> Result<Self, ScrapeError> {
        let scraper = CampusScraper::new(
            settings.schedule_url.clone(),
            settings.news_url.clone(),
            &settings.user_agent,
            settings.fetch_timeout(),
        )?;
        Ok(Self {
            settings,
            scraper: Arc::new(scraper),
            exporter: Arc::new(ScheduleExporter::new()),
            friends: Arc::new(friends),
        })
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;

    let env_filter = if settings.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .init();

    let friends = FriendRepository::new(JsonFileStorage::new(settings.friends_file.clone()));
    let state = AppState::new(settings, friends)?;

    let app = build_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], state.settings.port));
    info!("Starting campus API on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );

    let mut router = Router::new()
        .route("/", get(root))
        .route("/healthz/live", get(healthz_live))
        .route("/healthz/ready", get(healthz_ready))
        .route("/hello/{name}", get(hello))
        .route("/duschema", get(get_schedule))
        .route("/duschema.ical", get(get_schedule_ical))
        .route("/dunews", get(get_news))
        .route("/api/v1/friends", get(list_friends).post(create_friend))
        .route(
            "/api/v1/friends/{friend_id}",
            get(get_friend).put(update_friend).delete(delete_friend),
        )
        .with_state(state.clone());

    if state.settings.enable_swagger {
        let openapi = ApiDoc::openapi();
        let swagger = SwaggerUi::new("/docs").url("/openapi.json", openapi);
        router = router.merge(swagger);
    }

    router.layer(trace_layer)
}
