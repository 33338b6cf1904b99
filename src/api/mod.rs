use crate::config::Config;
use crate::services::health_service::HealthService;
use crate::services::message_service::MessageService;
use crate::services::release_service::ReleaseService;
use crate::services::settings_service::SettingsService;
use axum::body::Body;
use axum::http::Request;
use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_governor::GovernorLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod health;
pub mod messages;
pub mod middleware;
pub mod release;
pub mod settings;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub message_service: MessageService,
    pub settings_service: SettingsService,
}

#[derive(Clone, Debug)]
pub struct MgmtState {
    pub health_service: HealthService,
    pub release_service: ReleaseService,
    pub release_secret: Option<String>,
}

/// Configures and returns the primary application router.
///
/// # Panics
/// Panics if the rate limiter configuration cannot be constructed.
pub fn app_router(config: Config, message_service: MessageService, settings_service: SettingsService) -> Router {
    let std_interval_ns = 1_000_000_000 / config.rate_limit.per_second.max(1);
    let standard_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_nanosecond(u64::from(std_interval_ns))
            .burst_size(config.rate_limit.burst)
            .finish()
            .expect("Failed to build standard rate limiter config"),
    );

    // Send tier: stricter limits for message submission
    let send_interval_ns = 1_000_000_000 / config.rate_limit.send_per_second.max(1);
    let send_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_nanosecond(u64::from(send_interval_ns))
            .burst_size(config.rate_limit.send_burst)
            .finish()
            .expect("Failed to build send rate limiter config"),
    );

    let state = AppState { config, message_service, settings_service };

    let send_routes =
        Router::new().route("/messages", post(messages::send_message)).layer(GovernorLayer::new(send_conf));

    let api_routes = Router::new()
        .route("/messages/{peerId}", get(messages::get_conversation))
        .route("/messages/{messageId}/read", post(messages::mark_read))
        .route("/settings/quiet-hours", get(settings::get_quiet_hours))
        .route("/settings/quiet-hours", put(settings::update_quiet_hours))
        .layer(GovernorLayer::new(standard_conf));

    Router::new()
        .nest("/v1", send_routes.merge(api_routes))
        .layer(PropagateRequestIdLayer::new(axum::http::HeaderName::from_static("x-request-id")))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(move |request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<tower_http::request_id::RequestId>()
                        .map(|id| id.header_value().to_str().unwrap_or_default())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                        "otel.kind" = "server",
                        "user_id" = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                        let status = response.status();
                        tracing::Span::current().record("http.response.status_code", status.as_u16());

                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %status.as_u16(),
                            "request completed"
                        );
                    },
                )
                .on_failure(|error, _latency, _span: &tracing::Span| {
                    tracing::error!(error = %error, "request failed");
                }),
        )
        .layer(SetRequestIdLayer::new(
            axum::http::HeaderName::from_static("x-request-id"),
            middleware::MakeRequestUuidOrHeader,
        ))
        .with_state(state)
}

pub fn mgmt_router(state: MgmtState) -> Router {
    Router::new()
        .route("/livez", get(health::livez))
        .route("/readyz", get(health::readyz))
        .route("/release", post(release::trigger_release))
        .with_state(state)
}
