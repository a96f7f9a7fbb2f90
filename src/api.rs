use std::sync::Arc;

use anyhow::{Error, Result};
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    clients::{health::HealthChecker, overlay::OverlayClient, queue::QueueStore},
    config::{Config, IngestMode},
    error::RelayError,
    models::{health::HealthStatus, response::WebhookResponse, sale::SaleEvent},
    relay::{ProcessOutcome, process_next, relay_event},
};

pub struct AppState {
    config: Arc<Config>,
    queue: Option<Arc<dyn QueueStore>>,
    overlay: OverlayClient,
    health_checker: HealthChecker,
}

impl AppState {
    /// `queue` is `None` when the store could not be reached at startup.
    pub fn new(config: Config, queue: Option<Arc<dyn QueueStore>>) -> Result<Self, Error> {
        let config = Arc::new(config);
        let overlay = OverlayClient::new(&config.se_api_base_url, config.sink_timeout())?;

        Ok(Self {
            health_checker: HealthChecker::new(Arc::clone(&config), queue.clone()),
            config,
            queue,
            overlay,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook/sales", post(ingest_sale))
        .route("/process_queue", get(process_queue))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(
    config: Config,
    queue: Option<Arc<dyn QueueStore>>,
) -> Result<(), Error> {
    let addr = format!("0.0.0.0:{}", config.server_port);
    let state = Arc::new(AppState::new(config, queue)?);

    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Sale relay server started");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

#[instrument(name = "ingest_sale", skip_all, fields(trace_id = %Uuid::new_v4()))]
async fn ingest_sale(State(state): State<Arc<AppState>>, body: Bytes) -> impl IntoResponse {
    match ingest(&state, &body).await {
        Ok(message) => (StatusCode::OK, Json(WebhookResponse::success(message))),
        Err(e) => {
            warn!(error = %e, "Sale webhook not accepted");

            let message = match &e {
                RelayError::InvalidPayload => "No data received".to_string(),
                RelayError::BackendUnavailable | RelayError::ConfigIncomplete { .. } => {
                    "Server configuration incomplete".to_string()
                }
                RelayError::QueueWrite(_) => "Failed to queue sale notification".to_string(),
                other => other.to_string(),
            };

            (e.status_code(), Json(WebhookResponse::error(message)))
        }
    }
}

async fn ingest(state: &AppState, body: &[u8]) -> Result<&'static str, RelayError> {
    match state.config.ingest_mode {
        IngestMode::Queued => {
            let queue = state.queue.as_ref().ok_or(RelayError::BackendUnavailable)?;
            let event = SaleEvent::from_body(body)?;
            let entry = event.to_entry()?;

            let depth = queue
                .append(&state.config.sale_queue_key, &entry)
                .await
                .map_err(RelayError::QueueWrite)?;

            info!(depth, "Sale queued for processing");
            Ok("Sale queued for processing")
        }
        IngestMode::Direct => {
            let event = SaleEvent::from_body(body)?;
            let overlay = state.overlay.clone();
            let config = Arc::clone(&state.config);

            tokio::spawn(
                async move {
                    let result = match config.relay_settings() {
                        Ok(settings) => relay_event(&event, &overlay, &settings).await,
                        Err(e) => Err(e),
                    };

                    match result {
                        Ok(()) => info!("Sale relayed directly"),
                        Err(e) => error!(error = %e, "Direct relay failed"),
                    }
                }
                .in_current_span(),
            );

            Ok("Sale notification dispatched")
        }
    }
}

async fn process_queue(State(state): State<Arc<AppState>>) -> (StatusCode, String) {
    let Some(queue) = state.queue.as_deref() else {
        error!("Queue store not connected");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error: Queue store not connected".to_string(),
        );
    };

    match process_next(queue, &state.overlay, &state.config).await {
        Ok(ProcessOutcome::QueueEmpty) => (StatusCode::OK, "Queue empty".to_string()),
        Ok(ProcessOutcome::Delivered) => (
            StatusCode::OK,
            "Successfully processed one sale from queue".to_string(),
        ),
        Err(e) => {
            let body = match &e {
                RelayError::ConfigIncomplete { .. } => {
                    "Error: Server configuration incomplete".to_string()
                }
                RelayError::QueueRead(_) => "Error: Failed to access queue".to_string(),
                RelayError::BackendUnavailable => "Error: Queue store not connected".to_string(),
                other => format!("Error: Failed to process sale: {}", other),
            };

            (e.status_code(), body)
        }
    }
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_checker.check_all().await;

    let status_code = match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}
