use std::{collections::HashMap, sync::Arc, time::Instant};

use chrono::Utc;
use tracing::{debug, warn};

use crate::{
    clients::queue::QueueStore,
    config::{Config, IngestMode},
    models::health::{HealthCheckResponse, HealthStatus, ServiceHealth},
};

pub struct HealthChecker {
    config: Arc<Config>,
    queue: Option<Arc<dyn QueueStore>>,
}

impl HealthChecker {
    pub fn new(config: Arc<Config>, queue: Option<Arc<dyn QueueStore>>) -> Self {
        Self { config, queue }
    }

    pub async fn check_all(&self) -> HealthCheckResponse {
        let mut checks = HashMap::new();

        checks.insert("queue_store".to_string(), self.check_queue().await);
        checks.insert("relay_config".to_string(), self.check_relay_config());

        HealthCheckResponse {
            status: self.determine_overall_status(&checks),
            timestamp: Utc::now(),
            checks,
        }
    }

    async fn check_queue(&self) -> ServiceHealth {
        let Some(queue) = &self.queue else {
            return ServiceHealth::unhealthy("Queue store not connected".to_string());
        };

        let start = Instant::now();

        match queue.ping().await {
            Ok(()) => {
                let elapsed = start.elapsed().as_millis() as u64;
                debug!(response_time_ms = elapsed, "Queue store health check passed");

                let health = ServiceHealth::healthy(elapsed);
                match queue.len(&self.config.sale_queue_key).await {
                    Ok(depth) => health.with_queue_depth(depth),
                    Err(e) => {
                        warn!(error = %e, "Queue depth unavailable");
                        health
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Queue store ping failed");
                ServiceHealth::unhealthy(format!("Ping failed: {}", e))
            }
        }
    }

    fn check_relay_config(&self) -> ServiceHealth {
        match self.config.relay_settings() {
            Ok(_) => ServiceHealth::ok(),
            Err(e) => ServiceHealth::degraded(e.to_string()),
        }
    }

    fn determine_overall_status(&self, checks: &HashMap<String, ServiceHealth>) -> HealthStatus {
        let queue_required = self.config.ingest_mode == IngestMode::Queued;

        let critical_unhealthy = checks
            .iter()
            .filter(|(name, _)| queue_required || name.as_str() != "queue_store")
            .any(|(_, health)| health.status == HealthStatus::Unhealthy);

        let has_degraded = checks
            .values()
            .any(|health| health.status != HealthStatus::Healthy);

        if critical_unhealthy {
            HealthStatus::Unhealthy
        } else if has_degraded {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }
}
