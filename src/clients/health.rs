use std::{collections::HashMap, sync::Arc, time::Instant};

use chrono::Utc;
use tracing::{debug, warn};

use crate::{
    clients::NotificationStore,
    dispatcher::Dispatcher,
    models::health::{HealthCheckResponse, HealthStatus, ServiceHealth},
};

pub struct HealthChecker {
    store: Arc<dyn NotificationStore>,
    dispatcher: Arc<Dispatcher>,
}

impl HealthChecker {
    pub fn new(store: Arc<dyn NotificationStore>, dispatcher: Arc<Dispatcher>) -> Self {
        Self { store, dispatcher }
    }

    pub async fn check_all(&self) -> HealthCheckResponse {
        let mut checks = HashMap::new();

        checks.insert("store".to_string(), self.check_store().await);
        checks.insert("push".to_string(), self.check_push());

        let status = Self::determine_overall_status(&checks);

        HealthCheckResponse {
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            status,
            timestamp: Utc::now(),
            checks,
        }
    }

    async fn check_store(&self) -> ServiceHealth {
        let start = Instant::now();

        match self.store.health_check().await {
            Ok(_) => {
                let elapsed = start.elapsed().as_millis() as u64;
                debug!(response_time_ms = elapsed, "Store health check passed");
                ServiceHealth::healthy(elapsed).with_detail(self.store.backend())
            }
            Err(e) => {
                warn!(backend = self.store.backend(), error = %e, "Store health check failed");
                ServiceHealth::unhealthy(format!("Health check query failed: {}", e))
                    .with_detail(self.store.backend())
            }
        }
    }

    // The push client is built on the first dispatch, so "not yet" is healthy.
    fn check_push(&self) -> ServiceHealth {
        if self.dispatcher.push_client_ready() {
            return ServiceHealth::healthy(0).with_detail("initialized");
        }

        let failures = self.dispatcher.push_init_failures();
        if failures > 0 {
            return ServiceHealth::degraded(format!(
                "Push client initialization failed {} time(s)",
                failures
            ));
        }

        ServiceHealth::healthy(0).with_detail("pending_first_dispatch")
    }

    fn determine_overall_status(checks: &HashMap<String, ServiceHealth>) -> HealthStatus {
        let has_unhealthy = checks
            .values()
            .any(|health| health.status == HealthStatus::Unhealthy);

        let has_degraded = checks
            .values()
            .any(|health| health.status == HealthStatus::Degraded);

        if has_unhealthy {
            HealthStatus::Unhealthy
        } else if has_degraded {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }
}
