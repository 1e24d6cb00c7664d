//! # Rally API Server
//!
//! Axum-based HTTP API for the volunteer coordination backend.
//!
//! ## Modules
//!
//! - [`dto`]: Request/response data transfer objects
//! - [`handlers`]: Request handlers, one module per resource
//! - [`middleware`]: Actor resolution from the authenticating proxy
//! - [`router`]: API route configuration

use std::sync::Arc;

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use router::create_app_router;

/// Application state shared across request handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db:         Arc<sea_orm::DbConn>,
    /// Notification delivery, fire-and-forget
    pub notifier:   Arc<dyn engine::NotificationSink>,
    /// Optional postal-code enrichment for profile updates
    pub lookup:     Option<Arc<dyn engine::AddressLookup>>,
    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

impl AppState {
    #[must_use]
    pub fn new(db: sea_orm::DbConn) -> Self {
        Self {
            db: Arc::new(db),
            notifier: Arc::new(engine::LogNotifier),
            lookup: None,
            start_time: std::time::Instant::now(),
        }
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn engine::NotificationSink>) -> Self {
        self.notifier = notifier;
        self
    }

    #[must_use]
    pub fn with_address_lookup(mut self, lookup: Arc<dyn engine::AddressLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    #[must_use]
    pub fn membership(&self) -> engine::MembershipLedger { engine::MembershipLedger::new(self.db.clone()) }

    #[must_use]
    pub fn roles(&self) -> engine::RoleManager { engine::RoleManager::new(self.db.clone()) }

    #[must_use]
    pub fn lifecycle(&self) -> engine::LifecycleController { engine::LifecycleController::new(self.db.clone()) }

    #[must_use]
    pub fn evaluations(&self) -> engine::EvaluationService { engine::EvaluationService::new(self.db.clone()) }
}

/// Server initialization result
#[derive(Debug)]
pub struct ServerResult {
    /// The address the server is bound to
    pub address:    String,
    /// Server start timestamp for logging
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl ServerResult {
    #[must_use]
    pub fn new(address: &str) -> Self {
        Self {
            address:    address.to_string(),
            started_at: chrono::Utc::now(),
        }
    }
}
