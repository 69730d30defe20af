// src/lib.rs

pub mod api;
pub mod config;
pub mod error;
pub mod escrow;
pub mod guard;
pub mod intent;
pub mod ledger;
pub mod logging;
pub mod patterns;
pub mod store;
pub mod text;

pub use crate::escrow::{EscrowAction, EscrowDecision, EscrowRequest};
pub use crate::guard::{GuardAi, Verdict, VerdictAction};
pub use crate::ledger::{AdminSummary, RiskLevel, SuggestedAction};
pub use crate::store::{MemoryRiskStore, RiskStore, UserRiskRecord, Violation};

use anyhow::{Context as _, Result};
use std::net::SocketAddr;
use std::sync::Arc;

use config::Settings;

/// Application context: settings plus the shared guard service.
#[derive(Clone)]
pub struct AppContext {
    pub settings: Settings,
    pub guard: Arc<GuardAi>,
}

impl AppContext {
    /// Context with an in-memory ledger; no logging side effects.
    pub fn new(settings: Settings) -> Arc<Self> {
        let guard = GuardAi::in_memory(&settings.guard, &settings.app.name);
        Arc::new(Self { settings, guard })
    }

    /// Context over a caller-supplied store (persistent backend, test fake).
    pub fn with_store(settings: Settings, store: Arc<dyn RiskStore>) -> Arc<Self> {
        let guard = GuardAi::new(store, &settings.guard, &settings.app.name);
        Arc::new(Self { settings, guard })
    }

    /// Full bootstrap:
    /// - logging
    /// - guard with the process-lifetime ledger
    pub async fn bootstrap(settings: Settings) -> Result<Arc<Self>> {
        logging::init(&settings);
        tracing::info!(
            env = %settings.env,
            max_violations = settings.guard.max_violations_per_user,
            admin_api = settings.http.admin_token.is_some(),
            "guard bootstrapped"
        );
        Ok(Self::new(settings))
    }

    /// "production" | "development" | ...
    #[inline]
    pub fn env(&self) -> &str {
        &self.settings.env
    }
}

/// Serve the HTTP API on `http.bind`.
pub async fn run(ctx: Arc<AppContext>) -> Result<()> {
    let addr: SocketAddr = ctx
        .settings
        .http
        .bind
        .parse()
        .with_context(|| format!("invalid http.bind {:?}", ctx.settings.http.bind))?;
    api::serve(addr, ctx).await
}
