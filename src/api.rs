//! HTTP surface for chat, listing and admin clients. JSON in, JSON out.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use subtle::ConstantTimeEq;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::AppContext;
use crate::error::{GuardError, require_user_id};
use crate::escrow::{EscrowDecision, EscrowRequest};
use crate::guard::Verdict;
use crate::ledger::{AdminSummary, RiskLevel, risk_level};
use crate::store::Violation;

impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        let status = match self {
            GuardError::EmptyUserId => StatusCode::BAD_REQUEST,
            GuardError::Unauthorized => StatusCode::UNAUTHORIZED,
            GuardError::Forbidden | GuardError::AdminDisabled => StatusCode::FORBIDDEN,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    pub message: String,
    pub user_id: String,
    #[serde(default)]
    pub is_paid: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionRequest {
    pub description: String,
    pub lister_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskView {
    pub user_id: String,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub name: Option<String>,
}

type AppState = State<Arc<AppContext>>;

pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/guard/messages", post(analyze_message))
        .route("/guard/ticket-descriptions", post(analyze_description))
        .route("/admin/escrow", post(decide_escrow))
        .route("/admin/users/{user_id}/risk", get(user_risk))
        .route("/admin/users/{user_id}/violations", get(user_violations))
        .route("/admin/users/{user_id}/summary", get(user_summary))
        .route("/admin/users/{user_id}/reset", post(reset_user))
        .route("/admin/risk-alerts", get(risk_alerts))
        .with_state(ctx)
}

/// Bind and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, ctx: Arc<AppContext>) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "guard api listening");
    axum::serve(listener, router(ctx)).await?;
    Ok(())
}

/// `Authorization: Bearer <token>`, compared in constant time.
fn require_admin(ctx: &AppContext, headers: &HeaderMap) -> Result<(), GuardError> {
    let Some(expected) = ctx.settings.http.admin_token.as_deref() else {
        return Err(GuardError::AdminDisabled);
    };
    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(GuardError::Unauthorized)?;

    if bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        warn!("admin token rejected");
        Err(GuardError::Forbidden)
    }
}

async fn analyze_message(
    State(ctx): AppState,
    Json(req): Json<MessageRequest>,
) -> Result<Json<Verdict>, GuardError> {
    let user_id = require_user_id(&req.user_id)?;
    Ok(Json(ctx.guard.analyze_message(&req.message, user_id, req.is_paid)))
}

async fn analyze_description(
    State(ctx): AppState,
    Json(req): Json<DescriptionRequest>,
) -> Result<Json<Verdict>, GuardError> {
    let lister_id = require_user_id(&req.lister_id)?;
    Ok(Json(ctx.guard.analyze_ticket_description(&req.description, lister_id)))
}

async fn decide_escrow(
    State(ctx): AppState,
    headers: HeaderMap,
    Json(mut req): Json<EscrowRequest>,
) -> Result<Json<EscrowDecision>, GuardError> {
    require_admin(&ctx, &headers)?;
    req.seller_id = require_user_id(&req.seller_id)?.to_string();
    Ok(Json(ctx.guard.decide_escrow(&req)))
}

async fn user_risk(
    State(ctx): AppState,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Json<RiskView>, GuardError> {
    require_admin(&ctx, &headers)?;
    let user_id = require_user_id(&user_id)?;
    let score = ctx.guard.risk_score(user_id);
    Ok(Json(RiskView {
        user_id: user_id.to_string(),
        risk_score: score,
        risk_level: risk_level(score),
    }))
}

async fn user_violations(
    State(ctx): AppState,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Violation>>, GuardError> {
    require_admin(&ctx, &headers)?;
    let user_id = require_user_id(&user_id)?;
    Ok(Json(ctx.guard.violations(user_id)))
}

async fn user_summary(
    State(ctx): AppState,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Query(q): Query<SummaryQuery>,
) -> Result<Json<AdminSummary>, GuardError> {
    require_admin(&ctx, &headers)?;
    let user_id = require_user_id(&user_id)?;
    let name = q.name.unwrap_or_else(|| user_id.to_string());
    Ok(Json(ctx.guard.admin_summary(user_id, &name)))
}

async fn reset_user(
    State(ctx): AppState,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<StatusCode, GuardError> {
    require_admin(&ctx, &headers)?;
    let user_id = require_user_id(&user_id)?;
    ctx.guard.reset_user_risk(user_id);
    Ok(StatusCode::NO_CONTENT)
}

async fn risk_alerts(
    State(ctx): AppState,
    headers: HeaderMap,
) -> Result<Json<Vec<AdminSummary>>, GuardError> {
    require_admin(&ctx, &headers)?;
    Ok(Json(ctx.guard.ledger().risk_alerts()))
}
