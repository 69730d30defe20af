//! Payout hold policy at the moment a sale's payment clears.
//! Reads the seller's ledger entry, never writes it.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ledger::{BLOCKED_AT, RESTRICTED_AT, RiskLedger};

/// Price above which a sale is always held for confirmation.
pub const HIGH_VALUE_PRICE: f64 = 10_000.0;
pub const TRUSTED_REPUTATION: f64 = 4.5;
/// Instant release also needs the seller's score below this.
pub const TRUSTED_MAX_SCORE: u8 = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EscrowAction {
    InstantRelease,
    HoldForConfirmation,
    ManualAdminReview,
}

impl fmt::Display for EscrowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EscrowAction::InstantRelease => "INSTANT_RELEASE",
            EscrowAction::HoldForConfirmation => "HOLD_FOR_CONFIRMATION",
            EscrowAction::ManualAdminReview => "MANUAL_ADMIN_REVIEW",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EscrowRequest {
    pub seller_id: String,
    pub ticket_price: f64,
    #[serde(default)]
    pub ticket_type: Option<String>,
    #[serde(default)]
    pub seller_reputation: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EscrowDecision {
    pub action: EscrowAction,
    pub hold_days: u32,
    pub reason: String,
    pub admin_note: String,
}

impl EscrowDecision {
    /// When the payout may go out. `None` while staff review is pending.
    pub fn release_at(&self, paid_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.action {
            EscrowAction::ManualAdminReview => None,
            _ => Some(paid_at + Duration::days(i64::from(self.hold_days))),
        }
    }
}

/// First matching rule wins:
/// 1. score >= 60 or >= 3 violations: manual review, 7 days
/// 2. score >= 30, price > 10000 or any violation: hold 3 days
/// 3. reputation >= 4.5 and score < 10: instant release
/// 4. otherwise hold 1 day
pub fn decide_escrow(ledger: &RiskLedger, req: &EscrowRequest) -> EscrowDecision {
    let score = ledger.risk_score(&req.seller_id);
    let violations = ledger.violations(&req.seller_id).len();

    let decision = if score >= BLOCKED_AT || violations >= 3 {
        EscrowDecision {
            action: EscrowAction::ManualAdminReview,
            hold_days: 7,
            reason: "High risk seller - manual review required".into(),
            admin_note: format!("Risk Score: {}, Violations: {}", score, violations),
        }
    } else if score >= RESTRICTED_AT || req.ticket_price > HIGH_VALUE_PRICE || violations >= 1 {
        EscrowDecision {
            action: EscrowAction::HoldForConfirmation,
            hold_days: 3,
            reason: "Standard escrow hold for buyer confirmation".into(),
            admin_note: format!(
                "Medium risk or high value. Risk Score: {}, Violations: {}, Price: {}. Holding payment for 3 days.",
                score, violations, req.ticket_price
            ),
        }
    } else if req.seller_reputation >= TRUSTED_REPUTATION && score < TRUSTED_MAX_SCORE {
        EscrowDecision {
            action: EscrowAction::InstantRelease,
            hold_days: 0,
            reason: "Trusted seller - instant release".into(),
            admin_note: "Seller has excellent reputation".into(),
        }
    } else {
        EscrowDecision {
            action: EscrowAction::HoldForConfirmation,
            hold_days: 1,
            reason: "Standard escrow hold".into(),
            admin_note: "Normal transaction".into(),
        }
    };

    debug!(
        seller_id = %req.seller_id,
        ticket_type = req.ticket_type.as_deref().unwrap_or("-"),
        score,
        violations,
        action = %decision.action,
        hold_days = decision.hold_days,
        "escrow decided"
    );
    decision
}
