//! GuardAi: message verdicts, ticket-description scanning and escrow decisions
//! over an injected risk ledger.
//!
//! Verdicts are advisory. Callers enforce them: BLOCK stops the send and shows
//! `userMessage`, WARN sends with a banner, ALLOW passes silently.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::GuardConfig;
use crate::escrow::{self, EscrowDecision, EscrowRequest};
use crate::intent::{self, IntentLevel};
use crate::ledger::{AdminSummary, RiskLedger, severity_delta};
use crate::patterns::{self, Detection, Severity};
use crate::store::{RiskStore, Violation};
use crate::text;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictAction {
    Allow,
    Warn,
    Block,
}

impl fmt::Display for VerdictAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VerdictAction::Allow => "ALLOW",
            VerdictAction::Warn => "WARN",
            VerdictAction::Block => "BLOCK",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub action: VerdictAction,
    pub reason: String,
    pub risk_score_delta: u8,
    pub user_message: Option<String>,
    pub admin_message: Option<String>,
}

impl Verdict {
    fn allow(reason: &str) -> Self {
        Self {
            action: VerdictAction::Allow,
            reason: reason.to_string(),
            risk_score_delta: 0,
            user_message: None,
            admin_message: None,
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.action == VerdictAction::Block
    }
}

pub struct GuardAi {
    ledger: RiskLedger,
    platform: String,
}

impl GuardAi {
    /// `platform` is the marketplace name quoted in user-facing messages.
    pub fn new(store: Arc<dyn RiskStore>, cfg: &GuardConfig, platform: &str) -> Arc<Self> {
        Arc::new(Self {
            ledger: RiskLedger::new(store, cfg),
            platform: platform.to_string(),
        })
    }

    /// Process-lifetime ledger, nothing persisted.
    pub fn in_memory(cfg: &GuardConfig, platform: &str) -> Arc<Self> {
        Arc::new(Self {
            ledger: RiskLedger::in_memory(cfg),
            platform: platform.to_string(),
        })
    }

    pub fn ledger(&self) -> &RiskLedger {
        &self.ledger
    }

    /// Verdict for one chat message. BLOCK and WARN also append a violation
    /// to the sender's ledger; ALLOW never touches it.
    pub fn analyze_message(&self, message: &str, user_id: &str, is_paid: bool) -> Verdict {
        if is_paid {
            return Verdict::allow("Payment completed - contact sharing allowed");
        }

        let detections = patterns::detect(message);
        let intent = intent::classify_intent(&text::normalize_for_intent(message));

        if patterns::has_high_severity(&detections) || intent == IntentLevel::High {
            let verdict = self.block_verdict(&detections, intent);
            warn!(
                user_id,
                categories = ?patterns::categories(&detections),
                %intent,
                "message blocked"
            );
            let score = self
                .ledger
                .record_violation(user_id, Severity::High, detections, message);
            debug!(user_id, score, "risk score raised");
            return verdict;
        }

        if !detections.is_empty() || intent == IntentLevel::Medium {
            let verdict = Verdict {
                action: VerdictAction::Warn,
                reason: format!("Warning: Potential bypass attempt | Intent: {}", intent),
                risk_score_delta: severity_delta(Severity::Medium),
                user_message: Some(format!(
                    "⚠️ Please complete your purchase on {} to unlock seller contact details.",
                    self.platform
                )),
                admin_message: Some(format!(
                    "Warning issued for potential bypass. Intent: {}",
                    intent
                )),
            };
            info!(
                user_id,
                categories = ?patterns::categories(&detections),
                %intent,
                "message warned"
            );
            let score = self
                .ledger
                .record_violation(user_id, Severity::Medium, detections, message);
            debug!(user_id, score, "risk score raised");
            return verdict;
        }

        if intent == IntentLevel::Low {
            debug!(user_id, "low-risk deferral allowed");
            return Verdict::allow("Low risk message");
        }

        Verdict::allow("Clean message")
    }

    /// Scan a listing's free-text description before it is saved. The lister is
    /// charged like a chat sender; there is never payment context here.
    pub fn analyze_ticket_description(&self, description: &str, lister_id: &str) -> Verdict {
        self.analyze_message(description, lister_id, false)
    }

    /// Ticket images (QR / barcode) stay blurred until the buyer has paid.
    pub fn should_blur_ticket_image(&self, is_paid: bool) -> bool {
        !is_paid
    }

    pub fn decide_escrow(&self, req: &EscrowRequest) -> EscrowDecision {
        escrow::decide_escrow(&self.ledger, req)
    }

    pub fn risk_score(&self, user_id: &str) -> u8 {
        self.ledger.risk_score(user_id)
    }

    pub fn violations(&self, user_id: &str) -> Vec<Violation> {
        self.ledger.violations(user_id)
    }

    pub fn reset_user_risk(&self, user_id: &str) {
        self.ledger.reset_user_risk(user_id)
    }

    pub fn admin_summary(&self, user_id: &str, user_name: &str) -> AdminSummary {
        self.ledger.admin_summary(user_id, user_name)
    }

    fn block_verdict(&self, detections: &[Detection], intent: IntentLevel) -> Verdict {
        let cats = patterns::categories(detections);
        let detected = if cats.is_empty() {
            "none".to_string()
        } else {
            cats.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(", ")
        };
        let raw = serde_json::to_string(detections).unwrap_or_else(|_| format!("{:?}", detections));

        Verdict {
            action: VerdictAction::Block,
            reason: format!("Detected: {} | Intent: {}", detected, intent),
            risk_score_delta: severity_delta(Severity::High),
            user_message: Some(format!(
                "🛡️ For your safety, contact details can only be shared after payment is complete on {}.",
                self.platform
            )),
            admin_message: Some(format!(
                "User attempted to share contact info. Detections: {}",
                raw
            )),
        }
    }
}
