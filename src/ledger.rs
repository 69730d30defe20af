//! Risk ledger: per-user score, violation history and the admin-side projections.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::GuardConfig;
use crate::patterns::{Detection, Severity};
use crate::store::{MemoryRiskStore, RiskStore, UserRiskRecord, Violation};
use crate::text;

pub const RESTRICTED_AT: u8 = 30;
pub const BLOCKED_AT: u8 = 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Normal,
    Restricted,
    Blocked,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskLevel::Normal => "NORMAL",
            RiskLevel::Restricted => "RESTRICTED",
            RiskLevel::Blocked => "BLOCKED",
        })
    }
}

/// `< 30` NORMAL, `30..60` RESTRICTED, `>= 60` BLOCKED.
pub fn risk_level(score: u8) -> RiskLevel {
    if score < RESTRICTED_AT {
        RiskLevel::Normal
    } else if score < BLOCKED_AT {
        RiskLevel::Restricted
    } else {
        RiskLevel::Blocked
    }
}

/// Score increment per recorded violation.
/// LOW is not produced by the message path today but stays in the table.
pub fn severity_delta(severity: Severity) -> u8 {
    match severity {
        Severity::High => 20,
        Severity::Medium => 10,
        Severity::Low => 5,
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestedAction {
    SuspendAccount,
    RestrictFeatures,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummary {
    pub user_id: String,
    pub user_name: String,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub total_violations: usize,
    pub recent_violations: Vec<Violation>,
    pub suggested_action: SuggestedAction,
    pub summary: String,
}

pub struct RiskLedger {
    store: Arc<dyn RiskStore>,
    sample_chars: usize,
    recent: usize,
}

impl RiskLedger {
    pub fn new(store: Arc<dyn RiskStore>, cfg: &GuardConfig) -> Self {
        Self {
            store,
            sample_chars: cfg.message_sample_chars,
            recent: cfg.recent_violations,
        }
    }

    pub fn in_memory(cfg: &GuardConfig) -> Self {
        Self::new(
            Arc::new(MemoryRiskStore::new(cfg.max_violations_per_user)),
            cfg,
        )
    }

    pub fn store(&self) -> &Arc<dyn RiskStore> {
        &self.store
    }

    /// Append a violation and raise the score by the severity delta. Returns the new score.
    ///
    /// # Panics
    /// On an empty `user_id`; callers validate ids at the edge.
    pub fn record_violation(
        &self,
        user_id: &str,
        severity: Severity,
        detections: Vec<Detection>,
        message: &str,
    ) -> u8 {
        assert!(!user_id.is_empty(), "record_violation: empty user id");
        let violation = Violation {
            timestamp: Utc::now(),
            severity,
            detections,
            message_sample: text::prefix_chars(message, self.sample_chars),
        };
        self.store
            .append_violation(user_id, violation, severity_delta(severity))
    }

    pub fn risk_score(&self, user_id: &str) -> u8 {
        self.store.get(user_id).map(|r| r.risk_score).unwrap_or(0)
    }

    pub fn violations(&self, user_id: &str) -> Vec<Violation> {
        self.store
            .get(user_id)
            .map(|r| r.violations)
            .unwrap_or_default()
    }

    /// Zero the score and drop the history. Admin only.
    pub fn reset_user_risk(&self, user_id: &str) {
        let before = self.risk_score(user_id);
        self.store.put(UserRiskRecord::empty(user_id));
        info!(user_id, previous_score = before, "risk ledger reset");
    }

    /// Read-only projection for moderation views.
    pub fn admin_summary(&self, user_id: &str, user_name: &str) -> AdminSummary {
        let record = self
            .store
            .get(user_id)
            .unwrap_or_else(|| UserRiskRecord::empty(user_id));
        self.summarize(record, user_name)
    }

    /// Everyone above NORMAL, highest score first (ties by user id).
    pub fn risk_alerts(&self) -> Vec<AdminSummary> {
        let mut flagged: Vec<UserRiskRecord> = self
            .store
            .records()
            .into_iter()
            .filter(|r| risk_level(r.risk_score) != RiskLevel::Normal)
            .collect();
        flagged.sort_by(|a, b| {
            b.risk_score
                .cmp(&a.risk_score)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        flagged
            .into_iter()
            .map(|r| {
                let name = r.user_id.clone();
                self.summarize(r, &name)
            })
            .collect()
    }

    fn summarize(&self, record: UserRiskRecord, user_name: &str) -> AdminSummary {
        let score = record.risk_score;
        let level = risk_level(score);
        let total = record.violations.len();
        let skip = total.saturating_sub(self.recent);
        let recent: Vec<Violation> = record.violations.into_iter().skip(skip).collect();

        let suggested_action = if score >= BLOCKED_AT {
            SuggestedAction::SuspendAccount
        } else if score >= RESTRICTED_AT {
            SuggestedAction::RestrictFeatures
        } else {
            SuggestedAction::None
        };

        AdminSummary {
            user_id: record.user_id,
            user_name: user_name.to_string(),
            risk_score: score,
            risk_level: level,
            total_violations: total,
            recent_violations: recent,
            suggested_action,
            summary: format!(
                "User has {} violation(s). Risk score: {}/100. Status: {}",
                total, score, level
            ),
        }
    }
}
