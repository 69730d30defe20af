use std::sync::Arc;

use tickswapr_guard::config::GuardConfig;
use tickswapr_guard::{
    EscrowAction, EscrowRequest, GuardAi, MemoryRiskStore, RiskLevel, SuggestedAction,
    VerdictAction,
};

fn make_guard() -> Arc<GuardAi> {
    GuardAi::in_memory(&GuardConfig::default(), "TickSwapr")
}

fn sale(seller: &str, price: f64, reputation: f64) -> EscrowRequest {
    EscrowRequest {
        seller_id: seller.into(),
        ticket_price: price,
        ticket_type: Some("cricket".into()),
        seller_reputation: reputation,
    }
}

#[test]
fn chat_then_payout_flow() {
    let guard = make_guard();
    let seller = "seller-42";

    // clean seller with great reputation: instant payout
    let d = guard.decide_escrow(&sale(seller, 1000.0, 4.8));
    assert_eq!(d.action, EscrowAction::InstantRelease);
    assert_eq!(d.hold_days, 0);

    // seller nudges buyer to whatsapp
    let v = guard.analyze_message("let's discuss on whatsapp", seller, false);
    assert_eq!(v.action, VerdictAction::Warn);
    assert_eq!(guard.risk_score(seller), 10);

    let d = guard.decide_escrow(&sale(seller, 1000.0, 4.8));
    assert_eq!(d.action, EscrowAction::HoldForConfirmation);
    assert_eq!(d.hold_days, 3);

    // then tries to leak a number twice
    for _ in 0..2 {
        let v = guard.analyze_message("call me at 9876543210", seller, false);
        assert_eq!(v.action, VerdictAction::Block);
        assert!(v.is_blocked());
    }
    assert_eq!(guard.risk_score(seller), 50);

    let summary = guard.admin_summary(seller, "Vikram S.");
    assert_eq!(summary.risk_level, RiskLevel::Restricted);
    assert_eq!(summary.suggested_action, SuggestedAction::RestrictFeatures);
    assert_eq!(summary.total_violations, 3);

    let d = guard.decide_escrow(&sale(seller, 1000.0, 4.8));
    assert_eq!(d.action, EscrowAction::ManualAdminReview);
    assert_eq!(d.hold_days, 7);

    // after payment the same content is fine and costs nothing
    let v = guard.analyze_message("call me at 9876543210", seller, true);
    assert_eq!(v.action, VerdictAction::Allow);
    assert_eq!(guard.risk_score(seller), 50);

    // admin clears the seller
    guard.reset_user_risk(seller);
    assert_eq!(guard.risk_score(seller), 0);
    assert!(guard.violations(seller).is_empty());
    let d = guard.decide_escrow(&sale(seller, 1000.0, 4.8));
    assert_eq!(d.action, EscrowAction::InstantRelease);
}

#[test]
fn listing_description_scan() {
    let guard = make_guard();
    let v = guard.analyze_ticket_description(
        "2 tickets, block C. Pay via upi to rahul@okaxis for a quick deal",
        "lister-7",
    );
    assert_eq!(v.action, VerdictAction::Block);
    assert_eq!(guard.violations("lister-7").len(), 1);

    let v = guard.analyze_ticket_description("2 tickets, block C, great view of the stage", "lister-8");
    assert_eq!(v.action, VerdictAction::Allow);
    assert!(guard.violations("lister-8").is_empty());
}

#[test]
fn score_never_exceeds_cap() {
    let guard = make_guard();
    for _ in 0..20 {
        guard.analyze_message("no commission, bank transfer only", "greedy", false);
    }
    assert_eq!(guard.risk_score("greedy"), 100);
    assert_eq!(guard.admin_summary("greedy", "G").suggested_action, SuggestedAction::SuspendAccount);
}

#[test]
fn retention_bound_applies_through_the_guard() {
    let cfg = GuardConfig {
        max_violations_per_user: 4,
        ..Default::default()
    };
    let store = Arc::new(MemoryRiskStore::new(cfg.max_violations_per_user));
    let guard = GuardAi::new(store.clone(), &cfg, "TickSwapr");
    for i in 0..6 {
        guard.analyze_message(&format!("text me #{}", i), "chatty", false);
    }
    let kept = guard.violations("chatty");
    assert_eq!(kept.len(), 4);
    assert_eq!(kept[0].message_sample, "text me #2");
    assert_eq!(guard.risk_score("chatty"), 60);
    assert_eq!(store.len(), 1);
}

#[test]
fn concurrent_senders_keep_exact_counts() {
    let guard = make_guard();
    std::thread::scope(|s| {
        for t in 0..4 {
            let guard = guard.clone();
            s.spawn(move || {
                for _ in 0..10 {
                    guard.analyze_message("call me", "shared", false);
                    guard.analyze_message("call me", &format!("solo-{}", t), false);
                }
            });
        }
    });
    assert_eq!(guard.violations("shared").len(), 40);
    for t in 0..4 {
        assert_eq!(guard.violations(&format!("solo-{}", t)).len(), 10);
        assert_eq!(guard.risk_score(&format!("solo-{}", t)), 100);
    }
}
