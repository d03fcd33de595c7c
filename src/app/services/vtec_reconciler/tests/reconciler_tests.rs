//! Tests for the VTEC reconciliation state machine

use super::*;
use crate::app::services::vtec_reconciler::reconciler::{VtecReconciler, apply_action, build_event};
use crate::app::services::vtec_reconciler::repository::{EventRepository, MemoryRepository};
use crate::app::models::vtec::VtecAction;
use std::sync::Arc;

fn reconciler<R: EventRepository>(repo: Arc<R>) -> VtecReconciler<R> {
    VtecReconciler::new(repo, Duration::from_secs(5))
}

#[tokio::test]
async fn test_new_code_creates_event() {
    let repo = Arc::new(MemoryRepository::new());
    let product = single_code_product(
        VtecAction::New,
        base_issued(),
        Some(base_expires()),
        base_expires(),
    );

    reconciler(Arc::clone(&repo)).handle_product(&product).await;

    assert_eq!(repo.event_count().await, 1);
    let key = make_code(VtecAction::New, None, None).key();
    let event = repo.get_event_by_key(&key).await.unwrap().unwrap();
    assert_eq!(event.starts, base_issued());
    assert_eq!(event.ends, base_expires());
    assert_eq!(event.end_initial, base_expires());
    assert_eq!(event.expires, base_expires());
    assert_eq!(event.title, "Tornado Warning");
}

#[tokio::test]
async fn test_event_readable_by_assigned_id() {
    let repo = Arc::new(MemoryRepository::new());
    let product = single_code_product(
        VtecAction::New,
        base_issued(),
        Some(base_expires()),
        base_expires(),
    );
    reconciler(Arc::clone(&repo)).handle_product(&product).await;

    let key = make_code(VtecAction::New, None, None).key();
    let event = repo.get_event_by_key(&key).await.unwrap().unwrap();
    let id = event.id.unwrap();

    // The downstream read path returns the same event
    let by_id = repo.get_event_by_id(id).await.unwrap().unwrap();
    assert_eq!(by_id.key, key);
    assert_eq!(by_id.ends, event.ends);

    assert!(repo.get_event_by_id(9999).await.unwrap().is_none());
}

#[tokio::test]
async fn test_absent_window_defaults_applied_at_creation() {
    let repo = Arc::new(MemoryRepository::new());
    let code = make_code(VtecAction::New, None, None);
    let product = make_product(
        base_issued(),
        vec![make_segment(base_expires(), vec![code])],
    );

    reconciler(Arc::clone(&repo)).handle_product(&product).await;

    let key = make_code(VtecAction::New, None, None).key();
    let event = repo.get_event_by_key(&key).await.unwrap().unwrap();
    // Start defaults to the issuance, end to the segment expiry
    assert_eq!(event.starts, base_issued());
    assert_eq!(event.ends, base_expires());
}

#[tokio::test]
async fn test_new_then_con_extends_monotonically() {
    let repo = Arc::new(MemoryRepository::new());
    let engine = reconciler(Arc::clone(&repo));
    let key = make_code(VtecAction::New, None, None).key();

    // NEW, then CON ten minutes later extending the end by fifteen
    let first = single_code_product(
        VtecAction::New,
        base_issued(),
        Some(base_expires()),
        base_expires(),
    );
    engine.handle_product(&first).await;

    let later_end = base_expires() + minutes(15);
    let second = single_code_product(
        VtecAction::Continues,
        base_issued() + minutes(10),
        Some(later_end),
        later_end,
    );
    engine.handle_product(&second).await;

    assert_eq!(repo.event_count().await, 1, "exactly one stored event");
    let event = repo.get_event_by_key(&key).await.unwrap().unwrap();
    assert_eq!(event.ends, later_end);
    assert_eq!(event.expires, later_end);
    // The initial end never moves
    assert_eq!(event.end_initial, base_expires());
}

#[tokio::test]
async fn test_con_never_regresses_times() {
    let repo = Arc::new(MemoryRepository::new());
    let engine = reconciler(Arc::clone(&repo));
    let key = make_code(VtecAction::New, None, None).key();

    let first = single_code_product(
        VtecAction::New,
        base_issued(),
        Some(base_expires() + minutes(30)),
        base_expires() + minutes(30),
    );
    engine.handle_product(&first).await;

    // An out-of-order CON carrying an earlier end must not move anything back
    let stale = single_code_product(
        VtecAction::Continues,
        base_issued() + minutes(5),
        Some(base_expires()),
        base_expires(),
    );
    engine.handle_product(&stale).await;

    let event = repo.get_event_by_key(&key).await.unwrap().unwrap();
    assert_eq!(event.ends, base_expires() + minutes(30));
    assert_eq!(event.expires, base_expires() + minutes(30));
}

#[tokio::test]
async fn test_cancel_closes_at_closing_issuance() {
    let repo = Arc::new(MemoryRepository::new());
    let engine = reconciler(Arc::clone(&repo));
    let key = make_code(VtecAction::New, None, None).key();

    let first = single_code_product(
        VtecAction::New,
        base_issued(),
        Some(base_expires()),
        base_expires(),
    );
    engine.handle_product(&first).await;

    let closing_issued = base_issued() + minutes(20);
    let cancel = single_code_product(
        VtecAction::Cancelled,
        closing_issued,
        Some(base_expires()),
        base_expires(),
    );
    engine.handle_product(&cancel).await;

    let event = repo.get_event_by_key(&key).await.unwrap().unwrap();
    assert_eq!(event.ends, closing_issued);
    assert_eq!(event.expires, base_expires());
}

#[tokio::test]
async fn test_expire_closes_at_code_end() {
    let repo = Arc::new(MemoryRepository::new());
    let engine = reconciler(Arc::clone(&repo));
    let key = make_code(VtecAction::New, None, None).key();

    let first = single_code_product(
        VtecAction::New,
        base_issued(),
        Some(base_expires()),
        base_expires(),
    );
    engine.handle_product(&first).await;

    let exp = single_code_product(
        VtecAction::Expired,
        base_issued() + minutes(47),
        Some(base_expires()),
        base_expires() + minutes(10),
    );
    engine.handle_product(&exp).await;

    let event = repo.get_event_by_key(&key).await.unwrap().unwrap();
    assert_eq!(event.ends, base_expires());
    assert_eq!(event.expires, base_expires());
}

#[tokio::test]
async fn test_expire_without_code_end_uses_segment_expiry() {
    let repo = Arc::new(MemoryRepository::new());
    let engine = reconciler(Arc::clone(&repo));
    let key = make_code(VtecAction::New, None, None).key();

    let first = single_code_product(
        VtecAction::New,
        base_issued(),
        Some(base_expires()),
        base_expires(),
    );
    engine.handle_product(&first).await;

    let segment_expires = base_expires() + minutes(5);
    let code = make_code(VtecAction::Expired, Some(base_issued()), None);
    let exp = make_product(
        base_issued() + minutes(47),
        vec![make_segment(segment_expires, vec![code])],
    );
    engine.handle_product(&exp).await;

    let event = repo.get_event_by_key(&key).await.unwrap().unwrap();
    assert_eq!(event.ends, segment_expires);
    assert_eq!(event.expires, segment_expires);
}

#[tokio::test]
async fn test_ext_keeps_segment_expiry_authoritative() {
    let repo = Arc::new(MemoryRepository::new());
    let engine = reconciler(Arc::clone(&repo));
    let key = make_code(VtecAction::New, None, None).key();

    let first = single_code_product(
        VtecAction::New,
        base_issued(),
        Some(base_expires()),
        base_expires(),
    );
    engine.handle_product(&first).await;

    // EXT whose code end runs past the segment expiry: ends follows the
    // code, expires stays pinned to the segment
    let far_end = base_expires() + minutes(120);
    let segment_expires = base_expires() + minutes(30);
    let ext = single_code_product(
        VtecAction::ExtendedTime,
        base_issued() + minutes(10),
        Some(far_end),
        segment_expires,
    );
    engine.handle_product(&ext).await;

    let event = repo.get_event_by_key(&key).await.unwrap().unwrap();
    assert_eq!(event.ends, far_end);
    assert_eq!(event.expires, segment_expires);
}

#[tokio::test]
async fn test_test_class_never_creates_an_event() {
    let repo = Arc::new(MemoryRepository::new());
    let engine = reconciler(Arc::clone(&repo));

    let mut code = make_code(VtecAction::New, Some(base_issued()), Some(base_expires()));
    code.class = crate::app::models::vtec::VtecClass::Test;
    let product = make_product(
        base_issued(),
        vec![make_segment(base_expires(), vec![code])],
    );
    engine.handle_product(&product).await;

    assert_eq!(repo.event_count().await, 0);
}

#[tokio::test]
async fn test_routine_action_ignored() {
    let repo = Arc::new(MemoryRepository::new());
    let engine = reconciler(Arc::clone(&repo));

    let product = single_code_product(
        VtecAction::Routine,
        base_issued(),
        Some(base_expires()),
        base_expires(),
    );
    engine.handle_product(&product).await;

    assert_eq!(repo.event_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_update_timeout_leaves_event_unchanged() {
    let repo = Arc::new(StallingRepository::default());
    let engine = VtecReconciler::new(Arc::clone(&repo), Duration::from_millis(100));
    let key = make_code(VtecAction::New, None, None).key();

    let first = single_code_product(
        VtecAction::New,
        base_issued(),
        Some(base_expires()),
        base_expires(),
    );
    engine.handle_product(&first).await;
    let before = repo.inner.get_event_by_key(&key).await.unwrap().unwrap();

    // The CON's time update stalls past the deadline and is abandoned
    repo.arm();
    let con = single_code_product(
        VtecAction::Continues,
        base_issued() + minutes(10),
        Some(base_expires() + minutes(15)),
        base_expires() + minutes(15),
    );
    engine.handle_product(&con).await;

    let after = repo.inner.get_event_by_key(&key).await.unwrap().unwrap();
    assert_eq!(after.ends, before.ends, "no partial write on timeout");
    assert_eq!(after.expires, before.expires);
    assert_eq!(repo.inner.event_count().await, 1);
}

#[tokio::test]
async fn test_duplicate_create_falls_back_to_update() {
    let repo = Arc::new(RacingRepository::default());
    let engine = VtecReconciler::new(Arc::clone(&repo), Duration::from_secs(5));
    let key = make_code(VtecAction::New, None, None).key();

    // The row already exists...
    let first = single_code_product(
        VtecAction::New,
        base_issued(),
        Some(base_expires()),
        base_expires(),
    );
    engine.handle_product(&first).await;

    // ...but the next bulletin's lookup misses, as if it lost the race.
    // Its create is rejected and the update path runs instead.
    repo.arm();
    let later_end = base_expires() + minutes(15);
    let con = single_code_product(
        VtecAction::Continues,
        base_issued() + minutes(10),
        Some(later_end),
        later_end,
    );
    engine.handle_product(&con).await;

    assert_eq!(repo.inner.event_count().await, 1, "no second row created");
    let event = repo.inner.get_event_by_key(&key).await.unwrap().unwrap();
    assert_eq!(event.ends, later_end);
}

#[test]
fn test_apply_action_table_is_pure() {
    let code = make_code(VtecAction::New, Some(base_issued()), Some(base_expires()));
    let segment = make_segment(base_expires(), vec![code.clone()]);
    let product = make_product(base_issued(), vec![segment.clone()]);

    let mut event = build_event(&code, &product, &segment);
    let original_ends = event.ends;

    // Monotonic branch: an earlier end changes nothing
    let mut stale = code.clone();
    stale.action = VtecAction::Continues;
    stale.end = Some(base_expires() - minutes(10));
    apply_action(&mut event, &stale, &product, &segment);
    assert_eq!(event.ends, original_ends);

    // Terminal branch: CAN pins the end to the closing issuance
    let mut cancel = code;
    cancel.action = VtecAction::Cancelled;
    apply_action(&mut event, &cancel, &product, &segment);
    assert_eq!(event.ends, product.issued);
}
