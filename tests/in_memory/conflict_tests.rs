//! Stale-read detection: placements are re-validated before application.

use super::helpers::{coordinator, dense_order, seed_container, store};
use chrono::Utc;
use rstest::rstest;
use std::sync::Arc;
use trestle::ordering::{
    adapters::memory::InMemorySiblingStore,
    domain::{ContainerId, MemberId, MoveComputation, MovePlan, Position},
    ports::{SiblingStore, SiblingStoreError},
    services::{MoveError, MoveRequest},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn plan_computed_from_a_stale_read_is_rejected_on_application(
    store: Arc<InMemorySiblingStore>,
) {
    let service = coordinator(&store);
    let (container, ids) = seed_container(&store, 4);
    let contested = *ids.get(1).expect("seeded member");

    // Two clients read the container, both see the contested member at
    // rank 1, and both compute a plan from that snapshot.
    let stale_plan = MovePlan::compute(MoveComputation {
        member_id: contested,
        source_container: container,
        target_container: container,
        source_index: Position::new(1),
        target_index: Position::new(3),
        source_len: 4,
        target_len: 4,
        moved_at: Utc::now(),
    })
    .expect("valid plan");

    // The first client's move commits and displaces the contested member.
    service
        .move_member(MoveRequest::new(
            *ids.first().expect("seeded member"),
            container,
            container,
            Position::new(3),
        ))
        .await
        .expect("first move should succeed");

    // The second client's plan no longer matches storage.
    let result = store.apply_move(&stale_plan).await;

    assert!(matches!(
        result,
        Err(SiblingStoreError::PlacementConflict { member_id, .. })
            if member_id == contested
    ));
    dense_order(&store, container).await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refetching_after_a_conflict_allows_the_retry_to_commit(
    store: Arc<InMemorySiblingStore>,
) {
    let service = coordinator(&store);
    let (container, ids) = seed_container(&store, 4);
    let contested = *ids.get(1).expect("seeded member");

    service
        .move_member(MoveRequest::new(
            *ids.first().expect("seeded member"),
            container,
            container,
            Position::new(3),
        ))
        .await
        .expect("first move should succeed");

    // The coordinator re-reads fresh state, so retrying the whole request
    // succeeds instead of conflicting.
    let placement = service
        .move_member(MoveRequest::new(
            contested,
            container,
            container,
            Position::new(3),
        ))
        .await
        .expect("retried move should succeed");

    assert_eq!(placement.position(), Position::new(3));
    dense_order(&store, container).await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn claimed_source_container_must_match_storage(store: Arc<InMemorySiblingStore>) {
    let service = coordinator(&store);
    let (container, ids) = seed_container(&store, 2);
    let (other, _) = seed_container(&store, 2);
    let member = *ids.first().expect("seeded member");

    let result = service
        .move_member(MoveRequest::new(member, other, container, Position::ZERO))
        .await;

    // The request never claims a rank, so the conflict reports only the
    // container the caller actually asserted.
    assert!(matches!(
        result,
        Err(MoveError::Store(SiblingStoreError::ContainerConflict { member_id, claimed, actual }))
            if member_id == member && claimed == other && actual.container_id() == container
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn target_container_shrink_after_planning_is_rejected(store: Arc<InMemorySiblingStore>) {
    let service = coordinator(&store);
    let (source, source_ids) = seed_container(&store, 1);
    let (target, target_ids) = seed_container(&store, 2);
    let moved = *source_ids.first().expect("seeded member");

    // Rank 2 is the append slot of a 2-member target, so the bounds check
    // passes against the snapshot the plan is computed from.
    let stale_plan = MovePlan::compute(MoveComputation {
        member_id: moved,
        source_container: source,
        target_container: target,
        source_index: Position::ZERO,
        target_index: Position::new(2),
        source_len: 1,
        target_len: 2,
        moved_at: Utc::now(),
    })
    .expect("valid plan");

    // The target shrinks before the plan is applied; persisting rank 2
    // into a 1-member container would leave a gap at rank 1.
    service
        .remove_member(*target_ids.get(1).expect("seeded member"))
        .await
        .expect("removal should succeed");

    let result = store.apply_move(&stale_plan).await;

    assert!(matches!(
        result,
        Err(SiblingStoreError::LengthConflict { container_id, planned: 2, actual: 1 })
            if container_id == target
    ));
    dense_order(&store, source).await;
    dense_order(&store, target).await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn source_container_shrink_after_planning_is_rejected(store: Arc<InMemorySiblingStore>) {
    let service = coordinator(&store);
    let (container, ids) = seed_container(&store, 3);
    let moved = *ids.first().expect("seeded member");

    let stale_plan = MovePlan::compute(MoveComputation {
        member_id: moved,
        source_container: container,
        target_container: container,
        source_index: Position::ZERO,
        target_index: Position::new(2),
        source_len: 3,
        target_len: 3,
        moved_at: Utc::now(),
    })
    .expect("valid plan");

    // Removing the top-ranked sibling leaves the moved member's own
    // placement intact, so only the length re-check can catch the shrink.
    service
        .remove_member(*ids.get(2).expect("seeded member"))
        .await
        .expect("removal should succeed");

    let result = store.apply_move(&stale_plan).await;

    assert!(matches!(
        result,
        Err(SiblingStoreError::LengthConflict { container_id, planned: 3, actual: 2 })
            if container_id == container
    ));
    dense_order(&store, container).await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn moving_an_unknown_member_fails_not_found(store: Arc<InMemorySiblingStore>) {
    let service = coordinator(&store);
    let container = ContainerId::new();
    let ghost = MemberId::new();

    let result = service
        .move_member(MoveRequest::new(ghost, container, container, Position::ZERO))
        .await;

    assert!(matches!(
        result,
        Err(MoveError::Store(SiblingStoreError::NotFound(id))) if id == ghost
    ));
}
