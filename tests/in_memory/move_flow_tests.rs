//! Same-container and cross-container move flows through the coordinator.

use super::helpers::{coordinator, dense_order, pick, seed_container, store};
use rstest::rstest;
use std::sync::Arc;
use trestle::ordering::{
    adapters::memory::InMemorySiblingStore,
    domain::Position,
    services::MoveRequest,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn forward_move_displaces_the_passed_over_run(store: Arc<InMemorySiblingStore>) {
    let service = coordinator(&store);
    let (container, ids) = seed_container(&store, 4);
    let moved = *ids.get(1).expect("seeded member");

    let placement = service
        .move_member(MoveRequest::new(moved, container, container, Position::new(3)))
        .await
        .expect("move should succeed");

    assert_eq!(placement.member_id(), moved);
    assert_eq!(placement.container_id(), container);
    assert_eq!(placement.position(), Position::new(3));
    assert_eq!(
        dense_order(&store, container).await,
        pick(&ids, &[0, 2, 3, 1])
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn backward_move_displaces_the_passed_over_run(store: Arc<InMemorySiblingStore>) {
    let service = coordinator(&store);
    let (container, ids) = seed_container(&store, 4);
    let moved = *ids.get(3).expect("seeded member");

    let placement = service
        .move_member(MoveRequest::new(moved, container, container, Position::ZERO))
        .await
        .expect("move should succeed");

    assert_eq!(placement.position(), Position::ZERO);
    assert_eq!(
        dense_order(&store, container).await,
        pick(&ids, &[3, 0, 1, 2])
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cross_container_move_redensifies_source_and_opens_target_slot(
    store: Arc<InMemorySiblingStore>,
) {
    let service = coordinator(&store);
    let (source, source_ids) = seed_container(&store, 3);
    let (target, target_ids) = seed_container(&store, 2);
    let moved = *source_ids.get(1).expect("seeded member");

    let placement = service
        .move_member(MoveRequest::new(moved, source, target, Position::new(1)))
        .await
        .expect("move should succeed");

    assert_eq!(placement.container_id(), target);
    assert_eq!(placement.position(), Position::new(1));

    assert_eq!(dense_order(&store, source).await, pick(&source_ids, &[0, 2]));

    let target_order = dense_order(&store, target).await;
    assert_eq!(
        target_order,
        vec![
            *target_ids.first().expect("seeded member"),
            moved,
            *target_ids.get(1).expect("seeded member"),
        ]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cross_container_move_into_empty_container(store: Arc<InMemorySiblingStore>) {
    let service = coordinator(&store);
    let (source, source_ids) = seed_container(&store, 2);
    let (target, _) = seed_container(&store, 0);
    let moved = *source_ids.first().expect("seeded member");

    let placement = service
        .move_member(MoveRequest::new(moved, source, target, Position::ZERO))
        .await
        .expect("move should succeed");

    assert_eq!(placement.position(), Position::ZERO);
    assert_eq!(dense_order(&store, source).await, pick(&source_ids, &[1]));
    assert_eq!(dense_order(&store, target).await, vec![moved]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn successive_moves_keep_both_containers_dense(store: Arc<InMemorySiblingStore>) {
    let service = coordinator(&store);
    let (left, left_ids) = seed_container(&store, 4);
    let (right, _) = seed_container(&store, 3);

    let ranks = [0, 2, 1, 4];
    for (member, rank) in left_ids.iter().zip(ranks) {
        service
            .move_member(MoveRequest::new(*member, left, right, Position::new(rank)))
            .await
            .expect("move should succeed");
        dense_order(&store, left).await;
        dense_order(&store, right).await;
    }

    assert!(dense_order(&store, left).await.is_empty());
    assert_eq!(dense_order(&store, right).await.len(), 7);
}
