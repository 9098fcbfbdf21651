//! Appends, removals, and read stability.

use super::helpers::{coordinator, dense_order, pick, seed_container, store};
use rstest::rstest;
use std::sync::Arc;
use trestle::ordering::{
    adapters::memory::InMemorySiblingStore,
    domain::{ContainerId, MemberId, MemberRecord, Position},
    ports::{SiblingStore, SiblingStoreError},
    services::{MoveError, MoveRequest},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn append_position_is_zero_for_an_empty_container(store: Arc<InMemorySiblingStore>) {
    let service = coordinator(&store);
    let container = ContainerId::new();

    let position = service
        .next_append_position(container)
        .await
        .expect("append position");

    assert_eq!(position, Position::ZERO);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn append_position_is_one_past_the_current_maximum(store: Arc<InMemorySiblingStore>) {
    let service = coordinator(&store);
    let (container, _) = seed_container(&store, 5);

    let position = service
        .next_append_position(container)
        .await
        .expect("append position");

    assert_eq!(position, Position::new(5));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn appended_members_extend_the_dense_sequence(store: Arc<InMemorySiblingStore>) {
    let service = coordinator(&store);
    let (container, mut ids) = seed_container(&store, 2);

    for _ in 0..3 {
        let position = service
            .next_append_position(container)
            .await
            .expect("append position");
        let id = MemberId::new();
        store
            .insert(MemberRecord::new(id, container, position))
            .expect("insert appended member");
        ids.push(id);
    }

    assert_eq!(dense_order(&store, container).await, ids);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn removal_compacts_the_vacated_rank(store: Arc<InMemorySiblingStore>) {
    let service = coordinator(&store);
    let (container, ids) = seed_container(&store, 4);

    service
        .remove_member(*ids.get(1).expect("seeded member"))
        .await
        .expect("removal should succeed");

    assert_eq!(
        dense_order(&store, container).await,
        pick(&ids, &[0, 2, 3])
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn removing_the_last_member_empties_the_container(store: Arc<InMemorySiblingStore>) {
    let service = coordinator(&store);
    let (container, ids) = seed_container(&store, 1);

    service
        .remove_member(*ids.first().expect("seeded member"))
        .await
        .expect("removal should succeed");

    assert!(dense_order(&store, container).await.is_empty());
    assert_eq!(
        service
            .next_append_position(container)
            .await
            .expect("append position"),
        Position::ZERO
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn removing_an_unknown_member_fails_not_found(store: Arc<InMemorySiblingStore>) {
    let service = coordinator(&store);
    let ghost = MemberId::new();

    let result = service.remove_member(ghost).await;

    assert!(matches!(
        result,
        Err(MoveError::Store(SiblingStoreError::NotFound(id))) if id == ghost
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reading_a_container_twice_yields_identical_results(store: Arc<InMemorySiblingStore>) {
    let (container, _) = seed_container(&store, 4);

    let first = store.list_container(container).await.expect("first read");
    let second = store.list_container(container).await.expect("second read");

    assert_eq!(first, second);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn noop_move_round_trips_every_position(store: Arc<InMemorySiblingStore>) {
    let service = coordinator(&store);
    let (container, ids) = seed_container(&store, 3);
    let before = store.list_container(container).await.expect("read before");

    service
        .move_member(MoveRequest::new(
            *ids.get(1).expect("seeded member"),
            container,
            container,
            Position::new(1),
        ))
        .await
        .expect("noop move should succeed");

    let after = store.list_container(container).await.expect("read after");
    assert_eq!(before, after);
}
