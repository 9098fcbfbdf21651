//! `PostgreSQL` sibling store ordering columns within boards.

use super::blocking::{PgPool, get_conn, run_blocking};
use super::conversions::{count_to_len, from_db_rank, next_rank, row_to_member, to_db_rank};
use super::schema::columns;
use crate::ordering::domain::{
    ContainerId, MemberId, MemberPlacement, MemberRecord, MovePlan, MoveScope, Position,
    ShiftDirection, SiblingShift,
};
use crate::ordering::ports::{SiblingStore, SiblingStoreError, SiblingStoreResult};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;

/// `PostgreSQL`-backed sibling store over the `columns` table, keyed by the
/// owning board.
#[derive(Debug, Clone)]
pub struct PostgresColumnStore {
    pool: PgPool,
}

impl PostgresColumnStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SiblingStore for PostgresColumnStore {
    async fn find_member(&self, id: MemberId) -> SiblingStoreResult<Option<MemberRecord>> {
        let pool = self.pool.clone();
        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            let row = columns::table
                .filter(columns::id.eq(id.into_inner()))
                .select((columns::id, columns::board_id, columns::position))
                .first::<(uuid::Uuid, uuid::Uuid, i32)>(&mut conn)
                .optional()
                .map_err(SiblingStoreError::persistence)?;
            row.map(row_to_member).transpose()
        })
        .await
    }

    async fn list_container(
        &self,
        container: ContainerId,
    ) -> SiblingStoreResult<Vec<MemberRecord>> {
        let pool = self.pool.clone();
        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            let rows = columns::table
                .filter(columns::board_id.eq(container.into_inner()))
                .order(columns::position.asc())
                .select((columns::id, columns::board_id, columns::position))
                .load::<(uuid::Uuid, uuid::Uuid, i32)>(&mut conn)
                .map_err(SiblingStoreError::persistence)?;
            rows.into_iter().map(row_to_member).collect()
        })
        .await
    }

    async fn container_len(&self, container: ContainerId) -> SiblingStoreResult<u32> {
        let pool = self.pool.clone();
        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            let count: i64 = columns::table
                .filter(columns::board_id.eq(container.into_inner()))
                .count()
                .get_result(&mut conn)
                .map_err(SiblingStoreError::persistence)?;
            count_to_len(count)
        })
        .await
    }

    async fn next_position(&self, container: ContainerId) -> SiblingStoreResult<Position> {
        let pool = self.pool.clone();
        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            let max: Option<i32> = columns::table
                .filter(columns::board_id.eq(container.into_inner()))
                .select(diesel::dsl::max(columns::position))
                .first(&mut conn)
                .map_err(SiblingStoreError::persistence)?;
            next_rank(max)
        })
        .await
    }

    async fn apply_move(&self, plan: &MovePlan) -> SiblingStoreResult<MemberPlacement> {
        let pool = self.pool.clone();
        let owned_plan = plan.clone();
        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            conn.transaction::<_, SiblingStoreError, _>(|tx| {
                revalidate_placement(tx, &owned_plan)?;
                revalidate_container_len(tx, owned_plan.source_container(), owned_plan.source_len())?;
                if owned_plan.scope() == MoveScope::CrossContainer {
                    revalidate_container_len(
                        tx,
                        owned_plan.target_container(),
                        owned_plan.target_len(),
                    )?;
                }
                for shift in owned_plan.shifts() {
                    apply_shift(tx, shift)?;
                }
                place_member(tx, &owned_plan)?;
                Ok(owned_plan.placement())
            })
        })
        .await
    }

    async fn apply_removal(&self, id: MemberId) -> SiblingStoreResult<()> {
        let pool = self.pool.clone();
        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            conn.transaction::<_, SiblingStoreError, _>(|tx| {
                let (board, rank) = columns::table
                    .filter(columns::id.eq(id.into_inner()))
                    .select((columns::board_id, columns::position))
                    .for_update()
                    .first::<(uuid::Uuid, i32)>(tx)
                    .optional()
                    .map_err(SiblingStoreError::persistence)?
                    .ok_or(SiblingStoreError::NotFound(id))?;

                diesel::delete(columns::table.filter(columns::id.eq(id.into_inner())))
                    .execute(tx)
                    .map_err(SiblingStoreError::persistence)?;

                // Compact: siblings above the vacated rank slide down.
                diesel::update(
                    columns::table
                        .filter(columns::board_id.eq(board))
                        .filter(columns::position.gt(rank)),
                )
                .set(columns::position.eq(columns::position - 1))
                .execute(tx)
                .map_err(SiblingStoreError::persistence)?;
                Ok(())
            })
        })
        .await
    }
}

/// Re-reads the moved row under a row lock and checks it still matches the
/// placement the plan was computed from.
fn revalidate_placement(conn: &mut PgConnection, plan: &MovePlan) -> SiblingStoreResult<()> {
    let (board, rank) = columns::table
        .filter(columns::id.eq(plan.member_id().into_inner()))
        .select((columns::board_id, columns::position))
        .for_update()
        .first::<(uuid::Uuid, i32)>(conn)
        .optional()
        .map_err(SiblingStoreError::persistence)?
        .ok_or(SiblingStoreError::NotFound(plan.member_id()))?;

    let actual = MemberPlacement::new(
        plan.member_id(),
        ContainerId::from_uuid(board),
        from_db_rank(rank)?,
    );
    let claimed = MemberPlacement::new(
        plan.member_id(),
        plan.source_container(),
        plan.expected_source_position(),
    );
    if actual != claimed {
        return Err(SiblingStoreError::PlacementConflict {
            member_id: plan.member_id(),
            claimed,
            actual,
        });
    }
    Ok(())
}

/// Locks every row of `container` and checks its membership still matches
/// the length the plan's bounds check ran against.
///
/// The row locks pin the container's membership until the transaction
/// commits, so a concurrent removal cannot invalidate the bounds check
/// between re-validation and the shifts.
fn revalidate_container_len(
    conn: &mut PgConnection,
    container: ContainerId,
    planned: u32,
) -> SiblingStoreResult<()> {
    let locked: Vec<uuid::Uuid> = columns::table
        .filter(columns::board_id.eq(container.into_inner()))
        .select(columns::id)
        .for_update()
        .load(conn)
        .map_err(SiblingStoreError::persistence)?;
    let actual = u32::try_from(locked.len()).map_err(SiblingStoreError::persistence)?;
    if actual != planned {
        return Err(SiblingStoreError::LengthConflict {
            container_id: container,
            planned,
            actual,
        });
    }
    Ok(())
}

/// Applies one sibling shift as a single conditional multi-row update.
fn apply_shift(conn: &mut PgConnection, shift: &SiblingShift) -> SiblingStoreResult<usize> {
    let container = shift.container_id().into_inner();
    let lower = to_db_rank(shift.lower())?;
    let delta: i32 = match shift.direction() {
        ShiftDirection::Increment => 1,
        ShiftDirection::Decrement => -1,
    };

    let updated = match shift.upper() {
        Some(upper_bound) => {
            let upper = to_db_rank(upper_bound)?;
            diesel::update(
                columns::table
                    .filter(columns::board_id.eq(container))
                    .filter(columns::position.ge(lower))
                    .filter(columns::position.le(upper)),
            )
            .set(columns::position.eq(columns::position + delta))
            .execute(conn)
        }
        None => diesel::update(
            columns::table
                .filter(columns::board_id.eq(container))
                .filter(columns::position.ge(lower)),
        )
        .set(columns::position.eq(columns::position + delta))
        .execute(conn),
    };
    updated.map_err(SiblingStoreError::persistence)
}

/// Writes the moved member's new board and rank.
fn place_member(conn: &mut PgConnection, plan: &MovePlan) -> SiblingStoreResult<()> {
    let rank = to_db_rank(plan.target_position())?;
    diesel::update(columns::table.filter(columns::id.eq(plan.member_id().into_inner())))
        .set((
            columns::board_id.eq(plan.target_container().into_inner()),
            columns::position.eq(rank),
            columns::updated_at.eq(plan.moved_at()),
        ))
        .execute(conn)
        .map_err(SiblingStoreError::persistence)?;
    Ok(())
}
