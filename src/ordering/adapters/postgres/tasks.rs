//! `PostgreSQL` sibling store ordering tasks within board columns.

use super::blocking::{PgPool, get_conn, run_blocking};
use super::conversions::{count_to_len, from_db_rank, next_rank, row_to_member, to_db_rank};
use super::schema::tasks;
use crate::ordering::domain::{
    ContainerId, MemberId, MemberPlacement, MemberRecord, MovePlan, MoveScope, Position,
    ShiftDirection, SiblingShift,
};
use crate::ordering::ports::{SiblingStore, SiblingStoreError, SiblingStoreResult};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;

/// `PostgreSQL`-backed sibling store over the `tasks` table, keyed by the
/// owning column.
#[derive(Debug, Clone)]
pub struct PostgresTaskStore {
    pool: PgPool,
}

impl PostgresTaskStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SiblingStore for PostgresTaskStore {
    async fn find_member(&self, id: MemberId) -> SiblingStoreResult<Option<MemberRecord>> {
        let pool = self.pool.clone();
        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select((tasks::id, tasks::column_id, tasks::position))
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
            let rows = tasks::table
                .filter(tasks::column_id.eq(container.into_inner()))
                .order(tasks::position.asc())
                .select((tasks::id, tasks::column_id, tasks::position))
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
            let count: i64 = tasks::table
                .filter(tasks::column_id.eq(container.into_inner()))
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
            let max: Option<i32> = tasks::table
                .filter(tasks::column_id.eq(container.into_inner()))
                .select(diesel::dsl::max(tasks::position))
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
                let (container, rank) = tasks::table
                    .filter(tasks::id.eq(id.into_inner()))
                    .select((tasks::column_id, tasks::position))
                    .for_update()
                    .first::<(uuid::Uuid, i32)>(tx)
                    .optional()
                    .map_err(SiblingStoreError::persistence)?
                    .ok_or(SiblingStoreError::NotFound(id))?;

                diesel::delete(tasks::table.filter(tasks::id.eq(id.into_inner())))
                    .execute(tx)
                    .map_err(SiblingStoreError::persistence)?;

                // Compact: siblings above the vacated rank slide down.
                diesel::update(
                    tasks::table
                        .filter(tasks::column_id.eq(container))
                        .filter(tasks::position.gt(rank)),
                )
                .set(tasks::position.eq(tasks::position - 1))
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
    let (container, rank) = tasks::table
        .filter(tasks::id.eq(plan.member_id().into_inner()))
        .select((tasks::column_id, tasks::position))
        .for_update()
        .first::<(uuid::Uuid, i32)>(conn)
        .optional()
        .map_err(SiblingStoreError::persistence)?
        .ok_or(SiblingStoreError::NotFound(plan.member_id()))?;

    let actual = MemberPlacement::new(
        plan.member_id(),
        ContainerId::from_uuid(container),
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
    let locked: Vec<uuid::Uuid> = tasks::table
        .filter(tasks::column_id.eq(container.into_inner()))
        .select(tasks::id)
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
                tasks::table
                    .filter(tasks::column_id.eq(container))
                    .filter(tasks::position.ge(lower))
                    .filter(tasks::position.le(upper)),
            )
            .set(tasks::position.eq(tasks::position + delta))
            .execute(conn)
        }
        None => diesel::update(
            tasks::table
                .filter(tasks::column_id.eq(container))
                .filter(tasks::position.ge(lower)),
        )
        .set(tasks::position.eq(tasks::position + delta))
        .execute(conn),
    };
    updated.map_err(SiblingStoreError::persistence)
}

/// Writes the moved member's new container and rank.
fn place_member(conn: &mut PgConnection, plan: &MovePlan) -> SiblingStoreResult<()> {
    let rank = to_db_rank(plan.target_position())?;
    diesel::update(tasks::table.filter(tasks::id.eq(plan.member_id().into_inner())))
        .set((
            tasks::column_id.eq(plan.target_container().into_inner()),
            tasks::position.eq(rank),
            tasks::updated_at.eq(plan.moved_at()),
        ))
        .execute(conn)
        .map_err(SiblingStoreError::persistence)?;
    Ok(())
}
