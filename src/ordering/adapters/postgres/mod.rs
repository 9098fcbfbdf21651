//! `PostgreSQL` sibling stores backed by Diesel.
//!
//! One store per ordered table: [`PostgresTaskStore`] orders tasks within
//! columns and [`PostgresColumnStore`] orders columns within boards. Both
//! run every move and removal inside a single transaction, lock the moved
//! row and the affected containers' sibling rows with
//! `SELECT ... FOR UPDATE`, and express each sibling shift as one
//! conditional multi-row `UPDATE`.

mod blocking;
mod columns;
mod conversions;
mod schema;
mod tasks;

pub use blocking::PgPool;
pub use columns::PostgresColumnStore;
pub use tasks::PostgresTaskStore;
