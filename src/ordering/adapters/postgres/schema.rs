//! Diesel schema for the ordered board tables.

diesel::table! {
    /// Board columns, ordered by position within their board.
    columns (id) {
        /// Column identifier.
        id -> Uuid,
        /// Board holding the column.
        board_id -> Uuid,
        /// Column display name.
        #[max_length = 255]
        name -> Varchar,
        /// Zero-based rank within the board.
        position -> Int4,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tasks, ordered by position within their column.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Column holding the task.
        column_id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Task body text.
        description -> Text,
        /// Zero-based rank within the column.
        position -> Int4,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
