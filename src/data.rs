use crate::error::RosterResult;
use sqlx::SqliteConnection;

pub mod student;

/// A record kind held in the store. Each operation is a single statement, so callers never
/// observe a half-applied change.
pub trait DataType: Sized {
    type Id;
    type FormForAdding;
    type FormForUpdating;

    async fn get_all(conn: &mut SqliteConnection) -> RosterResult<Vec<Self>>;
    async fn insert_into_database(
        to_be_added: Self::FormForAdding,
        conn: &mut SqliteConnection,
    ) -> RosterResult<Self>;
    async fn update_in_database(
        id: Self::Id,
        replacement: Self::FormForUpdating,
        conn: &mut SqliteConnection,
    ) -> RosterResult<()>;
    async fn remove_from_database(id: Self::Id, conn: &mut SqliteConnection) -> RosterResult<()>;
}
