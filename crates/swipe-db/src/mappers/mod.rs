//! Model -> entity mappers
//!
//! Rows are re-validated on the way out, so a hand-edited row that breaks a
//! domain rule surfaces as a database error instead of a bogus entity.

mod room;
mod room_match;
mod swipe;

pub use room::room_with_members;

use swipe_core::DomainError;

fn corrupt_row(table: &str, err: DomainError) -> DomainError {
    DomainError::DatabaseError(format!("corrupt {table} row: {err}"))
}
