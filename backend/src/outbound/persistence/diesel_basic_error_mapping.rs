//! Shared Diesel error mapping for the clinic repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Name of the partial unique index guarding active slots.
pub(crate) const ACTIVE_SLOT_INDEX: &str = "appointments_active_slot_key";

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Whether `error` is a unique violation on the active-slot index.
pub(crate) fn is_active_slot_violation(error: &DieselError) -> bool {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => info
            .constraint_name()
            .is_none_or(|name| name == ACTIVE_SLOT_INDEX),
        _ => false,
    }
}

/// Map common Diesel error variants into query/connection constructors.
///
/// `NotFound` and query-builder failures map to query errors; closed
/// connections map to connection errors.
pub(crate) fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, _) => {
            query("row violates a check constraint")
        }
        _ => query("database error"),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Mapped {
        Query(&'static str),
        Connection(String),
    }

    struct Info(Option<&'static str>);

    impl diesel::result::DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            Some("appointments")
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.0
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind, constraint: Option<&'static str>) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(Info(constraint)))
    }

    #[rstest]
    #[case(Some(ACTIVE_SLOT_INDEX), true)]
    #[case(None, true)]
    #[case(Some("appointments_pkey"), false)]
    fn detects_active_slot_violations(
        #[case] constraint: Option<&'static str>,
        #[case] expected: bool,
    ) {
        let error = database_error(DatabaseErrorKind::UniqueViolation, constraint);
        assert_eq!(is_active_slot_violation(&error), expected);
    }

    #[rstest]
    fn check_violations_are_not_slot_violations() {
        let error = database_error(DatabaseErrorKind::CheckViolation, None);
        assert!(!is_active_slot_violation(&error));
    }

    #[rstest]
    #[case(DieselError::NotFound, Mapped::Query("record not found"))]
    #[case(
        database_error(DatabaseErrorKind::ClosedConnection, None),
        Mapped::Connection("database connection error".to_owned())
    )]
    #[case(
        database_error(DatabaseErrorKind::CheckViolation, None),
        Mapped::Query("row violates a check constraint")
    )]
    fn maps_diesel_errors(#[case] error: DieselError, #[case] expected: Mapped) {
        let mapped = map_basic_diesel_error(error, Mapped::Query, |message| {
            Mapped::Connection(message.to_owned())
        });
        assert_eq!(mapped, expected);
    }

    #[rstest]
    fn pool_errors_keep_their_message() {
        let mapped = map_basic_pool_error(PoolError::checkout("timed out"), Mapped::Connection);
        assert_eq!(mapped, Mapped::Connection("timed out".to_owned()));
    }
}
