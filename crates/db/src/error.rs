use meeple_core::error::CoreError;
use thiserror::Error;

/// How a rejected query failed, preserved so callers can decide whether a
/// retry makes sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryFailureKind {
    /// The warehouse could not parse or plan the statement.
    Malformed,
    /// The credential lacks access to the queried objects.
    PermissionDenied,
    /// Resource or rate limits were hit.
    QuotaExceeded,
    /// A backend fault worth retrying.
    Transient,
}

impl QueryFailureKind {
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            QueryFailureKind::Transient | QueryFailureKind::QuotaExceeded
        )
    }
}

/// Errors surfaced by the warehouse layer.
///
/// A detail lookup on an unknown identifier is not an error: accessors
/// return `Ok(None)` for that. A failed query yields no rows, never
/// truncated rows.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// A filter failed validation before any query was composed.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// The warehouse handle could not be established or reused.
    #[error("Warehouse connection failed: {source}")]
    Connection {
        #[source]
        source: sqlx::Error,
    },

    /// The warehouse rejected or failed a finalized query. `mode` names the
    /// operation (search, detail, ...) for diagnostics.
    #[error("Query failed during {mode} ({kind:?}): {source}")]
    Query {
        kind: QueryFailureKind,
        mode: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

/// Convenience alias for warehouse-layer results.
pub type WarehouseResult<T> = Result<T, WarehouseError>;

/// Classify a sqlx error raised while executing a query for `mode`.
///
/// Pool and transport failures map to [`WarehouseError::Connection`];
/// database-reported errors are classified by SQLSTATE class. The layer
/// never retries; retry policy lives with the caller.
pub(crate) fn classify(err: sqlx::Error, mode: &'static str) -> WarehouseError {
    let is_connection = matches!(
        err,
        sqlx::Error::Configuration(_)
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
    );
    if is_connection {
        return WarehouseError::Connection { source: err };
    }

    let kind = match &err {
        sqlx::Error::Database(db_err) => classify_sqlstate(db_err.code().as_deref()),
        _ => QueryFailureKind::Transient,
    };
    WarehouseError::Query {
        kind,
        mode,
        source: err,
    }
}

/// Map a SQLSTATE code to a failure kind.
///
/// - class 28 (invalid authorization) and 42501 (insufficient privilege)
///   are permission failures;
/// - classes 53/54 (insufficient resources, program limits) are quota;
/// - classes 40/57/08 (transaction rollback, operator intervention,
///   connection exceptions mid-query) are transient;
/// - the remaining 42 class (syntax or access rule) and 22 (data exception)
///   mean the statement itself is bad.
///
/// Unknown codes default to transient: analytical warehouses report
/// vendor-specific backend faults that are usually worth one retry.
pub(crate) fn classify_sqlstate(code: Option<&str>) -> QueryFailureKind {
    let Some(code) = code else {
        return QueryFailureKind::Transient;
    };
    if code == "42501" {
        return QueryFailureKind::PermissionDenied;
    }
    match code.get(..2) {
        Some("28") => QueryFailureKind::PermissionDenied,
        Some("53") | Some("54") => QueryFailureKind::QuotaExceeded,
        Some("40") | Some("57") | Some("08") => QueryFailureKind::Transient,
        Some("42") | Some("22") => QueryFailureKind::Malformed,
        _ => QueryFailureKind::Transient,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn privilege_codes_are_permission_failures() {
        assert_eq!(
            classify_sqlstate(Some("42501")),
            QueryFailureKind::PermissionDenied
        );
        assert_eq!(
            classify_sqlstate(Some("28000")),
            QueryFailureKind::PermissionDenied
        );
    }

    #[test]
    fn syntax_codes_are_malformed() {
        assert_eq!(classify_sqlstate(Some("42601")), QueryFailureKind::Malformed);
        assert_eq!(classify_sqlstate(Some("42P01")), QueryFailureKind::Malformed);
        assert_eq!(classify_sqlstate(Some("22P02")), QueryFailureKind::Malformed);
    }

    #[test]
    fn resource_codes_are_quota() {
        assert_eq!(
            classify_sqlstate(Some("53200")),
            QueryFailureKind::QuotaExceeded
        );
        assert_eq!(
            classify_sqlstate(Some("54000")),
            QueryFailureKind::QuotaExceeded
        );
    }

    #[test]
    fn rollback_and_unknown_codes_are_transient() {
        assert_eq!(classify_sqlstate(Some("40001")), QueryFailureKind::Transient);
        assert_eq!(classify_sqlstate(Some("57014")), QueryFailureKind::Transient);
        assert_eq!(classify_sqlstate(Some("XX000")), QueryFailureKind::Transient);
        assert_eq!(classify_sqlstate(None), QueryFailureKind::Transient);
    }

    #[test]
    fn retryability_follows_kind() {
        assert!(QueryFailureKind::Transient.is_retryable());
        assert!(QueryFailureKind::QuotaExceeded.is_retryable());
        assert!(!QueryFailureKind::Malformed.is_retryable());
        assert!(!QueryFailureKind::PermissionDenied.is_retryable());
    }

    #[test]
    fn pool_failures_classify_as_connection_errors() {
        let err = classify(sqlx::Error::PoolTimedOut, "search");
        assert_matches!(err, WarehouseError::Connection { .. });
    }

    #[test]
    fn non_database_execution_failures_keep_the_mode() {
        let err = classify(sqlx::Error::RowNotFound, "detail");
        match err {
            WarehouseError::Query { kind, mode, .. } => {
                assert_eq!(kind, QueryFailureKind::Transient);
                assert_eq!(mode, "detail");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
