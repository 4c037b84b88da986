//! Well-known service error codes.
//!
//! Machine codes carried by the error envelope of non-2xx responses. The
//! strings are part of the wire contract; the retry layer matches on them
//! and callers may too.

/// Another operation is mutating the same row.
pub const ROW_OPERATION_CONFLICT: &str = "OTSRowOperationConflict";

/// The table's reserved capacity is insufficient for the request.
pub const NOT_ENOUGH_CAPACITY_UNIT: &str = "OTSNotEnoughCapacityUnit";

/// The table exists but is not yet ready to serve.
pub const TABLE_NOT_READY: &str = "OTSTableNotReady";

/// The partition serving the row range is temporarily unavailable.
pub const PARTITION_UNAVAILABLE: &str = "OTSPartitionUnavailable";

/// The server is overloaded.
pub const SERVER_BUSY: &str = "OTSServerBusy";

/// The operation was throttled by the server.
pub const OPERATION_THROTTLED: &str = "OTSOperationThrottled";

/// A quota was exhausted; retryable only with [`QUOTA_EXHAUSTED_TOO_FREQUENT`].
pub const QUOTA_EXHAUSTED: &str = "OTSQuotaExhausted";

/// The exact message that marks a quota-exhausted error as a transient
/// table-operation-frequency limit.
pub const QUOTA_EXHAUSTED_TOO_FREQUENT: &str = "Too frequent table operations.";

/// The request timed out inside the service.
pub const TIMEOUT: &str = "OTSTimeout";

/// The service hit an internal error.
pub const INTERNAL_SERVER_ERROR: &str = "OTSInternalServerError";

/// The service is unavailable.
pub const SERVER_UNAVAILABLE: &str = "OTSServerUnavailable";

/// The request signature did not verify on the service side.
pub const AUTH_FAILED: &str = "OTSAuthFailed";

/// The service rejected a request parameter.
pub const INVALID_PARAMETER: &str = "OTSParameterInvalid";

/// The named table does not exist.
pub const OBJECT_NOT_EXIST: &str = "OTSObjectNotExist";

/// A write precondition ([`crate::pb::RowExistenceExpectation`]) failed.
pub const CONDITION_CHECK_FAIL: &str = "OTSConditionCheckFail";
