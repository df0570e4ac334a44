//! Named canonical regex patterns used by the convenience template
//! constructors. A single constants table, not process-wide state.

/// Canonical GUID pattern (`like_guid`).
pub const GUID: &str = "^[0-9a-fA-F]{8}(-[0-9a-fA-F]{4}){3}-[0-9a-fA-F]{12}$";

/// Canonical ISO-8601 date-time pattern (`like_datetime`).
///
/// Accepts an optional fractional-second part and an optional offset
/// (`Z` or `+hh:mm`).
pub const DATE_TIME: &str =
    r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})?$";
