//! Error handling types and utilities.

/// A specialized Result type for symdex operations.
///
/// This is an alias for `anyhow::Result` with context added via `.context()`
/// where errors cross an I/O or parse boundary.
pub type Result<T> = anyhow::Result<T>;

/// Contract violations found while building a search index.
///
/// The query core itself never fails; a malformed raw index is rejected here,
/// at build time, so that every parent reference and alias target resolves
/// before the first query runs.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IndexError {
    /// A row or path-table entry used a kind ordinal outside the enumeration.
    #[error("unknown kind ordinal {ordinal} in unit '{unit}'")]
    UnknownKind { unit: String, ordinal: u8 },
    /// A row's parent reference points past the unit's path table.
    #[error("parent index {index} in unit '{unit}' does not resolve (path table has {table_len} entries)")]
    UnresolvedParent {
        unit: String,
        index: usize,
        table_len: usize,
    },
    /// An alias target points past the unit's row list.
    #[error("alias '{alias}' in unit '{unit}' points at row {index}, but the unit has {rows} rows")]
    UnresolvedAlias {
        unit: String,
        alias: String,
        index: usize,
        rows: usize,
    },
}
