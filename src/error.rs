//! Error types for index construction and querying.

use std::fmt;
use std::io;

use crate::collect::ResultSet;

/// Errors that can occur while building or querying a [`RangeIndex`](crate::RangeIndex).
#[derive(Debug)]
pub enum IndexError {
    /// The dataset or configuration cannot produce a lookup table.
    Construction(ConstructionError),

    /// Query bounds are inverted or fall outside the table.
    Range(RangeError),

    /// More matches were reserved than the output buffer can hold.
    ///
    /// The clamped partial result is carried along so callers can decide to
    /// re-run with a larger capacity.
    Overflow(Box<OverflowError>),

    /// Opaque failure of the execution engine. Fatal, never retried here.
    Engine(String),

    /// A dataset record could not be parsed.
    Load { line: usize, message: String },

    /// I/O failure while reading a dataset.
    Io(io::Error),
}

/// Reasons a lookup table cannot be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    /// No entries were supplied.
    EmptyDataset,
    /// Grid width must be at least one cell.
    ZeroWidth,
    /// An entry uses the reserved sentinel as its row id.
    SentinelRowId { position: usize },
    /// The padded key span does not fit in a `u32`-addressable table.
    KeySpanTooLarge { span: u64 },
}

/// Invalid query bounds, expressed in linear table indices.
///
/// Bounds that could not be translated into table space (far outside the key
/// domain) are reported saturated to `i64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeError {
    pub start: i64,
    pub end: i64,
    pub len: usize,
}

/// Output buffer overflow with the partial results that did fit.
#[derive(Debug, Clone)]
pub struct OverflowError {
    /// Total slots reserved by the dispatch (the final counter value).
    pub reserved: usize,
    /// Buffer capacity.
    pub capacity: usize,
    /// Partial results, one set per query tag.
    pub partial: Vec<ResultSet>,
}

impl IndexError {
    /// Partial results of an overflowed query, if this is an overflow.
    pub fn partial_results(&self) -> Option<&[ResultSet]> {
        match self {
            IndexError::Overflow(overflow) => Some(&overflow.partial),
            _ => None,
        }
    }
}

impl From<io::Error> for IndexError {
    fn from(err: io::Error) -> Self {
        IndexError::Io(err)
    }
}

impl From<ConstructionError> for IndexError {
    fn from(err: ConstructionError) -> Self {
        IndexError::Construction(err)
    }
}

impl From<RangeError> for IndexError {
    fn from(err: RangeError) -> Self {
        IndexError::Range(err)
    }
}

impl fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructionError::EmptyDataset => write!(f, "dataset is empty"),
            ConstructionError::ZeroWidth => write!(f, "grid width must be non-zero"),
            ConstructionError::SentinelRowId { position } => {
                write!(f, "entry {} uses the sentinel as its row id", position)
            }
            ConstructionError::KeySpanTooLarge { span } => {
                write!(f, "padded key span {} exceeds u32 table capacity", span)
            }
        }
    }
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "range [{}, {}) is invalid for a table of {} slots",
            self.start, self.end, self.len
        )
    }
}

impl fmt::Display for OverflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} matches reserved but buffer holds {}; {} dropped",
            self.reserved,
            self.capacity,
            self.reserved.saturating_sub(self.capacity)
        )
    }
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::Construction(err) => write!(f, "construction failed: {}", err),
            IndexError::Range(err) => write!(f, "range error: {}", err),
            IndexError::Overflow(err) => write!(f, "output overflow: {}", err),
            IndexError::Engine(msg) => write!(f, "engine failure: {}", msg),
            IndexError::Load { line, message } => {
                write!(f, "failed to parse line {}: {}", line + 1, message)
            }
            IndexError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for IndexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IndexError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl std::error::Error for ConstructionError {}
impl std::error::Error for RangeError {}
impl std::error::Error for OverflowError {}
