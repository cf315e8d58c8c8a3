//! Reader for newline-delimited, delimiter-separated datasets.
//!
//! The first field of each record is the integer key. A record's row id is
//! its 0-based line number; blank lines are skipped but still use up a row
//! id, so ids always match line positions in the file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::IndexError;
use crate::types::{Entry, RowId};

/// Field separator used by TPC-H style `.tbl` files.
pub const DEFAULT_DELIMITER: char = '|';

/// Parse entries from any buffered reader.
pub fn parse_entries<R: BufRead>(reader: R, delimiter: char) -> Result<Vec<Entry>, IndexError> {
    let mut entries = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row_id = RowId::try_from(line_no).map_err(|_| IndexError::Load {
            line: line_no,
            message: "row id exceeds i32 range".to_string(),
        })?;
        let field = line.split(delimiter).next().unwrap_or("").trim();
        let key = field.parse::<i32>().map_err(|e| IndexError::Load {
            line: line_no,
            message: format!("key {:?}: {}", field, e),
        })?;
        entries.push(Entry::new(key, row_id));
    }
    Ok(entries)
}

/// Load entries from the file at `path`.
pub fn load_entries<P: AsRef<Path>>(path: P, delimiter: char) -> Result<Vec<Entry>, IndexError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let entries = parse_entries(BufReader::new(file), delimiter)?;
    tracing::info!(path = %path.display(), records = entries.len(), "loaded dataset");
    Ok(entries)
}
