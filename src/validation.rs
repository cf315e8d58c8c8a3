//! Brute-force correctness oracle for range queries.
//!
//! Recomputes a query by scanning the raw entries in the untranslated key
//! domain and diffs the result against what the index returned. Meant for
//! tests and diagnostics; never on the query path.

use std::ops::Range;

use crate::collect::ResultSet;
use crate::types::{Entry, RowId};

/// Outcome of checking one query result against a direct scan.
#[derive(Debug, Clone)]
pub struct VerificationReport {
    /// Key range that was checked.
    pub keys: Range<i64>,
    /// Rows the scan says should match.
    pub expected: ResultSet,
    /// Expected rows missing from the candidate, sorted.
    pub false_negatives: Vec<RowId>,
    /// Candidate rows that should not be there, sorted.
    pub false_positives: Vec<RowId>,
}

impl VerificationReport {
    /// True if the candidate equals the expected set.
    pub fn is_ok(&self) -> bool {
        self.false_negatives.is_empty() && self.false_positives.is_empty()
    }

    /// Format a summary of any mismatches found.
    pub fn summary(&self) -> String {
        if self.is_ok() {
            return format!("OK ({} rows)", self.expected.len());
        }

        const SHOW: usize = 8;
        let list = |rows: &[RowId]| {
            let shown: Vec<String> = rows.iter().take(SHOW).map(|r| r.to_string()).collect();
            if rows.len() > SHOW {
                format!("[{}, ...]", shown.join(", "))
            } else {
                format!("[{}]", shown.join(", "))
            }
        };

        let mut issues = Vec::new();
        if !self.false_negatives.is_empty() {
            issues.push(format!(
                "{} missing {}",
                self.false_negatives.len(),
                list(&self.false_negatives)
            ));
        }
        if !self.false_positives.is_empty() {
            issues.push(format!(
                "{} unexpected {}",
                self.false_positives.len(),
                list(&self.false_positives)
            ));
        }
        format!("expected {} rows: {}", self.expected.len(), issues.join(", "))
    }
}

impl std::fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "VerificationReport {{ keys=[{}, {}), {} }}",
            self.keys.start,
            self.keys.end,
            self.summary()
        )
    }
}

/// Rows whose key lies in `keys`, by linear scan.
pub fn expected_rows(entries: &[Entry], keys: Range<i64>) -> ResultSet {
    entries
        .iter()
        .filter(|e| keys.contains(&(e.key as i64)))
        .map(|e| e.row_id)
        .collect()
}

/// Check `candidate` against a brute-force scan of `entries` over `keys`.
///
/// Duplicate keys make the scan report every row with that key, while the
/// table keeps only the last one; such datasets verify as false negatives.
pub fn check(entries: &[Entry], keys: Range<i64>, candidate: &ResultSet) -> VerificationReport {
    let expected = expected_rows(entries, keys.clone());

    let mut false_negatives: Vec<RowId> = expected.difference(candidate).collect();
    let mut false_positives: Vec<RowId> = candidate.difference(&expected).collect();
    false_negatives.sort_unstable();
    false_positives.sort_unstable();

    VerificationReport {
        keys,
        expected,
        false_negatives,
        false_positives,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::entries_from_keys;

    #[test]
    fn test_exact_match_is_ok() {
        let entries = entries_from_keys([10, 12, 15]);
        let candidate: ResultSet = [1, 2].into_iter().collect();
        let report = check(&entries, 12..16, &candidate);
        assert!(report.is_ok(), "{}", report);
        assert_eq!(report.expected.to_sorted_vec(), vec![1, 2]);
        assert_eq!(report.summary(), "OK (2 rows)");
    }

    #[test]
    fn test_reports_both_directions() {
        let entries = entries_from_keys([1, 2, 3, 4]);
        let candidate: ResultSet = [1, 3].into_iter().collect();
        let report = check(&entries, 1..3, &candidate);
        assert!(!report.is_ok());
        assert_eq!(report.false_negatives, vec![0]);
        assert_eq!(report.false_positives, vec![3]);
        let text = report.to_string();
        assert!(text.contains("1 missing [0]"), "{}", text);
        assert!(text.contains("1 unexpected [3]"), "{}", text);
    }

    #[test]
    fn test_end_is_exclusive() {
        let entries = entries_from_keys([5, 6]);
        assert_eq!(expected_rows(&entries, 5..6).to_sorted_vec(), vec![0]);
        assert!(expected_rows(&entries, 6..6).is_empty());
    }

    #[test]
    fn test_summary_truncates_long_lists() {
        let entries = entries_from_keys(0..20);
        let report = check(&entries, 0..20, &ResultSet::new());
        assert_eq!(report.false_negatives.len(), 20);
        assert!(report.summary().contains("..."));
    }
}
