use std::collections::HashMap;

use crate::models::JobRecord;

/// The deduplicated run result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    /// One record per link, in order of each link's first appearance.
    pub records: Vec<JobRecord>,
    /// `(search query, count)` over `records`, largest count first.
    pub summary: Vec<(String, usize)>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Deduplicates records by link and counts them per configured query.
///
/// When two records share a link the later one replaces the earlier one;
/// fields are never merged. The summary lists each query in `queries` that
/// has at least one record, largest count first, ties in configured order.
pub fn aggregate(all_records: &[JobRecord], queries: &[String]) -> ResultSet {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(all_records.len());
    let mut records: Vec<JobRecord> = Vec::with_capacity(all_records.len());

    for record in all_records {
        match index.get(record.link()) {
            Some(&pos) => records[pos] = record.clone(),
            None => {
                index.insert(record.link(), records.len());
                records.push(record.clone());
            }
        }
    }

    let mut summary: Vec<(String, usize)> = queries
        .iter()
        .map(|query| {
            let count = records
                .iter()
                .filter(|r| r.search_query() == query.as_str())
                .count();
            (query.clone(), count)
        })
        .filter(|(_, count)| *count > 0)
        .collect();
    summary.sort_by(|a, b| b.1.cmp(&a.1));

    ResultSet { records, summary }
}
