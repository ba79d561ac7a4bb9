use crate::table::{Row, Table, COL_MATCHED_KEYWORDS};

/// Inclusion mask and matched keywords, both aligned to table row order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterResult {
    pub mask: Vec<bool>,
    pub matched_keywords: Vec<String>,
    /// Search terms that were applied, in input order.
    pub terms: Vec<String>,
}

impl FilterResult {
    pub fn search_active(&self) -> bool {
        !self.terms.is_empty()
    }

    /// Table indices of included rows, in table order.
    pub fn indices(&self) -> Vec<usize> {
        self.mask
            .iter()
            .enumerate()
            .filter_map(|(i, included)| included.then_some(i))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.mask.iter().filter(|included| **included).count()
    }

    /// Copy one table row out, with its matched keywords when a search was active.
    pub fn row(&self, table: &Table, index: usize) -> Option<Row> {
        let mut row = table.row(index)?;
        if self.search_active() {
            let keywords = self
                .matched_keywords
                .get(index)
                .cloned()
                .unwrap_or_default();
            row.push_column(COL_MATCHED_KEYWORDS, keywords);
        }
        Some(row)
    }

    /// Copy out the given rows. Indices outside the table are skipped.
    pub fn rows(&self, table: &Table, indices: &[usize]) -> Vec<Row> {
        indices
            .iter()
            .filter_map(|&i| self.row(table, i))
            .collect()
    }
}

/// Split a `;`-delimited search string into trimmed, non-empty terms.
pub fn parse_search_terms(search: &str) -> Vec<String> {
    search
        .split(';')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

/// Compute which rows match `search`, without copying any of them.
///
/// A row matches when any of its fields contains any term as a
/// case-insensitive substring. Rows with an empty abstract are dropped
/// unless `include_empty` is set, whatever the search.
pub fn filter(table: &Table, search: &str, include_empty: bool) -> FilterResult {
    let terms = parse_search_terms(search);
    let needles: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();

    let mut mask = Vec::with_capacity(table.len());
    let mut matched_keywords = Vec::with_capacity(table.len());

    for record in table.records() {
        let passes_empty = include_empty || record.has_abstract();

        if needles.is_empty() {
            mask.push(passes_empty);
            matched_keywords.push(String::new());
            continue;
        }

        let haystack: Vec<String> = record.values().map(|v| v.to_lowercase()).collect();
        let matched: Vec<&str> = terms
            .iter()
            .zip(&needles)
            .filter(|(_, needle)| haystack.iter().any(|field| field.contains(needle.as_str())))
            .map(|(term, _)| term.as_str())
            .collect();

        let included = passes_empty && !matched.is_empty();
        mask.push(included);
        matched_keywords.push(if included {
            matched.join("; ")
        } else {
            String::new()
        });
    }

    FilterResult {
        mask,
        matched_keywords,
        terms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Record, COL_LINK};

    fn record(title: &str, text: &str) -> Record {
        Record {
            id: "0".to_string(),
            track: "Oncology".to_string(),
            title: title.to_string(),
            abstract_text: text.to_string(),
            ..Default::default()
        }
    }

    fn sample_table() -> Table {
        Table::new(
            vec![
                record("Subtypes", "breast cancer subtype"),
                record("Checkpoint", "PD-L1 inhibitor trial"),
                record("Cancer and PD-L1", ""),
                record("Unrelated", "cardiology outcomes"),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn test_parse_search_terms_trims_and_drops_empty() {
        assert_eq!(
            parse_search_terms(" cancer ;; PD-L1;  ;"),
            vec!["cancer".to_string(), "PD-L1".to_string()]
        );
        assert!(parse_search_terms(" ; ").is_empty());
        assert!(parse_search_terms("").is_empty());
    }

    #[test]
    fn test_no_search_excludes_empty_abstracts_only() {
        let table = sample_table();
        let result = filter(&table, "", false);
        assert_eq!(result.mask, vec![true, true, false, true]);
        assert!(result.matched_keywords.iter().all(String::is_empty));
        assert!(!result.search_active());

        let all = filter(&table, "  ;  ", true);
        assert_eq!(all.count(), 4);
    }

    #[test]
    fn test_search_matches_terms_case_insensitively() {
        let table = sample_table();
        let result = filter(&table, "CANCER;pd-l1", false);
        assert_eq!(result.indices(), vec![0, 1]);
        assert_eq!(result.matched_keywords[0], "CANCER");
        assert_eq!(result.matched_keywords[1], "pd-l1");
        assert_eq!(result.matched_keywords[2], "");
        assert_eq!(result.matched_keywords[3], "");
    }

    #[test]
    fn test_keywords_list_every_matching_term_in_term_order() {
        let table = sample_table();
        let result = filter(&table, "PD-L1;cancer;missing", true);
        assert_eq!(result.indices(), vec![0, 1, 2]);
        assert_eq!(result.matched_keywords[2], "PD-L1; cancer");
    }

    #[test]
    fn test_search_covers_every_column() {
        let mut r = record("t", "text");
        r.extra.push((COL_LINK.to_string(), "https://meeting.org/abc".to_string()));
        let table = Table::new(vec![r], Vec::new());
        assert_eq!(filter(&table, "meeting.org", false).count(), 1);
        assert_eq!(filter(&table, "oncology", false).count(), 1);
    }

    #[test]
    fn test_excluding_empty_only_narrows_the_result() {
        let table = sample_table();
        for search in ["", "cancer", "PD-L1;cardio", "zzz", "a"] {
            let narrow = filter(&table, search, false);
            let wide = filter(&table, search, true);
            for (n, w) in narrow.mask.iter().zip(&wide.mask) {
                assert!(!n || *w, "search {search:?}");
            }
        }
    }

    #[test]
    fn test_rows_copy_only_requested_indices_with_keywords() {
        let table = sample_table();
        let result = filter(&table, "cancer", false);
        let rows = result.rows(&table, &result.indices());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(COL_MATCHED_KEYWORDS), Some("cancer"));

        let plain = filter(&table, "", false);
        let rows = plain.rows(&table, &[0]);
        assert_eq!(rows[0].get(COL_MATCHED_KEYWORDS), None);
    }
}
