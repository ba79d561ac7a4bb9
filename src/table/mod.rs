//! In-memory abstract table: immutable records plus row views that carry
//! derived columns (matched keywords, LLM answers).

pub mod loader;

use serde::ser::{Serialize, SerializeMap, Serializer};

pub const COL_ID: &str = "Abstract #";
pub const COL_TRACK: &str = "Track";
pub const COL_AUTHOR: &str = "First Author";
pub const COL_TITLE: &str = "Abstract title";
pub const COL_ABSTRACT: &str = "Abstract";
pub const COL_LINK: &str = "Link";
pub const COL_MATCHED_KEYWORDS: &str = "Matched Keywords";

/// Prefix shared by every annotation answer column.
pub const ANSWER_PREFIX: &str = "Answer:";

/// Column order used for display and export.
pub const BASE_COLUMNS: [&str; 5] = [COL_ID, COL_TRACK, COL_AUTHOR, COL_TITLE, COL_ABSTRACT];

/// One conference abstract as loaded from the spreadsheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// Original row position, stable for the lifetime of the table.
    pub index: usize,
    pub id: String,
    pub track: String,
    pub author: String,
    pub title: String,
    pub abstract_text: String,
    /// Remaining spreadsheet columns, in header order.
    pub extra: Vec<(String, String)>,
}

impl Record {
    pub fn has_abstract(&self) -> bool {
        !self.abstract_text.is_empty()
    }

    /// Value of a spreadsheet column, if this record has it.
    pub fn get(&self, column: &str) -> Option<&str> {
        match column {
            COL_ID => Some(&self.id),
            COL_TRACK => Some(&self.track),
            COL_AUTHOR => Some(&self.author),
            COL_TITLE => Some(&self.title),
            COL_ABSTRACT => Some(&self.abstract_text),
            _ => self
                .extra
                .iter()
                .find(|(name, _)| name == column)
                .map(|(_, value)| value.as_str()),
        }
    }

    /// Every field value, fixed fields first.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        [
            self.id.as_str(),
            self.track.as_str(),
            self.author.as_str(),
            self.title.as_str(),
            self.abstract_text.as_str(),
        ]
        .into_iter()
        .chain(self.extra.iter().map(|(_, value)| value.as_str()))
    }
}

/// A record copy plus derived columns appended in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub record: Record,
    derived: Vec<(String, String)>,
}

impl Row {
    pub fn new(record: Record) -> Self {
        Self {
            record,
            derived: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.record.index
    }

    /// Append a derived column. A column that already exists is overwritten in place.
    pub fn push_column(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.derived.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.derived.push((name, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.derived
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
            .or_else(|| self.record.get(column))
    }

    pub fn derived_columns(&self) -> impl Iterator<Item = &str> {
        self.derived.iter().map(|(name, _)| name.as_str())
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let r = &self.record;
        let mut map = serializer.serialize_map(Some(5 + r.extra.len() + self.derived.len()))?;
        map.serialize_entry(COL_ID, &r.id)?;
        map.serialize_entry(COL_TRACK, &r.track)?;
        map.serialize_entry(COL_AUTHOR, &r.author)?;
        map.serialize_entry(COL_TITLE, &r.title)?;
        map.serialize_entry(COL_ABSTRACT, &r.abstract_text)?;
        for (name, value) in r.extra.iter().chain(self.derived.iter()) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// An ordered set of rows with an explicit column list: a filtered
/// selection, or an annotation result.
#[derive(Debug, Clone, Default)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl TableView {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Append a derived column, with its value computed per row.
    pub fn push_column<F>(&mut self, name: &str, mut value: F)
    where
        F: FnMut(&Row) -> String,
    {
        for row in &mut self.rows {
            let v = value(row);
            row.push_column(name, v);
        }
        if !self.has_column(name) {
            self.columns.push(name.to_string());
        }
    }
}

/// The loaded spreadsheet. Never mutated after load.
#[derive(Debug, Clone, Default)]
pub struct Table {
    records: Vec<Record>,
    columns: Vec<String>,
}

impl Table {
    /// Build a table, reassigning each record's `index` to its position.
    pub fn new(mut records: Vec<Record>, columns: Vec<String>) -> Self {
        for (i, record) in records.iter_mut().enumerate() {
            record.index = i;
        }
        Self { records, columns }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Spreadsheet header, in load order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn with_abstract_count(&self) -> usize {
        self.records.iter().filter(|r| r.has_abstract()).count()
    }

    /// Copy one record out as a row view.
    pub fn row(&self, index: usize) -> Option<Row> {
        self.records.get(index).cloned().map(Row::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, text: &str) -> Record {
        Record {
            id: id.to_string(),
            title: format!("Title {id}"),
            abstract_text: text.to_string(),
            extra: vec![(COL_LINK.to_string(), format!("https://example.org/{id}"))],
            ..Default::default()
        }
    }

    #[test]
    fn test_table_assigns_row_positions() {
        let table = Table::new(
            vec![record("a", "x"), record("b", ""), record("c", "y")],
            vec![COL_ID.to_string()],
        );
        let indices: Vec<usize> = table.records().iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(table.with_abstract_count(), 2);
    }

    #[test]
    fn test_record_get_falls_back_to_extra_columns() {
        let r = record("7", "text");
        assert_eq!(r.get(COL_ID), Some("7"));
        assert_eq!(r.get(COL_LINK), Some("https://example.org/7"));
        assert_eq!(r.get("Missing"), None);
    }

    #[test]
    fn test_row_push_column_appends_in_order_and_overwrites() {
        let mut row = Row::new(record("1", "text"));
        row.push_column(COL_MATCHED_KEYWORDS, "cancer");
        row.push_column("Answer: q...", "yes");
        row.push_column(COL_MATCHED_KEYWORDS, "cancer; PD-L1");
        let names: Vec<&str> = row.derived_columns().collect();
        assert_eq!(names, vec![COL_MATCHED_KEYWORDS, "Answer: q..."]);
        assert_eq!(row.get(COL_MATCHED_KEYWORDS), Some("cancer; PD-L1"));
    }

    #[test]
    fn test_view_push_column_extends_rows_and_header() {
        let mut view = TableView {
            columns: vec![COL_ID.to_string()],
            rows: vec![Row::new(record("1", "a")), Row::new(record("2", "b"))],
        };
        view.push_column("Answer: q...", |row| format!("answer {}", row.record.id));
        assert_eq!(view.columns, vec![COL_ID.to_string(), "Answer: q...".to_string()]);
        assert_eq!(view.rows[1].get("Answer: q..."), Some("answer 2"));
    }

    #[test]
    fn test_row_serializes_with_column_names() {
        let mut row = Row::new(record("3", "body"));
        row.push_column(COL_MATCHED_KEYWORDS, "body");
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["Abstract #"], "3");
        assert_eq!(json["Abstract"], "body");
        assert_eq!(json["Link"], "https://example.org/3");
        assert_eq!(json["Matched Keywords"], "body");
    }
}
