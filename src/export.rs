//! Chunked CSV export of filtered and annotated rows.

use std::io;

use futures_util::stream::{self, Stream, StreamExt};

use crate::table::{Row, ANSWER_PREFIX, BASE_COLUMNS, COL_MATCHED_KEYWORDS};

/// Rows encoded per emitted chunk.
pub const CHUNK_ROWS: usize = 1000;

/// Columns exported for a filtered (not annotated) view.
pub fn filtered_columns(search_active: bool) -> Vec<String> {
    let mut columns: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
    if search_active {
        columns.push(COL_MATCHED_KEYWORDS.to_string());
    }
    columns
}

/// Columns exported for an annotation result: base columns, matched
/// keywords if present, then every answer column in the order added.
/// Only columns present in `available` are kept.
pub fn annotated_columns(available: &[String]) -> Vec<String> {
    let mut columns: Vec<String> = BASE_COLUMNS
        .iter()
        .chain(std::iter::once(&COL_MATCHED_KEYWORDS))
        .filter(|c| available.iter().any(|a| a.as_str() == **c))
        .map(|c| c.to_string())
        .collect();
    columns.extend(
        available
            .iter()
            .filter(|c| c.starts_with(ANSWER_PREFIX))
            .cloned(),
    );
    columns
}

/// Encode the header and each row's values in `columns` order. Missing
/// fields are written empty.
fn encode<'a, I>(records: I) -> io::Result<Vec<u8>>
where
    I: IntoIterator<Item = Vec<&'a str>>,
{
    let mut writer = csv::WriterBuilder::new()
        .flexible(false)
        .from_writer(Vec::new());
    for record in records {
        writer.write_record(record).map_err(io::Error::other)?;
    }
    writer
        .into_inner()
        .map_err(|e| io::Error::other(e.to_string()))
}

fn encode_rows(rows: &[Row], columns: &[String]) -> io::Result<Vec<u8>> {
    encode(rows.iter().map(|row| {
        columns
            .iter()
            .map(|c| row.get(c).unwrap_or_default())
            .collect::<Vec<&str>>()
    }))
}

/// Stream `rows` as CSV: one header chunk, then one chunk per
/// [`CHUNK_ROWS`] rows. Rows are pulled from the iterator only as chunks
/// are produced.
pub fn stream_csv<I>(
    rows: I,
    columns: Vec<String>,
) -> impl Stream<Item = io::Result<Vec<u8>>> + Send + 'static
where
    I: IntoIterator<Item = Row>,
    I::IntoIter: Send + 'static,
{
    let header = encode(std::iter::once(
        columns.iter().map(String::as_str).collect::<Vec<&str>>(),
    ));

    let body = stream::unfold(
        (rows.into_iter(), columns),
        |(mut rows, columns)| async move {
            let chunk: Vec<Row> = rows.by_ref().take(CHUNK_ROWS).collect();
            if chunk.is_empty() {
                return None;
            }
            let encoded = encode_rows(&chunk, &columns);
            Some((encoded, (rows, columns)))
        },
    );

    stream::once(async move { header }).chain(body)
}
