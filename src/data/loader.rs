//! Incident Store Module
//! Loads the incident CSV once with Polars and holds it as read-only state.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use super::processor::{DataProcessor, ProcessorError};

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Data file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error(transparent)]
    Timestamp(#[from] ProcessorError),
}

/// Constructed-once holder of the incident table.
///
/// `table()` hands out the same `Arc` until the store is explicitly reloaded,
/// so every consumer sees one immutable snapshot.
pub struct IncidentStore {
    path: PathBuf,
    table: Arc<DataFrame>,
}

impl IncidentStore {
    /// Load the CSV at `path` and derive the date part columns.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref().to_path_buf();
        let table = Self::read_table(&path)?;
        Ok(Self {
            path,
            table: Arc::new(table),
        })
    }

    /// Read and prepare a table without touching any store.
    pub fn read_table(path: &Path) -> Result<DataFrame, DataError> {
        if !path.is_file() {
            return Err(DataError::NotFound(path.to_path_buf()));
        }

        tracing::info!(path = %path.display(), "reading incident CSV");
        let mut df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_has_header(true)
            .finish()?
            .collect()?;

        DataProcessor::derive_date_parts(&mut df)?;

        tracing::info!(
            rows = df.height(),
            columns = df.width(),
            "incident table ready"
        );
        Ok(df)
    }

    /// Shared handle to the current table.
    pub fn table(&self) -> Arc<DataFrame> {
        Arc::clone(&self.table)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the backing file. On failure the current table is kept.
    pub fn reload(&mut self) -> Result<(), DataError> {
        let table = Self::read_table(&self.path)?;
        self.table = Arc::new(table);
        tracing::info!(path = %self.path.display(), "incident table reloaded");
        Ok(())
    }

    /// Switch to another file. On failure the store is left untouched.
    pub fn reload_from(&mut self, path: impl AsRef<Path>) -> Result<(), DataError> {
        let path = path.as_ref().to_path_buf();
        let table = Self::read_table(&path)?;
        self.replace(path, table);
        Ok(())
    }

    /// Install a table that was prepared elsewhere (background loading).
    pub fn replace(&mut self, path: PathBuf, table: DataFrame) {
        tracing::info!(path = %path.display(), rows = table.height(), "incident table replaced");
        self.path = path;
        self.table = Arc::new(table);
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        self.table.shape()
    }

    pub fn row_count(&self) -> usize {
        self.table.height()
    }

    /// First `n` rows of the table.
    pub fn preview(&self, n: usize) -> DataFrame {
        self.table.head(Some(n))
    }

    pub fn has_column(&self, name: &str) -> bool {
        has_column(&self.table, name)
    }
}

/// Whether `df` carries a column called `name`.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Render a cell for display, without the quotes Polars puts around strings.
pub fn cell_text(value: AnyValue<'_>) -> String {
    if value.is_null() {
        String::new()
    } else {
        value.to_string().trim_matches('"').to_string()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::columns;
    use std::io::Write;
    use tempfile::NamedTempFile;

    pub(crate) const HEADER: &str =
        "X,Y,reporteddate,premisetype,offence,reportedyear,reportedmonth,reporteddayofweek,MCI,Division,Hood_ID";

    pub(crate) const ROWS: [&str; 6] = [
        "-79.35,43.65,2014-06-20T10:55:00.000Z,Commercial,Assault,2014,June,Friday,Assault,D51,75",
        "-79.42,43.70,2014-07-01T04:00:00.000Z,House,B&E,2014,July,Tuesday,Break and Enter,D53,98",
        "-79.50,43.75,2015-01-15T23:10:00.000Z,Outside,Robbery - Mugging,2015,January,Thursday,Robbery,D31,25",
        "-79.38,43.66,2016-12-31T00:05:00.000Z,Apartment,Assault,2016,December,Saturday,Assault,D52,76",
        "-79.30,43.68,2017-03-03T12:00:00.000Z,Commercial,Theft Over,2017,March,Friday,Theft Over,D55,64",
        "-79.41,43.72,2018-09-09T18:45:00.000Z,Outside,Assault,2018,September,Sunday,Assault,D53,98",
    ];

    /// Write a CSV fixture with the given data rows.
    pub(crate) fn write_csv(header: &str, rows: &[&str]) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "{header}").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    pub(crate) fn fixture_store() -> (NamedTempFile, IncidentStore) {
        let file = write_csv(HEADER, &ROWS);
        let store = IncidentStore::open(file.path()).unwrap();
        (file, store)
    }

    fn int_column(df: &DataFrame, name: &str) -> Vec<i32> {
        df.column(name)
            .unwrap()
            .i32()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap())
            .collect()
    }

    #[test]
    fn test_row_count_matches_source() {
        let (_file, store) = fixture_store();
        assert_eq!(store.row_count(), ROWS.len());
        // 11 source columns + Day, Month, Hour
        assert_eq!(store.shape(), (ROWS.len(), 14));
    }

    #[test]
    fn test_derived_columns_in_calendar_range() {
        let (_file, store) = fixture_store();
        let df = store.table();

        assert!(int_column(&df, columns::DAY).iter().all(|d| (1..=31).contains(d)));
        assert!(int_column(&df, columns::MONTH).iter().all(|m| (1..=12).contains(m)));
        assert!(int_column(&df, columns::HOUR).iter().all(|h| (0..=23).contains(h)));
        assert_eq!(int_column(&df, columns::MONTH), vec![6, 7, 1, 12, 3, 9]);
        assert_eq!(int_column(&df, columns::HOUR), vec![10, 4, 23, 0, 12, 18]);
    }

    #[test]
    fn test_table_is_same_object_until_reload() {
        let (_file, store) = fixture_store();
        let first = store.table();
        let second = store.table();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.equals(&second));
    }

    #[test]
    fn test_reload_yields_identical_content() {
        let (_file, mut store) = fixture_store();
        let before = store.table();

        store.reload().unwrap();
        let after = store.table();

        assert!(!Arc::ptr_eq(&before, &after));
        assert!(before.equals(&after));
    }

    #[test]
    fn test_failed_reload_keeps_previous_table() {
        let (_file, mut store) = fixture_store();
        let before = store.table();

        let bad = write_csv(HEADER, &["-79.3,43.6,garbage,House,x,2014,June,Friday,Assault,D51,1"]);
        let err = store.reload_from(bad.path()).unwrap_err();

        assert!(matches!(
            err,
            DataError::Timestamp(ProcessorError::InvalidTimestamp { row: 0, .. })
        ));
        assert!(Arc::ptr_eq(&before, &store.table()));
        assert_ne!(store.path(), bad.path());
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = IncidentStore::open("/definitely/not/here.csv").err().unwrap();
        assert!(matches!(err, DataError::NotFound(_)));
    }

    #[test]
    fn test_preview_and_columns() {
        let (_file, store) = fixture_store();
        assert_eq!(store.preview(5).height(), 5);
        assert_eq!(store.preview(50).height(), ROWS.len());
        assert!(store.has_column(columns::HOOD_ID));
        assert!(store.has_column(columns::HOUR));
    }
}
