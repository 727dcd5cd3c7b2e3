//! CSV input and output.
//!
//! Input columns are found by header name (trimmed, case-insensitive), so
//! column order does not matter and extra columns pass through untouched.
//! Output is append-only and flushed after every row.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::persistence::ensure_parent_dir;

/// Manufacturer column header.
pub const MANUFACTURER_COLUMN: &str = "Manufacturer";
/// Part number column header.
pub const PART_NUMBER_COLUMN: &str = "Part Number";
/// Description column header.
pub const DESCRIPTION_COLUMN: &str = "Description";

// ============================================================================
// Paths
// ============================================================================

/// Checks the input exists and has a `.csv` extension.
pub fn validate_input_path(path: &Path) -> Result<(), StoreError> {
    if !path.is_file() {
        return Err(StoreError::InputNotFound(path.to_path_buf()));
    }
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(StoreError::NotCsv(path.to_path_buf()));
    }
    Ok(())
}

/// Resolves a relative input name against `input_dir` when it is not
/// found as given.
pub fn resolve_input_path(input: &Path, input_dir: &Path) -> PathBuf {
    if input.is_relative() && !input.exists() {
        let candidate = input_dir.join(input);
        if candidate.exists() {
            debug!(path = %candidate.display(), "Resolved input inside input directory");
            return candidate;
        }
    }
    input.to_path_buf()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "output".to_string(), |s| s.to_string_lossy().into_owned())
}

/// `<output_dir>/<input stem>_<suffix>.csv`.
pub fn default_output_path(output_dir: &Path, input: &Path, suffix: &str) -> PathBuf {
    output_dir.join(format!("{}_{suffix}.csv", file_stem(input)))
}

/// `<input stem>_evaluation.csv` next to the input, or
/// `_evaluation_test.csv` in test mode.
pub fn evaluation_output_path(input: &Path, test_mode: bool) -> PathBuf {
    let suffix = if test_mode {
        "evaluation_test"
    } else {
        "evaluation"
    };
    input.with_file_name(format!("{}_{suffix}.csv", file_stem(input)))
}

// ============================================================================
// Input
// ============================================================================

/// A fully read CSV file.
#[derive(Debug, Clone)]
pub struct InputTable {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl InputTable {
    /// Reads a CSV file with a header row.
    ///
    /// Short rows are padded with empty cells; cells beyond the header
    /// width are dropped.
    pub fn read(path: &Path) -> Result<Self, StoreError> {
        validate_input_path(path)?;

        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
            if cells.len() > headers.len() {
                warn!(row = i + 1, extra = cells.len() - headers.len(), "Dropping cells beyond the header width");
            }
            cells.resize(headers.len(), String::new());
            rows.push(cells);
        }

        info!(path = %path.display(), rows = rows.len(), "Read input CSV");
        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    /// Source path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Header names, trimmed, in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows, each exactly as wide as the header.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column named `name`, ignoring case and whitespace.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers.iter().position(|h| h.eq_ignore_ascii_case(name))
    }

    /// Like [`column_index`](Self::column_index), failing if absent.
    pub fn require_column(&self, name: &str) -> Result<usize, StoreError> {
        self.column_index(name).ok_or_else(|| StoreError::MissingColumn {
            column: name.to_string(),
            path: self.path.clone(),
        })
    }

    /// A row keyed by header name.
    pub fn row_map(&self, row: &[String]) -> HashMap<String, String> {
        self.headers
            .iter()
            .cloned()
            .zip(row.iter().cloned())
            .collect()
    }
}

// ============================================================================
// Output
// ============================================================================

/// Append-only CSV writer, flushed after every row.
#[derive(Debug)]
pub struct CsvOutput {
    path: PathBuf,
    writer: csv::Writer<File>,
    width: usize,
    rows_written: usize,
}

impl CsvOutput {
    /// Creates (truncating) the file and writes the header row.
    pub fn create(path: &Path, headers: &[String]) -> Result<Self, StoreError> {
        ensure_parent_dir(path)?;
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(headers)?;
        writer.flush()?;

        debug!(path = %path.display(), columns = headers.len(), "Created output CSV");
        Ok(Self {
            path: path.to_path_buf(),
            writer,
            width: headers.len(),
            rows_written: 0,
        })
    }

    /// Appends one row and flushes it to disk.
    ///
    /// The row is padded or truncated to the header width.
    pub fn write_row(&mut self, cells: &[String]) -> Result<(), StoreError> {
        if cells.len() == self.width {
            self.writer.write_record(cells)?;
        } else {
            let mut padded = cells.to_vec();
            padded.resize(self.width, String::new());
            self.writer.write_record(&padded)?;
        }
        self.writer.flush()?;
        self.rows_written += 1;
        Ok(())
    }

    /// Output path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data rows written so far.
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_validate_input_path() {
        let dir = TempDir::new().unwrap();
        let csv = write(&dir, "parts.CSV", "a\n");
        let txt = write(&dir, "parts.txt", "a\n");

        assert!(validate_input_path(&csv).is_ok());
        assert!(matches!(validate_input_path(&txt), Err(StoreError::NotCsv(_))));
        assert!(matches!(
            validate_input_path(&dir.path().join("missing.csv")),
            Err(StoreError::InputNotFound(_))
        ));
    }

    #[test]
    fn test_header_lookup_is_order_and_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "in.csv",
            "SKU, description ,PART NUMBER,manufacturer\n1,Headset,HS-1,Acme\n2,Cable\n",
        );
        let table = InputTable::read(&path).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.require_column(MANUFACTURER_COLUMN).unwrap(), 3);
        assert_eq!(table.require_column(PART_NUMBER_COLUMN).unwrap(), 2);
        assert_eq!(table.require_column(DESCRIPTION_COLUMN).unwrap(), 1);
        assert_eq!(table.rows()[1], vec!["2", "Cable", "", ""]);
        assert!(matches!(
            table.require_column("Weight"),
            Err(StoreError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_output_is_flushed_per_row() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("result.csv");
        let headers = vec!["a".to_string(), "b".to_string()];

        let mut output = CsvOutput::create(&path, &headers).unwrap();
        output.write_row(&["1".to_string()]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "a,b\n1,\n");
        assert_eq!(output.rows_written(), 1);
    }

    #[test]
    fn test_output_paths() {
        let input = Path::new("data/parts list.csv");
        assert_eq!(
            default_output_path(Path::new("out"), input, "specs_output"),
            PathBuf::from("out/parts list_specs_output.csv")
        );
        assert_eq!(
            evaluation_output_path(Path::new("results/x_specs_output.csv"), true),
            PathBuf::from("results/x_specs_output_evaluation_test.csv")
        );
    }

    #[test]
    fn test_resolve_input_path() {
        let dir = TempDir::new().unwrap();
        write(&dir, "inside.csv", "a\n");

        let resolved = resolve_input_path(Path::new("inside.csv"), dir.path());
        assert_eq!(resolved, dir.path().join("inside.csv"));

        let untouched = resolve_input_path(Path::new("nowhere.csv"), dir.path());
        assert_eq!(untouched, PathBuf::from("nowhere.csv"));
    }
}
