//! In-memory tabular dataset with loading and validation
//!
//! A [`Dataset`] is an immutable, column-oriented table loaded once per run.
//! Every column is either numeric or text; cells may be missing.
//!
//! # Loading Pipeline
//!
//! ```text
//! input file (.csv / .json)
//!     ↓  read raw cells (empty, null and "nan" become missing)
//! infer column kinds (numeric if every present cell parses)
//!     ↓  coerce numeric candidates (unparseable cells become missing)
//! check required columns (fatal if any is absent)
//!     ↓
//! Dataset
//! ```
//!
//! Only two failures are structural: the input file is absent, or required
//! columns are absent. Everything else degrades to missing cells.
//!
//! # Examples
//!
//! ```
//! use pede_analysis::dataset::Dataset;
//!
//! let csv = "IAN,Pedra 22\n5,Ametista\nn/a,Quartzo\n10,\n";
//! let dataset = Dataset::from_csv_reader(csv.as_bytes())
//!     .unwrap()
//!     .coerce_numeric(&["IAN"]);
//!
//! assert_eq!(dataset.row_count(), 3);
//! assert_eq!(dataset.numeric("IAN").unwrap(), &[Some(5.0), None, Some(10.0)]);
//! assert!(dataset.require_columns(&["IAN", "Fase"]).is_err());
//! ```

use std::{
    collections::BTreeSet,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use serde_json::Value as JsonValue;

use crate::grouping::GroupKey;

/// Errors raised while loading or validating a dataset.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum LoadError {
    #[display(
        "dataset not found at {}; place the input file there or pass another path",
        path.display()
    )]
    MissingInput { path: PathBuf },
    #[display("expected columns are missing: {missing:?}; available columns: {available:?}")]
    MissingColumns {
        missing: Vec<String>,
        available: Vec<String>,
    },
    #[display("column '{column}' is not numeric")]
    NotNumeric { column: String },
    #[display("unsupported input format: {} (expected .csv or .json)", path.display())]
    UnsupportedFormat { path: PathBuf },
    #[display("failed to read CSV file: {}", path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[display("failed to read JSON file: {}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[display("malformed JSON records in {}: {reason}", path.display())]
    MalformedJson { path: PathBuf, reason: String },
    #[display("failed to open {}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

/// Cell storage of a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

/// Storage kind of a column, as reported in the column overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Text,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Text => "text",
        })
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    #[must_use]
    pub fn kind(&self) -> ColumnKind {
        match self.data {
            ColumnData::Numeric(_) => ColumnKind::Numeric,
            ColumnData::Text(_) => ColumnKind::Text,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(cells) => cells.len(),
            ColumnData::Text(cells) => cells.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of missing cells.
    #[must_use]
    pub fn missing_count(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(cells) => cells.iter().filter(|c| c.is_none()).count(),
            ColumnData::Text(cells) => cells.iter().filter(|c| c.is_none()).count(),
        }
    }

    /// Number of distinct present values.
    #[must_use]
    pub fn distinct_count(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(cells) => {
                pede_stats::frequency::distinct_count(cells.iter().flatten().copied())
            }
            ColumnData::Text(cells) => cells.iter().flatten().collect::<BTreeSet<_>>().len(),
        }
    }

    /// Cells as grouping keys, in row order.
    #[must_use]
    pub fn group_keys(&self) -> Vec<Option<GroupKey>> {
        match &self.data {
            ColumnData::Numeric(cells) => cells.iter().map(|c| c.map(GroupKey::Number)).collect(),
            ColumnData::Text(cells) => cells
                .iter()
                .map(|c| c.as_ref().map(|s| GroupKey::Label(s.clone())))
                .collect(),
        }
    }

    fn into_numeric(self) -> (Self, usize) {
        match self.data {
            ColumnData::Numeric(_) => (self, 0),
            ColumnData::Text(cells) => {
                let mut failed = 0;
                let values = cells
                    .into_iter()
                    .map(|cell| {
                        let value = cell.as_deref().and_then(parse_number);
                        if cell.is_some() && value.is_none() {
                            failed += 1;
                        }
                        value
                    })
                    .collect();
                let column = Self {
                    name: self.name,
                    data: ColumnData::Numeric(values),
                };
                (column, failed)
            }
        }
    }
}

/// Immutable column-oriented table.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Builds a dataset from a header row and raw cells in row order.
    ///
    /// Short rows are padded with missing cells. A column whose present cells
    /// all parse as numbers is stored as numeric. A repeated header gets a
    /// `.1`, `.2`, ... suffix.
    #[must_use]
    pub fn from_raw_rows(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let headers = dedup_headers(headers);
        let row_count = rows.len();
        let mut raw_columns = vec![Vec::with_capacity(row_count); headers.len()];
        for mut row in rows {
            row.resize(headers.len(), None);
            for (column, cell) in raw_columns.iter_mut().zip(row) {
                column.push(cell.and_then(normalize_cell));
            }
        }

        let columns = headers
            .into_iter()
            .zip(raw_columns)
            .map(|(name, cells)| infer_column(name, cells))
            .collect();

        Self { columns, row_count }
    }

    /// Reads a CSV table with a header row.
    ///
    /// Cells that are not valid UTF-8 are decoded as Latin-1.
    pub fn from_csv_reader<R>(reader: R) -> Result<Self, csv::Error>
    where
        R: io::Read,
    {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let mut latin1 = 0;
        let headers = reader
            .byte_headers()?
            .iter()
            .map(|h| decode_cell(h, &mut latin1).trim().to_owned())
            .collect::<Vec<_>>();
        let rows = reader
            .byte_records()
            .map(|record| {
                Ok(record?
                    .iter()
                    .map(|cell| Some(decode_cell(cell, &mut latin1)))
                    .collect())
            })
            .collect::<Result<Vec<Vec<_>>, csv::Error>>()?;
        if latin1 > 0 {
            log::debug!("{latin1} cells are not valid UTF-8 and were decoded as Latin-1");
        }
        Ok(Self::from_raw_rows(headers, rows))
    }

    /// Builds a dataset from a JSON array of flat records.
    ///
    /// Columns are the union of all record keys in order of first appearance.
    pub fn from_json_records(root: &JsonValue) -> Result<Self, String> {
        let records = root
            .as_array()
            .ok_or_else(|| "expected a top-level array of records".to_owned())?;

        let mut headers: Vec<String> = Vec::new();
        for (i, record) in records.iter().enumerate() {
            let object = record
                .as_object()
                .ok_or_else(|| format!("record {i} is not an object"))?;
            for key in object.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .filter_map(JsonValue::as_object)
            .map(|object| {
                headers
                    .iter()
                    .map(|key| match object.get(key) {
                        None | Some(JsonValue::Null) => None,
                        Some(JsonValue::String(s)) => Some(s.clone()),
                        Some(other) => Some(other.to_string()),
                    })
                    .collect()
            })
            .collect();

        Ok(Self::from_raw_rows(headers, rows))
    }

    /// Reads a dataset file, dispatching on its extension.
    ///
    /// Supported formats:
    /// * `.csv`  - header row followed by one row per student
    /// * `.json` - `[{ "column": value, ... }, ...]`
    pub fn read(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::MissingInput {
                path: path.to_owned(),
            });
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => {
                let file = fs::File::open(path).map_err(|source| LoadError::Io {
                    path: path.to_owned(),
                    source,
                })?;
                Self::from_csv_reader(io::BufReader::new(file)).map_err(|source| {
                    LoadError::Csv {
                        path: path.to_owned(),
                        source,
                    }
                })
            }
            "json" => {
                let file = fs::File::open(path).map_err(|source| LoadError::Io {
                    path: path.to_owned(),
                    source,
                })?;
                let root: JsonValue = serde_json::from_reader(io::BufReader::new(file))
                    .map_err(|source| LoadError::Json {
                        path: path.to_owned(),
                        source,
                    })?;
                Self::from_json_records(&root).map_err(|reason| LoadError::MalformedJson {
                    path: path.to_owned(),
                    reason,
                })
            }
            _ => Err(LoadError::UnsupportedFormat {
                path: path.to_owned(),
            }),
        }
    }

    /// Reads, coerces and validates a dataset in one step.
    ///
    /// Numeric candidates that are absent are skipped; required columns that
    /// are absent fail the load.
    pub fn load<N, R>(path: &Path, numeric: &[N], required: &[R]) -> Result<Self, LoadError>
    where
        N: AsRef<str>,
        R: AsRef<str>,
    {
        let dataset = Self::read(path)?.coerce_numeric(numeric);
        dataset.require_columns(required)?;
        log::info!(
            "loaded {} rows x {} columns from {}",
            dataset.row_count(),
            dataset.columns.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Converts the named columns to numeric. Unparseable cells become missing.
    #[must_use]
    pub fn coerce_numeric<N>(self, names: &[N]) -> Self
    where
        N: AsRef<str>,
    {
        let columns = self
            .columns
            .into_iter()
            .map(|column| {
                if !names.iter().any(|n| n.as_ref() == column.name) {
                    return column;
                }
                let (column, failed) = column.into_numeric();
                if failed > 0 {
                    log::debug!(
                        "column '{}': {failed} non-numeric values treated as missing",
                        column.name
                    );
                }
                column
            })
            .collect();
        Self {
            columns,
            row_count: self.row_count,
        }
    }

    /// Fails with [`LoadError::MissingColumns`] if any of the names is absent.
    pub fn require_columns<R>(&self, required: &[R]) -> Result<(), LoadError>
    where
        R: AsRef<str>,
    {
        let missing = required
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| self.column(name).is_none())
            .map(str::to_owned)
            .collect::<Vec<_>>();
        if missing.is_empty() {
            return Ok(());
        }
        Err(LoadError::MissingColumns {
            missing,
            available: self.column_names().map(str::to_owned).collect(),
        })
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Numeric cells of a column.
    pub fn numeric(&self, name: &str) -> Result<&[Option<f64>], LoadError> {
        match &self.column_or_err(name)?.data {
            ColumnData::Numeric(cells) => Ok(cells),
            ColumnData::Text(_) => Err(LoadError::NotNumeric {
                column: name.to_owned(),
            }),
        }
    }

    /// Cells of a column as grouping keys.
    pub fn group_keys(&self, name: &str) -> Result<Vec<Option<GroupKey>>, LoadError> {
        Ok(self.column_or_err(name)?.group_keys())
    }

    fn column_or_err(&self, name: &str) -> Result<&Column, LoadError> {
        self.column(name).ok_or_else(|| LoadError::MissingColumns {
            missing: vec![name.to_owned()],
            available: self.column_names().map(str::to_owned).collect(),
        })
    }
}

fn decode_cell(bytes: &[u8], latin1: &mut usize) -> String {
    match std::str::from_utf8(bytes) {
        Ok(cell) => cell.to_owned(),
        Err(_) => {
            *latin1 += 1;
            bytes.iter().copied().map(char::from).collect()
        }
    }
}

fn dedup_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    headers
        .into_iter()
        .map(|header| {
            let mut name = header.clone();
            let mut suffix = 0;
            while seen.contains(&name) {
                suffix += 1;
                name = format!("{header}.{suffix}");
            }
            if suffix > 0 {
                log::warn!("duplicate column '{header}' renamed to '{name}'");
            }
            seen.insert(name.clone());
            name
        })
        .collect()
}

fn normalize_cell(cell: String) -> Option<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        None
    } else if trimmed.len() == cell.len() {
        Some(cell)
    } else {
        Some(trimmed.to_owned())
    }
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

fn infer_column(name: String, cells: Vec<Option<String>>) -> Column {
    let numeric = cells
        .iter()
        .flatten()
        .all(|cell| parse_number(cell).is_some());
    let data = if numeric {
        ColumnData::Numeric(
            cells
                .iter()
                .map(|c| c.as_deref().and_then(parse_number))
                .collect(),
        )
    } else {
        ColumnData::Text(cells)
    };
    Column { name, data }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
IAN,Defas,Fase,Pedra 22,Nome
5,0,1,Ametista,Aluno-1
10,-1,2,Topázio,Aluno-2
2.5,x,ALFA,,Aluno-3
, -2 ,3,Quartzo,Aluno-4
";

    fn dataset() -> Dataset {
        Dataset::from_csv_reader(CSV.as_bytes())
            .unwrap()
            .coerce_numeric(&["IAN", "Defas", "Fase"])
    }

    #[test]
    fn test_infers_kinds() {
        let raw = Dataset::from_csv_reader(CSV.as_bytes()).unwrap();
        assert_eq!(raw.column("IAN").unwrap().kind(), ColumnKind::Numeric);
        assert_eq!(raw.column("Defas").unwrap().kind(), ColumnKind::Text);
        assert_eq!(raw.column("Pedra 22").unwrap().kind(), ColumnKind::Text);
    }

    #[test]
    fn test_coercion_turns_failures_into_missing() {
        let dataset = dataset();
        assert_eq!(
            dataset.numeric("Defas").unwrap(),
            &[Some(0.0), Some(-1.0), None, Some(-2.0)]
        );
        assert_eq!(
            dataset.numeric("Fase").unwrap(),
            &[Some(1.0), Some(2.0), None, Some(3.0)]
        );
        assert_eq!(dataset.column("IAN").unwrap().missing_count(), 1);
    }

    #[test]
    fn test_text_column_is_not_numeric() {
        let err = dataset().numeric("Nome").unwrap_err();
        assert!(matches!(err, LoadError::NotNumeric { .. }));
    }

    #[test]
    fn test_missing_columns_lists_available() {
        let err = dataset()
            .require_columns(&["IAN", "Idade 22", "Ano ingresso"])
            .unwrap_err();
        let LoadError::MissingColumns { missing, available } = err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(missing, vec!["Idade 22", "Ano ingresso"]);
        assert_eq!(available, vec!["IAN", "Defas", "Fase", "Pedra 22", "Nome"]);
    }

    #[test]
    fn test_missing_input_names_path() {
        let path = Path::new("does/not/exist.csv");
        let err = Dataset::read(path).unwrap_err();
        assert!(matches!(err, LoadError::MissingInput { .. }));
        assert!(err.to_string().contains("does/not/exist.csv"));
    }

    #[test]
    fn test_json_records() {
        let root = serde_json::json!([
            { "IEG": 8.5, "Pedra 22": "Ágata" },
            { "IEG": null, "Pedra 22": "Quartzo", "IPV": 7 },
        ]);
        let dataset = Dataset::from_json_records(&root).unwrap();
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.numeric("IEG").unwrap(), &[Some(8.5), None]);
        assert_eq!(dataset.numeric("IPV").unwrap(), &[None, Some(7.0)]);
        assert!(Dataset::from_json_records(&serde_json::json!({"a": 1})).is_err());
    }

    #[test]
    fn test_latin1_cells_are_decoded() {
        let dataset = Dataset::from_csv_reader(&b"IAN,Pedra 22\n5,\xC1gata\n10,Quartzo\n"[..])
            .unwrap()
            .coerce_numeric(&["IAN"]);
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.numeric("IAN").unwrap(), &[Some(5.0), Some(10.0)]);
        assert_eq!(
            dataset.column("Pedra 22").unwrap().data,
            ColumnData::Text(vec![Some("Ágata".to_owned()), Some("Quartzo".to_owned())])
        );
    }

    #[test]
    fn test_duplicate_headers_get_suffixes() {
        let dataset = Dataset::from_csv_reader("IAN,IAN,IDA,IAN\n1,2,3,4\n".as_bytes()).unwrap();
        assert_eq!(
            dataset.column_names().collect::<Vec<_>>(),
            vec!["IAN", "IAN.1", "IDA", "IAN.2"]
        );
        assert_eq!(dataset.numeric("IAN").unwrap(), &[Some(1.0)]);
        assert_eq!(dataset.numeric("IAN.2").unwrap(), &[Some(4.0)]);
    }

    #[test]
    fn test_distinct_count_ignores_missing() {
        let dataset = dataset();
        assert_eq!(dataset.column("IAN").unwrap().distinct_count(), 3);
        assert_eq!(dataset.column("Pedra 22").unwrap().distinct_count(), 3);
    }
}
