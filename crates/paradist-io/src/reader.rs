//! CSV sequence readers with full input validation.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use paradist_dtw::Sequence;
use tracing::{debug, info, instrument};

use crate::domain::{Dataset, SequenceId};
use crate::IoError;

/// Reads one univariate sequence per row of a wide CSV matrix.
///
/// Expected CSV format:
/// - Header row required (first column is the id, remaining are positional time steps)
/// - `id,v0,v1,...,vn`
/// - One row per sequence, all rows must have the same number of columns
///
/// The resulting [`Dataset`] is flagged as matrix input.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumns`] | Header has no value columns |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::InvalidValue`] | Cell is not a float |
/// | [`IoError::DuplicateId`] | Same id appears twice |
pub struct MatrixReader {
    path: PathBuf,
}

impl MatrixReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file, returning a [`Dataset`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Dataset, IoError> {
        let mut rdr = open_csv(&self.path)?;
        let expected_cols = header_len(&self.path, &mut rdr, "wide", 2)?;

        let mut ids = Vec::new();
        let mut series = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| csv_error(&self.path, e))?;
            let id = record.get(0).unwrap_or("").to_string();
            check_row_length(&self.path, &record, row_index, expected_cols)?;

            if let Some(&first_row) = seen.get(&id) {
                return Err(IoError::DuplicateId {
                    path: self.path.clone(),
                    id,
                    first_row,
                    second_row: row_index,
                });
            }
            seen.insert(id.clone(), row_index);

            let values = parse_cells(&self.path, &record, row_index, 1)?;
            let sequence = Sequence::univariate(values).map_err(|source| IoError::InvalidSequence {
                path: self.path.clone(),
                id: id.clone(),
                source,
            })?;

            ids.push(SequenceId::new(id));
            series.push(sequence);
        }

        if ids.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(
            n_sequences = ids.len(),
            width = expected_cols - 1,
            "matrix dataset loaded"
        );

        Ok(Dataset {
            ids,
            series,
            matrix_input: true,
        })
    }
}

/// Reads multivariate sequences of varying length from a long CSV table.
///
/// Expected CSV format:
/// - Header row required: `id,t,f0[,f1,...]`
/// - One row per time step of one sequence; the feature count is fixed by the header
/// - Rows of an id may appear anywhere; sequences keep the order in which
///   their id first appears and are sorted by `t`
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumns`] | Header has fewer than 3 columns |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::InvalidValue`] | A feature cell is not a float, or `t` is not a finite float |
/// | [`IoError::DuplicateTimeStep`] | Same `(id, t)` appears twice |
pub struct SeriesReader {
    path: PathBuf,
}

impl SeriesReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file, returning a [`Dataset`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Dataset, IoError> {
        let mut rdr = open_csv(&self.path)?;
        let expected_cols = header_len(&self.path, &mut rdr, "long", 3)?;

        // (id, [(t, column)]) in first-appearance order
        let mut groups: Vec<(String, Vec<(f64, Vec<f64>)>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| csv_error(&self.path, e))?;
            check_row_length(&self.path, &record, row_index, expected_cols)?;

            let id = record.get(0).unwrap_or("");
            let mut cells = parse_cells(&self.path, &record, row_index, 1)?;
            let column = cells.split_off(1);
            let t = cells[0];
            if !t.is_finite() {
                return Err(IoError::InvalidValue {
                    path: self.path.clone(),
                    row_index,
                    col_index: 0,
                    raw: record.get(1).unwrap_or("").to_string(),
                });
            }

            let slot = match index.get(id) {
                Some(&slot) => slot,
                None => {
                    index.insert(id.to_string(), groups.len());
                    groups.push((id.to_string(), Vec::new()));
                    groups.len() - 1
                }
            };
            groups[slot].1.push((t, column));
        }

        if groups.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }
        debug!(n_groups = groups.len(), "rows grouped by id");

        let mut ids = Vec::with_capacity(groups.len());
        let mut series = Vec::with_capacity(groups.len());
        for (id, mut steps) in groups {
            steps.sort_by(|(a, _), (b, _)| a.total_cmp(b));
            if let Some(pair) = steps.windows(2).find(|w| w[0].0 == w[1].0) {
                return Err(IoError::DuplicateTimeStep {
                    path: self.path.clone(),
                    id,
                    t: pair[0].0,
                });
            }
            let columns = steps.into_iter().map(|(_, column)| column).collect();
            let sequence = Sequence::from_columns(columns).map_err(|source| IoError::InvalidSequence {
                path: self.path.clone(),
                id: id.clone(),
                source,
            })?;
            ids.push(SequenceId::new(id));
            series.push(sequence);
        }

        info!(
            n_sequences = ids.len(),
            dim = expected_cols - 2,
            "series dataset loaded"
        );

        Ok(Dataset {
            ids,
            series,
            matrix_input: false,
        })
    }
}

fn open_csv(path: &Path) -> Result<csv::Reader<File>, IoError> {
    let file = File::open(path).map_err(|e| IoError::FileNotFound {
        path: path.to_path_buf(),
        source: e,
    })?;
    // flexible(true) lets the row length check report InconsistentRowLength
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file))
}

fn header_len(
    path: &Path,
    rdr: &mut csv::Reader<File>,
    format: &'static str,
    min: usize,
) -> Result<usize, IoError> {
    let header = rdr.headers().map_err(|e| csv_error(path, e))?;
    let got = header.len();
    debug!(expected_cols = got, "read CSV header");
    if got < min {
        return Err(IoError::MissingColumns {
            path: path.to_path_buf(),
            format,
            min,
            got,
        });
    }
    Ok(got)
}

fn csv_error(path: &Path, e: csv::Error) -> IoError {
    IoError::CsvParse {
        path: path.to_path_buf(),
        offset: e.position().map_or(0, |p| p.byte()),
        source: e,
    }
}

fn check_row_length(
    path: &Path,
    record: &csv::StringRecord,
    row_index: usize,
    expected: usize,
) -> Result<(), IoError> {
    if record.len() == expected {
        return Ok(());
    }
    Err(IoError::InconsistentRowLength {
        path: path.to_path_buf(),
        row_index,
        id: record.get(0).unwrap_or("").to_string(),
        expected,
        got: record.len(),
    })
}

/// Parse every cell from column `first` on.
fn parse_cells(
    path: &Path,
    record: &csv::StringRecord,
    row_index: usize,
    first: usize,
) -> Result<Vec<f64>, IoError> {
    record
        .iter()
        .enumerate()
        .skip(first)
        .map(|(col_index, raw)| {
            parse_value(raw).ok_or_else(|| IoError::InvalidValue {
                path: path.to_path_buf(),
                row_index,
                col_index: col_index - 1,
                raw: raw.to_string(),
            })
        })
        .collect()
}

/// Parse a float cell. `NA` reads as NaN; `NaN` and `inf` parse as usual.
fn parse_value(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw == "NA" {
        return Some(f64::NAN);
    }
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn wide_reads_rows_in_order() {
        let csv = "id,v0,v1,v2\nZZZ,0.0,0.1,0.2\nAAA,1.0,1.1,1.2\nMMM,2.0,2.1,2.2\n";
        let f = write_csv(csv);
        let ds = MatrixReader::new(f.path()).read().unwrap();
        assert_eq!(ds.len(), 3);
        assert!(ds.matrix_input);
        assert_eq!(ds.ids[0].as_str(), "ZZZ");
        assert_eq!(ds.ids[2].as_str(), "MMM");
        assert_eq!(ds.series[1].values(), &[1.0, 1.1, 1.2]);
        assert_eq!(ds.series[1].dim(), 1);
    }

    #[test]
    fn wide_value_round_trip() {
        let csv = "id,v0,v1\nA,1.23456789,9.87654321\n";
        let f = write_csv(csv);
        let ds = MatrixReader::new(f.path()).read().unwrap();
        let vals = ds.series[0].values();
        assert!((vals[0] - 1.23456789).abs() < 1e-12);
        assert!((vals[1] - 9.87654321).abs() < 1e-12);
    }

    #[test]
    fn wide_accepts_non_finite() {
        let csv = "id,v0,v1,v2\nA,NaN,inf,NA\n";
        let f = write_csv(csv);
        let ds = MatrixReader::new(f.path()).read().unwrap();
        let vals = ds.series[0].values();
        assert!(vals[0].is_nan());
        assert_eq!(vals[1], f64::INFINITY);
        assert!(vals[2].is_nan());
    }

    #[test]
    fn error_file_not_found() {
        let result = MatrixReader::new(Path::new("/nonexistent/file.csv")).read();
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }

    #[test]
    fn error_empty_dataset() {
        let f = write_csv("id,v0,v1,v2\n");
        let result = MatrixReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::EmptyDataset { .. })));
    }

    #[test]
    fn error_header_without_values() {
        let f = write_csv("id\nA\n");
        let result = MatrixReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::MissingColumns { min: 2, got: 1, .. })));
    }

    #[test]
    fn error_inconsistent_row_length() {
        let f = write_csv("id,v0,v1,v2\nB01,1.0,2.0,3.0\nB02,1.0,2.0\n");
        let result = MatrixReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::InconsistentRowLength { row_index: 1, expected: 4, got: 3, .. })
        ));
    }

    #[test]
    fn error_unparseable_value() {
        let f = write_csv("id,v0,v1\nB01,1.0,abc\n");
        let result = MatrixReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::InvalidValue { row_index: 0, col_index: 1, .. })
        ));
    }

    #[test]
    fn error_duplicate_id() {
        let f = write_csv("id,v0,v1\nB01,1.0,2.0\nB02,3.0,4.0\nB01,5.0,6.0\n");
        let result = MatrixReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::DuplicateId {
                first_row: 0,
                second_row: 2,
                ..
            })
        ));
    }

    #[test]
    fn long_groups_and_sorts_by_time() {
        let csv = "id,t,x,y\n\
                   b,2,20,21\n\
                   a,1,1,2\n\
                   b,0,0,1\n\
                   a,0,0,0\n\
                   b,1,10,11\n";
        let f = write_csv(csv);
        let ds = SeriesReader::new(f.path()).read().unwrap();
        assert!(!ds.matrix_input);
        assert_eq!(ds.labels(), vec!["b".to_string(), "a".to_string()]);

        let b = &ds.series[0];
        assert_eq!(b.dim(), 2);
        assert_eq!(b.width(), 3);
        assert_eq!(b.values(), &[0.0, 1.0, 10.0, 11.0, 20.0, 21.0]);

        let a = &ds.series[1];
        assert_eq!(a.width(), 2);
        assert_eq!(a.values(), &[0.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn long_univariate() {
        let f = write_csv("id,t,value\ns1,0,1.5\ns1,1,2.5\ns2,0,3.0\n");
        let ds = SeriesReader::new(f.path()).read().unwrap();
        assert_eq!(ds.series[0].values(), &[1.5, 2.5]);
        assert_eq!(ds.series[1].values(), &[3.0]);
    }

    #[test]
    fn long_error_missing_feature_column() {
        let f = write_csv("id,t\na,0\n");
        let result = SeriesReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::MissingColumns { min: 3, got: 2, .. })));
    }

    #[test]
    fn long_error_duplicate_time_step() {
        let f = write_csv("id,t,x\na,0,1\na,1,2\na,0,3\n");
        let result = SeriesReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::DuplicateTimeStep { t, .. }) if t == 0.0));
    }

    #[test]
    fn long_error_bad_time() {
        let f = write_csv("id,t,x\na,zero,1\n");
        let result = SeriesReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::InvalidValue { col_index: 0, .. })));
    }

    #[test]
    fn long_error_non_finite_time() {
        for raw in ["NaN", "NA", "inf"] {
            let f = write_csv(&format!("id,t,x\na,0,1\na,{raw},2\na,{raw},3\n"));
            let result = SeriesReader::new(f.path()).read();
            assert!(
                matches!(&result, Err(IoError::InvalidValue { row_index: 1, col_index: 0, raw: r, .. }) if r == raw),
                "t={raw}: {result:?}"
            );
        }
    }

    #[test]
    fn long_accepts_non_finite_features() {
        let f = write_csv("id,t,x\na,0,NaN\na,1,inf\n");
        let dataset = SeriesReader::new(f.path()).read().unwrap();
        assert_eq!(dataset.series[0].width(), 2);
    }

    #[test]
    fn long_error_empty() {
        let f = write_csv("id,t,x\n");
        let result = SeriesReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::EmptyDataset { .. })));
    }
}
