//! JSON writer for distance vectors.

use std::fs;
use std::path::{Path, PathBuf};

use paradist_metric::DistVector;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::domain::ExperimentName;
use crate::IoError;

/// Writes distance vectors to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_dist.json`. Non-finite distances are
/// written as `null`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Return the path of the distance artifact.
    #[must_use]
    pub fn dist_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_dist.json", self.experiment.as_str()))
    }

    /// Write a distance vector to `{experiment}_dist.json` and return its path.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Serialize`] | the artifact cannot be encoded |
    /// | [`IoError::WriteFile`] | the file cannot be written |
    #[instrument(skip_all, fields(size = dist.len()))]
    pub fn write_dist(&self, dist: &DistVector) -> Result<PathBuf, IoError> {
        let path = self.dist_path();

        let artifact = DistArtifact {
            experiment: self.experiment.as_str(),
            method: dist.method(),
            size: dist.len(),
            labels: dist.labels(),
            diag: dist.diag(),
            upper: dist.upper(),
            values: dist.values(),
        };

        let json = serde_json::to_string_pretty(&artifact).map_err(|e| IoError::Serialize {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "distance vector written");
        Ok(path)
    }
}

#[derive(Serialize)]
struct DistArtifact<'a> {
    experiment: &'a str,
    method: &'a str,
    size: usize,
    labels: Option<&'a [String]>,
    diag: bool,
    upper: bool,
    values: &'a [f64],
}

#[cfg(test)]
mod tests {
    use super::*;
    use paradist_dtw::Sequence;
    use paradist_metric::{Formula, Measure};
    use tempfile::TempDir;

    fn test_dist() -> DistVector {
        let series = vec![
            Sequence::univariate(vec![0.0, 0.0]).unwrap(),
            Sequence::univariate(vec![3.0, 4.0]).unwrap(),
            Sequence::univariate(vec![0.0, 1.0]).unwrap(),
        ];
        Measure::Formula(Formula::Euclidean).pairwise(&series).unwrap()
    }

    fn read_json(path: &Path) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn write_dist_json_structure() {
        let dir = TempDir::new().unwrap();
        let experiment = ExperimentName::new("test_run".into()).unwrap();
        let writer = ResultWriter::new(dir.path(), experiment).unwrap();

        let dist = test_dist()
            .with_labels(vec!["a".into(), "b".into(), "c".into()])
            .unwrap()
            .with_diag(true);
        let path = writer.write_dist(&dist).unwrap();
        assert_eq!(path, dir.path().join("test_run_dist.json"));

        let content = read_json(&path);
        assert_eq!(content["experiment"], "test_run");
        assert_eq!(content["method"], "euclidean");
        assert_eq!(content["size"], 3);
        assert_eq!(content["diag"], true);
        assert_eq!(content["upper"], false);
        assert_eq!(content["labels"][1], "b");

        let values: Vec<f64> = content["values"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_f64().unwrap())
            .collect();
        assert_eq!(values.len(), 3);
        assert!((values[0] - 5.0).abs() < 1e-10);
        assert!((values[1] - 1.0).abs() < 1e-10);
        assert!((values[2] - 18.0_f64.sqrt()).abs() < 1e-10);
    }

    #[test]
    fn unlabelled_dist_writes_null_labels() {
        let dir = TempDir::new().unwrap();
        let experiment = ExperimentName::new("plain".into()).unwrap();
        let writer = ResultWriter::new(dir.path(), experiment).unwrap();
        let path = writer.write_dist(&test_dist()).unwrap();
        assert!(read_json(&path)["labels"].is_null());
    }

    #[test]
    fn non_finite_values_become_null() {
        let dir = TempDir::new().unwrap();
        let experiment = ExperimentName::new("nan".into()).unwrap();
        let writer = ResultWriter::new(dir.path(), experiment).unwrap();

        let series = vec![
            Sequence::univariate(vec![f64::NAN]).unwrap(),
            Sequence::univariate(vec![1.0]).unwrap(),
        ];
        let dist = Measure::Formula(Formula::Euclidean).pairwise(&series).unwrap();
        let path = writer.write_dist(&dist).unwrap();
        assert!(read_json(&path)["values"][0].is_null());
    }

    #[test]
    fn creates_output_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested").join("deep");
        let experiment = ExperimentName::new("nested_test".into()).unwrap();
        let writer = ResultWriter::new(&nested, experiment).unwrap();
        writer.write_dist(&test_dist()).unwrap();
        assert!(nested.join("nested_test_dist.json").exists());
    }
}
