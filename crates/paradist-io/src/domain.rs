//! Domain types for paradist-io.

use paradist_dtw::Sequence;

use crate::IoError;

/// Identifier of one input sequence.
///
/// Wraps a string parsed from the first column of the input CSV.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SequenceId(String);

impl SequenceId {
    pub(crate) fn new(id: String) -> Self {
        Self(id)
    }

    /// Return the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SequenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stem of the `{name}_dist.json` artifact, restricted to ASCII letters,
/// digits, `_` and `-` so it is always a plain file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// # Errors
    ///
    /// [`IoError::InvalidExperimentName`] for an empty name or one with any
    /// other character.
    pub fn new(name: String) -> Result<Self, IoError> {
        let valid = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-');
        if name.is_empty() || !name.chars().all(valid) {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for ExperimentName {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sequences read from one file, with their ids.
///
/// `ids[i]` corresponds to `series[i]`. `matrix_input` is set when every
/// sequence is a row of one rectangular data matrix.
#[derive(Debug)]
pub struct Dataset {
    /// Sequence ids in first-appearance order.
    pub ids: Vec<SequenceId>,
    /// Sequences in the same order as `ids`.
    pub series: Vec<Sequence>,
    /// Whether the sequences came from a wide matrix file.
    pub matrix_input: bool,
}

impl Dataset {
    /// Return the ids as owned strings, for labelling a distance vector.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.ids.iter().map(|id| id.as_str().to_string()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
