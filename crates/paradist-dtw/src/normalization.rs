//! Normalization applied to the accumulated DTW cost.

/// How the terminal accumulated cost is normalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Normalization {
    /// Return the accumulated cost unchanged.
    #[default]
    None,
    /// Divide by the width of the first sequence (`"n"`).
    ByInputALength,
    /// Divide by the summed widths of both sequences (`"n+m"`).
    ByInputABLength,
    /// Divide by the number of backtrace steps of the optimal path (`"path.length"`).
    ByPathLength,
}

impl Normalization {
    /// Resolve a `norm.method` value. Unrecognized values select [`Normalization::None`].
    #[must_use]
    pub fn parse(method: &str) -> Self {
        match method {
            "n" => Self::ByInputALength,
            "n+m" => Self::ByInputABLength,
            "path.length" => Self::ByPathLength,
            _ => Self::None,
        }
    }

    /// Return the `norm.method` spelling, or `None` for no normalization.
    #[must_use]
    pub fn method_name(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::ByInputALength => Some("n"),
            Self::ByInputABLength => Some("n+m"),
            Self::ByPathLength => Some("path.length"),
        }
    }

    /// Return true if the DP fill must record backtrace tags.
    #[must_use]
    pub fn needs_backtrace(self) -> bool {
        self == Self::ByPathLength
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_methods() {
        assert_eq!(Normalization::parse("n"), Normalization::ByInputALength);
        assert_eq!(Normalization::parse("n+m"), Normalization::ByInputABLength);
        assert_eq!(Normalization::parse("path.length"), Normalization::ByPathLength);
    }

    #[test]
    fn unknown_method_means_no_normalization() {
        assert_eq!(Normalization::parse("N"), Normalization::None);
        assert_eq!(Normalization::parse(""), Normalization::None);
    }

    #[test]
    fn method_names_round_trip() {
        for norm in [
            Normalization::ByInputALength,
            Normalization::ByInputABLength,
            Normalization::ByPathLength,
        ] {
            assert_eq!(Normalization::parse(norm.method_name().unwrap()), norm);
        }
        assert_eq!(Normalization::None.method_name(), None);
    }

    #[test]
    fn only_path_length_needs_backtrace() {
        assert!(Normalization::ByPathLength.needs_backtrace());
        assert!(!Normalization::ByInputABLength.needs_backtrace());
    }
}
