//! Presence/absence distances built from a 2x2 contingency count.
//!
//! A value is present when it is non-zero. Most formulas are similarities and
//! are reported as `1 - |s|`. Only [`BinaryFormula::Binary`] guards a zero
//! denominator; the others return NaN or an infinity in that case.

use std::fmt;

use paradist_dtw::SequenceView;

use crate::continuous::similarity_to_distance;

/// Contingency counts of two presence/absence vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinaryCount {
    /// Present in both.
    pub a: u64,
    /// Present only in the first.
    pub b: u64,
    /// Present only in the second.
    pub c: u64,
    /// Absent from both.
    pub d: u64,
}

impl BinaryCount {
    /// Count over every value of two equally shaped sequences.
    #[must_use]
    pub fn of(x: SequenceView<'_>, y: SequenceView<'_>) -> Self {
        let mut count = Self::default();
        for (p, q) in x.values().iter().zip(y.values()) {
            match (*p != 0.0, *q != 0.0) {
                (true, true) => count.a += 1,
                (true, false) => count.b += 1,
                (false, true) => count.c += 1,
                (false, false) => count.d += 1,
            }
        }
        count
    }
}

/// Closed-form distance over [`BinaryCount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryFormula {
    Binary,
    BraunBlanquet,
    Dice,
    Fager,
    Faith,
    Hamman,
    Kulczynski1,
    Kulczynski2,
    Michael,
    Mountford,
    Mozley,
    Ochiai,
    Phi,
    Russel,
    SimpleMatching,
    Simpson,
    Stiles,
    Tanimoto,
    Yule,
    Yule2,
}

impl BinaryFormula {
    /// Every binary formula in the catalog.
    pub const ALL: [BinaryFormula; 20] = [
        Self::Binary,
        Self::BraunBlanquet,
        Self::Dice,
        Self::Fager,
        Self::Faith,
        Self::Hamman,
        Self::Kulczynski1,
        Self::Kulczynski2,
        Self::Michael,
        Self::Mountford,
        Self::Mozley,
        Self::Ochiai,
        Self::Phi,
        Self::Russel,
        Self::SimpleMatching,
        Self::Simpson,
        Self::Stiles,
        Self::Tanimoto,
        Self::Yule,
        Self::Yule2,
    ];

    /// Return the method name of the formula.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::BraunBlanquet => "braun-blanquet",
            Self::Dice => "dice",
            Self::Fager => "fager",
            Self::Faith => "faith",
            Self::Hamman => "hamman",
            Self::Kulczynski1 => "kulczynski1",
            Self::Kulczynski2 => "kulczynski2",
            Self::Michael => "michael",
            Self::Mountford => "mountford",
            Self::Mozley => "mozley",
            Self::Ochiai => "ochiai",
            Self::Phi => "phi",
            Self::Russel => "russel",
            Self::SimpleMatching => "simple matching",
            Self::Simpson => "simpson",
            Self::Stiles => "stiles",
            Self::Tanimoto => "tanimoto",
            Self::Yule => "yule",
            Self::Yule2 => "yule2",
        }
    }

    /// Look up a binary formula by method name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Evaluate the formula. Both sequences must have the same shape.
    #[must_use]
    pub fn evaluate(self, x: SequenceView<'_>, y: SequenceView<'_>) -> f64 {
        self.score(BinaryCount::of(x, y), x.width())
    }

    /// Evaluate the formula from precomputed counts. `n` is the number of time steps.
    #[must_use]
    pub fn score(self, count: BinaryCount, n: usize) -> f64 {
        let BinaryCount { a, b, c, d } = count;
        let (a, b, c, d) = (a as f64, b as f64, c as f64, d as f64);
        let n = n as f64;
        match self {
            Self::Binary => {
                let den = a + b + c;
                if den == 0.0 { 0.0 } else { (b + c) / den }
            }
            Self::BraunBlanquet => similarity_to_distance(a / (a + b).max(a + c)),
            Self::Dice => similarity_to_distance(2.0 * a / (2.0 * a + b + c)),
            Self::Fager => similarity_to_distance(
                a / ((a + b) * (a + c)).sqrt() - (a + c).sqrt() / 2.0,
            ),
            Self::Faith => similarity_to_distance((a + d / 2.0) / n),
            Self::Hamman => similarity_to_distance((a + d - b - c) / n),
            Self::Kulczynski1 => similarity_to_distance(a / (b + c)),
            Self::Kulczynski2 => similarity_to_distance((a / (a + b) + a / (a + c)) / 2.0),
            Self::Michael => similarity_to_distance(
                4.0 * (a * d - b * c) / ((a + d).powi(2) + (b + c).powi(2)),
            ),
            Self::Mountford => similarity_to_distance(2.0 * a / (a * (b + c) + 2.0 * b * c)),
            Self::Mozley => similarity_to_distance(a * n / ((a + b) * (a + c))),
            Self::Ochiai => similarity_to_distance(a / ((a + b) * (a + c)).sqrt()),
            Self::Phi => similarity_to_distance(
                (a * d - b * c) / ((a + b).sqrt() * (c + d).sqrt() * (a + c).sqrt() * (b + d).sqrt()),
            ),
            Self::Russel => similarity_to_distance(a / n),
            Self::SimpleMatching => similarity_to_distance((a + d) / n),
            Self::Simpson => similarity_to_distance(a / (a + b).min(a + c)),
            Self::Stiles => similarity_to_distance(
                n.ln() + 2.0 * ((a * d - b * c).abs() - n / 2.0).ln()
                    - (a + b).ln()
                    - (c + d).ln()
                    - (a + c).ln()
                    - (b + d).ln(),
            ),
            Self::Tanimoto => similarity_to_distance((a + d) / (a + 2.0 * b + 2.0 * c + d)),
            Self::Yule => similarity_to_distance((a * d - b * c) / (a * d + b * c)),
            Self::Yule2 => {
                let (ad, bc) = ((a * d).sqrt(), (b * c).sqrt());
                similarity_to_distance((ad - bc) / (ad + bc))
            }
        }
    }
}

impl fmt::Display for BinaryFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paradist_dtw::Sequence;

    // x = [1, 1, 0, 0, 1], y = [1, 0, 1, 0, 2] -> a = 2, b = 1, c = 1, d = 1
    fn counts() -> (BinaryCount, usize) {
        let x = Sequence::univariate(vec![1.0, 1.0, 0.0, 0.0, 1.0]).unwrap();
        let y = Sequence::univariate(vec![1.0, 0.0, 1.0, 0.0, 2.0]).unwrap();
        (BinaryCount::of(x.as_view(), y.as_view()), x.width())
    }

    fn eval(formula: BinaryFormula) -> f64 {
        let (count, n) = counts();
        formula.score(count, n)
    }

    #[test]
    fn contingency_counts() {
        let (count, n) = counts();
        assert_eq!(count, BinaryCount { a: 2, b: 1, c: 1, d: 1 });
        assert_eq!(n, 5);
    }

    #[test]
    fn names_round_trip() {
        for formula in BinaryFormula::ALL {
            assert_eq!(BinaryFormula::from_name(formula.name()), Some(formula));
        }
        assert_eq!(BinaryFormula::from_name("simple_matching"), None);
    }

    #[test]
    fn binary_is_jaccard_distance() {
        assert!((eval(BinaryFormula::Binary) - 0.5).abs() < 1e-10);
    }

    #[test]
    fn binary_guards_zero_denominator() {
        let count = BinaryCount { a: 0, b: 0, c: 0, d: 4 };
        assert_eq!(BinaryFormula::Binary.score(count, 4), 0.0);
    }

    #[test]
    fn similarity_formulas() {
        let cases = [
            (BinaryFormula::BraunBlanquet, 1.0 - 2.0 / 3.0),
            (BinaryFormula::Dice, 1.0 - 4.0 / 6.0),
            (BinaryFormula::Faith, 1.0 - 2.5 / 5.0),
            (BinaryFormula::Hamman, 1.0 - 1.0 / 5.0),
            (BinaryFormula::Kulczynski1, 0.0),
            (BinaryFormula::Kulczynski2, 1.0 - 2.0 / 3.0),
            (BinaryFormula::Michael, 1.0 - 4.0 / 13.0),
            (BinaryFormula::Mountford, 1.0 - 4.0 / 6.0),
            (BinaryFormula::Mozley, 1.0 - 10.0 / 9.0_f64),
            (BinaryFormula::Ochiai, 1.0 - 2.0 / 3.0),
            (BinaryFormula::Phi, 1.0 - 1.0 / 6.0),
            (BinaryFormula::Russel, 1.0 - 2.0 / 5.0),
            (BinaryFormula::SimpleMatching, 1.0 - 3.0 / 5.0),
            (BinaryFormula::Simpson, 1.0 - 2.0 / 3.0),
            (BinaryFormula::Tanimoto, 1.0 - 3.0 / 7.0),
            (BinaryFormula::Yule, 1.0 - 1.0 / 3.0),
            (BinaryFormula::Yule2, 1.0 - (2.0_f64.sqrt() - 1.0) / (2.0_f64.sqrt() + 1.0)),
        ];
        for (formula, expected) in cases {
            let got = eval(formula);
            assert!((got - expected).abs() < 1e-10, "{formula}: got {got}, expected {expected}");
        }
    }

    #[test]
    fn mozley_takes_absolute_similarity() {
        // similarity 10/9 > 1, so the distance is negative
        assert!(eval(BinaryFormula::Mozley) < 0.0);
    }

    #[test]
    fn fager_hand_computed() {
        let expected = 1.0 - (2.0 / 3.0 - 3.0_f64.sqrt() / 2.0).abs();
        assert!((eval(BinaryFormula::Fager) - expected).abs() < 1e-10);
    }

    #[test]
    fn unguarded_zero_denominator() {
        // No shared or exclusive presences: a / (b + c) = 0 / 0
        let count = BinaryCount { a: 0, b: 0, c: 0, d: 3 };
        assert!(BinaryFormula::Kulczynski1.score(count, 3).is_nan());
    }
}
