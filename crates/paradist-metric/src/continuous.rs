//! Closed-form distances between equally shaped real-valued sequences.
//!
//! Sums run over every value of the sequence. Formulas defined on vectors
//! (`chord`, `geodesic`, `podani`) read only the first feature of each time
//! step. Column-wise extrema (`fJaccard`, `soergel`, `wave`) are taken over the
//! features of both sequences at that time step.
//!
//! Degenerate inputs are not guarded unless noted: a zero denominator yields
//! NaN or an infinity, as does a NaN value anywhere in the input.

use std::fmt;

use paradist_dtw::SequenceView;

/// Parameter-free closed-form distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Formula {
    /// `sqrt(Σ (√x - √y)²)`
    Bhjattacharyya,
    /// `Σ|x - y| / Σ(x + y)`
    Bray,
    /// `Σ |x - y| / |x + y|`, with NaN terms dropped and the sum rescaled.
    Canberra,
    /// `sqrt(2 (1 - x·y / sqrt(x·x y·y)))`
    Chord,
    /// `1 - x·y / (‖x‖ ‖y‖)`
    Cosine,
    /// `Σ (x - y)² / (x + y)²`, with NaN terms counted as zero.
    Divergence,
    /// `sqrt(Σ (x - y)²)`
    Euclidean,
    /// `1 - |Σ_t min / Σ_t max|`
    FJaccard,
    /// `acos(x·y / sqrt(x·x y·y))`
    Geodesic,
    /// Fraction of differing values per time step.
    Hamming,
    /// `sqrt(Σ (sqrt(x / Σx) - sqrt(y / Σy))²)`
    Hellinger,
    /// Kullback-Leibler divergence of the normalized sequences; infinite results become NaN.
    Kullback,
    /// `Σ|x - y|`
    Manhattan,
    /// `max |x - y|`
    Maximum,
    /// Podani's rank-order distance.
    Podani,
    /// `Σ|x - y| / Σ_t max`
    Soergel,
    /// `Σ |x - y| / max_t`
    Wave,
    /// `Σ |x / Σx - y / Σy| / 2`
    Whittaker,
}

impl Formula {
    /// Every formula in the catalog.
    pub const ALL: [Formula; 18] = [
        Self::Bhjattacharyya,
        Self::Bray,
        Self::Canberra,
        Self::Chord,
        Self::Cosine,
        Self::Divergence,
        Self::Euclidean,
        Self::FJaccard,
        Self::Geodesic,
        Self::Hamming,
        Self::Hellinger,
        Self::Kullback,
        Self::Manhattan,
        Self::Maximum,
        Self::Podani,
        Self::Soergel,
        Self::Wave,
        Self::Whittaker,
    ];

    /// Return the method name of the formula.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Bhjattacharyya => "bhjattacharyya",
            Self::Bray => "bray",
            Self::Canberra => "canberra",
            Self::Chord => "chord",
            Self::Cosine => "cosine",
            Self::Divergence => "divergence",
            Self::Euclidean => "euclidean",
            Self::FJaccard => "fJaccard",
            Self::Geodesic => "geodesic",
            Self::Hamming => "hamming",
            Self::Hellinger => "hellinger",
            Self::Kullback => "kullback",
            Self::Manhattan => "manhattan",
            Self::Maximum => "maximum",
            Self::Podani => "podani",
            Self::Soergel => "soergel",
            Self::Wave => "wave",
            Self::Whittaker => "whittaker",
        }
    }

    /// Look up a formula by method name. `"bhattacharyya"` is an alias of `"bhjattacharyya"`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "bhattacharyya" {
            return Some(Self::Bhjattacharyya);
        }
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Evaluate the formula. Both sequences must have the same shape.
    #[must_use]
    pub fn evaluate(self, a: SequenceView<'_>, b: SequenceView<'_>) -> f64 {
        debug_assert_eq!(a.values().len(), b.values().len());
        let x = a.values();
        let y = b.values();
        match self {
            Self::Bhjattacharyya => x
                .iter()
                .zip(y)
                .map(|(p, q)| (p.sqrt() - q.sqrt()).powi(2))
                .sum::<f64>()
                .sqrt(),
            Self::Bray => {
                let num: f64 = x.iter().zip(y).map(|(p, q)| (p - q).abs()).sum();
                let den: f64 = x.iter().zip(y).map(|(p, q)| p + q).sum();
                num / den
            }
            Self::Canberra => canberra(x, y),
            Self::Chord => {
                let (xy, xx, yy) = first_feature_products(a, b);
                (2.0 * (1.0 - xy / (xx * yy).sqrt())).sqrt()
            }
            Self::Cosine => {
                let dot: f64 = x.iter().zip(y).map(|(p, q)| p * q).sum();
                1.0 - dot / (norm(x) * norm(y))
            }
            Self::Divergence => x
                .iter()
                .zip(y)
                .map(|(p, q)| {
                    let term = (p - q).powi(2) / (p + q).powi(2);
                    if term.is_nan() { 0.0 } else { term }
                })
                .sum(),
            Self::Euclidean => x.iter().zip(y).map(|(p, q)| (p - q).powi(2)).sum::<f64>().sqrt(),
            Self::FJaccard => {
                let (min, max) = columnwise_extrema(a, b);
                similarity_to_distance(min / max)
            }
            Self::Geodesic => {
                let (xy, xx, yy) = first_feature_products(a, b);
                (xy / (xx * yy).sqrt()).acos()
            }
            Self::Hamming => {
                let differing = x.iter().zip(y).filter(|(p, q)| p != q).count();
                differing as f64 / a.width() as f64
            }
            Self::Hellinger => {
                let sx: f64 = x.iter().sum();
                let sy: f64 = y.iter().sum();
                x.iter()
                    .zip(y)
                    .map(|(p, q)| ((p / sx).sqrt() - (q / sy).sqrt()).powi(2))
                    .sum::<f64>()
                    .sqrt()
            }
            Self::Kullback => kullback(a, b),
            Self::Manhattan => x.iter().zip(y).map(|(p, q)| (p - q).abs()).sum(),
            Self::Maximum => x
                .iter()
                .zip(y)
                .map(|(p, q)| (p - q).abs())
                .fold(f64::NEG_INFINITY, f64::max),
            Self::Podani => podani(a, b),
            Self::Soergel => {
                let num: f64 = x.iter().zip(y).map(|(p, q)| (p - q).abs()).sum();
                let (_, max) = columnwise_extrema(a, b);
                num / max
            }
            Self::Wave => wave(a, b),
            Self::Whittaker => {
                let sx: f64 = x.iter().sum();
                let sy: f64 = y.iter().sum();
                x.iter().zip(y).map(|(p, q)| (p / sx - q / sy).abs()).sum::<f64>() / 2.0
            }
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `(Σ|x - y|^p)^(1/p)`
#[must_use]
pub fn minkowski(a: SequenceView<'_>, b: SequenceView<'_>, p: f64) -> f64 {
    a.values()
        .iter()
        .zip(b.values())
        .map(|(x, y)| (x - y).abs().powf(p))
        .sum::<f64>()
        .powf(1.0 / p)
}

/// Convert a similarity in `[-1, 1]` to a distance.
#[must_use]
pub fn similarity_to_distance(similarity: f64) -> f64 {
    1.0 - similarity.abs()
}

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

fn first_feature_products(a: SequenceView<'_>, b: SequenceView<'_>) -> (f64, f64, f64) {
    a.first_feature()
        .zip(b.first_feature())
        .fold((0.0, 0.0, 0.0), |(xy, xx, yy), (p, q)| (xy + p * q, xx + p * p, yy + q * q))
}

/// Sums over time steps of the minimum and maximum value found in either sequence.
fn columnwise_extrema(a: SequenceView<'_>, b: SequenceView<'_>) -> (f64, f64) {
    (0..a.width()).fold((0.0, 0.0), |(min, max), t| {
        let values = a.column(t).iter().chain(b.column(t));
        let lo = values.clone().copied().fold(f64::INFINITY, f64::min);
        let hi = values.copied().fold(f64::NEG_INFINITY, f64::max);
        (min + lo, max + hi)
    })
}

fn canberra(x: &[f64], y: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut counted = 0usize;
    for (p, q) in x.iter().zip(y) {
        let ratio = (p - q).abs() / (p + q).abs();
        if !ratio.is_nan() {
            sum += ratio;
            counted += 1;
        }
    }
    if counted < x.len() {
        (counted + 1) as f64 / counted as f64 * sum
    } else {
        sum
    }
}

/// `Σ_t (Σ_r p[r, t]) (Σ_s ln(p / q)[s, t])`; for one feature this is `Σ p ln(p / q)`.
fn kullback(a: SequenceView<'_>, b: SequenceView<'_>) -> f64 {
    let sx: f64 = a.values().iter().sum();
    let sy: f64 = b.values().iter().sum();
    let result: f64 = (0..a.width())
        .map(|t| {
            let (p_sum, log_sum) = a.column(t).iter().zip(b.column(t)).fold(
                (0.0, 0.0),
                |(p_sum, log_sum), (x, y)| {
                    let p = x / sx;
                    let q = y / sy;
                    (p_sum + p, log_sum + (p / q).ln())
                },
            );
            p_sum * log_sum
        })
        .sum();
    if result.is_infinite() { f64::NAN } else { result }
}

fn podani(a: SequenceView<'_>, b: SequenceView<'_>) -> f64 {
    let x: Vec<f64> = a.first_feature().collect();
    let y: Vec<f64> = b.first_feature().collect();
    let n = x.len();
    let (mut concordant, mut discordant, mut tied, mut mixed) = (0u64, 0u64, 0u64, 0u64);
    for i in 0..n {
        for j in i + 1..n {
            if (x[i] < x[j] && y[i] < y[j]) || (x[i] > x[j] && y[i] > y[j]) {
                concordant += 1;
            }
            if (x[i] < x[j] && y[i] > y[j]) || (x[i] > x[j] && y[i] < y[j]) {
                discordant += 1;
            }
            if x[i] == x[j]
                && y[i] == y[j]
                && ((x[i] == 0.0 && y[i] == 0.0) || (x[i] > 0.0 && y[i] > 0.0))
            {
                tied += 1;
            }
            let zeros = [x[i], x[j], y[i], y[j]].iter().filter(|v| **v == 0.0).count();
            if (x[i] == x[j] || y[i] == y[j]) && zeros > 0 && zeros < 4 {
                mixed += 1;
            }
        }
    }
    let score = concordant as f64 - discordant as f64 + tied as f64 - mixed as f64;
    1.0 - 2.0 * score / (n * n.saturating_sub(1)) as f64
}

fn wave(a: SequenceView<'_>, b: SequenceView<'_>) -> f64 {
    (0..a.width())
        .map(|t| {
            let (xa, xb) = (a.column(t), b.column(t));
            let max = xa.iter().chain(xb).copied().fold(f64::NEG_INFINITY, f64::max);
            xa.iter().zip(xb).map(|(p, q)| (p - q).abs() / max).sum::<f64>()
        })
        .sum()
}
