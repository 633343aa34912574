//! Toroidal coordinate wrapping

/// How out-of-range normalised coordinates are folded back into the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    /// Non-negative remainder; results always land in `[lo, hi)`.
    #[default]
    Euclidean,
    /// Signed floating remainder, as produced by C `fmod`. Values below `lo`
    /// stay below it, so samples taken from them end up clamped to the edge.
    Truncated,
}

impl WrapMode {
    pub fn apply(self, value: f64, lo: f64, hi: f64) -> f64 {
        match self {
            WrapMode::Euclidean => wrap(value, lo, hi),
            WrapMode::Truncated => wrap_truncated(value, lo, hi),
        }
    }
}

/// Folds `value` into `[lo, hi)`. Values already in range are returned untouched.
pub fn wrap(value: f64, lo: f64, hi: f64) -> f64 {
    if (lo..hi).contains(&value) {
        return value;
    }

    let wrapped = lo + (value - lo).rem_euclid(hi - lo);
    // rem_euclid may round up to the divisor itself
    if wrapped >= hi { lo } else { wrapped }
}

/// `lo + fmod(value - lo, hi - lo)`, keeping the sign of `value - lo`.
pub fn wrap_truncated(value: f64, lo: f64, hi: f64) -> f64 {
    lo + (value - lo) % (hi - lo)
}
