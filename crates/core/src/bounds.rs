use thiserror::Error;

/// Errors that can occur when validating or flattening bounds.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BoundsError {
    /// A pair had `lo > hi` or a NaN endpoint.
    #[error("invalid bound at index {index}: ({lo}, {hi})")]
    Invalid { index: usize, lo: f64, hi: f64 },

    /// No bound pairs were given.
    #[error("bounds must contain at least one pair")]
    Empty,

    /// The pair count neither matches nor divides the flat vector length.
    #[error("{given} bound pairs cannot cover {needed} coordinates")]
    Length { given: usize, needed: usize },
}

/// Box bounds for the decision variables.
///
/// Bounds may be given per dimension (`d` pairs) or per flattened coordinate
/// (`k·d` pairs). Per-dimension bounds are replicated across the batch when
/// flattened.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundsSpec {
    pairs: Vec<(f64, f64)>,
}

impl BoundsSpec {
    /// Creates a validated bounds specification.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty or any pair has `lo > hi` or a
    /// NaN endpoint.
    pub fn new(pairs: Vec<(f64, f64)>) -> Result<Self, BoundsError> {
        if pairs.is_empty() {
            return Err(BoundsError::Empty);
        }
        for (index, &(lo, hi)) in pairs.iter().enumerate() {
            if lo.is_nan() || hi.is_nan() || lo > hi {
                return Err(BoundsError::Invalid { index, lo, hi });
            }
        }
        Ok(Self { pairs })
    }

    /// Number of bound pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the specification is empty. Never true for a validated spec.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The validated pairs.
    #[must_use]
    pub fn pairs(&self) -> &[(f64, f64)] {
        &self.pairs
    }

    /// Expands the bounds to one pair per flattened coordinate.
    ///
    /// If exactly `needed` pairs were given they are used as-is; if the pair
    /// count divides `needed`, the pairs are replicated across the batch.
    ///
    /// # Errors
    ///
    /// Returns [`BoundsError::Length`] if the pair count neither matches nor
    /// divides `needed`.
    pub fn flattened(&self, needed: usize) -> Result<Vec<(f64, f64)>, BoundsError> {
        if self.pairs.len() == needed {
            return Ok(self.pairs.clone());
        }
        if needed % self.pairs.len() == 0 {
            let reps = needed / self.pairs.len();
            let mut out = Vec::with_capacity(needed);
            for _ in 0..reps {
                out.extend_from_slice(&self.pairs);
            }
            return Ok(out);
        }
        Err(BoundsError::Length {
            given: self.pairs.len(),
            needed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_pair() {
        let err = BoundsSpec::new(vec![(0.0, 1.0), (2.0, -2.0)]).unwrap_err();
        assert_eq!(
            err,
            BoundsError::Invalid {
                index: 1,
                lo: 2.0,
                hi: -2.0
            }
        );
    }

    #[test]
    fn rejects_nan_endpoint() {
        let err = BoundsSpec::new(vec![(f64::NAN, 1.0)]).unwrap_err();
        assert!(matches!(err, BoundsError::Invalid { index: 0, .. }));
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(BoundsSpec::new(vec![]).unwrap_err(), BoundsError::Empty);
    }

    #[test]
    fn exact_length_passes_through() {
        let spec = BoundsSpec::new(vec![(-5.0, 5.0), (-1.0, 1.0)]).unwrap();
        let flat = spec.flattened(2).unwrap();
        assert_eq!(flat, vec![(-5.0, 5.0), (-1.0, 1.0)]);
    }

    #[test]
    fn per_dimension_bounds_replicate_across_batch() {
        let spec = BoundsSpec::new(vec![(-5.0, 5.0), (0.0, 1.0)]).unwrap();
        let flat = spec.flattened(6).unwrap();
        assert_eq!(
            flat,
            vec![
                (-5.0, 5.0),
                (0.0, 1.0),
                (-5.0, 5.0),
                (0.0, 1.0),
                (-5.0, 5.0),
                (0.0, 1.0),
            ]
        );
    }

    #[test]
    fn mismatched_length_errors() {
        let spec = BoundsSpec::new(vec![(0.0, 1.0), (0.0, 1.0)]).unwrap();
        let err = spec.flattened(5).unwrap_err();
        assert_eq!(err, BoundsError::Length { given: 2, needed: 5 });
    }

    #[test]
    fn degenerate_pair_is_allowed() {
        // lo == hi pins a coordinate; still a valid box.
        assert!(BoundsSpec::new(vec![(2.0, 2.0)]).is_ok());
    }
}
