use ndarray::Array1;

use super::super::common::scalar::Scalar;

/// Per-column term selected by the discreteness flag at construction, so no
/// type inspection happens per distance call.
#[derive(Debug, Clone, Copy)]
enum ColumnKind {
    Discrete,
    Continuous,
}

/// The hybrid Chebyshev metric over row indices.
///
/// Per column: discrete columns contribute the Hamming indicator (0 on equal
/// category codes, 1 otherwise, regardless of magnitude), continuous columns
/// the absolute difference of the scaled values. The overall distance is the
/// maximum per-column term, which keeps axis-aligned ball containment
/// well-defined across discrete and continuous axes.
///
/// The two sides of a distance evaluation may address different column sets:
/// `indexed` rows are the training rows the tree was built over, `probe` rows
/// come from the query frame. For self-queries both sides are the same
/// columns.
pub struct HybridChebyshevDistance<'a, F: Scalar> {
    indexed: Vec<&'a Array1<F>>,
    probe: Vec<&'a Array1<F>>,
    kinds: Vec<ColumnKind>,
}

impl<'a, F: Scalar> HybridChebyshevDistance<'a, F> {
    /// Metric over a single column set; both evaluation sides address it.
    pub fn new(columns: &[&'a Array1<F>], is_discrete: &[bool]) -> Self {
        Self::between(columns, columns, is_discrete)
    }

    /// Metric between an indexed column set and a probe column set sharing
    /// the same schema.
    pub fn between(
        indexed: &[&'a Array1<F>],
        probe: &[&'a Array1<F>],
        is_discrete: &[bool],
    ) -> Self {
        assert_eq!(indexed.len(), is_discrete.len());
        assert_eq!(probe.len(), is_discrete.len());
        let kinds = is_discrete
            .iter()
            .map(|&discrete| {
                if discrete {
                    ColumnKind::Discrete
                } else {
                    ColumnKind::Continuous
                }
            })
            .collect();
        Self {
            indexed: indexed.to_vec(),
            probe: probe.to_vec(),
            kinds,
        }
    }

    #[inline]
    fn component(&self, col: usize, indexed_row: usize, probe_row: usize) -> F {
        let a = self.indexed[col][indexed_row];
        let b = self.probe[col][probe_row];
        match self.kinds[col] {
            ColumnKind::Discrete => {
                if a == b {
                    F::zero()
                } else {
                    F::one()
                }
            }
            ColumnKind::Continuous => (a - b).abs(),
        }
    }

    /// Distance over every column.
    #[inline]
    pub fn distance(&self, indexed_row: usize, probe_row: usize) -> F {
        let mut d = F::zero();
        for col in 0..self.kinds.len() {
            d = d.max(self.component(col, indexed_row, probe_row));
        }
        d
    }

    /// Distance restricted to an explicit subset of column indices.
    #[inline]
    pub fn distance_coords(&self, indexed_row: usize, probe_row: usize, coords: &[usize]) -> F {
        let mut d = F::zero();
        for &col in coords {
            d = d.max(self.component(col, indexed_row, probe_row));
        }
        d
    }
}
