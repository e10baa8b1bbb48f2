use ndarray::Array1;
use statrs::function::gamma::digamma;

use super::super::common::dataset::{MixedDataFrame, Precision};
use super::super::common::scalar::Scalar;
use super::vptree::VpTree;
use crate::{Error, Result};

/// Configuration of the hybrid k-NN mutual information estimator.
#[derive(Debug, Clone, Copy)]
pub struct MskOptions {
    /// Number of nearest neighbours defining the per-row search radius.
    pub k: usize,
    /// Leaf capacity of every vantage-point tree built by the estimator.
    pub leaf_capacity: usize,
    /// Seed for vantage-point selection; one seed is shared by every tree of
    /// an estimate, so results are reproducible per seed.
    pub seed: u64,
    /// Min-max normalise continuous columns to `[0, 1]` before indexing.
    pub min_max_scale: bool,
}

impl Default for MskOptions {
    fn default() -> Self {
        Self {
            k: 3,
            leaf_capacity: 16,
            seed: rand::random(),
            min_max_scale: true,
        }
    }
}

/// Scaled column storage in the precision fixed by the source frame.
enum ScaledColumns {
    Single(Vec<Array1<f32>>),
    Double(Vec<Array1<f64>>),
}

/// Mutual information estimator for mixed discrete/continuous data, after
/// Mesner and Shalizi.
///
/// Built once from a [`MixedDataFrame`]; the columns are min-max scaled at
/// construction and every subsequent [`mi`](Self::mi) / [`cmi`](Self::cmi)
/// call selects its variables by name from the scaled frame. Each call builds
/// its own vantage-point trees and discards them on return.
///
/// For every row, the distance to its k-th nearest neighbour in the joint
/// space becomes the radius `eps`, and the estimate combines the tie-aware
/// neighbour count `k_hat` with marginal (or conditional-subspace) neighbour
/// counts at that radius through digamma terms. Ties are counted in full
/// because discrete columns produce exact zero distances with nonzero
/// probability.
pub struct MskMutualInformation {
    names: Vec<String>,
    is_discrete: Vec<bool>,
    scaled: ScaledColumns,
    options: MskOptions,
}

impl MskMutualInformation {
    /// Scale the frame and capture the estimator configuration.
    ///
    /// Configuration errors (constant continuous column, inconsistent column
    /// precision, `k` of zero) surface here, before any query.
    pub fn new(df: &MixedDataFrame, options: MskOptions) -> Result<Self> {
        if options.k == 0 {
            return Err(Error::InvalidNeighborCount {
                k: options.k,
                n: df.num_rows(),
            });
        }
        let names = df.names().to_vec();
        let is_discrete = names
            .iter()
            .map(|name| df.is_discrete(name))
            .collect::<Result<Vec<_>>>()?;
        let scaled = match df.continuous_precision()? {
            Precision::Single => {
                ScaledColumns::Single(df.scaled_columns::<f32>(options.min_max_scale)?)
            }
            Precision::Double => {
                ScaledColumns::Double(df.scaled_columns::<f64>(options.min_max_scale)?)
            }
        };
        Ok(Self {
            names,
            is_discrete,
            scaled,
            options,
        })
    }

    pub fn num_rows(&self) -> usize {
        match &self.scaled {
            ScaledColumns::Single(cols) => cols.first().map_or(0, |c| c.len()),
            ScaledColumns::Double(cols) => cols.first().map_or(0, |c| c.len()),
        }
    }

    pub fn options(&self) -> &MskOptions {
        &self.options
    }

    fn column_position(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| Error::MissingColumn(name.to_owned()))
    }

    /// Pairwise mutual information between two named columns.
    pub fn mi(&self, x: &str, y: &str) -> Result<f64> {
        Ok(mean_of(&self.mi_local(x, y)?))
    }

    /// Per-row contributions of the pairwise estimate; their mean is
    /// [`mi`](Self::mi).
    pub fn mi_local(&self, x: &str, y: &str) -> Result<Array1<f64>> {
        let positions = [self.column_position(x)?, self.column_position(y)?];
        let is_discrete: Vec<bool> = positions.iter().map(|&p| self.is_discrete[p]).collect();
        match &self.scaled {
            ScaledColumns::Single(cols) => {
                mi_pair_local(&select(cols, &positions), &is_discrete, &self.options)
            }
            ScaledColumns::Double(cols) => {
                mi_pair_local(&select(cols, &positions), &is_discrete, &self.options)
            }
        }
    }

    /// Conditional mutual information between `x` and `y` given one or more
    /// conditioning columns `z`.
    pub fn cmi(&self, x: &str, y: &str, z: &[&str]) -> Result<f64> {
        Ok(mean_of(&self.cmi_local(x, y, z)?))
    }

    /// Per-row contributions of the conditional estimate; their mean is
    /// [`cmi`](Self::cmi).
    pub fn cmi_local(&self, x: &str, y: &str, z: &[&str]) -> Result<Array1<f64>> {
        if z.is_empty() {
            return Err(Error::EmptyConditioningSet);
        }
        let mut positions = vec![self.column_position(x)?, self.column_position(y)?];
        for name in z {
            positions.push(self.column_position(name)?);
        }
        let is_discrete: Vec<bool> = positions.iter().map(|&p| self.is_discrete[p]).collect();
        match &self.scaled {
            ScaledColumns::Single(cols) => {
                mi_general_local(&select(cols, &positions), &is_discrete, &self.options)
            }
            ScaledColumns::Double(cols) => {
                mi_general_local(&select(cols, &positions), &is_discrete, &self.options)
            }
        }
    }

    /// Permutation-test p-value for the pairwise statistic.
    ///
    /// The shuffled permutation test is not implemented; this returns the
    /// constant sentinel `1.0` after validating the column names.
    pub fn pvalue(&self, x: &str, y: &str) -> Result<f64> {
        self.column_position(x)?;
        self.column_position(y)?;
        Ok(1.0)
    }

    /// Permutation-test p-value for the conditional statistic. Constant
    /// sentinel `1.0`, like [`pvalue`](Self::pvalue).
    pub fn pvalue_conditional(&self, x: &str, y: &str, z: &[&str]) -> Result<f64> {
        if z.is_empty() {
            return Err(Error::EmptyConditioningSet);
        }
        self.column_position(x)?;
        self.column_position(y)?;
        for name in z {
            self.column_position(name)?;
        }
        Ok(1.0)
    }
}

fn mean_of(locals: &Array1<f64>) -> f64 {
    locals.mean().unwrap_or(0.0)
}

fn select<'a, F: Scalar>(columns: &'a [Array1<F>], positions: &[usize]) -> Vec<&'a Array1<F>> {
    positions.iter().map(|&p| &columns[p]).collect()
}

/// Per-row radius and tie-aware neighbour count from a joint-space k-NN
/// query. The query uses `k + 1` neighbours because every probe row is its
/// own zero-distance neighbour in the indexed frame.
fn knn_radii<F: Scalar>(
    tree: &VpTree<'_, F>,
    columns: &[&Array1<F>],
    k: usize,
) -> Result<(Vec<F>, Vec<usize>)> {
    let knn = tree.query(columns, k + 1)?;
    let mut eps = Vec::with_capacity(knn.len());
    let mut k_hat = Vec::with_capacity(knn.len());
    for (distances, indices) in &knn {
        eps.push(distances[k]);
        k_hat.push(indices.len());
    }
    Ok((eps, k_hat))
}

fn mi_pair_local<F: Scalar>(
    columns: &[&Array1<F>],
    is_discrete: &[bool],
    options: &MskOptions,
) -> Result<Array1<f64>> {
    let num_rows = columns[0].len();
    let joint = VpTree::build(
        columns.to_vec(),
        is_discrete,
        options.leaf_capacity,
        options.seed,
    );
    let (eps, k_hat) = knn_radii(&joint, columns, options.k)?;

    let x_columns = &columns[..1];
    let y_columns = &columns[1..];
    let x_flags = &is_discrete[..1];
    let y_flags = &is_discrete[1..];
    let x_tree = VpTree::build(
        x_columns.to_vec(),
        x_flags,
        options.leaf_capacity,
        options.seed,
    );
    let y_tree = VpTree::build(
        y_columns.to_vec(),
        y_flags,
        options.leaf_capacity,
        options.seed,
    );
    let n_x = x_tree.count_ball_unconditional(x_columns, x_flags, &eps)?;
    let n_y = y_tree.count_ball_unconditional(y_columns, y_flags, &eps)?;

    let sample_term = digamma((num_rows - 1) as f64);
    let locals = (0..num_rows)
        .map(|i| {
            digamma((k_hat[i] - 1) as f64) + sample_term
                - digamma((n_x[i] - 1) as f64)
                - digamma((n_y[i] - 1) as f64)
        })
        .collect();
    Ok(Array1::from_vec(locals))
}

fn mi_general_local<F: Scalar>(
    columns: &[&Array1<F>],
    is_discrete: &[bool],
    options: &MskOptions,
) -> Result<Array1<f64>> {
    let num_rows = columns[0].len();
    let joint = VpTree::build(
        columns.to_vec(),
        is_discrete,
        options.leaf_capacity,
        options.seed,
    );
    let (eps, k_hat) = knn_radii(&joint, columns, options.k)?;

    let z_columns = &columns[2..];
    let z_flags = &is_discrete[2..];
    let z_tree = VpTree::build(
        z_columns.to_vec(),
        z_flags,
        options.leaf_capacity,
        options.seed,
    );
    let (n_xz, n_yz, n_z) = z_tree.count_ball_subspaces(columns, is_discrete, &eps)?;

    let locals = (0..num_rows)
        .map(|i| {
            digamma((k_hat[i] - 1) as f64) + digamma((n_z[i] - 1) as f64)
                - digamma((n_xz[i] - 1) as f64)
                - digamma((n_yz[i] - 1) as f64)
        })
        .collect();
    Ok(Array1::from_vec(locals))
}
