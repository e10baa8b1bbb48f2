use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ndarray::Array1;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::super::common::scalar::Scalar;
use super::distance::HybridChebyshevDistance;
use crate::{Error, Result};

/// A node of the vantage-point tree.
///
/// Internal nodes partition the remaining rows by distance to their vantage
/// point: the left subtree holds rows strictly closer than the threshold, the
/// right subtree rows at or beyond it. Leaves hold the remaining row indices
/// directly. A leaf larger than the configured capacity can only arise from a
/// degenerate cluster in which every row coincides with the vantage point
/// under the metric.
#[derive(Debug)]
pub enum VpTreeNode<F: Scalar> {
    Internal {
        vantage: usize,
        threshold: F,
        left: Option<Box<VpTreeNode<F>>>,
        right: Option<Box<VpTreeNode<F>>>,
    },
    Leaf {
        indices: Vec<usize>,
    },
}

/// Candidate neighbor; the binary heap orders the worst candidate on top so
/// the current k-th best distance is always `peek()`.
struct Neighbor<F: Scalar> {
    distance: F,
    index: usize,
}

impl<F: Scalar> PartialEq for Neighbor<F> {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance
    }
}

impl<F: Scalar> Eq for Neighbor<F> {}

impl<F: Scalar> PartialOrd for Neighbor<F> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<F: Scalar> Ord for Neighbor<F> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance.partial_cmp(&other.distance).unwrap()
    }
}

/// Pending subtree ordered by ascending lower bound on the achievable
/// distance, so the most promising subtree is always popped first.
struct PendingSubtree<'t, F: Scalar> {
    node: &'t VpTreeNode<F>,
    min_distance: F,
}

impl<F: Scalar> PartialEq for PendingSubtree<'_, F> {
    fn eq(&self, other: &Self) -> bool {
        self.min_distance == other.min_distance
    }
}

impl<F: Scalar> Eq for PendingSubtree<'_, F> {}

impl<F: Scalar> PartialOrd for PendingSubtree<'_, F> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<F: Scalar> Ord for PendingSubtree<'_, F> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, the traversal wants the
        // smallest lower bound first.
        other.min_distance.partial_cmp(&self.min_distance).unwrap()
    }
}

fn build_node<F: Scalar>(
    distance: &HybridChebyshevDistance<'_, F>,
    indices: Vec<usize>,
    leaf_capacity: usize,
    rng: &mut StdRng,
) -> Option<Box<VpTreeNode<F>>> {
    if indices.is_empty() {
        return None;
    }

    if indices.len() <= leaf_capacity {
        return Some(Box::new(VpTreeNode::Leaf { indices }));
    }

    let mut indices = indices;
    let pick = rng.gen_range(0..indices.len());
    indices.swap(0, pick);
    let vantage = indices[0];

    let mut dist_idx: Vec<(F, usize)> = Vec::with_capacity(indices.len() - 1);
    let mut max = F::zero();
    for &idx in &indices[1..] {
        let d = distance.distance(idx, vantage);
        if d > max {
            max = d;
        }
        dist_idx.push((d, idx));
    }

    if max == F::zero() {
        // Every remaining row coincides with the vantage point under the
        // metric; splitting is meaningless, the whole set becomes one leaf.
        return Some(Box::new(VpTreeNode::Leaf { indices }));
    }

    let mid = dist_idx.len() / 2;
    dist_idx.select_nth_unstable_by(mid, |a, b| b.0.partial_cmp(&a.0).unwrap());
    let threshold = dist_idx[mid].0;

    let mut left_indices = Vec::new();
    let mut right_indices = Vec::new();
    for &(d, idx) in &dist_idx {
        if d < threshold {
            left_indices.push(idx);
        } else {
            right_indices.push(idx);
        }
    }

    let left = build_node(distance, left_indices, leaf_capacity, rng);
    let right = build_node(distance, right_indices, leaf_capacity, rng);

    Some(Box::new(VpTreeNode::Internal {
        vantage,
        threshold,
        left,
        right,
    }))
}

/// Exact nearest-neighbor index over dataset rows under the hybrid Chebyshev
/// metric.
///
/// The tree borrows the column data for its lifetime and is immutable after
/// construction; there is no insert or delete. Vantage points are drawn from
/// a generator seeded once per tree and consumed sequentially during the
/// recursive build, so a seed fully determines the tree shape.
pub struct VpTree<'a, F: Scalar> {
    columns: Vec<&'a Array1<F>>,
    is_discrete: Vec<bool>,
    root: Option<Box<VpTreeNode<F>>>,
    leaf_capacity: usize,
    num_rows: usize,
}

impl<'a, F: Scalar> VpTree<'a, F> {
    /// Build the index over every row of the given columns.
    ///
    /// The build cannot fail for finite column data: degenerate duplicate
    /// clusters collapse into a single leaf instead of recursing.
    pub fn build(
        columns: Vec<&'a Array1<F>>,
        is_discrete: &[bool],
        leaf_capacity: usize,
        seed: u64,
    ) -> Self {
        let num_rows = columns.first().map_or(0, |c| c.len());
        let leaf_capacity = leaf_capacity.max(1);
        let distance = HybridChebyshevDistance::new(&columns, is_discrete);
        let mut rng = StdRng::seed_from_u64(seed);
        let indices: Vec<usize> = (0..num_rows).collect();
        let root = build_node(&distance, indices, leaf_capacity, &mut rng);
        Self {
            columns,
            is_discrete: is_discrete.to_vec(),
            root,
            leaf_capacity,
            num_rows,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn leaf_capacity(&self) -> usize {
        self.leaf_capacity
    }

    pub fn root(&self) -> Option<&VpTreeNode<F>> {
        self.root.as_deref()
    }

    /// Exact k-nearest-neighbor query for every probe row.
    ///
    /// Returns per probe row the `(distances, row indices)` of the nearest
    /// indexed rows, ascending by distance. Exact ties with the k-th best
    /// distance are all returned, so each result holds at least `k` entries.
    /// The probe columns must share the training schema; they may hold
    /// different rows.
    pub fn query(
        &self,
        probe: &[&Array1<F>],
        k: usize,
    ) -> Result<Vec<(Array1<F>, Array1<usize>)>> {
        if k == 0 || k >= self.num_rows {
            return Err(Error::InvalidNeighborCount {
                k,
                n: self.num_rows,
            });
        }
        if probe.len() != self.columns.len() {
            return Err(Error::ColumnCountMismatch {
                expected: self.columns.len(),
                actual: probe.len(),
            });
        }
        let distance = HybridChebyshevDistance::between(&self.columns, probe, &self.is_discrete);
        let num_probe_rows = probe.first().map_or(0, |c| c.len());

        let mut results = Vec::with_capacity(num_probe_rows);
        for probe_row in 0..num_probe_rows {
            results.push(self.query_instance(probe_row, k, &distance));
        }
        Ok(results)
    }

    fn query_instance(
        &self,
        probe_row: usize,
        k: usize,
        distance: &HybridChebyshevDistance<'_, F>,
    ) -> (Array1<F>, Array1<usize>) {
        let mut neighborhood: BinaryHeap<Neighbor<F>> = BinaryHeap::with_capacity(k + 1);
        let mut neighborhood_star: Vec<Neighbor<F>> = Vec::new();
        let mut distance_upper_bound = F::infinity();

        let mut pending = BinaryHeap::new();
        if let Some(root) = self.root.as_deref() {
            pending.push(PendingSubtree {
                node: root,
                min_distance: F::zero(),
            });
        }

        while let Some(PendingSubtree { node, .. }) = pending.pop() {
            let single_storage;
            let batch: &[usize] = match node {
                VpTreeNode::Leaf { indices } => indices,
                VpTreeNode::Internal { vantage, .. } => {
                    single_storage = [*vantage];
                    &single_storage
                }
            };
            let batch_len = batch.len();
            let mut last_distance = F::zero();

            for (pos, &candidate) in batch.iter().enumerate() {
                let d = distance.distance(candidate, probe_row);
                last_distance = d;

                if neighborhood.len() == k {
                    if d < distance_upper_bound {
                        neighborhood.pop();
                        neighborhood.push(Neighbor {
                            distance: d,
                            index: candidate,
                        });
                        // The tie list is pinned to the previous k-th best
                        // distance; discard it once the bound moves below it.
                        let stale = neighborhood_star.first().map(|n| n.distance);
                        let top = neighborhood.peek().map(|n| n.distance);
                        if let (Some(stale), Some(top)) = (stale, top) {
                            if stale > top {
                                neighborhood_star.clear();
                            }
                        }
                    } else if d == distance_upper_bound {
                        if batch_len > self.leaf_capacity {
                            // Oversized batches only arise from degenerate
                            // duplicate clusters, so the rest of the batch
                            // ties at this distance as well.
                            for &rest in &batch[pos..] {
                                neighborhood_star.push(Neighbor {
                                    distance: d,
                                    index: rest,
                                });
                            }
                            distance_upper_bound = d;
                            break;
                        }
                        neighborhood_star.push(Neighbor {
                            distance: d,
                            index: candidate,
                        });
                    }
                } else {
                    neighborhood.push(Neighbor {
                        distance: d,
                        index: candidate,
                    });
                }

                if neighborhood.len() == k {
                    if let Some(top) = neighborhood.peek() {
                        distance_upper_bound = top.distance;
                    }
                }
            }

            if let VpTreeNode::Internal {
                threshold,
                left,
                right,
                ..
            } = node
            {
                let left_bound = (last_distance - *threshold).max(F::zero());
                if let Some(child) = left.as_deref() {
                    if left_bound <= distance_upper_bound {
                        pending.push(PendingSubtree {
                            node: child,
                            min_distance: left_bound,
                        });
                    }
                }
                let right_bound = (*threshold - last_distance).max(F::zero());
                if let Some(child) = right.as_deref() {
                    if right_bound <= distance_upper_bound {
                        pending.push(PendingSubtree {
                            node: child,
                            min_distance: right_bound,
                        });
                    }
                }
            }
        }

        let k_hat = neighborhood.len() + neighborhood_star.len();
        let mut distances = vec![F::zero(); k_hat];
        let mut indices = vec![0usize; k_hat];
        let mut u = k_hat;
        for neighbor in neighborhood_star.drain(..).rev() {
            u -= 1;
            distances[u] = neighbor.distance;
            indices[u] = neighbor.index;
        }
        while let Some(neighbor) = neighborhood.pop() {
            u -= 1;
            distances[u] = neighbor.distance;
            indices[u] = neighbor.index;
        }

        (Array1::from(distances), Array1::from(indices))
    }

    /// Count, per probe row, the indexed rows within `eps[row]` under the
    /// full hybrid distance over the probe columns. Boundary inclusive.
    ///
    /// Distances are evaluated within the probe frame on both sides, so the
    /// probe frame must carry the indexed rows (the estimator always queries
    /// a tree with the frame it was built from, possibly widened by extra
    /// columns).
    pub fn count_ball_unconditional(
        &self,
        probe: &[&Array1<F>],
        is_discrete: &[bool],
        eps: &[F],
    ) -> Result<Array1<usize>> {
        if probe.len() != self.columns.len() {
            return Err(Error::ColumnCountMismatch {
                expected: self.columns.len(),
                actual: probe.len(),
            });
        }
        let num_probe_rows = probe.first().map_or(0, |c| c.len());
        if eps.len() != num_probe_rows {
            return Err(Error::RowCountMismatch {
                name: "eps",
                expected: num_probe_rows,
                actual: eps.len(),
            });
        }
        let distance = HybridChebyshevDistance::new(probe, is_discrete);

        let mut counts = Vec::with_capacity(num_probe_rows);
        for probe_row in 0..num_probe_rows {
            counts.push(self.count_unconditional_instance(probe_row, eps[probe_row], &distance));
        }
        Ok(Array1::from(counts))
    }

    fn count_unconditional_instance(
        &self,
        probe_row: usize,
        eps: F,
        distance: &HybridChebyshevDistance<'_, F>,
    ) -> usize {
        let mut count = 0usize;

        let mut pending = BinaryHeap::new();
        if let Some(root) = self.root.as_deref() {
            pending.push(PendingSubtree {
                node: root,
                min_distance: F::zero(),
            });
        }

        while let Some(PendingSubtree { node, .. }) = pending.pop() {
            let single_storage;
            let batch: &[usize] = match node {
                VpTreeNode::Leaf { indices } => indices,
                VpTreeNode::Internal { vantage, .. } => {
                    single_storage = [*vantage];
                    &single_storage
                }
            };
            let mut last_distance = F::zero();

            // Leaf members are in no particular order, so every batch is
            // scanned in full.
            for &candidate in batch {
                let d = distance.distance(candidate, probe_row);
                last_distance = d;
                if d <= eps {
                    count += 1;
                }
            }

            self.push_children_within(node, last_distance, eps, &mut pending);
        }

        count
    }

    /// Simultaneous subspace counts for a conditioning layout.
    ///
    /// The probe frame is laid out `[x, y, z...]` while the tree indexes the
    /// z columns alone. Per probe row, counts the indexed rows within
    /// `eps[row]` on the z subspace (`n_z`) and, among those, the rows also
    /// within `eps[row]` on x (`n_xz`) and on y (`n_yz`). The z-subspace
    /// distance drives the pruning bound; x and y are cheap point tests on
    /// rows already inside the z ball. Boundary inclusive.
    pub fn count_ball_subspaces(
        &self,
        probe: &[&Array1<F>],
        is_discrete: &[bool],
        eps: &[F],
    ) -> Result<(Array1<usize>, Array1<usize>, Array1<usize>)> {
        let num_z = self.columns.len();
        if probe.len() != num_z + 2 {
            return Err(Error::ColumnCountMismatch {
                expected: num_z + 2,
                actual: probe.len(),
            });
        }
        let num_probe_rows = probe.first().map_or(0, |c| c.len());
        if eps.len() != num_probe_rows {
            return Err(Error::RowCountMismatch {
                name: "eps",
                expected: num_probe_rows,
                actual: eps.len(),
            });
        }
        let distance = HybridChebyshevDistance::new(probe, is_discrete);
        let z_coords: Vec<usize> = (2..2 + num_z).collect();

        let mut count_xz = Vec::with_capacity(num_probe_rows);
        let mut count_yz = Vec::with_capacity(num_probe_rows);
        let mut count_z = Vec::with_capacity(num_probe_rows);
        for probe_row in 0..num_probe_rows {
            let (xz, yz, z) =
                self.count_subspaces_instance(probe_row, eps[probe_row], &distance, &z_coords);
            count_xz.push(xz);
            count_yz.push(yz);
            count_z.push(z);
        }
        Ok((
            Array1::from(count_xz),
            Array1::from(count_yz),
            Array1::from(count_z),
        ))
    }

    fn count_subspaces_instance(
        &self,
        probe_row: usize,
        eps: F,
        distance: &HybridChebyshevDistance<'_, F>,
        z_coords: &[usize],
    ) -> (usize, usize, usize) {
        let mut count_xz = 0usize;
        let mut count_yz = 0usize;
        let mut count_z = 0usize;

        let mut pending = BinaryHeap::new();
        if let Some(root) = self.root.as_deref() {
            pending.push(PendingSubtree {
                node: root,
                min_distance: F::zero(),
            });
        }

        while let Some(PendingSubtree { node, .. }) = pending.pop() {
            let single_storage;
            let batch: &[usize] = match node {
                VpTreeNode::Leaf { indices } => indices,
                VpTreeNode::Internal { vantage, .. } => {
                    single_storage = [*vantage];
                    &single_storage
                }
            };
            let mut last_z_distance = F::zero();

            // Full batch scan; leaf members are in no particular order.
            for &candidate in batch {
                let d_z = distance.distance_coords(candidate, probe_row, z_coords);
                last_z_distance = d_z;
                if d_z <= eps {
                    count_z += 1;
                    if distance.distance_coords(candidate, probe_row, &[0]) <= eps {
                        count_xz += 1;
                    }
                    if distance.distance_coords(candidate, probe_row, &[1]) <= eps {
                        count_yz += 1;
                    }
                }
            }

            self.push_children_within(node, last_z_distance, eps, &mut pending);
        }

        (count_xz, count_yz, count_z)
    }

    /// Push the children whose lower bound does not exceed the radius. The
    /// bound is derived from the vantage point distance evaluated last (for
    /// internal nodes the vantage point itself; leaves have no children).
    fn push_children_within<'t>(
        &self,
        node: &'t VpTreeNode<F>,
        vantage_distance: F,
        radius: F,
        pending: &mut BinaryHeap<PendingSubtree<'t, F>>,
    ) {
        if let VpTreeNode::Internal {
            threshold,
            left,
            right,
            ..
        } = node
        {
            let left_bound = (vantage_distance - *threshold).max(F::zero());
            if let Some(child) = left.as_deref() {
                if left_bound <= radius {
                    pending.push(PendingSubtree {
                        node: child,
                        min_distance: left_bound,
                    });
                }
            }
            let right_bound = (*threshold - vantage_distance).max(F::zero());
            if let Some(child) = right.as_deref() {
                if right_bound <= radius {
                    pending.push(PendingSubtree {
                        node: child,
                        min_distance: right_bound,
                    });
                }
            }
        }
    }
}
