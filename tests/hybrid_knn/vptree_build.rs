use mixedmi::estimators::approaches::{HybridChebyshevDistance, VpTree, VpTreeNode};
use ndarray::Array1;

use crate::test_helpers::mixed_columns;

/// Walk a subtree, asserting the partition invariant at every internal node,
/// and return every row index it contains.
fn collect_checked(
    node: &VpTreeNode<f64>,
    distance: &HybridChebyshevDistance<'_, f64>,
) -> Vec<usize> {
    match node {
        VpTreeNode::Leaf { indices } => indices.clone(),
        VpTreeNode::Internal {
            vantage,
            threshold,
            left,
            right,
        } => {
            let mut all = vec![*vantage];
            if let Some(left) = left {
                for idx in collect_checked(left, distance) {
                    assert!(
                        distance.distance(idx, *vantage) < *threshold,
                        "left subtree row {idx} not strictly inside the vantage ball"
                    );
                    all.push(idx);
                }
            }
            if let Some(right) = right {
                for idx in collect_checked(right, distance) {
                    assert!(
                        distance.distance(idx, *vantage) >= *threshold,
                        "right subtree row {idx} inside the vantage ball"
                    );
                    all.push(idx);
                }
            }
            all
        }
    }
}

#[test]
fn partition_invariant_holds_on_random_mixed_data() {
    for seed in 0..4u64 {
        let (columns, flags) = mixed_columns(60, 2, 2, 3, seed);
        let refs: Vec<&Array1<f64>> = columns.iter().collect();
        let tree = VpTree::build(refs.clone(), &flags, 4, seed);

        let distance = HybridChebyshevDistance::new(&refs, &flags);
        let mut indices = collect_checked(tree.root().unwrap(), &distance);
        indices.sort_unstable();
        let expected: Vec<usize> = (0..60).collect();
        assert_eq!(indices, expected, "every row appears exactly once");
    }
}

#[test]
fn small_set_becomes_a_single_leaf() {
    let (columns, flags) = mixed_columns(5, 1, 1, 2, 11);
    let refs: Vec<&Array1<f64>> = columns.iter().collect();
    let tree = VpTree::build(refs, &flags, 8, 11);
    match tree.root().unwrap() {
        VpTreeNode::Leaf { indices } => assert_eq!(indices.len(), 5),
        VpTreeNode::Internal { .. } => panic!("expected a leaf root"),
    }
}

#[test]
fn identical_rows_collapse_to_one_leaf() {
    // All rows coincide under the metric, so the build must not split,
    // whatever the leaf capacity.
    let continuous = Array1::from_elem(12, 0.4);
    let codes = Array1::from_elem(12, 2.0);
    let columns = [&continuous, &codes];
    let tree = VpTree::build(columns.to_vec(), &[false, true], 2, 5);
    match tree.root().unwrap() {
        VpTreeNode::Leaf { indices } => {
            let mut indices = indices.clone();
            indices.sort_unstable();
            assert_eq!(indices, (0..12).collect::<Vec<_>>());
        }
        VpTreeNode::Internal { .. } => panic!("degenerate data must collapse to a single leaf"),
    }
}

#[test]
fn same_seed_builds_the_same_tree() {
    fn shape(node: &VpTreeNode<f64>) -> Vec<(usize, bool)> {
        match node {
            VpTreeNode::Leaf { indices } => indices.iter().map(|&i| (i, true)).collect(),
            VpTreeNode::Internal {
                vantage,
                left,
                right,
                ..
            } => {
                let mut out = vec![(*vantage, false)];
                if let Some(left) = left {
                    out.extend(shape(left));
                }
                if let Some(right) = right {
                    out.extend(shape(right));
                }
                out
            }
        }
    }

    let (columns, flags) = mixed_columns(40, 2, 1, 3, 21);
    let refs: Vec<&Array1<f64>> = columns.iter().collect();
    let a = VpTree::build(refs.clone(), &flags, 4, 99);
    let b = VpTree::build(refs, &flags, 4, 99);
    assert_eq!(shape(a.root().unwrap()), shape(b.root().unwrap()));
}
