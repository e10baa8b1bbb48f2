use mixedmi::Error;
use mixedmi::estimators::approaches::VpTree;
use ndarray::{Array1, array};

use crate::test_helpers::{hybrid_distance, mixed_columns, uniform_column};

#[test]
fn radius_counts_match_brute_force() {
    for seed in 0..3u64 {
        let (columns, flags) = mixed_columns(70, 2, 1, 3, seed);
        let refs: Vec<&Array1<f64>> = columns.iter().collect();
        let tree = VpTree::build(refs.clone(), &flags, 8, seed);

        let radii = uniform_column(70, seed.wrapping_add(7)).mapv(|v| v * 0.5);
        let eps: Vec<f64> = radii.to_vec();
        let counts = tree.count_ball_unconditional(&refs, &flags, &eps).unwrap();

        for i in 0..70 {
            let brute = (0..70)
                .filter(|&j| hybrid_distance(&columns, &flags, j, i) <= eps[i])
                .count();
            assert_eq!(counts[i], brute, "probe row {i}");
        }
    }
}

#[test]
fn radius_counts_are_boundary_inclusive() {
    let x = array![0.0, 0.3, 0.6, 1.0];
    let refs = [&x];
    let tree = VpTree::build(refs.to_vec(), &[false], 2, 4);

    // eps equal to an exact pairwise distance must count that row.
    let eps = vec![0.3, 0.3, 0.3, 0.3];
    let counts = tree.count_ball_unconditional(&refs, &[false], &eps).unwrap();
    assert_eq!(counts.to_vec(), vec![2, 3, 2, 1]);
}

#[test]
fn subspace_counts_match_brute_force() {
    for seed in 0..3u64 {
        // Probe layout [x, y, z1, z2]; the tree indexes the z columns alone.
        let (columns, flags) = mixed_columns(60, 3, 1, 3, seed);
        let refs: Vec<&Array1<f64>> = columns.iter().collect();
        let z_refs: Vec<&Array1<f64>> = refs[2..].to_vec();
        let z_flags = &flags[2..];
        let tree = VpTree::build(z_refs, z_flags, 8, seed);

        let eps: Vec<f64> = uniform_column(60, seed.wrapping_add(13))
            .mapv(|v| 0.05 + v * 0.4)
            .to_vec();
        let (n_xz, n_yz, n_z) = tree.count_ball_subspaces(&refs, &flags, &eps).unwrap();

        let z_columns = &columns[2..];
        for i in 0..60 {
            let mut brute_z = 0;
            let mut brute_xz = 0;
            let mut brute_yz = 0;
            for j in 0..60 {
                if hybrid_distance(z_columns, z_flags, j, i) <= eps[i] {
                    brute_z += 1;
                    if hybrid_distance(&columns[..1], &flags[..1], j, i) <= eps[i] {
                        brute_xz += 1;
                    }
                    if hybrid_distance(&columns[1..2], &flags[1..2], j, i) <= eps[i] {
                        brute_yz += 1;
                    }
                }
            }
            assert_eq!(n_z[i], brute_z, "n_z, probe row {i}");
            assert_eq!(n_xz[i], brute_xz, "n_xz, probe row {i}");
            assert_eq!(n_yz[i], brute_yz, "n_yz, probe row {i}");

            // Subspace containment monotonicity.
            assert!(n_z[i] >= n_xz[i]);
            assert!(n_z[i] >= n_yz[i]);
        }
    }
}

#[test]
fn counting_validates_shapes() {
    let x = array![0.0, 0.5, 1.0];
    let refs = [&x];
    let tree = VpTree::build(refs.to_vec(), &[false], 16, 2);

    assert!(matches!(
        tree.count_ball_unconditional(&refs, &[false], &[0.1, 0.1]),
        Err(Error::RowCountMismatch { .. })
    ));
    assert!(matches!(
        tree.count_ball_unconditional(&[&x, &x], &[false, false], &[0.1, 0.1, 0.1]),
        Err(Error::ColumnCountMismatch { .. })
    ));
    // A subspace probe must provide exactly x, y and the indexed z columns.
    assert!(matches!(
        tree.count_ball_subspaces(&[&x, &x], &[false, false], &[0.1, 0.1, 0.1]),
        Err(Error::ColumnCountMismatch { expected: 3, actual: 2 })
    ));
}
