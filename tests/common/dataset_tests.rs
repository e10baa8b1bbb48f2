use mixedmi::Error;
use mixedmi::estimators::approaches::{Column, MixedDataFrame, Precision};
use ndarray::array;

use crate::test_helpers::assert_abs_diff_eq;

fn two_column_frame() -> MixedDataFrame {
    MixedDataFrame::new(vec![
        (
            "a".into(),
            Column::continuous_f64(array![0.0, 2.0, 4.0, 8.0]),
        ),
        ("b".into(), Column::discrete(array![0, 1, 1, 2])),
    ])
    .unwrap()
}

#[test]
fn frame_reports_shape_and_flags() {
    let df = two_column_frame();
    assert_eq!(df.num_rows(), 4);
    assert_eq!(df.num_columns(), 2);
    assert!(!df.is_discrete("a").unwrap());
    assert!(df.is_discrete("b").unwrap());
    assert!(df.raise_has_columns(&["a", "b"]).is_ok());
}

#[test]
fn frame_rejects_length_mismatch() {
    let result = MixedDataFrame::new(vec![
        ("a".into(), Column::continuous_f64(array![0.0, 1.0])),
        ("b".into(), Column::discrete(array![0, 1, 2])),
    ]);
    assert!(matches!(
        result,
        Err(Error::ColumnLengthMismatch { expected: 2, actual: 3, .. })
    ));
}

#[test]
fn frame_rejects_duplicate_names() {
    let result = MixedDataFrame::new(vec![
        ("a".into(), Column::continuous_f64(array![0.0, 1.0])),
        ("a".into(), Column::discrete(array![0, 1])),
    ]);
    assert!(matches!(result, Err(Error::DuplicateColumn(_))));
}

#[test]
fn missing_column_is_reported() {
    let df = two_column_frame();
    assert!(matches!(df.column("c"), Err(Error::MissingColumn(_))));
    assert!(matches!(
        df.raise_has_columns(&["a", "c"]),
        Err(Error::MissingColumn(_))
    ));
}

#[test]
fn precision_follows_continuous_columns() {
    let df = two_column_frame();
    assert_eq!(df.continuous_precision().unwrap(), Precision::Double);

    let single = MixedDataFrame::new(vec![(
        "a".into(),
        Column::continuous_f32(array![0.0f32, 1.0, 2.0]),
    )])
    .unwrap();
    assert_eq!(single.continuous_precision().unwrap(), Precision::Single);

    // A frame without continuous columns defaults to single precision.
    let discrete_only =
        MixedDataFrame::new(vec![("b".into(), Column::discrete(array![0, 1, 0]))]).unwrap();
    assert_eq!(
        discrete_only.continuous_precision().unwrap(),
        Precision::Single
    );
}

#[test]
fn mixed_precision_is_rejected() {
    let df = MixedDataFrame::new(vec![
        ("a".into(), Column::continuous_f64(array![0.0, 1.0])),
        ("b".into(), Column::continuous_f32(array![0.0f32, 1.0])),
    ])
    .unwrap();
    assert!(matches!(
        df.continuous_precision(),
        Err(Error::MixedPrecision)
    ));
}

#[test]
fn scaling_normalises_continuous_columns() {
    let df = two_column_frame();
    let scaled = df.scaled_columns::<f64>(true).unwrap();

    // a = [0, 2, 4, 8] -> [0, 0.25, 0.5, 1]
    assert_abs_diff_eq!(scaled[0][0], 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(scaled[0][1], 0.25, epsilon = 1e-12);
    assert_abs_diff_eq!(scaled[0][2], 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(scaled[0][3], 1.0, epsilon = 1e-12);

    // Discrete codes pass through as casts.
    assert_eq!(scaled[1][0], 0.0);
    assert_eq!(scaled[1][3], 2.0);
}

#[test]
fn scaling_can_be_disabled() {
    let df = two_column_frame();
    let scaled = df.scaled_columns::<f64>(false).unwrap();
    assert_abs_diff_eq!(scaled[0][3], 8.0, epsilon = 1e-12);
}

#[test]
fn constant_continuous_column_is_fatal() {
    let df = MixedDataFrame::new(vec![(
        "a".into(),
        Column::continuous_f64(array![3.0, 3.0, 3.0]),
    )])
    .unwrap();
    // The check applies whether or not scaling is requested.
    assert!(matches!(
        df.scaled_columns::<f64>(true),
        Err(Error::ConstantColumn(_))
    ));
    assert!(matches!(
        df.scaled_columns::<f64>(false),
        Err(Error::ConstantColumn(_))
    ));
}
