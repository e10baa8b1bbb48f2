// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # mixedmi
//!
//! Mutual information estimation for mixed discrete/continuous data, built on
//! an exact vantage-point tree index under a hybrid Chebyshev metric.
//!
//! ## Quick Start
//!
//! ```rust
//! use mixedmi::estimators::approaches::{Column, MixedDataFrame};
//! use mixedmi::estimators::approaches::{MskMutualInformation, MskOptions};
//! use ndarray::array;
//!
//! let df = MixedDataFrame::new(vec![
//!     ("x".into(), Column::continuous_f64(array![0.0, 0.1, 0.2, 0.8, 0.9])),
//!     ("y".into(), Column::discrete(array![0, 0, 0, 1, 1])),
//! ])
//! .unwrap();
//!
//! let options = MskOptions { k: 2, seed: 7, ..Default::default() };
//! let est = MskMutualInformation::new(&df, options).unwrap();
//! let mi = est.mi("x", "y").unwrap();
//! assert!(mi.is_finite());
//! ```
//!
//! ## Estimation Approach
//!
//! The hybrid k-NN approach generalises the Kraskov-Stögbauer-Grassberger
//! neighbour-counting estimator to datasets that mix categorical and
//! continuous columns. Discrete columns contribute a Hamming indicator to the
//! distance, continuous columns an absolute difference, combined by the
//! Chebyshev maximum. Exact distance ties (which occur with nonzero
//! probability for discrete columns) are returned in full, so the per-row
//! neighbour count `k_hat` may exceed the requested `k`.
//!
//! ## Architecture
//!
//! 1. **Public API Layer**: the [`estimators::mutual_information::MutualInformation`]
//!    factory and the reusable [`estimators::approaches::MskMutualInformation`]
//!    engine.
//! 2. **Estimation Approach**: `estimators::approaches::hybrid_knn` — the
//!    vantage-point tree, the hybrid metric, and the digamma reduction.
//! 3. **Core Infrastructure**: shared traits and the mixed columnar frame in
//!    `estimators::approaches::common`.
//!
//! Both single and double precision column data are supported; the precision
//! is fixed once when a frame is ingested and every internal algorithm is
//! generic over it.

use thiserror::Error;

pub mod estimators;

/// Error types for frame validation and estimator configuration.
///
/// Every variant is fatal to the enclosing call: nothing is retried and no
/// partial result is produced. Degenerate duplicate clusters and exact
/// distance ties are *not* errors; they are handled by dedicated branches in
/// the index and query code.
#[derive(Debug, Error)]
pub enum Error {
    #[error("column \"{name}\" has {actual} rows, expected {expected}")]
    ColumnLengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate column \"{0}\"")]
    DuplicateColumn(String),

    #[error("column \"{0}\" not found in the data frame")]
    MissingColumn(String),

    #[error("continuous columns mix single and double precision")]
    MixedPrecision,

    #[error("constant continuous column \"{0}\"")]
    ConstantColumn(String),

    #[error("\"k\" value ({k}) must be at least 1 and smaller than the indexed row count ({n})")]
    InvalidNeighborCount { k: usize, n: usize },

    #[error("probe data has {actual} columns, the index expects {expected}")]
    ColumnCountMismatch { expected: usize, actual: usize },

    #[error("{name} must have one value per probe row ({expected}), got {actual}")]
    RowCountMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("conditional mutual information requires at least one conditioning column")]
    EmptyConditioningSet,
}

pub type Result<T> = std::result::Result<T, Error>;
