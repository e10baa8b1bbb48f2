pub mod common;
pub mod hybrid_knn;

// Unified re-exports for the common types so tests and users can import
// mixedmi::estimators::approaches::* ergonomically.
pub use common::dataset::{Column, ContinuousValues, MixedDataFrame, Precision};
pub use common::scalar::Scalar;

pub use hybrid_knn::distance::HybridChebyshevDistance;
pub use hybrid_knn::msk::{MskMutualInformation, MskOptions};
pub use hybrid_knn::vptree::{VpTree, VpTreeNode};
