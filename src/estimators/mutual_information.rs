use ndarray::Array1;

use crate::Result;
use crate::estimators::approaches::common::dataset::MixedDataFrame;
use crate::estimators::approaches::hybrid_knn::msk::{MskMutualInformation, MskOptions};
use crate::estimators::traits::{
    ConditionalMutualInformationEstimator, GlobalValue, LocalValues, MutualInformationEstimator,
    OptionalLocalValues,
};

/// Mutual information estimation methods for various data types
///
/// This struct provides static methods for creating mutual information
/// estimators for different data layouts. Estimates are computed eagerly so
/// every configuration error surfaces at construction; the returned values
/// expose the result through [`GlobalValue`] and [`LocalValues`].
pub struct MutualInformation;

impl MutualInformation {
    /// Creates a pairwise hybrid k-NN mutual information estimate between
    /// two named columns of a mixed data frame.
    pub fn new_hybrid_knn(
        df: &MixedDataFrame,
        x: &str,
        y: &str,
        options: MskOptions,
    ) -> Result<HybridKnnMi> {
        let engine = MskMutualInformation::new(df, options)?;
        Ok(HybridKnnMi {
            locals: engine.mi_local(x, y)?,
        })
    }

    /// Creates a conditional hybrid k-NN mutual information estimate between
    /// `x` and `y` given the conditioning columns `z`.
    pub fn new_hybrid_knn_conditional(
        df: &MixedDataFrame,
        x: &str,
        y: &str,
        z: &[&str],
        options: MskOptions,
    ) -> Result<HybridKnnCmi> {
        let engine = MskMutualInformation::new(df, options)?;
        Ok(HybridKnnCmi {
            locals: engine.cmi_local(x, y, z)?,
        })
    }
}

/// Pairwise hybrid k-NN mutual information estimate.
pub struct HybridKnnMi {
    locals: Array1<f64>,
}

impl GlobalValue for HybridKnnMi {
    fn global_value(&self) -> f64 {
        self.global_from_local()
    }
}

impl LocalValues for HybridKnnMi {
    fn local_values(&self) -> Array1<f64> {
        self.locals.clone()
    }
}

impl OptionalLocalValues for HybridKnnMi {
    fn supports_local(&self) -> bool {
        true
    }

    fn local_values_opt(&self) -> std::result::Result<Array1<f64>, &'static str> {
        Ok(self.local_values())
    }
}

impl MutualInformationEstimator for HybridKnnMi {}

/// Conditional hybrid k-NN mutual information estimate.
pub struct HybridKnnCmi {
    locals: Array1<f64>,
}

impl GlobalValue for HybridKnnCmi {
    fn global_value(&self) -> f64 {
        self.global_from_local()
    }
}

impl LocalValues for HybridKnnCmi {
    fn local_values(&self) -> Array1<f64> {
        self.locals.clone()
    }
}

impl OptionalLocalValues for HybridKnnCmi {
    fn supports_local(&self) -> bool {
        true
    }

    fn local_values_opt(&self) -> std::result::Result<Array1<f64>, &'static str> {
        Ok(self.local_values())
    }
}

impl ConditionalMutualInformationEstimator for HybridKnnCmi {}
