// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use ndarray::Array1;

use super::scalar::Scalar;
use crate::{Error, Result};

/// Continuous column storage in one of the two supported precisions.
#[derive(Debug, Clone)]
pub enum ContinuousValues {
    F32(Array1<f32>),
    F64(Array1<f64>),
}

impl ContinuousValues {
    pub fn len(&self) -> usize {
        match self {
            ContinuousValues::F32(values) => values.len(),
            ContinuousValues::F64(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Minimum and maximum of the column, or `None` for an empty column.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        fn fold<T: Copy + Into<f64>>(values: &Array1<T>) -> Option<(f64, f64)> {
            values.iter().fold(None, |acc, &v| {
                let v: f64 = v.into();
                Some(match acc {
                    None => (v, v),
                    Some((min, max)) => (min.min(v), max.max(v)),
                })
            })
        }
        match self {
            ContinuousValues::F32(values) => fold(values),
            ContinuousValues::F64(values) => fold(values),
        }
    }
}

/// Storage precision of the continuous columns of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Single,
    Double,
}

/// A column of a [`MixedDataFrame`]: continuous measurements or integer
/// category codes.
#[derive(Debug, Clone)]
pub enum Column {
    Continuous(ContinuousValues),
    Discrete(Array1<i32>),
}

impl Column {
    pub fn continuous_f32(values: Array1<f32>) -> Self {
        Column::Continuous(ContinuousValues::F32(values))
    }

    pub fn continuous_f64(values: Array1<f64>) -> Self {
        Column::Continuous(ContinuousValues::F64(values))
    }

    pub fn discrete(codes: Array1<i32>) -> Self {
        Column::Discrete(codes)
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Continuous(values) => values.len(),
            Column::Discrete(codes) => codes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_discrete(&self) -> bool {
        matches!(self, Column::Discrete(_))
    }
}

/// Named, typed, equal-length columns: the dataset consumed by the hybrid
/// k-NN estimator.
///
/// The frame owns its column data; the index and the estimator only ever
/// borrow it. Discreteness is a property of the column type and is fixed at
/// construction.
#[derive(Debug, Clone)]
pub struct MixedDataFrame {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl MixedDataFrame {
    /// Build a frame from named columns.
    ///
    /// Fails if a name repeats or the columns disagree on length.
    pub fn new(columns: Vec<(String, Column)>) -> Result<Self> {
        let mut names = Vec::with_capacity(columns.len());
        let mut cols = Vec::with_capacity(columns.len());
        let expected = columns.first().map_or(0, |(_, c)| c.len());
        for (name, column) in columns {
            if names.contains(&name) {
                return Err(Error::DuplicateColumn(name));
            }
            if column.len() != expected {
                return Err(Error::ColumnLengthMismatch {
                    name,
                    expected,
                    actual: column.len(),
                });
            }
            names.push(name);
            cols.push(column);
        }
        Ok(Self {
            names,
            columns: cols,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.column_position(name).map(|pos| &self.columns[pos])
    }

    pub fn column_position(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| Error::MissingColumn(name.to_owned()))
    }

    pub fn is_discrete(&self, name: &str) -> Result<bool> {
        self.column(name).map(Column::is_discrete)
    }

    /// Contract check: every requested column must exist.
    pub fn raise_has_columns(&self, names: &[&str]) -> Result<()> {
        for name in names {
            self.column_position(name)?;
        }
        Ok(())
    }

    /// The shared precision of the continuous columns.
    ///
    /// Fails if single and double precision columns are mixed. A frame with
    /// no continuous column defaults to single precision.
    pub fn continuous_precision(&self) -> Result<Precision> {
        let mut precision = None;
        for column in &self.columns {
            let current = match column {
                Column::Continuous(ContinuousValues::F32(_)) => Precision::Single,
                Column::Continuous(ContinuousValues::F64(_)) => Precision::Double,
                Column::Discrete(_) => continue,
            };
            match precision {
                None => precision = Some(current),
                Some(previous) if previous != current => return Err(Error::MixedPrecision),
                Some(_) => {}
            }
        }
        Ok(precision.unwrap_or(Precision::Single))
    }

    /// Materialise every column in the working precision `F`.
    ///
    /// Continuous columns are min-max normalised to `[0, 1]` (or passed
    /// through unscaled when `min_max_scale` is off); a constant continuous
    /// column is a fatal configuration error. Discrete columns pass through
    /// as category codes cast to `F`.
    pub fn scaled_columns<F: Scalar>(&self, min_max_scale: bool) -> Result<Vec<Array1<F>>> {
        let mut scaled = Vec::with_capacity(self.columns.len());
        for (name, column) in self.names.iter().zip(&self.columns) {
            scaled.push(match column {
                Column::Discrete(codes) => codes.mapv(F::from_i32),
                Column::Continuous(values) => {
                    let (min, max) = values
                        .min_max()
                        .filter(|(min, max)| max != min)
                        .ok_or_else(|| Error::ConstantColumn(name.clone()))?;
                    let as_f64 = |v: f64| {
                        if min_max_scale {
                            F::from_f64((v - min) / (max - min))
                        } else {
                            F::from_f64(v)
                        }
                    };
                    match values {
                        ContinuousValues::F32(v) => v.mapv(|v| as_f64(f64::from(v))),
                        ContinuousValues::F64(v) => v.mapv(as_f64),
                    }
                }
            });
        }
        Ok(scaled)
    }
}
