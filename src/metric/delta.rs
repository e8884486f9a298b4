//! The absolute-difference metric over scalar nodes.

use ordered_float::OrderedFloat;

use crate::core::graph::GraphError;

use super::Metric;

/// Measures scalar nodes by their absolute difference, `|a - b|`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeltaMetric;

impl DeltaMetric {
    /// Returns the median of the given nodes.
    ///
    /// Err:
    ///
    /// * `InvalidArgument` if `xs` is empty.
    pub fn median(&self, xs: &[OrderedFloat<f64>]) -> Result<OrderedFloat<f64>, GraphError> {
        if xs.is_empty() {
            return Err(GraphError::InvalidArgument(
                "median of an empty set of nodes".to_string(),
            ));
        }
        let mut sorted = xs.to_vec();
        sorted.sort();
        Ok(sorted[sorted.len() / 2])
    }
}

impl Metric<i64, i64> for DeltaMetric {
    fn distance(&self, a: &i64, b: &i64) -> Result<i64, GraphError> {
        Ok((a - b).abs())
    }
}

impl Metric<OrderedFloat<f64>, f64> for DeltaMetric {
    fn distance(&self, a: &OrderedFloat<f64>, b: &OrderedFloat<f64>) -> Result<f64, GraphError> {
        Ok((a.into_inner() - b.into_inner()).abs())
    }

    fn mean(&self, xs: &[OrderedFloat<f64>]) -> Result<OrderedFloat<f64>, GraphError> {
        if xs.is_empty() {
            return Err(GraphError::InvalidArgument(
                "mean of an empty set of nodes".to_string(),
            ));
        }
        let total: f64 = xs.iter().map(|x| x.into_inner()).sum();
        Ok(OrderedFloat(total / xs.len() as f64))
    }
}

/// A [`DeltaMetric`] that also recomputes distances incrementally for
/// drifting virtual probes.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncrementalDeltaMetric;

impl Metric<OrderedFloat<f64>, f64> for IncrementalDeltaMetric {
    fn distance(&self, a: &OrderedFloat<f64>, b: &OrderedFloat<f64>) -> Result<f64, GraphError> {
        DeltaMetric.distance(a, b)
    }

    fn mean(&self, xs: &[OrderedFloat<f64>]) -> Result<OrderedFloat<f64>, GraphError> {
        DeltaMetric.mean(xs)
    }

    fn update(
        &self,
        center: &OrderedFloat<f64>,
        dynamic: &OrderedFloat<f64>,
        changes: &[OrderedFloat<f64>],
        _base: f64,
    ) -> Result<f64, GraphError> {
        let drift: f64 = changes.iter().map(|change| change.into_inner()).sum();
        let shifted = OrderedFloat(dynamic.into_inner() + drift);
        self.distance(center, &shifted)
    }
}
