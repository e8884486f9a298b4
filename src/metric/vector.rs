//! The Euclidean metric over vector nodes.

use ordered_float::OrderedFloat;

use crate::core::graph::GraphError;

use super::Metric;

/// Measures vector nodes by their Euclidean distance.
///
/// Nodes are vectors of [`OrderedFloat`] components so they remain hashable
/// graph members; the distance itself is computed by
/// [`distances::vectors::euclidean`]. Vectors of differing dimensionality
/// and non-finite results are rejected rather than propagated as `NaN`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanMetric;

fn components(x: &[OrderedFloat<f64>]) -> Vec<f64> {
    x.iter().map(|value| value.into_inner()).collect()
}

impl Metric<Vec<OrderedFloat<f64>>, f64> for EuclideanMetric {
    fn distance(
        &self,
        a: &Vec<OrderedFloat<f64>>,
        b: &Vec<OrderedFloat<f64>>,
    ) -> Result<f64, GraphError> {
        if a.len() != b.len() {
            return Err(GraphError::InvalidArgument(format!(
                "cannot measure vectors of dimensionality {} and {}",
                a.len(),
                b.len()
            )));
        }
        let distance: f64 = distances::vectors::euclidean(&components(a), &components(b));
        if distance.is_finite() {
            Ok(distance)
        } else {
            Err(GraphError::InvalidArgument(
                "non-finite distance between vectors".to_string(),
            ))
        }
    }

    fn mean(&self, xs: &[Vec<OrderedFloat<f64>>]) -> Result<Vec<OrderedFloat<f64>>, GraphError> {
        let first = xs.first().ok_or_else(|| {
            GraphError::InvalidArgument("mean of an empty set of nodes".to_string())
        })?;
        let dimensionality = first.len();
        if xs.iter().any(|x| x.len() != dimensionality) {
            return Err(GraphError::InvalidArgument(
                "cannot average vectors of differing dimensionality".to_string(),
            ));
        }
        let mut sums = vec![0.0; dimensionality];
        for x in xs {
            for (sum, value) in sums.iter_mut().zip(x) {
                *sum += value.into_inner();
            }
        }
        Ok(sums
            .into_iter()
            .map(|sum| OrderedFloat(sum / xs.len() as f64))
            .collect())
    }

    fn update(
        &self,
        center: &Vec<OrderedFloat<f64>>,
        dynamic: &Vec<OrderedFloat<f64>>,
        changes: &[Vec<OrderedFloat<f64>>],
        _base: f64,
    ) -> Result<f64, GraphError> {
        let mut shifted = components(dynamic);
        for change in changes {
            if change.len() != shifted.len() {
                return Err(GraphError::InvalidArgument(
                    "drift of differing dimensionality".to_string(),
                ));
            }
            for (component, delta) in shifted.iter_mut().zip(change) {
                *component += delta.into_inner();
            }
        }
        let shifted: Vec<OrderedFloat<f64>> = shifted.into_iter().map(OrderedFloat).collect();
        self.distance(center, &shifted)
    }
}
