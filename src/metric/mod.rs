//! Metrics over node payloads.
//!
//! A [`Metric`] computes the distance between two node representations and
//! optionally supports the higher-order operations the virtual-probe facet
//! and the quality scorers rely on: a representative `mean` and an
//! incremental `update` for probes that have drifted by a known delta.

mod delta;
mod vector;

pub use delta::{DeltaMetric, IncrementalDeltaMetric};
pub use vector::EuclideanMetric;

use distances::Number;

use crate::core::graph::GraphError;

/// A distance function over node representations.
///
/// Distances are nonnegative. Inputs for which no distance can be
/// determined (diverging or mismatched representations, numeric overflow)
/// surface as an error rather than a silent `NaN`.
pub trait Metric<N, U: Number> {
    /// Returns the distance between the representations `a` and `b`.
    fn distance(&self, a: &N, b: &N) -> Result<U, GraphError>;

    /// Whether `distance(a, b) == distance(b, a)` for all inputs. The
    /// clustering engine assumes symmetric metrics.
    fn is_symmetric(&self) -> bool {
        true
    }

    /// Returns a representative mean of the given representations.
    ///
    /// Err:
    ///
    /// * `NoDistanceSupport` if the metric has no notion of a mean.
    /// * `InvalidArgument` if `xs` is empty; callers wanting a default
    ///   substitute it before calling.
    fn mean(&self, _xs: &[N]) -> Result<N, GraphError> {
        Err(GraphError::NoDistanceSupport)
    }

    /// Recomputes the distance between `center` and a dynamic point that
    /// has drifted by the given `changes`, starting from the previously
    /// known distance `base`.
    ///
    /// Implementations satisfy `update(c, x, d, base) == distance(c, x')`
    /// where `x'` is `x` with `d` applied.
    ///
    /// Err:
    ///
    /// * `NoDistanceSupport` if the metric cannot update incrementally.
    fn update(&self, _center: &N, _dynamic: &N, _changes: &[N], _base: U) -> Result<U, GraphError> {
        Err(GraphError::NoDistanceSupport)
    }
}
