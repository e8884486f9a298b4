//! Incremental, overlap-tolerant, density-based clustering over weighted
//! graphs.
//!
//! The engine partitions the nodes of a symmetric weighted graph into a
//! dynamic collection of clusters plus a residual noise set, and maintains
//! that partition under live edits: node and edge insertion and removal,
//! and edge-weight mutation. Clusters may overlap on border nodes. A
//! virtual-probe facet measures transient nodes against the current
//! clusters without admitting them to the graph.
//!
//! The substrate behind the engine is interchangeable: materialised
//! adjacency stores ([`AdjacencyGraph`], [`BoundedAdjacencyGraph`]) and
//! computed-distance stores deriving their edges from a [`Metric`]
//! ([`DistanceGraph`], [`CachedDistanceGraph`]). Distance matrices can be
//! loaded from CSV literals with [`CsvMatrixReader`], and clusterings can
//! be judged with the scores in [`quality`].
//!
//! ```
//! use graph_dbscan::{Clustering, DeltaMetric, DistanceGraph};
//!
//! // Nodes measured by |a - b|: one dense group and an outlier.
//! let graph = DistanceGraph::new(vec![1_i64, 2, 3, 4, 5, 6, 20], DeltaMetric);
//! let clustering = Clustering::new(graph, 5, 5).unwrap();
//!
//! assert_eq!(clustering.clusters().len(), 1);
//! assert_eq!(clustering.clusters()[0].core_nodes().len(), 6);
//! assert!(clustering.noise().contains(&20));
//! ```

mod core;
pub mod metric;
pub mod quality;

pub use crate::core::cluster::{Cluster, ClusterId, FrozenCluster, NodeRole};
pub use crate::core::clustering::Clustering;
pub use crate::core::graph::adjacency::{AdjacencyGraph, BoundedAdjacencyGraph};
pub use crate::core::graph::distance::{CachedDistanceGraph, DistanceGraph, MetricGraph};
pub use crate::core::graph::io::{parse_weight_literal, CsvHeader, CsvMatrixReader};
pub use crate::core::graph::{Edge, Graph, GraphError, GraphId};
pub use crate::core::probe::ProbeClustering;
pub use crate::metric::{DeltaMetric, EuclideanMetric, IncrementalDeltaMetric, Metric};
