// Clustering: BIRCH over document vectors, scored by silhouette.

pub mod birch;
pub mod engine;
pub mod silhouette;
pub mod traits;

pub use birch::Birch;
pub use engine::{best, cluster_once, materialize_clusters, score_once, sweep, ClusterResult, Score};
pub use traits::Clustering;
