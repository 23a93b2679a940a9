use crate::error::Result;

/// Common interface for hard clustering algorithms (one label per point).
pub trait Clustering {
    /// Fit the model and return one cluster label per input point.
    ///
    /// Labels are contiguous from 0; the cluster count follows from the data.
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>>;
}
