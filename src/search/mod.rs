pub mod knn_index;
pub mod min_max_scaler;

// Re-export key structs for easier access from outside the search module
pub use knn_index::{KnnIndex, Neighbor};
pub use min_max_scaler::{MinMaxScaler, FEATURE_DIMENSION};
