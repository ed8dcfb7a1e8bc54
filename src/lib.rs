//! Dense matrix arithmetic and a single-hidden-layer feed-forward network
//! trained by backpropagation, with JSON persistence.

pub mod error;
pub mod math;
pub mod activation;
pub mod network;
pub mod persist;
pub mod loss;
pub mod train;

// Convenience re-exports
pub use error::{Error, ErrorKind, Result};
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use network::config::NetworkConfig;
pub use network::network::NeuralNetwork;
pub use persist::document::Document;
pub use loss::mse::MseLoss;
pub use train::{train_epoch, train_loop, TrainConfig};
