use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::activation::ActivationFunction;
use crate::error::Result;
use crate::persist::Document;

pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

fn default_learning_rate() -> f64 {
    DEFAULT_LEARNING_RATE
}

/// Topology and hyperparameters for building a [`NeuralNetwork`](crate::NeuralNetwork).
///
/// Only the node counts are required in JSON; `learning_rate` defaults to 0.1
/// and `activation_function` to sigmoid (tag `1`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub input_nodes: usize,
    pub hidden_nodes: usize,
    pub output_nodes: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default)]
    pub activation_function: ActivationFunction,
}

impl NetworkConfig {
    pub fn new(input_nodes: usize, hidden_nodes: usize, output_nodes: usize) -> Self {
        NetworkConfig {
            input_nodes,
            hidden_nodes,
            output_nodes,
            learning_rate: DEFAULT_LEARNING_RATE,
            activation_function: ActivationFunction::Sigmoid,
        }
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_activation(mut self, activation: ActivationFunction) -> Self {
        self.activation_function = activation;
        self
    }

    /// Reads a config from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_json(path)
    }
}

impl Document for NetworkConfig {}
