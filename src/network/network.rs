use rand::Rng;
use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};

use crate::activation::{dsigmoid, ActivationFunction};
use crate::error::{Error, Result};
use crate::math::Matrix;
use crate::network::config::NetworkConfig;
use crate::persist::Document;

/// Fixed input/hidden/output feed-forward network trained one sample at a time.
///
/// Shapes always hold: `weights_ih` is hidden×input, `weights_ho` is
/// output×hidden, `bias_h` is hidden×1 and `bias_o` is output×1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NetworkDocument")]
pub struct NeuralNetwork {
    input_nodes: usize,
    hidden_nodes: usize,
    output_nodes: usize,
    weights_ih: Matrix,
    weights_ho: Matrix,
    bias_h: Matrix,
    bias_o: Matrix,
    #[serde(serialize_with = "serialize_finite")]
    learning_rate: f64,
    activation_function: ActivationFunction,
}

fn serialize_finite<S: Serializer>(
    value: &f64,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    if !value.is_finite() {
        return Err(S::Error::custom(format!("learning rate {value} is not finite")));
    }
    serializer.serialize_f64(*value)
}

impl NeuralNetwork {
    /// Builds a network with weights and biases drawn from [0, 1), learning
    /// rate 0.1 and sigmoid activation.
    pub fn new(input_nodes: usize, hidden_nodes: usize, output_nodes: usize) -> NeuralNetwork {
        Self::with_rng(input_nodes, hidden_nodes, output_nodes, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(
        input_nodes: usize,
        hidden_nodes: usize,
        output_nodes: usize,
        rng: &mut R,
    ) -> NeuralNetwork {
        Self::from_config_with_rng(&NetworkConfig::new(input_nodes, hidden_nodes, output_nodes), rng)
    }

    pub fn from_config(config: &NetworkConfig) -> NeuralNetwork {
        Self::from_config_with_rng(config, &mut rand::thread_rng())
    }

    pub fn from_config_with_rng<R: Rng + ?Sized>(config: &NetworkConfig, rng: &mut R) -> NeuralNetwork {
        let mut weights_ih = Matrix::zeros(config.hidden_nodes, config.input_nodes);
        let mut weights_ho = Matrix::zeros(config.output_nodes, config.hidden_nodes);
        let mut bias_h = Matrix::zeros(config.hidden_nodes, 1);
        let mut bias_o = Matrix::zeros(config.output_nodes, 1);

        for m in [&mut weights_ih, &mut weights_ho, &mut bias_h, &mut bias_o] {
            m.randomize_with(rng);
        }

        tracing::debug!(
            input = config.input_nodes,
            hidden = config.hidden_nodes,
            output = config.output_nodes,
            learning_rate = config.learning_rate,
            "created network"
        );

        NeuralNetwork {
            input_nodes: config.input_nodes,
            hidden_nodes: config.hidden_nodes,
            output_nodes: config.output_nodes,
            weights_ih,
            weights_ho,
            bias_h,
            bias_o,
            learning_rate: config.learning_rate,
            activation_function: config.activation_function,
        }
    }

    /// Assembles a network from explicit parameters, deriving the node counts
    /// from `weights_ih` and `weights_ho`.
    ///
    /// Fails with `DimensionMismatch` if the four matrices do not describe one
    /// consistent topology.
    pub fn from_parts(
        weights_ih: Matrix,
        weights_ho: Matrix,
        bias_h: Matrix,
        bias_o: Matrix,
        learning_rate: f64,
        activation_function: ActivationFunction,
    ) -> Result<NeuralNetwork> {
        let (hidden_nodes, input_nodes) = weights_ih.shape();
        let output_nodes = weights_ho.rows();

        if weights_ho.cols() != hidden_nodes {
            return Err(Error::mismatch("weights_ho", weights_ho.shape(), (output_nodes, hidden_nodes)));
        }
        if bias_h.shape() != (hidden_nodes, 1) {
            return Err(Error::mismatch("bias_h", bias_h.shape(), (hidden_nodes, 1)));
        }
        if bias_o.shape() != (output_nodes, 1) {
            return Err(Error::mismatch("bias_o", bias_o.shape(), (output_nodes, 1)));
        }

        Ok(NeuralNetwork {
            input_nodes,
            hidden_nodes,
            output_nodes,
            weights_ih,
            weights_ho,
            bias_h,
            bias_o,
            learning_rate,
            activation_function,
        })
    }

    pub fn input_nodes(&self) -> usize {
        self.input_nodes
    }

    pub fn hidden_nodes(&self) -> usize {
        self.hidden_nodes
    }

    pub fn output_nodes(&self) -> usize {
        self.output_nodes
    }

    pub fn weights_ih(&self) -> &Matrix {
        &self.weights_ih
    }

    pub fn weights_ho(&self) -> &Matrix {
        &self.weights_ho
    }

    pub fn bias_h(&self) -> &Matrix {
        &self.bias_h
    }

    pub fn bias_o(&self) -> &Matrix {
        &self.bias_o
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// No bounds are enforced; a non-positive rate is legal but stalls or
    /// reverses training.
    pub fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = learning_rate;
    }

    pub fn activation_function(&self) -> ActivationFunction {
        self.activation_function
    }

    /// Selects the forward-pass function. Training always uses the sigmoid
    /// derivative, whatever is selected here.
    pub fn set_activation_function(&mut self, activation: ActivationFunction) {
        if activation == ActivationFunction::DSigmoid {
            tracing::warn!("dsigmoid selected as primary activation; outputs are no longer probabilities");
        }
        self.activation_function = activation;
    }

    /// Forward pass. `input` must have `input_nodes` values.
    pub fn predict(&self, input: &[f64]) -> Result<Vec<f64>> {
        let inputs = Matrix::from_column(input);
        let hidden = self.feed(&self.weights_ih, &inputs, &self.bias_h)?;
        let outputs = self.feed(&self.weights_ho, &hidden, &self.bias_o)?;
        Ok(outputs.into_vec())
    }

    /// One step of online gradient descent towards `target`.
    ///
    /// Shape errors are reported before any weight is touched.
    pub fn train(&mut self, input: &[f64], target: &[f64]) -> Result<()> {
        let inputs = Matrix::from_column(input);
        let hidden = self.feed(&self.weights_ih, &inputs, &self.bias_h)?;
        let outputs = self.feed(&self.weights_ho, &hidden, &self.bias_o)?;

        let targets = Matrix::from_column(target);
        let output_errors = Matrix::subtract(&targets, &outputs)?;

        let mut output_gradient = outputs.map(dsigmoid);
        output_gradient.hadamard(&output_errors)?;
        output_gradient.scale(self.learning_rate);

        let weights_ho_deltas = Matrix::multiply(&output_gradient, &hidden.transpose())?;
        self.weights_ho.add(&weights_ho_deltas)?;
        self.bias_o.add(&output_gradient)?;

        // Errors are propagated through the already updated hidden->output weights.
        let hidden_errors = Matrix::multiply(&self.weights_ho.transpose(), &output_errors)?;

        let mut hidden_gradient = hidden.map(dsigmoid);
        hidden_gradient.hadamard(&hidden_errors)?;
        hidden_gradient.scale(self.learning_rate);

        let weights_ih_deltas = Matrix::multiply(&hidden_gradient, &inputs.transpose())?;
        self.weights_ih.add(&weights_ih_deltas)?;
        self.bias_h.add(&hidden_gradient)?;

        tracing::trace!(
            squared_error = output_errors.iter().map(|e| e * e).sum::<f64>(),
            "train step"
        );

        Ok(())
    }

    /// `activation(weights · input + bias)`
    fn feed(&self, weights: &Matrix, input: &Matrix, bias: &Matrix) -> Result<Matrix> {
        let mut z = Matrix::multiply(weights, input)?;
        z.add(bias)?;
        let activation = self.activation_function;
        z.map_in_place(|x| activation.function(x));
        Ok(z)
    }
}

impl Document for NeuralNetwork {}

#[derive(Deserialize)]
struct NetworkDocument {
    input_nodes: usize,
    hidden_nodes: usize,
    output_nodes: usize,
    weights_ih: Matrix,
    weights_ho: Matrix,
    bias_h: Matrix,
    bias_o: Matrix,
    learning_rate: f64,
    activation_function: ActivationFunction,
}

impl TryFrom<NetworkDocument> for NeuralNetwork {
    type Error = Error;

    fn try_from(doc: NetworkDocument) -> Result<NeuralNetwork> {
        let expected = [
            ("weights_ih", doc.weights_ih.shape(), (doc.hidden_nodes, doc.input_nodes)),
            ("weights_ho", doc.weights_ho.shape(), (doc.output_nodes, doc.hidden_nodes)),
            ("bias_h", doc.bias_h.shape(), (doc.hidden_nodes, 1)),
            ("bias_o", doc.bias_o.shape(), (doc.output_nodes, 1)),
        ];
        for (name, found, want) in expected {
            if found != want {
                return Err(Error::Parse(format!(
                    "{name} is {}x{} but the node counts require {}x{}",
                    found.0, found.1, want.0, want.1
                )));
            }
        }

        Ok(NeuralNetwork {
            input_nodes: doc.input_nodes,
            hidden_nodes: doc.hidden_nodes,
            output_nodes: doc.output_nodes,
            weights_ih: doc.weights_ih,
            weights_ho: doc.weights_ho,
            bias_h: doc.bias_h,
            bias_o: doc.bias_o,
            learning_rate: doc.learning_rate,
            activation_function: doc.activation_function,
        })
    }
}
