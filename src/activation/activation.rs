use serde::{Deserialize, Serialize};
use std::f64::consts::E;

use crate::error::Error;

/// Forward-pass nonlinearity shared by the hidden and output layers.
///
/// Serialized as its numeric tag (`1` = sigmoid, `2` = dsigmoid).
/// `DSigmoid` is only meaningful as the training derivative; selecting it as
/// the primary activation is accepted so that old documents still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ActivationFunction {
    #[default]
    Sigmoid,
    DSigmoid,
}

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => sigmoid(x),
            ActivationFunction::DSigmoid => dsigmoid(x),
        }
    }

    pub fn tag(&self) -> u8 {
        match self {
            ActivationFunction::Sigmoid => 1,
            ActivationFunction::DSigmoid => 2,
        }
    }
}

impl From<ActivationFunction> for u8 {
    fn from(activation: ActivationFunction) -> u8 {
        activation.tag()
    }
}

impl TryFrom<u8> for ActivationFunction {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self, Error> {
        match tag {
            1 => Ok(ActivationFunction::Sigmoid),
            2 => Ok(ActivationFunction::DSigmoid),
            other => Err(Error::Parse(format!("unknown activation function tag {other}"))),
        }
    }
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + E.powf(-x))
}

/// Sigmoid derivative in terms of the already-activated value `y = sigmoid(x)`.
pub fn dsigmoid(y: f64) -> f64 {
    y * (1.0 - y)
}
