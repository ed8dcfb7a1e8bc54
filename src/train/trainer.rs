use rand::seq::SliceRandom;

use crate::error::{Error, Result};
use crate::loss::mse::MseLoss;
use crate::network::network::NeuralNetwork;

/// Runs one pass of online training over `inputs`/`targets` and returns the
/// mean MSE of the predictions made just before each update.
///
/// An empty dataset is a no-op returning `0.0`.
pub fn train_epoch(
    network: &mut NeuralNetwork,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    shuffle: bool,
) -> Result<f64> {
    if inputs.len() != targets.len() {
        return Err(Error::mismatch("train_epoch", (inputs.len(), 1), (targets.len(), 1)));
    }
    if inputs.is_empty() {
        return Ok(0.0);
    }

    let mut indices: Vec<usize> = (0..inputs.len()).collect();
    if shuffle {
        indices.shuffle(&mut rand::thread_rng());
    }

    let mut total_loss = 0.0;

    for &idx in &indices {
        let input = &inputs[idx];
        let expected = &targets[idx];

        let output = network.predict(input)?;
        total_loss += MseLoss::loss(&output, expected);

        network.train(input, expected)?;
    }

    Ok(total_loss / inputs.len() as f64)
}
