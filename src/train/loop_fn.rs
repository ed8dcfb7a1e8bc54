use std::time::Instant;

use crate::error::Result;
use crate::network::network::NeuralNetwork;
use crate::train::train_config::TrainConfig;
use crate::train::trainer::train_epoch;

/// Trains `network` for `config.epochs` epochs and returns the mean training
/// loss of the last epoch (`0.0` if no epoch ran).
///
/// Stops at the first sample whose shape does not fit the network. Updates
/// from completed epochs, and from samples already trained earlier in the
/// failing epoch, are kept.
pub fn train_loop(
    network: &mut NeuralNetwork,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    config: &TrainConfig,
) -> Result<f64> {
    let started = Instant::now();
    let mut last_loss = 0.0;

    for epoch in 1..=config.epochs {
        last_loss = train_epoch(network, inputs, targets, config.shuffle)?;

        if config.log_every > 0 && epoch % config.log_every == 0 {
            tracing::info!(epoch, total_epochs = config.epochs, loss = last_loss, "epoch finished");
        }
    }

    tracing::debug!(
        epochs = config.epochs,
        elapsed_ms = started.elapsed().as_millis() as u64,
        loss = last_loss,
        "training finished"
    );

    Ok(last_loss)
}
