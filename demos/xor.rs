use ferrite_mlp::{train_loop, Document, NeuralNetwork, NetworkConfig, TrainConfig};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> ferrite_mlp::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let topology = NetworkConfig::new(2, 4, 1).with_learning_rate(0.5);
    let mut network = NeuralNetwork::from_config(&topology);

    let inputs = vec![
        vec![1.0, 0.0],
        vec![1.0, 1.0],
        vec![0.0, 1.0],
        vec![0.0, 0.0],
    ];
    let expected_outputs = vec![
        vec![1.0],
        vec![0.0],
        vec![1.0],
        vec![0.0],
    ];

    let config = TrainConfig::new(20_000).with_log_every(2_000);
    let loss = train_loop(&mut network, &inputs, &expected_outputs, &config)?;
    println!("final loss = {loss:.6}");

    for input in &inputs {
        println!("Input: {:?} -> Output: {:.4}", input, network.predict(input)?[0]);
    }

    network.save_json("xor.json")?;
    println!("saved to xor.json");
    Ok(())
}
