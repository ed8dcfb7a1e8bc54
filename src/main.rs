// Loads a saved network and runs one prediction:
//   ferrite-mlp model.json 1.0,0.0
// Training demos live in demos/; run with `cargo run --example xor`.
use ferrite_mlp::{Document, Error, NeuralNetwork, Result};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (path, raw_input) = match args.as_slice() {
        [path, input] => (path, input),
        _ => {
            eprintln!("usage: ferrite-mlp <network.json> <comma-separated inputs>");
            std::process::exit(2);
        }
    };

    let input = raw_input
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<f64>, _>>()
        .map_err(|e| Error::Parse(format!("invalid input value: {e}")))?;

    let network = NeuralNetwork::load_json(path)?;
    tracing::info!(
        path = %path,
        input = network.input_nodes(),
        hidden = network.hidden_nodes(),
        output = network.output_nodes(),
        "loaded network"
    );

    let output = network.predict(&input)?;
    println!("{output:?}");
    Ok(())
}
