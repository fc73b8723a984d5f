//! Command-line front end: wire a DAG network, train it online and report its outputs.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dagnet::{
    data::read_edge_list, ActivationKind, DataLoader, Network, NetworkConfig, NetworkError,
    NeuronId, Trainer,
};
use ndarray::arr2;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "dagnet")]
#[command(about = "Train feed-forward networks wired as arbitrary DAGs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Args)]
struct TrainingArgs {
    /// Number of passes over the dataset
    #[arg(long, default_value = "5000")]
    epochs: usize,

    /// Learning rate of every neuron
    #[arg(long, default_value = "0.1")]
    learning_rate: f64,

    /// Seed for weight initialisation and shuffling
    #[arg(long)]
    seed: Option<u64>,

    /// Activation of every neuron (identity, sigmoid, relu, leaky-relu)
    #[arg(long, default_value = "leaky-relu")]
    activation: ActivationKind,

    /// Log the loss every N epochs
    #[arg(long, default_value = "500")]
    log_every: usize,

    /// Print the network snapshot after training
    #[arg(long)]
    snapshot: bool,
}

impl TrainingArgs {
    fn config(&self) -> NetworkConfig {
        NetworkConfig {
            learning_rate: self.learning_rate,
            activation: self.activation,
            seed: self.seed,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Train the exclusive-or demo: two inputs, a hidden layer and one output
    Xor {
        /// Number of hidden neurons
        #[arg(long, default_value = "2")]
        hidden: usize,

        #[command(flatten)]
        training: TrainingArgs,
    },

    /// Train a network wired from an edge list on a CSV dataset
    Train {
        /// Headerless CSV of `parent,child` neuron names
        #[arg(long)]
        topology: PathBuf,

        /// Headerless CSV, each row holding the inputs followed by the targets
        #[arg(long)]
        data: PathBuf,

        /// Names of the input neurons
        #[arg(long, value_delimiter = ',', required = true)]
        inputs: Vec<String>,

        /// Names of the output neurons, in target column order
        #[arg(long, value_delimiter = ',', required = true)]
        outputs: Vec<String>,

        /// Visit samples in a random order each epoch
        #[arg(long)]
        shuffle: bool,

        #[command(flatten)]
        training: TrainingArgs,
    },
}

fn xor_network(hidden: usize, config: NetworkConfig) -> dagnet::Result<Network> {
    let mut net = Network::new(config);
    let inputs = [
        net.add_input(Some("N1"), 2)?,
        net.add_input(Some("N2"), 2)?,
    ];
    let output = net.add_output(Some("OUT"))?;
    for k in 0..hidden {
        let h = net.add_hidden(Some(format!("H{}", k + 1).as_str()))?;
        for &i in &inputs {
            net.connect_child(i, h)?;
        }
        net.connect_child(h, output)?;
    }
    net.build_order()?;
    Ok(net)
}

fn find_or_add_hidden(net: &mut Network, name: &str) -> dagnet::Result<NeuronId> {
    match net.find(name) {
        Some(id) => Ok(id),
        None => net.add_hidden(Some(name)),
    }
}

fn wire_from_edges(
    net: &mut Network,
    edges: &[(String, String)],
    inputs: &[String],
    outputs: &[String],
    input_width: usize,
) -> dagnet::Result<()> {
    for name in inputs {
        net.add_input(Some(name.as_str()), input_width)?;
    }
    for name in outputs {
        net.add_output(Some(name.as_str()))?;
    }
    for (parent, child) in edges {
        let parent = find_or_add_hidden(net, parent)?;
        let child = find_or_add_hidden(net, child)?;
        net.connect_child(parent, child)?;
    }
    net.build_order()?;

    // Dormant outputs drop out of the order and would misalign the target columns.
    let reachable = net.outputs().unwrap_or_default();
    for name in outputs {
        if !net.find(name).map_or(false, |id| reachable.contains(&id)) {
            return Err(NetworkError::UnreachableOutput(name.clone()));
        }
    }
    Ok(())
}

fn report(net: &mut Network, loader: &mut DataLoader) -> Result<()> {
    let mut loss = 0.0;
    for (input, target) in loader.epoch() {
        let output = net.forward(input)?;
        if output.len() != target.len() {
            return Err(NetworkError::DimensionMismatch {
                expected: output.len(),
                actual: target.len(),
            }
            .into());
        }
        loss += dagnet::loss::mean_squared_error(output.view(), target);
        println!("{} -> {} (expected {})", input, output, target);
    }
    println!("mean squared error: {:.6}", loss / loader.size().max(1) as f64);
    Ok(())
}

fn train(net: &mut Network, loader: &mut DataLoader, training: &TrainingArgs) -> Result<()> {
    println!("Before training:");
    report(net, loader)?;

    Trainer::new(training.epochs)
        .log_every(training.log_every)
        .fit(net, loader)?;

    println!("\nAfter training:");
    report(net, loader)?;

    if training.snapshot {
        println!("\n{}", net);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Xor { hidden, training } => {
            info!(hidden, epochs = training.epochs, "training exclusive-or");
            let mut net = xor_network(hidden, training.config())?;
            let input = arr2(&[[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]);
            let target = arr2(&[[0.0], [1.0], [1.0], [0.0]]);
            let mut loader = DataLoader::new(input, target)?;
            train(&mut net, &mut loader, &training)?;
        }
        Commands::Train {
            topology,
            data,
            inputs,
            outputs,
            shuffle,
            training,
        } => {
            let edges = read_edge_list(&topology)
                .with_context(|| format!("reading topology {}", topology.display()))?;
            let mut loader = DataLoader::from_csv(&data, outputs.len())
                .with_context(|| format!("reading dataset {}", data.display()))?;
            if shuffle {
                loader = loader.shuffle(training.seed);
            }
            info!(
                edges = edges.len(),
                samples = loader.size(),
                "training from files"
            );

            let mut net = Network::new(training.config());
            wire_from_edges(
                &mut net,
                &edges,
                &inputs,
                &outputs,
                loader.input_width(),
            )?;
            train(&mut net, &mut loader, &training)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn edges(values: &[(&str, &str)]) -> Vec<(String, String)> {
        values
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect()
    }

    #[test]
    fn wiring_rejects_unreachable_outputs() {
        let mut net = Network::new(NetworkConfig::default().seed(0));
        let result = wire_from_edges(
            &mut net,
            &edges(&[("N1", "H1"), ("H1", "Y1")]),
            &names(&["N1"]),
            &names(&["Y1", "Y2"]),
            2,
        );
        assert!(matches!(
            result,
            Err(NetworkError::UnreachableOutput(name)) if name == "Y2"
        ));
    }

    #[test]
    fn wiring_accepts_reachable_outputs() {
        let mut net = Network::new(NetworkConfig::default().seed(0));
        wire_from_edges(
            &mut net,
            &edges(&[("N1", "H1"), ("H1", "Y1"), ("N1", "Y2")]),
            &names(&["N1"]),
            &names(&["Y1", "Y2"]),
            2,
        )
        .unwrap();
        assert_eq!(net.outputs().unwrap().len(), 2);
    }

    #[test]
    fn report_rejects_short_outputs() {
        let mut net = Network::new(NetworkConfig::default().seed(0));
        let i = net.add_input(Some("N1"), 2).unwrap();
        let y = net.add_output(Some("Y1")).unwrap();
        net.connect_child(i, y).unwrap();
        net.build_order().unwrap();

        let mut loader = DataLoader::new(arr2(&[[0.0, 0.0]]), arr2(&[[0.0, 0.0]])).unwrap();
        let err = report(&mut net, &mut loader).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<NetworkError>(),
            Some(NetworkError::DimensionMismatch {
                expected: 1,
                actual: 2
            })
        ));
    }
}
