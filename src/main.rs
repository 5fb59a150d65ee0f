//! Command-line driver: builds a network, trains it on generated shapes and
//! reports the accuracy on a fresh test set.
//!
//! Run with:
//!   cargo run --release -- --train-size 200 --epochs 50 --accuracy 0.9
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use shapes_nn::network::parse_structure;
use shapes_nn::{train_loop, EpochStats, NetworkSpec, ShapeGenerator, TrainConfig};

#[derive(Parser)]
#[command(name = "shapes-nn")]
#[command(about = "Train a small neural network to recognise generated shapes", long_about = None)]
struct Cli {
    /// Network spec JSON; built-in defaults when omitted
    #[arg(short, long)]
    spec: Option<String>,

    /// Layer structure overriding the spec, e.g. "400;8;4"
    #[arg(long)]
    structure: Option<String>,

    /// Number of generated training samples
    #[arg(long, default_value_t = 200)]
    train_size: usize,

    /// Number of generated test samples
    #[arg(long, default_value_t = 200)]
    test_size: usize,

    /// Maximum number of training epochs
    #[arg(short, long, default_value_t = 50)]
    epochs: usize,

    /// Stop once this share of the training set is learned
    #[arg(short, long, default_value_t = 0.9)]
    accuracy: f64,

    /// Learning rate overriding the spec
    #[arg(long)]
    learning_rate: Option<f64>,

    /// Seed for weights and generator
    #[arg(long)]
    seed: Option<u64>,

    /// Divide projection counts by the canvas side
    #[arg(long)]
    normalize: bool,

    /// Write the last test figure as PNG
    #[arg(long)]
    save_figure: Option<String>,

    /// Write the effective spec as JSON and exit
    #[arg(long)]
    write_spec: Option<String>,
}

fn load_spec(cli: &Cli) -> Result<NetworkSpec> {
    let mut spec = match &cli.spec {
        Some(path) => NetworkSpec::load_json(path)
            .with_context(|| format!("cannot read network spec '{path}'"))?,
        None => NetworkSpec::default(),
    };
    if let Some(structure) = &cli.structure {
        spec.layers = parse_structure(structure)?;
    }
    if let Some(lr) = cli.learning_rate {
        spec.train.learning_rate = lr;
    }
    if cli.seed.is_some() {
        spec.seed = cli.seed;
    }
    if cli.normalize {
        spec.generator.normalize = true;
    }
    spec.validate_for_generator()?;
    Ok(spec)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let spec = load_spec(&cli)?;

    if let Some(path) = &cli.write_spec {
        spec.save_json(path).with_context(|| format!("cannot write network spec '{path}'"))?;
        info!(path = %path, "spec written");
        return Ok(());
    }

    let mut network = spec.build()?;
    let mut generator = match spec.seed {
        Some(seed) => ShapeGenerator::seeded(spec.generator.clone(), seed)?,
        None => ShapeGenerator::new(spec.generator.clone())?,
    };
    info!(name = %spec.name, structure = %spec.structure(), lr = network.learning_rate(), "network ready");

    let mut train_set = generator.generate_set(cli.train_size);
    let mut test_set = generator.generate_set(cli.test_size);

    let (tx, rx) = mpsc::channel::<EpochStats>();
    let printer = thread::spawn(move || {
        for stats in rx {
            println!(
                "epoch {:>4}/{:<4} learned {:>6.2}%  backprops {:>6}  given up {:>4}  {:>5} ms",
                stats.epoch,
                stats.max_epochs,
                stats.accuracy * 100.0,
                stats.backward_passes,
                stats.exhausted,
                stats.elapsed_ms,
            );
        }
    });

    let mut config = TrainConfig::new(cli.epochs, cli.accuracy);
    config.progress_tx = Some(tx);
    let train_accuracy = train_loop(&mut network, &mut train_set, &config)?;
    drop(config);
    if printer.join().is_err() {
        warn!("progress printer panicked");
    }
    println!("Training accuracy: {:.2}%", train_accuracy * 100.0);

    match network.test_on_data_set(&mut test_set)? {
        Some(accuracy) => println!("Test accuracy:     {:.2}%", accuracy * 100.0),
        None => println!("Test accuracy:     undefined (empty test set)"),
    }

    if let Some(path) = &cli.save_figure {
        let mut sample = generator.generate_sample();
        let recognized = network.predict(&mut sample)?;
        generator.canvas().to_image().save(path)
            .with_context(|| format!("cannot write figure '{path}'"))?;
        println!(
            "Figure written to {path}: {} recognized as {}",
            generator.current_figure().map(|f| f.name()).unwrap_or("?"),
            recognized.map(|r| spec.label(r)).unwrap_or_else(|| "nothing".into()),
        );
    }

    Ok(())
}
