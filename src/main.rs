mod config;
mod demos;

use std::{env, fs, path::Path};

use anyhow::{Context, Result, bail};
use log::info;
use machine_learning::Engine;
use ml_core::{Dataset, record_from_json};

use crate::config::RunConfig;

const USAGE: &str = "usage:
  recfit [demo]
  recfit train <run-config.json>
  recfit predict <model.json> <weights.json> <record-json>";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        [] | ["demo"] => demos::run_all(),
        ["train", run_config] => train(Path::new(run_config)),
        ["predict", model, weights, input] => {
            predict(Path::new(model), Path::new(weights), input)
        }
        _ => bail!("{USAGE}"),
    }
}

/// Trains the model described by a run configuration and writes or prints the
/// resulting snapshots.
fn train(path: &Path) -> Result<()> {
    let run = RunConfig::load(path)?;
    run.print()?;

    let text = fs::read_to_string(&run.dataset)
        .with_context(|| format!("cannot read dataset {}", run.dataset.display()))?;
    let dataset = Dataset::from_json(&text)
        .with_context(|| format!("invalid dataset {}", run.dataset.display()))?;
    info!(samples = dataset.len(); "dataset loaded");

    let (inputs, outputs) = dataset.into_parts();
    let Some(sample) = outputs.first() else {
        bail!("dataset {} has no samples", run.dataset.display());
    };

    let model = run.model.descriptor(sample);
    let variant = model.variant();

    let mut engine = Engine::new().with_model(model).with_config(run.training);
    let stats = engine.train(&inputs, &outputs)?;

    println!(
        "trained {variant} model: {} epoch(s), loss {}, converged: {}",
        stats.epochs(),
        stats.loss(),
        stats.converged()
    );

    write_or_print(run.model_out.as_deref(), &engine.serialize_model()?)?;
    write_or_print(run.weights_out.as_deref(), &engine.serialize_weights()?)
}

fn write_or_print(path: Option<&Path>, snapshot: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, snapshot).with_context(|| format!("cannot write {}", path.display()))?;
            info!("wrote {}", path.display());
        }
        None => println!("{snapshot}"),
    }
    Ok(())
}

/// Loads a model and its weights and predicts a single JSON record.
fn predict(model: &Path, weights: &Path, input: &str) -> Result<()> {
    let mut engine = Engine::new();

    let text = fs::read_to_string(model)
        .with_context(|| format!("cannot read model {}", model.display()))?;
    engine.load_model(&text)?;

    let text = fs::read_to_string(weights)
        .with_context(|| format!("cannot read weights {}", weights.display()))?;
    engine.load_weights(&text)?;

    let value: serde_json::Value = serde_json::from_str(input).context("invalid record json")?;
    let Some(record) = record_from_json(&value) else {
        bail!("the record must be a json object");
    };

    println!("{}", serde_json::to_string_pretty(&engine.predict(&record)?)?);
    Ok(())
}
