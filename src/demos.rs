use std::num::NonZeroUsize;

use anyhow::Result;
use machine_learning::{Config, Engine, ModelDescriptor, Prediction, record};

const FULL_BATCH: NonZeroUsize = NonZeroUsize::new(6).unwrap();
const HOUSE_EPOCHS: NonZeroUsize = NonZeroUsize::new(10_000).unwrap();
const EXAM_EPOCHS: NonZeroUsize = NonZeroUsize::new(1000).unwrap();
const COLOR_EPOCHS: NonZeroUsize = NonZeroUsize::new(500).unwrap();
const MIXED_EPOCHS: NonZeroUsize = NonZeroUsize::new(500).unwrap();

fn print_prediction(title: &str, prediction: &Prediction) -> Result<()> {
    println!("\n{title}:");
    println!("{}", serde_json::to_string_pretty(prediction)?);
    Ok(())
}

/// Regresses house price and monthly rental, then saves and reloads the model.
pub fn house_prices() -> Result<()> {
    println!("Linear Regression Example\n-------------------------");

    let model = ModelDescriptor::linear();
    println!("Model JSON:\n{}", model.to_json()?);

    // Raw sizes are in the thousands, large steps diverge.
    let config = Config {
        learning_rate: 1e-9,
        epochs: HOUSE_EPOCHS,
        batch_size: FULL_BATCH,
        regularize: 1e-8,
        tolerance: 0.001,
        ..Config::default()
    };
    let mut engine = Engine::new().with_model(model).with_config(config);

    let inputs = [
        record! { "size" => 1000, "bedrooms" => 2, "location" => "suburban" },
        record! { "size" => 1500, "bedrooms" => 3, "location" => "suburban" },
        record! { "size" => 800, "bedrooms" => 1, "location" => "urban" },
        record! { "size" => 2000, "bedrooms" => 4, "location" => "rural" },
        record! { "size" => 1200, "bedrooms" => 2, "location" => "urban" },
        record! { "size" => 1700, "bedrooms" => 3, "location" => "rural" },
    ];
    let outputs = [
        record! { "price" => 200000, "rental" => 1500 },
        record! { "price" => 300000, "rental" => 2100 },
        record! { "price" => 220000, "rental" => 1700 },
        record! { "price" => 350000, "rental" => 2400 },
        record! { "price" => 240000, "rental" => 1900 },
        record! { "price" => 320000, "rental" => 2300 },
    ];

    let stats = engine.train(&inputs, &outputs)?;
    println!(
        "\nTrained for {} epoch(s), loss {:.2}, converged: {}",
        stats.epochs(),
        stats.loss(),
        stats.converged()
    );

    let weights = engine.serialize_weights()?;
    println!("\nTrained weights:\n{weights}");

    let house = record! { "size" => 1300, "bedrooms" => 2, "location" => "suburban" };
    let prediction = engine.predict(&house)?;
    print_prediction("Prediction for new house (price and rental)", &prediction)?;

    if let Some(price) = prediction.get("price").and_then(|o| o.as_f64()) {
        println!("Predicted price: ${price:.2}");
    }
    if let Some(rental) = prediction.get("rental").and_then(|o| o.as_f64()) {
        println!("Predicted monthly rental: ${rental:.2}");
    }

    println!("\nSaving and reloading model...");
    let mut reloaded = Engine::new();
    reloaded.load_model(&engine.serialize_model()?)?;
    reloaded.load_weights(&weights)?;

    let reloaded_prediction = reloaded.predict(&house)?;
    print_prediction("Prediction using reloaded model", &reloaded_prediction)?;
    println!("Predictions match: {}", reloaded_prediction == prediction);

    Ok(())
}

/// Predicts whether a student passes an exam.
pub fn exam() -> Result<()> {
    println!("\n\nLogistic Regression Example\n---------------------------");

    let config = Config {
        learning_rate: 0.01,
        epochs: EXAM_EPOCHS,
        batch_size: FULL_BATCH,
        regularize: 0.001,
        tolerance: 0.0001,
        ..Config::default()
    };
    let mut engine = Engine::new()
        .with_model(ModelDescriptor::logistic())
        .with_config(config);

    let inputs = [
        record! { "study_hours" => 8, "prev_grade" => 85 },
        record! { "study_hours" => 3, "prev_grade" => 60 },
        record! { "study_hours" => 5, "prev_grade" => 70 },
        record! { "study_hours" => 10, "prev_grade" => 90 },
        record! { "study_hours" => 2, "prev_grade" => 50 },
        record! { "study_hours" => 7, "prev_grade" => 80 },
    ];
    let outputs = [
        record! { "pass" => 1 },
        record! { "pass" => 0 },
        record! { "pass" => 0 },
        record! { "pass" => 1 },
        record! { "pass" => 0 },
        record! { "pass" => 1 },
    ];

    engine.train(&inputs, &outputs)?;
    println!("\nTrained logistic weights:\n{}", engine.serialize_weights()?);

    let student = record! { "study_hours" => 6, "prev_grade" => 75 };
    print_prediction("Logistic prediction for new student", &engine.predict(&student)?)
}

/// Classifies a colour from its normalized RGB components.
pub fn colors() -> Result<()> {
    println!("\n\nCategorical Classification Example\n----------------------------------");

    let config = Config {
        learning_rate: 0.1,
        epochs: COLOR_EPOCHS,
        ..Config::default()
    };
    let mut engine = Engine::new()
        .with_model(ModelDescriptor::categorical())
        .with_config(config);

    let inputs = [
        record! { "r" => 1.0, "g" => 0.0, "b" => 0.0 },
        record! { "r" => 0.9, "g" => 0.2, "b" => 0.1 },
        record! { "r" => 0.0, "g" => 1.0, "b" => 0.0 },
        record! { "r" => 0.1, "g" => 0.8, "b" => 0.2 },
        record! { "r" => 0.0, "g" => 0.0, "b" => 1.0 },
        record! { "r" => 0.2, "g" => 0.1, "b" => 0.9 },
    ];
    let outputs = [
        record! { "color" => "red" },
        record! { "color" => "red" },
        record! { "color" => "green" },
        record! { "color" => "green" },
        record! { "color" => "blue" },
        record! { "color" => "blue" },
    ];

    engine.train(&inputs, &outputs)?;
    println!("\nModel JSON:\n{}", engine.serialize_model()?);

    let sample = record! { "r" => 0.1, "g" => 0.9, "b" => 0.1 };
    print_prediction("Colour prediction", &engine.predict(&sample)?)
}

/// Predicts a numeric, a boolean and a categorical target with one model.
pub fn mixed() -> Result<()> {
    println!("\n\nMixed Model Example\n-------------------");

    let config = Config {
        epochs: MIXED_EPOCHS,
        ..Config::default()
    };
    let mut engine = Engine::new()
        .with_model(ModelDescriptor::mixed())
        .with_config(config);

    let inputs = [
        record! { "size" => 1.0, "floors" => 1, "garden" => false },
        record! { "size" => 1.5, "floors" => 1, "garden" => true },
        record! { "size" => 2.0, "floors" => 2, "garden" => false },
        record! { "size" => 3.0, "floors" => 2, "garden" => true },
        record! { "size" => 3.5, "floors" => 3, "garden" => true },
    ];
    let outputs = [
        record! { "price" => 100.0, "premium" => false, "tier" => "basic" },
        record! { "price" => 150.0, "premium" => false, "tier" => "basic" },
        record! { "price" => 200.0, "premium" => false, "tier" => "standard" },
        record! { "price" => 300.0, "premium" => true, "tier" => "standard" },
        record! { "price" => 350.0, "premium" => true, "tier" => "luxury" },
    ];

    engine.train(&inputs, &outputs)?;
    println!("\nModel JSON:\n{}", engine.serialize_model()?);

    let sample = record! { "size" => 2.5, "floors" => 2, "garden" => true };
    print_prediction("Mixed prediction", &engine.predict(&sample)?)
}

/// Lets the engine pick the model from the outputs.
pub fn auto() -> Result<()> {
    println!("\n\nAutomatic Model Selection Example\n---------------------------------");

    let inputs = [
        record! { "temperature" => 30.0, "humidity" => 0.8 },
        record! { "temperature" => 15.0, "humidity" => 0.3 },
        record! { "temperature" => 25.0, "humidity" => 0.9 },
        record! { "temperature" => 10.0, "humidity" => 0.2 },
    ];
    let outputs = [
        record! { "rain" => true },
        record! { "rain" => false },
        record! { "rain" => true },
        record! { "rain" => false },
    ];

    let engine = Engine::train_auto(&inputs, &outputs)?;
    if let Some(model) = engine.model() {
        println!("Selected model: {}", model.variant());
    }

    let sample = record! { "temperature" => 28.0, "humidity" => 0.85 };
    print_prediction("Rain prediction", &engine.predict(&sample)?)
}

/// Runs every demo in order.
pub fn run_all() -> Result<()> {
    house_prices()?;
    exam()?;
    colors()?;
    mixed()?;
    auto()
}
