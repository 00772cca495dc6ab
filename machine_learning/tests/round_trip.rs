use std::num::NonZeroUsize;

use machine_learning::{Config, Engine, ModelDescriptor, Record, Result, record};

fn reload(engine: &Engine) -> Result<Engine> {
    let mut reloaded = Engine::new();
    reloaded.load_model(&engine.serialize_model()?)?;
    reloaded.load_weights(&engine.serialize_weights()?)?;
    Ok(reloaded)
}

fn assert_same_predictions(engine: &Engine, probes: &[Record]) -> Result<()> {
    let reloaded = reload(engine)?;

    assert_eq!(reloaded.serialize_model()?, engine.serialize_model()?);
    assert_eq!(reloaded.serialize_weights()?, engine.serialize_weights()?);

    for probe in probes {
        assert_eq!(reloaded.predict(probe)?, engine.predict(probe)?);
    }

    Ok(())
}

#[test]
fn linear_round_trip() -> Result<()> {
    let inputs = [
        record! { "size" => 1000, "bedrooms" => 2, "location" => "urban" },
        record! { "size" => 1500, "bedrooms" => 3, "location" => "suburban" },
        record! { "size" => 2000, "bedrooms" => 4, "location" => "rural" },
    ];
    let outputs = [
        record! { "price" => 200000, "rental" => 1500 },
        record! { "price" => 250000, "rental" => 1800 },
        record! { "price" => 300000, "rental" => 2000 },
    ];
    let config = Config {
        learning_rate: 1e-7,
        ..Config::default()
    };
    let mut engine = Engine::new()
        .with_model(ModelDescriptor::linear())
        .with_config(config);
    engine.train(&inputs, &outputs)?;

    assert_same_predictions(
        &engine,
        &[
            record! { "size" => 1200, "bedrooms" => 3, "location" => "urban" },
            record! { "size" => 1800 },
            record! {},
        ],
    )
}

#[test]
fn logistic_round_trip() -> Result<()> {
    let inputs = [record! { "hours" => 1.0 }, record! { "hours" => 9.0 }];
    let outputs = [record! { "pass" => false }, record! { "pass" => true }];
    let mut engine = Engine::train_auto(&inputs, &outputs)?;
    engine.train(&inputs, &outputs)?;

    assert_same_predictions(&engine, &[record! { "hours" => 5.0 }])
}

#[test]
fn categorical_round_trip() -> Result<()> {
    let inputs = [
        record! { "r" => 1.0, "b" => 0.0 },
        record! { "r" => 0.0, "b" => 1.0 },
        record! { "r" => 0.5, "b" => 0.5 },
    ];
    let outputs = [
        record! { "color" => "red" },
        record! { "color" => "blue" },
        record! { "color" => 3 },
    ];
    let mut engine = Engine::new().with_model(ModelDescriptor::categorical());
    engine.train(&inputs, &outputs)?;

    assert_same_predictions(&engine, &[record! { "r" => 0.7, "b" => 0.2 }])
}

#[test]
fn mixed_round_trip() -> Result<()> {
    let inputs = [
        record! { "size" => 1.0, "flag" => true },
        record! { "size" => 2.0, "flag" => false },
        record! { "size" => 3.0, "flag" => true },
    ];
    let outputs = [
        record! { "price" => 10.0, "big" => 0, "tier" => "low" },
        record! { "price" => 20.0, "big" => 0, "tier" => "mid" },
        record! { "price" => 30.0, "big" => 1, "tier" => "high" },
    ];
    let config = Config {
        epochs: NonZeroUsize::new(20).unwrap(),
        ..Config::default()
    };
    let mut engine = Engine::new()
        .with_model(ModelDescriptor::mixed())
        .with_config(config);
    engine.train(&inputs, &outputs)?;

    assert!(engine.serialize_model()?.contains(r#""targets""#));
    assert_same_predictions(&engine, &[record! { "size" => 2.5, "flag" => false }])
}
