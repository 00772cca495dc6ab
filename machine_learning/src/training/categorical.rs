use std::collections::BTreeMap;

use log::{debug, info};
use ml_core::{MlError, Outcome, Prediction, Record, Result, TrainStats, Value};

use crate::{
    CategoryIndex, Config, Weights,
    arch::{
        activations::softmax,
        loss::{CrossEntropy, LossFn},
    },
    optimization::GradientDescent,
    weights::{category_bias_key, category_key},
};

/// Suffix of the prediction field holding a target's probability distribution.
pub const PROBS_SUFFIX: &str = "_probs";

/// The weight keys of one category of a target.
struct CategoryKeys {
    label: String,
    coefficients: Vec<String>,
    bias: String,
}

/// Fits a softmax classifier per target with per-example gradient descent.
///
/// Every distinct label of a target is assigned an index in `categories`;
/// labels seen in earlier calls keep theirs and new ones are appended. Targets
/// with fewer than two categories have nothing to learn and are skipped.
///
/// Training always runs `config.epochs` epochs, the reported loss is the mean
/// cross-entropy after the last one.
///
/// # Arguments
/// * `inputs` - The feature records.
/// * `outputs` - The target records, aligned with `inputs`.
/// * `weights` - The store refined in place.
/// * `config` - The training hyper-parameters.
/// * `categories` - The per-target category indices, extended in place.
pub fn train(
    inputs: &[Record],
    outputs: &[Record],
    weights: &mut Weights,
    config: &Config,
    categories: &mut BTreeMap<String, CategoryIndex>,
) -> Result<TrainStats> {
    let Some(first_input) = inputs.first() else {
        return Err(MlError::EmptyTrainingSet);
    };
    let Some(first_output) = outputs.first() else {
        return Err(MlError::InvalidOutput("no output records"));
    };

    let features: Vec<&str> = first_input.keys().map(String::as_str).collect();
    let optimizer = GradientDescent::from_config(config);

    let mut stats: Option<TrainStats> = None;

    for target in first_output.keys() {
        let index = categories.entry(target.clone()).or_default();
        index_labels(index, outputs.iter().filter_map(|y| y.get(target)));

        if index.len() <= 1 {
            debug!("skipping target {target}: {} category", index.len());
            continue;
        }

        let keys = category_keys(index, &features, target);
        for category in &keys {
            category.coefficients.iter().for_each(|k| weights.ensure(k.as_str()));
            weights.ensure(category.bias.as_str());
        }

        info!(
            "training categorical target {target} over {} categories",
            keys.len()
        );

        for epoch in 0..config.epochs.get() {
            for (x, y) in inputs.iter().zip(outputs) {
                let Some(actual) = y.get(target).map(Value::label) else {
                    continue;
                };

                let probs = softmax(&scores(x, &features, &keys, weights));
                for (category, p) in keys.iter().zip(probs) {
                    let indicator = if category.label == actual { 1.0 } else { 0.0 };
                    step(x, &features, category, p - indicator, weights, &optimizer);
                }
            }

            if epoch % 1000 == 0 {
                debug!(epoch = epoch, target = target.as_str(); "categorical training");
            }
        }

        let loss = cross_entropy(inputs, outputs, target, &features, &keys, weights);
        info!(target = target.as_str(), loss = loss; "categorical training finished");

        let target_stats = TrainStats::new(config.epochs.get(), loss, false);
        stats = Some(match stats {
            Some(acc) => acc.merge(target_stats),
            None => target_stats,
        });
    }

    Ok(stats.unwrap_or_default())
}

/// Predicts the most probable category of every indexed target.
///
/// The chosen label is read back as a number when it looks like one, and the
/// full distribution is added under `<target>_probs`. Ties go to the category
/// with the lowest index.
pub fn predict(
    input: &Record,
    weights: &Weights,
    categories: &BTreeMap<String, CategoryIndex>,
) -> Prediction {
    let mut prediction = Prediction::new();

    for (target, index) in categories {
        if index.is_empty() {
            continue;
        }

        let labels = ordered_labels(index);
        let scores: Vec<f64> = labels
            .iter()
            .map(|label| {
                let mut score = weights.get(&category_bias_key(target, label)).unwrap_or_default();
                for (field, value) in input {
                    if let Some(w) = weights.get(&category_key(field, target, label)) {
                        score += w * value.to_feature(field);
                    }
                }
                score
            })
            .collect();

        let probs = softmax(&scores);
        let best = probs
            .iter()
            .enumerate()
            .fold(0, |best, (i, &p)| if p > probs[best] { i } else { best });

        prediction.insert(target.clone(), Value::from_label(labels[best]).into());
        prediction.insert(
            format!("{target}{PROBS_SUFFIX}"),
            Outcome::Distribution(
                labels
                    .iter()
                    .zip(probs)
                    .map(|(label, p)| (label.to_string(), p))
                    .collect(),
            ),
        );
    }

    prediction
}

/// Gives every label not yet indexed the next free index, in order of first
/// appearance.
fn index_labels<'a>(index: &mut CategoryIndex, values: impl Iterator<Item = &'a Value>) {
    for value in values {
        let label = value.label();
        if !index.contains_key(&label) {
            let next = index.values().max().map_or(0, |max| max + 1);
            index.insert(label, next);
        }
    }
}

/// The labels of `index` sorted by their category index.
fn ordered_labels(index: &CategoryIndex) -> Vec<&str> {
    let mut labels: Vec<(&str, usize)> = index.iter().map(|(l, &i)| (l.as_str(), i)).collect();
    labels.sort_by_key(|&(_, i)| i);
    labels.into_iter().map(|(l, _)| l).collect()
}

fn category_keys(index: &CategoryIndex, features: &[&str], target: &str) -> Vec<CategoryKeys> {
    ordered_labels(index)
        .into_iter()
        .map(|label| CategoryKeys {
            label: label.to_string(),
            coefficients: features
                .iter()
                .map(|f| category_key(f, target, label))
                .collect(),
            bias: category_bias_key(target, label),
        })
        .collect()
}

fn scores(x: &Record, features: &[&str], keys: &[CategoryKeys], weights: &Weights) -> Vec<f64> {
    keys.iter()
        .map(|category| {
            let z: f64 = features
                .iter()
                .zip(&category.coefficients)
                .filter_map(|(f, key)| Some(weights.value(key) * x.get(*f)?.to_feature(f)))
                .sum();
            z + weights.value(&category.bias)
        })
        .collect()
}

fn step(
    x: &Record,
    features: &[&str],
    category: &CategoryKeys,
    grad: f64,
    weights: &mut Weights,
    optimizer: &GradientDescent,
) {
    for (feature, key) in features.iter().zip(&category.coefficients) {
        let Some(value) = x.get(*feature) else {
            continue;
        };

        let w = weights.value(key);
        weights.set(key.as_str(), optimizer.update_weight(w, grad * value.to_feature(feature)));
    }

    let b = weights.value(&category.bias);
    weights.set(category.bias.as_str(), optimizer.update_bias(b, grad));
}

fn cross_entropy(
    inputs: &[Record],
    outputs: &[Record],
    target: &str,
    features: &[&str],
    keys: &[CategoryKeys],
    weights: &Weights,
) -> f64 {
    let loss_fn = CrossEntropy::new();
    let mut total = 0.0;
    let mut count = 0usize;

    for (x, y) in inputs.iter().zip(outputs) {
        let Some(actual) = y.get(target).map(Value::label) else {
            continue;
        };

        let probs = softmax(&scores(x, features, keys, weights));
        total += keys
            .iter()
            .zip(probs)
            .map(|(category, p)| loss_fn.loss(p, if category.label == actual { 1.0 } else { 0.0 }))
            .sum::<f64>();
        count += 1;
    }

    if count == 0 { 0.0 } else { total / count as f64 }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use ml_core::record;

    use super::*;

    fn colors() -> (Vec<Record>, Vec<Record>) {
        let inputs = vec![
            record! { "r" => 1.0, "b" => 0.0 },
            record! { "r" => 0.9, "b" => 0.1 },
            record! { "r" => 0.0, "b" => 1.0 },
            record! { "r" => 0.1, "b" => 0.9 },
        ];
        let outputs = vec![
            record! { "color" => "red" },
            record! { "color" => "red" },
            record! { "color" => "blue" },
            record! { "color" => "blue" },
        ];
        (inputs, outputs)
    }

    fn config() -> Config {
        Config {
            learning_rate: 0.1,
            epochs: NonZeroUsize::new(500).unwrap(),
            ..Config::default()
        }
    }

    #[test]
    fn indexes_labels_in_order_of_appearance() {
        let (inputs, outputs) = colors();
        let mut categories = BTreeMap::new();

        train(&inputs, &outputs, &mut Weights::new(), &config(), &mut categories).unwrap();

        assert_eq!(categories["color"]["red"], 0);
        assert_eq!(categories["color"]["blue"], 1);
    }

    #[test]
    fn new_labels_get_the_next_index() {
        let mut index = CategoryIndex::from([("a".to_string(), 0), ("b".to_string(), 4)]);
        index_labels(&mut index, [Value::from("b"), Value::from("c")].iter());

        assert_eq!(index["b"], 4);
        assert_eq!(index["c"], 5);
    }

    #[test]
    fn learns_to_separate_categories() {
        let (inputs, outputs) = colors();
        let mut categories = BTreeMap::new();
        let mut weights = Weights::new();

        let stats = train(&inputs, &outputs, &mut weights, &config(), &mut categories).unwrap();
        assert_eq!(stats.epochs(), 500);
        assert!(!stats.converged());

        let prediction = predict(&record! { "r" => 1.0, "b" => 0.0 }, &weights, &categories);
        assert_eq!(prediction["color"], Outcome::Value(Value::from("red")));

        let probs = prediction["color_probs"].as_distribution().unwrap();
        assert_eq!(probs.len(), 2);
        assert!((probs.values().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(probs["red"] > probs["blue"]);
    }

    #[test]
    fn numeric_labels_are_read_back_as_numbers() {
        let inputs = vec![record! { "x" => 0.0 }, record! { "x" => 1.0 }];
        let outputs = vec![record! { "grade" => 1 }, record! { "grade" => 2 }];
        let mut categories = BTreeMap::new();
        let mut weights = Weights::new();

        train(&inputs, &outputs, &mut weights, &config(), &mut categories).unwrap();
        let prediction = predict(&record! { "x" => 1.0 }, &weights, &categories);

        assert!(matches!(prediction["grade"], Outcome::Value(Value::Int(_))));
    }

    #[test]
    fn single_category_targets_are_not_trained() {
        let inputs = vec![record! { "x" => 1.0 }, record! { "x" => 2.0 }];
        let outputs = vec![record! { "kind" => "only" }, record! { "kind" => "only" }];
        let mut categories = BTreeMap::new();
        let mut weights = Weights::new();

        let stats = train(&inputs, &outputs, &mut weights, &config(), &mut categories).unwrap();

        assert!(weights.is_empty());
        assert_eq!(stats, TrainStats::default());

        let prediction = predict(&record! { "x" => 1.0 }, &weights, &categories);
        assert_eq!(prediction["kind"], Outcome::Value(Value::from("only")));
        assert_eq!(prediction["kind_probs"].as_distribution().unwrap()["only"], 1.0);
    }
}
