/// Turns a vector of scores into a probability distribution.
///
/// The maximum score is subtracted before exponentiating so large scores
/// cannot overflow.
pub fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let exp: Vec<f64> = scores.iter().map(|&s| (s - max).exp()).collect();
    let sum: f64 = exp.iter().sum();

    exp.iter().map(|&e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let sum: f64 = probs.iter().sum();

        assert!((sum - 1.0).abs() < 1e-12);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn survives_huge_scores() {
        let probs = softmax(&[1000.0, 1000.0]);
        assert_eq!(probs, vec![0.5, 0.5]);
    }

    #[test]
    fn empty_scores() {
        assert!(softmax(&[]).is_empty());
    }
}
