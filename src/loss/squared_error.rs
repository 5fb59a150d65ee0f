pub struct SquaredError;

impl SquaredError {
    /// Scalar loss: Σ(error²). Not averaged, so the stopping threshold does
    /// not depend on the number of output classes.
    pub fn loss(error: &[f64]) -> f64 {
        error.iter().map(|e| e.powi(2)).sum()
    }

    /// Per-output signal against a one-hot target: (target - output).
    ///
    /// `label == None` yields an all-zero target.
    pub fn one_hot_error(output: &[f64], label: Option<usize>) -> Vec<f64> {
        output.iter()
            .enumerate()
            .map(|(i, o)| (if Some(i) == label { 1.0 } else { 0.0 }) - o)
            .collect()
    }
}
