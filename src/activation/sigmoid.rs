use std::f64::consts::E;

/// Logistic activation used by every non-sensor neuron.
pub struct Sigmoid;

impl Sigmoid {
    /// σ(x) = 1 / (1 + e^(-x))
    pub fn function(x: f64) -> f64 {
        1.0 / (1.0 + E.powf(-x))
    }

    /// σ'(x) expressed through the already computed output y = σ(x).
    ///
    /// Backprop only ever has the neuron's output at hand (the weighted sum is
    /// discarded after activation), so this is the form the update rule uses.
    pub fn derivative_from_output(y: f64) -> f64 {
        y * (1.0 - y)
    }
}
