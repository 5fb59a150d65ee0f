use rand::Rng;

use crate::activation::sigmoid::Sigmoid;

/// Constant input multiplied by every neuron's bias weight.
pub const BIAS_SIGNAL: f64 = -1.0;

const INIT_MIN_WEIGHT: f64 = -1.0;
const INIT_MAX_WEIGHT: f64 = 1.0;
const INIT_BIAS_WEIGHT: f64 = 0.01;

/// A single unit of the network.
///
/// Sensor neurons have no incoming weights: their `output` is written
/// directly from the sample's features. Every other neuron owns one weight
/// per neuron of the previous layer, which it reaches through the slice the
/// network hands to `activate` and `backpropagate_and_update`.
#[derive(Debug, Clone)]
pub struct Neuron {
    weights: Vec<f64>,
    bias_weight: f64,
    pub output: f64,
    pub error: f64,
}

impl Neuron {
    pub fn sensor() -> Neuron {
        Neuron {
            weights: Vec::new(),
            bias_weight: INIT_BIAS_WEIGHT,
            output: 0.0,
            error: 0.0,
        }
    }

    /// Creates a neuron fed by `input_size` neurons, with weights drawn
    /// uniformly from [-1, 1).
    pub fn new<R: Rng + ?Sized>(input_size: usize, rng: &mut R) -> Neuron {
        let weights = (0..input_size)
            .map(|_| rng.gen_range(INIT_MIN_WEIGHT..INIT_MAX_WEIGHT))
            .collect();
        Neuron {
            weights,
            bias_weight: INIT_BIAS_WEIGHT,
            output: 0.0,
            error: 0.0,
        }
    }

    pub fn is_sensor(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn bias_weight(&self) -> f64 {
        self.bias_weight
    }

    /// Recomputes `output` from the previous layer's current outputs.
    /// Must not be called on sensors.
    pub fn activate(&mut self, previous: &[Neuron]) {
        debug_assert!(!self.is_sensor(), "sensor outputs are assigned, not computed");
        debug_assert_eq!(previous.len(), self.weights.len());

        let charge = self.bias_weight * BIAS_SIGNAL
            + previous.iter()
                .zip(self.weights.iter())
                .map(|(n, w)| n.output * w)
                .sum::<f64>();
        self.output = Sigmoid::function(charge);
    }

    /// Turns the accumulated raw error into a gradient, pushes it into the
    /// previous layer, then updates the bias and incoming weights.
    ///
    /// `error` must already hold every contribution from the layer above.
    /// The error pushed down uses the weights as they were before this
    /// update. Leaves `error` at zero.
    pub fn backpropagate_and_update(&mut self, previous: &mut [Neuron], learning_rate: f64) {
        if self.is_sensor() {
            self.error = 0.0;
            return;
        }
        debug_assert_eq!(previous.len(), self.weights.len());

        let delta = self.error * Sigmoid::derivative_from_output(self.output);

        self.bias_weight += learning_rate * delta * BIAS_SIGNAL;

        for (n, w) in previous.iter_mut().zip(self.weights.iter()) {
            n.error += delta * w;
        }
        for (w, n) in self.weights.iter_mut().zip(previous.iter()) {
            *w += learning_rate * delta * n.output;
        }

        self.error = 0.0;
    }
}
