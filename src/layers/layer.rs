use rand::Rng;

use crate::layers::neuron::Neuron;

#[derive(Debug, Clone)]
pub struct Layer {
    pub neurons: Vec<Neuron>,
}

impl Layer {
    /// Input layer: weightless neurons mirroring the features.
    pub fn sensors(size: usize) -> Layer {
        Layer { neurons: (0..size).map(|_| Neuron::sensor()).collect() }
    }

    pub fn new<R: Rng + ?Sized>(size: usize, input_size: usize, rng: &mut R) -> Layer {
        Layer { neurons: (0..size).map(|_| Neuron::new(input_size, rng)).collect() }
    }

    pub fn size(&self) -> usize {
        self.neurons.len()
    }

    pub fn is_sensor_layer(&self) -> bool {
        self.neurons.first().map_or(true, Neuron::is_sensor)
    }

    pub fn outputs(&self) -> Vec<f64> {
        self.neurons.iter().map(|n| n.output).collect()
    }

    /// Writes features straight into sensor outputs.
    pub fn assign(&mut self, values: &[f64]) {
        for (n, v) in self.neurons.iter_mut().zip(values) {
            n.output = *v;
        }
    }

    pub fn activate_from(&mut self, previous: &Layer) {
        for n in &mut self.neurons {
            n.activate(&previous.neurons);
        }
    }

    pub fn reset_errors(&mut self) {
        for n in &mut self.neurons {
            n.error = 0.0;
        }
    }

    /// Backpropagates every neuron of this layer into `previous`.
    ///
    /// Each neuron only adds into `previous`, so the order inside the layer
    /// does not matter; `previous` must not be processed before this returns.
    pub fn backpropagate_into(&mut self, previous: &mut Layer, learning_rate: f64) {
        for n in &mut self.neurons {
            n.backpropagate_and_update(&mut previous.neurons, learning_rate);
        }
    }
}
