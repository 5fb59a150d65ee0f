use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, trace, warn};

use crate::layers::layer::Layer;
use crate::network::error::{NetworkError, Result};
use crate::sample::{Sample, SampleSet};
use crate::train::loop_fn::train_loop;
use crate::train::train_config::TrainConfig;
use crate::train::train_params::TrainParams;

/// A fully-connected feed-forward network of sigmoid neurons.
///
/// Layer 0 is the sensor layer, the last layer is the output layer with one
/// neuron per class. Layer sizes never change after construction.
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<Layer>,
    params: TrainParams,
}

impl Network {
    /// Builds a network with thread-local randomness and default parameters.
    pub fn new(layer_sizes: &[usize]) -> Result<Network> {
        Network::with_rng(layer_sizes, TrainParams::default(), &mut rand::thread_rng())
    }

    /// Builds a network whose initial weights are reproducible from `seed`.
    pub fn seeded(layer_sizes: &[usize], params: TrainParams, seed: u64) -> Result<Network> {
        Network::with_rng(layer_sizes, params, &mut StdRng::seed_from_u64(seed))
    }

    /// Builds a network drawing its initial weights from `rng`.
    ///
    /// Everything is validated before the first layer is allocated, so a
    /// failed call leaves nothing behind.
    pub fn with_rng<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        params: TrainParams,
        rng: &mut R,
    ) -> Result<Network> {
        if layer_sizes.len() < 2 {
            return Err(NetworkError::TooFewLayers(layer_sizes.len()));
        }
        if let Some(index) = layer_sizes.iter().position(|&size| size == 0) {
            return Err(NetworkError::EmptyLayer { index });
        }
        params.validate()?;

        let mut layers = Vec::with_capacity(layer_sizes.len());
        layers.push(Layer::sensors(layer_sizes[0]));
        for pair in layer_sizes.windows(2) {
            layers.push(Layer::new(pair[1], pair[0], rng));
        }

        debug!(?layer_sizes, "network created");
        Ok(Network { layers, params })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_sizes(&self) -> Vec<usize> {
        self.layers.iter().map(Layer::size).collect()
    }

    pub fn sensor_width(&self) -> usize {
        self.layers[0].size()
    }

    pub fn output_width(&self) -> usize {
        self.output_layer().size()
    }

    pub fn params(&self) -> &TrainParams {
        &self.params
    }

    pub fn set_params(&mut self, params: TrainParams) -> Result<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    pub fn learning_rate(&self) -> f64 {
        self.params.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) -> Result<()> {
        self.set_params(TrainParams { learning_rate, ..self.params })
    }

    /// Current activations of the output layer. All zeros until the first
    /// forward pass.
    pub fn outputs(&self) -> Vec<f64> {
        self.output_layer().outputs()
    }

    fn output_layer(&self) -> &Layer {
        &self.layers[self.layers.len() - 1]
    }

    fn check_sample(&self, sample: &Sample) -> Result<()> {
        let expected = self.sensor_width();
        let actual = sample.input().len();
        if actual != expected {
            return Err(NetworkError::ShapeMismatch { expected, actual });
        }
        if let Some(label) = sample.actual_class() {
            let classes = self.output_width();
            if label >= classes {
                return Err(NetworkError::LabelOutOfRange { label, classes });
            }
        }
        Ok(())
    }

    /// Forward pass: feeds the sample through every layer and stores the
    /// response, error and recognized class in the sample.
    pub fn run(&mut self, sample: &mut Sample) -> Result<()> {
        self.check_sample(sample)?;

        self.layers[0].assign(sample.input());
        for i in 1..self.layers.len() {
            let (lower, upper) = self.layers.split_at_mut(i);
            upper[0].activate_from(&lower[i - 1]);
        }

        sample.process_output(&self.outputs());
        trace!(recognized = ?sample.recognized_class(), "forward pass");
        Ok(())
    }

    /// Backward pass for a sample previously passed to `run`: distributes
    /// its error layer by layer, from the outputs down, updating weights on
    /// the way.
    pub fn back_prop(&mut self, sample: &Sample, learning_rate: f64) -> Result<()> {
        let error = sample.error().ok_or(NetworkError::NotEvaluated)?;
        let expected = self.output_width();
        if error.len() != expected {
            return Err(NetworkError::ShapeMismatch { expected, actual: error.len() });
        }

        for layer in &mut self.layers {
            layer.reset_errors();
        }

        let last = self.layers.len() - 1;
        for (n, e) in self.layers[last].neurons.iter_mut().zip(error) {
            n.error = *e;
        }

        for i in (1..self.layers.len()).rev() {
            let (lower, upper) = self.layers.split_at_mut(i);
            upper[0].backpropagate_into(&mut lower[i - 1], learning_rate);
        }
        // Sensors have no weights; their share of the error is dropped.
        self.layers[0].reset_errors();
        Ok(())
    }

    /// Classifies one sample without touching the weights.
    pub fn predict(&mut self, sample: &mut Sample) -> Result<Option<usize>> {
        self.run(sample)?;
        Ok(sample.recognized_class())
    }

    /// Trains on a single sample until it is classified correctly with a
    /// squared error below the threshold.
    ///
    /// Returns the number of backward passes performed: `0` when the sample
    /// was already learned, `max_attempts` when the sample was given up on.
    pub fn train_one(&mut self, sample: &mut Sample) -> Result<usize> {
        if sample.actual_class().is_none() {
            return Err(NetworkError::Unlabeled);
        }

        let mut attempts = 0;
        while attempts < self.params.max_attempts {
            self.run(sample)?;

            let squared_error = sample.squared_error().unwrap_or(f64::INFINITY);
            debug!(
                attempt = attempts,
                squared_error,
                recognized = ?sample.recognized_class(),
                actual = ?sample.actual_class(),
                "training step"
            );
            if squared_error < self.params.error_threshold && sample.correct() {
                return Ok(attempts);
            }

            attempts += 1;
            self.back_prop(sample, self.params.learning_rate)?;
        }

        warn!(attempts, actual = ?sample.actual_class(), "sample not learned, giving up");
        Ok(attempts)
    }

    /// Trains over `samples` for at most `max_epochs` epochs, stopping early
    /// once the share of samples already learned before their update exceeds
    /// `acceptable_accuracy`. Returns that share for the last epoch run.
    pub fn train_on_data_set(
        &mut self,
        samples: &mut SampleSet,
        max_epochs: usize,
        acceptable_accuracy: f64,
    ) -> Result<f64> {
        train_loop(self, samples, &TrainConfig::new(max_epochs, acceptable_accuracy))
    }

    /// Fraction of `samples` classified correctly, or `None` for an empty set.
    pub fn test_on_data_set(&mut self, samples: &mut SampleSet) -> Result<Option<f64>> {
        if samples.is_empty() {
            return Ok(None);
        }
        let mut correct = 0;
        for sample in samples.iter_mut() {
            self.predict(sample)?;
            if sample.correct() {
                correct += 1;
            }
        }
        Ok(Some(correct as f64 / samples.len() as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights_snapshot(network: &Network) -> Vec<Vec<f64>> {
        network.layers()
            .iter()
            .flat_map(|l| l.neurons.iter())
            .map(|n| {
                let mut w = n.weights().to_vec();
                w.push(n.bias_weight());
                w
            })
            .collect()
    }

    #[test]
    fn construction_requires_two_layers() {
        assert!(Network::new(&[400, 3]).is_ok());

        let err = Network::new(&[5]).unwrap_err();
        assert_eq!(err, NetworkError::TooFewLayers(1));
        assert!(err.is_configuration());
        assert!(Network::new(&[]).unwrap_err().is_configuration());
    }

    #[test]
    fn construction_rejects_empty_layers() {
        let err = Network::new(&[4, 0, 2]).unwrap_err();
        assert_eq!(err, NetworkError::EmptyLayer { index: 1 });
    }

    #[test]
    fn construction_rejects_bad_params() {
        let params = TrainParams::with_learning_rate(-1.0);
        assert!(Network::seeded(&[2, 2], params, 0).unwrap_err().is_configuration());
    }

    #[test]
    fn outputs_match_output_width() {
        for sizes in [vec![3, 1], vec![10, 5, 4], vec![2, 8, 8, 6]] {
            let network = Network::seeded(&sizes, TrainParams::default(), 3).unwrap();
            assert_eq!(network.outputs().len(), *sizes.last().unwrap());
            assert_eq!(network.layer_sizes(), sizes);
        }
    }

    #[test]
    fn same_seed_gives_same_network() {
        let a = Network::seeded(&[6, 4, 2], TrainParams::default(), 11).unwrap();
        let b = Network::seeded(&[6, 4, 2], TrainParams::default(), 11).unwrap();
        assert_eq!(weights_snapshot(&a), weights_snapshot(&b));
    }

    #[test]
    fn shape_mismatch_leaves_network_untouched() {
        let mut network = Network::seeded(&[3, 2], TrainParams::default(), 5).unwrap();
        let before = weights_snapshot(&network);
        let mut sample = Sample::labeled(&[1.0, 2.0], 0);

        let err = network.train_one(&mut sample).unwrap_err();
        assert_eq!(err, NetworkError::ShapeMismatch { expected: 3, actual: 2 });
        assert_eq!(weights_snapshot(&network), before);
        assert!(sample.output().is_none());
    }

    #[test]
    fn label_outside_outputs_is_rejected() {
        let mut network = Network::seeded(&[2, 2], TrainParams::default(), 5).unwrap();
        let mut sample = Sample::labeled(&[1.0, 2.0], 4);
        assert_eq!(
            network.run(&mut sample).unwrap_err(),
            NetworkError::LabelOutOfRange { label: 4, classes: 2 }
        );
    }

    #[test]
    fn predict_is_repeatable() {
        let mut network = Network::seeded(&[4, 3, 2], TrainParams::default(), 9).unwrap();
        let mut sample = Sample::labeled(&[0.1, 0.9, 0.4, 0.0], 1);

        let first = network.predict(&mut sample).unwrap();
        let first_output = sample.output().unwrap().to_vec();
        let second = network.predict(&mut sample).unwrap();

        assert_eq!(first, second);
        assert_eq!(sample.output().unwrap(), first_output.as_slice());
        assert_eq!(network.outputs(), first_output);
    }

    #[test]
    fn back_prop_needs_a_forward_pass() {
        let mut network = Network::seeded(&[2, 2], TrainParams::default(), 1).unwrap();
        let sample = Sample::labeled(&[0.0, 1.0], 0);
        assert_eq!(network.back_prop(&sample, 0.1).unwrap_err(), NetworkError::NotEvaluated);
    }

    #[test]
    fn back_prop_reduces_error_on_the_same_sample() {
        let params = TrainParams::with_learning_rate(0.5);
        let mut network = Network::seeded(&[3, 4, 2], params, 21).unwrap();
        let mut sample = Sample::labeled(&[0.2, 0.8, 0.5], 1);

        network.run(&mut sample).unwrap();
        let before = sample.squared_error().unwrap();
        network.back_prop(&sample, 0.5).unwrap();
        network.run(&mut sample).unwrap();
        assert!(sample.squared_error().unwrap() < before);

        assert!(network.layers().iter().flat_map(|l| l.neurons.iter()).all(|n| n.error == 0.0));
    }

    #[test]
    fn train_one_learns_a_single_sample() {
        let params = TrainParams::with_learning_rate(0.5);
        let mut network = Network::seeded(&[4, 6, 3], params, 17).unwrap();
        let mut sample = Sample::labeled(&[0.5, 0.1, 0.9, 0.3], 2);

        let attempts = network.train_one(&mut sample).unwrap();
        assert!(attempts <= 100);
        if attempts < 100 {
            network.predict(&mut sample).unwrap();
            assert!(sample.squared_error().unwrap() < 0.2);
            assert!(sample.correct());
            assert_eq!(network.train_one(&mut sample).unwrap(), 0);
        }
    }

    #[test]
    fn train_one_stops_at_the_attempt_cap() {
        let params = TrainParams { learning_rate: 1e-9, max_attempts: 3, ..Default::default() };
        let mut network = Network::seeded(&[2, 2], params, 2).unwrap();
        let mut sample = Sample::labeled(&[0.0, 0.0], 0);
        assert_eq!(network.train_one(&mut sample).unwrap(), 3);
    }

    #[test]
    fn train_one_rejects_unlabeled_samples() {
        let mut network = Network::seeded(&[2, 2], TrainParams::default(), 2).unwrap();
        let mut sample = Sample::unlabeled(&[0.0, 1.0]);
        assert_eq!(network.train_one(&mut sample).unwrap_err(), NetworkError::Unlabeled);
    }

    #[test]
    fn test_on_empty_set_is_undefined() {
        let mut network = Network::seeded(&[2, 2], TrainParams::default(), 2).unwrap();
        assert_eq!(network.test_on_data_set(&mut SampleSet::new()).unwrap(), None);
    }

    #[test]
    fn learning_rate_is_mutable() {
        let mut network = Network::seeded(&[2, 2], TrainParams::default(), 2).unwrap();
        network.set_learning_rate(0.3).unwrap();
        assert_eq!(network.learning_rate(), 0.3);
        assert!(network.set_learning_rate(0.0).is_err());
        assert_eq!(network.learning_rate(), 0.3);
    }
}
