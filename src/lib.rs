pub mod activation;
pub mod generator;
pub mod layers;
pub mod loss;
pub mod network;
pub mod sample;
pub mod train;

// Convenience re-exports
pub use generator::{FigureType, GeneratorConfig, GeneratorError, ShapeGenerator};
pub use layers::{Layer, Neuron};
pub use network::{Network, NetworkError, NetworkSpec};
pub use sample::{Sample, SampleSet};
pub use train::{train_loop, EpochStats, TrainConfig, TrainParams};
