use serde::{Serialize, Deserialize};

use crate::generator::figure::FigureType;
use crate::generator::generator::GeneratorConfig;
use crate::network::error::{NetworkError, Result};
use crate::network::network::Network;
use crate::train::train_params::TrainParams;

/// A serializable description of a network: its layer structure, the
/// training parameters it is built with, and the generator whose samples
/// it is meant to classify.
///
/// Only the architecture is stored; trained weights are never written out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name shown by the drivers.
    pub name: String,
    /// Neuron count per layer, sensors first.
    pub layers: Vec<usize>,
    #[serde(default)]
    pub train: TrainParams,
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Seed for the initial weights; fresh randomness when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Optional class names for the output layer.
    #[serde(default)]
    pub output_labels: Option<Vec<String>>,
}

impl Default for NetworkSpec {
    fn default() -> Self {
        let generator = GeneratorConfig::default();
        NetworkSpec {
            name: "shapes".into(),
            layers: vec![generator.feature_width(), 10, generator.figure_count],
            train: TrainParams::default(),
            generator,
            seed: None,
            output_labels: None,
        }
    }
}

/// Parses a `;`-separated layer structure such as `"400;8;4"`.
/// Whitespace around entries is ignored.
pub fn parse_structure(text: &str) -> Result<Vec<usize>> {
    text.split(';')
        .map(|part| part.trim().parse::<usize>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| NetworkError::InvalidStructure(text.to_owned()))
}

impl NetworkSpec {
    pub fn from_structure(name: &str, structure: &str) -> Result<NetworkSpec> {
        Ok(NetworkSpec {
            name: name.to_owned(),
            layers: parse_structure(structure)?,
            ..NetworkSpec::default()
        })
    }

    /// `"400;10;4"` form of the layer list.
    pub fn structure(&self) -> String {
        self.layers.iter().map(|l| l.to_string()).collect::<Vec<_>>().join(";")
    }

    /// Checks that the layer list fits the generator: the sensor layer must
    /// take one input per feature, the output layer one neuron per figure.
    pub fn validate_for_generator(&self) -> Result<()> {
        if self.layers.len() < 2 {
            return Err(NetworkError::TooFewLayers(self.layers.len()));
        }
        let features = self.generator.feature_width();
        let figures = self.generator.figure_count;
        let first = self.layers[0];
        let last = self.layers[self.layers.len() - 1];
        if first != features || last != figures {
            return Err(NetworkError::InvalidStructure(format!(
                "{} (expected {features} sensors and {figures} outputs)",
                self.structure()
            )));
        }
        Ok(())
    }

    /// Label of output `index`: the configured name, else the figure name.
    pub fn label(&self, index: usize) -> String {
        self.output_labels
            .as_ref()
            .and_then(|labels| labels.get(index).cloned())
            .or_else(|| FigureType::from_index(index).map(|f| f.name().to_owned()))
            .unwrap_or_else(|| index.to_string())
    }

    pub fn build(&self) -> Result<Network> {
        match self.seed {
            Some(seed) => Network::seeded(&self.layers, self.train, seed),
            None => Network::with_rng(&self.layers, self.train, &mut rand::thread_rng()),
        }
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> std::io::Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}
