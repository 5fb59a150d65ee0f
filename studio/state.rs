use std::sync::{Arc, Mutex, atomic::AtomicBool, mpsc};
use tracing::warn;
use shapes_nn::{EpochStats, GeneratorError, Network, NetworkError, NetworkSpec, ShapeGenerator};

// ---------------------------------------------------------------------------
// Training status
// ---------------------------------------------------------------------------

pub enum TrainingStatus {
    /// No training has been started yet.
    Idle,
    /// Training is running in a background thread, which owns the network.
    Running {
        stop_flag:  Arc<AtomicBool>,
        epoch_rx:   Arc<Mutex<mpsc::Receiver<EpochStats>>>,
        max_epochs: usize,
    },
    /// Training completed (naturally or via Stop) and the network is back.
    Done {
        accuracy:         f64,
        elapsed_total_ms: u64,
        was_stopped:      bool,
    },
    /// Training failed with an error.
    Failed {
        reason: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

// ---------------------------------------------------------------------------
// Main state struct
// ---------------------------------------------------------------------------

pub struct StudioState {
    /// Architecture the current network was built from.
    pub spec:          NetworkSpec,
    /// `None` while a background training run holds the network.
    pub network:       Option<Network>,
    pub generator:     ShapeGenerator,
    /// Current training lifecycle state.
    pub training:      TrainingStatus,
    /// Epoch stats of the most recent training run.
    pub epoch_history: Vec<EpochStats>,
    /// PNG of the last generated figure.
    pub figure_png:    Option<Vec<u8>>,
}

impl StudioState {
    pub fn new(spec: NetworkSpec) -> Result<Self, StudioError> {
        spec.validate_for_generator()?;
        let network = spec.build()?;
        let generator = build_generator(&spec)?;
        Ok(StudioState {
            spec,
            network:       Some(network),
            generator,
            training:      TrainingStatus::Idle,
            epoch_history: Vec::new(),
            figure_png:    None,
        })
    }

    /// Replaces the network (and the generator when its config changed).
    pub fn rebuild(&mut self, spec: NetworkSpec) -> Result<(), StudioError> {
        spec.validate_for_generator()?;
        let network = spec.build()?;
        if spec.generator != self.spec.generator {
            self.generator = build_generator(&spec)?;
        }
        self.spec = spec;
        self.network = Some(network);
        self.training = TrainingStatus::Idle;
        self.epoch_history.clear();
        Ok(())
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.training, TrainingStatus::Running { .. })
    }

    /// Moves any epoch stats the training thread has sent so far into
    /// `epoch_history`.
    pub fn drain_progress(&mut self) {
        let received: Vec<EpochStats> = match &self.training {
            TrainingStatus::Running { epoch_rx, .. } => {
                let rx = epoch_rx.lock().unwrap();
                rx.try_iter().collect()
            }
            _ => Vec::new(),
        };
        self.epoch_history.extend(received);
    }

    /// Renders the current figure as PNG and keeps it for `/figure.png`.
    pub fn snapshot_figure(&mut self) {
        self.figure_png = match self.generator.figure_png() {
            Ok(png) => Some(png),
            Err(e) => {
                warn!(error = %e, "cannot render figure");
                None
            }
        };
    }
}

fn build_generator(spec: &NetworkSpec) -> Result<ShapeGenerator, GeneratorError> {
    match spec.seed {
        Some(seed) => ShapeGenerator::seeded(spec.generator.clone(), seed),
        None       => ShapeGenerator::new(spec.generator.clone()),
    }
}

/// Shared state type, an `Arc<Mutex<StudioState>>` passed to every handler.
pub type SharedState = Arc<Mutex<StudioState>>;

#[cfg(test)]
mod tests {
    use super::*;
    use shapes_nn::GeneratorConfig;

    fn seeded_spec(seed: u64) -> NetworkSpec {
        NetworkSpec { seed: Some(seed), ..NetworkSpec::default() }
    }

    #[test]
    fn new_state_holds_an_idle_network() {
        let state = StudioState::new(seeded_spec(1)).unwrap();
        assert!(state.network.is_some());
        assert!(!state.is_busy());
        assert!(state.figure_png.is_none());
    }

    #[test]
    fn rebuild_with_new_generator_config_keeps_the_seed() {
        let mut state = StudioState::new(seeded_spec(3)).unwrap();
        let config = GeneratorConfig { normalize: true, ..GeneratorConfig::default() };
        let spec = NetworkSpec { generator: config.clone(), ..seeded_spec(9) };
        state.rebuild(spec).unwrap();

        let drawn = state.generator.generate_set(5);
        let expected = ShapeGenerator::seeded(config, 9).unwrap().generate_set(5);
        for (a, b) in drawn.iter().zip(expected.iter()) {
            assert_eq!(a.input(), b.input());
            assert_eq!(a.actual_class(), b.actual_class());
        }
    }

    #[test]
    fn rebuild_rejects_a_structure_the_generator_cannot_feed() {
        let mut state = StudioState::new(seeded_spec(1)).unwrap();
        let spec = NetworkSpec { layers: vec![400, 8, 3], ..seeded_spec(1) };
        assert!(state.rebuild(spec).is_err());
        assert_eq!(state.spec.structure(), "400;10;4");
    }
}
