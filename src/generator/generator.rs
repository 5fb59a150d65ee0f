use std::f64::consts::PI;

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::generator::canvas::{Canvas, CANVAS_SIDE, FEATURE_WIDTH};
use crate::generator::figure::FigureType;
use crate::sample::{Sample, SampleSet};

/// Failures of the shape generator.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("at most {max} figure kinds are available, {requested} requested")]
    TooManyFigures { requested: usize, max: usize },

    #[error("figure count must be at least 1")]
    NoFigures,

    #[error("figure size {size} with jitter {jitter} does not fit the {side}px canvas")]
    FigureTooLarge { size: usize, jitter: usize, side: usize },

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// How figures are drawn and turned into features.
///
/// - `figure_count` : number of shape kinds in play (1..=4), taken in
///                     `FigureType` order
/// - `center_jitter`: horizontal offset of the triangle apex from the centre
/// - `size_jitter`  : spread of corner and centre positions, in pixels
/// - `figure_size`  : nominal bounding box side of a figure
/// - `normalize`    : divide projection counts by the canvas side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub figure_count: usize,
    pub center_jitter: usize,
    pub size_jitter: usize,
    pub figure_size: usize,
    pub normalize: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            figure_count: FigureType::ALL.len(),
            center_jitter: 20,
            size_jitter: 20,
            figure_size: 100,
            normalize: false,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self.figure_count == 0 {
            return Err(GeneratorError::NoFigures);
        }
        if self.figure_count > FigureType::ALL.len() {
            return Err(GeneratorError::TooManyFigures {
                requested: self.figure_count,
                max: FigureType::ALL.len(),
            });
        }
        if self.figure_size + self.size_jitter >= CANVAS_SIDE
            || self.center_jitter >= CANVAS_SIDE / 2
        {
            return Err(GeneratorError::FigureTooLarge {
                size: self.figure_size,
                jitter: self.size_jitter,
                side: CANVAS_SIDE,
            });
        }
        Ok(())
    }

    /// Width of the feature vectors produced with this configuration.
    pub fn feature_width(&self) -> usize {
        FEATURE_WIDTH
    }
}

/// Draws random figures and turns them into labeled samples.
pub struct ShapeGenerator {
    config: GeneratorConfig,
    canvas: Canvas,
    current: Option<FigureType>,
    rng: StdRng,
}

impl ShapeGenerator {
    pub fn new(config: GeneratorConfig) -> Result<ShapeGenerator, GeneratorError> {
        ShapeGenerator::with_rng(config, StdRng::from_entropy())
    }

    pub fn seeded(config: GeneratorConfig, seed: u64) -> Result<ShapeGenerator, GeneratorError> {
        ShapeGenerator::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GeneratorConfig, rng: StdRng) -> Result<ShapeGenerator, GeneratorError> {
        config.validate()?;
        Ok(ShapeGenerator { config, canvas: Canvas::new(), current: None, rng })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// The raster of the last drawn figure.
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn current_figure(&self) -> Option<FigureType> {
        self.current
    }

    /// PNG rendering of the last drawn figure.
    pub fn figure_png(&self) -> Result<Vec<u8>, GeneratorError> {
        Ok(self.canvas.to_png()?)
    }

    /// Clears the canvas and draws a figure of the requested kind, or of a
    /// random kind among the first `figure_count` when `kind` is `None` or
    /// not in play.
    pub fn generate(&mut self, kind: Option<FigureType>) -> FigureType {
        let kind = match kind {
            Some(k) if k.index() < self.config.figure_count => k,
            _ => FigureType::ALL[self.rng.gen_range(0..self.config.figure_count)],
        };

        self.canvas.clear();
        match kind {
            FigureType::Triangle => self.draw_triangle(),
            FigureType::Rectangle => self.draw_rectangle(),
            FigureType::Circle => self.draw_circle(),
            FigureType::Sinusoid => self.draw_sinusoid(),
        }
        trace!(%kind, pixels = self.canvas.filled(), "figure drawn");

        self.current = Some(kind);
        kind
    }

    /// Draws a random figure and returns its projection as a labeled sample.
    pub fn generate_sample(&mut self) -> Sample {
        let kind = self.generate(None);
        Sample::labeled(&self.canvas.projection(self.config.normalize), kind.index())
    }

    pub fn generate_set(&mut self, size: usize) -> SampleSet {
        (0..size).map(|_| self.generate_sample()).collect()
    }

    // -----------------------------------------------------------------------
    // Geometry
    // -----------------------------------------------------------------------

    /// Uniform offset in [-jitter/2, jitter/2).
    fn jitter(&mut self) -> i64 {
        let half = (self.config.size_jitter / 2) as i64;
        if half == 0 { 0 } else { self.rng.gen_range(-half..half) }
    }

    fn center() -> i64 {
        (CANVAS_SIDE / 2) as i64
    }

    fn left_upper(&mut self) -> (i64, i64) {
        let base = Self::center() - (self.config.figure_size / 2) as i64;
        (base + self.jitter(), base + self.jitter())
    }

    fn right_down(&mut self) -> (i64, i64) {
        let base = Self::center() + (self.config.figure_size / 2) as i64;
        (base + self.jitter(), base + self.jitter())
    }

    fn center_point(&mut self) -> (i64, i64) {
        (Self::center() + self.jitter(), Self::center() + self.jitter())
    }

    fn draw_triangle(&mut self) {
        let (left, top) = self.left_upper();
        let (right, bottom) = self.right_down();
        let apex = Self::center() + self.config.center_jitter as i64;

        self.canvas.line(left, bottom, apex, top);
        self.canvas.line(apex, top, right, bottom);
        self.canvas.line(right, bottom, left, bottom);
    }

    fn draw_rectangle(&mut self) {
        let (left, top) = self.left_upper();
        let (right, bottom) = self.right_down();

        self.canvas.line(left, top, right, top);
        self.canvas.line(right, top, right, bottom);
        self.canvas.line(right, bottom, left, bottom);
        self.canvas.line(left, bottom, left, top);
    }

    fn draw_circle(&mut self) {
        let (cx, cy) = self.center_point();
        let radius = self.rng.gen_range(50..65) as f64;

        let mut t = 0.0_f64;
        while t < 2.0 * PI {
            let x = cx as f64 + radius * t.cos();
            let y = cy as f64 + radius * t.sin();
            self.canvas.plot(x as i64, y as i64);
            t += 0.01;
        }
    }

    fn draw_sinusoid(&mut self) {
        let (left, top) = self.left_upper();
        let (right, bottom) = self.right_down();

        let amplitude = (bottom - top) / 2;
        let center_y = top + amplitude;
        let frequency = 0.25_f64;

        let mut x = left as f64;
        while x <= right as f64 {
            let y = (center_y as f64 + amplitude as f64 * (frequency * x).sin()).round();
            self.canvas.plot(x as i64, y as i64);
            x += 0.05;
        }
    }
}
