pub mod canvas;
pub mod figure;
pub mod generator;

pub use canvas::{Canvas, CANVAS_SIDE, FEATURE_WIDTH};
pub use figure::FigureType;
pub use generator::{GeneratorConfig, GeneratorError, ShapeGenerator};
