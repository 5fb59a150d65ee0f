use std::fmt;

use serde::{Deserialize, Serialize};

/// The shapes the generator can draw. The discriminant is the class index
/// the network's output layer uses for that shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FigureType {
    Triangle = 0,
    Rectangle = 1,
    Circle = 2,
    Sinusoid = 3,
}

impl FigureType {
    pub const ALL: [FigureType; 4] = [
        FigureType::Triangle,
        FigureType::Rectangle,
        FigureType::Circle,
        FigureType::Sinusoid,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<FigureType> {
        FigureType::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            FigureType::Triangle => "triangle",
            FigureType::Rectangle => "rectangle",
            FigureType::Circle => "circle",
            FigureType::Sinusoid => "sinusoid",
        }
    }
}

impl fmt::Display for FigureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
