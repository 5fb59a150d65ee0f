/// Failures surfaced by network construction and the training/inference calls.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NetworkError {
    /// Fewer than the sensor and output layers were requested.
    #[error("network needs at least two layers (sensors and outputs), got {0}")]
    TooFewLayers(usize),

    #[error("layer {index} has no neurons")]
    EmptyLayer { index: usize },

    #[error("invalid training parameters: {0}")]
    InvalidParams(String),

    /// A `;`-separated structure string that could not be parsed.
    #[error("invalid network structure '{0}'")]
    InvalidStructure(String),

    /// Sample width differs from the sensor layer width.
    #[error("sample has {actual} inputs but the sensor layer has {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("label {label} is outside the {classes} output classes")]
    LabelOutOfRange { label: usize, classes: usize },

    #[error("cannot train on an unlabeled sample")]
    Unlabeled,

    #[error("sample has not been run through the network")]
    NotEvaluated,

    #[error("cannot train on an empty sample set")]
    EmptySet,
}

impl NetworkError {
    /// True for errors raised while building a network; nothing was created.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            NetworkError::TooFewLayers(_)
                | NetworkError::EmptyLayer { .. }
                | NetworkError::InvalidParams(_)
                | NetworkError::InvalidStructure(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, NetworkError>;
