use arcstr::ArcStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("no pin named `{pin}` on cell `{cell}`")]
    MissingPin { cell: ArcStr, pin: ArcStr },

    #[error("track conflict on layer {layer}: `{a}` and `{b}` overlap")]
    TrackConflict { layer: u32, a: String, b: String },

    #[error("column overlap: {0}")]
    ColumnOverlap(String),

    #[error("geometry error: {0}")]
    Geometry(String),

    #[error("coordinate {coord} is not on a track of layer {layer}")]
    OffGrid { layer: u32, coord: i64 },

    #[error("invalid draw state transition: {0}")]
    State(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("error serializing/deserializing JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("error parsing TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, GenError>;

/// Shorthand for building a configuration error.
#[macro_export]
macro_rules! config_err {
    ($($arg:tt)*) => {
        $crate::error::GenError::Config(format!($($arg)*))
    };
}
