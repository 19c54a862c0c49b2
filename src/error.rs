use thiserror::Error;

// Failures the engine reports as values. Geometry and transforms are total
// and never produce these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
  #[error("Input missing: {0}")]
  InputMissing(String),

  #[error("Timestamp {t} outside of pose range [{first}, {last}]")]
  OutOfRange { t: i64, first: i64, last: i64 },

  #[error("Degenerate geometry: {0}")]
  DegenerateGeometry(String),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
