//! Fatal error kinds for the classifier. All are terminal: the caller gets a
//! single descriptive message and the run's transient buffers are dropped by
//! normal Rust scope exit (no manual free path is required).
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FmaskError {
    #[error("band accessor read failed at row {row} (band {band}): {source}")]
    Io {
        row: usize,
        band: String,
        source: String,
    },

    #[error("transient buffer allocation failed: {0}")]
    Alloc(String),

    #[error("local-minima filler failed on {label}: {source}")]
    Fill { label: String, source: String },

    #[error("percentile estimator failed: {0}")]
    Percentile(String),
}
