//! Fmask-style multispectral scene classifier (spec.md §1–§9).
//!
//! The crate's public surface is small: feed a [`io::BandAccessor`]
//! implementation and two caller-owned output buffers to [`classify::classify`]
//! and get back [`classify::SceneStats`].
pub mod bands;
pub mod classify;
pub mod error;
pub mod fill;
pub mod io;
pub mod mask;
pub mod percentile;

pub use bands::{Band, SceneMeta, ALL_BANDS, FILL_PIXEL, NBAND};
pub use classify::{classify, classify_with_filler, SceneStats};
pub use error::FmaskError;
pub use fill::{LocalMinimaFiller, PriorityFloodFiller};
pub use io::{BandAccessor, InMemoryBandAccessor};
pub use mask::Confidence;
