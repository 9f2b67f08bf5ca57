//! Telemetry data models.
//!
//! This module holds the local projections of the controller's state:
//! the bounded series history used for charting and the latest-reading
//! projection shown as the headline values.
//!
//! ## Submodules
//!
//! - [`series`]: Bounded chronological history ([`SeriesBuffer`], [`Sample`])
//! - [`current`]: Latest known reading ([`CurrentReading`])

pub mod current;
pub mod series;

pub use current::CurrentReading;
pub use series::{Sample, SeriesBuffer, SERIES_CAPACITY};
