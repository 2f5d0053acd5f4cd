//! Line-oriented calculator engine.
//!
//! Evaluates calculator input as it is typed: localized glyphs, implied
//! multiplication, degree-based trigonometry and π, with 28-digit decimal
//! arithmetic. Also converts between metric length, area and volume units.
//! The [`worker`] module serves both over a line-delimited JSON channel.

pub mod calculator;
pub mod config;
pub mod conversion;
pub mod worker;

pub use calculator::{CalcError, CalcResult, Engine, ErrorKind};
pub use config::{EngineConfig, Settings};
