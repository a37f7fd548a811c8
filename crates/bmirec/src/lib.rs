//! `bmirec` - Record Body Mass Index calculations in a local database
//!
//! This library validates measurement input, computes and classifies BMI,
//! stores every result in `SQLite`, and renders the stored history.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod calculator;
pub mod chart;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod record;
pub mod storage;

pub use calculator::{Calculation, Calculator};
pub use config::Config;
pub use engine::{categorize, compute_bmi, validate_and_normalize, Category, Measurement};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use record::{BmiRecord, RecordId};
pub use storage::{Store, StoreStats};
