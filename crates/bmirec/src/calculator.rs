//! The calculate and view-history actions.
//!
//! [`Calculator`] owns the record store for its whole lifetime and is the
//! only thing front ends talk to: raw form text goes through the engine and
//! into the store, and the store's contents come back out for display.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::engine::{categorize, validate_and_normalize, Category, Measurement};
use crate::error::Result;
use crate::record::{BmiRecord, RecordId};
use crate::storage::{Store, StoreStats};

/// Outcome of a successful calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calculation {
    /// Id of the record that was appended.
    pub id: RecordId,
    /// The validated input.
    #[serde(flatten)]
    pub measurement: Measurement,
    /// Unrounded BMI, as stored.
    pub bmi: f64,
    /// Classification of `bmi`.
    pub category: Category,
}

/// Front-end facing handle over the record store.
#[derive(Debug)]
pub struct Calculator {
    store: Store,
}

impl Calculator {
    /// Wrap an already opened store.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Open the store configured in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened.
    pub fn open(config: &Config) -> Result<Self> {
        let store = Store::open_with_options(config.database_path(), config.store_options())?;
        Ok(Self::new(store))
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Validate form input, compute and classify the BMI, and record it.
    ///
    /// Nothing is written unless validation succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] for rejected input, or a
    /// storage error if the record cannot be written.
    pub fn calculate(
        &self,
        name: &str,
        raw_height_cm: &str,
        raw_weight_kg: &str,
    ) -> Result<Calculation> {
        let measurement = validate_and_normalize(name, raw_height_cm, raw_weight_kg)?;
        let bmi = measurement.bmi();
        let category = categorize(bmi);
        debug!(name = %measurement.name, bmi, %category, "Computed BMI");

        let id = self.store.append(&measurement, bmi, category)?;
        info!(%id, name = %measurement.name, %category, "Recorded BMI");

        Ok(Calculation {
            id,
            measurement,
            bmi,
            category,
        })
    }

    /// All stored records, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn history(&self) -> Result<Vec<BmiRecord>> {
        self.store.list_all()
    }

    /// Statistics about the underlying store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn stats(&self) -> Result<StoreStats> {
        self.store.stats()
    }

    /// Release the store. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails to close.
    pub fn close(&mut self) -> Result<()> {
        self.store.close()
    }
}
