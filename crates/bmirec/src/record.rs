//! Stored BMI records.
//!
//! A [`BmiRecord`] is the immutable result of one successful calculation,
//! as read back from the record store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::{Category, Measurement};

/// Store-assigned identifier of a record. Strictly increasing per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl RecordId {
    /// The raw rowid.
    #[must_use]
    pub fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// One stored BMI calculation.
///
/// `bmi` is the value computed before insertion; it is never recomputed
/// from `height_m` and `weight_kg`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmiRecord {
    /// Identifier assigned by the store.
    pub id: RecordId,
    /// Person the record belongs to.
    pub name: String,
    /// Height in meters.
    pub height_m: f64,
    /// Weight in kilograms.
    pub weight_kg: f64,
    /// Body mass index.
    pub bmi: f64,
    /// Classification of `bmi`.
    pub category: Category,
    /// When the store inserted the record.
    pub created_at: DateTime<Utc>,
}

impl BmiRecord {
    /// The measurement this record was created from.
    #[must_use]
    pub fn measurement(&self) -> Measurement {
        Measurement {
            name: self.name.clone(),
            height_m: self.height_m,
            weight_kg: self.weight_kg,
        }
    }

    /// Height converted back to centimeters.
    #[must_use]
    pub fn height_cm(&self) -> f64 {
        self.height_m * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> BmiRecord {
        BmiRecord {
            id: RecordId(7),
            name: "Sam".to_string(),
            height_m: 1.8,
            weight_kg: 81.0,
            bmi: 25.0,
            category: Category::Overweight,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_record_id_display() {
        assert_eq!(RecordId(42).to_string(), "42");
        assert_eq!(RecordId(42).get(), 42);
    }

    #[test]
    fn test_record_id_ordering() {
        assert!(RecordId(1) < RecordId(2));
    }

    #[test]
    fn test_record_measurement() {
        let record = sample_record();
        let m = record.measurement();
        assert_eq!(m.name, "Sam");
        assert_eq!(m.height_m, 1.8);
        assert_eq!(m.weight_kg, 81.0);
    }

    #[test]
    fn test_record_height_cm() {
        let record = sample_record();
        assert!((record.height_cm() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_serialization() {
        let record = sample_record();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["name"], "Sam");
        assert_eq!(json["category"], "Overweight");

        let back: BmiRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
