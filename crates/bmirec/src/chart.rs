//! Text rendering of stored records.

use std::fmt::Write as _;

use crate::engine::format_bmi;
use crate::record::BmiRecord;

/// Title printed above the bar chart.
pub const CHART_TITLE: &str = "BMI History";

/// Character used to draw bars.
const BAR_CHAR: char = '█';

/// Render one horizontal bar per record, labelled by name.
///
/// The largest BMI gets a bar `width` characters long; the others are
/// scaled against it. Every positive BMI gets at least one character.
/// Returns an empty string for no records.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn render_bar_chart(records: &[BmiRecord], precision: usize, width: usize) -> String {
    if records.is_empty() {
        return String::new();
    }

    let max_bmi = records.iter().map(|r| r.bmi).fold(0.0_f64, f64::max);
    let label_width = label_width(records, "Name");

    let mut out = String::new();
    let _ = writeln!(out, "{CHART_TITLE}");
    let _ = writeln!(out, "{}", "=".repeat(CHART_TITLE.len()));

    for record in records {
        let len = if max_bmi > 0.0 && record.bmi > 0.0 {
            ((record.bmi / max_bmi) * width as f64).round().max(1.0) as usize
        } else {
            0
        };
        let bar: String = std::iter::repeat(BAR_CHAR).take(len).collect();
        let _ = writeln!(
            out,
            "{:<label_width$} | {:<width$} {} ({})",
            record.name,
            bar,
            format_bmi(record.bmi, precision),
            record.category,
        );
    }

    out
}

/// Render records as a fixed-width table, oldest first.
#[must_use]
pub fn render_table(records: &[BmiRecord], precision: usize) -> String {
    let name_width = label_width(records, "Name");

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:<name_width$}  {:>11}  {:>11}  {:>8}  {:<13}  {}",
        "ID", "Name", "Height (cm)", "Weight (kg)", "BMI", "Category", "Recorded"
    );
    for record in records {
        let _ = writeln!(
            out,
            "{:>5}  {:<name_width$}  {:>11.1}  {:>11.1}  {:>8}  {:<13}  {}",
            record.id,
            record.name,
            record.height_cm(),
            record.weight_kg,
            format_bmi(record.bmi, precision),
            record.category.label(),
            record.created_at.format("%Y-%m-%d %H:%M:%S"),
        );
    }
    out
}

fn label_width(records: &[BmiRecord], header: &str) -> usize {
    records
        .iter()
        .map(|r| r.name.chars().count())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0)
}
