//! The fixed progressive bracket schedule.
//!
//! Bounds and rates are part of the wire contract: results must match the
//! published calculation bit for bit, so the table is a constant and never
//! loaded from configuration.

use serde::Serialize;

/// Flat monthly threshold subtracted before any tax applies.
pub const DEDUCTION: f64 = 5000.0;

/// Share of gross income withheld as mandatory social insurance.
pub const SOCIAL_INSURANCE_RATE: f64 = 0.1;

/// One marginal-rate band of taxable income.
///
/// A band covers `(lower, upper]`; `upper == None` marks the open top band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub upper: Option<f64>,
    pub rate: f64,
}

/// Brackets in ascending order of taxable income.
pub const BRACKETS: [Bracket; 7] = [
    Bracket {
        upper: Some(3000.0),
        rate: 0.03,
    },
    Bracket {
        upper: Some(12000.0),
        rate: 0.1,
    },
    Bracket {
        upper: Some(25000.0),
        rate: 0.2,
    },
    Bracket {
        upper: Some(35000.0),
        rate: 0.25,
    },
    Bracket {
        upper: Some(55000.0),
        rate: 0.3,
    },
    Bracket {
        upper: Some(80000.0),
        rate: 0.35,
    },
    Bracket {
        upper: None,
        rate: 0.45,
    },
];

/// Lower bound (exclusive) of the bracket at `index`.
///
/// The first band starts at zero; every other band starts where the
/// previous one ends.
pub fn lower_bound(index: usize) -> f64 {
    match index.checked_sub(1) {
        Some(prev) => BRACKETS[prev].upper.unwrap_or(f64::INFINITY),
        None => 0.0,
    }
}

/// True if `taxable` falls inside the bracket at `index`.
pub fn contains(index: usize, taxable: f64) -> bool {
    match BRACKETS[index].upper {
        Some(upper) => taxable <= upper,
        None => true,
    }
}

/// Width of a bounded bracket; `None` for the open top band.
pub fn width(index: usize) -> Option<f64> {
    BRACKETS[index]
        .upper
        .map(|upper| upper - lower_bound(index))
}

/// A bracket with both bounds spelled out, as published to callers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BracketRow {
    pub lower: f64,
    pub upper: Option<f64>,
    pub rate: f64,
}

/// The whole schedule as rows, lowest bracket first.
pub fn rows() -> Vec<BracketRow> {
    BRACKETS
        .iter()
        .enumerate()
        .map(|(index, bracket)| BracketRow {
            lower: lower_bound(index),
            upper: bracket.upper,
            rate: bracket.rate,
        })
        .collect()
}
