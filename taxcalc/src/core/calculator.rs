//! Progressive personal income tax computation.

use serde::Serialize;

use crate::core::schedule::{
    BRACKETS, DEDUCTION, SOCIAL_INSURANCE_RATE, contains, lower_bound, width,
};

/// Tax charged inside a single bracket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BracketCharge {
    pub lower: f64,
    pub upper: Option<f64>,
    pub rate: f64,
    /// Part of taxable income that falls inside this bracket.
    pub portion: f64,
    pub amount: f64,
}

/// Full breakdown of how a tax figure was reached.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub gross_income: f64,
    pub deduction: f64,
    pub social_insurance: f64,
    pub taxable_income: f64,
    /// Charges for every bracket that received income, lowest first.
    pub charges: Vec<BracketCharge>,
    pub tax: f64,
}

/// Mandatory social insurance withheld from `gross_income`.
pub fn social_insurance(gross_income: f64) -> f64 {
    gross_income * SOCIAL_INSURANCE_RATE
}

/// Taxable income left after the flat deduction and social insurance.
pub fn taxable_income(gross_income: f64) -> f64 {
    gross_income - DEDUCTION - social_insurance(gross_income)
}

/// Charges for `taxable`, lowest bracket first, ending with the bracket
/// that contains it. Filled brackets are charged their full width.
fn charges(taxable: f64) -> impl Iterator<Item = BracketCharge> {
    let mut done = false;
    BRACKETS
        .iter()
        .enumerate()
        .map_while(move |(index, bracket)| {
            if done {
                return None;
            }
            let lower = lower_bound(index);
            let portion = match width(index) {
                Some(width) if !contains(index, taxable) => width,
                _ => {
                    done = true;
                    taxable - lower
                }
            };
            Some(BracketCharge {
                lower,
                upper: bracket.upper,
                rate: bracket.rate,
                portion,
                amount: portion * bracket.rate,
            })
        })
}

fn total(charges: impl Iterator<Item = BracketCharge>) -> f64 {
    charges.fold(0.0, |tax, charge| tax + charge.amount)
}

/// Compute the tax owed on `gross_income`.
///
/// Incomes whose taxable part is zero or negative owe nothing; negative
/// gross income is not rejected. Filled brackets are summed lowest first
/// and the marginal portion is added last, with no rounding.
pub fn personal_income_tax(gross_income: f64) -> f64 {
    let taxable = taxable_income(gross_income);
    if taxable <= 0.0 {
        return 0.0;
    }
    total(charges(taxable))
}

/// Compute the tax owed together with the per-bracket breakdown.
///
/// `Assessment::tax` is always identical to [`personal_income_tax`].
pub fn assess(gross_income: f64) -> Assessment {
    let taxable = taxable_income(gross_income);
    let charges: Vec<BracketCharge> = if taxable <= 0.0 {
        Vec::new()
    } else {
        charges(taxable).collect()
    };
    Assessment {
        gross_income,
        deduction: DEDUCTION,
        social_insurance: social_insurance(gross_income),
        taxable_income: taxable,
        tax: total(charges.iter().copied()),
        charges,
    }
}
