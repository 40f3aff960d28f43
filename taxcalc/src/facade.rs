//! The remotely callable tax operation, independent of transport.
//!
//! Adapters (CLI, JSON over HTTP, SOAP) decode a [`CalculateRequest`], hand
//! it to a [`TaxService`], and encode the [`CalculateResponse`]. Nothing in
//! here knows how the values travel.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::calculator::{Assessment, assess, personal_income_tax};

/// Stable name of the single exposed operation.
pub const OPERATION_NAME: &str = "calculatePersonalIncomeTax";

/// Input of `calculatePersonalIncomeTax`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    pub gross_income: f64,
}

/// Output of `calculatePersonalIncomeTax`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculateResponse {
    pub tax: f64,
}

/// Service contract shared by every transport.
///
/// Implementations hold no mutable state, so one instance may serve
/// concurrent calls from any number of worker threads.
pub trait TaxService: Send + Sync {
    /// Tax owed on `gross_income`. Total over all inputs; never fails.
    fn calculate_personal_income_tax(&self, gross_income: f64) -> f64;

    fn handle(&self, request: CalculateRequest) -> CalculateResponse {
        CalculateResponse {
            tax: self.calculate_personal_income_tax(request.gross_income),
        }
    }

    /// Per-bracket breakdown of the figure returned by
    /// [`TaxService::calculate_personal_income_tax`].
    ///
    /// The default walks the fixed schedule; a service that computes tax
    /// differently must override both methods so they agree.
    fn assess(&self, gross_income: f64) -> Assessment {
        assess(gross_income)
    }
}

/// Default service backed by the fixed progressive schedule.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonalIncomeTaxService;

impl PersonalIncomeTaxService {
    pub fn new() -> Self {
        Self
    }
}

impl TaxService for PersonalIncomeTaxService {
    fn calculate_personal_income_tax(&self, gross_income: f64) -> f64 {
        let tax = personal_income_tax(gross_income);
        debug!(gross_income, tax, operation = OPERATION_NAME, "tax calculated");
        tax
    }
}
