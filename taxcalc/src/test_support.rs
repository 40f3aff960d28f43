//! Test-only helpers for tax assertions.

/// Assert two tax amounts agree to within rounding noise.
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// Literal if/else ladder the bracket loop must reproduce bit for bit.
pub fn reference_tax(gross_income: f64) -> f64 {
    let threshold = 5000.0;
    let social_insurance = gross_income * 0.1;
    let taxable = gross_income - threshold - social_insurance;

    if taxable <= 0.0 {
        0.0
    } else if taxable <= 3000.0 {
        taxable * 0.03
    } else if taxable <= 12000.0 {
        3000.0 * 0.03 + (taxable - 3000.0) * 0.1
    } else if taxable <= 25000.0 {
        3000.0 * 0.03 + 9000.0 * 0.1 + (taxable - 12000.0) * 0.2
    } else if taxable <= 35000.0 {
        3000.0 * 0.03 + 9000.0 * 0.1 + 13000.0 * 0.2 + (taxable - 25000.0) * 0.25
    } else if taxable <= 55000.0 {
        3000.0 * 0.03 + 9000.0 * 0.1 + 13000.0 * 0.2 + 10000.0 * 0.25 + (taxable - 35000.0) * 0.3
    } else if taxable <= 80000.0 {
        3000.0 * 0.03
            + 9000.0 * 0.1
            + 13000.0 * 0.2
            + 10000.0 * 0.25
            + 20000.0 * 0.3
            + (taxable - 55000.0) * 0.35
    } else {
        3000.0 * 0.03
            + 9000.0 * 0.1
            + 13000.0 * 0.2
            + 10000.0 * 0.25
            + 20000.0 * 0.3
            + 25000.0 * 0.35
            + (taxable - 80000.0) * 0.45
    }
}
