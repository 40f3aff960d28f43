//! Personal income tax calculation exposed as a single service operation.
//!
//! The crate keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic tax logic (bracket schedule,
//!   calculation, breakdown). No I/O, fully testable in isolation.
//! - **[`facade`]**: The remotely callable contract
//!   (`calculatePersonalIncomeTax`) as a transport-independent trait with
//!   typed request/response values.
//!
//! Transports (the `taxcalc` CLI, the `taxcalc-server` HTTP bindings) are
//! adapters around [`facade::TaxService`].

pub mod core;
pub mod exit_codes;
pub mod facade;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
