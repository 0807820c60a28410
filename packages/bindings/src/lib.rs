use napi::Result as NapiResult;
#[cfg(not(test))]
use napi_derive::napi;

use loan_fee_core::fee::{calculate_loan_fee, fee_schedule, LoanFeeInput, LoanTerm};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// Registration needs a Node host, so unit tests call the plain functions.

/// Fee for a `LoanFeeInput` JSON document; returns the computation envelope.
#[cfg_attr(not(test), napi)]
pub fn calculate_fee(input_json: String) -> NapiResult<String> {
    let input: LoanFeeInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = calculate_loan_fee(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Breakpoints of the fee table for a term in months.
#[cfg_attr(not(test), napi)]
pub fn fee_table(term_months: u32) -> NapiResult<String> {
    let term = LoanTerm::try_from(term_months).map_err(to_napi_error)?;
    serde_json::to_string(&fee_schedule(term)).map_err(to_napi_error)
}
