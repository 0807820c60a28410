use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::fee::resolver::{FeeResolver, RangePolicy, ROUNDING_INCREMENT};
use crate::fee::table::{reference_structure, Breakpoint};
use crate::fee::term::LoanTerm;
use crate::types::*;
use crate::LoanFeeResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A requested loan: term in months and principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanApplication {
    term: Months,
    amount: Money,
}

impl LoanApplication {
    pub fn new(term: Months, amount: Money) -> Self {
        Self { term, amount }
    }

    pub fn term(&self) -> Months {
        self.term
    }

    pub fn amount(&self) -> Money {
        self.amount
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanFeeInput {
    /// Loan term in months (12 or 24)
    pub term: Months,
    pub amount: Money,
    /// Fall back to the boundary breakpoints instead of rejecting amounts
    /// outside the fee table range
    #[serde(default)]
    pub clamp_out_of_range: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanFeeOutput {
    pub term_months: Months,
    pub amount: Money,
    pub lower_bound: Money,
    pub upper_bound: Money,
    pub interpolated_fee: Money,
    pub fee: Money,
    /// Principal plus fee, always a multiple of the rounding increment
    pub total_repayable: Money,
}

impl From<&LoanFeeInput> for LoanApplication {
    fn from(input: &LoanFeeInput) -> Self {
        LoanApplication::new(input.term, input.amount)
    }
}

// ---------------------------------------------------------------------------
// Main calculation
// ---------------------------------------------------------------------------

/// Calculate the one-off fee for a loan against the reference fee tables.
///
/// The fee is linearly interpolated between the two breakpoints bounding the
/// amount, then adjusted so that principal plus fee is rounded up to the next
/// multiple of 5.
pub fn calculate_loan_fee(input: &LoanFeeInput) -> LoanFeeResult<ComputationOutput<LoanFeeOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let policy = if input.clamp_out_of_range {
        RangePolicy::Clamp
    } else {
        RangePolicy::Strict
    };
    let resolver = FeeResolver::reference().with_policy(policy);
    let application = LoanApplication::from(input);

    let term = LoanTerm::try_from(application.term())?;
    let breakdown = resolver.breakdown(term, application.amount())?;

    if breakdown.clamped {
        let structure = resolver.structure();
        warnings.push(format!(
            "Amount {} outside fee table range [{}, {}]; boundary breakpoint used",
            breakdown.amount, structure.min_amount, structure.max_amount
        ));
    }

    let output = LoanFeeOutput {
        term_months: term.months(),
        amount: breakdown.amount,
        lower_bound: breakdown.lower_bound,
        upper_bound: breakdown.upper_bound,
        interpolated_fee: breakdown.interpolated_fee,
        fee: breakdown.fee,
        total_repayable: breakdown.amount + breakdown.fee,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "interpolation": "linear between bounding breakpoints",
        "rounding": format!("principal + fee rounded up to a multiple of {ROUNDING_INCREMENT}"),
        "range_policy": policy,
    });

    Ok(with_metadata(
        "Piecewise-linear fee table with rounded total repayable",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Breakpoints of the reference fee table for `term`.
pub fn fee_schedule(term: LoanTerm) -> Vec<Breakpoint> {
    reference_structure().table(term).breakpoints().to_vec()
}
