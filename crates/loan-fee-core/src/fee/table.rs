use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::LoanFeeError;
use crate::fee::term::LoanTerm;
use crate::types::Money;
use crate::LoanFeeResult;

// ---------------------------------------------------------------------------
// Reference configuration
// ---------------------------------------------------------------------------

pub const MIN_LOAN_AMOUNT: Money = dec!(1000);
pub const MAX_LOAN_AMOUNT: Money = dec!(20000);
const BREAKPOINT_STEP: Money = dec!(1000);

const TWELVE_MONTH_FEES: [u32; 20] = [
    50, 90, 90, 115, 100, 120, 140, 160, 180, 200, 220, 240, 260, 280, 300, 320, 340, 360, 380,
    400,
];

const TWENTY_FOUR_MONTH_FEES: [u32; 20] = [
    70, 100, 120, 160, 200, 240, 280, 320, 360, 400, 440, 480, 520, 560, 600, 640, 680, 720, 760,
    800,
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single (threshold, fee) point of a fee table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub amount: Money,
    pub fee: Money,
}

/// Breakpoints sorted by strictly ascending amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Breakpoint>", into = "Vec<Breakpoint>")]
pub struct FeeTable {
    breakpoints: Vec<Breakpoint>,
}

/// Fee tables keyed by term, together with the configured loan amount range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeStructure {
    pub min_amount: Money,
    pub max_amount: Money,
    pub twelve_months: FeeTable,
    pub twenty_four_months: FeeTable,
}

// ---------------------------------------------------------------------------
// FeeTable
// ---------------------------------------------------------------------------

impl FeeTable {
    /// Build a table, rejecting empty, unsorted, duplicate, non-positive
    /// amounts and negative fees.
    pub fn new(breakpoints: Vec<Breakpoint>) -> LoanFeeResult<Self> {
        if breakpoints.is_empty() {
            return Err(LoanFeeError::InvalidTable {
                reason: "Fee table must contain at least one breakpoint".into(),
            });
        }
        for bp in &breakpoints {
            if bp.amount <= Decimal::ZERO {
                return Err(LoanFeeError::InvalidTable {
                    reason: format!("Breakpoint amount {} must be positive", bp.amount),
                });
            }
            if bp.fee < Decimal::ZERO {
                return Err(LoanFeeError::InvalidTable {
                    reason: format!("Fee {} at breakpoint {} is negative", bp.fee, bp.amount),
                });
            }
        }
        if let Some(pair) = breakpoints.windows(2).find(|w| w[0].amount >= w[1].amount) {
            return Err(LoanFeeError::InvalidTable {
                reason: format!(
                    "Breakpoints must strictly increase ({} followed by {})",
                    pair[0].amount, pair[1].amount
                ),
            });
        }
        Ok(Self { breakpoints })
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    /// Fee stored at exactly `amount`, if it is a breakpoint.
    pub fn fee_at(&self, amount: Money) -> Option<Money> {
        self.breakpoints
            .binary_search_by(|bp| bp.amount.cmp(&amount))
            .ok()
            .map(|idx| self.breakpoints[idx].fee)
    }

    /// Largest breakpoint amount <= `amount`.
    pub fn floor_key(&self, amount: Money) -> Option<Money> {
        let idx = self.breakpoints.partition_point(|bp| bp.amount <= amount);
        idx.checked_sub(1).map(|i| self.breakpoints[i].amount)
    }

    /// Smallest breakpoint amount >= `amount`.
    pub fn ceil_key(&self, amount: Money) -> Option<Money> {
        let idx = self.breakpoints.partition_point(|bp| bp.amount < amount);
        self.breakpoints.get(idx).map(|bp| bp.amount)
    }

    /// Evenly spaced breakpoints starting at `start`; callers own validation.
    fn stepped(start: Money, step: Money, fees: &[u32]) -> Self {
        let breakpoints = fees
            .iter()
            .enumerate()
            .map(|(i, fee)| Breakpoint {
                amount: start + step * Decimal::from(i as u64),
                fee: Decimal::from(*fee),
            })
            .collect();
        Self { breakpoints }
    }
}

impl TryFrom<Vec<Breakpoint>> for FeeTable {
    type Error = LoanFeeError;

    fn try_from(breakpoints: Vec<Breakpoint>) -> Result<Self, Self::Error> {
        FeeTable::new(breakpoints)
    }
}

impl From<FeeTable> for Vec<Breakpoint> {
    fn from(table: FeeTable) -> Self {
        table.breakpoints
    }
}

// ---------------------------------------------------------------------------
// FeeStructure
// ---------------------------------------------------------------------------

impl FeeStructure {
    pub fn new(
        min_amount: Money,
        max_amount: Money,
        twelve_months: FeeTable,
        twenty_four_months: FeeTable,
    ) -> LoanFeeResult<Self> {
        let structure = Self {
            min_amount,
            max_amount,
            twelve_months,
            twenty_four_months,
        };
        structure.validate()?;
        Ok(structure)
    }

    pub fn table(&self, term: LoanTerm) -> &FeeTable {
        match term {
            LoanTerm::TwelveMonths => &self.twelve_months,
            LoanTerm::TwentyFourMonths => &self.twenty_four_months,
        }
    }

    /// Every table must span exactly [min_amount, max_amount].
    pub fn validate(&self) -> LoanFeeResult<()> {
        if self.min_amount <= Decimal::ZERO || self.min_amount >= self.max_amount {
            return Err(LoanFeeError::InvalidTable {
                reason: format!(
                    "Loan amount range [{}, {}] must be positive and non-empty",
                    self.min_amount, self.max_amount
                ),
            });
        }
        for term in LoanTerm::ALL {
            let table = self.table(term);
            let first = table.breakpoints().first().map(|bp| bp.amount);
            let last = table.breakpoints().last().map(|bp| bp.amount);
            if first != Some(self.min_amount) {
                return Err(LoanFeeError::InvalidTable {
                    reason: format!(
                        "{term} table must start at the minimum loan amount {}",
                        self.min_amount
                    ),
                });
            }
            if last != Some(self.max_amount) {
                return Err(LoanFeeError::InvalidTable {
                    reason: format!(
                        "{term} table must end at the maximum loan amount {}",
                        self.max_amount
                    ),
                });
            }
        }
        Ok(())
    }

    fn reference() -> Self {
        Self {
            min_amount: MIN_LOAN_AMOUNT,
            max_amount: MAX_LOAN_AMOUNT,
            twelve_months: FeeTable::stepped(MIN_LOAN_AMOUNT, BREAKPOINT_STEP, &TWELVE_MONTH_FEES),
            twenty_four_months: FeeTable::stepped(
                MIN_LOAN_AMOUNT,
                BREAKPOINT_STEP,
                &TWENTY_FOUR_MONTH_FEES,
            ),
        }
    }
}

/// The built-in 12/24 month fee structure, built once per process.
pub fn reference_structure() -> &'static FeeStructure {
    static REFERENCE: OnceLock<FeeStructure> = OnceLock::new();
    REFERENCE.get_or_init(FeeStructure::reference)
}
