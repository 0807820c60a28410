use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LoanFeeError;
use crate::fee::application::LoanApplication;
use crate::fee::table::{reference_structure, FeeStructure, FeeTable};
use crate::fee::term::LoanTerm;
use crate::types::Money;
use crate::LoanFeeResult;

/// Principal plus fee is always rounded up to a multiple of this.
pub const ROUNDING_INCREMENT: Money = dec!(5);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How amounts outside [min_amount, max_amount] are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangePolicy {
    /// Reject with `AmountOutOfRange`
    #[default]
    Strict,
    /// Fall back to the configured min/max amounts as the missing bound
    Clamp,
}

/// Intermediate values of a single fee resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub term: LoanTerm,
    pub amount: Money,
    pub lower_bound: Money,
    pub upper_bound: Money,
    /// Fee before the total is rounded
    pub interpolated_fee: Money,
    pub fee: Money,
    /// True when the amount lay outside the configured range
    pub clamped: bool,
}

/// Resolves fees against a validated fee structure.
#[derive(Debug, Clone, Copy)]
pub struct FeeResolver<'a> {
    structure: &'a FeeStructure,
    policy: RangePolicy,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

impl FeeResolver<'static> {
    /// Resolver over the built-in 12/24 month tables.
    pub fn reference() -> Self {
        Self {
            structure: reference_structure(),
            policy: RangePolicy::default(),
        }
    }
}

impl<'a> FeeResolver<'a> {
    pub fn new(structure: &'a FeeStructure) -> LoanFeeResult<Self> {
        structure.validate()?;
        Ok(Self {
            structure,
            policy: RangePolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: RangePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RangePolicy {
        self.policy
    }

    pub fn structure(&self) -> &'a FeeStructure {
        self.structure
    }

    /// Fee for borrowing `amount` over `term`.
    pub fn calculate(&self, term: LoanTerm, amount: Money) -> LoanFeeResult<Money> {
        self.breakdown(term, amount).map(|b| b.fee)
    }

    /// Same as [`calculate`](Self::calculate) for a raw month count.
    pub fn calculate_months(&self, months: u32, amount: Money) -> LoanFeeResult<Money> {
        self.calculate(LoanTerm::try_from(months)?, amount)
    }

    pub fn calculate_application(&self, application: &LoanApplication) -> LoanFeeResult<Money> {
        self.calculate_months(application.term(), application.amount())
    }

    /// Full resolution: bound lookup, interpolation, then rounding of the
    /// total repayable amount.
    pub fn breakdown(&self, term: LoanTerm, amount: Money) -> LoanFeeResult<FeeBreakdown> {
        let min = self.structure.min_amount;
        let max = self.structure.max_amount;
        let clamped = amount < min || amount > max;

        if clamped {
            match self.policy {
                RangePolicy::Strict => {
                    return Err(LoanFeeError::AmountOutOfRange { amount, min, max });
                }
                RangePolicy::Clamp => {
                    debug!(%amount, %min, %max, "loan amount outside fee table range, clamping");
                }
            }
        }

        let table = self.structure.table(term);
        let lower_bound = table.floor_key(amount).unwrap_or(min);
        let upper_bound = table.ceil_key(amount).unwrap_or(max);

        let interpolated_fee = interpolate(table, amount, lower_bound, upper_bound)?;
        let fee = amount
            .checked_add(interpolated_fee)
            .and_then(|total| round_up(total, ROUNDING_INCREMENT))
            .and_then(|total| total.checked_sub(amount))
            .ok_or_else(|| LoanFeeError::Overflow {
                context: format!("rounding total repayable for amount {amount}"),
            })?;

        debug!(
            term = term.months(),
            %amount,
            %lower_bound,
            %upper_bound,
            %interpolated_fee,
            %fee,
            "resolved loan fee"
        );

        Ok(FeeBreakdown {
            term,
            amount,
            lower_bound,
            upper_bound,
            interpolated_fee,
            fee,
            clamped,
        })
    }
}

fn fee_at(table: &FeeTable, amount: Money) -> LoanFeeResult<Money> {
    table
        .fee_at(amount)
        .ok_or(LoanFeeError::MissingBreakpoint { amount })
}

/// Linear blend of the fees at `lower` and `upper`; exact breakpoint fee when
/// the two coincide.
fn interpolate(table: &FeeTable, amount: Money, lower: Money, upper: Money) -> LoanFeeResult<Money> {
    let lower_fee = fee_at(table, lower)?;
    if lower == upper {
        return Ok(lower_fee);
    }
    let upper_fee = fee_at(table, upper)?;
    let ratio = (amount - lower) / (upper - lower);
    Ok(lower_fee + (upper_fee - lower_fee) * ratio)
}

/// Smallest multiple of `increment` that is >= `value`, or None on overflow.
pub fn round_up(value: Decimal, increment: Decimal) -> Option<Decimal> {
    value.checked_div(increment)?.ceil().checked_mul(increment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fee::table::Breakpoint;
    use rust_decimal_macros::dec;

    fn resolver() -> FeeResolver<'static> {
        FeeResolver::reference()
    }

    #[test]
    fn test_round_up() {
        assert_eq!(round_up(dec!(1050), dec!(5)), Some(dec!(1050)));
        assert_eq!(round_up(dec!(1051), dec!(5)), Some(dec!(1055)));
        assert_eq!(round_up(dec!(1054.99), dec!(5)), Some(dec!(1055)));
        assert_eq!(round_up(dec!(0.01), dec!(5)), Some(dec!(5)));
        // MAX ends in 5, so it rounds to itself
        assert_eq!(round_up(Decimal::MAX, dec!(5)), Some(Decimal::MAX));
    }

    #[test]
    fn test_exact_breakpoint_no_interpolation() {
        let b = resolver().breakdown(LoanTerm::TwelveMonths, dec!(1000)).unwrap();
        assert_eq!(b.lower_bound, dec!(1000));
        assert_eq!(b.upper_bound, dec!(1000));
        assert_eq!(b.interpolated_fee, dec!(50));
        assert_eq!(b.fee, dec!(50));
        assert!(!b.clamped);
    }

    #[test]
    fn test_midpoint_interpolation() {
        // 50 + (90 - 50) * 0.5 = 70; 1570 is already a multiple of 5
        let b = resolver().breakdown(LoanTerm::TwelveMonths, dec!(1500)).unwrap();
        assert_eq!(b.lower_bound, dec!(1000));
        assert_eq!(b.upper_bound, dec!(2000));
        assert_eq!(b.interpolated_fee, dec!(70));
        assert_eq!(b.fee, dec!(70));
    }

    #[test]
    fn test_twenty_four_month_interpolation() {
        // 100 + (120 - 100) * 0.75 = 115
        let fee = resolver()
            .calculate(LoanTerm::TwentyFourMonths, dec!(2750))
            .unwrap();
        assert_eq!(fee, dec!(115));
    }

    #[test]
    fn test_rounding_applies_to_total() {
        // 50 + 40 * 0.001 = 50.04; total 1051.04 rounds up to 1055
        let b = resolver().breakdown(LoanTerm::TwelveMonths, dec!(1001)).unwrap();
        assert_eq!(b.interpolated_fee, dec!(50.04));
        assert_eq!(b.fee, dec!(54));
        assert_eq!((b.amount + b.fee) % dec!(5), Decimal::ZERO);
    }

    #[test]
    fn test_decreasing_segment_interpolates() {
        // 12-month table drops from 115 at 4000 to 100 at 5000
        let b = resolver().breakdown(LoanTerm::TwelveMonths, dec!(4500)).unwrap();
        assert_eq!(b.interpolated_fee, dec!(107.5));
        // 4607.5 -> 4610
        assert_eq!(b.fee, dec!(110));
    }

    #[test]
    fn test_strict_rejects_out_of_range() {
        for amount in [dec!(999.99), dec!(20000.01), dec!(0), dec!(-100)] {
            let err = resolver().calculate(LoanTerm::TwelveMonths, amount).unwrap_err();
            assert!(matches!(err, LoanFeeError::AmountOutOfRange { .. }));
        }
    }

    #[test]
    fn test_clamp_below_minimum() {
        let r = resolver().with_policy(RangePolicy::Clamp);
        let b = r.breakdown(LoanTerm::TwelveMonths, dec!(500)).unwrap();
        assert_eq!(b.lower_bound, dec!(1000));
        assert_eq!(b.upper_bound, dec!(1000));
        assert_eq!(b.interpolated_fee, dec!(50));
        // 550 is a multiple of 5
        assert_eq!(b.fee, dec!(50));
        assert!(b.clamped);
    }

    #[test]
    fn test_clamp_above_maximum() {
        let r = resolver().with_policy(RangePolicy::Clamp);
        let b = r.breakdown(LoanTerm::TwentyFourMonths, dec!(25003)).unwrap();
        assert_eq!(b.lower_bound, dec!(20000));
        assert_eq!(b.upper_bound, dec!(20000));
        assert_eq!(b.interpolated_fee, dec!(800));
        // 25803 -> 25805
        assert_eq!(b.fee, dec!(802));
    }

    #[test]
    fn test_clamp_overflow_is_an_error() {
        let r = resolver().with_policy(RangePolicy::Clamp);
        let err = r.calculate(LoanTerm::TwelveMonths, Decimal::MAX).unwrap_err();
        assert!(matches!(err, LoanFeeError::Overflow { .. }));

        let err = r
            .calculate(LoanTerm::TwentyFourMonths, Decimal::MAX - dec!(100))
            .unwrap_err();
        assert!(matches!(err, LoanFeeError::Overflow { .. }));
    }

    #[test]
    fn test_invalid_term_months() {
        let err = resolver().calculate_months(36, dec!(5000)).unwrap_err();
        assert!(matches!(err, LoanFeeError::InvalidTerm(36)));
    }

    #[test]
    fn test_custom_structure() {
        let table = FeeTable::new(vec![
            Breakpoint { amount: dec!(100), fee: dec!(10) },
            Breakpoint { amount: dec!(200), fee: dec!(30) },
        ])
        .unwrap();
        let structure =
            FeeStructure::new(dec!(100), dec!(200), table.clone(), table).unwrap();
        let r = FeeResolver::new(&structure).unwrap();
        // 10 + 20 * 0.5 = 20; 170 is a multiple of 5
        assert_eq!(r.calculate(LoanTerm::TwelveMonths, dec!(150)).unwrap(), dec!(20));
    }

    #[test]
    fn test_unvalidated_structure_rejected() {
        let table = FeeTable::new(vec![Breakpoint { amount: dec!(100), fee: dec!(10) }]).unwrap();
        let structure = FeeStructure {
            min_amount: dec!(50),
            max_amount: dec!(100),
            twelve_months: table.clone(),
            twenty_four_months: table,
        };
        assert!(FeeResolver::new(&structure).is_err());
    }
}
