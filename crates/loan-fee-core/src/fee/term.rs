use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LoanFeeError;
use crate::types::Months;

/// Supported loan terms. Serialised as the number of months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum LoanTerm {
    TwelveMonths,
    TwentyFourMonths,
}

impl LoanTerm {
    pub const ALL: [LoanTerm; 2] = [LoanTerm::TwelveMonths, LoanTerm::TwentyFourMonths];

    pub fn months(self) -> Months {
        match self {
            LoanTerm::TwelveMonths => 12,
            LoanTerm::TwentyFourMonths => 24,
        }
    }
}

impl TryFrom<u32> for LoanTerm {
    type Error = LoanFeeError;

    fn try_from(months: u32) -> Result<Self, Self::Error> {
        match months {
            12 => Ok(LoanTerm::TwelveMonths),
            24 => Ok(LoanTerm::TwentyFourMonths),
            other => Err(LoanFeeError::InvalidTerm(other)),
        }
    }
}

impl From<LoanTerm> for u32 {
    fn from(term: LoanTerm) -> Self {
        term.months()
    }
}

impl fmt::Display for LoanTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} months", self.months())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_terms_parse() {
        assert_eq!(LoanTerm::try_from(12).unwrap(), LoanTerm::TwelveMonths);
        assert_eq!(LoanTerm::try_from(24).unwrap(), LoanTerm::TwentyFourMonths);
    }

    #[test]
    fn test_unsupported_term_rejected() {
        for months in [0, 6, 18, 36] {
            let err = LoanTerm::try_from(months).unwrap_err();
            assert!(matches!(err, LoanFeeError::InvalidTerm(m) if m == months));
        }
    }

    #[test]
    fn test_serde_as_months() {
        let json = serde_json::to_string(&LoanTerm::TwentyFourMonths).unwrap();
        assert_eq!(json, "24");
        let term: LoanTerm = serde_json::from_str("12").unwrap();
        assert_eq!(term, LoanTerm::TwelveMonths);
        assert!(serde_json::from_str::<LoanTerm>("36").is_err());
    }
}
