//! Deposit data structures matching the stored record format

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{FdError, FdResult};
use crate::projection::DepositResult;

/// Unit of the tenure magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TenureType {
    Years,
    Months,
    Days,
}

impl TenureType {
    /// Tenure length in years as used by the interest formula.
    /// Days use a fixed 365-day year.
    pub fn years(&self, value: u32) -> f64 {
        let value = value as f64;
        match self {
            TenureType::Years => value,
            TenureType::Months => value / 12.0,
            TenureType::Days => value / 365.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TenureType::Years => "Years",
            TenureType::Months => "Months",
            TenureType::Days => "Days",
        }
    }
}

impl fmt::Display for TenureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TenureType {
    type Err = FdError;

    fn from_str(s: &str) -> FdResult<Self> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "years" | "year" | "y" => Ok(TenureType::Years),
            "months" | "month" | "m" => Ok(TenureType::Months),
            "days" | "day" | "d" => Ok(TenureType::Days),
            _ => Err(FdError::invalid(
                "tenure_type",
                format!("unknown tenure type '{}'", s),
            )),
        }
    }
}

/// Compounding periods per year. Stored as the bare number (1, 2, 4 or 12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum CompoundingFrequency {
    Yearly,
    HalfYearly,
    Quarterly,
    Monthly,
}

impl CompoundingFrequency {
    pub fn periods_per_year(&self) -> u32 {
        match self {
            CompoundingFrequency::Yearly => 1,
            CompoundingFrequency::HalfYearly => 2,
            CompoundingFrequency::Quarterly => 4,
            CompoundingFrequency::Monthly => 12,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CompoundingFrequency::Yearly => "Yearly",
            CompoundingFrequency::HalfYearly => "Half-Yearly",
            CompoundingFrequency::Quarterly => "Quarterly",
            CompoundingFrequency::Monthly => "Monthly",
        }
    }
}

impl From<CompoundingFrequency> for u32 {
    fn from(freq: CompoundingFrequency) -> u32 {
        freq.periods_per_year()
    }
}

impl TryFrom<u32> for CompoundingFrequency {
    type Error = FdError;

    fn try_from(periods: u32) -> FdResult<Self> {
        match periods {
            1 => Ok(CompoundingFrequency::Yearly),
            2 => Ok(CompoundingFrequency::HalfYearly),
            4 => Ok(CompoundingFrequency::Quarterly),
            12 => Ok(CompoundingFrequency::Monthly),
            other => Err(FdError::invalid(
                "compounding_frequency",
                format!("{} periods per year is not supported (use 1, 2, 4 or 12)", other),
            )),
        }
    }
}

impl fmt::Display for CompoundingFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CompoundingFrequency {
    type Err = FdError;

    fn from_str(s: &str) -> FdResult<Self> {
        let s = s.trim();
        if let Ok(periods) = s.parse::<u32>() {
            return CompoundingFrequency::try_from(periods);
        }
        match s.to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "yearly" | "annual" | "annually" => Ok(CompoundingFrequency::Yearly),
            "halfyearly" | "semiannual" | "semiannually" => Ok(CompoundingFrequency::HalfYearly),
            "quarterly" => Ok(CompoundingFrequency::Quarterly),
            "monthly" => Ok(CompoundingFrequency::Monthly),
            _ => Err(FdError::invalid(
                "compounding_frequency",
                format!("unknown compounding frequency '{}'", s),
            )),
        }
    }
}

/// Parameters of a fixed deposit as entered by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositInput {
    /// Optional label, e.g. "Wedding Fund"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Amount deposited
    pub principal: f64,

    /// Nominal annual rate in percent (6.5 = 6.5%)
    pub rate: f64,

    /// Tenure magnitude, in units of `tenure_type`
    pub tenure_value: u32,

    pub tenure_type: TenureType,

    pub compounding_frequency: CompoundingFrequency,

    /// First day of the deposit
    pub start_date: NaiveDate,
}

impl DepositInput {
    pub fn new(
        principal: f64,
        rate: f64,
        tenure_value: u32,
        tenure_type: TenureType,
        compounding_frequency: CompoundingFrequency,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            title: None,
            principal,
            rate,
            tenure_value,
            tenure_type,
            compounding_frequency,
            start_date,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Tenure in fractional years
    pub fn tenure_years(&self) -> f64 {
        self.tenure_type.years(self.tenure_value)
    }

    /// Reject inputs the engine would otherwise accept silently.
    ///
    /// The engine itself stays permissive; this is meant for the edges
    /// (CLI arguments, imports, saves).
    pub fn validate(&self) -> FdResult<()> {
        if !self.principal.is_finite() || self.principal < 0.0 {
            return Err(FdError::invalid(
                "principal",
                "must be a non-negative number",
            ));
        }
        if !self.rate.is_finite() || self.rate < 0.0 {
            return Err(FdError::invalid("rate", "must be a non-negative percentage"));
        }
        if self.tenure_value == 0 {
            return Err(FdError::invalid("tenure_value", "must be greater than zero"));
        }
        Ok(())
    }
}

/// A saved deposit: the input and its result, frozen at save time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedDeposit {
    /// Unique record identifier
    pub id: String,

    #[serde(flatten)]
    pub input: DepositInput,

    #[serde(flatten)]
    pub result: DepositResult,

    /// Creation time, milliseconds since the Unix epoch
    pub created_at: i64,
}

impl SavedDeposit {
    pub fn new(id: impl Into<String>, input: DepositInput, result: DepositResult, created_at: i64) -> Self {
        Self {
            id: id.into(),
            input,
            result,
            created_at,
        }
    }

    pub fn principal(&self) -> f64 {
        self.input.principal
    }

    pub fn start_date(&self) -> NaiveDate {
        self.input.start_date
    }

    pub fn maturity_date(&self) -> NaiveDate {
        self.result.maturity_date
    }

    /// Display name: the title, or a generated one
    pub fn display_title(&self) -> String {
        match &self.input.title {
            Some(title) if !title.trim().is_empty() => title.clone(),
            _ => format!(
                "Fixed Deposit ({} {})",
                self.input.tenure_value, self.input.tenure_type
            ),
        }
    }
}

/// Holder details printed on certificates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub address: String,
}

impl UserProfile {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty() && self.address.trim().is_empty()
    }
}
