//! Display formatting and printable certificates
//!
//! Formatting never changes the numbers it is given.

use std::fmt;

use chrono::NaiveDate;

use crate::deposit::{SavedDeposit, UserProfile};

const CERTIFICATE_WIDTH: usize = 48;

/// US-dollar amount with thousands separators and two decimals
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, fraction)
}

/// Long-form date, e.g. "January 1, 2026"
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Printable record of a saved deposit
#[derive(Debug, Clone)]
pub struct Certificate<'a> {
    deposit: &'a SavedDeposit,
    holder: Option<&'a UserProfile>,
}

impl<'a> Certificate<'a> {
    pub fn for_deposit(deposit: &'a SavedDeposit, holder: Option<&'a UserProfile>) -> Self {
        Self {
            deposit,
            holder: holder.filter(|p| !p.is_empty()),
        }
    }

    fn line(f: &mut fmt::Formatter<'_>, label: &str, value: &str) -> fmt::Result {
        let inner = CERTIFICATE_WIDTH - 4;
        let gap = inner.saturating_sub(label.len() + value.chars().count()).max(1);
        writeln!(f, "| {}{}{} |", label, " ".repeat(gap), value)
    }

    fn centered(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
        let inner = CERTIFICATE_WIDTH - 4;
        writeln!(f, "| {:^width$} |", text, width = inner)
    }
}

impl fmt::Display for Certificate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.deposit;
        let border = format!("+{}+", "=".repeat(CERTIFICATE_WIDTH - 2));
        let rule = format!("|{}|", "-".repeat(CERTIFICATE_WIDTH - 2));

        writeln!(f, "{}", border)?;
        Self::centered(f, "CERTIFICATE")?;
        Self::centered(f, "Investment Record")?;
        Self::centered(f, &d.display_title())?;
        writeln!(f, "{}", rule)?;

        if let Some(holder) = self.holder {
            Self::line(f, "Holder", &holder.name)?;
            if !holder.address.trim().is_empty() {
                Self::line(f, "Address", &holder.address)?;
            }
            writeln!(f, "{}", rule)?;
        }

        Self::line(f, "Principal", &format_currency(d.input.principal))?;
        Self::line(f, "Rate", &format!("{}% p.a.", d.input.rate))?;
        Self::line(
            f,
            "Tenure",
            &format!("{} {}", d.input.tenure_value, d.input.tenure_type),
        )?;
        Self::line(f, "Compounding", d.input.compounding_frequency.label())?;
        Self::line(f, "Start Date", &format_long_date(d.start_date()))?;
        Self::line(f, "Maturity Date", &format_long_date(d.maturity_date()))?;
        writeln!(f, "{}", rule)?;
        Self::line(f, "TOTAL VALUE", &format_currency(d.result.maturity_amount))?;
        writeln!(f, "{}", rule)?;
        Self::line(f, "Record", &d.id)?;
        write!(f, "{}", border)
    }
}
