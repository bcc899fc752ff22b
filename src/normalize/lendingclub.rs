//! LendingClub accepted-loans mapper.
//!
//! The export has no age or monthly income, so features are proxies:
//!
//! - `age`: 22 + years employed (30 when unknown)
//! - `income`: `annual_inc / 12`
//! - `liabilities`: `loan_amnt`
//! - `credit_history_months`: `earliest_cr_line` to `issue_d`
//!
//! Row-level noise is filled with defaults where a default exists; anything
//! still non-finite is dropped at assembly.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::domain::{Cell, RawTable};
use crate::error::SchemaError;
use crate::normalize::assemble::Draft;
use crate::normalize::status::StatusTally;
use crate::normalize::{Mapped, SourceNotes, require_columns};

pub const REQUIRED_COLUMNS: [&str; 6] = [
    "loan_status",
    "annual_inc",
    "loan_amnt",
    "emp_length",
    "earliest_cr_line",
    "issue_d",
];

/// Average days per month used to turn a date span into months.
pub const DAYS_PER_MONTH: f64 = 30.44;

const AGE_OFFSET_YEARS: f64 = 22.0;
const DEFAULT_AGE: f64 = 30.0;

pub fn map_lendingclub(raw: &RawTable) -> Result<Mapped, SchemaError> {
    let cols = require_columns(raw, "lendingclub", &REQUIRED_COLUMNS)?;
    let (status, annual_inc, loan_amnt, emp_length, earliest, issued) =
        (cols[0], cols[1], cols[2], cols[3], cols[4], cols[5]);

    let mut tally = StatusTally::default();
    let mut drafts = Vec::with_capacity(raw.n_rows());

    for row in 0..raw.n_rows() {
        let target = match status.get(row) {
            Cell::Null => 0,
            cell => tally.record(&cell.as_text()),
        };

        let age = emp_to_years(&emp_length.get(row).as_text())
            .map(|years| AGE_OFFSET_YEARS + years)
            .unwrap_or(DEFAULT_AGE);
        let income = annual_inc.get(row).as_f64().map(|v| v / 12.0).unwrap_or(0.0);
        let liabilities = loan_amnt.get(row).as_f64().unwrap_or(0.0);
        let months = credit_history_months(
            parse_credit_date(&earliest.get(row).as_text()),
            parse_credit_date(&issued.get(row).as_text()),
        );

        drafts.push(Draft {
            age: Some(age),
            income: Some(income),
            liabilities: Some(liabilities),
            credit_history_months: Some(months),
            target: Some(i64::from(target)),
        });
    }

    if tally.unmapped_total() > 0 {
        warn!(
            rows = tally.unmapped_total(),
            "loan_status values outside the known vocabulary were mapped to non-default"
        );
    }

    Ok(Mapped {
        drafts,
        notes: SourceNotes {
            unmapped_statuses: tally.into_unmapped(),
            ..SourceNotes::default()
        },
    })
}

/// Parse LendingClub `emp_length` (e.g. `"10+ years"`, `"< 1 year"`, `"3 years"`).
pub fn emp_to_years(value: &str) -> Option<f64> {
    let v = value.trim().to_lowercase();
    if v.is_empty() || v == "n/a" || v == "nan" {
        return None;
    }
    if v.contains("10+") {
        return Some(10.0);
    }
    if v.contains('<') {
        return Some(0.5);
    }
    let years = v.split_whitespace().next()?.parse::<f64>().ok()?;
    if years.is_nan() { None } else { Some(years) }
}

/// Parse a credit-line or issue date. Month-year values (`Dec-2015`) resolve
/// to the first of the month. Returns `None` for anything unrecognized.
pub fn parse_credit_date(s: &str) -> Option<NaiveDate> {
    const DATE_FMTS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
    const DATETIME_FMTS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    // `%B` also accepts the three-letter abbreviation when parsing.
    const MONTH_YEAR_FMTS: [(&str, &str); 2] = [("01-", "%d-%B-%Y"), ("01 ", "%d %B %Y")];

    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for (day_prefix, fmt) in MONTH_YEAR_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(&format!("{day_prefix}{s}"), fmt) {
            return Some(d);
        }
    }
    None
}

/// Whole months between the two dates, floored at zero. A missing date on
/// either side yields zero.
pub fn credit_history_months(earliest: Option<NaiveDate>, issued: Option<NaiveDate>) -> f64 {
    let (Some(earliest), Some(issued)) = (earliest, issued) else {
        return 0.0;
    };
    let days = (issued - earliest).num_days() as f64;
    (days / DAYS_PER_MONTH).max(0.0).round_ties_even()
}
