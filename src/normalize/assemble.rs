//! Canonical assembly: bounds, drop policy, label coercion, row cap.
//!
//! Mappers only derive values. Everything that decides whether a row survives
//! and what range its fields end up in lives here, so every source obeys the
//! same output invariant:
//!
//! - all four features finite and within bounds
//! - `target_default_12m` in {0, 1}
//! - rows that cannot be resolved are dropped, never filled with a sentinel

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::debug;

use crate::domain::{CanonicalRow, CanonicalTable};

/// Per-row values produced by a mapper before assembly.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Draft {
    pub age: Option<f64>,
    pub income: Option<f64>,
    pub liabilities: Option<f64>,
    pub credit_history_months: Option<f64>,
    pub target: Option<i64>,
}

/// How labels outside {0, 1} are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelPolicy {
    /// Drop the row.
    Strict,
    /// Clip into {0, 1}.
    Clamp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssemblyPolicy {
    pub age_min: f64,
    pub age_max: f64,
    pub label: LabelPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    MissingValue,
    NonFinite,
    LabelOutOfRange,
}

/// Rows discarded during assembly, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DropCounts {
    pub missing_value: usize,
    pub non_finite: usize,
    pub label_out_of_range: usize,
}

impl DropCounts {
    pub fn total(&self) -> usize {
        self.missing_value + self.non_finite + self.label_out_of_range
    }

    fn add(&mut self, reason: DropReason) {
        match reason {
            DropReason::MissingValue => self.missing_value += 1,
            DropReason::NonFinite => self.non_finite += 1,
            DropReason::LabelOutOfRange => self.label_out_of_range += 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Assembled {
    pub table: CanonicalTable,
    pub dropped: DropCounts,
    /// Rows removed by the row cap (after drops).
    pub capped_out: usize,
}

/// Turn drafts into the canonical table.
pub fn assemble(drafts: &[Draft], policy: &AssemblyPolicy, row_cap: Option<usize>, seed: u64) -> Assembled {
    let mut rows = Vec::with_capacity(drafts.len());
    let mut dropped = DropCounts::default();

    for draft in drafts {
        match finalize_row(draft, policy) {
            Ok(row) => rows.push(row),
            Err(reason) => dropped.add(reason),
        }
    }

    let (rows, capped_out) = cap_rows(rows, row_cap, seed);

    Assembled {
        table: CanonicalTable::new(rows),
        dropped,
        capped_out,
    }
}

/// Resolve one draft into a canonical row, or say why it cannot be.
pub fn finalize_row(draft: &Draft, policy: &AssemblyPolicy) -> Result<CanonicalRow, DropReason> {
    let (Some(age), Some(income), Some(liabilities), Some(months), Some(target)) = (
        draft.age,
        draft.income,
        draft.liabilities,
        draft.credit_history_months,
        draft.target,
    ) else {
        return Err(DropReason::MissingValue);
    };

    // `f64::max` silently discards NaN, so reject it before clipping.
    if [age, income, liabilities, months].iter().any(|v| v.is_nan()) {
        return Err(DropReason::NonFinite);
    }

    let row = CanonicalRow {
        age: age.clamp(policy.age_min, policy.age_max),
        income: income.max(0.0),
        liabilities: liabilities.max(0.0),
        credit_history_months: months.max(0.0),
        target_default_12m: resolve_target(target, policy.label)?,
    };

    if !row.features().iter().all(|v| v.is_finite()) {
        return Err(DropReason::NonFinite);
    }

    Ok(row)
}

fn resolve_target(target: i64, policy: LabelPolicy) -> Result<u8, DropReason> {
    match policy {
        LabelPolicy::Clamp => Ok(if target >= 1 { 1 } else { 0 }),
        LabelPolicy::Strict => match target {
            0 => Ok(0),
            1 => Ok(1),
            _ => Err(DropReason::LabelOutOfRange),
        },
    }
}

/// Keep exactly `cap` rows when there are more, chosen uniformly without
/// replacement from a seeded RNG. Survivors keep their original order.
/// A cap of `None` or `Some(0)` keeps everything.
pub fn cap_rows(rows: Vec<CanonicalRow>, row_cap: Option<usize>, seed: u64) -> (Vec<CanonicalRow>, usize) {
    let Some(cap) = row_cap.filter(|&n| n > 0) else {
        return (rows, 0);
    };
    if rows.len() <= cap {
        return (rows, 0);
    }

    let total = rows.len();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut keep = rand::seq::index::sample(&mut rng, total, cap).into_vec();
    keep.sort_unstable();

    debug!(total, cap, seed, "sampling rows down to cap");

    let kept = keep.into_iter().map(|i| rows[i]).collect();
    (kept, total - cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRICT: AssemblyPolicy = AssemblyPolicy {
        age_min: 18.0,
        age_max: 100.0,
        label: LabelPolicy::Strict,
    };

    fn draft(age: f64, target: i64) -> Draft {
        Draft {
            age: Some(age),
            income: Some(1000.0),
            liabilities: Some(50.0),
            credit_history_months: Some(6.0),
            target: Some(target),
        }
    }

    fn rows(n: usize) -> Vec<CanonicalRow> {
        (0..n)
            .map(|i| CanonicalRow {
                age: 30.0,
                income: i as f64,
                liabilities: 0.0,
                credit_history_months: 0.0,
                target_default_12m: 0,
            })
            .collect()
    }

    #[test]
    fn clips_age_both_directions() {
        assert_eq!(finalize_row(&draft(17.0, 0), &STRICT).unwrap().age, 18.0);
        assert_eq!(finalize_row(&draft(50.0, 0), &STRICT).unwrap().age, 50.0);
        assert_eq!(finalize_row(&draft(200.0, 0), &STRICT).unwrap().age, 100.0);
        assert_eq!(finalize_row(&draft(f64::INFINITY, 0), &STRICT).unwrap().age, 100.0);
    }

    #[test]
    fn negative_amounts_clip_to_zero() {
        let mut d = draft(30.0, 1);
        d.income = Some(-5.0);
        d.liabilities = Some(-1.0);
        d.credit_history_months = Some(-3.0);
        let row = finalize_row(&d, &STRICT).unwrap();
        assert_eq!((row.income, row.liabilities, row.credit_history_months), (0.0, 0.0, 0.0));
    }

    #[test]
    fn drop_reasons() {
        let mut missing = draft(30.0, 0);
        missing.income = None;
        assert_eq!(finalize_row(&missing, &STRICT), Err(DropReason::MissingValue));

        let mut infinite = draft(30.0, 0);
        infinite.income = Some(f64::INFINITY);
        assert_eq!(finalize_row(&infinite, &STRICT), Err(DropReason::NonFinite));

        let mut nan = draft(30.0, 0);
        nan.liabilities = Some(f64::NAN);
        assert_eq!(finalize_row(&nan, &STRICT), Err(DropReason::NonFinite));

        assert_eq!(finalize_row(&draft(30.0, 2), &STRICT), Err(DropReason::LabelOutOfRange));
    }

    #[test]
    fn clamp_policy_clips_labels() {
        let clamp = AssemblyPolicy {
            label: LabelPolicy::Clamp,
            ..STRICT
        };
        assert_eq!(finalize_row(&draft(30.0, -1), &clamp).unwrap().target_default_12m, 0);
        assert_eq!(finalize_row(&draft(30.0, 2), &clamp).unwrap().target_default_12m, 1);
    }

    #[test]
    fn assemble_counts_drops() {
        let mut bad = draft(30.0, 0);
        bad.age = None;
        let out = assemble(&[draft(30.0, 1), bad, draft(40.0, 5)], &STRICT, None, 42);
        assert_eq!(out.table.len(), 1);
        assert_eq!(out.dropped.missing_value, 1);
        assert_eq!(out.dropped.label_out_of_range, 1);
        assert_eq!(out.dropped.total(), 2);
        assert_eq!(out.capped_out, 0);
    }

    #[test]
    fn cap_is_exact_and_deterministic() {
        let (a, removed) = cap_rows(rows(500), Some(100), 42);
        let (b, _) = cap_rows(rows(500), Some(100), 42);
        assert_eq!(a.len(), 100);
        assert_eq!(removed, 400);
        assert_eq!(a, b);

        let incomes: Vec<f64> = a.iter().map(|r| r.income).collect();
        assert!(incomes.windows(2).all(|w| w[0] < w[1]), "original order kept");
    }

    #[test]
    fn different_seed_changes_selection() {
        let (a, _) = cap_rows(rows(500), Some(100), 42);
        let (b, _) = cap_rows(rows(500), Some(100), 7);
        assert_ne!(a, b);
    }

    #[test]
    fn cap_noop_cases() {
        assert_eq!(cap_rows(rows(10), Some(10), 1).0.len(), 10);
        assert_eq!(cap_rows(rows(10), Some(0), 1).0.len(), 10);
        assert_eq!(cap_rows(rows(10), None, 1).1, 0);
    }
}
