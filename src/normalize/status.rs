//! LendingClub loan-status classification.

use std::collections::BTreeMap;

/// Statuses treated as a 12-month default.
pub const BAD_STATUSES: [&str; 5] = [
    "Charged Off",
    "Default",
    "Does not meet the credit policy. Status:Charged Off",
    "Late (31-120 days)",
    "In Grace Period",
];

/// Statuses known to mean "not defaulted". Only used to decide which
/// non-bad strings are worth surfacing as unrecognized vocabulary.
pub const KNOWN_GOOD_STATUSES: [&str; 5] = [
    "Fully Paid",
    "Current",
    "Late (16-30 days)",
    "Does not meet the credit policy. Status:Fully Paid",
    "Issued",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Bad,
    Good,
    Unmapped,
}

impl StatusClass {
    /// Binary outcome. Unmapped statuses count as non-default.
    pub fn target(self) -> u8 {
        match self {
            StatusClass::Bad => 1,
            StatusClass::Good | StatusClass::Unmapped => 0,
        }
    }
}

/// Exact, case-sensitive membership test.
pub fn classify_status(status: &str) -> StatusClass {
    if BAD_STATUSES.contains(&status) {
        StatusClass::Bad
    } else if KNOWN_GOOD_STATUSES.contains(&status) {
        StatusClass::Good
    } else {
        StatusClass::Unmapped
    }
}

/// Running count of status strings that fell outside both known sets.
#[derive(Debug, Clone, Default)]
pub struct StatusTally {
    unmapped: BTreeMap<String, usize>,
}

impl StatusTally {
    /// Classify `status`, remember it if unmapped, and return the target.
    pub fn record(&mut self, status: &str) -> u8 {
        let class = classify_status(status);
        if class == StatusClass::Unmapped {
            *self.unmapped.entry(status.to_string()).or_insert(0) += 1;
        }
        class.target()
    }

    pub fn unmapped_total(&self) -> usize {
        self.unmapped.values().sum()
    }

    pub fn into_unmapped(self) -> BTreeMap<String, usize> {
        self.unmapped
    }
}
