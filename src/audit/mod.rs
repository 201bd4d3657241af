//! Rule-based identification of records in a snapshot.
//!
//! Each criterion that is configured yields one flag per record. The flags are
//! combined according to a [`MatchMode`] and every record that passes is
//! collected into an [`IdentifiedSet`].

pub mod tweets;
pub mod users;

pub use tweets::TweetCriteria;
pub use users::UserCriteria;

use chrono::{DateTime, Days, NaiveDate, Utc};
use std::collections::BTreeSet;
use std::fmt::Display;
use tracing::{debug, info};

use crate::records::{TweetRecord, UserRecord};

/// Identifiers selected by one audit pass.
pub type IdentifiedSet = BTreeSet<String>;

/// How the flags of several criteria combine into one decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum MatchMode {
    /// A record must match every configured criterion.
    #[default]
    All,
    /// A single matching criterion is enough.
    Any,
}

impl MatchMode {
    /// No flags means no criteria were configured, which never identifies.
    pub fn decide(self, flags: &[bool]) -> bool {
        if flags.is_empty() {
            return false;
        }
        match self {
            MatchMode::All => flags.iter().all(|hit| *hit),
            MatchMode::Any => flags.iter().any(|hit| *hit),
        }
    }
}

/// Ratio with the zero policy used by the TFF and TLR metrics: a zero
/// numerator is always 0, otherwise a zero denominator is infinite.
pub fn ratio(numerator: u64, denominator: u64) -> f64 {
    if numerator == 0 {
        0.0
    } else if denominator == 0 {
        f64::INFINITY
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Something a snapshot holds that can be named in an [`IdentifiedSet`].
pub trait Record {
    fn identifier(&self) -> &str;
}

impl Record for UserRecord {
    fn identifier(&self) -> &str {
        &self.screen_name
    }
}

impl Record for TweetRecord {
    fn identifier(&self) -> &str {
        &self.id_str
    }
}

/// A set of optional thresholds evaluated against one kind of record.
pub trait Criteria {
    type Record: Record;

    /// One flag per configured criterion, in a fixed order. `true` marks the
    /// record as a candidate for action.
    fn evaluate(&self, record: &Self::Record, today: NaiveDate) -> Vec<bool>;
}

/// Run one identification pass over a snapshot.
pub fn identify<C: Criteria>(
    criteria: &C,
    records: &[C::Record],
    mode: MatchMode,
    today: NaiveDate,
) -> IdentifiedSet {
    let mut identified = IdentifiedSet::new();
    for record in records {
        let flags = criteria.evaluate(record, today);
        if mode.decide(&flags) {
            debug!("{} identified ({:?})", record.identifier(), flags);
            identified.insert(record.identifier().to_string());
        }
    }
    info!(
        "Identified {} of {} records ({:?} mode)",
        identified.len(),
        records.len(),
        mode
    );
    identified
}

/// Accumulates flags for one record and logs each criterion it hits.
pub(crate) struct Flags<'a> {
    id: &'a str,
    flags: Vec<bool>,
}

impl<'a> Flags<'a> {
    pub(crate) fn new(id: &'a str) -> Self {
        Self {
            id,
            flags: Vec::new(),
        }
    }

    pub(crate) fn below<T: PartialOrd + Display>(&mut self, what: &str, value: T, min: Option<T>) {
        if let Some(min) = min {
            let hit = value < min;
            if hit {
                info!("{} has {} {} (below {})", self.id, value, what, min);
            }
            self.flags.push(hit);
        }
    }

    pub(crate) fn above<T: PartialOrd + Display>(&mut self, what: &str, value: T, max: Option<T>) {
        if let Some(max) = max {
            let hit = value > max;
            if hit {
                info!("{} has {} {} (above {})", self.id, value, what, max);
            }
            self.flags.push(hit);
        }
    }

    /// Missing timestamps count as old.
    pub(crate) fn older_than(
        &mut self,
        what: &str,
        timestamp: Option<DateTime<Utc>>,
        days: Option<u32>,
        today: NaiveDate,
    ) {
        if let Some(days) = days {
            let hit = match timestamp {
                None => {
                    info!("{} has no {} date", self.id, what);
                    true
                }
                Some(ts) => match today.checked_sub_days(Days::new(u64::from(days))) {
                    Some(cutoff) => {
                        let old = ts.date_naive() < cutoff;
                        if old {
                            info!("{} {} date is {}", self.id, what, ts.date_naive());
                        }
                        old
                    }
                    None => false,
                },
            };
            self.flags.push(hit);
        }
    }

    pub(crate) fn equals(&mut self, what: &str, value: bool, wanted: Option<bool>) {
        if let Some(wanted) = wanted {
            let hit = value == wanted;
            if hit {
                info!("{} {} is {}", self.id, what, value);
            }
            self.flags.push(hit);
        }
    }

    pub(crate) fn finish(self) -> Vec<bool> {
        self.flags
    }
}
