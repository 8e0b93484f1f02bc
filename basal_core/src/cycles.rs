//! Cycle segmentation from menstrual flow entries.
//!
//! Flow days at most [`EPISODE_GAP_DAYS`] apart belong to one bleeding
//! episode; the first day of each episode starts a new cycle.

use crate::FlowEntry;
use chrono::NaiveDate;
use serde::Serialize;

/// Largest gap, in days, that still continues the current bleeding episode
pub const EPISODE_GAP_DAYS: i64 = 3;

/// A run of flow days belonging to one period
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BleedingEpisode {
    pub start: NaiveDate,
    /// Last observed flow day
    pub end: NaiveDate,
    /// Distinct flow days observed in the episode
    pub flow_days: usize,
}

/// One complete cycle, from a start to the day before the next start
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CycleSpan {
    pub start: NaiveDate,
    pub next_start: NaiveDate,
    pub length: i64,
}

fn sorted_unique(dates: &[NaiveDate]) -> Vec<NaiveDate> {
    let mut sorted = dates.to_vec();
    sorted.sort();
    sorted.dedup();
    sorted
}

/// Group flow dates into bleeding episodes, oldest first
pub fn bleeding_episodes(flow_dates: &[NaiveDate]) -> Vec<BleedingEpisode> {
    let mut episodes: Vec<BleedingEpisode> = Vec::new();

    for date in sorted_unique(flow_dates) {
        match episodes.last_mut() {
            Some(current) if (date - current.end).num_days() <= EPISODE_GAP_DAYS => {
                current.end = date;
                current.flow_days += 1;
            }
            _ => episodes.push(BleedingEpisode {
                start: date,
                end: date,
                flow_days: 1,
            }),
        }
    }

    episodes
}

/// Cycle start dates, ascending.
///
/// Input order is irrelevant; spotting within three days of the last flow day
/// never opens a new cycle.
pub fn cycle_starts(flow_dates: &[NaiveDate]) -> Vec<NaiveDate> {
    bleeding_episodes(flow_dates)
        .into_iter()
        .map(|episode| episode.start)
        .collect()
}

/// Convenience over [`cycle_starts`] for flow entry records
pub fn cycle_starts_from_entries(entries: &[FlowEntry]) -> Vec<NaiveDate> {
    let dates: Vec<NaiveDate> = entries.iter().map(|e| e.date).collect();
    cycle_starts(&dates)
}

/// Start of the most recent bleed.
///
/// Walks back from the latest flow day while consecutive days are at most
/// one day apart. Stricter than episode grouping: a one-day break ends the
/// walk, so the result may fall later than the latest cycle start.
pub fn current_period_start(flow_dates: &[NaiveDate]) -> Option<NaiveDate> {
    let sorted = sorted_unique(flow_dates);
    let mut start = *sorted.last()?;

    for pair in sorted.windows(2).rev() {
        if (pair[1] - pair[0]).num_days() <= 1 {
            start = pair[0];
        } else {
            break;
        }
    }

    Some(start)
}

/// Completed cycles between consecutive starts
pub fn cycle_spans(starts: &[NaiveDate]) -> Vec<CycleSpan> {
    starts
        .windows(2)
        .map(|w| CycleSpan {
            start: w[0],
            next_start: w[1],
            length: (w[1] - w[0]).num_days(),
        })
        .collect()
}
