//! Pure rollups over day-store snapshots: daily totals, 7-day windows, calendar months and
//! top-domain rankings. Nothing here touches storage; callers hand in the snapshot they want
//! summarized. A date missing from the snapshot is treated exactly like a date with an empty
//! record, so no function here has an error path for absent data.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Days, NaiveDate};

use crate::daemon::storage::entities::DayRecord;

pub type StoreSnapshot = BTreeMap<NaiveDate, DayRecord>;

/// How many domains a ranking carries at most.
const TOP_DOMAINS_CAP: usize = 10;

pub const NO_ACTIVITY: &str = "No activity";

/// Sum of `time_spent` over every session of every domain in the record.
pub fn daily_total(record: &DayRecord) -> u64 {
    record.total_ticks()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainTotal {
    pub domain: String,
    pub total_time: u64,
    pub visits: usize,
}

/// Per-domain totals for a single record, most used first. Ties resolve by ascending domain
/// name so the output is stable.
pub fn domain_totals(record: &DayRecord) -> Vec<DomainTotal> {
    let mut totals = record
        .domains
        .iter()
        .map(|(domain, sessions)| DomainTotal {
            domain: domain.clone(),
            total_time: sessions.iter().map(|s| s.time_spent).sum(),
            visits: sessions.len(),
        })
        .collect::<Vec<_>>();
    totals.sort_by(|a, b| {
        b.total_time
            .cmp(&a.total_time)
            .then_with(|| a.domain.cmp(&b.domain))
    });
    totals
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekSummary {
    /// The 7 dates of the window, in order.
    pub dates: [NaiveDate; 7],
    pub per_day_totals: [u64; 7],
    pub average: f64,
    pub max: u64,
    pub min: u64,
    pub top_domains: Vec<DomainTotal>,
}

/// Rolls the 7 consecutive dates beginning at `start` into one summary. Dates absent from the
/// snapshot contribute zero.
pub fn week_window(snapshot: &StoreSnapshot, start: NaiveDate) -> WeekSummary {
    let dates: [NaiveDate; 7] =
        std::array::from_fn(|i| start + Days::new(i as u64));

    let mut per_day_totals = [0u64; 7];
    let mut domain_usage = HashMap::<&str, (u64, usize)>::new();

    for (i, date) in dates.iter().enumerate() {
        let Some(record) = snapshot.get(date) else {
            continue;
        };
        per_day_totals[i] = record.total_ticks();
        for (domain, sessions) in &record.domains {
            let usage = domain_usage.entry(domain).or_default();
            usage.0 += sessions.iter().map(|s| s.time_spent).sum::<u64>();
            usage.1 += sessions.len();
        }
    }

    let sum: u64 = per_day_totals.iter().sum();

    let mut top_domains = domain_usage
        .into_iter()
        .map(|(domain, (total_time, visits))| DomainTotal {
            domain: domain.to_string(),
            total_time,
            visits,
        })
        .collect::<Vec<_>>();
    top_domains.sort_by(|a, b| {
        b.total_time
            .cmp(&a.total_time)
            .then_with(|| a.domain.cmp(&b.domain))
    });
    top_domains.truncate(TOP_DOMAINS_CAP);

    WeekSummary {
        dates,
        per_day_totals,
        average: sum as f64 / 7.0,
        max: per_day_totals.iter().copied().max().unwrap_or(0),
        min: per_day_totals.iter().copied().min().unwrap_or(0),
        top_domains,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomainMonthStats {
    pub total_time: u64,
    pub session_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthSummary {
    pub total_time: u64,
    /// Every calendar date of the month, zero for days without activity. Materializing the
    /// zeros keeps absence and emptiness indistinguishable downstream.
    pub daily_activity: BTreeMap<NaiveDate, u64>,
    pub domain_stats: BTreeMap<String, DomainMonthStats>,
}

/// Rolls a full calendar month into one summary.
pub fn month_window(snapshot: &StoreSnapshot, year: i32, month: u32) -> MonthSummary {
    let mut daily_activity = BTreeMap::new();
    let mut domain_stats = BTreeMap::<String, DomainMonthStats>::new();

    let mut current = NaiveDate::from_ymd_opt(year, month, 1);
    while let Some(date) = current.filter(|d| d.year() == year && d.month() == month) {
        let day_total = match snapshot.get(&date) {
            Some(record) => {
                for (domain, sessions) in &record.domains {
                    let stats = domain_stats.entry(domain.clone()).or_default();
                    stats.total_time += sessions.iter().map(|s| s.time_spent).sum::<u64>();
                    stats.session_count += sessions.len();
                }
                record.total_ticks()
            }
            None => 0,
        };
        daily_activity.insert(date, day_total);
        current = date.succ_opt();
    }

    MonthSummary {
        total_time: daily_activity.values().sum(),
        daily_activity,
        domain_stats,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MostActiveDay {
    pub name: String,
    pub time: u64,
}

/// The date with the largest total. Ties resolve to the earliest date; an all-zero window
/// reports the no-activity sentinel.
pub fn most_active_day(per_day_totals: &[u64], dates: &[NaiveDate]) -> MostActiveDay {
    let mut best: Option<(NaiveDate, u64)> = None;
    for (date, total) in dates.iter().zip(per_day_totals) {
        if *total > 0 && best.map_or(true, |(_, best_total)| *total > best_total) {
            best = Some((*date, *total));
        }
    }

    match best {
        Some((date, time)) => MostActiveDay {
            name: date.format("%A").to_string(),
            time,
        },
        None => MostActiveDay {
            name: NO_ACTIVITY.to_string(),
            time: 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use crate::daemon::storage::entities::{DayRecord, Session};

    use super::*;

    const WEEK_START: NaiveDate = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();

    fn session(url: &str, ticks: u64, visit_index: u32) -> Session {
        Session {
            time_spent: ticks,
            ..Session::started(url, NaiveTime::from_hms_opt(10, 0, 0).unwrap(), visit_index)
        }
    }

    fn record(domains: &[(&str, &[Session])]) -> DayRecord {
        let mut record = DayRecord::default();
        for (domain, sessions) in domains {
            record
                .domains
                .insert((*domain).to_string(), sessions.to_vec());
        }
        record
    }

    #[test]
    fn empty_week_is_all_zeroes() {
        let summary = week_window(&StoreSnapshot::new(), WEEK_START);
        assert_eq!(summary.per_day_totals, [0; 7]);
        assert_eq!(summary.average, 0.0);
        assert_eq!(summary.max, 0);
        assert_eq!(summary.min, 0);
        assert!(summary.top_domains.is_empty());
    }

    #[test]
    fn missing_date_counts_like_an_empty_record() {
        let mut with_empty = StoreSnapshot::new();
        with_empty.insert(WEEK_START, DayRecord::default());
        let without = StoreSnapshot::new();

        let a = week_window(&with_empty, WEEK_START);
        let b = week_window(&without, WEEK_START);
        assert_eq!(a.per_day_totals, b.per_day_totals);
        assert_eq!(a.top_domains, b.top_domains);
    }

    #[test]
    fn week_window_totals_and_ranking() {
        let mut snapshot = StoreSnapshot::new();
        snapshot.insert(
            WEEK_START,
            record(&[
                ("docs.rs", &[session("https://docs.rs/a", 30, 1)]),
                ("github.com", &[session("https://github.com", 10, 1)]),
            ]),
        );
        snapshot.insert(
            WEEK_START + chrono::Days::new(2),
            record(&[(
                "docs.rs",
                &[
                    session("https://docs.rs/a", 5, 1),
                    session("https://docs.rs/b", 15, 2),
                ],
            )]),
        );
        // Outside of the window, must not count.
        snapshot.insert(
            WEEK_START + chrono::Days::new(7),
            record(&[("docs.rs", &[session("https://docs.rs/a", 999, 1)])]),
        );

        let summary = week_window(&snapshot, WEEK_START);
        assert_eq!(summary.per_day_totals, [40, 0, 20, 0, 0, 0, 0]);
        assert_eq!(summary.average, 60.0 / 7.0);
        assert_eq!(summary.max, 40);
        assert_eq!(summary.min, 0);

        assert_eq!(summary.top_domains.len(), 2);
        assert_eq!(summary.top_domains[0].domain, "docs.rs");
        assert_eq!(summary.top_domains[0].total_time, 50);
        assert_eq!(summary.top_domains[0].visits, 3);
        assert_eq!(summary.top_domains[1].domain, "github.com");
    }

    #[test]
    fn top_domains_cap_and_tie_break() {
        let mut snapshot = StoreSnapshot::new();
        let mut domains = vec![];
        // 12 domains with equal usage plus one clear leader.
        for i in 0..12 {
            domains.push((format!("site-{i:02}.example"), 7u64));
        }
        domains.push(("leader.example".to_string(), 100));

        let mut day = DayRecord::default();
        for (domain, ticks) in &domains {
            day.domains.insert(
                domain.clone(),
                vec![session(&format!("https://{domain}/"), *ticks, 1)],
            );
        }
        snapshot.insert(WEEK_START, day);

        let top = week_window(&snapshot, WEEK_START).top_domains;
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].domain, "leader.example");
        // Non-increasing totals, ties in ascending name order.
        for pair in top.windows(2) {
            assert!(pair[0].total_time >= pair[1].total_time);
            if pair[0].total_time == pair[1].total_time {
                assert!(pair[0].domain < pair[1].domain);
            }
        }
        assert_eq!(top[1].domain, "site-00.example");
        assert_eq!(top[9].domain, "site-08.example");
    }

    #[test]
    fn month_window_covers_every_calendar_day() {
        let mut snapshot = StoreSnapshot::new();
        snapshot.insert(
            NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
            record(&[(
                "docs.rs",
                &[
                    session("https://docs.rs/a", 10, 1),
                    session("https://docs.rs/b", 20, 2),
                ],
            )]),
        );
        snapshot.insert(
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            record(&[("github.com", &[session("https://github.com", 30, 1)])]),
        );
        // A different month entirely.
        snapshot.insert(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            record(&[("docs.rs", &[session("https://docs.rs/a", 999, 1)])]),
        );

        let summary = month_window(&snapshot, 2024, 2);
        // 2024 is a leap year.
        assert_eq!(summary.daily_activity.len(), 29);
        assert_eq!(summary.total_time, 60);
        assert_eq!(
            summary.total_time,
            summary.daily_activity.values().sum::<u64>()
        );
        assert_eq!(
            summary.daily_activity[&NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()],
            30
        );
        assert_eq!(
            summary.daily_activity[&NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()],
            0
        );

        assert_eq!(summary.domain_stats["docs.rs"].total_time, 30);
        assert_eq!(summary.domain_stats["docs.rs"].session_count, 2);
        assert_eq!(summary.domain_stats["github.com"].session_count, 1);
    }

    #[test]
    fn most_active_day_picks_earliest_on_ties() {
        let dates: Vec<NaiveDate> = (0..7)
            .map(|i| WEEK_START + chrono::Days::new(i))
            .collect();

        let peak = most_active_day(&[0, 5, 9, 9, 2, 0, 0], &dates);
        // 2024-03-06 is a Wednesday.
        assert_eq!(peak.name, "Wednesday");
        assert_eq!(peak.time, 9);

        let silent = most_active_day(&[0; 7], &dates);
        assert_eq!(silent.name, NO_ACTIVITY);
        assert_eq!(silent.time, 0);
    }

    #[test]
    fn domain_totals_ranks_today() {
        let record = record(&[
            ("docs.rs", &[session("https://docs.rs/a", 10, 1)]),
            (
                "github.com",
                &[
                    session("https://github.com/a", 5, 1),
                    session("https://github.com/b", 5, 2),
                ],
            ),
        ]);

        let totals = domain_totals(&record);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].domain, "docs.rs");
        assert_eq!(totals[1].visits, 2);
        assert_eq!(daily_total(&record), 20);
    }
}
