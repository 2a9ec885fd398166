use std::fmt::Display;

use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, ValueEnum};
use now::DateTimeNow;

use crate::{
    daemon::storage::day_store::DayStore,
    stats::{daily_total, domain_totals, month_window, most_active_day, week_window},
    utils::time::{date_to_record_key, ticks_to_string},
};

use super::Args;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

/// Command to process `today`. Mirrors what a badge/popup surface would show: the running daily
/// total and a ranked per-domain table.
pub async fn process_today_command<S: DayStore>(store: &S) -> Result<()> {
    let today = Local::now().date_naive();
    let record = store.get(today).await?;

    println!(
        "{}\ttotal {}",
        date_to_record_key(today),
        ticks_to_string(daily_total(&record))
    );
    for (rank, usage) in domain_totals(&record).iter().enumerate() {
        println!(
            "{}\t{}\t{}\t{} visit(s)",
            rank + 1,
            ticks_to_string(usage.total_time),
            usage.domain,
            usage.visits
        );
    }
    Ok(())
}

/// Command to process `week`: per-day totals, window statistics and the top-domain ranking for
/// the 7 days beginning at `start`.
pub async fn process_week_command<S: DayStore>(
    store: &S,
    start: Option<String>,
    date_style: DateStyle,
) -> Result<()> {
    let start = parse_week_start(start, date_style)?;
    let snapshot = store.get_all().await?;

    let summary = week_window(&snapshot, start);
    let peak = most_active_day(&summary.per_day_totals, &summary.dates);

    for (date, total) in summary.dates.iter().zip(summary.per_day_totals) {
        println!("{}\t{}", date_to_record_key(*date), ticks_to_string(total));
    }
    println!();
    println!(
        "Average\t{}",
        ticks_to_string(summary.average.round() as u64)
    );
    println!("Max\t{}", ticks_to_string(summary.max));
    println!("Min\t{}", ticks_to_string(summary.min));
    println!("Most active day\t{} ({})", peak.name, ticks_to_string(peak.time));

    if !summary.top_domains.is_empty() {
        println!();
        for (rank, usage) in summary.top_domains.iter().enumerate() {
            println!(
                "{}\t{}\t{}\t{} visit(s)",
                rank + 1,
                ticks_to_string(usage.total_time),
                usage.domain,
                usage.visits
            );
        }
    }
    Ok(())
}

/// Command to process `month`: the calendar-month total, the per-day activity map and per-domain
/// statistics.
pub async fn process_month_command<S: DayStore>(
    store: &S,
    year: Option<i32>,
    month: Option<u32>,
) -> Result<()> {
    let now = Local::now();
    let year = year.unwrap_or_else(|| now.year());
    let month = month.unwrap_or_else(|| now.month());
    if !(1..=12).contains(&month) {
        return Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("{month} is not a month"),
            )
            .into());
    }

    let snapshot = store.get_all().await?;
    let summary = month_window(&snapshot, year, month);

    println!("{year}-{month:02}\ttotal {}", ticks_to_string(summary.total_time));
    println!();
    for (date, total) in &summary.daily_activity {
        println!("{}\t{}", date_to_record_key(*date), ticks_to_string(*total));
    }

    if !summary.domain_stats.is_empty() {
        println!();
        let mut ranked = summary.domain_stats.iter().collect::<Vec<_>>();
        ranked.sort_by(|(a_domain, a), (b_domain, b)| {
            b.total_time
                .cmp(&a.total_time)
                .then_with(|| a_domain.cmp(b_domain))
        });
        for (rank, (domain, stats)) in ranked.iter().enumerate() {
            println!(
                "{}\t{}\t{}\t{} session(s)",
                rank + 1,
                ticks_to_string(stats.total_time),
                domain,
                stats.session_count
            );
        }
    }
    Ok(())
}

/// Also provides the sensible default for `week`: the beginning of the current week.
fn parse_week_start(start: Option<String>, date_style: DateStyle) -> Result<NaiveDate> {
    let dialect: chrono_english::Dialect = date_style.into();
    match start.map(|s| parse_date_string(&s, Local::now(), dialect)) {
        Some(Ok(v)) => Ok(v.date_naive()),
        Some(Err(e)) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate start date {e}"),
            )
            .into()),
        None => Ok(Local::now().beginning_of_week().date_naive()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{parse_week_start, DateStyle};

    #[test]
    fn parses_explicit_start_dates() {
        assert_eq!(
            parse_week_start(Some("15/03/2025".into()), DateStyle::Uk).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
        );
        assert_eq!(
            parse_week_start(Some("03/15/2025".into()), DateStyle::Us).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
        );
        assert!(parse_week_start(Some("the day after nothing".into()), DateStyle::Uk).is_err());
    }

    #[test]
    fn defaults_to_the_current_week() {
        let start = parse_week_start(None, DateStyle::Uk).unwrap();
        let today = chrono::Local::now().date_naive();
        assert!(start <= today);
        assert!(today - start < chrono::Duration::days(7));
    }
}
