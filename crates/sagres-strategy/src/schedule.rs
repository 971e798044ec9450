//! Rebalance calendars.

use std::str::FromStr;

use chrono::{Datelike, Months, Weekday};
use derive_more::Display;
use sagres_traits::{Date, SagresError};
use serde::{Deserialize, Serialize};

/// How often positions are rebuilt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum RebalanceFrequency {
    /// Every business day
    #[display("D")]
    Daily,
    /// Every Friday
    #[display("W")]
    Weekly,
    /// Last business day of each month
    #[default]
    #[display("M")]
    Monthly,
}

impl FromStr for RebalanceFrequency {
    type Err = SagresError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "D" | "DAILY" => Ok(Self::Daily),
            "W" | "WEEKLY" => Ok(Self::Weekly),
            "M" | "MONTHLY" => Ok(Self::Monthly),
            other => Err(SagresError::Configuration(format!(
                "unknown rebalance frequency '{other}', expected D, W or M"
            ))),
        }
    }
}

fn is_business_day(date: Date) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn last_business_day_of_month(date: Date) -> Option<Date> {
    let first = date.with_day(1)?;
    let mut last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    while !is_business_day(last) {
        last = last.pred_opt()?;
    }
    Some(last)
}

impl RebalanceFrequency {
    /// Rebalance dates inside `[start, end]`, ascending. Empty when `start > end`.
    pub fn rebalance_dates(self, start: Date, end: Date) -> Vec<Date> {
        let days = start.iter_days().take_while(|d| *d <= end);
        match self {
            Self::Daily => days.filter(|d| is_business_day(*d)).collect(),
            Self::Weekly => days.filter(|d| d.weekday() == Weekday::Fri).collect(),
            Self::Monthly => {
                let mut out = Vec::new();
                let mut month = start.with_day(1);
                while let Some(first) = month.filter(|m| *m <= end) {
                    if let Some(last) = last_business_day_of_month(first)
                        && (start..=end).contains(&last)
                    {
                        out.push(last);
                    }
                    month = first.checked_add_months(Months::new(1));
                }
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn day(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case("D", RebalanceFrequency::Daily)]
    #[case("w", RebalanceFrequency::Weekly)]
    #[case("monthly", RebalanceFrequency::Monthly)]
    fn test_parse(#[case] input: &str, #[case] expected: RebalanceFrequency) {
        assert_eq!(input.parse::<RebalanceFrequency>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown() {
        assert!(matches!(
            "Q".parse::<RebalanceFrequency>(),
            Err(SagresError::Configuration(_))
        ));
        assert_eq!(RebalanceFrequency::default().to_string(), "M");
    }

    #[test]
    fn test_daily_skips_weekends() {
        // Fri 2024-03-01 .. Tue 2024-03-05
        let dates = RebalanceFrequency::Daily.rebalance_dates(day(2024, 3, 1), day(2024, 3, 5));
        assert_eq!(dates, vec![day(2024, 3, 1), day(2024, 3, 4), day(2024, 3, 5)]);
    }

    #[test]
    fn test_weekly_fridays() {
        let dates = RebalanceFrequency::Weekly.rebalance_dates(day(2024, 3, 1), day(2024, 3, 20));
        assert_eq!(dates, vec![day(2024, 3, 1), day(2024, 3, 8), day(2024, 3, 15)]);
    }

    #[test]
    fn test_monthly_last_business_day() {
        // 2024-03-31 is a Sunday, 2024-06-30 a Sunday, 2024-08-31 a Saturday.
        let dates = RebalanceFrequency::Monthly.rebalance_dates(day(2024, 3, 15), day(2024, 8, 30));
        assert_eq!(
            dates,
            vec![
                day(2024, 3, 29),
                day(2024, 4, 30),
                day(2024, 5, 31),
                day(2024, 6, 28),
                day(2024, 7, 31),
                day(2024, 8, 30),
            ]
        );
    }

    #[test]
    fn test_monthly_excludes_month_end_after_range() {
        let dates = RebalanceFrequency::Monthly.rebalance_dates(day(2024, 1, 2), day(2024, 2, 27));
        assert_eq!(dates, vec![day(2024, 1, 31)]);
    }

    #[test]
    fn test_empty_range() {
        assert!(
            RebalanceFrequency::Daily
                .rebalance_dates(day(2024, 3, 5), day(2024, 3, 1))
                .is_empty()
        );
    }
}
