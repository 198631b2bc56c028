use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Reporting window selected with `?filter=`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum TimeWindow {
    #[default]
    #[serde(rename = "6m")]
    SixMonths,
    #[serde(rename = "12m")]
    TwelveMonths,
    #[serde(rename = "lifetime")]
    Lifetime,
}

impl TimeWindow {
    /// Start of the window, `None` for lifetime
    pub fn start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TimeWindow::SixMonths => Some(now - Duration::days(180)),
            TimeWindow::TwelveMonths => Some(now - Duration::days(365)),
            TimeWindow::Lifetime => None,
        }
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "6m" => Ok(TimeWindow::SixMonths),
            "12m" => Ok(TimeWindow::TwelveMonths),
            "lifetime" => Ok(TimeWindow::Lifetime),
            other => Err(format!("unknown window '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthPoint {
    pub label: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformancePoint {
    pub month: String,
    pub referrals: i64,
    pub revenue: f64,
}

/// "Jan 2024"
pub fn month_label(month: DateTime<Utc>) -> String {
    month.format("%b %Y").to_string()
}

pub fn growth_chart(buckets: &[(DateTime<Utc>, i64)]) -> Vec<GrowthPoint> {
    buckets
        .iter()
        .map(|(month, count)| GrowthPoint {
            label: month_label(*month),
            value: *count,
        })
        .collect()
}

/// Merges per-month referral counts and revenue sums into one series,
/// ordered by month.
pub fn performance_chart(
    referrals: &[(DateTime<Utc>, i64)],
    revenue: &[(DateTime<Utc>, f64)],
) -> Vec<PerformancePoint> {
    let mut months: BTreeMap<DateTime<Utc>, (i64, f64)> = BTreeMap::new();

    for (month, count) in referrals {
        months.entry(*month).or_default().0 += count;
    }
    for (month, amount) in revenue {
        months.entry(*month).or_default().1 += amount;
    }

    months
        .into_iter()
        .map(|(month, (referrals, revenue))| PerformancePoint {
            month: month_label(month),
            referrals,
            revenue,
        })
        .collect()
}

/// Sums amounts by full month name, across years
pub fn monthly_totals(rows: &[(NaiveDate, f64)]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for (date, amount) in rows {
        *totals
            .entry(date.format("%B").to_string())
            .or_insert(0.0) += amount;
    }
    totals
}
