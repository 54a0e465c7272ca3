use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Référence de mois civil (`YYYY-MM`), clé des plafonds de capacité.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthRef {
    pub year: i32,
    pub month: u32,
}

impl MonthRef {
    pub fn new(year: i32, month: u32) -> Result<Self, String> {
        if !(1..=12).contains(&month) {
            return Err(format!("invalid month: {month}"));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for MonthRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (y, m) = s
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got {s}"))?;
        let year: i32 = y.parse().map_err(|_| format!("invalid year: {y}"))?;
        let month: u32 = m.parse().map_err(|_| format!("invalid month: {m}"))?;
        MonthRef::new(year, month)
    }
}

/// Tous les jours d'un mois, en ordre chronologique.
pub fn month_days(month: MonthRef) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let Some(mut current) = NaiveDate::from_ymd_opt(month.year, month.month, 1) else {
        return out;
    };
    while month.contains(current) {
        out.push(current);
        current = match current.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    out
}

/// Numéro de semaine ISO (année ISO, numéro).
pub fn iso_week(date: NaiveDate) -> (i32, u32) {
    let week = date.iso_week();
    (week.year(), week.week())
}

/// Les sept jours d'une semaine ISO, du lundi au dimanche.
pub fn week_days(iso_year: i32, week: u32) -> Vec<NaiveDate> {
    let Some(monday) = NaiveDate::from_isoywd_opt(iso_year, week, Weekday::Mon) else {
        return Vec::new();
    };
    (0u64..7)
        .filter_map(|offset| monday.checked_add_days(chrono::Days::new(offset)))
        .collect()
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
