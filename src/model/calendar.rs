//! Calendar arithmetic for the timeline.
//!
//! Pure functions over `NaiveDate`. Day differences ignore time-of-day by
//! construction (the chart is day-granular; sub-day placement is expressed
//! through percent pairs on the task, not through these functions).

use chrono::{Datelike, Duration, NaiveDate};

/// Weekday names used by the Day-mode header, Sunday first.
const WEEKDAYS: [&str; 7] = ["日", "一", "二", "三", "四", "五", "六"];

pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

/// Month addition with the day pinned to the 1st, so `Jan 31 + 1 month` is
/// `Feb 1` rather than an overflow into March.
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 + months;
    let (year, month0) = (total.div_euclid(12), total.rem_euclid(12));
    NaiveDate::from_ymd_opt(year, month0 as u32 + 1, 1).unwrap_or(date)
}

pub fn add_years(date: NaiveDate, years: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year() + years, date.month(), date.day())
        .unwrap_or_else(|| add_months(date, years * 12))
}

/// Whole days from `a` to `b` (negative when `b` is earlier).
pub fn diff_days(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// Day count with both endpoints included.
pub fn diff_days_inclusive(a: NaiveDate, b: NaiveDate) -> i64 {
    diff_days(a, b) + 1
}

/// Monday of the week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

pub fn start_of_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

/// ISO week number (week containing the year's first Thursday is week 1).
pub fn week_number(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Render a token template into text.
///
/// Tokens: `yyyy` year, `MM`/`M` padded/plain month, `dd`/`d` padded/plain
/// day, `W` weekday name. Everything else passes through verbatim, so
/// templates like `"yyyy年MM月"` or `"yyyy-MM-dd"` work directly.
pub fn format(date: NaiveDate, template: &str) -> String {
    let mut out = String::with_capacity(template.len() + 4);
    let chars: Vec<char> = template.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let run = |c: char| chars[i..].iter().take_while(|&&x| x == c).count();
        match chars[i] {
            'y' => {
                let n = run('y');
                out.push_str(&format_args_year(date.year(), n));
                i += n;
            }
            'M' => {
                let n = run('M');
                push_padded(&mut out, date.month(), n);
                i += n;
            }
            'd' => {
                let n = run('d');
                push_padded(&mut out, date.day(), n);
                i += n;
            }
            'W' => {
                out.push_str(WEEKDAYS[date.weekday().num_days_from_sunday() as usize]);
                i += 1;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

fn format_args_year(year: i32, width: usize) -> String {
    let full = format!("{year:04}");
    if width >= 4 {
        full
    } else {
        // "yy" keeps the trailing digits
        full[full.len() - width.min(full.len())..].to_string()
    }
}

fn push_padded(out: &mut String, value: u32, width: usize) {
    if width >= 2 {
        out.push_str(&format!("{value:02}"));
    } else {
        out.push_str(&value.to_string());
    }
}
