use anyhow::{anyhow, Result};
use chrono::{Datelike, Local, NaiveDate, TimeDelta, Weekday};

/// Parses a deadline relative to the local calendar date.
pub fn parse_human_date(input: &str) -> Result<NaiveDate> {
    parse_human_date_from(input, Local::now().date_naive())
}

/// Accepts `today`/`tod`, `tomorrow`/`tom`, `eow`, `eom`, `+Nd`/`+Nw`/`+Nm`,
/// weekday names (`fri`, `2:fri`) and `YYYY-MM-DD`.
pub fn parse_human_date_from(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return Err(anyhow!("Empty date string"));
    }

    // 1. Reserved keywords
    match input.to_lowercase().as_str() {
        "today" | "tod" => return Ok(today),
        "tomorrow" | "tom" => return add_days(today, 1, input),
        "eow" => {
            // End of week (Sunday)
            let days_to_sunday = 6 - today.weekday().num_days_from_monday() as i64;
            return add_days(today, days_to_sunday, input);
        }
        "eom" => return last_day_of_month(today.year(), today.month()),
        _ => {}
    }

    // 2. Relative format (+Nd, +Nw, +Nm)
    if let Some(rest) = input.strip_prefix('+') {
        let split = rest.char_indices().last().map(|(i, _)| i).unwrap_or(0);
        if split == 0 {
            return Err(anyhow!("Invalid relative format: {}", input));
        }
        let (num_str, unit) = rest.split_at(split);
        let count: i64 = num_str
            .parse()
            .map_err(|_| anyhow!("Invalid relative format: {}", input))?;

        return match unit {
            "d" => add_days(today, count, input),
            "w" => match count.checked_mul(7) {
                Some(days) => add_days(today, days, input),
                None => Err(anyhow!("Date out of range: {}", input)),
            },
            "m" => add_months(today, count, input),
            _ => Err(anyhow!("Unknown unit in relative time: {}", unit)),
        };
    }

    // 3. Weekday format (fri, 2:fri)
    if let Some((count, day_str)) = parse_weekday_token(input) {
        if let Ok(target) = parse_weekday_str(day_str) {
            if count < 1 {
                return Err(anyhow!("Weekday count must be at least 1: {}", input));
            }
            let mut days_needed = target.num_days_from_monday() as i64
                - today.weekday().num_days_from_monday() as i64;
            if days_needed <= 0 {
                days_needed += 7;
            }
            // 1:fri is the next Friday, 2:fri the one after that.
            let days = (count - 1)
                .checked_mul(7)
                .and_then(|weeks| weeks.checked_add(days_needed))
                .ok_or_else(|| anyhow!("Date out of range: {}", input))?;
            return add_days(today, days, input);
        }
    }

    // 4. Fallback to ISO dates
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| anyhow!("Could not parse date: {}", input))
}

/// Like [`parse_human_date_from`], but an empty input, `none` or `-` means
/// "no deadline".
pub fn parse_optional_date_from(input: &str, today: NaiveDate) -> Result<Option<NaiveDate>> {
    match input.trim().to_lowercase().as_str() {
        "" | "none" | "-" => Ok(None),
        _ => parse_human_date_from(input, today).map(Some),
    }
}

pub fn parse_optional_date(input: &str) -> Result<Option<NaiveDate>> {
    parse_optional_date_from(input, Local::now().date_naive())
}

fn add_days(today: NaiveDate, days: i64, input: &str) -> Result<NaiveDate> {
    TimeDelta::try_days(days)
        .and_then(|delta| today.checked_add_signed(delta))
        .ok_or_else(|| anyhow!("Date out of range: {}", input))
}

fn add_months(today: NaiveDate, count: i64, input: &str) -> Result<NaiveDate> {
    let months = (today.year() as i64 * 12 + today.month0() as i64)
        .checked_add(count)
        .ok_or_else(|| anyhow!("Date out of range: {}", input))?;
    let year = i32::try_from(months.div_euclid(12))
        .map_err(|_| anyhow!("Date out of range: {}", input))?;
    let month = months.rem_euclid(12) as u32 + 1;
    match NaiveDate::from_ymd_opt(year, month, today.day()) {
        Some(d) => Ok(d),
        // Jan 31 + 1m -> last day of February
        None => last_day_of_month(year, month),
    }
}

fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    let first_of_next = if month == 12 {
        year.checked_add(1).and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| anyhow!("Date out of range: {}-{}", year, month))
}

fn parse_weekday_token(input: &str) -> Option<(i64, &str)> {
    match input.split_once(':') {
        Some((count, day)) => count.parse::<i64>().ok().map(|c| (c, day)),
        // Just "fri" means 1:fri
        None => Some((1, input)),
    }
}

fn parse_weekday_str(s: &str) -> Result<Weekday> {
    match s.to_lowercase().as_str() {
        "mon" | "monday" => Ok(Weekday::Mon),
        "tue" | "tuesday" => Ok(Weekday::Tue),
        "wed" | "wednesday" => Ok(Weekday::Wed),
        "thu" | "thursday" => Ok(Weekday::Thu),
        "fri" | "friday" => Ok(Weekday::Fri),
        "sat" | "saturday" => Ok(Weekday::Sat),
        "sun" | "sunday" => Ok(Weekday::Sun),
        _ => Err(anyhow!("Invalid weekday")),
    }
}
