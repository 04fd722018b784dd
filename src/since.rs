//! Relative time expressions for the `--updated-since` filter.
//!
//! Accepts the relative formats catalog operators are used to typing:
//! `-5minute`, `-2 hours`, `1 day ago`, `yesterday`, `last week`,
//! `yesterday noon`, `-1 month +2 days`. Day keywords reset the time of day,
//! offsets are applied after them regardless of their position.

use chrono::{DateTime, Duration, LocalResult, Months, NaiveDateTime, NaiveTime, Offset, TimeZone};

use crate::error::{BridgeError, BridgeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Fortnight,
    Month,
    Year,
}

impl Unit {
    fn parse(word: &str) -> Option<Self> {
        let unit = match word {
            "s" | "sec" | "secs" | "second" | "seconds" => Unit::Second,
            "min" | "mins" | "minute" | "minutes" => Unit::Minute,
            "h" | "hour" | "hours" => Unit::Hour,
            "d" | "day" | "days" => Unit::Day,
            "week" | "weeks" => Unit::Week,
            "fortnight" | "fortnights" => Unit::Fortnight,
            "month" | "months" => Unit::Month,
            "year" | "years" => Unit::Year,
            _ => return None,
        };
        Some(unit)
    }

    /// Units added as elapsed time rather than on the wall clock.
    fn is_elapsed(self) -> bool {
        matches!(self, Unit::Second | Unit::Minute | Unit::Hour)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Number(i64),
    Word(String),
}

/// A parsed relative expression, independent of the reference instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Relative {
    day_shift: i64,
    time_of_day: Option<NaiveTime>,
    offsets: Vec<(i64, Unit)>,
}

fn invalid(expression: &str) -> BridgeError {
    BridgeError::InvalidTimeExpression {
        expression: expression.to_string(),
    }
}

fn tokenize(expression: &str) -> BridgeResult<Vec<Token>> {
    let input = expression.to_ascii_lowercase();
    let mut chars = input.chars().peekable();
    let mut tokens = Vec::new();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() || c == ',' {
            chars.next();
        } else if c == '+' || c == '-' || c.is_ascii_digit() {
            let negative = c == '-';
            if !c.is_ascii_digit() {
                chars.next();
                while chars.peek().is_some_and(|c| c.is_whitespace()) {
                    chars.next();
                }
            }
            let mut digits = String::new();
            while let Some(&d) = chars.peek() {
                if !d.is_ascii_digit() {
                    break;
                }
                digits.push(d);
                chars.next();
            }
            let value: i64 = digits.parse().map_err(|_| invalid(expression))?;
            tokens.push(Token::Number(if negative { -value } else { value }));
        } else if c.is_ascii_alphabetic() {
            let mut word = String::new();
            while let Some(&w) = chars.peek() {
                if !w.is_ascii_alphabetic() {
                    break;
                }
                word.push(w);
                chars.next();
            }
            tokens.push(Token::Word(word));
        } else {
            return Err(invalid(expression));
        }
    }

    Ok(tokens)
}

fn parse(expression: &str) -> BridgeResult<Relative> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(invalid(expression));
    }

    let mut relative = Relative::default();
    let mut iter = tokens.into_iter().peekable();

    while let Some(token) = iter.next() {
        let amount = match token {
            Token::Number(n) => n,
            Token::Word(word) => match word.as_str() {
                "now" => continue,
                "today" | "midnight" => {
                    relative.time_of_day = NaiveTime::from_hms_opt(0, 0, 0);
                    continue;
                }
                "noon" => {
                    relative.time_of_day = NaiveTime::from_hms_opt(12, 0, 0);
                    continue;
                }
                "yesterday" => {
                    relative.day_shift -= 1;
                    relative.time_of_day = NaiveTime::from_hms_opt(0, 0, 0);
                    continue;
                }
                "tomorrow" => {
                    relative.day_shift += 1;
                    relative.time_of_day = NaiveTime::from_hms_opt(0, 0, 0);
                    continue;
                }
                "next" => 1,
                "last" | "previous" => -1,
                "this" => 0,
                _ => return Err(invalid(expression)),
            },
        };

        let unit = match iter.next() {
            Some(Token::Word(word)) => Unit::parse(&word).ok_or_else(|| invalid(expression))?,
            _ => return Err(invalid(expression)),
        };

        let amount = if matches!(iter.peek(), Some(Token::Word(w)) if w == "ago") {
            iter.next();
            -amount
        } else {
            amount
        };

        relative.offsets.push((amount, unit));
    }

    Ok(relative)
}

fn elapsed(amount: i64, unit: Unit) -> Option<Duration> {
    match unit {
        Unit::Second => Duration::try_seconds(amount),
        Unit::Minute => Duration::try_minutes(amount),
        Unit::Hour => Duration::try_hours(amount),
        _ => None,
    }
}

/// Move the wall clock by a calendar unit.
fn shift(naive: NaiveDateTime, amount: i64, unit: Unit) -> Option<NaiveDateTime> {
    let months = |n: i64| -> Option<NaiveDateTime> {
        let magnitude = Months::new(u32::try_from(n.unsigned_abs()).ok()?);
        if n < 0 {
            naive.checked_sub_months(magnitude)
        } else {
            naive.checked_add_months(magnitude)
        }
    };

    match unit {
        Unit::Second | Unit::Minute | Unit::Hour => None,
        Unit::Day => naive.checked_add_signed(Duration::try_days(amount)?),
        Unit::Week => naive.checked_add_signed(Duration::try_weeks(amount)?),
        Unit::Fortnight => naive.checked_add_signed(Duration::try_weeks(amount.checked_mul(2)?)?),
        Unit::Month => months(amount),
        Unit::Year => months(amount.checked_mul(12)?),
    }
}

/// Map a wall-clock time back into `tz`.
///
/// Ambiguous times take the earlier instant. Times skipped by a forward
/// transition keep the offset in effect before it, which lands them past
/// the gap.
fn from_wall_clock<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => {
            let day_before = naive.checked_sub_signed(Duration::try_days(1)?)?;
            let before = tz.offset_from_utc_datetime(&day_before).fix();
            let utc = naive.checked_sub_signed(Duration::try_seconds(i64::from(
                before.local_minus_utc(),
            ))?)?;
            Some(tz.from_utc_datetime(&utc))
        }
    }
}

/// Apply a relative expression to `now`, like a date modifier would.
///
/// Day keywords and day/week/month/year offsets move the local wall clock;
/// month and year offsets clamp to the end of shorter months. Hour, minute
/// and second offsets are then added as elapsed time, so they behave the same
/// across daylight-saving transitions.
pub fn modify<Tz: TimeZone>(now: &DateTime<Tz>, expression: &str) -> BridgeResult<DateTime<Tz>> {
    let relative = parse(expression)?;
    let (elapsed_offsets, calendar_offsets): (Vec<_>, Vec<_>) = relative
        .offsets
        .into_iter()
        .partition(|(_, unit)| unit.is_elapsed());

    let local = now.naive_local();
    let mut naive = local;
    if relative.day_shift != 0 {
        naive = shift(naive, relative.day_shift, Unit::Day).ok_or_else(|| invalid(expression))?;
    }
    if let Some(time) = relative.time_of_day {
        naive = naive.date().and_time(time);
    }
    for (amount, unit) in calendar_offsets {
        naive = shift(naive, amount, unit).ok_or_else(|| invalid(expression))?;
    }

    let mut moved = if naive == local {
        now.clone()
    } else {
        from_wall_clock(&now.timezone(), naive).ok_or_else(|| invalid(expression))?
    };
    for (amount, unit) in elapsed_offsets {
        moved = elapsed(amount, unit)
            .and_then(|delta| moved.clone().checked_add_signed(delta))
            .ok_or_else(|| invalid(expression))?;
    }

    Ok(moved)
}

/// Resolve an `--updated-since` expression into the cutoff timestamp.
///
/// An expression that leaves the reference second unchanged is rejected,
/// the same way an unparseable one is.
pub fn resolve_since<Tz: TimeZone>(
    now: &DateTime<Tz>,
    expression: &str,
) -> BridgeResult<DateTime<Tz>> {
    let since = modify(now, expression)?;
    if since.timestamp() == now.timestamp() {
        tracing::debug!("Expression '{}' did not shift the reference time", expression);
        return Err(invalid(expression));
    }
    Ok(since)
}
