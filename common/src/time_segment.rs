//! 時刻トークンのパース
//!
//! 人手入力や外部システム由来の時刻トークン（`"08:00"`, `"800"`, `"8"`, `"1.5"` など）を
//! 時刻に変換する。次の順で試し、最初に成功したものを採用する:
//! 1. 時:分（秒付きも可）
//! 2. 数字のみ抽出（4桁=HHMM、3桁=HMM）
//! 3. 小数の時間（`,` と `.` のどちらも小数点として扱う）
//!
//! 時 0〜23、分 0〜59 の範囲外はその方式の失敗とみなし、次の方式へ進む。

use crate::error::{Error, Result};
use chrono::{Duration, NaiveTime, Timelike};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CLOCK_RE: Regex = Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$").unwrap();
    static ref DECIMAL_RE: Regex = Regex::new(r"^\d*(?:[.,]\d+)?$").unwrap();
}

const MINUTES_PER_DAY: i64 = 24 * 60;

/// 時刻トークンをパースする
///
/// # Returns
/// * `Ok(NaiveTime)` - 秒は切り捨て
/// * `Err(Error::FormatInvalid)` - どの方式でも解釈できない場合
pub fn parse_time_of_day(token: &str) -> Result<NaiveTime> {
    let token = token.trim();
    if token.is_empty() {
        return Err(Error::format("time token is empty"));
    }

    parse_clock(token)
        .or_else(|| parse_digits(token))
        .or_else(|| parse_decimal_hours(token))
        .ok_or_else(|| Error::format(format!("'{}' is not a recognised time of day", token)))
}

/// 休憩時間トークンをパースする（0時からの経過時間として読む）
///
/// `"1:00"` → 60分、`"0.5"` → 30分
pub fn parse_break_duration(token: &str) -> Result<Duration> {
    let time = parse_time_of_day(token)
        .map_err(|_| Error::format(format!("'{}' is not a recognised break duration", token.trim())))?;
    Ok(Duration::minutes(minutes_of_day(time)))
}

/// 比較キー（ゼロ埋め `HHMM`）
pub fn time_key(time: NaiveTime) -> String {
    format!("{:02}{:02}", time.hour(), time.minute())
}

/// 表示用 `HH:MM`
pub fn format_hhmm(time: NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// 経過時間を `HH:MM` で表示
pub fn format_duration_hhmm(duration: Duration) -> String {
    let minutes = duration.num_minutes().max(0);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// 0時からの経過分
pub fn minutes_of_day(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

fn hour_minute(hour: u32, minute: u32) -> Option<NaiveTime> {
    if hour > 23 || minute > 59 {
        return None;
    }
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// 方式1: `H:MM` / `HH:MM` / `HH:MM:SS`
fn parse_clock(token: &str) -> Option<NaiveTime> {
    let caps = CLOCK_RE.captures(token)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    if let Some(seconds) = caps.get(3) {
        let seconds: u32 = seconds.as_str().parse().ok()?;
        if seconds > 59 {
            return None;
        }
    }
    hour_minute(hour, minute)
}

/// 方式2: 数字のみ抽出
fn parse_digits(token: &str) -> Option<NaiveTime> {
    let digits: Vec<u32> = token.chars().filter_map(|c| c.to_digit(10)).collect();

    match digits.as_slice() {
        [h1, h2, m1, m2] => hour_minute(h1 * 10 + h2, m1 * 10 + m2),
        [h, m1, m2] => hour_minute(*h, m1 * 10 + m2),
        _ => None,
    }
}

/// 方式3: 小数の時間（`1.5` → 01:30、`7,75` → 07:45）
fn parse_decimal_hours(token: &str) -> Option<NaiveTime> {
    if !DECIMAL_RE.is_match(token) {
        return None;
    }
    let hours: f64 = token.replace(',', ".").parse().ok()?;
    if !hours.is_finite() || hours < 0.0 {
        return None;
    }

    let minutes = (hours * 60.0).round() as i64;
    if minutes >= MINUTES_PER_DAY {
        return None;
    }
    hour_minute((minutes / 60) as u32, (minutes % 60) as u32)
}
