//! シフトパターンの正規化
//!
//! `"08:00-17:00 (01:00)"` や `"8/16"` のような表記ゆれのあるパターン文字列を
//! 比較用のキーに変換する。
//!
//! - 末尾の括弧（休憩時間の注記）を除去
//! - 区切り文字（`–` `—` `*` `/` `\` ` to ` `TO`）を `-` に統一
//! - 空白を除去して前後2つの時刻に分割し、それぞれを [`parse_time_of_day`] で解釈
//!
//! 時刻として解釈できない場合は小文字化した文字列そのものをキーにする（[`PatternKey::Literal`]）。
//! 自由記述のシフト名でも完全一致の重複チェックだけはできるようにするため。

use crate::error::{Error, Result};
use crate::time_segment::{
    format_duration_hhmm, format_hhmm, minutes_of_day, parse_break_duration, parse_time_of_day,
    time_key,
};
use chrono::{Duration, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

lazy_static! {
    static ref TRAILING_PAREN_RE: Regex = Regex::new(r"\(([^()]*)\)\s*$").unwrap();
}

/// `-` に置き換える区切り文字
const ALTERNATE_SEPARATORS: &[&str] = &["–", "—", "*", "/", "\\", " to ", "TO"];

/// パターンの比較キー
///
/// 正規化できたキーと文字列そのままのキーは別物として扱う。
/// `Canonical` と `Literal` は文字列表現が偶然一致しても等しくならない。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternKey {
    /// `HHMM-HHMM`
    Canonical { start: NaiveTime, end: NaiveTime },
    /// 時刻として解釈できなかった文字列（小文字化済み）
    Literal(String),
}

impl PatternKey {
    pub fn is_canonical(&self) -> bool {
        matches!(self, PatternKey::Canonical { .. })
    }
}

impl fmt::Display for PatternKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKey::Canonical { start, end } => {
                write!(f, "{}-{}", time_key(*start), time_key(*end))
            }
            PatternKey::Literal(text) => write!(f, "{}", text),
        }
    }
}

/// パターン文字列を比較キーに正規化する
pub fn normalize_pattern(raw: &str) -> PatternKey {
    let cleaned = clean_pattern(raw);

    if let Some((start, end)) = split_time_range(&cleaned) {
        return PatternKey::Canonical { start, end };
    }

    PatternKey::Literal(cleaned.to_lowercase())
}

/// 括弧除去・区切り統一・空白除去
fn clean_pattern(raw: &str) -> String {
    let mut cleaned = TRAILING_PAREN_RE.replace(raw.trim(), "").to_string();
    for separator in ALTERNATE_SEPARATORS {
        cleaned = cleaned.replace(separator, "-");
    }
    cleaned.retain(|c| !c.is_whitespace());
    cleaned
}

/// `start-end` をちょうど2つの時刻に分割する
fn split_time_range(cleaned: &str) -> Option<(NaiveTime, NaiveTime)> {
    let parts: Vec<&str> = cleaned.split('-').collect();
    match parts.as_slice() {
        [start, end] if !start.is_empty() && !end.is_empty() => {
            let start = parse_time_of_day(start).ok()?;
            let end = parse_time_of_day(end).ok()?;
            Some((start, end))
        }
        _ => None,
    }
}

/// シフトパターン1件（開始・終了・休憩）
///
/// 開始 < 終了、休憩はシフト時間より短いことを生成時に保証する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ShiftPatternRecord", into = "ShiftPatternRecord")]
pub struct ShiftPatternEntry {
    start_time: NaiveTime,
    end_time: NaiveTime,
    break_duration: Duration,
}

impl ShiftPatternEntry {
    pub fn new(start_time: NaiveTime, end_time: NaiveTime, break_duration: Duration) -> Result<Self> {
        if start_time >= end_time {
            return Err(Error::constraint(format!(
                "start {} must be before end {}",
                format_hhmm(start_time),
                format_hhmm(end_time)
            )));
        }
        if break_duration < Duration::zero() {
            return Err(Error::constraint("break duration must not be negative"));
        }
        if break_duration >= end_time - start_time {
            return Err(Error::constraint(format!(
                "break {} must be shorter than the shift {}-{}",
                format_duration_hhmm(break_duration),
                format_hhmm(start_time),
                format_hhmm(end_time)
            )));
        }

        Ok(Self {
            start_time,
            end_time,
            break_duration,
        })
    }

    /// 開始・終了・休憩の各トークンから生成
    ///
    /// 休憩が空文字なら休憩なしとみなす。
    pub fn parse(start: &str, end: &str, break_token: &str) -> Result<Self> {
        let start_time = parse_time_of_day(start)?;
        let end_time = parse_time_of_day(end)?;
        let break_duration = if break_token.trim().is_empty() {
            Duration::zero()
        } else {
            parse_break_duration(break_token)?
        };
        Self::new(start_time, end_time, break_duration)
    }

    /// `"08:00-17:00 (01:00)"` 形式の文字列から生成
    pub fn from_pattern_text(raw: &str) -> Result<Self> {
        let (start, end) = match normalize_pattern(raw) {
            PatternKey::Canonical { start, end } => (start, end),
            PatternKey::Literal(text) => {
                return Err(Error::format(format!("'{}' is not a time range", text)))
            }
        };

        let break_duration = match TRAILING_PAREN_RE.captures(raw.trim()) {
            Some(caps) if !caps[1].trim().is_empty() => parse_break_duration(&caps[1])?,
            _ => Duration::zero(),
        };
        Self::new(start, end, break_duration)
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end_time
    }

    pub fn break_duration(&self) -> Duration {
        self.break_duration
    }

    pub fn key(&self) -> PatternKey {
        PatternKey::Canonical {
            start: self.start_time,
            end: self.end_time,
        }
    }

    /// `HHMM-HHMM`
    pub fn canonical_code(&self) -> String {
        self.key().to_string()
    }

    /// `HH:mm-HH:mm (HH:mm)`
    pub fn display_code(&self) -> String {
        format!(
            "{}-{} ({})",
            format_hhmm(self.start_time),
            format_hhmm(self.end_time),
            format_duration_hhmm(self.break_duration)
        )
    }

    /// 開始から終了までの時間（時間単位）
    pub fn span_hours(&self) -> f64 {
        (minutes_of_day(self.end_time) - minutes_of_day(self.start_time)) as f64 / 60.0
    }

    /// 休憩を除いた実働時間（時間単位）
    pub fn net_hours(&self) -> f64 {
        self.span_hours() - self.break_duration.num_minutes() as f64 / 60.0
    }
}

impl fmt::Display for ShiftPatternEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_code())
    }
}

/// 設定ドキュメント上の表現
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShiftPatternRecord {
    start_time: String,
    end_time: String,
    #[serde(default)]
    break_duration: String,
    #[serde(default, skip_deserializing)]
    canonical_code: String,
    #[serde(default, skip_deserializing)]
    display_code: String,
}

impl TryFrom<ShiftPatternRecord> for ShiftPatternEntry {
    type Error = Error;

    fn try_from(record: ShiftPatternRecord) -> Result<Self> {
        Self::parse(&record.start_time, &record.end_time, &record.break_duration)
    }
}

impl From<ShiftPatternEntry> for ShiftPatternRecord {
    fn from(entry: ShiftPatternEntry) -> Self {
        Self {
            start_time: format_hhmm(entry.start_time),
            end_time: format_hhmm(entry.end_time),
            break_duration: format_duration_hhmm(entry.break_duration),
            canonical_code: entry.canonical_code(),
            display_code: entry.display_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(raw: &str) -> String {
        let key = normalize_pattern(raw);
        assert!(key.is_canonical(), "expected canonical key for {:?}, got {:?}", raw, key);
        key.to_string()
    }

    #[test]
    fn test_normalize_separators() {
        assert_eq!(canonical("08:00-17:00"), "0800-1700");
        assert_eq!(canonical("8/16"), "0800-1600");
        assert_eq!(canonical("8 * 16"), "0800-1600");
        assert_eq!(canonical("08:00 – 17:00"), "0800-1700");
        assert_eq!(canonical("08:00—17:00"), "0800-1700");
        assert_eq!(canonical("8\\16"), "0800-1600");
        assert_eq!(canonical("8 to 16"), "0800-1600");
        assert_eq!(canonical("8:30TO17:30"), "0830-1730");
    }

    #[test]
    fn test_normalize_strips_break_annotation() {
        assert_eq!(canonical("08:00-17:00 (01:00)"), "0800-1700");
        assert_eq!(canonical("0800 - 1700(1)"), "0800-1700");
    }

    #[test]
    fn test_normalize_cross_format_equivalence() {
        let a = normalize_pattern("08:00-17:00");
        let b = normalize_pattern("800/1700");
        let c = normalize_pattern("8-17");
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_normalize_literal_fallback() {
        assert_eq!(
            normalize_pattern("Gece Vardiyası"),
            PatternKey::Literal("gecevardiyası".to_string())
        );
        // 3分割はフォールバック
        assert_eq!(
            normalize_pattern("8-12-16"),
            PatternKey::Literal("8-12-16".to_string())
        );
        // 片側が時刻でない
        assert_eq!(
            normalize_pattern("08:00-late"),
            PatternKey::Literal("08:00-late".to_string())
        );
        assert_eq!(normalize_pattern("-17:00"), PatternKey::Literal("-17:00".to_string()));
    }

    #[test]
    fn test_literal_never_equals_canonical() {
        let literal = PatternKey::Literal("0800-1700".to_string());
        let canonical = normalize_pattern("08:00-17:00");
        assert_eq!(literal.to_string(), canonical.to_string());
        assert_ne!(literal, canonical);
    }

    #[test]
    fn test_entry_from_tokens() {
        let entry = ShiftPatternEntry::parse("0800", "1700", "1:00").unwrap();
        assert_eq!(entry.canonical_code(), "0800-1700");
        assert_eq!(entry.display_code(), "08:00-17:00 (01:00)");
        assert_eq!(entry.span_hours(), 9.0);
        assert_eq!(entry.net_hours(), 8.0);
    }

    #[test]
    fn test_entry_empty_break() {
        let entry = ShiftPatternEntry::parse("8", "16", "").unwrap();
        assert_eq!(entry.display_code(), "08:00-16:00 (00:00)");
    }

    #[test]
    fn test_entry_constraints() {
        assert!(matches!(
            ShiftPatternEntry::parse("17:00", "08:00", "0"),
            Err(Error::ConstraintViolation(_))
        ));
        assert!(matches!(
            ShiftPatternEntry::parse("08:00", "08:00", "0"),
            Err(Error::ConstraintViolation(_))
        ));
        assert!(matches!(
            ShiftPatternEntry::parse("08:00", "10:00", "2:00"),
            Err(Error::ConstraintViolation(_))
        ));
        assert!(matches!(
            ShiftPatternEntry::parse("08:00", "xx", "0"),
            Err(Error::FormatInvalid(_))
        ));
        assert!(matches!(
            ShiftPatternEntry::parse("08:00", "17:00", "?"),
            Err(Error::FormatInvalid(_))
        ));
    }

    #[test]
    fn test_display_code_round_trip() {
        for (start, end) in [("08:00", "17:00"), ("07:30", "16:15"), ("00:00", "23:59")] {
            let raw = format!("{}-{}", start, end);
            let entry = ShiftPatternEntry::parse(start, end, "").unwrap();
            assert_eq!(normalize_pattern(&entry.display_code()), normalize_pattern(&raw));
        }
    }

    #[test]
    fn test_from_pattern_text() {
        let entry = ShiftPatternEntry::from_pattern_text("08:00-17:00 (01:00)").unwrap();
        assert_eq!(entry.break_duration().num_minutes(), 60);
        assert_eq!(entry.canonical_code(), "0800-1700");

        let no_break = ShiftPatternEntry::from_pattern_text("8/16").unwrap();
        assert_eq!(no_break.break_duration(), Duration::zero());

        assert!(matches!(
            ShiftPatternEntry::from_pattern_text("Gece"),
            Err(Error::FormatInvalid(_))
        ));
    }

    #[test]
    fn test_entry_serde() {
        let entry = ShiftPatternEntry::parse("800", "1700", "1").unwrap();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["startTime"], "08:00");
        assert_eq!(json["endTime"], "17:00");
        assert_eq!(json["breakDuration"], "01:00");
        assert_eq!(json["canonicalCode"], "0800-1700");
        assert_eq!(json["displayCode"], "08:00-17:00 (01:00)");

        let back: ShiftPatternEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_entry_serde_rejects_invalid() {
        let json = r#"{"startTime": "17:00", "endTime": "08:00"}"#;
        assert!(serde_json::from_str::<ShiftPatternEntry>(json).is_err());
    }
}
