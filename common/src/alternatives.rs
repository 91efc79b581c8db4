//! パターン別表記の生成
//!
//! 正規化済みの開始・終了時刻から、人や外部システムが書きそうな表記を列挙する。
//! 生成結果はシフトグループに別表記として登録し、後で任意形式の元データと突き合わせる。

use chrono::{NaiveTime, Timelike};
use std::collections::HashSet;

/// 全表記に使う区切り
const SEPARATORS: &[&str] = &["-", " - ", "/", " / ", "*", " * "];

/// 時のみ表記で使う区切り
const COMPACT_SEPARATORS: &[&str] = &["-", "/", "*"];

/// 1つの時刻の表記一覧
///
/// `08:00`, `8:00`, `0800`, `800`、分が0なら `08`, `8` も加える。
pub fn time_variants(time: NaiveTime) -> Vec<String> {
    let (hour, minute) = (time.hour(), time.minute());

    let mut variants = vec![
        format!("{:02}:{:02}", hour, minute),
        format!("{}:{:02}", hour, minute),
        format!("{:02}{:02}", hour, minute),
        format!("{}{:02}", hour, minute),
    ];
    variants.extend(hour_only_variants(time));
    variants
}

fn hour_only_variants(time: NaiveTime) -> Vec<String> {
    if time.minute() != 0 {
        return Vec::new();
    }
    vec![format!("{:02}", time.hour()), format!("{}", time.hour())]
}

/// 開始×終了×区切りの全組み合わせを生成する
///
/// 大文字小文字を無視して重複を除き、生成順で返す。
pub fn generate_alternatives(start: NaiveTime, end: NaiveTime) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut alternatives = Vec::new();

    let mut push = |candidate: String| {
        if seen.insert(candidate.to_lowercase()) {
            alternatives.push(candidate);
        }
    };

    let start_variants = time_variants(start);
    let end_variants = time_variants(end);
    for s in &start_variants {
        for e in &end_variants {
            for separator in SEPARATORS {
                push(format!("{}{}{}", s, separator, e));
            }
        }
    }

    // 両方ちょうどの時刻なら時のみの短縮表記（"8-16" など）
    let start_hours = hour_only_variants(start);
    let end_hours = hour_only_variants(end);
    if !start_hours.is_empty() && !end_hours.is_empty() {
        for s in &start_hours {
            for e in &end_hours {
                for separator in COMPACT_SEPARATORS {
                    push(format!("{}{}{}", s, separator, e));
                }
            }
        }
    }

    alternatives
}
