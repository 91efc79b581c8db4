//! 表レイアウト検出
//!
//! シート上部を走査し、日付（1〜31）が横に連続して並ぶ行を探す。
//! 見つかれば「日別時間が横に並ぶ」形式（[`LayoutType::HorizontalDailyHours`]）とみなし、
//! その行を見出し行とする。
//!
//! [`LayoutType::HorizontalDailyHours`]: crate::template::LayoutType::HorizontalDailyHours

use crate::detection::DetectionOptions;
use crate::grid::CellGrid;
use serde::{Deserialize, Serialize};

/// 日付見出しの列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayColumn {
    pub day: u32,
    pub col: usize,
}

/// レイアウト検出結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutInfo {
    pub is_horizontal_layout: bool,
    /// 見出し行（未検出なら1）
    pub header_row: usize,
    /// 検出した日付列の並び
    pub day_columns: Vec<DayColumn>,
}

impl LayoutInfo {
    fn not_detected() -> Self {
        Self {
            is_horizontal_layout: false,
            header_row: 1,
            day_columns: Vec::new(),
        }
    }
}

/// セル文字列を日付（1〜31）として解釈
fn parse_day(text: &str) -> Option<u32> {
    let value: i64 = text.trim().parse().ok()?;
    (1..=31).contains(&value).then_some(value as u32)
}

/// 横並び日付レイアウトを検出する
///
/// 上から `max_scan_rows` 行まで、各行を左から走査して連続する日付の並びを追う。
/// - 前の値+1 なら並びに追加
/// - 前の値がない、または 1 なら新しい並びを開始
/// - それ以外は、並びが `min_run_length` 以上なら確定、でなければ新しい並びを開始
/// - 日付でないセルでは、並びが `min_run_length` 以上なら確定。でなければ直前値だけを忘れる
///   （並び自体は残るが、次の日付セルは「前の値なし」として新しい並びを開始する）
///
/// 最初に確定した行で走査を終える。
pub fn detect_layout<G: CellGrid + ?Sized>(grid: &G, options: &DetectionOptions) -> LayoutInfo {
    let (last_row, last_col) = grid.bounds();
    let scan_rows = last_row.min(options.max_scan_rows);

    for row in 1..=scan_rows {
        if let Some(run) = scan_row(grid, row, last_col, options.min_run_length) {
            tracing::debug!(
                row,
                first_day = run.first().map(|d| d.day),
                days = run.len(),
                "horizontal day header detected"
            );
            return LayoutInfo {
                is_horizontal_layout: true,
                header_row: row,
                day_columns: run,
            };
        }
    }

    tracing::debug!(scan_rows, "no horizontal day header found");
    LayoutInfo::not_detected()
}

/// 1行分を走査し、確定した日付の並びを返す
fn scan_row<G: CellGrid + ?Sized>(
    grid: &G,
    row: usize,
    last_col: usize,
    min_run_length: usize,
) -> Option<Vec<DayColumn>> {
    let mut run: Vec<DayColumn> = Vec::new();
    let mut previous: Option<u32> = None;

    for col in 1..=last_col {
        let day = grid.text(row, col).as_deref().and_then(parse_day);

        match day {
            Some(day) => {
                match previous {
                    Some(prev) if day == prev + 1 => {
                        run.push(DayColumn { day, col });
                    }
                    None => {
                        run = vec![DayColumn { day, col }];
                    }
                    Some(_) if day == 1 => {
                        // 1 は月の始まりとして並びをやり直す（長さに関係なく）
                        run = vec![DayColumn { day, col }];
                    }
                    Some(_) => {
                        if run.len() >= min_run_length {
                            return Some(run);
                        }
                        run = vec![DayColumn { day, col }];
                    }
                }
                previous = Some(day);
            }
            None => {
                if run.len() >= min_run_length {
                    return Some(run);
                }
                // 並びは消さない
                previous = None;
            }
        }
    }

    (run.len() >= min_run_length).then_some(run)
}
