//! 勤怠表テンプレート定義と照合スコア
//!
//! 検出したレイアウトと見出し文字列を、テンプレートカタログの各定義と比べて
//! 最も一致するものを選ぶ。カタログは宣言順に評価し、同点なら先に出たものを採る。

use crate::detection::{DetectionOptions, DetectionResult};
use crate::error::Result;
use crate::grid::CellGrid;
use crate::layout::LayoutInfo;
use crate::text::contains_folded;
use serde::{Deserialize, Serialize};

/// テンプレートのレイアウト種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutType {
    /// 日ごとの時間が列方向に並ぶ形式
    #[serde(rename = "Horizontal_DailyHours")]
    HorizontalDailyHours,
    Normal,
}

/// テンプレート定義
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDefinition {
    pub name: String,
    pub layout_type: LayoutType,
    /// 見出しに含まれるはずの文字列（順序付き、空でもよい）
    #[serde(default)]
    pub expected_header_substrings: Vec<String>,
}

impl TemplateDefinition {
    pub fn new(name: impl Into<String>, layout_type: LayoutType, expected: &[&str]) -> Self {
        Self {
            name: name.into(),
            layout_type,
            expected_header_substrings: expected.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// テンプレートカタログ（宣言順を保持）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateCatalog {
    templates: Vec<TemplateDefinition>,
}

impl TemplateCatalog {
    pub fn new(templates: Vec<TemplateDefinition>) -> Self {
        Self { templates }
    }

    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        Ok(catalog)
    }

    /// 組み込みのカタログ
    pub fn builtin() -> Self {
        Self::new(vec![
            TemplateDefinition::new("Yatay Günlük Saat", LayoutType::HorizontalDailyHours, &[]),
            TemplateDefinition::new(
                "Standart Puantaj",
                LayoutType::Normal,
                &["Ad Soyad", "Sicil", "Giriş", "Çıkış"],
            ),
            TemplateDefinition::new(
                "Toplam Saat Listesi",
                LayoutType::Normal,
                &["Ad Soyad", "Toplam"],
            ),
        ])
    }

    pub fn templates(&self) -> &[TemplateDefinition] {
        &self.templates
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn has_layout(&self, layout_type: LayoutType) -> bool {
        self.templates.iter().any(|t| t.layout_type == layout_type)
    }
}

/// 見出し行の空でないセル文字列を左から集める
pub fn collect_headers<G: CellGrid + ?Sized>(grid: &G, header_row: usize) -> Vec<String> {
    let (_, last_col) = grid.bounds();
    (1..=last_col)
        .filter_map(|col| grid.trimmed_text(header_row, col))
        .collect()
}

/// 期待文字列が見出しに含まれるか
fn found_in_headers(headers: &[String], expected: &str) -> bool {
    headers.iter().any(|h| contains_folded(h, expected))
}

/// 見出し行より上（最大 `lookback_rows` 行、先頭 `lookback_cols` 列）に含まれるか
fn found_above_header<G: CellGrid + ?Sized>(
    grid: &G,
    header_row: usize,
    expected: &str,
    options: &DetectionOptions,
) -> bool {
    if header_row <= 1 {
        return false;
    }
    let (_, last_col) = grid.bounds();
    let first_row = header_row.saturating_sub(options.lookback_rows).max(1);
    let cols = last_col.min(options.lookback_cols);

    (first_row..header_row).any(|row| {
        (1..=cols).any(|col| {
            grid.text(row, col)
                .map(|text| contains_folded(&text, expected))
                .unwrap_or(false)
        })
    })
}

/// テンプレートを採点して最良のものを選ぶ
///
/// - 横並び日付形式: レイアウト検出時のみ対象。期待文字列が空なら即採用（スコア1.0）。
///   それ以外は見出し行と、その上の数行も探して一致率に `horizontal_bonus` を加える。
/// - 通常形式: 期待文字列が空なら対象外。見出し行のみで一致率を計算。
///
/// 最良スコアが `min_confidence` 未満なら不一致として理由を返す。
pub fn select_template<G: CellGrid + ?Sized>(
    grid: &G,
    headers: &[String],
    layout: &LayoutInfo,
    catalog: &TemplateCatalog,
    options: &DetectionOptions,
) -> DetectionResult {
    let mut best: Option<(&TemplateDefinition, f64)> = None;

    for template in catalog.templates() {
        let expected = &template.expected_header_substrings;

        let score = match template.layout_type {
            LayoutType::HorizontalDailyHours => {
                if !layout.is_horizontal_layout {
                    continue;
                }
                if expected.is_empty() {
                    tracing::debug!(template = %template.name, "horizontal template without header constraints accepted");
                    return DetectionResult::matched(
                        template.clone(),
                        1.0,
                        format!(
                            "Horizontal daily-hours layout detected at row {}; template '{}' accepted",
                            layout.header_row, template.name
                        ),
                        layout,
                    );
                }
                let matches = expected
                    .iter()
                    .filter(|e| {
                        found_in_headers(headers, e)
                            || found_above_header(grid, layout.header_row, e, options)
                    })
                    .count();
                matches as f64 / expected.len() as f64 + options.horizontal_bonus
            }
            LayoutType::Normal => {
                if expected.is_empty() {
                    continue;
                }
                let matches = expected
                    .iter()
                    .filter(|e| found_in_headers(headers, e))
                    .count();
                matches as f64 / expected.len() as f64
            }
        };

        tracing::debug!(template = %template.name, score, "template scored");

        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((template, score));
        }
    }

    match best {
        Some((template, score)) if score >= options.min_confidence => DetectionResult::matched(
            template.clone(),
            score,
            format!(
                "Template '{}' matched with confidence {:.0}%",
                template.name,
                score * 100.0
            ),
            layout,
        ),
        best => {
            let score = best.map(|(_, s)| s).unwrap_or(0.0);
            let reason = if layout.is_horizontal_layout {
                if catalog.has_layout(LayoutType::HorizontalDailyHours) {
                    format!(
                        "horizontal layout detected at row {} but no horizontal template matched the headers",
                        layout.header_row
                    )
                } else {
                    format!(
                        "horizontal layout detected at row {} but the catalog has no Horizontal_DailyHours template",
                        layout.header_row
                    )
                }
            } else {
                "no template matched".to_string()
            };
            DetectionResult::inconclusive(score, reason, layout)
        }
    }
}
