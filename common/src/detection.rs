//! テンプレート検出の入口
//!
//! グリッド → レイアウト検出 → 見出し抽出 → テンプレート採点。
//! 失敗はすべて `matched_template = None` と理由付きの [`DetectionResult`] で返し、
//! エラーにはしない。

use crate::error::{Error, Result};
use crate::grid::CellGrid;
use crate::layout::{detect_layout, LayoutInfo};
use crate::template::{collect_headers, select_template, TemplateCatalog, TemplateDefinition};
use serde::{Deserialize, Serialize};

/// 検出オプション
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectionOptions {
    /// レイアウト検出で走査する最大行数
    pub max_scan_rows: usize,
    /// 日付の並びとして確定する最小の長さ
    pub min_run_length: usize,
    /// 見出し行より上を探す行数
    pub lookback_rows: usize,
    /// 見出し行より上を探す列数
    pub lookback_cols: usize,
    /// 採用に必要な最小スコア
    pub min_confidence: f64,
    /// 横並び日付テンプレートへの加点
    pub horizontal_bonus: f64,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            max_scan_rows: 20,
            min_run_length: 3,
            lookback_rows: 5,
            lookback_cols: 10,
            min_confidence: 0.3,
            horizontal_bonus: 0.3,
        }
    }
}

impl DetectionOptions {
    /// 設定ファイル由来の値の検証
    pub fn validate(&self) -> Result<()> {
        if self.max_scan_rows == 0 {
            return Err(Error::Config("maxScanRows must be at least 1".into()));
        }
        if self.min_run_length < 2 {
            return Err(Error::Config(format!(
                "minRunLength must be at least 2 (got {})",
                self.min_run_length
            )));
        }
        for (name, value) in [
            ("minConfidence", self.min_confidence),
            ("horizontalBonus", self.horizontal_bonus),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!("{} must be a non-negative number", name)));
            }
        }
        Ok(())
    }
}

/// 検出結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub matched_template: Option<TemplateDefinition>,
    pub confidence_score: f64,
    /// 表示用の説明（常に設定される）
    pub reason: String,
    pub is_horizontal_layout: bool,
    pub header_row: usize,
}

impl DetectionResult {
    pub(crate) fn matched(
        template: TemplateDefinition,
        score: f64,
        reason: String,
        layout: &LayoutInfo,
    ) -> Self {
        Self {
            matched_template: Some(template),
            confidence_score: score,
            reason,
            is_horizontal_layout: layout.is_horizontal_layout,
            header_row: layout.header_row,
        }
    }

    pub(crate) fn inconclusive(score: f64, reason: String, layout: &LayoutInfo) -> Self {
        Self {
            matched_template: None,
            confidence_score: score,
            reason,
            is_horizontal_layout: layout.is_horizontal_layout,
            header_row: layout.header_row,
        }
    }

    /// 入力自体が使えない場合（ファイルが開けない、カタログが空など）
    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            matched_template: None,
            confidence_score: 0.0,
            reason: reason.into(),
            is_horizontal_layout: false,
            header_row: 1,
        }
    }

    pub fn is_match(&self) -> bool {
        self.matched_template.is_some()
    }
}

/// グリッドに合うテンプレートを検出する
pub fn detect_template<G: CellGrid + ?Sized>(
    grid: &G,
    catalog: &TemplateCatalog,
    options: &DetectionOptions,
) -> DetectionResult {
    if catalog.is_empty() {
        tracing::warn!("template catalog is empty");
        return DetectionResult::failure("template catalog is empty");
    }

    let (last_row, last_col) = grid.bounds();
    if last_row == 0 || last_col == 0 {
        tracing::warn!("grid has no cells");
        return DetectionResult::failure("sheet is empty or could not be read");
    }

    let layout = detect_layout(grid, options);
    let headers = collect_headers(grid, layout.header_row);
    tracing::debug!(header_row = layout.header_row, headers = ?headers, "headers collected");

    let result = select_template(grid, &headers, &layout, catalog, options);
    tracing::info!(
        matched = result.matched_template.as_ref().map(|t| t.name.as_str()),
        score = result.confidence_score,
        "{}",
        result.reason
    );
    result
}
