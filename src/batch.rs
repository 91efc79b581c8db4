//! 複数ワークブックの一括テンプレート検出
//!
//! ファイルが開けない場合もエラーにせず、理由付きの不一致結果として返す。

use crate::workbook::load_sheet;
use indicatif::{ProgressBar, ProgressStyle};
use puantaj_common::{detect_template, DetectionOptions, DetectionResult, TemplateCatalog};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// ファイルごとの検出結果
#[derive(Debug, Clone)]
pub struct FileDetection {
    pub path: PathBuf,
    pub result: DetectionResult,
}

/// 1ファイルを検出（読み込み失敗は結果に変換）
pub fn detect_file(
    path: &Path,
    sheet: Option<&str>,
    catalog: &TemplateCatalog,
    options: &DetectionOptions,
) -> DetectionResult {
    match load_sheet(path, sheet) {
        Ok(grid) => detect_template(&grid, catalog, options),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "workbook could not be read");
            DetectionResult::failure(format!("workbook could not be read: {}", e))
        }
    }
}

/// 複数ファイルを並列に検出（入力順で返す）
pub fn detect_files(
    paths: &[PathBuf],
    sheet: Option<&str>,
    catalog: &TemplateCatalog,
    options: &DetectionOptions,
    show_progress: bool,
) -> Vec<FileDetection> {
    let progress = if show_progress {
        let bar = ProgressBar::new(paths.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let detections: Vec<FileDetection> = paths
        .par_iter()
        .map(|path| {
            let result = detect_file(path, sheet, catalog, options);
            progress.inc(1);
            FileDetection {
                path: path.clone(),
                result,
            }
        })
        .collect();

    progress.finish_and_clear();
    detections
}

/// 一覧表示用の1行
pub fn summary_line(detection: &FileDetection) -> String {
    let name = detection
        .path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| detection.path.display().to_string());

    match &detection.result.matched_template {
        Some(template) => format!(
            "✔ {} → {} ({:.0}%)",
            name,
            template.name,
            detection.result.confidence_score * 100.0
        ),
        None => format!("✘ {} → {}", name, detection.result.reason),
    }
}
