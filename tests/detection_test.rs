//! ワークブックからのテンプレート検出テスト
//!
//! rust_xlsxwriterで実際のxlsxを作り、calamine経由で読み込んで検出する。

use puantaj_common::{DetectionOptions, TemplateCatalog};
use puantaj_rust::{batch, config, workbook};
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// 3行目のB〜E列に日付（1〜4）が並ぶ横並び形式
fn write_horizontal_workbook(path: &Path) {
    let mut book = Workbook::new();
    let sheet = book.add_worksheet();
    sheet.write_string(0, 0, "Puantaj Cetveli - Ocak").unwrap();
    sheet.write_string(2, 0, "Ad Soyad").unwrap();
    for day in 1..=4u16 {
        sheet.write_number(2, day, f64::from(day)).unwrap();
    }
    sheet.write_string(3, 0, "Ayşe Yılmaz").unwrap();
    for day in 1..=4u16 {
        sheet.write_number(3, day, 8.0).unwrap();
    }
    book.save(path).unwrap();
}

/// 1行目が見出しの通常形式
fn write_normal_workbook(path: &Path) {
    let mut book = Workbook::new();
    let sheet = book.add_worksheet();
    for (col, header) in ["AD SOYAD", "Sicil No", "Giriş Saati", "Çıkış Saati"].iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    sheet.write_string(1, 0, "Mehmet Demir").unwrap();
    sheet.write_number(1, 1, 1042.0).unwrap();
    sheet.write_string(1, 2, "08:00").unwrap();
    sheet.write_string(1, 3, "17:00").unwrap();
    book.save(path).unwrap();
}

#[test]
fn test_horizontal_workbook_detected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("yatay.xlsx");
    write_horizontal_workbook(&path);

    let result = batch::detect_file(
        &path,
        None,
        &TemplateCatalog::builtin(),
        &DetectionOptions::default(),
    );

    assert!(result.is_match(), "{}", result.reason);
    assert!(result.is_horizontal_layout);
    assert_eq!(result.header_row, 3);
    assert_eq!(result.confidence_score, 1.0);
    assert_eq!(result.matched_template.unwrap().name, "Yatay Günlük Saat");
}

#[test]
fn test_horizontal_template_with_title_above_header() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("yatay.xlsx");
    write_horizontal_workbook(&path);

    let catalog_path = dir.path().join("catalog.json");
    std::fs::write(
        &catalog_path,
        r#"[
            { "name": "Aylık Cetvel", "layoutType": "Horizontal_DailyHours", "expectedHeaderSubstrings": ["puantaj", "ad soyad"] },
            { "name": "Standart", "layoutType": "Normal", "expectedHeaderSubstrings": ["Ad Soyad", "Sicil"] }
        ]"#,
    )
    .unwrap();
    let catalog = config::load_catalog(&catalog_path).unwrap();

    let result = batch::detect_file(&path, None, &catalog, &DetectionOptions::default());

    // タイトルは見出し行の上、「Ad Soyad」は見出し行にある
    assert_eq!(result.matched_template.as_ref().unwrap().name, "Aylık Cetvel");
    assert!((result.confidence_score - 1.3).abs() < 1e-9);
}

#[test]
fn test_normal_workbook_detected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("standart.xlsx");
    write_normal_workbook(&path);

    let grid = workbook::load_sheet(&path, None).unwrap();
    let result = puantaj_common::detect_template(
        &grid,
        &TemplateCatalog::builtin(),
        &DetectionOptions::default(),
    );

    assert!(!result.is_horizontal_layout);
    assert_eq!(result.header_row, 1);
    assert_eq!(result.matched_template.unwrap().name, "Standart Puantaj");
    assert_eq!(result.confidence_score, 1.0);
}

#[test]
fn test_horizontal_layout_without_horizontal_template() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("yatay.xlsx");
    write_horizontal_workbook(&path);

    let catalog: TemplateCatalog =
        TemplateCatalog::from_json(r#"[{ "name": "Liste", "layoutType": "Normal", "expectedHeaderSubstrings": ["Toplam"] }]"#)
            .unwrap();
    let result = batch::detect_file(&path, None, &catalog, &DetectionOptions::default());

    assert!(!result.is_match());
    assert!(result.is_horizontal_layout);
    assert!(result.reason.contains("no Horizontal_DailyHours template"));
}

#[test]
fn test_detect_folder_in_order() {
    let dir = tempdir().unwrap();
    let horizontal = dir.path().join("a_yatay.xlsx");
    let normal = dir.path().join("b_standart.xlsx");
    write_horizontal_workbook(&horizontal);
    write_normal_workbook(&normal);
    std::fs::write(dir.path().join("c_bozuk.xlsx"), "broken").unwrap();

    let paths: Vec<PathBuf> = puantaj_rust::scanner::scan_folder(dir.path(), false)
        .unwrap()
        .into_iter()
        .map(|w| w.path)
        .collect();
    let detections = batch::detect_files(
        &paths,
        None,
        &TemplateCatalog::builtin(),
        &DetectionOptions::default(),
        false,
    );

    assert_eq!(detections.len(), 3);
    assert!(detections[0].result.is_horizontal_layout);
    assert!(detections[1].result.is_match());
    assert!(!detections[2].result.is_match());
    assert!(batch::summary_line(&detections[2]).starts_with("✘ c_bozuk.xlsx"));
}

#[test]
fn test_missing_sheet_name() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("standart.xlsx");
    write_normal_workbook(&path);

    let result = batch::detect_file(
        &path,
        Some("Şubat"),
        &TemplateCatalog::builtin(),
        &DetectionOptions::default(),
    );
    assert!(!result.is_match());
    assert!(result.reason.contains("could not be read"));
}
