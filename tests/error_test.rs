//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use puantaj_rust::error::PuantajError;
use puantaj_rust::{scanner, store, workbook};
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"), false);
    assert!(result.is_err());

    let err = result.unwrap_err();
    assert!(matches!(err, PuantajError::FolderNotFound(_)));
}

/// ワークブックのないフォルダをスキャンした場合
#[test]
fn test_scan_folder_no_workbooks() {
    let dir = tempdir().expect("Failed to create temp dir");

    std::fs::write(dir.path().join("notlar.txt"), "merhaba").unwrap();
    std::fs::write(dir.path().join("rules.json"), "{}").unwrap();

    // 空でもエラーではなく空のVecを返す
    let result = scanner::scan_folder(dir.path(), true);
    assert!(result.is_ok());
    assert!(result.unwrap().is_empty());
}

/// 壊れたワークブックはWorkbookエラー
#[test]
fn test_corrupt_workbook() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bozuk.xlsx");
    std::fs::write(&path, "this is not a zip archive").unwrap();

    let err = workbook::load_sheet(&path, None).unwrap_err();
    assert!(matches!(err, PuantajError::Workbook(_)));
}

/// 不正なルールブックJSON
#[test]
fn test_invalid_rule_book_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rules.json");
    std::fs::write(&path, "{ invalid }").unwrap();

    let err = store::load_rule_book(&path).unwrap_err();
    assert!(matches!(err, PuantajError::Common(puantaj_common::Error::Json(_))));
}

/// 制約違反のルールブック（標準時間 >= シフト時間）は読み込み時に拒否
#[test]
fn test_rule_book_constraint_violation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rules.json");
    let json = r#"{
        "shiftGroups": [{
            "groupName": "Gündüz",
            "shiftPatterns": { "kind": "allShifts" },
            "standardHours": 9.0,
            "shiftSpanHours": 8.0,
            "tierFlags": { "assignNormalTier": true, "assignPremiumTier": false }
        }]
    }"#;
    std::fs::write(&path, json).unwrap();

    let err = store::load_rule_book(&path).unwrap_err();
    assert!(matches!(
        err,
        PuantajError::Common(puantaj_common::Error::ConstraintViolation(_))
    ));
}

/// PuantajErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        PuantajError::Config("テスト設定エラー".to_string()),
        PuantajError::FileNotFound("ocak.xlsx".to_string()),
        PuantajError::FolderNotFound("/path/to/folder".to_string()),
        PuantajError::Workbook("シートがありません".to_string()),
        PuantajError::NoWorkbooksFound("フォルダ".to_string()),
        PuantajError::CliExecution("入力エラー".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: PuantajError = io_err.into();

    assert!(matches!(err, PuantajError::Io(_)));
    assert!(format!("{}", err).contains("IO"));
}

/// common::Errorからの変換（透過的エラー）
#[test]
fn test_common_error_transparent() {
    let common_err = puantaj_common::ShiftPatternEntry::parse("17:00", "08:00", "").unwrap_err();
    let expected = common_err.to_string();
    let err: PuantajError = common_err.into();

    assert!(matches!(err, PuantajError::Common(_)));
    assert_eq!(format!("{}", err), expected);
}
