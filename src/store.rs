//! ルールブック（シフトグループ一覧）のファイル保存

use crate::error::Result;
use puantaj_common::RuleBook;
use std::path::Path;

/// ルールブックを読み込む（ファイルがなければ空）
pub fn load_rule_book(path: &Path) -> Result<RuleBook> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "rule book not found, starting empty");
        return Ok(RuleBook::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(RuleBook::from_json(&content)?)
}

/// ルールブックを保存する
pub fn save_rule_book(book: &RuleBook, path: &Path) -> Result<()> {
    book.validate()?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, book.to_json()?)?;
    tracing::info!(path = %path.display(), groups = book.groups().len(), "rule book saved");
    Ok(())
}
