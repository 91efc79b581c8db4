//! エラー型定義

use thiserror::Error;

/// 共通エラー型
///
/// 入力の検証エラーのみを表す。テンプレート検出の失敗はエラーではなく
/// `DetectionResult` として返す。
#[derive(Error, Debug)]
pub enum Error {
    /// 時刻・休憩・パターン文字列がどの形式でも解釈できない
    #[error("Format invalid: {0}")]
    FormatInvalid(String),

    /// 開始≧終了、標準時間≧シフト時間、重複パターンなどの制約違反
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Error::FormatInvalid(msg.into())
    }

    pub(crate) fn constraint(msg: impl Into<String>) -> Self {
        Error::ConstraintViolation(msg.into())
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
