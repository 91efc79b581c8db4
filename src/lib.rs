//! puantaj CLI のライブラリ部分
//!
//! 判定ロジックは `puantaj-common` に置き、ここではファイル入出力・設定・対話編集を扱う。

pub mod batch;
pub mod cli;
pub mod config;
pub mod editor;
pub mod error;
pub mod logging;
pub mod scanner;
pub mod store;
pub mod workbook;
