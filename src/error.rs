use thiserror::Error;

#[derive(Error, Debug)]
pub enum PuantajError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("ワークブック読み込みエラー: {0}")]
    Workbook(String),

    #[error("ワークブックが見つかりません: {0}")]
    NoWorkbooksFound(String),

    #[error("CLI実行エラー: {0}")]
    CliExecution(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] puantaj_common::Error),
}

impl From<calamine::Error> for PuantajError {
    fn from(err: calamine::Error) -> Self {
        PuantajError::Workbook(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PuantajError>;
