use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "puantaj")]
#[command(about = "勤怠シフトパターン認識・残業ルール導出ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 出力形式 (text/json)
    #[arg(long, default_value = "text", global = true)]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 勤怠表のテンプレートを検出（ファイルまたはフォルダ）
    Detect {
        /// ワークブックまたはフォルダのパス
        #[arg(required = true)]
        path: PathBuf,

        /// テンプレートカタログJSON（省略時は設定ファイル→組み込み）
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// シート名（省略時は先頭シート）
        #[arg(short, long)]
        sheet: Option<String>,

        /// サブフォルダも再帰的にスキャン
        #[arg(short = 'r', long)]
        recursive: bool,
    },

    /// シフトパターン文字列を正規化
    Normalize {
        /// パターン文字列（例: "08:00-17:00 (01:00)", "8/16"）
        #[arg(required = true)]
        patterns: Vec<String>,
    },

    /// 開始・終了時刻から別表記を生成
    Alternatives {
        /// 開始時刻
        start: String,

        /// 終了時刻
        end: String,
    },

    /// 残業区分を導出
    Overtime {
        /// 標準時間（時間）
        #[arg(long)]
        standard: f64,

        /// シフト時間（時間）
        #[arg(long)]
        span: f64,

        /// 通常残業区分を割り当てる
        #[arg(long)]
        normal: bool,

        /// 割増残業区分を割り当てる
        #[arg(long)]
        premium: bool,

        /// 実働時間（指定すると標準時間超過分を各区分に振り分けて表示）
        #[arg(long)]
        allocate: Option<f64>,
    },

    /// シフトグループを対話的に作成・編集
    Group {
        /// ルールブックJSON（省略時は設定ファイルの値）
        rules: Option<PathBuf>,
    },

    /// 元データの文字列に該当するシフトグループを表示
    Match {
        /// 照合する文字列
        #[arg(required = true)]
        text: String,

        /// ルールブックJSON（省略時は設定ファイルの値）
        #[arg(long)]
        rules: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// 既定のテンプレートカタログを設定
        #[arg(long)]
        set_catalog: Option<PathBuf>,

        /// 既定のルールブックを設定
        #[arg(long)]
        set_rules: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("TEXT".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_parse_overtime_command() {
        let cli = Cli::try_parse_from([
            "puantaj", "overtime", "--standard", "7.5", "--span", "9", "--normal", "--premium",
        ])
        .unwrap();
        match cli.command {
            Commands::Overtime { standard, span, normal, premium, allocate } => {
                assert_eq!(standard, 7.5);
                assert_eq!(span, 9.0);
                assert!(normal && premium);
                assert_eq!(allocate, None);
            }
            _ => panic!("expected overtime command"),
        }
    }

    #[test]
    fn test_parse_detect_command() {
        let cli = Cli::try_parse_from(["puantaj", "--format", "json", "detect", "ocak.xlsx", "-r"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Detect { recursive: true, .. }));
    }
}
