//! Puantaj Common Library
//!
//! 勤怠パターン認識・残業ルール導出エンジン。
//! ファイル入出力やUIは持たず、文字列・グリッド・テンプレートを受け取って
//! 正規化キー・検出結果・ルールを返す純粋な処理だけを置く。

pub mod error;
pub mod text;
pub mod time_segment;
pub mod shift_pattern;
pub mod alternatives;
pub mod overtime;
pub mod grid;
pub mod layout;
pub mod template;
pub mod detection;
pub mod rule_group;

pub use error::{Error, Result};
pub use time_segment::{parse_break_duration, parse_time_of_day, time_key};
pub use shift_pattern::{normalize_pattern, PatternKey, ShiftPatternEntry};
pub use alternatives::generate_alternatives;
pub use overtime::{
    derive_overtime_tiers, AllocatedHours, OvertimeTier, OvertimeTierRecord, OvertimeTiers, TierAllocation,
    TierFlags, TierLabels, TierTarget,
};
pub use grid::{CellGrid, CellMatrix};
pub use layout::{detect_layout, LayoutInfo};
pub use template::{LayoutType, TemplateCatalog, TemplateDefinition};
pub use detection::{detect_template, DetectionOptions, DetectionResult};
pub use rule_group::{RuleBook, ShiftRuleGroup, ShiftSelection};
