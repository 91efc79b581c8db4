//! シフトグループとルールブック
//!
//! シフトグループはパターン一覧（または「全シフト」）、別表記、標準時間・シフト時間、
//! 残業区分をまとめたもの。会社ごとの設定ドキュメントの一部として保存される。
//!
//! 変更はすべて「検証してから丸ごと差し替え」で行い、途中で失敗しても状態は変わらない。

use crate::alternatives::generate_alternatives;
use crate::error::{Error, Result};
use crate::overtime::{derive_overtime_tiers, OvertimeTiers, TierFlags, TierLabels};
use crate::shift_pattern::{normalize_pattern, PatternKey, ShiftPatternEntry};
use crate::text::fold_case;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// グループが対象とするシフト
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entries", rename_all = "camelCase")]
pub enum ShiftSelection {
    /// 全シフト（個別パターンとは併用不可）
    AllShifts,
    Explicit(Vec<ShiftPatternEntry>),
}

impl Default for ShiftSelection {
    fn default() -> Self {
        ShiftSelection::Explicit(Vec::new())
    }
}

/// シフトグループ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRuleGroup {
    pub group_name: String,
    #[serde(default)]
    shift_patterns: ShiftSelection,
    /// 外部データ照合用の別表記（同一性の判定には使わない）
    #[serde(default)]
    pattern_alternatives: Vec<String>,
    standard_hours: f64,
    shift_span_hours: f64,
    #[serde(default)]
    tier_flags: TierFlags,
    #[serde(default)]
    overtime_tiers: OvertimeTiers,
}

impl ShiftRuleGroup {
    /// 時間と区分を指定して作成
    pub fn new(
        group_name: impl Into<String>,
        standard_hours: f64,
        shift_span_hours: f64,
        flags: TierFlags,
        labels: &TierLabels,
    ) -> Result<Self> {
        let group_name = group_name.into();
        if group_name.trim().is_empty() {
            return Err(Error::constraint("group name must not be empty"));
        }
        let overtime_tiers = derive_overtime_tiers(standard_hours, shift_span_hours, flags, labels)?;

        Ok(Self {
            group_name: group_name.trim().to_string(),
            shift_patterns: ShiftSelection::default(),
            pattern_alternatives: Vec::new(),
            standard_hours,
            shift_span_hours,
            tier_flags: flags,
            overtime_tiers,
        })
    }

    /// パターンの実働時間・シフト時間から作成
    pub fn from_pattern(
        group_name: impl Into<String>,
        entry: ShiftPatternEntry,
        flags: TierFlags,
        labels: &TierLabels,
    ) -> Result<Self> {
        let mut group = Self::new(group_name, entry.net_hours(), entry.span_hours(), flags, labels)?;
        group.add_pattern(entry)?;
        Ok(group)
    }

    pub fn shift_patterns(&self) -> &ShiftSelection {
        &self.shift_patterns
    }

    pub fn pattern_alternatives(&self) -> &[String] {
        &self.pattern_alternatives
    }

    pub fn standard_hours(&self) -> f64 {
        self.standard_hours
    }

    pub fn shift_span_hours(&self) -> f64 {
        self.shift_span_hours
    }

    pub fn tier_flags(&self) -> TierFlags {
        self.tier_flags
    }

    pub fn overtime_tiers(&self) -> &OvertimeTiers {
        &self.overtime_tiers
    }

    pub fn is_all_shifts(&self) -> bool {
        matches!(self.shift_patterns, ShiftSelection::AllShifts)
    }

    /// 個別パターン一覧（全シフトなら空）
    pub fn entries(&self) -> &[ShiftPatternEntry] {
        match &self.shift_patterns {
            ShiftSelection::AllShifts => &[],
            ShiftSelection::Explicit(entries) => entries,
        }
    }

    pub fn pattern_keys(&self) -> Vec<PatternKey> {
        self.entries().iter().map(ShiftPatternEntry::key).collect()
    }

    /// パターンを追加
    ///
    /// # Errors
    /// * 全シフト指定中
    /// * 同じ正規化キーのパターンが登録済み
    pub fn add_pattern(&mut self, entry: ShiftPatternEntry) -> Result<()> {
        let entries = match &mut self.shift_patterns {
            ShiftSelection::AllShifts => {
                return Err(Error::constraint(format!(
                    "group '{}' applies to all shifts; explicit patterns cannot be added",
                    self.group_name
                )))
            }
            ShiftSelection::Explicit(entries) => entries,
        };

        if entries.iter().any(|e| e.key() == entry.key()) {
            return Err(Error::constraint(format!(
                "pattern {} is already registered in group '{}'",
                entry.canonical_code(),
                self.group_name
            )));
        }

        entries.push(entry);
        Ok(())
    }

    /// 正規化キーでパターンを削除（削除したら true）
    pub fn remove_pattern(&mut self, raw: &str) -> bool {
        let key = normalize_pattern(raw);
        match &mut self.shift_patterns {
            ShiftSelection::AllShifts => false,
            ShiftSelection::Explicit(entries) => {
                let before = entries.len();
                entries.retain(|e| e.key() != key);
                entries.len() != before
            }
        }
    }

    /// 全シフト指定に切り替える（個別パターンは破棄）
    pub fn set_all_shifts(&mut self) {
        self.shift_patterns = ShiftSelection::AllShifts;
    }

    /// 個別パターン一覧を丸ごと差し替える
    pub fn replace_patterns(&mut self, entries: Vec<ShiftPatternEntry>) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.key()) {
                return Err(Error::constraint(format!(
                    "pattern {} appears more than once",
                    entry.canonical_code()
                )));
            }
        }
        self.shift_patterns = ShiftSelection::Explicit(entries);
        Ok(())
    }

    /// 別表記を登録（大文字小文字を無視して重複除去）
    pub fn add_alternatives<I, S>(&mut self, alternatives: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen: HashSet<String> = self.pattern_alternatives.iter().map(|a| fold_case(a)).collect();
        for alternative in alternatives {
            let alternative = alternative.into();
            let trimmed = alternative.trim();
            if !trimmed.is_empty() && seen.insert(fold_case(trimmed)) {
                self.pattern_alternatives.push(trimmed.to_string());
            }
        }
    }

    /// 登録済みの全パターンについて別表記を生成して登録
    pub fn register_alternatives(&mut self) {
        let generated: Vec<String> = self
            .entries()
            .iter()
            .flat_map(|e| generate_alternatives(e.start_time(), e.end_time()))
            .collect();
        self.add_alternatives(generated);
    }

    pub fn clear_alternatives(&mut self) {
        self.pattern_alternatives.clear();
    }

    /// 時間・区分フラグを変更して残業区分を再生成する
    pub fn apply_hours(
        &mut self,
        standard_hours: f64,
        shift_span_hours: f64,
        flags: TierFlags,
        labels: &TierLabels,
    ) -> Result<()> {
        let tiers = derive_overtime_tiers(standard_hours, shift_span_hours, flags, labels)?;
        self.standard_hours = standard_hours;
        self.shift_span_hours = shift_span_hours;
        self.tier_flags = flags;
        self.overtime_tiers = tiers;
        Ok(())
    }

    /// パターンの時間を標準時間（実働）・シフト時間として採用する
    pub fn adopt_pattern_hours(&mut self, entry: &ShiftPatternEntry, labels: &TierLabels) -> Result<()> {
        self.apply_hours(entry.net_hours(), entry.span_hours(), self.tier_flags, labels)
    }

    /// グループ全体の検証
    pub fn validate(&self) -> Result<()> {
        if self.group_name.trim().is_empty() {
            return Err(Error::constraint("group name must not be empty"));
        }
        crate::overtime::validate_hours(self.standard_hours, self.shift_span_hours)?;
        if !self.tier_flags.assign_normal_tier && !self.tier_flags.assign_premium_tier {
            return Err(Error::constraint(format!(
                "group '{}' has no overtime tier selected",
                self.group_name
            )));
        }

        // 区分一覧は時間とフラグから導出したものと同じ構成でなければならない
        let expected = derive_overtime_tiers(
            self.standard_hours,
            self.shift_span_hours,
            self.tier_flags,
            &TierLabels::default(),
        )?;
        if !self.overtime_tiers.same_shape(&expected) {
            return Err(Error::constraint(format!(
                "overtime tiers of group '{}' do not match its hours and tier flags",
                self.group_name
            )));
        }

        let mut seen = HashSet::new();
        for entry in self.entries() {
            if !seen.insert(entry.key()) {
                return Err(Error::constraint(format!(
                    "pattern {} appears more than once in group '{}'",
                    entry.canonical_code(),
                    self.group_name
                )));
            }
        }
        Ok(())
    }

    /// 元データの文字列がこのグループのパターンに該当するか
    ///
    /// 正規化キーが一致するか、別表記と（大文字小文字・前後空白を無視して）一致すれば該当。
    /// 全シフト指定はここでは該当としない（[`RuleBook::find_group_for_text`] で最後に扱う）。
    pub fn matches_text(&self, text: &str) -> bool {
        let key = normalize_pattern(text);
        if key.is_canonical() && self.entries().iter().any(|e| e.key() == key) {
            return true;
        }
        self.matches_alternative(text)
    }

    fn matches_alternative(&self, text: &str) -> bool {
        let folded = fold_case(text.trim());
        !folded.is_empty() && self.pattern_alternatives.iter().any(|a| fold_case(a) == folded)
    }
}

/// 会社ごとのシフトグループ一覧
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleBook {
    #[serde(default)]
    shift_groups: Vec<ShiftRuleGroup>,
}

impl RuleBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// JSON文字列から読み込み（全体を検証する）
    pub fn from_json(json: &str) -> Result<Self> {
        let book: Self = serde_json::from_str(json)?;
        book.validate()?;
        Ok(book)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn groups(&self) -> &[ShiftRuleGroup] {
        &self.shift_groups
    }

    pub fn group(&self, name: &str) -> Option<&ShiftRuleGroup> {
        let name = fold_case(name.trim());
        self.shift_groups.iter().find(|g| fold_case(&g.group_name) == name)
    }

    /// グループを追加
    ///
    /// # Errors
    /// * 同名（大文字小文字無視）のグループがある
    /// * 他グループと同じパターンを含む
    /// * グループ自体が不正
    pub fn add_group(&mut self, group: ShiftRuleGroup) -> Result<()> {
        group.validate()?;
        if self.group(&group.group_name).is_some() {
            return Err(Error::constraint(format!(
                "group '{}' already exists",
                group.group_name
            )));
        }
        self.ensure_patterns_unused(&group, None)?;
        self.shift_groups.push(group);
        Ok(())
    }

    /// 同名グループを差し替える
    pub fn replace_group(&mut self, group: ShiftRuleGroup) -> Result<()> {
        group.validate()?;
        let index = self
            .index_of(&group.group_name)
            .ok_or_else(|| Error::constraint(format!("group '{}' does not exist", group.group_name)))?;
        self.ensure_patterns_unused(&group, Some(index))?;
        self.shift_groups[index] = group;
        Ok(())
    }

    /// グループ名を変更
    pub fn rename_group(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(Error::constraint("group name must not be empty"));
        }
        let index = self
            .index_of(old_name)
            .ok_or_else(|| Error::constraint(format!("group '{}' does not exist", old_name)))?;
        if let Some(other) = self.index_of(new_name) {
            if other != index {
                return Err(Error::constraint(format!("group '{}' already exists", new_name)));
            }
        }
        self.shift_groups[index].group_name = new_name.to_string();
        Ok(())
    }

    pub fn remove_group(&mut self, name: &str) -> Option<ShiftRuleGroup> {
        self.index_of(name).map(|index| self.shift_groups.remove(index))
    }

    /// 元データの文字列に該当するグループを探す
    ///
    /// 1. 正規化キーが一致するグループ
    /// 2. 別表記が一致するグループ
    /// 3. 全シフト指定の最初のグループ
    pub fn find_group_for_text(&self, text: &str) -> Option<&ShiftRuleGroup> {
        let key = normalize_pattern(text);
        if key.is_canonical() {
            if let Some(group) = self
                .shift_groups
                .iter()
                .find(|g| g.entries().iter().any(|e| e.key() == key))
            {
                return Some(group);
            }
        }

        self.shift_groups
            .iter()
            .find(|g| g.matches_alternative(text))
            .or_else(|| self.shift_groups.iter().find(|g| g.is_all_shifts()))
    }

    /// 全体の検証
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        let mut keys = HashSet::new();
        for group in &self.shift_groups {
            group.validate()?;
            if !names.insert(fold_case(&group.group_name)) {
                return Err(Error::constraint(format!(
                    "group '{}' is defined more than once",
                    group.group_name
                )));
            }
            for entry in group.entries() {
                if !keys.insert(entry.key()) {
                    return Err(Error::constraint(format!(
                        "pattern {} is assigned to more than one group",
                        entry.canonical_code()
                    )));
                }
            }
        }
        Ok(())
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        let name = fold_case(name.trim());
        self.shift_groups.iter().position(|g| fold_case(&g.group_name) == name)
    }

    fn ensure_patterns_unused(&self, group: &ShiftRuleGroup, skip: Option<usize>) -> Result<()> {
        for (index, other) in self.shift_groups.iter().enumerate() {
            if Some(index) == skip {
                continue;
            }
            if let Some(entry) = group
                .entries()
                .iter()
                .find(|e| other.entries().iter().any(|o| o.key() == e.key()))
            {
                return Err(Error::constraint(format!(
                    "pattern {} already belongs to group '{}'",
                    entry.canonical_code(),
                    other.group_name
                )));
            }
        }
        Ok(())
    }
}
