//! 対話式シフトグループ編集
//!
//! 入力はすべて共通ライブラリの検証を通してから反映する。
//! 失敗した操作はメッセージを出して続行し、ルールブックは変更しない。

use crate::error::{PuantajError, Result};
use crate::store::{load_rule_book, save_rule_book};
use dialoguer::{Confirm, Input};
use puantaj_common::text::fold_case;
use puantaj_common::{
    generate_alternatives, normalize_pattern, RuleBook, ShiftPatternEntry, ShiftRuleGroup, TierFlags,
    TierLabels,
};
use std::collections::HashSet;
use std::path::Path;

/// 編集メニューの操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    /// パターンからグループを作成
    NewGroup,
    /// 全シフト対象のグループを作成
    NewAllShiftsGroup,
    /// 既存グループにパターンを追加
    AddPattern,
    /// パターンを削除
    RemovePattern,
    /// グループ名を変更
    Rename,
    /// グループを削除
    Delete,
    /// 一覧表示
    List,
    /// 保存して終了
    Quit,
    /// 保存せずに終了
    Abort,
}

/// メニュー入力を操作に変換
pub fn parse_editor_action(input: &str) -> Option<EditorAction> {
    match input.trim() {
        "n" => Some(EditorAction::NewGroup),
        "N" => Some(EditorAction::NewAllShiftsGroup),
        "a" => Some(EditorAction::AddPattern),
        "x" => Some(EditorAction::RemovePattern),
        "r" => Some(EditorAction::Rename),
        "d" => Some(EditorAction::Delete),
        "" | "l" => Some(EditorAction::List),
        "q" => Some(EditorAction::Quit),
        "Q" => Some(EditorAction::Abort),
        _ => None,
    }
}

/// グループの表示用テキスト
pub fn describe_group(group: &ShiftRuleGroup) -> Vec<String> {
    let mut lines = vec![format!(
        "■ {} (標準 {:.2}h / シフト {:.2}h)",
        group.group_name,
        group.standard_hours(),
        group.shift_span_hours()
    )];

    if group.is_all_shifts() {
        lines.push("  パターン: 全シフト".to_string());
    } else if group.entries().is_empty() {
        lines.push("  パターン: (なし)".to_string());
    } else {
        for entry in group.entries() {
            lines.push(format!("  パターン: {} [{}]", entry.display_code(), entry.canonical_code()));
        }
    }

    for tier in group.overtime_tiers().to_vec() {
        let limit = match tier.duration_hours() {
            Some(hours) => format!("{:.2}h", hours),
            None => "残り全部".to_string(),
        };
        lines.push(format!("  残業: {} x{} ({})", tier.label(), tier.rate(), limit));
    }

    if !group.pattern_alternatives().is_empty() {
        lines.push(format!("  別表記: {}件", group.pattern_alternatives().len()));
    }
    lines
}

/// 1パターンからグループを作り、別表記も登録する
pub fn build_pattern_group(
    name: &str,
    entry: ShiftPatternEntry,
    flags: TierFlags,
    labels: &TierLabels,
) -> Result<ShiftRuleGroup> {
    let mut group = ShiftRuleGroup::from_pattern(name, entry, flags, labels)?;
    group.register_alternatives();
    Ok(group)
}

/// 全シフト対象のグループを作る
pub fn build_all_shifts_group(
    name: &str,
    standard_hours: f64,
    shift_span_hours: f64,
    flags: TierFlags,
    labels: &TierLabels,
) -> Result<ShiftRuleGroup> {
    let mut group = ShiftRuleGroup::new(name, standard_hours, shift_span_hours, flags, labels)?;
    group.set_all_shifts();
    Ok(group)
}

/// 既存グループにパターンを追加（ルールブック全体の整合性も確認）
pub fn add_pattern_to_group(book: &mut RuleBook, group_name: &str, entry: ShiftPatternEntry) -> Result<()> {
    let mut group = book
        .group(group_name)
        .cloned()
        .ok_or_else(|| PuantajError::CliExecution(format!("グループがありません: {}", group_name)))?;
    group.add_pattern(entry)?;
    group.register_alternatives();
    book.replace_group(group)?;
    Ok(())
}

/// 既存グループからパターンを削除
///
/// 削除したパターンから生成された別表記も外す。手入力の別表記と、
/// 残りのパターンからも生成される表記は残す。
pub fn remove_pattern_from_group(book: &mut RuleBook, group_name: &str, raw: &str) -> Result<bool> {
    let mut group = book
        .group(group_name)
        .cloned()
        .ok_or_else(|| PuantajError::CliExecution(format!("グループがありません: {}", group_name)))?;

    let key = normalize_pattern(raw);
    let removed: HashSet<String> = group
        .entries()
        .iter()
        .filter(|e| e.key() == key)
        .flat_map(|e| generate_alternatives(e.start_time(), e.end_time()))
        .map(|a| fold_case(&a))
        .collect();
    if !group.remove_pattern(raw) {
        return Ok(false);
    }

    let kept: Vec<String> = group
        .pattern_alternatives()
        .iter()
        .filter(|a| !removed.contains(&fold_case(a)))
        .cloned()
        .collect();
    group.clear_alternatives();
    group.add_alternatives(kept);
    group.register_alternatives();
    book.replace_group(group)?;
    Ok(true)
}

/// 対話式でルールブックを編集
pub fn run_group_editor(rules_path: &Path, labels: &TierLabels) -> Result<()> {
    let mut book = load_rule_book(rules_path)?;

    println!("🗂  シフトグループ: {}件 ({})", book.groups().len(), rules_path.display());
    println!("---");
    println!("操作: [n]新規 [N]全シフト [a]パターン追加 [x]パターン削除 [r]名前変更 [d]削除 [l]一覧 [q]保存して終了 [Q]破棄");
    println!("---\n");
    print_groups(&book);

    loop {
        let input = prompt_text("操作", true)?;
        let Some(action) = parse_editor_action(&input) else {
            println!("  → 不明な操作です: {}\n", input.trim());
            continue;
        };

        let outcome = match action {
            EditorAction::NewGroup => prompt_new_group(labels).and_then(|group| {
                let name = group.group_name.clone();
                book.add_group(group)?;
                println!("  → 追加: {}\n", name);
                Ok(())
            }),
            EditorAction::NewAllShiftsGroup => prompt_all_shifts_group(labels).and_then(|group| {
                let name = group.group_name.clone();
                book.add_group(group)?;
                println!("  → 追加: {} (全シフト)\n", name);
                Ok(())
            }),
            EditorAction::AddPattern => {
                prompt_text("グループ名", false).and_then(|name| {
                    let entry = prompt_entry()?;
                    let code = entry.display_code();
                    add_pattern_to_group(&mut book, &name, entry)?;
                    println!("  → {} に {} を追加\n", name.trim(), code);
                    Ok(())
                })
            }
            EditorAction::RemovePattern => {
                prompt_text("グループ名", false).and_then(|name| {
                    let raw = prompt_text("パターン (例: 08:00-17:00)", false)?;
                    if remove_pattern_from_group(&mut book, &name, &raw)? {
                        println!("  → 削除しました\n");
                    } else {
                        println!("  → 該当するパターンがありません\n");
                    }
                    Ok(())
                })
            }
            EditorAction::Rename => prompt_text("現在の名前", false).and_then(|old| {
                let new = prompt_text("新しい名前", false)?;
                book.rename_group(&old, &new)?;
                println!("  → {} → {}\n", old.trim(), new.trim());
                Ok(())
            }),
            EditorAction::Delete => prompt_text("グループ名", false).and_then(|name| {
                match book.remove_group(&name) {
                    Some(removed) => println!("  → 削除: {}\n", removed.group_name),
                    None => println!("  → グループがありません: {}\n", name.trim()),
                }
                Ok(())
            }),
            EditorAction::List => {
                print_groups(&book);
                Ok(())
            }
            EditorAction::Quit => {
                save_rule_book(&book, rules_path)?;
                println!("\n✓ 保存しました: {}", rules_path.display());
                return Ok(());
            }
            EditorAction::Abort => {
                println!("変更を破棄して終了します");
                return Ok(());
            }
        };

        if let Err(e) = outcome {
            tracing::debug!(error = %e, "editor action rejected");
            println!("  ✘ {}\n", e);
        }
    }
}

fn print_groups(book: &RuleBook) {
    if book.groups().is_empty() {
        println!("(グループなし)\n");
        return;
    }
    for group in book.groups() {
        for line in describe_group(group) {
            println!("{}", line);
        }
    }
    println!();
}

fn prompt_new_group(labels: &TierLabels) -> Result<ShiftRuleGroup> {
    let name = prompt_text("グループ名", false)?;
    let entry = prompt_entry()?;
    let flags = prompt_flags()?;
    build_pattern_group(&name, entry, flags, labels)
}

fn prompt_all_shifts_group(labels: &TierLabels) -> Result<ShiftRuleGroup> {
    let name = prompt_text("グループ名", false)?;
    let standard = prompt_hours("標準時間（時間）")?;
    let span = prompt_hours("シフト時間（時間）")?;
    let flags = prompt_flags()?;
    build_all_shifts_group(&name, standard, span, flags, labels)
}

fn prompt_entry() -> Result<ShiftPatternEntry> {
    let start = prompt_text("開始時刻", false)?;
    let end = prompt_text("終了時刻", false)?;
    let break_token = prompt_text("休憩 (空欄で0)", true)?;
    Ok(ShiftPatternEntry::parse(&start, &end, &break_token)?)
}

fn prompt_flags() -> Result<TierFlags> {
    Ok(TierFlags {
        assign_normal_tier: prompt_confirm("通常残業区分を割り当てますか?", true)?,
        assign_premium_tier: prompt_confirm("割増残業区分を割り当てますか?", true)?,
    })
}

fn prompt_hours(prompt: &str) -> Result<f64> {
    let input = prompt_text(prompt, false)?;
    input
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| PuantajError::CliExecution(format!("時間として解釈できません: {}", input.trim())))
}

fn prompt_text(prompt: &str, allow_empty: bool) -> Result<String> {
    Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(allow_empty)
        .interact_text()
        .map_err(|e| PuantajError::CliExecution(e.to_string()))
}

fn prompt_confirm(prompt: &str, default: bool) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|e| PuantajError::CliExecution(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn both() -> TierFlags {
        TierFlags {
            assign_normal_tier: true,
            assign_premium_tier: true,
        }
    }

    #[test]
    fn test_parse_editor_action() {
        assert_eq!(parse_editor_action("n"), Some(EditorAction::NewGroup));
        assert_eq!(parse_editor_action("N"), Some(EditorAction::NewAllShiftsGroup));
        assert_eq!(parse_editor_action(" q "), Some(EditorAction::Quit));
        assert_eq!(parse_editor_action(""), Some(EditorAction::List));
        assert_eq!(parse_editor_action("z"), None);
    }

    #[test]
    fn test_build_pattern_group_registers_alternatives() {
        let entry = ShiftPatternEntry::parse("0800", "1700", "1:00").unwrap();
        let group = build_pattern_group("Gündüz", entry, both(), &TierLabels::default()).unwrap();

        assert_eq!(group.standard_hours(), 8.0);
        assert_eq!(group.shift_span_hours(), 9.0);
        assert!(group.pattern_alternatives().iter().any(|a| a == "8-17"));
        assert!(group.matches_text("08.00 / 17.00"));
    }

    #[test]
    fn test_add_and_remove_pattern() {
        let labels = TierLabels::default();
        let mut book = RuleBook::new();
        let entry = ShiftPatternEntry::parse("08:00", "17:00", "01:00").unwrap();
        book.add_group(build_pattern_group("Gündüz", entry, both(), &labels).unwrap()).unwrap();

        let second = ShiftPatternEntry::parse("09:00", "18:00", "01:00").unwrap();
        add_pattern_to_group(&mut book, "gündüz", second).unwrap();
        assert_eq!(book.groups()[0].entries().len(), 2);
        assert!(book.find_group_for_text("9-18").is_some());

        assert!(remove_pattern_from_group(&mut book, "Gündüz", "09:00-18:00").unwrap());
        assert_eq!(book.groups()[0].entries().len(), 1);
        assert!(book.find_group_for_text("9-18").is_none());
        assert!(!remove_pattern_from_group(&mut book, "Gündüz", "10:00-19:00").unwrap());
    }

    #[test]
    fn test_remove_pattern_keeps_manual_alternatives() {
        let labels = TierLabels::default();
        let mut book = RuleBook::new();
        let entry = ShiftPatternEntry::parse("16:00", "23:30", "0:30").unwrap();
        let mut group = build_pattern_group("Akşam", entry, both(), &labels).unwrap();
        group.add_alternatives(["Akşam vardiyası"]);
        book.add_group(group).unwrap();

        let second = ShiftPatternEntry::parse("15:00", "23:00", "0:30").unwrap();
        add_pattern_to_group(&mut book, "Akşam", second).unwrap();
        assert!(remove_pattern_from_group(&mut book, "Akşam", "16:00-23:30").unwrap());

        let group = book.group("Akşam").unwrap();
        assert!(group.pattern_alternatives().iter().any(|a| a == "Akşam vardiyası"));
        assert!(!group.pattern_alternatives().iter().any(|a| a == "16:00-23:30"));
        assert!(group.pattern_alternatives().iter().any(|a| a == "15-23"));
        assert_eq!(book.find_group_for_text("AKŞAM VARDİYASI").unwrap().group_name, "Akşam");
    }

    #[test]
    fn test_add_pattern_to_missing_group() {
        let mut book = RuleBook::new();
        let entry = ShiftPatternEntry::parse("08:00", "17:00", "").unwrap();
        let err = add_pattern_to_group(&mut book, "Gece", entry).unwrap_err();
        assert!(matches!(err, PuantajError::CliExecution(_)));
    }

    #[test]
    fn test_describe_all_shifts_group() {
        let group = build_all_shifts_group("Genel", 7.5, 9.0, both(), &TierLabels::default()).unwrap();
        let lines = describe_group(&group);
        assert!(lines[0].contains("Genel"));
        assert!(lines.iter().any(|l| l.contains("全シフト")));
        assert!(lines.iter().any(|l| l.contains("残り全部")));
    }
}
