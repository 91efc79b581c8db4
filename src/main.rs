use anyhow::{Context, Result};
use clap::Parser;
use puantaj_common::{
    derive_overtime_tiers, generate_alternatives, normalize_pattern, parse_time_of_day, OvertimeTiers,
    ShiftPatternEntry, TierFlags,
};
use puantaj_rust::{batch, cli, config, editor, error, logging, scanner, store};
use cli::{Cli, Commands, OutputFormat};
use config::Config;
use serde_json::json;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_cli_logger(cli.verbose);
    let config = Config::load().context("設定ファイルを読み込めません")?;
    let format = cli.format;

    match cli.command {
        Commands::Detect { path, catalog, sheet, recursive } => {
            let catalog = config
                .resolve_catalog(catalog.as_deref())
                .context("テンプレートカタログを読み込めません")?;
            let paths = collect_workbooks(&path, recursive)?;

            if format == OutputFormat::Text {
                println!("📋 puantaj - テンプレート検出 ({}件)\n", paths.len());
            }

            let detections = batch::detect_files(
                &paths,
                sheet.as_deref(),
                &catalog,
                &config.detection,
                format == OutputFormat::Text && paths.len() > 1,
            );

            match format {
                OutputFormat::Text => {
                    for detection in &detections {
                        println!("{}", batch::summary_line(detection));
                        if cli.verbose {
                            println!("    {}", detection.result.reason);
                        }
                    }
                    let matched = detections.iter().filter(|d| d.result.is_match()).count();
                    println!("\n✅ {}/{}件 一致", matched, detections.len());
                }
                OutputFormat::Json => {
                    let items: Vec<_> = detections
                        .iter()
                        .map(|d| json!({ "path": d.path, "result": d.result }))
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&items)?);
                }
            }
        }

        Commands::Normalize { patterns } => match format {
            OutputFormat::Text => {
                for raw in &patterns {
                    let key = normalize_pattern(raw);
                    match ShiftPatternEntry::from_pattern_text(raw) {
                        Ok(entry) => println!(
                            "{} → {}  {} / 実働 {:.2}h",
                            raw,
                            key,
                            entry.display_code(),
                            entry.net_hours()
                        ),
                        Err(_) => println!("{} → {}", raw, key),
                    }
                }
            }
            OutputFormat::Json => {
                let items: Vec<_> = patterns.iter().map(|raw| describe_pattern(raw)).collect();
                println!("{}", serde_json::to_string_pretty(&items)?);
            }
        },

        Commands::Alternatives { start, end } => {
            let start = parse_time_of_day(&start).context("開始時刻を解釈できません")?;
            let end = parse_time_of_day(&end).context("終了時刻を解釈できません")?;
            let alternatives = generate_alternatives(start, end);
            match format {
                OutputFormat::Text => {
                    for alternative in &alternatives {
                        println!("{}", alternative);
                    }
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&alternatives)?),
            }
        }

        Commands::Overtime { standard, span, normal, premium, allocate } => {
            let flags = TierFlags {
                assign_normal_tier: normal,
                assign_premium_tier: premium,
            };
            let tiers = derive_overtime_tiers(standard, span, flags, &config.tier_labels)?;
            let allocation = allocate.map(|worked| tiers.allocate(worked - standard));

            match format {
                OutputFormat::Text => {
                    print_tiers(&tiers);
                    if let (Some(worked), Some(allocation)) = (allocate, &allocation) {
                        println!("\n実働 {:.2}h の振り分け:", worked);
                        for item in &allocation.allocations {
                            println!("  {} ({}): {:.2}h", item.label, item.target_column_ref, item.hours);
                        }
                        if allocation.uncovered_hours > 0.0 {
                            println!("  未割当: {:.2}h", allocation.uncovered_hours);
                        }
                    }
                }
                OutputFormat::Json => {
                    let output = json!({ "tiers": tiers, "allocation": allocation });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
            }
        }

        Commands::Group { rules } => {
            let rules_path = config.resolve_rules_path(rules.as_deref());
            println!("🗂  puantaj - シフトグループ編集\n");
            editor::run_group_editor(&rules_path, &config.tier_labels)?;
        }

        Commands::Match { text, rules } => {
            let rules_path = config.resolve_rules_path(rules.as_deref());
            let book = store::load_rule_book(&rules_path)
                .with_context(|| format!("ルールブックを読み込めません: {}", rules_path.display()))?;
            let group = book.find_group_for_text(&text);

            match format {
                OutputFormat::Text => match group {
                    Some(group) => {
                        for line in editor::describe_group(group) {
                            println!("{}", line);
                        }
                    }
                    None => println!("該当するグループがありません: {}", text),
                },
                OutputFormat::Json => {
                    let output = json!({
                        "text": text,
                        "key": normalize_pattern(&text).to_string(),
                        "group": group,
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
            }
        }

        Commands::Config { set_catalog, set_rules, show } => {
            let mut config = config;
            let changed = set_catalog.is_some() || set_rules.is_some();

            if let Some(path) = set_catalog {
                config.catalog_path = Some(path);
                println!("✔ テンプレートカタログを設定しました");
            }
            if let Some(path) = set_rules {
                config.rules_path = Some(path);
                println!("✔ ルールブックを設定しました");
            }
            if changed {
                config.save()?;
            }

            if show || !changed {
                println!("設定:");
                println!("  カタログ: {}", display_optional(config.catalog_path.as_deref(), "組み込み"));
                println!("  ルールブック: {}", config.resolve_rules_path(None).display());
                println!("  走査行数: {}", config.detection.max_scan_rows);
                println!("  最低連続日数: {}", config.detection.min_run_length);
                println!("  最低信頼度: {}", config.detection.min_confidence);
                println!(
                    "  残業区分: {} / {}",
                    config.tier_labels.normal.label, config.tier_labels.premium.label
                );
            }
        }
    }

    Ok(())
}

/// ファイル指定ならそのまま、フォルダならワークブックを列挙
fn collect_workbooks(path: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let workbooks = scanner::scan_folder(path, recursive)?;
    if workbooks.is_empty() {
        return Err(error::PuantajError::NoWorkbooksFound(path.display().to_string()).into());
    }
    Ok(workbooks.into_iter().map(|w| w.path).collect())
}

fn describe_pattern(raw: &str) -> serde_json::Value {
    let key = normalize_pattern(raw);
    match ShiftPatternEntry::from_pattern_text(raw) {
        Ok(entry) => json!({
            "input": raw,
            "key": key.to_string(),
            "canonical": key.is_canonical(),
            "displayCode": entry.display_code(),
            "netHours": entry.net_hours(),
        }),
        Err(e) => json!({
            "input": raw,
            "key": key.to_string(),
            "canonical": key.is_canonical(),
            "error": e.to_string(),
        }),
    }
}

fn print_tiers(tiers: &OvertimeTiers) {
    for (i, tier) in tiers.to_vec().iter().enumerate() {
        let limit = match tier.duration_hours() {
            Some(hours) => format!("{:.2}h", hours),
            None => "残り全部".to_string(),
        };
        println!("{}. {} x{} ({})", i + 1, tier.label(), tier.rate(), limit);
    }
}

fn display_optional(path: Option<&Path>, fallback: &str) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| fallback.to_string())
}
