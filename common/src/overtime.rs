//! 残業区分の導出
//!
//! シフトグループの標準時間・シフト時間と、どの区分を割り当てるかのフラグから
//! 残業区分（料率・ラベル・出力列）の一覧を作る。一覧は毎回まるごと作り直す。
//!
//! | 通常 | 割増 | 結果 |
//! |------|------|------|
//! | ✔ | ✔ | 通常（シフト時間−標準時間, ×1.0）→ 割増（残り全部, ×1.5） |
//! | ✔ |   | 通常のみ。シフト時間を超えた分は対象外 |
//! |   | ✔ | 割増のみ。標準時間を超えた全時間が対象 |

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 通常残業の料率
pub const NORMAL_RATE: f64 = 1.0;
/// 割増残業の料率
pub const PREMIUM_RATE: f64 = 1.5;

/// 区分のラベルと出力列の参照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TierTarget {
    pub label: String,
    pub target_column_ref: String,
}

impl Default for TierTarget {
    fn default() -> Self {
        TierLabels::default().normal
    }
}

/// 通常・割増それぞれのラベル設定
///
/// 設定ファイルでは一部の項目だけ書けばよく、省略した項目は既定値になる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "TierLabelsRecord")]
pub struct TierLabels {
    pub normal: TierTarget,
    pub premium: TierTarget,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TierLabelsRecord {
    normal: PartialTierTarget,
    premium: PartialTierTarget,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PartialTierTarget {
    label: Option<String>,
    target_column_ref: Option<String>,
}

impl PartialTierTarget {
    fn merge_into(self, base: TierTarget) -> TierTarget {
        TierTarget {
            label: self.label.unwrap_or(base.label),
            target_column_ref: self.target_column_ref.unwrap_or(base.target_column_ref),
        }
    }
}

impl From<TierLabelsRecord> for TierLabels {
    fn from(record: TierLabelsRecord) -> Self {
        let defaults = TierLabels::default();
        Self {
            normal: record.normal.merge_into(defaults.normal),
            premium: record.premium.merge_into(defaults.premium),
        }
    }
}

impl Default for TierLabels {
    fn default() -> Self {
        Self {
            normal: TierTarget {
                label: "Normal Overtime".into(),
                target_column_ref: "OT_NORMAL".into(),
            },
            premium: TierTarget {
                label: "Overtime %50".into(),
                target_column_ref: "OT_50".into(),
            },
        }
    }
}

/// 割り当てる区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TierFlags {
    pub assign_normal_tier: bool,
    pub assign_premium_tier: bool,
}

/// 時間上限のある区分
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedTier {
    pub hours: f64,
    pub rate: f64,
    pub label: String,
    pub target_column_ref: String,
}

/// 残り全部を受け持つ区分
#[derive(Debug, Clone, PartialEq)]
pub struct CatchAllTier {
    pub rate: f64,
    pub label: String,
    pub target_column_ref: String,
}

/// 残業区分
#[derive(Debug, Clone, PartialEq)]
pub enum OvertimeTier {
    Bounded(BoundedTier),
    CatchAll(CatchAllTier),
}

impl OvertimeTier {
    pub fn label(&self) -> &str {
        match self {
            OvertimeTier::Bounded(tier) => &tier.label,
            OvertimeTier::CatchAll(tier) => &tier.label,
        }
    }

    pub fn rate(&self) -> f64 {
        match self {
            OvertimeTier::Bounded(tier) => tier.rate,
            OvertimeTier::CatchAll(tier) => tier.rate,
        }
    }

    pub fn duration_hours(&self) -> Option<f64> {
        match self {
            OvertimeTier::Bounded(tier) => Some(tier.hours),
            OvertimeTier::CatchAll(_) => None,
        }
    }

    pub fn is_catch_all(&self) -> bool {
        matches!(self, OvertimeTier::CatchAll(_))
    }
}

/// 順序付きの残業区分一覧
///
/// 全残業区分は上限付き区分の列と、最後に高々1つの全残区分で構成される。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<OvertimeTierRecord>", into = "Vec<OvertimeTierRecord>")]
pub struct OvertimeTiers {
    bounded: Vec<BoundedTier>,
    catch_all: Option<CatchAllTier>,
}

impl OvertimeTiers {
    pub fn new(bounded: Vec<BoundedTier>, catch_all: Option<CatchAllTier>) -> Self {
        Self { bounded, catch_all }
    }

    pub fn bounded(&self) -> &[BoundedTier] {
        &self.bounded
    }

    pub fn catch_all(&self) -> Option<&CatchAllTier> {
        self.catch_all.as_ref()
    }

    pub fn len(&self) -> usize {
        self.bounded.len() + usize::from(self.catch_all.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 適用順の区分一覧
    pub fn to_vec(&self) -> Vec<OvertimeTier> {
        let mut tiers: Vec<OvertimeTier> =
            self.bounded.iter().cloned().map(OvertimeTier::Bounded).collect();
        if let Some(catch_all) = &self.catch_all {
            tiers.push(OvertimeTier::CatchAll(catch_all.clone()));
        }
        tiers
    }

    /// 標準時間を超えた時間を各区分に振り分ける
    ///
    /// 上限付き区分を順に埋め、残りは全残区分へ。全残区分がなければ未割当として返す。
    pub fn allocate(&self, overtime_hours: f64) -> TierAllocation {
        let mut remaining = overtime_hours.max(0.0);
        let mut allocations = Vec::new();

        for tier in &self.bounded {
            if remaining <= 0.0 {
                break;
            }
            let hours = remaining.min(tier.hours);
            allocations.push(AllocatedHours {
                label: tier.label.clone(),
                target_column_ref: tier.target_column_ref.clone(),
                rate: tier.rate,
                hours,
            });
            remaining -= hours;
        }

        if let Some(tier) = &self.catch_all {
            if remaining > 0.0 {
                allocations.push(AllocatedHours {
                    label: tier.label.clone(),
                    target_column_ref: tier.target_column_ref.clone(),
                    rate: tier.rate,
                    hours: remaining,
                });
                remaining = 0.0;
            }
        }

        TierAllocation {
            allocations,
            uncovered_hours: remaining,
        }
    }

    /// 区分の構成（上限時間・料率・全残区分の有無）が同じか。ラベルと出力列は比較しない。
    pub fn same_shape(&self, other: &OvertimeTiers) -> bool {
        const EPSILON: f64 = 1e-9;
        let bounded_match = self.bounded.len() == other.bounded.len()
            && self
                .bounded
                .iter()
                .zip(&other.bounded)
                .all(|(a, b)| (a.hours - b.hours).abs() < EPSILON && (a.rate - b.rate).abs() < EPSILON);
        let catch_all_match = match (&self.catch_all, &other.catch_all) {
            (Some(a), Some(b)) => (a.rate - b.rate).abs() < EPSILON,
            (None, None) => true,
            _ => false,
        };
        bounded_match && catch_all_match
    }
}

/// 区分ごとの割当時間
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocatedHours {
    pub label: String,
    pub target_column_ref: String,
    pub rate: f64,
    pub hours: f64,
}

/// 割当結果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierAllocation {
    pub allocations: Vec<AllocatedHours>,
    /// どの区分にも入らなかった時間
    pub uncovered_hours: f64,
}

/// 標準時間・シフト時間・フラグの検証
pub fn validate_hours(standard_hours: f64, shift_span_hours: f64) -> Result<()> {
    if !standard_hours.is_finite() || standard_hours <= 0.0 {
        return Err(Error::constraint(format!(
            "standard hours must be greater than 0 (got {})",
            standard_hours
        )));
    }
    if !shift_span_hours.is_finite() || shift_span_hours <= standard_hours {
        return Err(Error::constraint(format!(
            "shift span {} must be greater than standard hours {}",
            shift_span_hours, standard_hours
        )));
    }
    Ok(())
}

/// 残業区分を導出する
///
/// # Errors
/// * 標準時間が0以下、シフト時間が標準時間以下
/// * 通常・割増のどちらも選ばれていない
pub fn derive_overtime_tiers(
    standard_hours: f64,
    shift_span_hours: f64,
    flags: TierFlags,
    labels: &TierLabels,
) -> Result<OvertimeTiers> {
    validate_hours(standard_hours, shift_span_hours)?;

    let normal = || BoundedTier {
        hours: shift_span_hours - standard_hours,
        rate: NORMAL_RATE,
        label: labels.normal.label.clone(),
        target_column_ref: labels.normal.target_column_ref.clone(),
    };
    let premium = || CatchAllTier {
        rate: PREMIUM_RATE,
        label: labels.premium.label.clone(),
        target_column_ref: labels.premium.target_column_ref.clone(),
    };

    let tiers = match (flags.assign_normal_tier, flags.assign_premium_tier) {
        (true, true) => OvertimeTiers::new(vec![normal()], Some(premium())),
        (true, false) => OvertimeTiers::new(vec![normal()], None),
        // 割増のみ: 標準時間超過の全時間を割増で受ける（シフト時間超過ではない）
        (false, true) => OvertimeTiers::new(Vec::new(), Some(premium())),
        (false, false) => {
            return Err(Error::constraint(
                "at least one overtime tier (normal or premium) must be selected",
            ))
        }
    };

    tracing::debug!(
        standard_hours,
        shift_span_hours,
        tiers = tiers.len(),
        "overtime tiers derived"
    );

    Ok(tiers)
}

/// 給与計算エンジンに渡す形式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeTierRecord {
    #[serde(default)]
    pub duration_hours: Option<f64>,
    #[serde(default)]
    pub is_catch_all: bool,
    pub rate_multiplier: f64,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub target_column_ref: String,
}

impl From<OvertimeTiers> for Vec<OvertimeTierRecord> {
    fn from(tiers: OvertimeTiers) -> Self {
        tiers
            .to_vec()
            .into_iter()
            .map(|tier| match tier {
                OvertimeTier::Bounded(t) => OvertimeTierRecord {
                    duration_hours: Some(t.hours),
                    is_catch_all: false,
                    rate_multiplier: t.rate,
                    label: t.label,
                    target_column_ref: t.target_column_ref,
                },
                OvertimeTier::CatchAll(t) => OvertimeTierRecord {
                    duration_hours: None,
                    is_catch_all: true,
                    rate_multiplier: t.rate,
                    label: t.label,
                    target_column_ref: t.target_column_ref,
                },
            })
            .collect()
    }
}

impl TryFrom<Vec<OvertimeTierRecord>> for OvertimeTiers {
    type Error = Error;

    fn try_from(records: Vec<OvertimeTierRecord>) -> Result<Self> {
        let count = records.len();
        let mut bounded = Vec::new();
        let mut catch_all = None;

        for (index, record) in records.into_iter().enumerate() {
            if record.is_catch_all {
                if index + 1 != count {
                    return Err(Error::constraint("catch-all overtime tier must be the last tier"));
                }
                catch_all = Some(CatchAllTier {
                    rate: record.rate_multiplier,
                    label: record.label,
                    target_column_ref: record.target_column_ref,
                });
            } else {
                let hours = record.duration_hours.ok_or_else(|| {
                    Error::constraint(format!("overtime tier '{}' has no duration", record.label))
                })?;
                bounded.push(BoundedTier {
                    hours,
                    rate: record.rate_multiplier,
                    label: record.label,
                    target_column_ref: record.target_column_ref,
                });
            }
        }

        Ok(Self { bounded, catch_all })
    }
}
