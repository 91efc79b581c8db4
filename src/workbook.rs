//! ワークブック読み込みアダプタ
//!
//! calamineでシートを読み、エンジンに渡す [`CellMatrix`] のスナップショットを作る。
//! 日付見出しは数値セルで入っていることが多いので、整数値の小数は整数表記にする。

use crate::error::{PuantajError, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use puantaj_common::CellMatrix;
use std::path::Path;

/// ワークブックの1シートを読み込む
///
/// # Arguments
/// * `path` - xlsx/xlsm/xls/ods
/// * `sheet` - シート名（省略時は先頭シート）
pub fn load_sheet(path: &Path, sheet: Option<&str>) -> Result<CellMatrix> {
    if !path.exists() {
        return Err(PuantajError::FileNotFound(path.display().to_string()));
    }

    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| PuantajError::Workbook(format!("シートがありません: {}", path.display())))?,
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    tracing::debug!(path = %path.display(), sheet = %sheet_name, size = ?range.get_size(), "sheet loaded");
    Ok(range_to_matrix(&range))
}

/// calamineのRangeを1始まりのグリッドに変換（Rangeの開始位置を保つ）
pub fn range_to_matrix(range: &Range<Data>) -> CellMatrix {
    let Some((last_row, last_col)) = range.end() else {
        return CellMatrix::default();
    };

    let rows = (0..=last_row)
        .map(|row| {
            (0..=last_col)
                .map(|col| range.get_value((row, col)).and_then(cell_text))
                .collect()
        })
        .collect();
    CellMatrix::new(rows)
}

/// セル値を文字列に変換（空セルは None）
pub fn cell_text(data: &Data) -> Option<String> {
    let text = match data {
        Data::Empty => return None,
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    };
    (!text.trim().is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::Float(3.0)), Some("3".to_string()));
        assert_eq!(cell_text(&Data::Float(7.5)), Some("7.5".to_string()));
        assert_eq!(cell_text(&Data::Int(12)), Some("12".to_string()));
        assert_eq!(cell_text(&Data::String("Ad Soyad".into())), Some("Ad Soyad".to_string()));
        assert_eq!(cell_text(&Data::String("   ".into())), None);
    }

    #[test]
    fn test_range_keeps_offset() {
        let mut range: Range<Data> = Range::new((2, 1), (2, 3));
        range.set_value((2, 1), Data::Float(1.0));
        range.set_value((2, 2), Data::Float(2.0));
        range.set_value((2, 3), Data::Float(3.0));

        let grid = range_to_matrix(&range);
        use puantaj_common::CellGrid;
        assert_eq!(grid.bounds(), (3, 4));
        assert_eq!(grid.text(3, 2), Some("1".to_string()));
        assert_eq!(grid.text(1, 1), None);
    }

    #[test]
    fn test_missing_file() {
        let err = load_sheet(Path::new("/nonexistent/puantaj.xlsx"), None).unwrap_err();
        assert!(matches!(err, PuantajError::FileNotFound(_)));
    }
}
