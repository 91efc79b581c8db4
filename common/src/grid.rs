//! セルグリッド
//!
//! 表計算ファイルの読み込みは外部（CLI側のアダプタ）の責務。
//! エンジンは1始まりの行・列でセル文字列を参照するだけ。

/// セル文字列を返すグリッド
pub trait CellGrid {
    /// セルの文字列（空セルは `None`）。行・列は1始まり。
    fn text(&self, row: usize, col: usize) -> Option<String>;

    /// `(最終行, 最終列)`。空のグリッドは `(0, 0)`。
    fn bounds(&self) -> (usize, usize);

    /// 空白のみのセルを除いたセル文字列（前後の空白は除去）
    fn trimmed_text(&self, row: usize, col: usize) -> Option<String> {
        self.text(row, col)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// メモリ上のグリッド
///
/// 外部で読み込んだシートのスナップショットとして使う。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellMatrix {
    rows: Vec<Vec<Option<String>>>,
    last_col: usize,
}

impl CellMatrix {
    pub fn new(rows: Vec<Vec<Option<String>>>) -> Self {
        let last_col = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        Self { rows, last_col }
    }

    /// 文字列の2次元配列から生成（空文字は空セル扱い）
    pub fn from_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| {
                        let cell = cell.as_ref();
                        (!cell.is_empty()).then(|| cell.to_string())
                    })
                    .collect()
            })
            .collect();
        Self::new(rows)
    }

    /// 指定セルに値を入れる（足りない行・列は広げる）
    pub fn set(&mut self, row: usize, col: usize, value: impl Into<String>) {
        if row == 0 || col == 0 {
            return;
        }
        if self.rows.len() < row {
            self.rows.resize(row, Vec::new());
        }
        let cells = &mut self.rows[row - 1];
        if cells.len() < col {
            cells.resize(col, None);
        }
        cells[col - 1] = Some(value.into());
        self.last_col = self.last_col.max(col);
    }
}

impl CellGrid for CellMatrix {
    fn text(&self, row: usize, col: usize) -> Option<String> {
        if row == 0 || col == 0 {
            return None;
        }
        self.rows.get(row - 1)?.get(col - 1)?.clone()
    }

    fn bounds(&self) -> (usize, usize) {
        (self.rows.len(), self.last_col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_and_bounds() {
        let grid = CellMatrix::from_rows(vec![vec!["a", "", "c"], vec!["d"]]);
        assert_eq!(grid.bounds(), (2, 3));
        assert_eq!(grid.text(1, 1), Some("a".to_string()));
        assert_eq!(grid.text(1, 2), None);
        assert_eq!(grid.text(2, 3), None);
        assert_eq!(grid.text(0, 1), None);
        assert_eq!(grid.text(5, 5), None);
    }

    #[test]
    fn test_set_grows() {
        let mut grid = CellMatrix::default();
        assert_eq!(grid.bounds(), (0, 0));
        grid.set(3, 4, "x");
        assert_eq!(grid.bounds(), (3, 4));
        assert_eq!(grid.text(3, 4), Some("x".to_string()));
        assert_eq!(grid.text(1, 1), None);
    }

    #[test]
    fn test_trimmed_text() {
        let grid = CellMatrix::from_rows(vec![vec!["  Ad Soyad ", "   "]]);
        assert_eq!(grid.trimmed_text(1, 1), Some("Ad Soyad".to_string()));
        assert_eq!(grid.trimmed_text(1, 2), None);
    }
}
