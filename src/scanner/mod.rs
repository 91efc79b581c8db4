use crate::error::{PuantajError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct WorkbookInfo {
    pub path: PathBuf,
    pub file_name: String,
}

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

pub fn scan_folder(folder: &Path, recursive: bool) -> Result<Vec<WorkbookInfo>> {
    if !folder.exists() {
        return Err(PuantajError::FolderNotFound(folder.display().to_string()));
    }

    let mut workbooks = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(if recursive { usize::MAX } else { 1 })
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        // Excelの一時ファイル（~$xxx.xlsx）は除外
        if file_name.starts_with("~$") {
            continue;
        }

        if let Some(ext) = path.extension() {
            if is_workbook_extension(&ext.to_string_lossy()) {
                workbooks.push(WorkbookInfo {
                    path: path.to_path_buf(),
                    file_name,
                });
            }
        }
    }

    // パスでソート
    workbooks.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(workbooks)
}

fn is_workbook_extension(ext: &str) -> bool {
    let ext = ext.to_lowercase();
    WORKBOOK_EXTENSIONS.contains(&ext.as_str())
}
