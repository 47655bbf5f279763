use crate::error::{AppError, FileError};
use crate::models::grid::Grid;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 一个待处理的表格
///
/// 文件格式为 JSON：`{ "sheetName": "...", "rows": [[...], ...] }`，
/// 或者直接是行数组 `[[...], ...]`。
#[derive(Debug, Clone)]
pub struct GridDocument {
    /// 表格名称（缺省时取文件名）
    pub name: String,
    pub grid: Grid,
    pub file_path: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GridFile {
    Wrapped {
        #[serde(rename = "sheetName", default)]
        sheet_name: Option<String>,
        rows: Grid,
    },
    Bare(Grid),
}

/// 解析 JSON 文本为表格文档
pub fn parse_grid_document(content: &str, fallback_name: &str) -> Result<GridDocument> {
    let parsed: GridFile = serde_json::from_str(content)
        .map_err(|e| AppError::grid_parse_failed(fallback_name, e))?;
    let (name, grid) = match parsed {
        GridFile::Wrapped { sheet_name, rows } => (
            sheet_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| fallback_name.to_string()),
            rows,
        ),
        GridFile::Bare(grid) => (fallback_name.to_string(), grid),
    };
    Ok(GridDocument {
        name,
        grid,
        file_path: None,
    })
}

/// 从 JSON 文件加载表格
pub async fn load_grid_document(grid_file_path: &Path) -> Result<GridDocument> {
    let content = fs::read_to_string(grid_file_path)
        .await
        .with_context(|| format!("无法读取表格文件: {}", grid_file_path.display()))?;

    let fallback_name = grid_file_path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let mut document = parse_grid_document(&content, &fallback_name)
        .with_context(|| format!("无法解析表格文件: {}", grid_file_path.display()))?;

    document.file_path = Some(grid_file_path.to_string_lossy().to_string());

    Ok(document)
}

/// 从文件夹中加载所有 JSON 表格，按文件名排序
///
/// 单个文件加载失败只记录警告，不影响其他文件。
pub async fn load_all_grid_files(folder_path: &str) -> Result<Vec<GridDocument>> {
    let folder = PathBuf::from(folder_path);

    if !folder.is_dir() {
        return Err(AppError::from(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        })
        .into());
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut documents = Vec::new();
    for path in paths {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_grid_document(&path).await {
            Ok(document) => {
                tracing::info!("成功加载 {} 行", document.grid.row_count());
                documents.push(document);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(documents)
}
