use crate::error::{AppError, AppResult, FileError};
use crate::models::labels::{LabelOverrides, RemarkLabels};
use std::fs;
use std::path::Path;

/// 从 TOML 文件加载标签覆盖项
pub fn load_label_overrides(toml_file_path: &Path) -> AppResult<LabelOverrides> {
    let path_str = toml_file_path.display().to_string();
    if !toml_file_path.exists() {
        return Err(FileError::NotFound { path: path_str }.into());
    }

    let content = fs::read_to_string(toml_file_path)
        .map_err(|e| AppError::file_read_failed(&path_str, e))?;

    toml::from_str(&content).map_err(|e| AppError::toml_parse_failed(&path_str, e))
}

/// 以预设为基础，叠加 TOML 文件中的覆盖项
///
/// 文件中的 `preset` 字段优先于传入的预设名称。
pub fn load_labels(preset: &str, overrides_path: Option<&Path>) -> AppResult<RemarkLabels> {
    let Some(path) = overrides_path else {
        return RemarkLabels::preset(preset);
    };

    let overrides = load_label_overrides(path)?;
    let base = match overrides.preset.as_deref() {
        Some(name) => RemarkLabels::preset(name)?,
        None => RemarkLabels::preset(preset)?,
    };
    tracing::info!("已加载标签覆盖文件: {}", path.display());
    Ok(base.with_overrides(overrides))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_labels_without_file_uses_preset() {
        let labels = load_labels("en", None).unwrap();
        assert_eq!(labels.student_name_anchor, "Student name");
    }

    #[test]
    fn test_load_labels_with_overrides() {
        let path = std::env::temp_dir().join(format!("remark_labels_{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "preset = \"en\"\ngood_section_header = \"Strong topics\"\n",
        )
        .unwrap();

        let labels = load_labels("vi", Some(&path)).unwrap();
        assert_eq!(labels.student_name_anchor, "Student name");
        assert_eq!(labels.good_section_header, "Strong topics");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_and_bad_toml() {
        let missing = Path::new("/no/such/labels.toml");
        assert!(matches!(
            load_label_overrides(missing),
            Err(AppError::File(FileError::NotFound { .. }))
        ));

        let path = std::env::temp_dir().join(format!("remark_labels_bad_{}.toml", std::process::id()));
        std::fs::write(&path, "unknown_field = 1\n").unwrap();
        assert!(matches!(
            load_label_overrides(&path),
            Err(AppError::File(FileError::TomlParseFailed { .. }))
        ));
        std::fs::remove_file(&path).unwrap();
    }
}
