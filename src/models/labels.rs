//! 表格锚点文本与模板占位符键
//!
//! 所有识别表格结构时依赖的固定文本都集中在这里，部署时可以整体替换，
//! 也可以通过 TOML 文件逐项覆盖。

use phf::phf_map;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, ConfigError};

/// 内置的语言预设
#[derive(Debug, Clone, Copy)]
pub struct LabelPreset {
    pub student_name_anchor: &'static str,
    pub good_section_header: &'static str,
    pub not_good_section_header: &'static str,
    pub student_name_key: &'static str,
    pub exam_name_key: &'static str,
    pub good_list_key: &'static str,
    pub not_good_list_key: &'static str,
}

const VI_PRESET: LabelPreset = LabelPreset {
    student_name_anchor: "Tên học sinh",
    good_section_header: "Câu nhận xét dạng bài tốt",
    not_good_section_header: "Câu nhận xét dạng bài chưa tốt",
    student_name_key: "tên học sinh",
    exam_name_key: "tên bài kiểm tra",
    good_list_key: "danh sách dạng bài tốt",
    not_good_list_key: "danh sách dạng bài chưa tốt",
};

const EN_PRESET: LabelPreset = LabelPreset {
    student_name_anchor: "Student name",
    good_section_header: "Strength categories",
    not_good_section_header: "Weakness categories",
    student_name_key: "student name",
    exam_name_key: "exam name",
    good_list_key: "list of strength categories",
    not_good_list_key: "list of weakness categories",
};

static LABEL_PRESETS: phf::Map<&'static str, LabelPreset> = phf_map! {
    "vi" => VI_PRESET,
    "en" => EN_PRESET,
};

/// 默认预设名称，与 `RemarkLabels::default()` 一致
pub const DEFAULT_PRESET: &str = "vi";
/// 默认勾选标记
pub const DEFAULT_SELECTION_TOKEN: &str = "x";
/// 默认占位符起始符
pub const DEFAULT_PLACEHOLDER_OPEN: &str = "{";
/// 默认占位符结束符
pub const DEFAULT_PLACEHOLDER_CLOSE: &str = "}";

/// 结构识别与模板填充使用的全部固定文本
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemarkLabels {
    /// 学生姓名列的锚点文本（不区分大小写）
    pub student_name_anchor: String,
    /// "优点类别"特殊栏目的表头
    pub good_section_header: String,
    /// "待改进类别"特殊栏目的表头
    pub not_good_section_header: String,
    /// 表示"已选"的标记
    pub selection_token: String,
    pub placeholder_open: String,
    pub placeholder_close: String,
    /// 模板上下文中的学生姓名键
    pub student_name_key: String,
    /// 模板上下文中的考试名称键
    pub exam_name_key: String,
    /// 模板上下文中的优点类别列表键
    pub good_list_key: String,
    /// 模板上下文中的待改进类别列表键
    pub not_good_list_key: String,
}

impl RemarkLabels {
    /// 按预设名称构建（`vi` / `en`）
    pub fn preset(name: &str) -> AppResult<Self> {
        let key = name.trim().to_lowercase();
        let preset = LABEL_PRESETS
            .get(key.as_str())
            .ok_or_else(|| ConfigError::UnknownLabelPreset {
                name: name.to_string(),
            })?;
        Ok(Self::from(*preset))
    }

    /// 可用的预设名称
    pub fn preset_names() -> Vec<&'static str> {
        let mut names: Vec<_> = LABEL_PRESETS.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// 用覆盖项替换对应字段
    pub fn with_overrides(mut self, overrides: LabelOverrides) -> Self {
        let LabelOverrides {
            preset: _,
            student_name_anchor,
            good_section_header,
            not_good_section_header,
            selection_token,
            placeholder_open,
            placeholder_close,
            student_name_key,
            exam_name_key,
            good_list_key,
            not_good_list_key,
        } = overrides;

        replace(&mut self.student_name_anchor, student_name_anchor);
        replace(&mut self.good_section_header, good_section_header);
        replace(&mut self.not_good_section_header, not_good_section_header);
        replace(&mut self.selection_token, selection_token);
        replace(&mut self.placeholder_open, placeholder_open);
        replace(&mut self.placeholder_close, placeholder_close);
        replace(&mut self.student_name_key, student_name_key);
        replace(&mut self.exam_name_key, exam_name_key);
        replace(&mut self.good_list_key, good_list_key);
        replace(&mut self.not_good_list_key, not_good_list_key);
        self
    }

    /// 检查必须非空的字段
    pub fn validate(&self) -> AppResult<()> {
        let required = [
            ("student_name_anchor", &self.student_name_anchor),
            ("good_section_header", &self.good_section_header),
            ("not_good_section_header", &self.not_good_section_header),
            ("selection_token", &self.selection_token),
            ("placeholder_open", &self.placeholder_open),
            ("placeholder_close", &self.placeholder_close),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::empty_label(field));
            }
        }
        Ok(())
    }

    /// 单元格内容是否为勾选标记（去空白，不区分大小写）
    pub fn is_selected(&self, raw: &str) -> bool {
        raw.trim().to_lowercase() == self.selection_token.trim().to_lowercase()
    }
}

fn replace(target: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *target = value;
    }
}

impl From<LabelPreset> for RemarkLabels {
    fn from(p: LabelPreset) -> Self {
        Self {
            student_name_anchor: p.student_name_anchor.to_string(),
            good_section_header: p.good_section_header.to_string(),
            not_good_section_header: p.not_good_section_header.to_string(),
            selection_token: DEFAULT_SELECTION_TOKEN.to_string(),
            placeholder_open: DEFAULT_PLACEHOLDER_OPEN.to_string(),
            placeholder_close: DEFAULT_PLACEHOLDER_CLOSE.to_string(),
            student_name_key: p.student_name_key.to_string(),
            exam_name_key: p.exam_name_key.to_string(),
            good_list_key: p.good_list_key.to_string(),
            not_good_list_key: p.not_good_list_key.to_string(),
        }
    }
}

impl Default for RemarkLabels {
    fn default() -> Self {
        Self::from(VI_PRESET)
    }
}

/// TOML 覆盖文件的内容，所有字段可选
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelOverrides {
    /// 在覆盖前先切换到的预设
    #[serde(default)]
    pub preset: Option<String>,
    pub student_name_anchor: Option<String>,
    pub good_section_header: Option<String>,
    pub not_good_section_header: Option<String>,
    pub selection_token: Option<String>,
    pub placeholder_open: Option<String>,
    pub placeholder_close: Option<String>,
    pub student_name_key: Option<String>,
    pub exam_name_key: Option<String>,
    pub good_list_key: Option<String>,
    pub not_good_list_key: Option<String>,
}
