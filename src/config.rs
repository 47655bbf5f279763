use std::path::Path;
use std::str::FromStr;

use tracing::warn;

use crate::engine::{BlankRowPolicy, EngineOptions, DEFAULT_ANCHOR_SCAN_ROWS};
use crate::error::{AppResult, ConfigError};
use crate::models::labels::DEFAULT_PRESET;
use crate::models::load_labels;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时处理的表格数量
    pub max_concurrent_sheets: usize,
    /// 待处理 JSON 表格所在目录
    pub grid_folder: String,
    /// 评语结果输出目录
    pub output_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 运行日志文件
    pub output_log_file: String,
    /// 校验问题写入的文件
    pub warn_file: String,
    // --- 引擎配置 ---
    /// 标签预设名称（vi / en）
    pub label_preset: String,
    /// 标签覆盖文件（TOML）
    pub labels_file: Option<String>,
    pub blank_row_policy: BlankRowPolicy,
    pub flag_missing_templates: bool,
    pub anchor_scan_rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_sheets: 8,
            grid_folder: "grids".to_string(),
            output_folder: "remarks_out".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            warn_file: "warn.txt".to_string(),
            label_preset: DEFAULT_PRESET.to_string(),
            labels_file: None,
            blank_row_policy: BlankRowPolicy::Stop,
            flag_missing_templates: false,
            anchor_scan_rows: DEFAULT_ANCHOR_SCAN_ROWS,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_sheets: env_or_warn("MAX_CONCURRENT_SHEETS", |v| parse_positive("MAX_CONCURRENT_SHEETS", v)).unwrap_or(default.max_concurrent_sheets),
            grid_folder: std::env::var("GRID_FOLDER").unwrap_or(default.grid_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            verbose_logging: env_or_warn("VERBOSE_LOGGING", |v| parse_value("VERBOSE_LOGGING", "true | false", v)).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            warn_file: std::env::var("WARN_FILE").unwrap_or(default.warn_file),
            label_preset: std::env::var("LABEL_PRESET").unwrap_or(default.label_preset),
            labels_file: std::env::var("LABELS_FILE").ok().filter(|v| !v.trim().is_empty()).or(default.labels_file),
            blank_row_policy: env_or_warn("BLANK_ROW_POLICY", BlankRowPolicy::from_str).unwrap_or(default.blank_row_policy),
            flag_missing_templates: env_or_warn("FLAG_MISSING_TEMPLATES", |v| parse_value("FLAG_MISSING_TEMPLATES", "true | false", v)).unwrap_or(default.flag_missing_templates),
            anchor_scan_rows: env_or_warn("ANCHOR_SCAN_ROWS", |v| parse_positive("ANCHOR_SCAN_ROWS", v)).unwrap_or(default.anchor_scan_rows),
        }
    }

    /// 组装引擎选项（会读取标签覆盖文件）
    pub fn engine_options(&self) -> AppResult<EngineOptions> {
        let labels = load_labels(&self.label_preset, self.labels_file.as_deref().map(Path::new))?;
        Ok(EngineOptions {
            labels,
            anchor_scan_rows: self.anchor_scan_rows,
            blank_row_policy: self.blank_row_policy,
            flag_missing_templates: self.flag_missing_templates,
        })
    }
}

/// 读取并解析环境变量
///
/// 未设置时返回 `None`；无法解析时记录警告并返回 `None`，由调用方使用默认值。
fn env_or_warn<T>(var_name: &str, parse: impl FnOnce(&str) -> Result<T, ConfigError>) -> Option<T> {
    let value = std::env::var(var_name).ok()?;
    match parse(&value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("{}，使用默认值", e);
            None
        }
    }
}

fn parse_value<T: FromStr>(var_name: &str, expected_type: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value: value.to_string(),
            expected_type: expected_type.to_string(),
        })
}

fn parse_positive(var_name: &str, value: &str) -> Result<usize, ConfigError> {
    match parse_value::<usize>(var_name, "正整数", value)? {
        0 => Err(ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value: value.to_string(),
            expected_type: "正整数".to_string(),
        }),
        n => Ok(n),
    }
}
