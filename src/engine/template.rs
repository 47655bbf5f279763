//! 句子模板填充
//!
//! 模板语言只有一种语法：`{键}` 占位符。填充是纯函数，输入只有模板和显式的上下文表。

use regex::Regex;
use std::collections::BTreeMap;

use crate::error::AppResult;

/// 模板上下文（键 → 值）
pub type TemplateContext = BTreeMap<String, String>;

/// 已视为句末的标点
const SENTENCE_ENDINGS: [char; 4] = ['.', '!', '?', '…'];

/// 模板引擎
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    placeholder: Regex,
}

impl TemplateEngine {
    /// 按占位符起止符构建，起止符按字面匹配
    pub fn new(open: &str, close: &str) -> AppResult<Self> {
        let pattern = format!(
            "{}(.*?){}",
            regex::escape(open),
            regex::escape(close)
        );
        Ok(Self {
            placeholder: Regex::new(&pattern)?,
        })
    }

    /// 替换全部占位符并补全句末标点
    ///
    /// 先按原样查找键，再按小写键查找；找不到的占位符替换为空串。
    pub fn fill(&self, template: &str, context: &TemplateContext) -> String {
        let filled = self.placeholder.replace_all(template, |caps: &regex::Captures| {
            let key = &caps[1];
            context
                .get(key)
                .or_else(|| context.get(&key.trim().to_lowercase()))
                .cloned()
                .unwrap_or_default()
        });
        ensure_sentence_ending(&filled)
    }
}

/// 去掉首尾空白，非空且不以句末标点结尾时追加句号
pub fn ensure_sentence_ending(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.ends_with(&SENTENCE_ENDINGS[..]) {
        trimmed.to_string()
    } else {
        format!("{}.", trimmed)
    }
}
