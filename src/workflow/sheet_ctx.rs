//! 表格处理上下文
//!
//! 封装"我正在处理第几张表、叫什么"这一信息

use std::fmt::Display;

/// 表格处理上下文
#[derive(Debug, Clone)]
pub struct SheetCtx {
    /// 表格名称
    pub sheet_name: String,

    /// 表格索引（从1开始，仅用于日志显示）
    pub sheet_index: usize,

    /// 输出文件名（不含扩展名）
    pub file_stem: String,
}

impl SheetCtx {
    /// 创建新的表格上下文
    pub fn new(sheet_name: String, sheet_index: usize, file_stem: String) -> Self {
        Self {
            sheet_name,
            sheet_index,
            file_stem,
        }
    }
}

impl Display for SheetCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[表格 #{} {}]", self.sheet_index, self.sheet_name)
    }
}
