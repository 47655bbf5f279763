//! 日志工具模块
//!
//! 提供日志初始化、格式化和输出的辅助函数

use anyhow::Result;
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 日志
///
/// `RUST_LOG` 优先；未设置时按 `verbose` 选择 debug 或 info 级别。
/// 重复调用不会报错（测试中会多次初始化）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n评语合并日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `max_concurrent`: 最大并发数
/// - `label_preset`: 标签预设
pub fn log_startup(max_concurrent: usize, label_preset: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量评语合并模式");
    info!("📊 最大并发数: {}", max_concurrent);
    info!("🏷️ 标签预设: {}", label_preset);
    info!("{}", "=".repeat(60));
}

/// 记录表格加载信息
pub fn log_sheets_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 个待处理的表格", total);
    info!("📋 将以每批 {} 个的方式处理", max_concurrent);
}

/// 记录批次开始信息
///
/// # 参数
/// - `batch_num`: 批次编号
/// - `total_batches`: 批次总数
/// - `start`: 起始表格编号
/// - `end`: 结束表格编号
/// - `total`: 表格总数
pub fn log_batch_start(
    batch_num: usize,
    total_batches: usize,
    start: usize,
    end: usize,
    total: usize,
) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 批", batch_num, total_batches);
    info!("📄 本批表格: {}-{} / 共 {} 个", start, end, total);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
pub fn log_batch_complete(batch_num: usize, merged: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 第 {} 批完成: 成功 {}/{}", batch_num, merged, total);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `merged`: 成功合并的表格数
/// - `rejected`: 结构识别失败的表格数
/// - `failed`: 出错的表格数
/// - `students`: 生成评语的学生总数
/// - `issues`: 问题总数
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(
    merged: usize,
    rejected: usize,
    failed: usize,
    students: usize,
    issues: usize,
    log_file_path: &str,
) {
    let total = merged + rejected + failed;
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", merged, total);
    info!("⚠️ 结构无法识别: {}", rejected);
    info!("❌ 失败: {}", failed);
    info!("👩‍🎓 学生评语: {} 条, 问题: {} 个", students, issues);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("评语合并日志", 2), "评语...");
        assert_eq!(truncate_text("An", 6), "An");
    }
}
