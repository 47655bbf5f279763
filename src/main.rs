use anyhow::Result;
use remark_merge::utils::logging;
use remark_merge::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let stats = App::initialize(config)?.run().await?;

    if stats.failed > 0 {
        anyhow::bail!("{} 个表格处理失败", stats.failed);
    }

    Ok(())
}
