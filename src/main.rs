use anyhow::{Context, Result};
use std::path::PathBuf;

use content_scorer::utils::logging;
use content_scorer::{AnalysisFlow, App, Config};

/// 配置文件路径的环境变量
const CONFIG_PATH_VAR: &str = "CONTENT_SCORER_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config_path = std::env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from);
    let config = Config::load(config_path.as_deref()).context("加载配置失败")?;

    // 初始化日志
    logging::init(config.verbose_logging);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let app = App::initialize(config.clone())?;

    if args.is_empty() {
        // 批处理：分析内容目录下的全部 TOML 文件
        app.run().await?;
    } else {
        // 单条：命令行参数拼成正文
        let text = args.join(" ");
        let report = AnalysisFlow::new(app.registry())
            .analyze_text(&text, None, None, &config.analysis)
            .await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
