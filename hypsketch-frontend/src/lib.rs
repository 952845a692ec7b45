pub mod cli;
pub mod errors;
pub mod loader;

use errors::FrontendError;
use hypsketch_config::AppConfig;
use hypsketch_core::model::ModelKind;
use tracing::info;

/// 启动 CLI 演示或返回错误。`model` 为命令行指定的模型，优先于配置。
pub fn run_cli_demo(config: &AppConfig, model: Option<ModelKind>) -> Result<(), FrontendError> {
    info!("启动 CLI 演示前端");
    cli::run_demo(config, model)
}
