use hypsketch_engine::errors::EngineError;
use hypsketch_io::IoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("场景文件读写失败: {0}")]
    Io(#[from] IoError),
    #[error("场景操作失败: {0}")]
    Engine(#[from] EngineError),
}
