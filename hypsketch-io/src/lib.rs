use std::fs;
use std::path::{Path, PathBuf};

use hypsketch_core::snapshot::SceneData;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse scene json: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("failed to serialize scene json: {0}")]
    Serialize(#[source] serde_json::Error),
}

pub trait SceneLoader {
    fn load(&self, path: &Path) -> Result<SceneData, IoError>;
}

pub trait SceneSaver {
    fn save(&self, scene: &SceneData, path: &Path) -> Result<(), IoError>;
}

/// 场景 JSON 格式的读写入口。
///
/// 字段采用 camelCase：`unitCircleCenter`、`unitCircleRadius`、`points`、
/// `lines`（`p1Index` / `p2Index` / `color`）以及可选的 `sceneType`。
#[derive(Debug, Clone, Copy)]
pub struct JsonFacade {
    pretty: bool,
}

impl JsonFacade {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// 输出单行 JSON，便于嵌入其他文本或日志。
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    /// 只做语法层面的解析；索引越界等语义问题由加载场景时的校验报告。
    pub fn parse_str(&self, text: &str) -> Result<SceneData, IoError> {
        parse_json(text)
    }

    pub fn encode(&self, scene: &SceneData) -> Result<String, IoError> {
        encode_json(scene, self.pretty)
    }
}

impl Default for JsonFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneLoader for JsonFacade {
    fn load(&self, path: &Path) -> Result<SceneData, IoError> {
        ensure_json_extension(path)?;
        let text = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_str(&text)
    }
}

impl SceneSaver for JsonFacade {
    fn save(&self, scene: &SceneData, path: &Path) -> Result<(), IoError> {
        ensure_json_extension(path)?;
        let text = self.encode(scene)?;
        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| IoError::WriteError {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, text).map_err(|source| IoError::WriteError {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn ensure_json_extension(path: &Path) -> Result<(), IoError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(()),
        Some(ext) => Err(IoError::UnsupportedFeature(format!(
            "场景文件格式 .{ext} 尚未支持"
        ))),
        None => Err(IoError::UnsupportedFeature(format!(
            "无法从 {path:?} 推断场景文件格式"
        ))),
    }
}

fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, IoError> {
    serde_json::from_str(text).map_err(IoError::Parse)
}

fn encode_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, IoError> {
    let encoded = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    encoded.map_err(IoError::Serialize)
}
