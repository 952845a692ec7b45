use std::env;
use std::path::{Path, PathBuf};

use hypsketch_config::{AppConfig, DefaultModel, ModelConfig};
use hypsketch_core::geometry::Point2;
use hypsketch_core::model::{ModelContext, ModelKind};
use hypsketch_engine::scene::{DemoEntities, Scene};
use hypsketch_io::{JsonFacade, SceneLoader};
use tracing::{info, warn};

use crate::errors::FrontendError;

/// 覆盖配置中 `storage.scene_path` 的环境变量。
pub const SCENE_ENV: &str = "HYPSKETCH_SCENE";

/// 场景来源，便于前端呈现加载信息。
#[derive(Debug, Clone, PartialEq)]
pub enum SceneSource {
    Json(PathBuf),
    Demo,
}

/// 统一封装加载后的场景与元信息。
#[derive(Debug)]
pub struct LoadedScene {
    pub scene: Scene,
    pub source: SceneSource,
    pub demo_entities: Option<DemoEntities>,
}

pub fn model_context(config: &ModelConfig) -> ModelContext {
    let [x, y] = config.disk_center;
    ModelContext::with_page_height(
        Point2::new(x, y),
        config.disk_radius,
        config.effective_page_height(),
    )
}

pub fn configured_model(config: &ModelConfig) -> ModelKind {
    match config.default_model {
        DefaultModel::Disk => ModelKind::Disk,
        DefaultModel::HalfPlane => ModelKind::HalfPlane,
    }
}

/// 场景路径优先取环境变量 `HYPSKETCH_SCENE`，其次是配置中的 `storage.scene_path`。
pub fn load_scene(config: &AppConfig, model: Option<ModelKind>) -> LoadedScene {
    let path = env::var_os(SCENE_ENV)
        .map(PathBuf::from)
        .or_else(|| config.storage.scene_path.clone());
    load_scene_from(path.as_deref(), config, model)
}

/// 从 JSON 加载场景，失败时回退到内置示例。
///
/// 文件未声明 `sceneType` 时沿用配置的模型；`model` 非空时最终切换到该模型。
pub fn load_scene_from(
    path: Option<&Path>,
    config: &AppConfig,
    model: Option<ModelKind>,
) -> LoadedScene {
    let context = model_context(&config.model);
    let kind = configured_model(&config.model);

    if let Some(path) = path {
        let mut scene = Scene::new(context, kind);
        match read_scene(path, &mut scene) {
            Ok(()) => {
                info!(
                    path = %path.display(),
                    points = scene.point_count(),
                    lines = scene.line_count(),
                    "从 JSON 加载场景成功"
                );
                if let Some(target) = model {
                    scene.switch_model_type(target);
                }
                return LoadedScene {
                    scene,
                    source: SceneSource::Json(path.to_path_buf()),
                    demo_entities: None,
                };
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "加载场景失败，回退到内置示例");
            }
        }
    }

    let mut scene = Scene::new(context, model.unwrap_or(kind));
    let demo_entities = scene.populate_demo();
    LoadedScene {
        scene,
        source: SceneSource::Demo,
        demo_entities: Some(demo_entities),
    }
}

fn read_scene(path: &Path, scene: &mut Scene) -> Result<(), FrontendError> {
    let data = JsonFacade::new().load(path)?;
    scene.load_data(&data)?;
    Ok(())
}
