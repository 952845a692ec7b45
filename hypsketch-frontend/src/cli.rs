use hypsketch_config::AppConfig;
use hypsketch_core::disk::DiskGeodesic;
use hypsketch_core::geometry::Point2;
use hypsketch_core::half_plane::HalfPlaneGeodesic;
use hypsketch_core::model::ModelKind;
use hypsketch_core::shape::GeodesicShape;
use hypsketch_engine::command::{CommandBus, CommandContext, CommandRequest};
use hypsketch_engine::scene::{DemoEntities, Scene};
use hypsketch_io::{JsonFacade, SceneSaver};
use tracing::{info, warn};

use crate::errors::FrontendError;
use crate::loader::{SceneSource, load_scene};

/// 简易 CLI 演示：加载场景（失败则回退到内置示例），通过命令总线
/// 演示交点、夹角与模型切换，打印场景概览并按配置保存。
pub fn run_demo(config: &AppConfig, model: Option<ModelKind>) -> Result<(), FrontendError> {
    let loaded = load_scene(config, model);
    let mut scene = loaded.scene;
    let command_bus = CommandBus::new();
    let mut commands: Vec<&str> = command_bus.available_commands().copied().collect();
    commands.sort_unstable();
    println!("支持的命令: {}", commands.join(", "));

    println!("Rust 版双曲几何 CLI 演示");
    match &loaded.source {
        SceneSource::Json(path) => println!("已从 JSON 加载场景：{}", path.display()),
        SceneSource::Demo => {
            if let Some(ids) = &loaded.demo_entities {
                describe_demo(ids);
            }
        }
    }

    {
        let mut context = CommandContext { scene: &mut scene };
        if let Some(ids) = &loaded.demo_entities {
            run_demo_script(&command_bus, ids, &mut context);
        }
    }

    info!(
        points = scene.point_count(),
        lines = scene.line_count(),
        model = scene.kind().name(),
        "CLI 演示场景统计"
    );
    for line in scene_summary(&scene) {
        println!("{line}");
    }

    if let Some(path) = &config.storage.save_path {
        JsonFacade::new().save(&scene.to_data(), path)?;
        info!(path = %path.display(), "场景已保存");
        println!("场景已保存到 {}", path.display());
    }
    Ok(())
}

fn describe_demo(ids: &DemoEntities) {
    println!("已构建内置示例测地线：");
    println!("  - 圆弧 A ID = {}", ids.arc_a.get());
    println!("  - 圆弧 B ID = {}", ids.arc_b.get());
    println!("  - 直径 ID = {}", ids.diameter.get());
    println!("  - 远端圆弧 ID = {}", ids.far_arc.get());
}

/// 在两种模型下分别求交点与夹角，再切回原模型。
fn run_demo_script(bus: &CommandBus, ids: &DemoEntities, context: &mut CommandContext<'_>) {
    let original = context.scene.kind();
    let other = match original {
        ModelKind::Disk => ModelKind::HalfPlane,
        ModelKind::HalfPlane => ModelKind::Disk,
    };
    let a = ids.arc_a.get().to_string();
    let b = ids.arc_b.get().to_string();
    let far = ids.far_arc.get().to_string();
    let (a, b, far) = (a.as_str(), b.as_str(), far.as_str());

    let script: [(&str, Vec<&str>); 7] = [
        ("intersect", vec![a, b]),
        ("angle", vec![a, b]),
        ("intersect", vec![a, far]),
        ("switch_model", vec![other.name()]),
        ("intersect", vec![a, b]),
        ("angle", vec![a, b]),
        ("switch_model", vec![original.name()]),
    ];
    for (name, args) in script {
        if let Err(err) = dispatch_cli_command(bus, name, &args, context) {
            warn!("CLI 命令执行失败: {err}");
        }
    }
}

fn dispatch_cli_command(
    bus: &CommandBus,
    name: &str,
    args: &[&str],
    context: &mut CommandContext<'_>,
) -> Result<(), String> {
    let request = CommandRequest::new(name, args);
    let response = bus.dispatch(&request, context);
    if response.success {
        if let Some(message) = response.message {
            println!("[命令] {name} {}: {message}", args.join(" "));
        }
        Ok(())
    } else {
        Err(response.message.unwrap_or_else(|| "未知错误".to_string()))
    }
}

/// 场景概览：模型参数、点、测地线，以及两两之间的交点与夹角。
pub fn scene_summary(scene: &Scene) -> Vec<String> {
    let ctx = scene.context();
    let mut out = vec![format!(
        "模型={}, 圆盘圆心={}, 半径={:.2}, 基线 y={:.2}",
        scene.kind().name(),
        format_point(ctx.disk_center()),
        ctx.disk_radius(),
        ctx.baseline_y()
    )];

    out.push(format!("点（共 {} 个）：", scene.point_count()));
    for (id, point) in scene.points() {
        out.push(format!("  - 点 #{} {}", id.get(), format_point(point.position())));
    }

    out.push(format!("测地线（共 {} 条）：", scene.line_count()));
    for (id, line) in scene.lines() {
        out.push(format!(
            "  - 测地线 #{}, 端点=#{}/#{}, 颜色={}, {}",
            id.get(),
            line.p1().get(),
            line.p2().get(),
            line.color(),
            describe_shape(line.shape())
        ));
    }

    let ids: Vec<_> = scene.lines().map(|(id, _)| id).collect();
    for (index, &a) in ids.iter().enumerate() {
        for &b in &ids[index + 1..] {
            let Ok(Some(hit)) = scene.intersection(a, b) else {
                continue;
            };
            let angle = scene.angle(a, b, hit).unwrap_or(0.0);
            out.push(format!(
                "  - #{} × #{} 交于 {}，夹角 {:.2}°",
                a.get(),
                b.get(),
                format_point(hit),
                angle.to_degrees()
            ));
        }
    }
    out
}

fn describe_shape(shape: &GeodesicShape) -> String {
    match shape {
        GeodesicShape::Disk(DiskGeodesic::Diameter { start, end }) => format!(
            "直径 {} → {}",
            format_point(*start),
            format_point(*end)
        ),
        GeodesicShape::Disk(DiskGeodesic::Arc { center, radius }) => {
            format!("正交圆弧 圆心={}, 半径={:.3}", format_point(*center), radius)
        }
        GeodesicShape::HalfPlane(HalfPlaneGeodesic::Vertical { x }) => {
            format!("竖直测地线 x={x:.3}")
        }
        GeodesicShape::HalfPlane(HalfPlaneGeodesic::Semicircle { center, radius }) => {
            format!("半圆 圆心={}, 半径={:.3}", format_point(*center), radius)
        }
    }
}

fn format_point(point: Point2) -> String {
    format!("({:.3}, {:.3})", point.x(), point.y())
}

#[cfg(test)]
mod tests {
    use hypsketch_core::model::ModelContext;

    use super::*;

    #[test]
    fn summary_lists_entities_and_crossings() {
        let mut scene = Scene::new(ModelContext::unit(), ModelKind::Disk);
        let ids = scene.populate_demo();
        let summary = scene_summary(&scene);

        assert!(summary[0].starts_with("模型=disk"));
        assert!(summary.iter().any(|line| line.contains("共 8 个")));
        assert!(summary.iter().any(|line| line.contains("直径")));
        let crossing = format!("#{} × #{}", ids.arc_a.get(), ids.arc_b.get());
        assert!(summary.iter().any(|line| line.contains(&crossing)));
        let missing = format!("#{} × #{}", ids.arc_a.get(), ids.far_arc.get());
        assert!(!summary.iter().any(|line| line.contains(&missing)));
    }

    #[test]
    fn demo_script_restores_original_model() {
        let mut scene = Scene::new(ModelContext::unit(), ModelKind::Disk);
        let ids = scene.populate_demo();
        let before: Vec<Point2> = scene.points().map(|(_, p)| p.position()).collect();

        let bus = CommandBus::new();
        let mut context = CommandContext { scene: &mut scene };
        run_demo_script(&bus, &ids, &mut context);

        assert_eq!(scene.kind(), ModelKind::Disk);
        for ((_, point), expected) in scene.points().zip(&before) {
            assert!(point.position().distance(*expected) < 1e-6);
        }
    }

    #[test]
    fn half_plane_shapes_are_described() {
        let vertical = GeodesicShape::HalfPlane(HalfPlaneGeodesic::Vertical { x: 1.5 });
        assert_eq!(describe_shape(&vertical), "竖直测地线 x=1.500");
    }
}
