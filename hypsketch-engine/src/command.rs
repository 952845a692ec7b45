use std::collections::HashMap;
use std::str::FromStr;

use hypsketch_core::geometry::Point2;
use hypsketch_core::model::ModelKind;
use hypsketch_core::point::PointId;

use crate::scene::{LineId, Scene};

#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub name: String,
    pub args: Vec<String>,
}

impl CommandRequest {
    pub fn new(name: impl Into<String>, args: &[&str]) -> Self {
        Self {
            name: name.into(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandResponse {
    pub success: bool,
    pub message: Option<String>,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse;
}

pub struct CommandContext<'a> {
    pub scene: &'a mut Scene,
}

pub struct CommandBus {
    handlers: HashMap<&'static str, Box<dyn CommandHandler>>,
}

impl CommandBus {
    pub fn new() -> Self {
        let mut bus = Self {
            handlers: HashMap::new(),
        };
        bus.register(AddPointCommand);
        bus.register(MovePointCommand);
        bus.register(AddLineCommand);
        bus.register(RemoveLineCommand);
        bus.register(SwitchModelCommand);
        bus.register(ClearCommand);
        bus.register(IntersectCommand);
        bus.register(AngleCommand);
        bus
    }

    pub fn register<H: CommandHandler + 'static>(&mut self, handler: H) {
        self.handlers.insert(handler.name(), Box::new(handler));
    }

    pub fn dispatch(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        if let Some(handler) = self.handlers.get(request.name.as_str()) {
            handler.execute(request, context)
        } else {
            CommandResponse::err(format!("未知命令: {}", request.name))
        }
    }

    pub fn available_commands(&self) -> impl Iterator<Item = &&'static str> {
        self.handlers.keys()
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

/// 按位置取参数并解析，失败时给出可直接返回的错误响应。
fn arg<T: FromStr>(request: &CommandRequest, index: usize, label: &str) -> Result<T, CommandResponse> {
    let raw = request
        .args
        .get(index)
        .ok_or_else(|| CommandResponse::err(format!("{} 缺少参数 {label}", request.name)))?;
    raw.parse()
        .map_err(|_| CommandResponse::err(format!("{} 的参数 {label} 无效: {raw}", request.name)))
}

macro_rules! try_arg {
    ($request:expr, $index:expr, $label:expr) => {
        match arg($request, $index, $label) {
            Ok(value) => value,
            Err(response) => return response,
        }
    };
}

struct AddPointCommand;

impl CommandHandler for AddPointCommand {
    fn name(&self) -> &'static str {
        "add_point"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let x: f64 = try_arg!(request, 0, "x");
        let y: f64 = try_arg!(request, 1, "y");
        match context.scene.add_point(x, y) {
            Ok(id) => CommandResponse::ok(format!("已添加点 #{}", id.get())),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct MovePointCommand;

impl CommandHandler for MovePointCommand {
    fn name(&self) -> &'static str {
        "move_point"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let id: u64 = try_arg!(request, 0, "id");
        let x: f64 = try_arg!(request, 1, "x");
        let y: f64 = try_arg!(request, 2, "y");
        match context.scene.move_point(PointId::new(id), x, y) {
            Ok(()) => CommandResponse::ok(format!("点 #{id} 已移动到 ({x}, {y})")),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct AddLineCommand;

impl CommandHandler for AddLineCommand {
    fn name(&self) -> &'static str {
        "add_line"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let p1: u64 = try_arg!(request, 0, "p1");
        let p2: u64 = try_arg!(request, 1, "p2");
        let result = match request.args.get(2) {
            Some(color) => {
                context
                    .scene
                    .add_line_with_color(PointId::new(p1), PointId::new(p2), color.as_str())
            }
            None => context.scene.add_line(PointId::new(p1), PointId::new(p2)),
        };
        match result {
            Ok(id) => CommandResponse::ok(format!("已添加测地线 #{}", id.get())),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct RemoveLineCommand;

impl CommandHandler for RemoveLineCommand {
    fn name(&self) -> &'static str {
        "remove_line"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let id: u64 = try_arg!(request, 0, "id");
        match context.scene.remove_line(LineId::new(id)) {
            Ok(()) => CommandResponse::ok(format!("已删除测地线 #{id}")),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct SwitchModelCommand;

impl CommandHandler for SwitchModelCommand {
    fn name(&self) -> &'static str {
        "switch_model"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let raw: String = try_arg!(request, 0, "model");
        let Some(kind) = ModelKind::parse(&raw) else {
            return CommandResponse::err(format!("未知模型: {raw}"));
        };
        let report = context.scene.switch_model_type(kind);
        if report.is_noop() {
            return CommandResponse::ok(format!("当前已是 {} 模型", kind.name()));
        }
        let mut message = format!(
            "已切换到 {} 模型，变换 {} 个点",
            kind.name(),
            report.converted
        );
        if !report.skipped.is_empty() {
            message.push_str(&format!("，{} 个点位于奇点未变换", report.skipped.len()));
        }
        CommandResponse::ok(message)
    }
}

struct ClearCommand;

impl CommandHandler for ClearCommand {
    fn name(&self) -> &'static str {
        "clear"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        context.scene.clear();
        CommandResponse::ok("场景已清空")
    }
}

struct IntersectCommand;

impl CommandHandler for IntersectCommand {
    fn name(&self) -> &'static str {
        "intersect"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let a: u64 = try_arg!(request, 0, "a");
        let b: u64 = try_arg!(request, 1, "b");
        match context.scene.intersection(LineId::new(a), LineId::new(b)) {
            Ok(Some(point)) => {
                CommandResponse::ok(format!("交点 ({:.6}, {:.6})", point.x(), point.y()))
            }
            Ok(None) => CommandResponse::ok(format!("测地线 #{a} 与 #{b} 不相交")),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

/// `angle a b [x y]`：省略坐标时取两条测地线的交点。
struct AngleCommand;

impl CommandHandler for AngleCommand {
    fn name(&self) -> &'static str {
        "angle"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let a = LineId::new(try_arg!(request, 0, "a"));
        let b = LineId::new(try_arg!(request, 1, "b"));
        let at = if request.args.len() >= 4 {
            Point2::new(try_arg!(request, 2, "x"), try_arg!(request, 3, "y"))
        } else {
            match context.scene.intersection(a, b) {
                Ok(Some(point)) => point,
                Ok(None) => {
                    return CommandResponse::err(format!(
                        "测地线 #{} 与 #{} 不相交，需显式给出坐标",
                        a.get(),
                        b.get()
                    ));
                }
                Err(err) => return CommandResponse::err(err.to_string()),
            }
        };
        match context.scene.angle(a, b, at) {
            Ok(angle) => CommandResponse::ok(format!(
                "夹角 {:.6} rad（{:.3}°）",
                angle,
                angle.to_degrees()
            )),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}
