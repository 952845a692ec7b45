use std::collections::{HashMap, HashSet, VecDeque};

use hypsketch_core::geometry::Point2;
use hypsketch_core::mobius;
use hypsketch_core::model::{ModelContext, ModelKind};
use hypsketch_core::observer::{Observers, SubscriptionId};
use hypsketch_core::point::{Point, PointId};
use hypsketch_core::shape::GeodesicShape;
use hypsketch_core::snapshot::{DEFAULT_LINE_COLOR, LineData, PointData, SceneData};
use tracing::{debug, warn};

use crate::errors::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(u64);

impl LineId {
    #[inline]
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// 场景中的测地线。端点以 `PointId` 引用，几何数据随端点变化同步重算。
#[derive(Debug)]
pub struct Geodesic {
    p1: PointId,
    p2: PointId,
    color: String,
    shape: GeodesicShape,
    observers: Observers,
}

impl Geodesic {
    #[inline]
    pub fn p1(&self) -> PointId {
        self.p1
    }

    #[inline]
    pub fn p2(&self) -> PointId {
        self.p2
    }

    #[inline]
    pub fn color(&self) -> &str {
        &self.color
    }

    #[inline]
    pub fn shape(&self) -> &GeodesicShape {
        &self.shape
    }

    #[inline]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    #[inline]
    fn touches(&self, point: PointId) -> bool {
        self.p1 == point || self.p2 == point
    }
}

/// 模型切换结果：成功变换的点数与停留在奇点处未变换的点。
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchReport {
    pub from: ModelKind,
    pub to: ModelKind,
    pub converted: usize,
    pub skipped: Vec<PointId>,
}

impl SwitchReport {
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// 端点吸附互相牵动时单条测地线的重算上限。
const MAX_RECOMPUTE_PASSES: usize = 8;

/// 演示场景：两条相交圆弧、一条直径、一条与前两者不相交的圆弧。
const DEMO_LINES: [((f64, f64), (f64, f64), &str); 4] = [
    ((-0.6, 0.2), (0.6, 0.3), "black"),
    ((0.1, -0.6), (0.25, 0.6), "blue"),
    ((0.4, 0.4), (-0.2, -0.2), "red"),
    ((0.5, -0.7), (-0.5, -0.7), "green"),
];

#[derive(Debug, Clone, Copy)]
pub struct DemoEntities {
    pub arc_a: LineId,
    pub arc_b: LineId,
    pub diameter: LineId,
    pub far_arc: LineId,
}

/// 单个模型实例的点与测地线集合。
///
/// 场景独占全部点与测地线，是唯一的修改入口；外部只拿到共享引用，
/// 并通过订阅回调感知变化。
#[derive(Debug)]
pub struct Scene {
    context: ModelContext,
    kind: ModelKind,
    points: Vec<(PointId, Point)>,
    lines: Vec<(LineId, Geodesic)>,
    next_point_id: u64,
    next_line_id: u64,
}

impl Scene {
    pub fn new(context: ModelContext, kind: ModelKind) -> Self {
        Self {
            context,
            kind,
            points: Vec::new(),
            lines: Vec::new(),
            next_point_id: 0,
            next_line_id: 0,
        }
    }

    #[inline]
    pub fn context(&self) -> &ModelContext {
        &self.context
    }

    #[inline]
    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn points(&self) -> impl Iterator<Item = (PointId, &Point)> + '_ {
        self.points.iter().map(|(id, point)| (*id, point))
    }

    pub fn point(&self, id: PointId) -> Option<&Point> {
        self.points
            .iter()
            .find_map(|(existing, point)| (*existing == id).then_some(point))
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn lines(&self) -> impl Iterator<Item = (LineId, &Geodesic)> + '_ {
        self.lines.iter().map(|(id, line)| (*id, line))
    }

    pub fn line(&self, id: LineId) -> Option<&Geodesic> {
        self.lines
            .iter()
            .find_map(|(existing, line)| (*existing == id).then_some(line))
    }

    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn add_point(&mut self, x: f64, y: f64) -> Result<PointId, EngineError> {
        ensure_finite(x, y)?;
        Ok(self.insert_point(Point::new(x, y)))
    }

    /// 移动点并同步重算所有以其为端点的测地线。
    pub fn move_point(&mut self, id: PointId, x: f64, y: f64) -> Result<(), EngineError> {
        ensure_finite(x, y)?;
        let point = self
            .point_mut(id)
            .ok_or(EngineError::PointNotFound(id.get()))?;
        point.set(x, y);
        let dirty: Vec<LineId> = self.lines_touching(id).collect();
        self.recompute_lines(dirty);
        Ok(())
    }

    pub fn subscribe_point(
        &mut self,
        id: PointId,
        callback: impl FnMut() + 'static,
    ) -> Result<SubscriptionId, EngineError> {
        let point = self
            .point_mut(id)
            .ok_or(EngineError::PointNotFound(id.get()))?;
        Ok(point.subscribe(callback))
    }

    pub fn unsubscribe_point(
        &mut self,
        id: PointId,
        subscription: SubscriptionId,
    ) -> Result<bool, EngineError> {
        let point = self
            .point_mut(id)
            .ok_or(EngineError::PointNotFound(id.get()))?;
        Ok(point.unsubscribe(subscription))
    }

    pub fn add_line(&mut self, p1: PointId, p2: PointId) -> Result<LineId, EngineError> {
        self.add_line_with_color(p1, p2, DEFAULT_LINE_COLOR)
    }

    /// 两个端点都必须属于当前场景。直径测地线会把端点吸附到边界圆上。
    pub fn add_line_with_color(
        &mut self,
        p1: PointId,
        p2: PointId,
        color: impl Into<String>,
    ) -> Result<LineId, EngineError> {
        let a = self
            .position(p1)
            .ok_or(EngineError::PointNotFound(p1.get()))?;
        let b = self
            .position(p2)
            .ok_or(EngineError::PointNotFound(p2.get()))?;

        let id = self.push_line(p1, a, p2, b, color);
        debug!(
            line = id.get(),
            p1 = p1.get(),
            p2 = p2.get(),
            model = self.kind.name(),
            "已添加测地线"
        );
        Ok(id)
    }

    pub fn subscribe_line(
        &mut self,
        id: LineId,
        callback: impl FnMut() + 'static,
    ) -> Result<SubscriptionId, EngineError> {
        let line = self
            .line_mut(id)
            .ok_or(EngineError::LineNotFound(id.get()))?;
        Ok(line.observers.subscribe(callback))
    }

    pub fn unsubscribe_line(
        &mut self,
        id: LineId,
        subscription: SubscriptionId,
    ) -> Result<bool, EngineError> {
        let line = self
            .line_mut(id)
            .ok_or(EngineError::LineNotFound(id.get()))?;
        Ok(line.observers.unsubscribe(subscription))
    }

    /// 删除测地线，并删除不再被其他测地线引用的端点。
    pub fn remove_line(&mut self, id: LineId) -> Result<(), EngineError> {
        let index = self
            .lines
            .iter()
            .position(|(existing, _)| *existing == id)
            .ok_or(EngineError::LineNotFound(id.get()))?;
        let (_, line) = self.lines.remove(index);

        let mut removed = Vec::new();
        for endpoint in [line.p1, line.p2] {
            let still_used = self.lines_touching(endpoint).next().is_some();
            if !still_used && self.remove_point(endpoint) {
                removed.push(endpoint.get());
            }
        }
        debug!(line = id.get(), removed_points = ?removed, "已删除测地线");
        Ok(())
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.lines.clear();
    }

    /// 切换模型：逐点做莫比乌斯变换，再按新模型重建全部测地线。
    ///
    /// 落在奇点上的点（圆盘的 `z = 1`、上半平面的 `z = −i`）保持原坐标，
    /// 记录在 [`SwitchReport::skipped`] 中。
    pub fn switch_model_type(&mut self, kind: ModelKind) -> SwitchReport {
        let from = self.kind;
        let mut report = SwitchReport {
            from,
            to: kind,
            converted: 0,
            skipped: Vec::new(),
        };
        if from == kind {
            return report;
        }

        let transform: fn(Point2, &ModelContext) -> Option<Point2> = match kind {
            ModelKind::HalfPlane => mobius::disk_to_half_plane,
            ModelKind::Disk => mobius::half_plane_to_disk,
        };
        for (id, point) in &mut self.points {
            match transform(point.position(), &self.context) {
                Some(mapped) => {
                    point.set_position(mapped);
                    report.converted += 1;
                }
                None => {
                    warn!(
                        point = id.get(),
                        x = point.x(),
                        y = point.y(),
                        "点位于变换奇点，保持原坐标"
                    );
                    report.skipped.push(*id);
                }
            }
        }

        self.kind = kind;
        let all: Vec<LineId> = self.lines.iter().map(|(id, _)| *id).collect();
        self.recompute_lines(all);
        debug!(
            from = from.name(),
            to = kind.name(),
            converted = report.converted,
            skipped = report.skipped.len(),
            "模型切换完成"
        );
        report
    }

    /// 两条测地线在当前模型内部的交点。
    pub fn intersection(&self, a: LineId, b: LineId) -> Result<Option<Point2>, EngineError> {
        let first = self.line(a).ok_or(EngineError::LineNotFound(a.get()))?;
        let second = self.line(b).ok_or(EngineError::LineNotFound(b.get()))?;
        Ok(first.shape.intersection(&second.shape, &self.context))
    }

    pub fn angle(&self, a: LineId, b: LineId, at: Point2) -> Result<f64, EngineError> {
        let first = self.line(a).ok_or(EngineError::LineNotFound(a.get()))?;
        let second = self.line(b).ok_or(EngineError::LineNotFound(b.get()))?;
        Ok(first.shape.angle_with(&second.shape, at))
    }

    pub fn to_data(&self) -> SceneData {
        let index: HashMap<PointId, usize> = self
            .points
            .iter()
            .enumerate()
            .map(|(position, (id, _))| (*id, position))
            .collect();
        let lines = self
            .lines
            .iter()
            .filter_map(|(_, line)| {
                Some(LineData {
                    p1_index: *index.get(&line.p1)?,
                    p2_index: *index.get(&line.p2)?,
                    color: line.color.clone(),
                })
            })
            .collect();

        SceneData {
            unit_circle_center: PointData::from(self.context.disk_center()),
            unit_circle_radius: self.context.disk_radius(),
            points: self.points.iter().map(|(_, point)| point.to_data()).collect(),
            lines,
            scene_type: Some(self.kind),
        }
    }

    /// 用持久化数据替换当前场景：先恢复点，再按声明顺序恢复测地线。
    ///
    /// 数据校验失败时当前场景保持不变。缺少 `sceneType` 时沿用当前模型。
    /// 圆盘参数取自数据，基线按 [`ModelContext::relocated`] 的规则随之调整。
    pub fn load_data(&mut self, data: &SceneData) -> Result<(), EngineError> {
        data.validate().map_err(EngineError::InvalidSceneData)?;

        let context = self
            .context
            .relocated(data.unit_circle_center.into(), data.unit_circle_radius);
        let mut fresh = Scene::new(context, data.scene_type.unwrap_or(self.kind));
        fresh.next_point_id = self.next_point_id;
        fresh.next_line_id = self.next_line_id;

        let ids: Vec<PointId> = data
            .points
            .iter()
            .map(|point| fresh.insert_point(Point::from_data(point)))
            .collect();
        for (index, line) in data.lines.iter().enumerate() {
            let (Some(p1), Some(p2)) = (ids.get(line.p1_index), ids.get(line.p2_index)) else {
                return Err(EngineError::InvalidSceneData(format!(
                    "lines[{index}] 引用了不存在的点"
                )));
            };
            fresh.add_line_with_color(*p1, *p2, line.color.clone())?;
        }

        debug!(
            points = fresh.point_count(),
            lines = fresh.line_count(),
            model = fresh.kind.name(),
            "已加载场景数据"
        );
        *self = fresh;
        Ok(())
    }

    /// 为 CLI / 快速验证构建一组示例测地线，返回关键测地线 ID。
    ///
    /// 坐标按圆盘模型给出；当前为上半平面模型时构建后再整体变换过去。
    pub fn populate_demo(&mut self) -> DemoEntities {
        let target = self.kind;
        self.clear();
        self.kind = ModelKind::Disk;

        let center = self.context.disk_center();
        let r = self.context.disk_radius();
        let at = |(fx, fy): (f64, f64)| Point2::new(center.x() + fx * r, center.y() + fy * r);

        let [arc_a, arc_b, diameter, far_arc] = DEMO_LINES.map(|(start, end, color)| {
            let (a, b) = (at(start), at(end));
            let p1 = self.insert_point(Point::new(a.x(), a.y()));
            let p2 = self.insert_point(Point::new(b.x(), b.y()));
            self.push_line(p1, a, p2, b, color)
        });
        let ids = DemoEntities {
            arc_a,
            arc_b,
            diameter,
            far_arc,
        };

        if target != ModelKind::Disk {
            self.switch_model_type(target);
        }

        debug!(
            arc_a = ids.arc_a.get(),
            arc_b = ids.arc_b.get(),
            diameter = ids.diameter.get(),
            far_arc = ids.far_arc.get(),
            "已创建演示测地线"
        );
        ids
    }

    fn push_line(
        &mut self,
        p1: PointId,
        a: Point2,
        p2: PointId,
        b: Point2,
        color: impl Into<String>,
    ) -> LineId {
        let id = LineId(self.next_line_id);
        self.next_line_id += 1;
        let shape = GeodesicShape::compute(self.kind, a, b, &self.context);
        self.lines.push((
            id,
            Geodesic {
                p1,
                p2,
                color: color.into(),
                shape,
                observers: Observers::new(),
            },
        ));
        if shape.snapped_endpoints().is_some() {
            self.recompute_lines([id]);
        }
        id
    }

    fn insert_point(&mut self, point: Point) -> PointId {
        let id = PointId::new(self.next_point_id);
        self.next_point_id += 1;
        self.points.push((id, point));
        id
    }

    fn remove_point(&mut self, id: PointId) -> bool {
        let before = self.points.len();
        self.points.retain(|(existing, _)| *existing != id);
        self.points.len() != before
    }

    fn point_mut(&mut self, id: PointId) -> Option<&mut Point> {
        self.points
            .iter_mut()
            .find_map(|(existing, point)| (*existing == id).then_some(point))
    }

    fn line_mut(&mut self, id: LineId) -> Option<&mut Geodesic> {
        self.lines
            .iter_mut()
            .find_map(|(existing, line)| (*existing == id).then_some(line))
    }

    fn position(&self, id: PointId) -> Option<Point2> {
        self.point(id).map(Point::position)
    }

    fn lines_touching(&self, point: PointId) -> impl Iterator<Item = LineId> + '_ {
        self.lines
            .iter()
            .filter(move |(_, line)| line.touches(point))
            .map(|(id, _)| *id)
    }

    /// 重算一批测地线。
    ///
    /// 直径吸附会改写端点，共享这些端点的其他测地线（包括本次已重算过的）
    /// 重新入队。吸附目标与当前位置相差不超过边界容差时不再改写，
    /// 单条测地线在一次调用中至多重算 [`MAX_RECOMPUTE_PASSES`] 次。
    fn recompute_lines(&mut self, dirty: impl IntoIterator<Item = LineId>) {
        let mut queue: VecDeque<LineId> = VecDeque::new();
        let mut queued: HashSet<LineId> = HashSet::new();
        for id in dirty {
            if queued.insert(id) {
                queue.push_back(id);
            }
        }
        let mut passes: HashMap<LineId, usize> = HashMap::new();
        let tolerance = self.context.boundary_tolerance();

        while let Some(id) = queue.pop_front() {
            queued.remove(&id);
            let count = passes.entry(id).or_insert(0);
            if *count >= MAX_RECOMPUTE_PASSES {
                warn!(line = id.get(), "测地线重算次数超限，端点吸附未收敛");
                continue;
            }
            *count += 1;

            let Some((p1, p2)) = self.line(id).map(|line| (line.p1, line.p2)) else {
                continue;
            };
            let (Some(a), Some(b)) = (self.position(p1), self.position(p2)) else {
                continue;
            };

            let shape = GeodesicShape::compute(self.kind, a, b, &self.context);
            if let Some((start, end)) = shape.snapped_endpoints() {
                for (endpoint, target) in [(p1, start), (p2, end)] {
                    let settled = self
                        .position(endpoint)
                        .is_some_and(|current| current.distance(target) <= tolerance);
                    if settled {
                        continue;
                    }
                    if let Some(point) = self.point_mut(endpoint) {
                        point.set_position(target);
                    }
                    let neighbours: Vec<LineId> = self
                        .lines_touching(endpoint)
                        .filter(|other| *other != id)
                        .collect();
                    for other in neighbours {
                        if queued.insert(other) {
                            queue.push_back(other);
                        }
                    }
                }
            }

            if let Some(line) = self.line_mut(id) {
                line.shape = shape;
                line.observers.notify();
            }
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(ModelContext::default(), ModelKind::default())
    }
}

fn ensure_finite(x: f64, y: f64) -> Result<(), EngineError> {
    if x.is_finite() && y.is_finite() {
        Ok(())
    } else {
        Err(EngineError::NonFiniteCoordinate { x, y })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::f64::consts::PI;
    use std::rc::Rc;

    use hypsketch_core::disk::DiskGeodesic;

    use super::*;

    fn unit_scene() -> Scene {
        Scene::new(ModelContext::unit(), ModelKind::Disk)
    }

    fn counter() -> (Rc<Cell<usize>>, impl FnMut() + 'static) {
        let hits = Rc::new(Cell::new(0));
        let handle = Rc::clone(&hits);
        (hits, move || handle.set(handle.get() + 1))
    }

    fn crossing_pair(scene: &mut Scene) -> (LineId, LineId) {
        let a1 = scene.add_point(-0.5, 0.1).unwrap();
        let a2 = scene.add_point(0.5, 0.2).unwrap();
        let b1 = scene.add_point(0.1, -0.5).unwrap();
        let b2 = scene.add_point(0.2, 0.5).unwrap();
        let a = scene.add_line(a1, a2).unwrap();
        let b = scene.add_line(b1, b2).unwrap();
        (a, b)
    }

    /// 夹角与其补角中较小者，消除切向量方向约定带来的差异。
    fn acute(angle: f64) -> f64 {
        angle.min(PI - angle)
    }

    #[test]
    fn add_point_and_line_register_entities() {
        let mut scene = unit_scene();
        let p1 = scene.add_point(0.2, 0.3).unwrap();
        let p2 = scene.add_point(-0.4, 0.1).unwrap();
        let line = scene.add_line(p1, p2).expect("points belong to scene");

        assert_eq!(scene.point_count(), 2);
        assert_eq!(scene.line_count(), 1);
        let geodesic = scene.line(line).expect("line registered");
        assert_eq!(geodesic.p1(), p1);
        assert_eq!(geodesic.p2(), p2);
        assert_eq!(geodesic.color(), DEFAULT_LINE_COLOR);
        let disk = geodesic.shape().as_disk().expect("disk model");
        assert!(!disk.is_diameter());
    }

    #[test]
    fn add_line_rejects_foreign_points() {
        let mut scene = unit_scene();
        let p1 = scene.add_point(0.2, 0.3).unwrap();
        let foreign = PointId::new(9_999);
        let err = scene.add_line(p1, foreign).unwrap_err();
        assert!(matches!(err, EngineError::PointNotFound(9_999)));
        assert_eq!(scene.line_count(), 0);
    }

    #[test]
    fn add_point_rejects_non_finite_coordinates() {
        let mut scene = unit_scene();
        let err = scene.add_point(f64::NAN, 0.0).unwrap_err();
        assert!(matches!(err, EngineError::NonFiniteCoordinate { .. }));
        assert_eq!(scene.point_count(), 0);
    }

    #[test]
    fn diameter_snaps_endpoints_and_notifies_them() {
        let mut scene = unit_scene();
        let p1 = scene.add_point(0.5, 0.0).unwrap();
        let p2 = scene.add_point(-0.5, 0.0).unwrap();
        let (hits, callback) = counter();
        scene.subscribe_point(p1, callback).unwrap();

        let line = scene.add_line(p1, p2).unwrap();
        let disk = scene.line(line).unwrap().shape().as_disk().copied().unwrap();
        assert!(disk.is_diameter());
        assert!(disk.center().is_none() && disk.radius().is_none());

        let start = scene.point(p1).unwrap().position();
        let end = scene.point(p2).unwrap().position();
        assert!((start.x() - 1.0).abs() < 1e-12 && start.y().abs() < 1e-12);
        assert!((end.x() + 1.0).abs() < 1e-12 && end.y().abs() < 1e-12);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn moving_endpoint_recomputes_geodesic_and_notifies_once() {
        let mut scene = unit_scene();
        let p1 = scene.add_point(0.2, 0.3).unwrap();
        let p2 = scene.add_point(-0.4, 0.1).unwrap();
        let line = scene.add_line(p1, p2).unwrap();
        let (line_hits, line_cb) = counter();
        let (point_hits, point_cb) = counter();
        scene.subscribe_line(line, line_cb).unwrap();
        scene.subscribe_point(p2, point_cb).unwrap();

        let before = *scene.line(line).unwrap().shape();
        scene.move_point(p2, -0.1, 0.6).unwrap();
        let after = *scene.line(line).unwrap().shape();

        assert_ne!(before, after);
        assert_eq!(line_hits.get(), 1);
        assert_eq!(point_hits.get(), 1);

        let arc = after.as_disk().unwrap();
        let center = arc.center().unwrap();
        let radius = arc.radius().unwrap();
        assert!((center.distance(Point2::new(-0.1, 0.6)) - radius).abs() < 1e-9);
        assert!((center.as_vec2().length_squared() - (radius * radius + 1.0)).abs() < 1e-9);
    }

    #[test]
    fn move_point_validates_input() {
        let mut scene = unit_scene();
        let p = scene.add_point(0.1, 0.1).unwrap();
        assert!(matches!(
            scene.move_point(PointId::new(42), 0.0, 0.0),
            Err(EngineError::PointNotFound(42))
        ));
        assert!(matches!(
            scene.move_point(p, f64::INFINITY, 0.0),
            Err(EngineError::NonFiniteCoordinate { .. })
        ));
        assert_eq!(scene.point(p).unwrap().x(), 0.1);
    }

    #[test]
    fn unsubscribed_line_observer_is_silent() {
        let mut scene = unit_scene();
        let p1 = scene.add_point(0.2, 0.3).unwrap();
        let p2 = scene.add_point(-0.4, 0.1).unwrap();
        let line = scene.add_line(p1, p2).unwrap();
        let (hits, callback) = counter();
        let subscription = scene.subscribe_line(line, callback).unwrap();

        assert!(scene.unsubscribe_line(line, subscription).unwrap());
        scene.move_point(p1, 0.3, 0.3).unwrap();
        assert_eq!(hits.get(), 0);
        assert_eq!(scene.line(line).unwrap().observer_count(), 0);
    }

    #[test]
    fn remove_line_cascades_to_unshared_endpoints() {
        let mut scene = unit_scene();
        let p1 = scene.add_point(0.2, 0.3).unwrap();
        let p2 = scene.add_point(-0.4, 0.1).unwrap();
        let keep = scene.add_point(0.6, -0.2).unwrap();
        let removed = scene.add_line(p1, p2).unwrap();
        let survivor = scene.add_line(p2, keep).unwrap();

        scene.remove_line(removed).unwrap();
        assert!(scene.point(p1).is_none());
        assert!(scene.point(p2).is_some(), "shared endpoint must survive");
        assert!(scene.line(survivor).is_some());

        scene.remove_line(survivor).unwrap();
        assert_eq!(scene.point_count(), 0);
        let data = scene.to_data();
        assert!(data.points.is_empty());
        assert!(data.lines.is_empty());

        assert!(matches!(
            scene.remove_line(survivor),
            Err(EngineError::LineNotFound(_))
        ));
    }

    #[test]
    fn clear_empties_scene() {
        let mut scene = unit_scene();
        crossing_pair(&mut scene);
        scene.clear();
        assert_eq!(scene.point_count(), 0);
        assert_eq!(scene.line_count(), 0);
    }

    #[test]
    fn intersection_and_angle_are_symmetric() {
        let mut scene = unit_scene();
        let (a, b) = crossing_pair(&mut scene);
        let ab = scene.intersection(a, b).unwrap().expect("lines cross");
        let ba = scene.intersection(b, a).unwrap().expect("lines cross");
        assert!(ab.distance(ba) < 1e-9);

        let angle_ab = scene.angle(a, b, ab).unwrap();
        let angle_ba = scene.angle(b, a, ab).unwrap();
        assert!((angle_ab - angle_ba).abs() < 1e-12);
        assert!((0.0..=PI).contains(&angle_ab));

        assert!(matches!(
            scene.intersection(a, LineId::new(77)),
            Err(EngineError::LineNotFound(77))
        ));
    }

    #[test]
    fn data_round_trip_preserves_points_and_lines() {
        let mut scene = unit_scene();
        let p1 = scene.add_point(0.2, 0.3).unwrap();
        let p2 = scene.add_point(-0.4, 0.1).unwrap();
        let p3 = scene.add_point(0.1, -0.6).unwrap();
        scene.add_line_with_color(p1, p2, "red").unwrap();
        scene.add_line(p2, p3).unwrap();

        let data = scene.to_data();
        let mut restored = Scene::new(ModelContext::unit(), ModelKind::Disk);
        restored.load_data(&data).expect("valid data");
        let again = restored.to_data();

        assert_eq!(again.points, data.points);
        assert_eq!(again.lines, data.lines);
        assert_eq!(again.lines[0].color, "red");
        assert_eq!((again.lines[1].p1_index, again.lines[1].p2_index), (1, 2));
    }

    #[test]
    fn failed_load_leaves_scene_untouched() {
        let mut scene = unit_scene();
        crossing_pair(&mut scene);
        let before = scene.to_data();

        let mut broken = before.clone();
        broken.lines[0].p2_index = 99;
        let err = scene.load_data(&broken).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSceneData(_)));
        assert_eq!(scene.to_data(), before);
    }

    #[test]
    fn load_adopts_scene_type_when_present() {
        let mut scene = unit_scene();
        crossing_pair(&mut scene);
        let mut data = scene.to_data();
        data.scene_type = Some(ModelKind::HalfPlane);

        let mut other = unit_scene();
        other.load_data(&data).unwrap();
        assert_eq!(other.kind(), ModelKind::HalfPlane);
        assert!(other.lines().all(|(_, line)| line.shape().as_half_plane().is_some()));

        data.scene_type = None;
        let mut keeps = unit_scene();
        keeps.load_data(&data).unwrap();
        assert_eq!(keeps.kind(), ModelKind::Disk);
    }

    #[test]
    fn switch_to_same_model_is_noop() {
        let mut scene = unit_scene();
        let p = scene.add_point(0.3, 0.3).unwrap();
        let report = scene.switch_model_type(ModelKind::Disk);
        assert!(report.is_noop());
        assert_eq!(report.converted, 0);
        assert_eq!(scene.point(p).unwrap().x(), 0.3);
    }

    #[test]
    fn switching_models_round_trips_points() {
        let mut scene = Scene::new(
            ModelContext::new(Point2::new(400.0, 300.0), 250.0),
            ModelKind::Disk,
        );
        let (a, _) = crossing_pair_scaled(&mut scene);
        let original: Vec<Point2> = scene.points().map(|(_, p)| p.position()).collect();
        let (hits, callback) = counter();
        scene.subscribe_line(a, callback).unwrap();

        let report = scene.switch_model_type(ModelKind::HalfPlane);
        assert_eq!(report.converted, original.len());
        assert!(report.skipped.is_empty());
        assert_eq!(scene.kind(), ModelKind::HalfPlane);
        assert_eq!(hits.get(), 1);
        for (_, point) in scene.points() {
            assert!(scene.context().contains_in_half_plane(point.position()));
        }
        for (_, line) in scene.lines() {
            let semicircle = line.shape().as_half_plane().expect("half-plane shape");
            if let Some(center) = semicircle.center() {
                assert!((center.y() - scene.context().baseline_y()).abs() < 1e-9);
            }
        }

        scene.switch_model_type(ModelKind::Disk);
        for ((_, point), expected) in scene.points().zip(&original) {
            assert!(point.position().distance(*expected) < 1e-6);
        }
    }

    fn crossing_pair_scaled(scene: &mut Scene) -> (LineId, LineId) {
        let c = scene.context().disk_center();
        let r = scene.context().disk_radius();
        let mut at = |fx: f64, fy: f64| scene.add_point(c.x() + fx * r, c.y() + fy * r).unwrap();
        let a1 = at(-0.5, 0.1);
        let a2 = at(0.5, 0.2);
        let b1 = at(0.1, -0.5);
        let b2 = at(0.2, 0.5);
        let a = scene.add_line(a1, a2).unwrap();
        let b = scene.add_line(b1, b2).unwrap();
        (a, b)
    }

    #[test]
    fn switching_models_preserves_intersection_angle() {
        let mut scene = unit_scene();
        let (a, b) = crossing_pair(&mut scene);
        let hit = scene.intersection(a, b).unwrap().expect("disk intersection");
        let disk_angle = scene.angle(a, b, hit).unwrap();

        scene.switch_model_type(ModelKind::HalfPlane);
        let mapped = mobius::disk_to_half_plane(hit, scene.context()).unwrap();
        let plane_hit = scene
            .intersection(a, b)
            .unwrap()
            .expect("half-plane intersection");
        assert!(plane_hit.distance(mapped) < 1e-6);

        let plane_angle = scene.angle(a, b, plane_hit).unwrap();
        assert!((acute(disk_angle) - acute(plane_angle)).abs() < 1e-6);
    }

    #[test]
    fn singular_point_is_left_in_place() {
        let mut scene = unit_scene();
        let singular = scene.add_point(1.0, 0.0).unwrap();
        let regular = scene.add_point(0.0, 0.0).unwrap();

        let report = scene.switch_model_type(ModelKind::HalfPlane);
        assert_eq!(report.skipped, vec![singular]);
        assert_eq!(report.converted, 1);
        assert_eq!(scene.point(singular).unwrap().position(), Point2::new(1.0, 0.0));
        let apex = scene.point(regular).unwrap().position();
        assert!((apex.y() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn demo_population_creates_entities() {
        let mut scene = Scene::new(
            ModelContext::new(Point2::new(400.0, 300.0), 250.0),
            ModelKind::Disk,
        );
        let ids = scene.populate_demo();
        assert_eq!(scene.line_count(), 4);
        assert_eq!(scene.point_count(), 8);
        assert!(scene.intersection(ids.arc_a, ids.arc_b).unwrap().is_some());
        assert!(scene.intersection(ids.arc_a, ids.far_arc).unwrap().is_none());
        let diameter = scene.line(ids.diameter).unwrap().shape().as_disk().unwrap();
        assert!(diameter.is_diameter());
    }

    #[test]
    fn demo_population_honours_half_plane_model() {
        let mut scene = Scene::new(
            ModelContext::new(Point2::new(400.0, 300.0), 250.0),
            ModelKind::HalfPlane,
        );
        let ids = scene.populate_demo();
        assert_eq!(scene.kind(), ModelKind::HalfPlane);
        assert!(scene.intersection(ids.arc_a, ids.arc_b).unwrap().is_some());
    }

    #[test]
    fn diameter_snap_refreshes_arc_sharing_endpoint() {
        let mut scene = unit_scene();
        let p0 = scene.add_point(0.3, 0.5).unwrap();
        let p1 = scene.add_point(0.5, 0.0).unwrap();
        let p2 = scene.add_point(-0.5, 0.0).unwrap();
        let arc = scene.add_line(p0, p1).unwrap();
        let diameter = scene.add_line(p1, p2).unwrap();

        scene.move_point(p1, 0.6, 0.0).unwrap();

        let snapped = scene.point(p1).unwrap().position();
        assert!((snapped.x() - 1.0).abs() < 1e-12 && snapped.y().abs() < 1e-12);
        assert!(scene.line(diameter).unwrap().shape().as_disk().unwrap().is_diameter());

        let stored = *scene.line(arc).unwrap().shape().as_disk().unwrap();
        let fresh = DiskGeodesic::through(
            scene.point(p0).unwrap().position(),
            snapped,
            scene.context(),
        );
        let center = stored.center().expect("arc");
        let radius = stored.radius().expect("arc");
        assert!(center.distance(fresh.center().unwrap()) < 1e-9);
        assert!((center.distance(snapped) - radius).abs() < 1e-9);
        assert!((center.distance(scene.point(p0).unwrap().position()) - radius).abs() < 1e-9);
    }

    #[test]
    fn shared_diameter_endpoints_settle_after_switch_round_trip() {
        let mut scene = unit_scene();
        let p0 = scene.add_point(0.3, -0.5).unwrap();
        let p1 = scene.add_point(0.3, 0.4).unwrap();
        let p2 = scene.add_point(-0.3, -0.4).unwrap();
        let arc = scene.add_line(p0, p1).unwrap();
        let diameter = scene.add_line(p2, p1).unwrap();
        assert!(scene.line(diameter).unwrap().shape().as_disk().unwrap().is_diameter());

        scene.switch_model_type(ModelKind::HalfPlane);
        scene.switch_model_type(ModelKind::Disk);

        let stored = *scene.line(arc).unwrap().shape().as_disk().unwrap();
        let center = stored.center().expect("arc");
        let radius = stored.radius().expect("arc");
        for endpoint in [p0, p1] {
            let position = scene.point(endpoint).unwrap().position();
            assert!((center.distance(position) - radius).abs() < 1e-6);
        }
    }

    #[test]
    fn load_rederives_baseline_for_loaded_disk() {
        let mut source = Scene::new(
            ModelContext::new(Point2::new(400.0, 300.0), 250.0),
            ModelKind::Disk,
        );
        crossing_pair_scaled(&mut source);
        let data = source.to_data();

        let mut scene = Scene::default();
        scene.load_data(&data).unwrap();
        assert_eq!(scene.context().disk_center(), Point2::new(400.0, 300.0));
        assert!((scene.context().baseline_y() - 400.0).abs() < 1e-9);

        let pinned = ModelContext::with_page_height(Point2::new(0.0, 0.0), 1.0, 3.0);
        let mut explicit = Scene::new(pinned, ModelKind::Disk);
        explicit.load_data(&data).unwrap();
        assert!((explicit.context().baseline_y() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn switch_fires_point_observers_once_per_direction() {
        let mut scene = unit_scene();
        let (a, _) = crossing_pair(&mut scene);
        let endpoint = scene.line(a).unwrap().p1();
        let lonely = scene.add_point(-0.2, -0.3).unwrap();
        let (endpoint_hits, endpoint_cb) = counter();
        let (lonely_hits, lonely_cb) = counter();
        scene.subscribe_point(endpoint, endpoint_cb).unwrap();
        scene.subscribe_point(lonely, lonely_cb).unwrap();

        scene.switch_model_type(ModelKind::HalfPlane);
        assert_eq!(endpoint_hits.get(), 1);
        assert_eq!(lonely_hits.get(), 1);

        scene.switch_model_type(ModelKind::Disk);
        assert_eq!(endpoint_hits.get(), 2);
        assert_eq!(lonely_hits.get(), 2);

        scene.switch_model_type(ModelKind::Disk);
        assert_eq!(endpoint_hits.get(), 2);
    }
}
