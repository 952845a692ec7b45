use glam::DVec2;

use crate::disk::DiskGeodesic;
use crate::geometry::{Point2, Vector2};
use crate::half_plane::HalfPlaneGeodesic;
use crate::model::{ModelContext, ModelKind};

/// 按模型区分的测地线几何数据，由两端点坐标推导，不做持久化。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeodesicShape {
    Disk(DiskGeodesic),
    HalfPlane(HalfPlaneGeodesic),
}

impl GeodesicShape {
    pub fn compute(kind: ModelKind, p1: Point2, p2: Point2, ctx: &ModelContext) -> Self {
        match kind {
            ModelKind::Disk => GeodesicShape::Disk(DiskGeodesic::through(p1, p2, ctx)),
            ModelKind::HalfPlane => {
                GeodesicShape::HalfPlane(HalfPlaneGeodesic::through(p1, p2, ctx))
            }
        }
    }

    #[inline]
    pub fn kind(&self) -> ModelKind {
        match self {
            GeodesicShape::Disk(_) => ModelKind::Disk,
            GeodesicShape::HalfPlane(_) => ModelKind::HalfPlane,
        }
    }

    #[inline]
    pub fn as_disk(&self) -> Option<&DiskGeodesic> {
        match self {
            GeodesicShape::Disk(line) => Some(line),
            GeodesicShape::HalfPlane(_) => None,
        }
    }

    #[inline]
    pub fn as_half_plane(&self) -> Option<&HalfPlaneGeodesic> {
        match self {
            GeodesicShape::HalfPlane(line) => Some(line),
            GeodesicShape::Disk(_) => None,
        }
    }

    /// 直径测地线要求端点贴合边界圆，其余情形不修改端点。
    pub fn snapped_endpoints(&self) -> Option<(Point2, Point2)> {
        match self {
            GeodesicShape::Disk(line) => line.snapped_endpoints(),
            GeodesicShape::HalfPlane(_) => None,
        }
    }

    pub fn tangent_at(&self, at: Point2) -> Vector2 {
        match self {
            GeodesicShape::Disk(line) => line.tangent_at(at),
            GeodesicShape::HalfPlane(line) => line.tangent_at(at),
        }
    }

    /// 不同模型下的测地线没有公共交点。
    pub fn intersection(&self, other: &GeodesicShape, ctx: &ModelContext) -> Option<Point2> {
        match (self, other) {
            (GeodesicShape::Disk(a), GeodesicShape::Disk(b)) => a.intersection(b, ctx),
            (GeodesicShape::HalfPlane(a), GeodesicShape::HalfPlane(b)) => a.intersection(b, ctx),
            _ => None,
        }
    }

    /// 两条测地线在 `at` 处切向量的夹角，取值范围 `[0, π]`。
    pub fn angle_with(&self, other: &GeodesicShape, at: Point2) -> f64 {
        angle_between_tangents(self.tangent_at(at), other.tangent_at(at))
    }
}

pub fn angle_between_tangents(v1: Vector2, v2: Vector2) -> f64 {
    let magnitude = v1.length() * v2.length();
    if magnitude <= f64::EPSILON {
        return 0.0;
    }
    (v1.dot(v2) / magnitude).clamp(-1.0, 1.0).acos()
}

/// 直线 `origin + t·direction` 与圆的两个交点（相切时两点重合）。
pub(crate) fn line_circle_candidates(
    origin: Point2,
    direction: Vector2,
    center: Point2,
    radius: f64,
) -> Option<[Point2; 2]> {
    let length = direction.length();
    if length <= f64::EPSILON {
        return None;
    }
    let dir = direction.as_vec2() / length;
    let offset = origin.as_vec2() - center.as_vec2();
    let b = dir.dot(offset);
    let c = offset.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let at = |t: f64| Point2::from_vec(origin.as_vec2() + dir * t);
    Some([at(-b - root), at(-b + root)])
}

/// 两圆交点。同心、相离或内含时返回 `None`。
pub(crate) fn circle_circle_candidates(
    c1: Point2,
    r1: f64,
    c2: Point2,
    r2: f64,
) -> Option<[Point2; 2]> {
    let delta: DVec2 = c2.as_vec2() - c1.as_vec2();
    let d = delta.length();
    if d <= f64::EPSILON || d > r1 + r2 || d < (r1 - r2).abs() {
        return None;
    }
    let a = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
    let h = (r1 * r1 - a * a).max(0.0).sqrt();
    let unit = delta / d;
    let base = c1.as_vec2() + unit * a;
    let offset = unit.perp() * h;
    Some([
        Point2::from_vec(base + offset),
        Point2::from_vec(base - offset),
    ])
}
