//! 庞加莱圆盘模型中的测地线：过圆心的直径，或与边界圆正交的圆弧。

use std::f64::consts::PI;

use crate::geometry::{Point2, Vector2};
use crate::model::ModelContext;
use crate::shape::{circle_circle_candidates, line_circle_candidates};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiskGeodesic {
    /// 直径，端点已夹到边界圆上。
    Diameter { start: Point2, end: Point2 },
    /// 与边界圆正交、经过两端点的圆。
    Arc { center: Point2, radius: f64 },
}

impl DiskGeodesic {
    /// 由两端点计算测地线。
    ///
    /// 叉积接近零时视为直径：沿 `p1 -> p2` 方向求直线与边界圆的两个交点，
    /// 调用方需把 [`DiskGeodesic::snapped_endpoints`] 写回端点。
    pub fn through(p1: Point2, p2: Point2, ctx: &ModelContext) -> Self {
        let center = ctx.disk_center();
        let r = ctx.disk_radius();
        let a = center.vector_to(p1);
        let b = center.vector_to(p2);
        let (x1, y1, x2, y2) = (a.x(), a.y(), b.x(), b.y());

        let cross = x1 * y2 - y1 * x2;
        if cross.abs() < ctx.diameter_tolerance() {
            let angle = (y2 - y1).atan2(x2 - x1);
            let start = Point2::new(
                center.x() + r * (angle + PI).cos(),
                center.y() + r * (angle + PI).sin(),
            );
            let end = Point2::new(center.x() + r * angle.cos(), center.y() + r * angle.sin());
            return DiskGeodesic::Diameter { start, end };
        }

        let r2 = r * r;
        let d1 = x1 * x1 + y1 * y1;
        let d2 = x2 * x2 + y2 * y2;
        let denom = 2.0 * cross;
        let cx0 = (y2 * (d1 + r2) - y1 * (d2 + r2)) / denom;
        let cy0 = (x1 * (d2 + r2) - x2 * (d1 + r2)) / denom;
        let radius = (cx0 * cx0 + cy0 * cy0 - r2).max(0.0).sqrt();

        DiskGeodesic::Arc {
            center: center.translate(Vector2::new(cx0, cy0)),
            radius,
        }
    }

    #[inline]
    pub fn is_diameter(&self) -> bool {
        matches!(self, DiskGeodesic::Diameter { .. })
    }

    #[inline]
    pub fn center(&self) -> Option<Point2> {
        match self {
            DiskGeodesic::Arc { center, .. } => Some(*center),
            DiskGeodesic::Diameter { .. } => None,
        }
    }

    #[inline]
    pub fn radius(&self) -> Option<f64> {
        match self {
            DiskGeodesic::Arc { radius, .. } => Some(*radius),
            DiskGeodesic::Diameter { .. } => None,
        }
    }

    /// 直径情形为边界圆直径 `2R`，圆弧情形为所在圆的直径。
    pub fn diameter(&self) -> f64 {
        match self {
            DiskGeodesic::Diameter { start, end } => start.distance(*end),
            DiskGeodesic::Arc { radius, .. } => radius * 2.0,
        }
    }

    pub fn snapped_endpoints(&self) -> Option<(Point2, Point2)> {
        match self {
            DiskGeodesic::Diameter { start, end } => Some((*start, *end)),
            DiskGeodesic::Arc { .. } => None,
        }
    }

    pub fn tangent_at(&self, at: Point2) -> Vector2 {
        match self {
            DiskGeodesic::Diameter { start, end } => Vector2::from_points(*start, *end),
            DiskGeodesic::Arc { center, .. } => center.vector_to(at).perp(),
        }
    }

    /// 两条测地线在圆盘内部的交点；不相交（含“平行”）时返回 `None`。
    pub fn intersection(&self, other: &DiskGeodesic, ctx: &ModelContext) -> Option<Point2> {
        let candidates = match (self, other) {
            (DiskGeodesic::Diameter { .. }, DiskGeodesic::Diameter { .. }) => {
                return Some(ctx.disk_center());
            }
            (DiskGeodesic::Diameter { start, end }, DiskGeodesic::Arc { center, radius })
            | (DiskGeodesic::Arc { center, radius }, DiskGeodesic::Diameter { start, end }) => {
                line_circle_candidates(
                    ctx.disk_center(),
                    Vector2::from_points(*start, *end),
                    *center,
                    *radius,
                )?
            }
            (
                DiskGeodesic::Arc {
                    center: c1,
                    radius: r1,
                },
                DiskGeodesic::Arc {
                    center: c2,
                    radius: r2,
                },
            ) => circle_circle_candidates(*c1, *r1, *c2, *r2)?,
        };
        candidates
            .into_iter()
            .find(|candidate| ctx.contains_in_disk(*candidate))
    }
}
