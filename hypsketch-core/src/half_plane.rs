//! 上半平面模型中的测地线：竖直射线，或圆心落在基线上的半圆。

use crate::geometry::{Point2, Vector2};
use crate::model::ModelContext;
use crate::shape::circle_circle_candidates;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HalfPlaneGeodesic {
    Vertical { x: f64 },
    Semicircle { center: Point2, radius: f64 },
}

impl HalfPlaneGeodesic {
    pub fn through(p1: Point2, p2: Point2, ctx: &ModelContext) -> Self {
        let (x1, y1, x2, y2) = (p1.x(), p1.y(), p2.x(), p2.y());
        if (x1 - x2).abs() < ctx.vertical_tolerance() {
            return HalfPlaneGeodesic::Vertical { x: x1 };
        }

        let y0 = ctx.baseline_y();
        let cx = (x1 * x1 + (y1 - y0).powi(2) - x2 * x2 - (y2 - y0).powi(2)) / (2.0 * (x1 - x2));
        HalfPlaneGeodesic::Semicircle {
            center: Point2::new(cx, y0),
            radius: (x1 - cx).hypot(y1 - y0),
        }
    }

    #[inline]
    pub fn is_vertical(&self) -> bool {
        matches!(self, HalfPlaneGeodesic::Vertical { .. })
    }

    #[inline]
    pub fn vertical_x(&self) -> Option<f64> {
        match self {
            HalfPlaneGeodesic::Vertical { x } => Some(*x),
            HalfPlaneGeodesic::Semicircle { .. } => None,
        }
    }

    #[inline]
    pub fn center(&self) -> Option<Point2> {
        match self {
            HalfPlaneGeodesic::Semicircle { center, .. } => Some(*center),
            HalfPlaneGeodesic::Vertical { .. } => None,
        }
    }

    #[inline]
    pub fn radius(&self) -> Option<f64> {
        match self {
            HalfPlaneGeodesic::Semicircle { radius, .. } => Some(*radius),
            HalfPlaneGeodesic::Vertical { .. } => None,
        }
    }

    pub fn tangent_at(&self, at: Point2) -> Vector2 {
        match self {
            HalfPlaneGeodesic::Vertical { .. } => Vector2::new(0.0, 1.0),
            HalfPlaneGeodesic::Semicircle { center, .. } => center.vector_to(at).perp(),
        }
    }

    /// 基线上方的交点。两条竖直测地线只在无穷远处相交，返回 `None`。
    pub fn intersection(&self, other: &HalfPlaneGeodesic, ctx: &ModelContext) -> Option<Point2> {
        let y0 = ctx.baseline_y();
        let candidates = match (self, other) {
            (HalfPlaneGeodesic::Vertical { .. }, HalfPlaneGeodesic::Vertical { .. }) => {
                return None;
            }
            (HalfPlaneGeodesic::Vertical { x }, HalfPlaneGeodesic::Semicircle { center, radius })
            | (HalfPlaneGeodesic::Semicircle { center, radius }, HalfPlaneGeodesic::Vertical { x }) => {
                let dx = x - center.x();
                if dx.abs() >= *radius {
                    return None;
                }
                let h = (radius * radius - dx * dx).sqrt();
                [Point2::new(*x, y0 - h), Point2::new(*x, y0 + h)]
            }
            (
                HalfPlaneGeodesic::Semicircle {
                    center: c1,
                    radius: r1,
                },
                HalfPlaneGeodesic::Semicircle {
                    center: c2,
                    radius: r2,
                },
            ) => circle_circle_candidates(*c1, *r1, *c2, *r2)?,
        };
        candidates
            .into_iter()
            .find(|candidate| ctx.contains_in_half_plane(*candidate))
    }
}
