//! 圆盘模型与上半平面模型之间的莫比乌斯变换。
//!
//! 屏幕坐标 Y 轴向下，数学坐标 Y 轴向上，因此进出复平面时都要翻转虚部。
//! 圆盘一侧先按圆心与半径归一化到单位圆；上半平面一侧以基线为实轴、
//! 同样以圆盘半径为长度单位。

use num_complex::Complex64;

use crate::geometry::Point2;
use crate::model::ModelContext;

/// 分母模长低于该值时视为奇点。
const SINGULARITY_EPSILON: f64 = 1e-12;

const I: Complex64 = Complex64::new(0.0, 1.0);

/// `w = (−i·z − i) / (z − 1)`。`z = 1`（圆盘最右侧边界点）映射到无穷远，返回 `None`。
pub fn disk_to_half_plane(point: Point2, ctx: &ModelContext) -> Option<Point2> {
    let center = ctx.disk_center();
    let r = ctx.disk_radius();
    let z = Complex64::new((point.x() - center.x()) / r, (center.y() - point.y()) / r);

    let w = divide(-I * z - I, z - 1.0)?;
    finite(Point2::new(center.x() + r * w.re, ctx.baseline_y() - r * w.im))
}

/// `z' = (z − i) / (z + i)`，为 [`disk_to_half_plane`] 的逆变换。
/// `z = −i`（基线下方一个半径处）为奇点，返回 `None`。
pub fn half_plane_to_disk(point: Point2, ctx: &ModelContext) -> Option<Point2> {
    let center = ctx.disk_center();
    let r = ctx.disk_radius();
    let z = Complex64::new(
        (point.x() - center.x()) / r,
        (ctx.baseline_y() - point.y()) / r,
    );

    let w = divide(z - I, z + I)?;
    finite(Point2::new(center.x() + r * w.re, center.y() - r * w.im))
}

fn divide(numerator: Complex64, denominator: Complex64) -> Option<Complex64> {
    if denominator.norm() < SINGULARITY_EPSILON {
        None
    } else {
        Some(numerator / denominator)
    }
}

fn finite(point: Point2) -> Option<Point2> {
    point.is_finite().then_some(point)
}
