use serde::{Deserialize, Serialize};

use crate::geometry::Point2;

/// 圆盘模型判定直径的叉积阈值（相对 `R²`）。
pub const DIAMETER_EPSILON: f64 = 1e-9;
/// 上半平面模型判定竖直测地线的横坐标差阈值（相对 `R`）。
pub const VERTICAL_EPSILON: f64 = 1e-5;
/// 判定交点是否严格落在模型内部的边距（相对 `R`）。
pub const BOUNDARY_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModelKind {
    #[default]
    Disk,
    HalfPlane,
}

impl ModelKind {
    pub fn name(self) -> &'static str {
        match self {
            ModelKind::Disk => "disk",
            ModelKind::HalfPlane => "half_plane",
        }
    }

    /// 解析命令行或命令总线传入的模型名，大小写不敏感。
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "disk" | "poincare" => Some(ModelKind::Disk),
            "half_plane" | "halfplane" | "upper" => Some(ModelKind::HalfPlane),
            _ => None,
        }
    }
}

/// 两种模型共享的参考几何：圆盘边界与上半平面基线。
///
/// 取值不可变，所有几何计算都显式接收它，而不是读取全局状态。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelContext {
    disk_center: Point2,
    disk_radius: f64,
    baseline_y: f64,
}

impl ModelContext {
    /// 基线默认位于页面高度的 2/3 处，页面高度取圆心纵坐标的两倍。
    pub fn new(disk_center: Point2, disk_radius: f64) -> Self {
        let page_height = disk_center.y() * 2.0;
        Self::with_page_height(disk_center, disk_radius, page_height)
    }

    pub fn with_page_height(disk_center: Point2, disk_radius: f64, page_height: f64) -> Self {
        Self {
            disk_center,
            disk_radius,
            baseline_y: page_height * 2.0 / 3.0,
        }
    }

    /// 以原点为圆心的单位圆盘，基线为 `y = 0`。
    pub fn unit() -> Self {
        Self::new(Point2::new(0.0, 0.0), 1.0)
    }

    /// 替换圆盘参数，保留当前基线。
    pub fn with_disk(self, disk_center: Point2, disk_radius: f64) -> Self {
        Self {
            disk_center,
            disk_radius,
            baseline_y: self.baseline_y,
        }
    }

    /// 移动圆盘到新位置。基线若由旧圆心推导而来，则按新圆心重新推导；
    /// 显式给定页面高度的基线保持不变。
    pub fn relocated(self, disk_center: Point2, disk_radius: f64) -> Self {
        if self.has_derived_baseline() {
            Self::new(disk_center, disk_radius)
        } else {
            self.with_disk(disk_center, disk_radius)
        }
    }

    /// 基线是否等于 [`ModelContext::new`] 按圆心推导出的默认值。
    pub fn has_derived_baseline(&self) -> bool {
        let derived = Self::new(self.disk_center, self.disk_radius).baseline_y;
        (self.baseline_y - derived).abs() <= self.boundary_tolerance()
    }

    #[inline]
    pub fn disk_center(&self) -> Point2 {
        self.disk_center
    }

    #[inline]
    pub fn disk_radius(&self) -> f64 {
        self.disk_radius
    }

    #[inline]
    pub fn baseline_y(&self) -> f64 {
        self.baseline_y
    }

    #[inline]
    pub fn diameter_tolerance(&self) -> f64 {
        DIAMETER_EPSILON * self.disk_radius * self.disk_radius
    }

    #[inline]
    pub fn vertical_tolerance(&self) -> f64 {
        VERTICAL_EPSILON * self.disk_radius
    }

    #[inline]
    pub fn boundary_tolerance(&self) -> f64 {
        BOUNDARY_EPSILON * self.disk_radius
    }

    /// 点是否严格位于圆盘内部。
    pub fn contains_in_disk(&self, point: Point2) -> bool {
        point.distance(self.disk_center) < self.disk_radius - self.boundary_tolerance()
    }

    /// 点是否严格位于基线上方（屏幕坐标 Y 向下，因此为 `y < y0`）。
    pub fn contains_in_half_plane(&self, point: Point2) -> bool {
        point.y() < self.baseline_y - self.boundary_tolerance()
    }

    pub fn is_valid(&self) -> bool {
        self.disk_center.is_finite()
            && self.disk_radius.is_finite()
            && self.disk_radius > 0.0
            && self.baseline_y.is_finite()
    }
}

impl Default for ModelContext {
    fn default() -> Self {
        Self::unit()
    }
}
