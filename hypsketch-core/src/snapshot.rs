//! 场景的持久化表示。只保存原始坐标与连线索引，几何数据在加载时重新推导。

use serde::{Deserialize, Serialize};

use crate::geometry::Point2;
use crate::model::ModelKind;

pub const DEFAULT_LINE_COLOR: &str = "black";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointData {
    pub x: f64,
    pub y: f64,
}

impl From<Point2> for PointData {
    fn from(value: Point2) -> Self {
        Self {
            x: value.x(),
            y: value.y(),
        }
    }
}

impl From<PointData> for Point2 {
    fn from(value: PointData) -> Self {
        Point2::new(value.x, value.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineData {
    pub p1_index: usize,
    pub p2_index: usize,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    DEFAULT_LINE_COLOR.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneData {
    pub unit_circle_center: PointData,
    pub unit_circle_radius: f64,
    #[serde(default)]
    pub points: Vec<PointData>,
    #[serde(default)]
    pub lines: Vec<LineData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_type: Option<ModelKind>,
}

impl SceneData {
    /// 检查索引范围与数值有效性，返回第一条问题描述。
    pub fn validate(&self) -> Result<(), String> {
        let center = Point2::from(self.unit_circle_center);
        if !center.is_finite() {
            return Err("unitCircleCenter 含非有限坐标".to_string());
        }
        if !self.unit_circle_radius.is_finite() || self.unit_circle_radius <= 0.0 {
            return Err(format!(
                "unitCircleRadius 必须为正数，实际为 {}",
                self.unit_circle_radius
            ));
        }
        for (index, point) in self.points.iter().enumerate() {
            if !point.x.is_finite() || !point.y.is_finite() {
                return Err(format!("points[{index}] 含非有限坐标"));
            }
        }
        let count = self.points.len();
        for (index, line) in self.lines.iter().enumerate() {
            for endpoint in [line.p1_index, line.p2_index] {
                if endpoint >= count {
                    return Err(format!(
                        "lines[{index}] 引用的点索引 {endpoint} 越界（共 {count} 个点）"
                    ));
                }
            }
        }
        Ok(())
    }
}
