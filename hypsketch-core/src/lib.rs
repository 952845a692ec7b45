pub mod disk;
pub mod half_plane;
pub mod mobius;
pub mod model;
pub mod shape;
pub mod snapshot;

pub mod geometry {
    use glam::DVec2;
    use serde::{Deserialize, Serialize};

    /// 二维点，内部以 `glam::DVec2` 表示，坐标系与屏幕一致（Y 轴向下）。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point2(pub DVec2);

    impl Point2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_vec(vec: DVec2) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn translate(self, offset: Vector2) -> Self {
            Self(self.0 + offset.0)
        }

        #[inline]
        pub fn vector_to(self, other: Point2) -> Vector2 {
            Vector2(other.0 - self.0)
        }

        #[inline]
        pub fn distance(self, other: Point2) -> f64 {
            self.0.distance(other.0)
        }

        #[inline]
        pub fn is_finite(self) -> bool {
            self.0.is_finite()
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }
    }

    impl From<DVec2> for Point2 {
        fn from(value: DVec2) -> Self {
            Self::from_vec(value)
        }
    }

    /// 二维向量，主要用于切向量与平移量。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Vector2(pub DVec2);

    impl Vector2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_points(start: Point2, end: Point2) -> Self {
            Self(end.0 - start.0)
        }

        /// 逆时针旋转 90°：`(x, y) -> (-y, x)`。
        #[inline]
        pub fn perp(self) -> Self {
            Self(self.0.perp())
        }

        #[inline]
        pub fn dot(self, other: Vector2) -> f64 {
            self.0.dot(other.0)
        }

        #[inline]
        pub fn length(self) -> f64 {
            self.0.length()
        }

        #[inline]
        pub fn length_squared(self) -> f64 {
            self.0.length_squared()
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }
    }

    impl From<DVec2> for Vector2 {
        fn from(value: DVec2) -> Self {
            Self(value)
        }
    }
}

pub mod observer {
    use std::fmt;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SubscriptionId(u64);

    impl SubscriptionId {
        #[inline]
        pub fn get(self) -> u64 {
            self.0
        }
    }

    pub type Callback = Box<dyn FnMut()>;

    /// 有序的订阅者列表。回调不携带参数，订阅者需自行通过访问器读取最新状态。
    #[derive(Default)]
    pub struct Observers {
        next_id: u64,
        entries: Vec<(SubscriptionId, Callback)>,
    }

    impl Observers {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn subscribe(&mut self, callback: impl FnMut() + 'static) -> SubscriptionId {
            let id = SubscriptionId(self.next_id);
            self.next_id += 1;
            self.entries.push((id, Box::new(callback)));
            id
        }

        /// 移除订阅，返回该句柄此前是否有效。
        pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
            let before = self.entries.len();
            self.entries.retain(|(existing, _)| *existing != id);
            self.entries.len() != before
        }

        /// 按注册顺序同步调用全部回调。
        pub fn notify(&mut self) {
            for (_, callback) in &mut self.entries {
                callback();
            }
        }

        #[inline]
        pub fn len(&self) -> usize {
            self.entries.len()
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.entries.is_empty()
        }
    }

    impl fmt::Debug for Observers {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("Observers")
                .field("subscribers", &self.entries.len())
                .finish()
        }
    }
}

pub mod point {
    use crate::geometry::Point2;
    use crate::observer::{Observers, SubscriptionId};
    use crate::snapshot::PointData;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct PointId(u64);

    impl PointId {
        #[inline]
        pub fn new(raw: u64) -> Self {
            Self(raw)
        }

        /// 提供原始数值，便于日志输出。
        #[inline]
        pub fn get(self) -> u64 {
            self.0
        }
    }

    /// 可观察的可变点。所有修改都经过 [`Point::set`]，每次调用恰好通知一次。
    #[derive(Debug)]
    pub struct Point {
        position: Point2,
        observers: Observers,
    }

    impl Point {
        pub fn new(x: f64, y: f64) -> Self {
            Self {
                position: Point2::new(x, y),
                observers: Observers::new(),
            }
        }

        #[inline]
        pub fn x(&self) -> f64 {
            self.position.x()
        }

        #[inline]
        pub fn y(&self) -> f64 {
            self.position.y()
        }

        #[inline]
        pub fn position(&self) -> Point2 {
            self.position
        }

        pub fn set(&mut self, x: f64, y: f64) {
            debug_assert!(x.is_finite() && y.is_finite(), "point coordinates must be finite");
            self.position = Point2::new(x, y);
            self.observers.notify();
        }

        #[inline]
        pub fn set_position(&mut self, position: Point2) {
            self.set(position.x(), position.y());
        }

        pub fn subscribe(&mut self, callback: impl FnMut() + 'static) -> SubscriptionId {
            self.observers.subscribe(callback)
        }

        pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
            self.observers.unsubscribe(id)
        }

        #[inline]
        pub fn observer_count(&self) -> usize {
            self.observers.len()
        }

        pub fn to_data(&self) -> PointData {
            PointData {
                x: self.x(),
                y: self.y(),
            }
        }

        pub fn from_data(data: &PointData) -> Self {
            Self::new(data.x, data.y)
        }
    }

}
