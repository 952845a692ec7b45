pub mod command;
pub mod scene;

pub mod errors {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum EngineError {
        #[error("point with id {0} not found")]
        PointNotFound(u64),
        #[error("geodesic with id {0} not found")]
        LineNotFound(u64),
        #[error("non-finite coordinate ({x}, {y})")]
        NonFiniteCoordinate { x: f64, y: f64 },
        #[error("invalid scene data: {0}")]
        InvalidSceneData(String),
    }
}
