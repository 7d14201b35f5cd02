pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod geometry;
pub mod id;
pub mod metadata;
pub mod model;
pub mod orient;
pub mod scene;
pub mod transform;

pub use cache::{GeometryCache, GeometrySnapshot, Target, TransformHandle};
pub use classify::{EdgeSide, FragmentRole, GlueAnchor, NonStretchBudget};
pub use config::EngineConfig;
pub use error::{GeometryError, LoadError};
pub use geometry::EdgeFrame;
pub use id::{DiagramId, FragmentId};
pub use metadata::{DiagramMetadata, Position, PositionSummary};
pub use model::*;
pub use scene::RenderedScene;
pub use transform::{FragmentTransform, FragmentUpdate, NodeMove, Reprojection, reproject};

// Re-export kurbo types so downstream crates don't need a direct dependency
pub use kurbo::{Affine, Point, Vec2};
