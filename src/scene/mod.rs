//! Scene objects and the octree scene manager

pub mod config;
pub mod manager;
pub mod object;

pub use config::SceneConfig;
pub use manager::{CullStats, SceneManager};
pub use object::{ObjectId, ObjectKind, SceneObject};
