// MODEL: Sandbox state and data
pub mod world;
pub mod camera;
pub mod raycast;

pub use world::{Block, Material, TerrainGenerator, World};
pub use camera::Camera;
pub use raycast::{Ray, RayHit};
