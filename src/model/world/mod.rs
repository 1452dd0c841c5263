pub mod block;
pub mod terrain;

pub use block::{Block, Material};
pub use terrain::TerrainGenerator;

use crate::model::raycast::{self, Ray, RayHit};

/// Every block in the sandbox, in insertion order.
///
/// There is no spatial index and no occupancy check: the list is the whole
/// world, like the children of a scene graph.
#[derive(Debug, Default, Clone)]
pub struct World {
    blocks: Vec<Block>,
    /// Bumped on every mutation; the renderer rebuilds its mesh when it changes.
    revision: u64,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, block: Block) {
        self.blocks.push(block);
        self.revision += 1;
    }

    pub fn remove(&mut self, index: usize) -> Option<Block> {
        if index >= self.blocks.len() {
            return None;
        }
        self.revision += 1;
        Some(self.blocks.remove(index))
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        raycast::cast(ray, &self.blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{IVec3, Vec3};

    #[test]
    fn test_add_remove_and_revision() {
        let mut world = World::new();
        assert!(world.is_empty());
        let r0 = world.revision();

        world.add(Block::new(IVec3::ZERO, Material::Stone));
        world.add(Block::new(IVec3::X, Material::Dirt));
        assert_eq!(world.len(), 2);
        assert!(world.revision() > r0);

        let r1 = world.revision();
        assert_eq!(world.remove(0).map(|b| b.material), Some(Material::Stone));
        assert_eq!(world.blocks()[0].position, IVec3::X);
        assert!(world.revision() > r1);

        let r2 = world.revision();
        assert_eq!(world.remove(5), None);
        assert_eq!(world.revision(), r2);
    }

    #[test]
    fn test_overlapping_blocks_allowed() {
        let mut world = World::new();
        world.add(Block::new(IVec3::ZERO, Material::Stone));
        world.add(Block::new(IVec3::ZERO, Material::Grass));
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn test_raycast_empty_world() {
        let world = World::new();
        assert!(world.raycast(&Ray::new(Vec3::ZERO, Vec3::NEG_Z)).is_none());
    }
}
