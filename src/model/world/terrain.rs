// terrain.rs - one-shot random column terrain
//
// For every (x, z) in the square grid around the origin a height is drawn
// uniformly from 0..max_height and that many blocks are stacked from y = 0:
//
//     y = height - 1   grass
//     y = height - 2   dirt
//     below            stone
//
// A draw of 0 leaves the column empty, which shows up as a hole.

use glam::IVec3;

use super::block::{Block, Material};
use super::World;
use crate::config::SandboxConfig;

pub struct TerrainGenerator {
    rng: fastrand::Rng,
    radius: i32,
    max_height: u32,
}

impl TerrainGenerator {
    pub fn new(rng: fastrand::Rng, radius: i32, max_height: u32) -> Self {
        Self { rng, radius, max_height }
    }

    pub fn from_config(config: &SandboxConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self::new(rng, config.terrain_radius, config.max_column_height)
    }

    /// Uniform integer in `0..max_height`.
    pub fn draw_height(&mut self) -> u32 {
        if self.max_height == 0 {
            return 0;
        }
        self.rng.u32(0..self.max_height)
    }

    /// Blocks of one column, bottom to top.
    pub fn column(x: i32, z: i32, height: u32) -> impl Iterator<Item = Block> {
        (0..height).map(move |y| Block::new(IVec3::new(x, y as i32, z), Material::for_layer(y, height)))
    }

    /// Populate `world` with one column per grid cell. Returns the drawn
    /// heights in generation order (x-major, then z).
    pub fn generate(&mut self, world: &mut World) -> Vec<u32> {
        let side = (2 * self.radius + 1).max(0) as usize;
        let mut heights = Vec::with_capacity(side * side);

        for x in -self.radius..=self.radius {
            for z in -self.radius..=self.radius {
                let height = self.draw_height();
                heights.push(height);
                for block in Self::column(x, z, height) {
                    world.add(block);
                }
            }
        }

        let holes = heights.iter().filter(|h| **h == 0).count();
        tracing::info!(
            "generated terrain: {} columns, {} blocks, {} holes",
            heights.len(),
            world.len(),
            holes,
        );
        heights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn seeded(seed: u64) -> TerrainGenerator {
        TerrainGenerator::new(fastrand::Rng::with_seed(seed), 5, 3)
    }

    #[test]
    fn test_column_count_matches_height() {
        let mut world = World::new();
        let heights = seeded(7).generate(&mut world);

        assert_eq!(heights.len(), 121, "11x11 grid");
        let total: u32 = heights.iter().sum();
        assert_eq!(world.len(), total as usize);

        let mut per_column: HashMap<(i32, i32), Vec<Block>> = HashMap::new();
        for block in world.blocks() {
            per_column.entry((block.position.x, block.position.z)).or_default().push(*block);
        }

        let mut i = 0;
        for x in -5..=5 {
            for z in -5..=5 {
                let height = heights[i];
                i += 1;
                let column = per_column.remove(&(x, z)).unwrap_or_default();
                assert_eq!(column.len(), height as usize, "column ({x}, {z})");

                for block in &column {
                    let y = block.position.y as u32;
                    assert!(y < height);
                    let expected = if y == height - 1 {
                        Material::Grass
                    } else if y == height - 2 {
                        Material::Dirt
                    } else {
                        Material::Stone
                    };
                    assert_eq!(block.material, expected);
                }
            }
        }
        assert!(per_column.is_empty(), "no blocks outside the grid");
    }

    #[test]
    fn test_heights_in_range_and_all_observed() {
        let mut generator = seeded(42);
        let mut seen = [false; 3];
        for _ in 0..1000 {
            let h = generator.draw_height();
            assert!(h < 3);
            seen[h as usize] = true;
        }
        assert_eq!(seen, [true, true, true]);
    }

    #[test]
    fn test_same_seed_same_world() {
        let mut a = World::new();
        let mut b = World::new();
        seeded(99).generate(&mut a);
        seeded(99).generate(&mut b);
        assert_eq!(a.blocks(), b.blocks());
    }

    #[test]
    fn test_zero_height_column_is_a_hole() {
        assert_eq!(TerrainGenerator::column(0, 0, 0).count(), 0);
        let three: Vec<_> = TerrainGenerator::column(2, -1, 3).collect();
        assert_eq!(three[0].material, Material::Stone);
        assert_eq!(three[2].position, IVec3::new(2, 2, -1));
    }
}
