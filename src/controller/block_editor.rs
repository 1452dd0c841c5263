use glam::Vec2;

use crate::controller::input::MouseButton;
use crate::model::{Block, Camera, Material, World};

/// Outcome of a mouse-down on the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlockEdit {
    Removed(Block),
    Placed(Block),
    /// The centre ray hit nothing.
    Missed,
    /// Button with no edit action.
    Ignored,
}

/// Removes (left) or places (right) blocks under the screen centre.
#[derive(Debug, Clone)]
pub struct BlockEditor {
    /// Material of newly placed blocks.
    pub place_material: Material,
}

impl Default for BlockEditor {
    fn default() -> Self {
        Self { place_material: Material::Grass }
    }
}

impl BlockEditor {
    /// The ray always goes through the screen centre; the actual cursor
    /// position is never consulted.
    pub fn apply(&self, world: &mut World, camera: &Camera, button: MouseButton) -> BlockEdit {
        if !matches!(button, MouseButton::Left | MouseButton::Right) {
            return BlockEdit::Ignored;
        }

        let ray = camera.ray_from_ndc(Vec2::ZERO);
        let Some(hit) = world.raycast(&ray) else {
            return BlockEdit::Missed;
        };

        match button {
            MouseButton::Left => match world.remove(hit.index) {
                Some(block) => {
                    tracing::debug!("removed {:?} at {}", block.material, block.position);
                    BlockEdit::Removed(block)
                }
                None => BlockEdit::Missed,
            },
            _ => {
                let block = Block::new(hit.placement(), self.place_material);
                world.add(block);
                tracing::debug!("placed {:?} at {} (hit {} face {})", block.material, block.position, hit.block.position, hit.normal);
                BlockEdit::Placed(block)
            }
        }
    }
}
