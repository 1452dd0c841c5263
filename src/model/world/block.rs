use glam::IVec3;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Material {
    Grass = 0,
    Dirt = 1,
    Stone = 2,
}

impl Material {
    /// Material of layer `y` in a column `height` blocks tall: the top is
    /// grass, the one below dirt, everything further down stone.
    pub fn for_layer(y: u32, height: u32) -> Self {
        if y + 1 == height {
            Material::Grass
        } else if y + 2 == height {
            Material::Dirt
        } else {
            Material::Stone
        }
    }

    pub fn hex(self) -> u32 {
        match self {
            Material::Grass => 0x00ff00,
            Material::Dirt => 0x8b4513,
            Material::Stone => 0x808080,
        }
    }

    /// Linear RGBA, ready for an sRGB render target.
    pub fn color(self) -> [f32; 4] {
        hex_to_linear_rgba(self.hex())
    }
}

/// A unit cube centred on an integer coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Block {
    pub position: IVec3,
    pub material: Material,
}

impl Block {
    pub fn new(position: IVec3, material: Material) -> Self {
        Self { position, material }
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

pub fn hex_to_linear_rgba(hex: u32) -> [f32; 4] {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    [channel(16), channel(8), channel(0), 1.0]
}
