use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::model::World;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x4,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// Outward normal and the four corners (counter-clockwise seen from outside)
/// of each cube face, relative to the cube centre.
const FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
    ([1.0, 0.0, 0.0], [[0.5, -0.5, 0.5], [0.5, -0.5, -0.5], [0.5, 0.5, -0.5], [0.5, 0.5, 0.5]]),
    ([-1.0, 0.0, 0.0], [[-0.5, -0.5, -0.5], [-0.5, -0.5, 0.5], [-0.5, 0.5, 0.5], [-0.5, 0.5, -0.5]]),
    ([0.0, 1.0, 0.0], [[-0.5, 0.5, 0.5], [0.5, 0.5, 0.5], [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5]]),
    ([0.0, -1.0, 0.0], [[-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, -0.5, 0.5], [-0.5, -0.5, 0.5]]),
    ([0.0, 0.0, 1.0], [[-0.5, -0.5, 0.5], [0.5, -0.5, 0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5]]),
    ([0.0, 0.0, -1.0], [[0.5, -0.5, -0.5], [-0.5, -0.5, -0.5], [-0.5, 0.5, -0.5], [0.5, 0.5, -0.5]]),
];

impl Mesh {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// One closed cube per block; hidden faces are kept.
    pub fn from_world(world: &World) -> Self {
        let mut mesh = Mesh {
            vertices: Vec::with_capacity(world.len() * 24),
            indices: Vec::with_capacity(world.len() * 36),
        };

        for block in world.blocks() {
            let centre = block.position.as_vec3();
            let color = block.material.color();

            for (normal, corners) in FACES.iter() {
                let base = mesh.vertices.len() as u32;
                for corner in corners {
                    mesh.vertices.push(Vertex {
                        pos: [centre.x + corner[0], centre.y + corner[1], centre.z + corner[2]],
                        normal: *normal,
                        color,
                    });
                }
                mesh.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
            }
        }

        mesh
    }

    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("World Vertex Buffer"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("World Index Buffer"),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Material};
    use glam::{IVec3, Vec3};

    #[test]
    fn test_cube_counts() {
        let mut world = World::new();
        assert!(Mesh::from_world(&world).is_empty());

        world.add(Block::new(IVec3::ZERO, Material::Grass));
        world.add(Block::new(IVec3::new(4, 1, -2), Material::Dirt));
        let mesh = Mesh::from_world(&world);
        assert_eq!(mesh.vertices.len(), 48);
        assert_eq!(mesh.indices.len(), 72);
        assert!(mesh.indices.iter().all(|i| (*i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_faces_wind_counter_clockwise_outward() {
        for (normal, c) in FACES.iter() {
            let a = Vec3::from(c[0]);
            let b = Vec3::from(c[1]);
            let d = Vec3::from(c[2]);
            let n = (b - a).cross(d - a).normalize();
            assert!(n.abs_diff_eq(Vec3::from(*normal), 1e-6), "face {normal:?}");
        }
    }

    #[test]
    fn test_vertices_span_unit_cube_around_centre() {
        let mut world = World::new();
        world.add(Block::new(IVec3::new(2, 0, 0), Material::Stone));
        let mesh = Mesh::from_world(&world);
        let xs: Vec<f32> = mesh.vertices.iter().map(|v| v.pos[0]).collect();
        assert!(xs.iter().all(|x| *x == 1.5 || *x == 2.5));
    }
}
