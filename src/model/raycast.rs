use glam::{IVec3, Vec3};

use super::world::Block;

/// Half the edge length of a block.
const HALF_EXTENT: f32 = 0.5;
const PARALLEL_EPS: f32 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Always normalised.
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction: direction.normalize_or_zero() }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Nearest block along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Index of the block in the world's block list.
    pub index: usize,
    pub block: Block,
    /// Point where the ray enters the block, lying exactly on the face plane.
    pub point: Vec3,
    /// Outward unit normal of the entered face.
    pub normal: IVec3,
    pub distance: f32,
}

impl RayHit {
    /// Cell for a new block: `round(point + normal)` on every axis, rounding
    /// halves up like `Math.round`.
    ///
    /// On the +X/+Y/+Z faces `point + normal` lands on a half and rounds one
    /// cell further out, so placement there leaves a one-block gap.
    pub fn placement(&self) -> IVec3 {
        let p = self.point + self.normal.as_vec3();
        IVec3::new(round_half_up(p.x), round_half_up(p.y), round_half_up(p.z))
    }
}

pub fn round_half_up(v: f32) -> i32 {
    (v + 0.5).floor() as i32
}

/// Slab test against the unit cube centred on `centre`.
///
/// Returns the entry distance and the outward normal of the entered face.
/// Only front faces count: a ray starting inside the cube does not hit it.
pub fn intersect_cube(ray: &Ray, centre: IVec3) -> Option<(f32, IVec3)> {
    let min = centre.as_vec3() - Vec3::splat(HALF_EXTENT);
    let max = centre.as_vec3() + Vec3::splat(HALF_EXTENT);

    let origin = ray.origin.to_array();
    let dir = ray.direction.to_array();
    let (min, max) = (min.to_array(), max.to_array());

    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut enter_axis = None;

    for axis in 0..3 {
        if dir[axis].abs() < PARALLEL_EPS {
            if origin[axis] < min[axis] || origin[axis] > max[axis] {
                return None;
            }
            continue;
        }

        let inv = 1.0 / dir[axis];
        let mut t0 = (min[axis] - origin[axis]) * inv;
        let mut t1 = (max[axis] - origin[axis]) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }

        if t0 > t_enter {
            t_enter = t0;
            enter_axis = Some(axis);
        }
        t_exit = t_exit.min(t1);

        if t_enter > t_exit {
            return None;
        }
    }

    let axis = enter_axis?;
    if t_enter < 0.0 {
        return None;
    }

    let mut normal = [0; 3];
    normal[axis] = if dir[axis] > 0.0 { -1 } else { 1 };
    Some((t_enter, IVec3::from_array(normal)))
}

/// Nearest front-face hit among `blocks`. Ties go to the earlier block.
pub fn cast<'a>(ray: &Ray, blocks: impl IntoIterator<Item = &'a Block>) -> Option<RayHit> {
    let mut nearest: Option<RayHit> = None;

    for (index, block) in blocks.into_iter().enumerate() {
        let Some((distance, normal)) = intersect_cube(ray, block.position) else {
            continue;
        };
        if nearest.as_ref().is_some_and(|hit| hit.distance <= distance) {
            continue;
        }

        // snap onto the face plane so placement rounding is exact
        let mut point = ray.at(distance);
        let face = block.position.as_vec3() + normal.as_vec3() * HALF_EXTENT;
        if normal.x != 0 {
            point.x = face.x;
        } else if normal.y != 0 {
            point.y = face.y;
        } else {
            point.z = face.z;
        }

        nearest = Some(RayHit { index, block: *block, point, normal, distance });
    }

    nearest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::world::Material;

    fn grass(x: i32, y: i32, z: i32) -> Block {
        Block::new(IVec3::new(x, y, z), Material::Grass)
    }

    #[test]
    fn test_hits_top_face_from_above() {
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y);
        let (t, normal) = intersect_cube(&ray, IVec3::ZERO).unwrap();
        assert!((t - 4.5).abs() < 1e-5);
        assert_eq!(normal, IVec3::Y);
    }

    #[test]
    fn test_hits_side_faces() {
        let from_pos_x = Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::NEG_X);
        assert_eq!(intersect_cube(&from_pos_x, IVec3::ZERO).map(|h| h.1), Some(IVec3::X));

        let from_neg_z = Ray::new(Vec3::new(0.1, 0.2, -4.0), Vec3::Z);
        assert_eq!(intersect_cube(&from_neg_z, IVec3::ZERO).map(|h| h.1), Some(IVec3::NEG_Z));
    }

    #[test]
    fn test_misses() {
        // parallel, outside the slab
        let ray = Ray::new(Vec3::new(0.0, 2.0, 5.0), Vec3::NEG_Z);
        assert!(intersect_cube(&ray, IVec3::ZERO).is_none());

        // pointing away
        let ray = Ray::new(Vec3::new(0.0, 3.0, 0.0), Vec3::Y);
        assert!(intersect_cube(&ray, IVec3::ZERO).is_none());
    }

    #[test]
    fn test_origin_inside_cube_is_not_a_hit() {
        let ray = Ray::new(Vec3::new(0.1, 0.1, 0.1), Vec3::X);
        assert!(intersect_cube(&ray, IVec3::ZERO).is_none());
    }

    #[test]
    fn test_cast_picks_nearest() {
        let blocks = vec![grass(0, 0, -5), grass(0, 0, -2), grass(0, 0, -8)];
        let ray = Ray::new(Vec3::new(0.0, 0.0, 2.0), Vec3::NEG_Z);
        let hit = cast(&ray, &blocks).unwrap();
        assert_eq!(hit.index, 1);
        assert_eq!(hit.block.position, IVec3::new(0, 0, -2));
        assert_eq!(hit.normal, IVec3::Z);
        assert_eq!(hit.point.z, -1.5);
    }

    #[test]
    fn test_placement_rounding() {
        // top face of (0,0,0): 0.5 + 1 = 1.5 rounds up to 2
        let ray = Ray::new(Vec3::new(0.2, 4.0, -0.1), Vec3::NEG_Y);
        let hit = cast(&ray, &[grass(0, 0, 0)]).unwrap();
        assert_eq!(hit.placement(), IVec3::new(0, 2, 0));

        // -X face of (0,0,0): -0.5 - 1 = -1.5 rounds up to -1
        let ray = Ray::new(Vec3::new(-4.0, 0.1, 0.2), Vec3::X);
        let hit = cast(&ray, &[grass(0, 0, 0)]).unwrap();
        assert_eq!(hit.placement(), IVec3::new(-1, 0, 0));
    }

    #[test]
    fn test_round_half_up_matches_js() {
        assert_eq!(round_half_up(1.5), 2);
        assert_eq!(round_half_up(-1.5), -1);
        assert_eq!(round_half_up(-0.4), 0);
        assert_eq!(round_half_up(2.49), 2);
    }
}
