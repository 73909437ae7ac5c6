pub mod collision {
    use math::math::{distance, mix, vector::vec2};
    use serde::{Deserialize, Serialize};

    /// the walkability grid of a game instance. immutable after init,
    /// shared read-only between the simulation and whatever built it.
    ///
    /// all queries are in pixel coordinates; a pixel belongs to the tile
    /// it floors into. everything outside the grid counts as solid.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct CollisionMask {
        width: u32,
        height: u32,
        tile_size: u32,
        walkable: Vec<bool>,
    }

    impl CollisionMask {
        pub fn new(
            width: u32,
            height: u32,
            tile_size: u32,
            walkable: Vec<bool>,
        ) -> anyhow::Result<Self> {
            anyhow::ensure!(
                walkable.len() == (width as usize) * (height as usize),
                "walkable grid has {} entries, expected {}",
                walkable.len(),
                width * height
            );
            anyhow::ensure!(tile_size > 0, "tile size must not be zero");
            Ok(Self {
                width,
                height,
                tile_size,
                walkable,
            })
        }

        /// fully walkable field, the default when no terrain is provided
        pub fn open(width: u32, height: u32, tile_size: u32) -> Self {
            Self {
                width,
                height,
                tile_size,
                walkable: vec![true; (width as usize) * (height as usize)],
            }
        }

        pub fn from_solid_tiles(
            width: u32,
            height: u32,
            tile_size: u32,
            solid: &[(u32, u32)],
        ) -> Self {
            let mut res = Self::open(width, height, tile_size);
            for &(tx, ty) in solid {
                if tx < width && ty < height {
                    res.walkable[(ty * width + tx) as usize] = false;
                }
            }
            res
        }

        pub fn width(&self) -> u32 {
            self.width
        }

        pub fn height(&self) -> u32 {
            self.height
        }

        pub fn tile_size(&self) -> u32 {
            self.tile_size
        }

        pub fn world_width_px(&self) -> f32 {
            (self.width * self.tile_size) as f32
        }

        pub fn world_height_px(&self) -> f32 {
            (self.height * self.tile_size) as f32
        }

        /// flat indices of all solid tiles, the representation `world_init`
        /// ships to clients
        pub fn solid_tile_indices(&self) -> Vec<u32> {
            self.walkable
                .iter()
                .enumerate()
                .filter_map(|(index, walkable)| (!walkable).then_some(index as u32))
                .collect()
        }

        pub fn is_walkable(&self, x: f32, y: f32) -> bool {
            if x < 0.0 || y < 0.0 {
                return false;
            }
            let tx = (x as u32) / self.tile_size;
            let ty = (y as u32) / self.tile_size;
            if tx >= self.width || ty >= self.height {
                return false;
            }
            self.walkable[(ty * self.width + tx) as usize]
        }

        /// whether a straight segment stays on walkable tiles.
        /// sampled at a step no larger than half a tile and no larger
        /// than the moving entity's radius; collision is the tile of
        /// each sampled destination pixel.
        pub fn can_move(&self, from: &vec2, to: &vec2, radius: f32) -> bool {
            let dist = distance(from, to);
            if dist <= f32::EPSILON {
                return self.is_walkable(to.x, to.y);
            }
            let step = (self.tile_size as f32 / 2.0).min(radius).max(1.0);
            let samples = (dist / step).ceil() as u32;
            for i in 1..=samples {
                let pos = mix(from, to, i as f32 / samples as f32);
                if !self.is_walkable(pos.x, pos.y) {
                    return false;
                }
            }
            true
        }

        /// pushes an AABB of `radius` half-extent out of any solid tile it
        /// overlaps. resolves along the smaller-overlap axis first, ties
        /// prefer the axis with the larger incoming velocity. bounded in
        /// iterations so a degenerate mask cannot stall the tick.
        pub fn resolve_overlap(&self, pos: &mut vec2, vel: &vec2, radius: f32) {
            const MAX_PUSHES: usize = 4;
            for _ in 0..MAX_PUSHES {
                let Some((tx, ty)) = self.overlapping_solid_tile(pos, radius) else {
                    return;
                };
                let tile = self.tile_size as f32;
                let (tile_min_x, tile_min_y) = (tx as f32 * tile, ty as f32 * tile);
                let (tile_max_x, tile_max_y) = (tile_min_x + tile, tile_min_y + tile);

                // overlap depth on each axis, with the sign of the shorter escape
                let push_x = if pos.x < tile_min_x + tile / 2.0 {
                    tile_min_x - (pos.x + radius)
                } else {
                    tile_max_x - (pos.x - radius)
                };
                let push_y = if pos.y < tile_min_y + tile / 2.0 {
                    tile_min_y - (pos.y + radius)
                } else {
                    tile_max_y - (pos.y - radius)
                };

                let use_x = match push_x.abs().partial_cmp(&push_y.abs()) {
                    Some(std::cmp::Ordering::Less) => true,
                    Some(std::cmp::Ordering::Greater) => false,
                    _ => vel.x.abs() >= vel.y.abs(),
                };
                if use_x {
                    pos.x += push_x;
                } else {
                    pos.y += push_y;
                }
            }
        }

        fn overlapping_solid_tile(&self, pos: &vec2, radius: f32) -> Option<(u32, u32)> {
            let tile = self.tile_size as f32;
            let min_tx = (((pos.x - radius) / tile).floor().max(0.0)) as u32;
            let min_ty = (((pos.y - radius) / tile).floor().max(0.0)) as u32;
            let max_tx = (((pos.x + radius) / tile).floor()) as u32;
            let max_ty = (((pos.y + radius) / tile).floor()) as u32;
            for ty in min_ty..=max_ty.min(self.height.saturating_sub(1)) {
                for tx in min_tx..=max_tx.min(self.width.saturating_sub(1)) {
                    if !self.walkable[(ty * self.width + tx) as usize] {
                        return Some((tx, ty));
                    }
                }
            }
            None
        }
    }

    #[cfg(test)]
    mod test {
        use super::*;

        #[test]
        fn walkability_is_false_outside_bounds() {
            let mask = CollisionMask::open(10, 10, 64);
            assert!(mask.is_walkable(0.0, 0.0));
            assert!(mask.is_walkable(639.9, 639.9));
            assert!(!mask.is_walkable(-1.0, 0.0));
            assert!(!mask.is_walkable(0.0, 640.0));
        }

        #[test]
        fn can_move_blocks_on_solid_destination() {
            let mask = CollisionMask::from_solid_tiles(100, 100, 64, &[(50, 50)]);
            // into the solid tile at 3200..3264
            assert!(!mask.can_move(
                &vec2::new(3196.0, 3232.0),
                &vec2::new(3208.75, 3219.25),
                20.0
            ));
            // sliding along the wall stays clear of it
            assert!(mask.can_move(
                &vec2::new(3196.0, 3232.0),
                &vec2::new(3196.0, 3219.25),
                20.0
            ));
        }

        #[test]
        fn can_move_samples_the_segment_interior() {
            let mask = CollisionMask::from_solid_tiles(100, 100, 64, &[(50, 50)]);
            // a long jump across the solid tile must not tunnel through it
            assert!(!mask.can_move(
                &vec2::new(3150.0, 3232.0),
                &vec2::new(3300.0, 3232.0),
                20.0
            ));
        }

        #[test]
        fn resolver_pushes_out_along_smaller_overlap() {
            let mask = CollisionMask::from_solid_tiles(100, 100, 64, &[(50, 50)]);
            // barely inside the left edge of the solid tile
            let mut pos = vec2::new(3204.0, 3232.0);
            mask.resolve_overlap(&mut pos, &vec2::new(1.0, 0.0), 20.0);
            assert!(pos.x <= 3180.0);
            assert_eq!(pos.y, 3232.0);
        }
    }
}
