pub mod character_core {
    use game_interface::types::{character::Facing, input::MoveKeys};
    use math::math::{dot, normalize, round_to_int, vector::vec2};

    use crate::collision::collision::CollisionMask;

    pub const PLAYER_RADIUS: f32 = 20.0;

    /// deliberate diagonal damping. NOT sqrt(2)/2 — the client
    /// predictor ships the same constant, changing one side desyncs
    /// every diagonal move.
    pub const DIAGONAL_FACTOR: f32 = 0.85;

    /// velocities are pixels per frame at a nominal 60 Hz; dt scales
    /// them back to real time. shared contract with the predictor.
    pub const FRAME_RATE_FACTOR: f32 = 60.0;

    const FORWARD_COS: f32 = std::f32::consts::FRAC_1_SQRT_2 - 1e-4;
    const BACKPEDAL_COS: f32 = -std::f32::consts::FRAC_1_SQRT_2 + 1e-4;

    /// movement state every walking entity carries
    #[derive(Debug, Default, Copy, Clone)]
    pub struct Core {
        pub pos: vec2,
        pub vel: vec2,
        pub facing: Facing,
    }

    /// additive speed bonus from level ups, on top of the class baseline
    pub fn level_speed_bonus(level: u32) -> f32 {
        let mut bonus = 0.0;
        if level >= 2 {
            bonus += 0.25;
        }
        if level >= 6 {
            bonus += 0.25;
        }
        bonus
    }

    /// forward 1.0, strafe 0.7, backpedal 0.5 — by the angle between
    /// facing and the movement direction (<= 45 deg / in between / >= 135 deg)
    pub fn directional_modifier(facing: Facing, move_dir: &vec2) -> f32 {
        let cos = dot(&facing.dir(), &normalize(move_dir));
        if cos >= FORWARD_COS {
            1.0
        } else if cos <= BACKPEDAL_COS {
            0.5
        } else {
            0.7
        }
    }

    /// per-axis velocity (pixels per frame at 60 Hz) for one input record
    pub fn input_velocity(keys: MoveKeys, facing: Facing, base_speed: f32, level: u32) -> vec2 {
        let (ax, ay) = keys.axes();
        if ax == 0.0 && ay == 0.0 {
            return vec2::default();
        }
        let move_dir = vec2::new(ax, ay);
        let speed = (base_speed + level_speed_bonus(level)) * directional_modifier(facing, &move_dir);
        if ax != 0.0 && ay != 0.0 {
            move_dir * (speed * DIAGONAL_FACTOR)
        } else {
            move_dir * speed
        }
    }

    /// the shared movement step: accept the full move, else slide on x,
    /// else slide on y, else stay. clamps to the world margin and rounds
    /// to whole pixels afterwards. the client predictor mirrors this
    /// routine exactly.
    pub fn step(
        pos: &mut vec2,
        vel: &vec2,
        dt: f32,
        radius: f32,
        margin: f32,
        collision: &CollisionMask,
    ) -> bool {
        let target = *pos + *vel * (dt * FRAME_RATE_FACTOR);
        let mut next = *pos;
        if collision.can_move(pos, &target, radius) {
            next = target;
        } else {
            let x_only = vec2::new(target.x, pos.y);
            let y_only = vec2::new(pos.x, target.y);
            if vel.x != 0.0 && collision.can_move(pos, &x_only, radius) {
                next = x_only;
            } else if vel.y != 0.0 && collision.can_move(pos, &y_only, radius) {
                next = y_only;
            }
        }
        next.x = next.x.clamp(margin, collision.world_width_px() - margin);
        next.y = next.y.clamp(margin, collision.world_height_px() - margin);
        next = vec2::new(round_to_int(next.x) as f32, round_to_int(next.y) as f32);
        // rounding can land exactly on a solid tile's edge pixel;
        // the overlap resolver nudges the entity back out
        if !collision.is_walkable(next.x, next.y) {
            collision.resolve_overlap(&mut next, vel, 1.0);
        }
        let moved = next != *pos;
        *pos = next;
        moved
    }

    #[cfg(test)]
    mod test {
        use super::*;
        use crate::collision::collision::CollisionMask;
        use game_interface::types::{character::Facing, input::MoveKeys};

        #[test]
        fn straight_movement_matches_the_contract() {
            // bladedancer baseline 5 px/frame, 20 Hz inputs
            let collision = CollisionMask::open(100, 100, 64);
            let mut pos = vec2::new(3200.0, 3200.0);
            let vel = input_velocity(MoveKeys::D, Facing::Right, 5.0, 1);
            assert_eq!(vel, vec2::new(5.0, 0.0));
            for _ in 0..20 {
                step(&mut pos, &vel, 0.05, PLAYER_RADIUS, 20.0, &collision);
            }
            assert_eq!(pos, vec2::new(3500.0, 3200.0));
        }

        #[test]
        fn diagonal_axes_are_damped_not_normalized() {
            let collision = CollisionMask::open(100, 100, 64);
            let mut pos = vec2::new(3200.0, 3200.0);
            let vel = input_velocity(MoveKeys::W | MoveKeys::D, Facing::UpRight, 5.0, 1);
            assert_eq!(vel, vec2::new(4.25, -4.25));
            step(&mut pos, &vel, 0.05, PLAYER_RADIUS, 20.0, &collision);
            // +-12.75 rounded to whole pixels
            assert_eq!(pos, vec2::new(3213.0, 3187.0));
        }

        #[test]
        fn head_on_wall_keeps_position_and_45_deg_slides_one_axis() {
            let collision = CollisionMask::from_solid_tiles(100, 100, 64, &[(50, 50)]);
            // head-on: right into the tile spanning 3200..3264
            let mut pos = vec2::new(3196.0, 3232.0);
            let vel = input_velocity(MoveKeys::D, Facing::Right, 5.0, 1);
            // the x step would land inside the solid tile and y never moves
            let moved = step(&mut pos, &vel, 0.05, PLAYER_RADIUS, 20.0, &collision);
            assert!(!moved);
            assert_eq!(pos, vec2::new(3196.0, 3232.0));

            // 45 degrees: blocked on x, slides on y only
            let mut pos = vec2::new(3196.0, 3232.0);
            let vel = input_velocity(MoveKeys::D | MoveKeys::W, Facing::Right, 5.0, 1);
            assert_eq!(vel, vec2::new(4.25, -4.25));
            step(&mut pos, &vel, 0.05, PLAYER_RADIUS, 20.0, &collision);
            assert_eq!(pos, vec2::new(3196.0, 3219.0));
        }

        #[test]
        fn directional_modifier_tiers() {
            // facing right, moving right: forward
            assert_eq!(
                directional_modifier(Facing::Right, &vec2::new(1.0, 0.0)),
                1.0
            );
            // exactly 45 degrees still counts as forward
            assert_eq!(
                directional_modifier(Facing::Right, &vec2::new(1.0, -1.0)),
                1.0
            );
            // straight up while facing right: strafe
            assert_eq!(
                directional_modifier(Facing::Right, &vec2::new(0.0, -1.0)),
                0.7
            );
            // exactly 135 degrees counts as backpedal
            assert_eq!(
                directional_modifier(Facing::Right, &vec2::new(-1.0, -1.0)),
                0.5
            );
            assert_eq!(
                directional_modifier(Facing::Right, &vec2::new(-1.0, 0.0)),
                0.5
            );
        }

        #[test]
        fn level_bonus_applies_before_the_modifier() {
            let vel = input_velocity(MoveKeys::A, Facing::Right, 5.0, 6);
            // (5.0 + 0.5) * 0.5 backpedal
            assert_eq!(vel, vec2::new(-2.75, 0.0));
        }

        #[test]
        fn rounding_onto_a_tile_edge_is_resolved() {
            let collision = CollisionMask::from_solid_tiles(100, 100, 64, &[(50, 50)]);
            // a move that would round onto the solid tile's edge pixel
            let mut pos = vec2::new(3184.6, 3232.0);
            let vel = vec2::new(5.0, 0.0);
            step(&mut pos, &vel, 0.05, PLAYER_RADIUS, 20.0, &collision);
            // 3199.6 rounds to 3200, the first solid pixel; the
            // resolver pushes back to the walkable side
            assert!(collision.is_walkable(pos.x, pos.y));
            assert!(pos.x < 3200.0);
        }

        #[test]
        fn positions_clamp_to_the_world_margin() {
            let collision = CollisionMask::open(100, 100, 64);
            let mut pos = vec2::new(25.0, 25.0);
            let vel = input_velocity(MoveKeys::A | MoveKeys::W, Facing::UpLeft, 5.0, 1);
            step(&mut pos, &vel, 0.05, PLAYER_RADIUS, 20.0, &collision);
            assert_eq!(pos, vec2::new(20.0, 20.0));
        }
    }
}
