pub mod abilities {
    use game_interface::{
        events::TelegraphShape,
        types::{
            character::{CharacterClass, Facing},
            input::AbilityKind,
        },
    };
    use math::math::{dot, length, normalize, vector::vec2, PI};
    use serde::{Deserialize, Serialize};

    /// how far off the supplied mouse-aim angle may be from the 8-way
    /// facing before the server falls back to the facing itself
    pub const AIM_TOLERANCE_RAD: f32 = PI / 6.0;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case", tag = "archetype")]
    pub enum AttackArchetype {
        MeleeRect {
            length: f32,
            width: f32,
        },
        MeleeCone {
            range: f32,
            angle_deg: f32,
        },
        Projectile {
            speed: f32,
            range: f32,
            effect_tag: String,
            spawn_offset: f32,
            /// whether the attacker's supplied aim angle is honored
            aimable: bool,
        },
        Jump {
            distance: f32,
            i_frames: bool,
        },
        Dash {
            distance: f32,
            i_frames: bool,
        },
        /// movement only, i-frames for the whole active phase
        Roll {
            distance: f32,
        },
    }

    impl AttackArchetype {
        pub fn grants_i_frames(&self) -> bool {
            match self {
                AttackArchetype::Jump { i_frames, .. } | AttackArchetype::Dash { i_frames, .. } => {
                    *i_frames
                }
                AttackArchetype::Roll { .. } => true,
                _ => false,
            }
        }

        pub fn translate_distance(&self) -> Option<f32> {
            match self {
                AttackArchetype::Jump { distance, .. }
                | AttackArchetype::Dash { distance, .. }
                | AttackArchetype::Roll { distance } => Some(*distance),
                _ => None,
            }
        }

        pub fn telegraph_shape(&self) -> Option<TelegraphShape> {
            match self {
                AttackArchetype::MeleeRect { length, width } => Some(TelegraphShape::Rect {
                    length: *length,
                    width: *width,
                }),
                AttackArchetype::MeleeCone { range, angle_deg } => Some(TelegraphShape::Cone {
                    range: *range,
                    angle_deg: *angle_deg,
                }),
                _ => None,
            }
        }
    }

    /// one entry of the per-class attack table. all numbers are
    /// configuration data with defaults, not engine constants.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct AbilitySpec {
        pub archetype: AttackArchetype,
        pub windup_ms: u64,
        pub active_ms: u64,
        pub recovery_ms: u64,
        pub cooldown_ms: u64,
        pub damage: u32,
        /// whether hit checks rewind targets to the attacker's view
        pub lag_compensated: bool,
    }

    impl AbilitySpec {
        pub fn total_ms(&self) -> u64 {
            self.windup_ms + self.active_ms + self.recovery_ms
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ClassAbilities {
        pub primary: AbilitySpec,
        pub secondary: AbilitySpec,
        pub roll: AbilitySpec,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct AbilityTable {
        pub bladedancer: ClassAbilities,
        pub guardian: ClassAbilities,
        pub hunter: ClassAbilities,
        pub rogue: ClassAbilities,
    }

    fn default_roll() -> AbilitySpec {
        AbilitySpec {
            archetype: AttackArchetype::Roll { distance: 120.0 },
            windup_ms: 0,
            active_ms: 300,
            recovery_ms: 100,
            cooldown_ms: 2000,
            damage: 0,
            lag_compensated: false,
        }
    }

    impl Default for AbilityTable {
        fn default() -> Self {
            Self {
                bladedancer: ClassAbilities {
                    primary: AbilitySpec {
                        archetype: AttackArchetype::MeleeCone {
                            range: 80.0,
                            angle_deg: 120.0,
                        },
                        windup_ms: 100,
                        active_ms: 80,
                        recovery_ms: 150,
                        cooldown_ms: 500,
                        damage: 1,
                        lag_compensated: true,
                    },
                    secondary: AbilitySpec {
                        archetype: AttackArchetype::Dash {
                            distance: 150.0,
                            i_frames: true,
                        },
                        windup_ms: 50,
                        active_ms: 200,
                        recovery_ms: 100,
                        cooldown_ms: 3000,
                        damage: 0,
                        lag_compensated: false,
                    },
                    roll: default_roll(),
                },
                guardian: ClassAbilities {
                    primary: AbilitySpec {
                        archetype: AttackArchetype::MeleeRect {
                            length: 90.0,
                            width: 70.0,
                        },
                        windup_ms: 250,
                        active_ms: 100,
                        recovery_ms: 300,
                        cooldown_ms: 800,
                        damage: 2,
                        lag_compensated: true,
                    },
                    secondary: AbilitySpec {
                        archetype: AttackArchetype::Jump {
                            distance: 140.0,
                            i_frames: false,
                        },
                        windup_ms: 150,
                        active_ms: 300,
                        recovery_ms: 200,
                        cooldown_ms: 5000,
                        damage: 0,
                        lag_compensated: false,
                    },
                    roll: default_roll(),
                },
                hunter: ClassAbilities {
                    primary: AbilitySpec {
                        archetype: AttackArchetype::Projectile {
                            speed: 600.0,
                            range: 400.0,
                            effect_tag: "arrow".to_string(),
                            spawn_offset: 30.0,
                            aimable: true,
                        },
                        windup_ms: 80,
                        active_ms: 0,
                        recovery_ms: 120,
                        cooldown_ms: 300,
                        damage: 1,
                        lag_compensated: false,
                    },
                    secondary: AbilitySpec {
                        archetype: AttackArchetype::Projectile {
                            speed: 800.0,
                            range: 500.0,
                            effect_tag: "power_arrow".to_string(),
                            spawn_offset: 30.0,
                            aimable: false,
                        },
                        windup_ms: 200,
                        active_ms: 0,
                        recovery_ms: 200,
                        cooldown_ms: 1500,
                        damage: 2,
                        lag_compensated: false,
                    },
                    roll: default_roll(),
                },
                rogue: ClassAbilities {
                    primary: AbilitySpec {
                        archetype: AttackArchetype::MeleeRect {
                            length: 60.0,
                            width: 40.0,
                        },
                        windup_ms: 60,
                        active_ms: 60,
                        recovery_ms: 120,
                        cooldown_ms: 300,
                        damage: 1,
                        lag_compensated: true,
                    },
                    secondary: AbilitySpec {
                        archetype: AttackArchetype::Dash {
                            distance: 180.0,
                            i_frames: true,
                        },
                        windup_ms: 0,
                        active_ms: 150,
                        recovery_ms: 100,
                        cooldown_ms: 2500,
                        damage: 0,
                        lag_compensated: false,
                    },
                    roll: default_roll(),
                },
            }
        }
    }

    impl AbilityTable {
        pub fn for_class(&self, class: CharacterClass) -> &ClassAbilities {
            match class {
                CharacterClass::Bladedancer => &self.bladedancer,
                CharacterClass::Guardian => &self.guardian,
                CharacterClass::Hunter => &self.hunter,
                CharacterClass::Rogue => &self.rogue,
            }
        }

        pub fn spec(&self, class: CharacterClass, kind: AbilityKind) -> &AbilitySpec {
            let class_abilities = self.for_class(class);
            match kind {
                AbilityKind::Primary => &class_abilities.primary,
                AbilityKind::Secondary => &class_abilities.secondary,
                AbilityKind::Roll => &class_abilities.roll,
            }
        }

        /// the most permissive cooldown across all classes and slots,
        /// the anti cheat derives its ability rate bound from this
        pub fn min_cooldown_ms(&self) -> u64 {
            [
                &self.bladedancer,
                &self.guardian,
                &self.hunter,
                &self.rogue,
            ]
            .iter()
            .flat_map(|c| [&c.primary, &c.secondary, &c.roll])
            .map(|spec| spec.cooldown_ms)
            .min()
            .unwrap_or(0)
        }
    }

    /// rectangle hit test: the attacker position is the middle of one
    /// short edge, the shape extends forward by `length` and
    /// `width / 2` to each side, rotated by facing. the target radius
    /// widens the test inclusively.
    pub fn rect_hit(
        origin: &vec2,
        facing: Facing,
        rect_length: f32,
        width: f32,
        target: &vec2,
        target_radius: f32,
    ) -> bool {
        let forward = facing.dir();
        let lateral = vec2::new(-forward.y, forward.x);
        let rel = *target - *origin;
        let along = dot(&rel, &forward);
        let across = dot(&rel, &lateral);
        along >= -target_radius
            && along <= rect_length + target_radius
            && across.abs() <= width / 2.0 + target_radius
    }

    /// circular sector hit test centered on facing
    pub fn cone_hit(
        origin: &vec2,
        facing: Facing,
        range: f32,
        angle_deg: f32,
        target: &vec2,
        target_radius: f32,
    ) -> bool {
        let rel = *target - *origin;
        let dist = length(&rel);
        if dist > range + target_radius {
            return false;
        }
        // a target overlapping the attacker is in every sector
        if dist <= target_radius {
            return true;
        }
        let cos = dot(&normalize(&rel), &facing.dir()).clamp(-1.0, 1.0);
        let half_angle = angle_deg.to_radians() / 2.0;
        cos.acos() <= half_angle
    }

    /// resolves the angle a projectile launches at: the supplied aim
    /// if it is close enough to the 8-way facing, the facing otherwise
    pub fn validated_aim_angle(facing: Facing, aim: Option<f32>) -> f32 {
        let facing_angle = facing.angle();
        match aim {
            Some(aim) if aim.is_finite() => {
                let mut diff = aim - facing_angle;
                while diff > PI {
                    diff -= 2.0 * PI;
                }
                while diff < -PI {
                    diff += 2.0 * PI;
                }
                if diff.abs() <= AIM_TOLERANCE_RAD {
                    aim
                } else {
                    facing_angle
                }
            }
            _ => facing_angle,
        }
    }

    #[cfg(test)]
    mod test {
        use super::*;

        #[test]
        fn rect_hit_respects_facing_rotation() {
            let origin = vec2::new(100.0, 100.0);
            // facing right, 90 long, 40 wide
            assert!(rect_hit(
                &origin,
                Facing::Right,
                90.0,
                40.0,
                &vec2::new(180.0, 110.0),
                10.0
            ));
            // behind the attacker
            assert!(!rect_hit(
                &origin,
                Facing::Right,
                90.0,
                40.0,
                &vec2::new(40.0, 100.0),
                10.0
            ));
            // same point hits when facing left
            assert!(rect_hit(
                &origin,
                Facing::Left,
                90.0,
                40.0,
                &vec2::new(40.0, 100.0),
                10.0
            ));
            // target radius widens the lateral band
            assert!(rect_hit(
                &origin,
                Facing::Right,
                90.0,
                40.0,
                &vec2::new(150.0, 128.0),
                10.0
            ));
            assert!(!rect_hit(
                &origin,
                Facing::Right,
                90.0,
                40.0,
                &vec2::new(150.0, 131.0),
                10.0
            ));
        }

        #[test]
        fn cone_hit_is_bounded_by_range_and_angle() {
            let origin = vec2::new(0.0, 0.0);
            // 120 deg cone facing down
            assert!(cone_hit(
                &origin,
                Facing::Down,
                80.0,
                120.0,
                &vec2::new(30.0, 60.0),
                10.0
            ));
            // out of range
            assert!(!cone_hit(
                &origin,
                Facing::Down,
                80.0,
                120.0,
                &vec2::new(0.0, 95.0),
                10.0
            ));
            // behind the facing
            assert!(!cone_hit(
                &origin,
                Facing::Down,
                80.0,
                120.0,
                &vec2::new(0.0, -50.0),
                10.0
            ));
        }

        #[test]
        fn aim_angle_falls_back_to_facing() {
            let facing = Facing::Right;
            assert_eq!(validated_aim_angle(facing, None), facing.angle());
            // within tolerance: honored
            assert_eq!(validated_aim_angle(facing, Some(0.3)), 0.3);
            // way off: clamped to facing
            assert_eq!(validated_aim_angle(facing, Some(2.5)), facing.angle());
            assert_eq!(validated_aim_angle(facing, Some(f32::NAN)), facing.angle());
        }

        #[test]
        fn min_cooldown_covers_every_slot() {
            let table = AbilityTable::default();
            assert_eq!(table.min_cooldown_ms(), 300);
        }
    }
}
