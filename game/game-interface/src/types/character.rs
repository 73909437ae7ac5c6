use math::math::vector::vec2;
use serde::{Deserialize, Serialize};

/// all playable classes. the wire uses the lowercase names.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CharacterClass {
    #[default]
    Bladedancer,
    Guardian,
    Hunter,
    Rogue,
}

/// 8-way facing. the wire names match the client's key layout
/// ("up-right" etc), the unit vectors are what the movement kernel
/// and the hit shapes compute with.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Facing {
    Up,
    UpRight,
    Right,
    DownRight,
    #[default]
    Down,
    DownLeft,
    Left,
    UpLeft,
}

impl Facing {
    const DIAG: f32 = std::f32::consts::FRAC_1_SQRT_2;

    /// unit vector in screen coordinates (y grows downward)
    pub fn dir(&self) -> vec2 {
        match self {
            Facing::Up => vec2::new(0.0, -1.0),
            Facing::UpRight => vec2::new(Self::DIAG, -Self::DIAG),
            Facing::Right => vec2::new(1.0, 0.0),
            Facing::DownRight => vec2::new(Self::DIAG, Self::DIAG),
            Facing::Down => vec2::new(0.0, 1.0),
            Facing::DownLeft => vec2::new(-Self::DIAG, Self::DIAG),
            Facing::Left => vec2::new(-1.0, 0.0),
            Facing::UpLeft => vec2::new(-Self::DIAG, -Self::DIAG),
        }
    }

    /// angle in radians, 0 = right, clockwise positive (screen coordinates)
    pub fn angle(&self) -> f32 {
        let dir = self.dir();
        dir.y.atan2(dir.x)
    }

    /// the facing closest to an arbitrary direction vector
    pub fn from_dir(dir: &vec2) -> Self {
        let angle = dir.y.atan2(dir.x);
        let step = std::f32::consts::PI / 4.0;
        let octant = (angle / step).round() as i32;
        match octant.rem_euclid(8) {
            0 => Facing::Right,
            1 => Facing::DownRight,
            2 => Facing::Down,
            3 => Facing::DownLeft,
            4 => Facing::Left,
            5 => Facing::UpLeft,
            6 => Facing::Up,
            _ => Facing::UpRight,
        }
    }
}
