use serde::{Deserialize, Serialize};

/// the finite monster type set. per-type stats are configuration
/// data and live with the monster entity, not here.
#[derive(
    Debug,
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
pub enum MonsterType {
    /// slow chaser with a wide melee swing
    Ogre,
    /// ranged attacker, keeps its distance
    Skeleton,
    /// fast cone attacker
    Ghoul,
    /// balanced melee type
    Wolf,
}
