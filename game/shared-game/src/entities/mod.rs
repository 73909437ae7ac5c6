pub mod character;
pub mod character_core;
pub mod entity;
pub mod monster;
pub mod powerup;
pub mod projectile;
