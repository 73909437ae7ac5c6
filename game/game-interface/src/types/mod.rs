pub mod character;
pub mod game;
pub mod id_gen;
pub mod input;
pub mod monster;
