pub mod abilities;
pub mod anti_cheat;
pub mod collision;
pub mod config;
pub mod damage;
pub mod entities;
pub mod events;
pub mod lag_compensation;
pub mod simulation_pipe;
pub mod snapshot;
pub mod state;
pub mod world;
