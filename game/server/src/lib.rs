pub mod client;
pub mod server;
pub mod server_game;
