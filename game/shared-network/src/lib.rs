pub mod game_event_generator;
pub mod messages;
