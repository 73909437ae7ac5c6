use std::sync::{atomic::AtomicBool, Arc};

use clap::{command, Command};
use server::server::game_server_main;
use shared_game::config::config::GameConfig;

fn main() -> anyhow::Result<()> {
    let matches = command!()
        .subcommand(Command::new("default_config").about("Print the default config"))
        .get_matches();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    if matches
        .subcommand_name()
        .is_some_and(|cmd| cmd == "default_config")
    {
        println!(
            "{}",
            serde_json::to_string_pretty(&GameConfig::default())
                .expect("the default config always serializes")
        );
        return Ok(());
    }

    let config = GameConfig::from_env();

    let server_is_open = Arc::new(AtomicBool::new(true));
    let ctrlc_is_open = server_is_open.clone();
    ctrlc::set_handler(move || {
        ctrlc_is_open.store(false, std::sync::atomic::Ordering::Relaxed);
    })?;

    game_server_main(config, server_is_open)
}
