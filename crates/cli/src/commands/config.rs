use serde::Serialize;

use lodgr_core::config::LogFormat;

use crate::commands::{load_config, CommandResult};

#[derive(Serialize)]
struct EffectiveConfig {
    database_url: String,
    database_max_connections: u32,
    database_timeout_secs: u64,
    server_bind_address: String,
    server_port: u16,
    logging_level: String,
    logging_format: LogFormat,
}

pub fn run() -> CommandResult {
    let config = match load_config("config") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let effective = EffectiveConfig {
        database_url: config.database.url,
        database_max_connections: config.database.max_connections,
        database_timeout_secs: config.database.timeout_secs,
        server_bind_address: config.server.bind_address,
        server_port: config.server.port,
        logging_level: config.logging.level,
        logging_format: config.logging.format,
    };

    match serde_json::to_string_pretty(&effective) {
        Ok(rendered) => CommandResult { exit_code: 0, output: rendered },
        Err(error) => CommandResult::failure("config", "serialization", error.to_string(), 8),
    }
}
