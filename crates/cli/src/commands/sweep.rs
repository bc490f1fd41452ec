use chrono::Utc;

use lodgr_db::InventoryLedger;

use crate::commands::{build_runtime, load_config, open_database, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config("sweep") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime("sweep") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;
        let swept = InventoryLedger::new(pool.clone())
            .sweep_expired_blocks(Utc::now())
            .await
            .map_err(|error| ("sweep", error.to_string(), 6u8))?;
        pool.close().await;
        Ok::<u64, (&'static str, String, u8)>(swept)
    });

    match result {
        Ok(swept) => CommandResult::success(
            "sweep",
            format!("marked {swept} expired block(s); reads were already correct without it"),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("sweep", error_class, message, exit_code)
        }
    }
}
