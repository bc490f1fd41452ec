use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use lodgr_core::domain::room::RoomTypeId;
use lodgr_db::repositories::{BlockRepository, SqlBlockRepository};

use crate::commands::{build_runtime, load_config, open_database, CommandResult};

#[derive(Serialize)]
struct BlockLine {
    block_reference: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    rooms_blocked: u32,
    block_type: &'static str,
    reason: Option<String>,
    blocked_by: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct BlocksOutput {
    room_type_id: String,
    active_blocks: Vec<BlockLine>,
}

pub fn run(room_type_id: &str) -> CommandResult {
    let config = match load_config("blocks") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime("blocks") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;
        let blocks = SqlBlockRepository::new(pool.clone())
            .list_active(&RoomTypeId(room_type_id.to_string()), Utc::now())
            .await
            .map_err(|error| ("repository", error.to_string(), 6u8))?;
        pool.close().await;
        Ok::<_, (&'static str, String, u8)>(blocks)
    });

    match result {
        Ok(blocks) => {
            let output = BlocksOutput {
                room_type_id: room_type_id.to_string(),
                active_blocks: blocks
                    .into_iter()
                    .map(|block| BlockLine {
                        block_reference: block.reference.0,
                        start_date: block.range.check_in(),
                        end_date: block.range.check_out(),
                        rooms_blocked: block.rooms_blocked,
                        block_type: block.block_type.as_str(),
                        reason: block.reason,
                        blocked_by: block.blocked_by,
                        expires_at: block.expires_at,
                    })
                    .collect(),
            };
            match serde_json::to_string_pretty(&output) {
                Ok(rendered) => CommandResult { exit_code: 0, output: rendered },
                Err(error) => CommandResult::failure("blocks", "serialization", error.to_string(), 8),
            }
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("blocks", error_class, message, exit_code)
        }
    }
}
