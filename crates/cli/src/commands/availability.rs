use chrono::NaiveDate;
use serde::Serialize;

use lodgr_core::domain::room::RoomTypeId;
use lodgr_core::errors::LedgerError;
use lodgr_core::stay::StayRange;
use lodgr_db::InventoryLedger;

use crate::commands::{build_runtime, load_config, open_database, CommandResult};

#[derive(Serialize)]
struct NightBreakdown {
    date: NaiveDate,
    total: i64,
    booked: i64,
    blocked: i64,
    available: i64,
}

#[derive(Serialize)]
struct AvailabilityOutput {
    room_type_id: String,
    check_in: NaiveDate,
    check_out: NaiveDate,
    requested: u32,
    available: bool,
    min_available: i64,
    nights: Vec<NightBreakdown>,
}

pub fn run(room_type_id: &str, check_in: NaiveDate, check_out: NaiveDate, count: u32) -> CommandResult {
    let stay = match StayRange::new(check_in, check_out) {
        Ok(stay) => stay,
        Err(error) => {
            return CommandResult::failure("availability", "invalid_date_range", error.to_string(), 2);
        }
    };
    let config = match load_config("availability") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime("availability") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;
        let check = InventoryLedger::new(pool.clone())
            .check_availability(&RoomTypeId(room_type_id.to_string()), &stay, count)
            .await
            .map_err(|error| match error {
                LedgerError::NotFound(_) => ("not_found", error.to_string(), 6u8),
                other => ("ledger", other.to_string(), 7u8),
            })?;
        pool.close().await;
        Ok::<_, (&'static str, String, u8)>(check)
    });

    match result {
        Ok(check) => {
            let output = AvailabilityOutput {
                room_type_id: room_type_id.to_string(),
                check_in,
                check_out,
                requested: count,
                available: check.available,
                min_available: check.min_available,
                nights: check
                    .report
                    .nights
                    .iter()
                    .map(|night| NightBreakdown {
                        date: night.date,
                        total: night.total_rooms,
                        booked: night.booked_rooms,
                        blocked: night.blocked_rooms,
                        // Operator display clamps; the raw ledger value is
                        // asserted non-negative by the write paths.
                        available: night.available().max(0),
                    })
                    .collect(),
            };
            match serde_json::to_string_pretty(&output) {
                Ok(rendered) => CommandResult { exit_code: 0, output: rendered },
                Err(error) => {
                    CommandResult::failure("availability", "serialization", error.to_string(), 8)
                }
            }
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("availability", error_class, message, exit_code)
        }
    }
}
