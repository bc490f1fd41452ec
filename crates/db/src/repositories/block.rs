use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{sqlite::SqliteRow, Row};

use lodgr_core::domain::block::{BlockReference, BlockStatus, BlockType, RoomBlock};
use lodgr_core::domain::room::RoomTypeId;
use lodgr_core::stay::StayRange;

use super::{BlockRepository, RepositoryError};
use crate::DbPool;

pub struct SqlBlockRepository {
    pool: DbPool,
}

impl SqlBlockRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const BLOCK_COLUMNS: &str = "block_reference, room_type_id, start_date, end_date, \
     rooms_blocked, block_type, reason, blocked_by, status, expires_at, created_at, \
     released_at, release_reason";

#[async_trait::async_trait]
impl BlockRepository for SqlBlockRepository {
    async fn find_by_reference(
        &self,
        reference: &BlockReference,
    ) -> Result<Option<RoomBlock>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {BLOCK_COLUMNS} FROM room_blocks WHERE block_reference = ?"
        ))
        .bind(&reference.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(block_from_row).transpose()
    }

    async fn list_active(
        &self,
        room_type_id: &RoomTypeId,
        now: DateTime<Utc>,
    ) -> Result<Vec<RoomBlock>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {BLOCK_COLUMNS} FROM room_blocks
             WHERE room_type_id = ?
               AND status = 'ACTIVE'
               AND (expires_at IS NULL OR expires_at > ?)
             ORDER BY start_date ASC, block_reference ASC"
        ))
        .bind(&room_type_id.0)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(block_from_row).collect()
    }
}

pub(crate) fn block_from_row(row: SqliteRow) -> Result<RoomBlock, RepositoryError> {
    let reference: String = row.get("block_reference");

    let status_text: String = row.get("status");
    let status = BlockStatus::parse(&status_text).ok_or_else(|| {
        RepositoryError::Decode(format!("unknown block status `{status_text}` on `{reference}`"))
    })?;

    let type_text: String = row.get("block_type");
    let block_type = BlockType::parse(&type_text).ok_or_else(|| {
        RepositoryError::Decode(format!("unknown block type `{type_text}` on `{reference}`"))
    })?;

    let range = StayRange::new(
        row.get::<NaiveDate, _>("start_date"),
        row.get::<NaiveDate, _>("end_date"),
    )
    .map_err(|error| RepositoryError::Decode(format!("block range on `{reference}`: {error}")))?;

    Ok(RoomBlock {
        reference: BlockReference(reference),
        room_type_id: RoomTypeId(row.get("room_type_id")),
        range,
        rooms_blocked: row.get::<i64, _>("rooms_blocked") as u32,
        block_type,
        reason: row.get("reason"),
        blocked_by: row.get("blocked_by"),
        status,
        expires_at: row.get::<Option<DateTime<Utc>>, _>("expires_at"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        released_at: row.get::<Option<DateTime<Utc>>, _>("released_at"),
        release_reason: row.get("release_reason"),
    })
}
