//! PostgreSQL persistence for cycle state and audit records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::audit::{
    ActivityAction, ActivityLogEntry, SessionRecord, SessionRecordStatus, SessionType,
};
use crate::domain::cycle::CycleState;
use crate::domain::foundation::{
    ConductId, DomainError, ErrorCode, SessionRecordId, Timestamp, UserId,
};
use crate::domain::zone::ZoneId;
use crate::ports::{
    ActivityLogRepository, CycleCommit, CycleStateRepository, SessionRecordRepository,
    StoredCycleState,
};

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::database(format!("{}: {}", context, e))
}

fn parse_zone(raw: &str) -> Result<ZoneId, DomainError> {
    ZoneId::new(raw).map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid zone value: {}", e))
    })
}

/// Cycle state as a JSONB tagged variant, with the session records and
/// activity log it is committed alongside.
#[derive(Clone)]
pub struct PostgresCycleStore {
    pool: PgPool,
}

impl PostgresCycleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CycleStateRow {
    user_id: Uuid,
    conduct_id: Uuid,
    state: Json<CycleState>,
}

impl From<CycleStateRow> for StoredCycleState {
    fn from(row: CycleStateRow) -> Self {
        StoredCycleState {
            user_id: UserId::from_uuid(row.user_id),
            conduct_id: ConductId::from_uuid(row.conduct_id),
            state: row.state.0,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SessionRecordRow {
    id: Uuid,
    user_id: Uuid,
    conduct_id: Uuid,
    zone: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    status: String,
    session_type: String,
}

impl TryFrom<SessionRecordRow> for SessionRecord {
    type Error = DomainError;

    fn try_from(row: SessionRecordRow) -> Result<Self, Self::Error> {
        let status = SessionRecordStatus::parse(&row.status).ok_or_else(|| {
            DomainError::database(format!("Invalid session status value: {}", row.status))
        })?;
        let session_type = match row.session_type.as_str() {
            "work" => SessionType::Work,
            "rest" => SessionType::Rest,
            other => {
                return Err(DomainError::database(format!(
                    "Invalid session type value: {}",
                    other
                )))
            }
        };

        Ok(SessionRecord {
            id: SessionRecordId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            conduct_id: ConductId::from_uuid(row.conduct_id),
            zone: parse_zone(&row.zone)?,
            start_time: Timestamp::from_datetime(row.start_time),
            end_time: Timestamp::from_datetime(row.end_time),
            status,
            session_type,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ActivityRow {
    conduct_id: Uuid,
    sequence: i64,
    user_id: Option<Uuid>,
    username: String,
    action: String,
    zone: Option<String>,
    details: Option<String>,
    timestamp: DateTime<Utc>,
}

impl TryFrom<ActivityRow> for ActivityLogEntry {
    type Error = DomainError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        let action = ActivityAction::parse(&row.action).ok_or_else(|| {
            DomainError::database(format!("Invalid activity action value: {}", row.action))
        })?;

        Ok(ActivityLogEntry {
            conduct_id: ConductId::from_uuid(row.conduct_id),
            user_id: row.user_id.map(UserId::from_uuid),
            username: row.username,
            action,
            zone: row.zone.as_deref().map(parse_zone).transpose()?,
            details: row.details,
            timestamp: Timestamp::from_datetime(row.timestamp),
            sequence: u64::try_from(row.sequence).map_err(|_| {
                DomainError::database(format!("Negative activity sequence: {}", row.sequence))
            })?,
        })
    }
}

const ACTIVITY_COLUMNS: &str =
    "conduct_id, sequence, user_id, username, action, zone, details, timestamp";

// ════════════════════════════════════════════════════════════════════════════
// Cycle state
// ════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl CycleStateRepository for PostgresCycleStore {
    async fn load(&self, user_id: &UserId) -> Result<Option<StoredCycleState>, DomainError> {
        let row: Option<CycleStateRow> = sqlx::query_as(
            r#"
            SELECT user_id, conduct_id, state
            FROM cycle_states
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load cycle state", e))?;

        Ok(row.map(StoredCycleState::from))
    }

    async fn commit_transition(&self, commit: &CycleCommit) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        for record in &commit.records {
            insert_session_record(&mut tx, record).await?;
        }
        insert_activity(&mut *tx, &commit.entry).await?;
        upsert_state(&mut tx, &commit.state).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit cycle transition", e))?;

        Ok(())
    }

    async fn find_active(&self) -> Result<Vec<StoredCycleState>, DomainError> {
        let rows: Vec<CycleStateRow> = sqlx::query_as(
            r#"
            SELECT user_id, conduct_id, state
            FROM cycle_states
            WHERE state->>'status' <> 'idle'
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list active cycle states", e))?;

        Ok(rows.into_iter().map(StoredCycleState::from).collect())
    }

    async fn delete(&self, user_id: &UserId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM cycle_states WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete cycle state", e))?;
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Session records
// ════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl SessionRecordRepository for PostgresCycleStore {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<SessionRecord>, DomainError> {
        let rows: Vec<SessionRecordRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, conduct_id, zone, start_time, end_time, status, session_type
            FROM session_records
            WHERE user_id = $1
            ORDER BY start_time ASC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find session records", e))?;

        rows.into_iter().map(SessionRecord::try_from).collect()
    }

    async fn find_by_conduct(
        &self,
        conduct_id: &ConductId,
    ) -> Result<Vec<SessionRecord>, DomainError> {
        let rows: Vec<SessionRecordRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, conduct_id, zone, start_time, end_time, status, session_type
            FROM session_records
            WHERE conduct_id = $1
            ORDER BY start_time ASC
            "#,
        )
        .bind(conduct_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find session records", e))?;

        rows.into_iter().map(SessionRecord::try_from).collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Activity log
// ════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl ActivityLogRepository for PostgresCycleStore {
    async fn append(&self, entry: &ActivityLogEntry) -> Result<(), DomainError> {
        insert_activity(&self.pool, entry).await
    }

    async fn latest_for_conduct(
        &self,
        conduct_id: &ConductId,
    ) -> Result<Option<ActivityLogEntry>, DomainError> {
        let row: Option<ActivityRow> = sqlx::query_as(&format!(
            "SELECT {} FROM activity_log WHERE conduct_id = $1 ORDER BY sequence DESC LIMIT 1",
            ACTIVITY_COLUMNS
        ))
        .bind(conduct_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load latest activity entry", e))?;

        row.map(ActivityLogEntry::try_from).transpose()
    }

    async fn history(
        &self,
        conduct_id: &ConductId,
        limit: Option<u32>,
    ) -> Result<Vec<ActivityLogEntry>, DomainError> {
        let rows: Vec<ActivityRow> = sqlx::query_as(&format!(
            "SELECT {} FROM activity_log WHERE conduct_id = $1 \
             ORDER BY timestamp DESC, sequence DESC LIMIT $2",
            ACTIVITY_COLUMNS
        ))
        .bind(conduct_id.as_uuid())
        .bind(limit.map(i64::from))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load activity history", e))?;

        rows.into_iter().map(ActivityLogEntry::try_from).collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper Functions
// ════════════════════════════════════════════════════════════════════════════

async fn upsert_state(
    tx: &mut Transaction<'_, Postgres>,
    record: &StoredCycleState,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO cycle_states (user_id, conduct_id, status, state, updated_at)
        VALUES ($1, $2, $3, $4, NOW())
        ON CONFLICT (user_id) DO UPDATE SET
            conduct_id = EXCLUDED.conduct_id,
            status = EXCLUDED.status,
            state = EXCLUDED.state,
            updated_at = NOW()
        "#,
    )
    .bind(record.user_id.as_uuid())
    .bind(record.conduct_id.as_uuid())
    .bind(record.state.status().as_str())
    .bind(Json(&record.state))
    .execute(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to save cycle state", e))?;

    Ok(())
}

async fn insert_session_record(
    tx: &mut Transaction<'_, Postgres>,
    record: &SessionRecord,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO session_records (
            id, user_id, conduct_id, zone, start_time, end_time, status, session_type
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(record.id.as_uuid())
    .bind(record.user_id.as_uuid())
    .bind(record.conduct_id.as_uuid())
    .bind(record.zone.as_str())
    .bind(record.start_time.as_datetime())
    .bind(record.end_time.as_datetime())
    .bind(record.status.as_str())
    .bind(record.session_type.as_str())
    .execute(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to append session record", e))?;

    Ok(())
}

/// Inserts one activity row; the `(conduct_id, sequence)` key rejects a
/// sequence that is already taken.
async fn insert_activity<'e, E>(executor: E, entry: &ActivityLogEntry) -> Result<(), DomainError>
where
    E: PgExecutor<'e>,
{
    let sequence = i64::try_from(entry.sequence).map_err(|_| {
        DomainError::new(ErrorCode::OutOfRange, "Activity sequence exceeds i64")
    })?;

    sqlx::query(
        r#"
        INSERT INTO activity_log (
            conduct_id, sequence, user_id, username, action, zone, details, timestamp
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(entry.conduct_id.as_uuid())
    .bind(sequence)
    .bind(entry.user_id.map(|id| *id.as_uuid()))
    .bind(&entry.username)
    .bind(entry.action.as_str())
    .bind(entry.zone.as_ref().map(|z| z.as_str().to_string()))
    .bind(&entry.details)
    .bind(entry.timestamp.as_datetime())
    .execute(executor)
    .await
    .map_err(|e| db_error("Failed to append activity entry", e))?;

    Ok(())
}
