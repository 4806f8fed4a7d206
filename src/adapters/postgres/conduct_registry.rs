//! PostgreSQL implementation of the ConductRegistry port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::conduct::{Conduct, ConductStatus, CutOff, Participant, ParticipantRole, Pin};
use crate::domain::foundation::{
    CompanyId, ConductId, DomainError, ErrorCode, Timestamp, UserId,
};
use crate::ports::{ConductRegistry, PinInsertOutcome};

const PIN_CONSTRAINT: &str = "conducts_pin_key";

pub struct PostgresConductRegistry {
    pool: PgPool,
}

impl PostgresConductRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ConductRow {
    id: Uuid,
    company_id: Uuid,
    name: String,
    pin: String,
    status: String,
    cut_off_since: Option<DateTime<Utc>>,
    mandatory_rest_until: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl TryFrom<ConductRow> for Conduct {
    type Error = DomainError;

    fn try_from(row: ConductRow) -> Result<Self, Self::Error> {
        let status = ConductStatus::parse(&row.status).ok_or_else(|| {
            DomainError::database(format!("Invalid conduct status value: {}", row.status))
        })?;
        let pin = Pin::try_new(&row.pin)
            .map_err(|e| DomainError::database(format!("Invalid stored PIN: {}", e)))?;

        Ok(Conduct::reconstitute(
            ConductId::from_uuid(row.id),
            CompanyId::from_uuid(row.company_id),
            row.name,
            pin,
            status,
            CutOff::from_columns(
                row.cut_off_since.map(Timestamp::from_datetime),
                row.mandatory_rest_until.map(Timestamp::from_datetime),
            ),
            Timestamp::from_datetime(row.created_at),
            Timestamp::from_datetime(row.last_activity_at),
        ))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ParticipantRow {
    user_id: Uuid,
    conduct_id: Uuid,
    name: String,
    role: String,
    joined_at: DateTime<Utc>,
}

impl TryFrom<ParticipantRow> for Participant {
    type Error = DomainError;

    fn try_from(row: ParticipantRow) -> Result<Self, Self::Error> {
        let role = ParticipantRole::parse(&row.role).ok_or_else(|| {
            DomainError::database(format!("Invalid participant role value: {}", row.role))
        })?;

        Ok(Participant {
            user_id: UserId::from_uuid(row.user_id),
            conduct_id: ConductId::from_uuid(row.conduct_id),
            name: row.name,
            role,
            joined_at: Timestamp::from_datetime(row.joined_at),
        })
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::database(format!("{}: {}", context, e))
}

#[async_trait]
impl ConductRegistry for PostgresConductRegistry {
    async fn insert_conduct(&self, conduct: &Conduct) -> Result<PinInsertOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO conducts (id, company_id, name, pin, status, created_at, last_activity_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(conduct.id().as_uuid())
        .bind(conduct.company_id().as_uuid())
        .bind(conduct.name())
        .bind(conduct.pin().as_str())
        .bind(conduct.status().as_str())
        .bind(conduct.created_at().as_datetime())
        .bind(conduct.last_activity_at().as_datetime())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(PinInsertOutcome::Inserted),
            Err(sqlx::Error::Database(db_err))
                if db_err.is_unique_violation() && db_err.constraint() == Some(PIN_CONSTRAINT) =>
            {
                Ok(PinInsertOutcome::PinTaken)
            }
            Err(e) => Err(db_error("Failed to insert conduct", e)),
        }
    }

    async fn find_by_id(&self, id: &ConductId) -> Result<Option<Conduct>, DomainError> {
        let row: Option<ConductRow> = sqlx::query_as(
            r#"
            SELECT id, company_id, name, pin, status, cut_off_since, mandatory_rest_until,
                   created_at, last_activity_at
            FROM conducts
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find conduct", e))?;

        row.map(Conduct::try_from).transpose()
    }

    async fn find_by_pin(&self, pin: &Pin) -> Result<Option<Conduct>, DomainError> {
        let row: Option<ConductRow> = sqlx::query_as(
            r#"
            SELECT id, company_id, name, pin, status, cut_off_since, mandatory_rest_until,
                   created_at, last_activity_at
            FROM conducts
            WHERE pin = $1
            "#,
        )
        .bind(pin.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find conduct by PIN", e))?;

        row.map(Conduct::try_from).transpose()
    }

    async fn update_conduct(&self, conduct: &Conduct) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE conducts SET
                name = $2,
                status = $3,
                last_activity_at = $4,
                cut_off_since = $5,
                mandatory_rest_until = $6
            WHERE id = $1
            "#,
        )
        .bind(conduct.id().as_uuid())
        .bind(conduct.name())
        .bind(conduct.status().as_str())
        .bind(conduct.last_activity_at().as_datetime())
        .bind(conduct.cut_off().since().map(|t| *t.as_datetime()))
        .bind(conduct.cut_off().mandatory_rest_until().map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update conduct", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ConductNotFound,
                format!("Conduct not found: {}", conduct.id()),
            ));
        }

        Ok(())
    }

    async fn add_participant(&self, participant: &Participant) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO participants (user_id, conduct_id, name, role, joined_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(participant.user_id.as_uuid())
        .bind(participant.conduct_id.as_uuid())
        .bind(&participant.name)
        .bind(participant.role.as_str())
        .bind(participant.joined_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return DomainError::new(
                        ErrorCode::ConductNotFound,
                        format!("Conduct not found: {}", participant.conduct_id),
                    );
                }
            }
            db_error("Failed to add participant", e)
        })?;

        Ok(())
    }

    async fn find_participant(&self, user_id: &UserId) -> Result<Option<Participant>, DomainError> {
        let row: Option<ParticipantRow> = sqlx::query_as(
            r#"
            SELECT user_id, conduct_id, name, role, joined_at
            FROM participants
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find participant", e))?;

        row.map(Participant::try_from).transpose()
    }

    async fn find_participant_by_name(
        &self,
        conduct_id: &ConductId,
        name: &str,
    ) -> Result<Option<Participant>, DomainError> {
        let row: Option<ParticipantRow> = sqlx::query_as(
            r#"
            SELECT user_id, conduct_id, name, role, joined_at
            FROM participants
            WHERE conduct_id = $1 AND name = $2
            "#,
        )
        .bind(conduct_id.as_uuid())
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find participant by name", e))?;

        row.map(Participant::try_from).transpose()
    }

    async fn list_participants(
        &self,
        conduct_id: &ConductId,
    ) -> Result<Vec<Participant>, DomainError> {
        let rows: Vec<ParticipantRow> = sqlx::query_as(
            r#"
            SELECT user_id, conduct_id, name, role, joined_at
            FROM participants
            WHERE conduct_id = $1
            ORDER BY joined_at ASC
            "#,
        )
        .bind(conduct_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list participants", e))?;

        rows.into_iter().map(Participant::try_from).collect()
    }

    async fn remove_participant(&self, user_id: &UserId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM participants WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to remove participant", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_participants(&self, conduct_id: &ConductId) -> Result<u64, DomainError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM participants WHERE conduct_id = $1")
                .bind(conduct_id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("Failed to count participants", e))?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn find_active_idle_since(&self, cutoff: Timestamp) -> Result<Vec<Conduct>, DomainError> {
        let rows: Vec<ConductRow> = sqlx::query_as(
            r#"
            SELECT id, company_id, name, pin, status, cut_off_since, mandatory_rest_until,
                   created_at, last_activity_at
            FROM conducts
            WHERE status = 'active' AND last_activity_at < $1
            "#,
        )
        .bind(cutoff.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find idle conducts", e))?;

        rows.into_iter().map(Conduct::try_from).collect()
    }
}
