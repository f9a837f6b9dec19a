//! PostgreSQL implementation of VoteLedger.
//!
//! Append order is the `seq` BIGSERIAL column; the table has no UPDATE or
//! DELETE path.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{
    DomainError, ErrorCode, OptionId, PollId, Timestamp, UserId, VoteId,
};
use crate::domain::poll::{Vote, VoteChoice};
use crate::ports::VoteLedger;

/// PostgreSQL-backed vote ledger.
#[derive(Clone)]
pub struct PostgresVoteLedger {
    pool: PgPool,
}

impl PostgresVoteLedger {
    /// Creates a new PostgresVoteLedger.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VoteLedger for PostgresVoteLedger {
    async fn append(&self, vote: Vote) -> Result<u64, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to begin transaction", e))?;

        // Serializes appends per poll so each one sees a distinct length.
        sqlx::query("SELECT id FROM polls WHERE id = $1 FOR UPDATE")
            .bind(vote.poll_id.value())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::database("Failed to lock poll", e))?;

        sqlx::query(
            r#"
            INSERT INTO votes (id, poll_id, option_id, value, voter_id, cast_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(vote.id.as_uuid())
        .bind(vote.poll_id.value())
        .bind(vote.option_id().map(|id| id.value()))
        .bind(vote.value())
        .bind(vote.voter_id.as_ref().map(UserId::as_str))
        .bind(vote.cast_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database("Failed to append vote", e))?;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM votes WHERE poll_id = $1")
            .bind(vote.poll_id.value())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| DomainError::database("Failed to count votes", e))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit vote", e))?;

        Ok(count as u64)
    }

    async fn votes_for(&self, poll_id: PollId) -> Result<Vec<Vote>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, poll_id, option_id, value, voter_id, cast_at
            FROM votes
            WHERE poll_id = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(poll_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch votes", e))?;

        rows.iter().map(row_to_vote).collect()
    }

    async fn count(&self, poll_id: PollId) -> Result<u64, DomainError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM votes WHERE poll_id = $1")
            .bind(poll_id.value())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to count votes", e))?;

        Ok(count as u64)
    }
}

fn row_to_vote(row: &PgRow) -> Result<Vote, DomainError> {
    let id: uuid::Uuid = row
        .try_get("id")
        .map_err(|e| DomainError::database("Failed to get id", e))?;
    let poll_id: i64 = row
        .try_get("poll_id")
        .map_err(|e| DomainError::database("Failed to get poll_id", e))?;
    let option_id: Option<i64> = row
        .try_get("option_id")
        .map_err(|e| DomainError::database("Failed to get option_id", e))?;
    let value: Option<String> = row
        .try_get("value")
        .map_err(|e| DomainError::database("Failed to get value", e))?;
    let voter_id: Option<String> = row
        .try_get("voter_id")
        .map_err(|e| DomainError::database("Failed to get voter_id", e))?;
    let cast_at: chrono::DateTime<chrono::Utc> = row
        .try_get("cast_at")
        .map_err(|e| DomainError::database("Failed to get cast_at", e))?;

    let choice = match (option_id, value) {
        (Some(option_id), None) => VoteChoice::Option(OptionId::new(option_id)),
        (None, Some(value)) => VoteChoice::Value(value),
        _ => {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                format!("Vote {} must have exactly one of option_id or value", id),
            ))
        }
    };

    Ok(Vote {
        id: VoteId::from_uuid(id),
        poll_id: PollId::new(poll_id),
        choice,
        voter_id: voter_id.and_then(|v| UserId::new(v).ok()),
        cast_at: Timestamp::from_datetime(cast_at),
    })
}
