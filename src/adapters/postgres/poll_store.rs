//! PostgreSQL implementation of PollCatalog and PollRepository.
//!
//! Poll and option ids come from BIGSERIAL columns; options are inserted
//! one by one inside the creating transaction, so their ids ascend in
//! draft order.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::collections::HashMap;

use crate::domain::foundation::{DomainError, ErrorCode, OptionId, PollId, Timestamp, UserId};
use crate::domain::poll::{NewPoll, Poll, PollKind, PollOption};
use crate::ports::{PollCatalog, PollRepository};

/// PostgreSQL-backed poll catalog.
#[derive(Clone)]
pub struct PostgresPollStore {
    pool: PgPool,
}

impl PostgresPollStore {
    /// Creates a new PostgresPollStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn options_for(
        &self,
        poll_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<PollOption>>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, poll_id, text
            FROM poll_options
            WHERE poll_id = ANY($1)
            ORDER BY id ASC
            "#,
        )
        .bind(poll_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch poll options", e))?;

        let mut grouped: HashMap<i64, Vec<PollOption>> = HashMap::new();
        for row in rows {
            let option = row_to_option(&row)?;
            grouped.entry(option.poll_id.value()).or_default().push(option);
        }
        Ok(grouped)
    }
}

#[async_trait]
impl PollCatalog for PostgresPollStore {
    async fn get_poll(&self, id: PollId) -> Result<Option<Poll>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, question, kind, is_active, created_by, created_at
            FROM polls
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch poll", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut options = self.options_for(&[id.value()]).await?;
        let poll = row_to_poll(&row, options.remove(&id.value()).unwrap_or_default())?;
        Ok(Some(poll))
    }

    async fn list_polls(&self) -> Result<Vec<Poll>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, question, kind, is_active, created_by, created_at
            FROM polls
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to list polls", e))?;

        let ids: Vec<i64> = rows
            .iter()
            .map(|row| row.try_get::<i64, _>("id"))
            .collect::<Result<_, _>>()
            .map_err(|e| DomainError::database("Failed to get id", e))?;
        let mut options = self.options_for(&ids).await?;

        rows.iter()
            .zip(ids)
            .map(|(row, id)| row_to_poll(row, options.remove(&id).unwrap_or_default()))
            .collect()
    }
}

#[async_trait]
impl PollRepository for PostgresPollStore {
    async fn create(&self, draft: NewPoll) -> Result<Poll, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to begin transaction", e))?;

        let row = sqlx::query(
            r#"
            INSERT INTO polls (question, kind, is_active, created_by)
            VALUES ($1, $2, TRUE, $3)
            RETURNING id, question, kind, is_active, created_by, created_at
            "#,
        )
        .bind(&draft.question)
        .bind(draft.kind.as_str())
        .bind(draft.created_by.as_ref().map(UserId::as_str))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DomainError::database("Failed to insert poll", e))?;

        let poll_id: i64 = row
            .try_get("id")
            .map_err(|e| DomainError::database("Failed to get id", e))?;

        let mut options = Vec::with_capacity(draft.option_texts.len());
        for text in &draft.option_texts {
            let option_row = sqlx::query(
                "INSERT INTO poll_options (poll_id, text) VALUES ($1, $2) RETURNING id, poll_id, text",
            )
            .bind(poll_id)
            .bind(text)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| DomainError::database("Failed to insert option", e))?;
            options.push(row_to_option(&option_row)?);
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit poll", e))?;

        row_to_poll(&row, options)
    }

    async fn set_active(&self, id: PollId, active: bool) -> Result<bool, DomainError> {
        let result = sqlx::query("UPDATE polls SET is_active = $2 WHERE id = $1")
            .bind(id.value())
            .bind(active)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to update poll", e))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_poll(row: &PgRow, options: Vec<PollOption>) -> Result<Poll, DomainError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| DomainError::database("Failed to get id", e))?;
    let question: String = row
        .try_get("question")
        .map_err(|e| DomainError::database("Failed to get question", e))?;
    let kind: String = row
        .try_get("kind")
        .map_err(|e| DomainError::database("Failed to get kind", e))?;
    let kind: PollKind = kind.parse().map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Stored poll kind: {}", e))
    })?;
    let is_active: bool = row
        .try_get("is_active")
        .map_err(|e| DomainError::database("Failed to get is_active", e))?;
    let created_by: Option<String> = row
        .try_get("created_by")
        .map_err(|e| DomainError::database("Failed to get created_by", e))?;
    let created_at: chrono::DateTime<chrono::Utc> = row
        .try_get("created_at")
        .map_err(|e| DomainError::database("Failed to get created_at", e))?;

    Ok(Poll {
        id: PollId::new(id),
        question,
        kind,
        options,
        is_active,
        created_by: created_by.and_then(|u| UserId::new(u).ok()),
        created_at: Timestamp::from_datetime(created_at),
    })
}

fn row_to_option(row: &PgRow) -> Result<PollOption, DomainError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| DomainError::database("Failed to get option id", e))?;
    let poll_id: i64 = row
        .try_get("poll_id")
        .map_err(|e| DomainError::database("Failed to get poll_id", e))?;
    let text: String = row
        .try_get("text")
        .map_err(|e| DomainError::database("Failed to get option text", e))?;

    Ok(PollOption {
        id: OptionId::new(id),
        text,
        poll_id: PollId::new(poll_id),
    })
}
