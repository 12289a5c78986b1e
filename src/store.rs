/*
 *  NitroVote - Discord bot tracking monthly Veil votes and Nitro rewards.
 *  Copyright (C) 2025  NitroVote contributors
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */
use crate::clock::TimeWindow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use sqlx::{Postgres, Transaction};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// A single recorded vote. Rows are written by the ingestion side and only ever read here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteEvent {
    /// Insertion-ordered unique identifier.
    pub id: i64,
    /// Discord identifier of the voter.
    pub user_id: u64,
    pub voted_at: DateTime<Utc>,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("vote store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    #[error("vote store did not answer within {0:?}")]
    Timeout(Duration),

    #[error("vote store returned an inconsistent snapshot: {0}")]
    Inconsistent(String),
}

/**
 * Read side of the vote log.
 *
 * Implementations must answer each call from a single consistent snapshot and select events with
 * `voted_at >= start AND voted_at < end`.
 */
#[async_trait]
pub trait VoteStore: Send + Sync {
    async fn events_in_window(&self, window: &TimeWindow) -> Result<Vec<VoteEvent>, StoreError>;

    async fn count_in_window(&self, user_id: u64, window: &TimeWindow)
        -> Result<u64, StoreError>;
}

/// `vote_events` reader over a PostgreSQL pool.
pub struct PgVoteStore {
    pool: PgPool,
}

impl PgVoteStore {
    /**
     * Connects to the database behind `url`. TLS is always required.
     */
    pub async fn connect(url: &str) -> Result<PgVoteStore, StoreError> {
        let options = PgConnectOptions::from_str(url)?.ssl_mode(PgSslMode::Require);
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    async fn snapshot(&self) -> Result<Transaction<'static, Postgres>, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }
}

fn bigint_user_id(user_id: u64) -> Result<i64, StoreError> {
    i64::try_from(user_id)
        .map_err(|_| StoreError::Inconsistent(format!("user id {user_id} does not fit a BIGINT")))
}

#[async_trait]
impl VoteStore for PgVoteStore {
    async fn events_in_window(&self, window: &TimeWindow) -> Result<Vec<VoteEvent>, StoreError> {
        let mut tx = self.snapshot().await?;
        let rows = sqlx::query_as::<_, (i64, i64, DateTime<Utc>)>(
            "SELECT id, user_id, voted_at FROM vote_events \
             WHERE voted_at >= $1 AND voted_at < $2 ORDER BY id",
        )
        .bind(window.start())
        .bind(window.end())
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        rows.into_iter()
            .map(|(id, user_id, voted_at)| {
                let user_id = u64::try_from(user_id).map_err(|_| {
                    StoreError::Inconsistent(format!("vote {id} has negative user id {user_id}"))
                })?;
                Ok(VoteEvent {
                    id,
                    user_id,
                    voted_at,
                })
            })
            .collect()
    }

    async fn count_in_window(
        &self,
        user_id: u64,
        window: &TimeWindow,
    ) -> Result<u64, StoreError> {
        let mut tx = self.snapshot().await?;
        let (votes,) = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM vote_events \
             WHERE user_id = $1 AND voted_at >= $2 AND voted_at < $3",
        )
        .bind(bigint_user_id(user_id)?)
        .bind(window.start())
        .bind(window.end())
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        u64::try_from(votes)
            .map_err(|_| StoreError::Inconsistent(format!("negative vote count {votes}")))
    }
}
