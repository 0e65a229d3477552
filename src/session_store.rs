use crate::error::{
    GetDatabaseConnectionSnafu, InvalidExpirySnafu, ReadQuerySnafu, RmpSerdeDecodeSnafu,
    RmpSerdeEncodeSnafu, RollcallError, WriteQuerySnafu,
};
use async_trait::async_trait;
use snafu::ResultExt;
use sqlx::{Pool, Sqlite, SqliteConnection, pool::PoolConnection};
use std::time::Duration;
use time::OffsetDateTime;
use tower_sessions::{
    ExpiredDeletion, SessionStore,
    session::{Id, Record},
    session_store::Error as SSError,
};

/// Sessions (and so flash messages) live in the same SQLite file as the students.
#[derive(Debug, Clone)]
pub struct SqliteSessionStore {
    pool: Pool<Sqlite>,
}

impl SqliteSessionStore {
    pub const fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn connection(&self) -> Result<PoolConnection<Sqlite>, SSError> {
        self.pool
            .acquire()
            .await
            .context(GetDatabaseConnectionSnafu)
            .map_err(|e| SSError::Backend(e.to_string()))
    }

    async fn id_exists(id: Id, conn: &mut SqliteConnection) -> Result<bool, RollcallError> {
        let exists: i64 = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM sessions WHERE id = ?)")
            .bind(id.to_string())
            .fetch_one(conn)
            .await
            .context(ReadQuerySnafu)?;
        Ok(exists != 0)
    }

    async fn save_session(record: &Record, conn: &mut SqliteConnection) -> Result<(), RollcallError> {
        let serialised_data = rmp_serde::to_vec(&record.data).context(RmpSerdeEncodeSnafu)?;

        sqlx::query("INSERT INTO sessions (id, data, expiry_date) VALUES (?, ?, ?) ON CONFLICT (id) DO UPDATE SET data = excluded.data, expiry_date = excluded.expiry_date")
            .bind(record.id.to_string())
            .bind(serialised_data)
            .bind(record.expiry_date.unix_timestamp())
            .execute(conn)
            .await
            .context(WriteQuerySnafu)?;

        Ok(())
    }

    /// Runs [`ExpiredDeletion::delete_expired`] every `period` until the process exits.
    pub async fn delete_expired_every(self, period: Duration) {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if let Err(e) = self.delete_expired().await {
                error!(?e, "Error deleting expired sessions");
            }
        }
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn create(&self, session_record: &mut Record) -> Result<(), SSError> {
        let mut connection = self.connection().await?;

        while Self::id_exists(session_record.id, &mut connection)
            .await
            .map_err(|e| SSError::Backend(e.to_string()))?
        {
            session_record.id = Id::default();
        }

        Self::save_session(session_record, &mut connection)
            .await
            .map_err(|e| SSError::Encode(e.to_string()))?;

        Ok(())
    }

    async fn save(&self, session_record: &Record) -> Result<(), SSError> {
        let mut connection = self.connection().await?;

        Self::save_session(session_record, &mut connection)
            .await
            .map_err(|e| SSError::Encode(e.to_string()))?;

        Ok(())
    }

    async fn load(&self, session_id: &Id) -> Result<Option<Record>, SSError> {
        let mut connection = self.connection().await?;

        let Some((data, expiry_date)): Option<(Vec<u8>, i64)> = sqlx::query_as(
            "SELECT data, expiry_date FROM sessions WHERE id = ? AND expiry_date > ?",
        )
        .bind(session_id.to_string())
        .bind(OffsetDateTime::now_utc().unix_timestamp())
        .fetch_optional(&mut *connection)
        .await
        .context(ReadQuerySnafu)
        .map_err(|e| SSError::Backend(e.to_string()))?
        else {
            return Ok(None);
        };

        let data = rmp_serde::from_slice(&data)
            .context(RmpSerdeDecodeSnafu)
            .map_err(|e| SSError::Decode(e.to_string()))?;
        let expiry_date = OffsetDateTime::from_unix_timestamp(expiry_date)
            .context(InvalidExpirySnafu {
                timestamp: expiry_date,
            })
            .map_err(|e| SSError::Decode(e.to_string()))?;

        Ok(Some(Record {
            id: *session_id,
            data,
            expiry_date,
        }))
    }

    async fn delete(&self, session_id: &Id) -> Result<(), SSError> {
        let mut connection = self.connection().await?;

        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(session_id.to_string())
            .execute(&mut *connection)
            .await
            .context(WriteQuerySnafu)
            .map_err(|e| SSError::Backend(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for SqliteSessionStore {
    async fn delete_expired(&self) -> Result<(), SSError> {
        let mut connection = self.connection().await?;

        let deleted = sqlx::query("DELETE FROM sessions WHERE expiry_date <= ?")
            .bind(OffsetDateTime::now_utc().unix_timestamp())
            .execute(&mut *connection)
            .await
            .context(WriteQuerySnafu)
            .map_err(|e| SSError::Backend(e.to_string()))?
            .rows_affected();

        if deleted > 0 {
            debug!(?deleted, "Deleted expired sessions");
        }
        Ok(())
    }
}
