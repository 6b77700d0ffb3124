use async_trait::async_trait;
use validation_core::model::Epoch;

use crate::repository::{StorageError, ValidationStateRecord, ValidationStateRepository};

use super::SqliteRepository;
use super::mapping::{encode_snapshot, epoch_to_i64, map_state_row};

#[async_trait]
impl ValidationStateRepository for SqliteRepository {
    async fn load_state(&self, epoch: Epoch) -> Result<Option<ValidationStateRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT epoch, state_path, snapshot, saved_at
            FROM validation_states
            WHERE epoch = ?1
            ",
        )
        .bind(epoch_to_i64(epoch)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        row.as_ref().map(map_state_row).transpose()
    }

    async fn save_state(&self, record: &ValidationStateRecord) -> Result<(), StorageError> {
        let snapshot = encode_snapshot(&record.snapshot)?;
        sqlx::query(
            r"
            INSERT INTO validation_states (epoch, state_path, snapshot, saved_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(epoch) DO UPDATE SET
                state_path = excluded.state_path,
                snapshot = excluded.snapshot,
                saved_at = excluded.saved_at
            ",
        )
        .bind(epoch_to_i64(record.epoch)?)
        .bind(&record.state_path)
        .bind(snapshot)
        .bind(record.saved_at)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        tracing::debug!(epoch = %record.epoch, state = %record.state_path, "saved validation state");
        Ok(())
    }

    async fn clear_state(&self, epoch: Epoch) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM validation_states WHERE epoch = ?1")
            .bind(epoch_to_i64(epoch)?)
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        tracing::debug!(%epoch, removed = result.rows_affected(), "cleared validation state");
        Ok(())
    }

    async fn clear_other_epochs(&self, current: Epoch) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM validation_states WHERE epoch <> ?1")
            .bind(epoch_to_i64(current)?)
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        tracing::debug!(%current, removed = result.rows_affected(), "cleared earlier validation states");
        Ok(())
    }
}
