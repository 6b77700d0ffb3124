use sqlx::Row;
use validation_core::machine::ValidationSnapshot;
use validation_core::model::Epoch;

use crate::repository::{StorageError, ValidationStateRecord};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn epoch_to_i64(epoch: Epoch) -> Result<i64, StorageError> {
    i64::try_from(epoch.value()).map_err(|_| StorageError::Serialization("epoch overflow".into()))
}

pub(crate) fn epoch_from_i64(v: i64) -> Result<Epoch, StorageError> {
    u64::try_from(v)
        .map(Epoch::new)
        .map_err(|_| StorageError::Serialization("epoch sign overflow".into()))
}

pub(crate) fn encode_snapshot(snapshot: &ValidationSnapshot) -> Result<String, StorageError> {
    serde_json::to_string(snapshot).map_err(ser)
}

pub(crate) fn decode_snapshot(raw: &str) -> Result<ValidationSnapshot, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn map_state_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<ValidationStateRecord, StorageError> {
    let epoch = epoch_from_i64(row.try_get("epoch").map_err(ser)?)?;
    let state_path: String = row.try_get("state_path").map_err(ser)?;
    let raw: String = row.try_get("snapshot").map_err(ser)?;
    let snapshot = decode_snapshot(&raw)?;

    let stored_epoch = snapshot.context().params().epoch();
    if stored_epoch != epoch {
        return Err(StorageError::Serialization(format!(
            "snapshot epoch {stored_epoch} stored under epoch {epoch}"
        )));
    }

    Ok(ValidationStateRecord {
        epoch,
        state_path,
        snapshot,
        saved_at: row.try_get("saved_at").map_err(ser)?,
    })
}
