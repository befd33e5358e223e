//! Event row queries

use sqlx::{Row, SqlitePool};

use loginguard_types::ledger_adapter::{AttemptEvent, BanData, BanEvent, EventType};
use loginguard_types::prelude::*;

use crate::utils::inspect;

async fn insert(
	db: &SqlitePool,
	epoch: Timestamp,
	typ: EventType,
	address: &Address,
	data: &str,
) -> LgResult<()> {
	sqlx::query("INSERT INTO guard_events (epoch, type, ipaddr, data) VALUES (?1, ?2, ?3, ?4)")
		.bind(epoch.0)
		.bind(typ.as_code())
		.bind(address.to_string())
		.bind(data)
		.execute(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	Ok(())
}

pub(crate) async fn insert_attempt(db: &SqlitePool, event: &AttemptEvent) -> LgResult<()> {
	let data = event.data.to_string();
	insert(db, event.timestamp, EventType::Attempt, &event.address, &data).await
}

pub(crate) async fn insert_ban(db: &SqlitePool, event: &BanEvent) -> LgResult<()> {
	let data = serde_json::to_string(&BanData { duration: event.duration, repeat: event.repeat })
		.or(Err(Error::DbError))?;
	insert(db, event.timestamp, EventType::Ban, &event.address, &data).await
}

pub(crate) async fn count_attempts_since(
	db: &SqlitePool,
	address: &Address,
	since: Timestamp,
) -> LgResult<u32> {
	let count: i64 = sqlx::query_scalar(
		"SELECT count(*) FROM guard_events WHERE ipaddr = ?1 AND type = ?2 AND epoch >= ?3",
	)
	.bind(address.to_string())
	.bind(EventType::Attempt.as_code())
	.bind(since.0)
	.fetch_one(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;

	Ok(u32::try_from(count).unwrap_or(u32::MAX))
}

pub(crate) async fn read_last_ban(db: &SqlitePool, address: &Address) -> LgResult<Option<BanEvent>> {
	let row = sqlx::query(
		"SELECT epoch, data FROM guard_events WHERE ipaddr = ?1 AND type = ?2
		ORDER BY id DESC LIMIT 1",
	)
	.bind(address.to_string())
	.bind(EventType::Ban.as_code())
	.fetch_optional(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;

	let Some(row) = row else {
		return Ok(None);
	};

	let epoch: i64 = row.try_get("epoch").inspect_err(inspect).or(Err(Error::DbError))?;
	let data: String = row.try_get("data").inspect_err(inspect).or(Err(Error::DbError))?;
	let data: BanData = serde_json::from_str(&data)
		.inspect_err(|err| warn!("DB: malformed ban data for {}: {}", address, err))
		.or(Err(Error::DbError))?;

	Ok(Some(BanEvent {
		timestamp: Timestamp(epoch),
		address: *address,
		duration: data.duration,
		repeat: data.repeat,
	}))
}

pub(crate) async fn purge_before(db: &SqlitePool, before: Timestamp) -> LgResult<u64> {
	let res = sqlx::query("DELETE FROM guard_events WHERE epoch < ?1")
		.bind(before.0)
		.execute(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	Ok(res.rows_affected())
}

// vim: ts=4
