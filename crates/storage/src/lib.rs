use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use leaddev_core::BookingRequest;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub request: BookingRequest,
}

impl BookingRecord {
    pub fn new(request: BookingRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            submitted_at: Utc::now(),
            request,
        }
    }
}

/// Sink for consultation requests coming out of the booking form.
pub trait BookingRepository: Send + Sync {
    async fn save_booking(&self, record: &BookingRecord) -> Result<()>;
    async fn list_bookings(&self) -> Result<Vec<BookingRecord>>;
    async fn bookings_for_service(&self, service_id: &str) -> Result<Vec<BookingRecord>>;
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    bookings: Arc<RwLock<Vec<BookingRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BookingRepository for MemoryStore {
    async fn save_booking(&self, record: &BookingRecord) -> Result<()> {
        self.bookings.write().push(record.clone());
        Ok(())
    }

    async fn list_bookings(&self) -> Result<Vec<BookingRecord>> {
        Ok(self.bookings.read().clone())
    }

    async fn bookings_for_service(&self, service_id: &str) -> Result<Vec<BookingRecord>> {
        Ok(self
            .bookings
            .read()
            .iter()
            .filter(|record| record.request.service_id == service_id)
            .cloned()
            .collect())
    }
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    in_memory: bool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        // every connection to an in-memory database sees its own empty schema
        let in_memory = database_url.contains(":memory:");
        let max_connections = if in_memory { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .with_context(|| format!("failed connecting to sqlite at {}", database_url))?;

        let store = Self { pool, in_memory };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS booking_requests (
              id TEXT PRIMARY KEY,
              submitted_at TEXT NOT NULL,
              service_id TEXT NOT NULL,
              email TEXT NOT NULL,
              request_json TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn decode_rows(rows: Vec<sqlx::sqlite::SqliteRow>) -> Result<Vec<BookingRecord>> {
        rows.into_iter()
            .map(|row| -> Result<BookingRecord> {
                let id: String = row.get("id");
                let submitted_at: String = row.get("submitted_at");
                let request_json: String = row.get("request_json");

                Ok(BookingRecord {
                    id: id
                        .parse()
                        .with_context(|| format!("invalid booking id {}", id))?,
                    submitted_at: submitted_at
                        .parse()
                        .with_context(|| format!("invalid timestamp on booking {}", id))?,
                    request: serde_json::from_str(&request_json)
                        .with_context(|| format!("invalid request payload on booking {}", id))?,
                })
            })
            .collect()
    }
}

impl BookingRepository for SqliteStore {
    async fn save_booking(&self, record: &BookingRecord) -> Result<()> {
        let request_json = serde_json::to_string(&record.request)?;

        sqlx::query(
            r#"
            INSERT INTO booking_requests (id, submitted_at, service_id, email, request_json)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.submitted_at.to_rfc3339())
        .bind(&record.request.service_id)
        .bind(&record.request.email)
        .bind(request_json)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_bookings(&self) -> Result<Vec<BookingRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, submitted_at, request_json
            FROM booking_requests
            ORDER BY submitted_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Self::decode_rows(rows)
    }

    async fn bookings_for_service(&self, service_id: &str) -> Result<Vec<BookingRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, submitted_at, request_json
            FROM booking_requests
            WHERE service_id = ?1
            ORDER BY submitted_at
            "#,
        )
        .bind(service_id)
        .fetch_all(&self.pool)
        .await?;

        Self::decode_rows(rows)
    }
}

#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl Store {
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    pub async fn sqlite(database_url: &str) -> Result<Self> {
        let sqlite = SqliteStore::connect(database_url).await?;
        Ok(Self::Sqlite(sqlite))
    }

    /// Whether saved bookings outlive the process that wrote them.
    pub fn is_persistent(&self) -> bool {
        match self {
            Store::Memory(_) => false,
            Store::Sqlite(store) => !store.in_memory,
        }
    }
}

impl BookingRepository for Store {
    async fn save_booking(&self, record: &BookingRecord) -> Result<()> {
        match self {
            Store::Memory(store) => store.save_booking(record).await,
            Store::Sqlite(store) => store.save_booking(record).await,
        }
    }

    async fn list_bookings(&self) -> Result<Vec<BookingRecord>> {
        match self {
            Store::Memory(store) => store.list_bookings().await,
            Store::Sqlite(store) => store.list_bookings().await,
        }
    }

    async fn bookings_for_service(&self, service_id: &str) -> Result<Vec<BookingRecord>> {
        match self {
            Store::Memory(store) => store.bookings_for_service(service_id).await,
            Store::Sqlite(store) => store.bookings_for_service(service_id).await,
        }
    }
}
