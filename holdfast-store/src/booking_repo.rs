use async_trait::async_trait;
use chrono::{DateTime, Utc};
use holdfast_core::{Booking, BookingError, BookingStatus, Ledger, NewBooking};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const BOOKING_COLUMNS: &str =
    "id, flight_id, user_id, seats, total_cost, status, created_at, updated_at";

/// Ledger backed by the `bookings` table.
pub struct PostgresLedger {
    pool: PgPool,
}

impl PostgresLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    flight_id: Uuid,
    user_id: Uuid,
    seats: i32,
    total_cost: i32,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self) -> Result<Booking, BookingError> {
        let status = self
            .status
            .parse::<BookingStatus>()
            .map_err(|e| BookingError::Storage(e.to_string()))?;

        Ok(Booking {
            id: self.id,
            flight_id: self.flight_id,
            user_id: self.user_id,
            seats: self.seats,
            total_cost: self.total_cost,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn storage_err(e: sqlx::Error) -> BookingError {
    BookingError::Storage(e.to_string())
}

#[async_trait]
impl Ledger for PostgresLedger {
    type Tx = sqlx::Transaction<'static, Postgres>;

    async fn begin(&self) -> Result<Self::Tx, BookingError> {
        self.pool.begin().await.map_err(storage_err)
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), BookingError> {
        tx.commit().await.map_err(storage_err)
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<(), BookingError> {
        tx.rollback().await.map_err(storage_err)
    }

    async fn create(&self, tx: &mut Self::Tx, draft: NewBooking) -> Result<Booking, BookingError> {
        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            flight_id: draft.flight_id,
            user_id: draft.user_id,
            seats: draft.seats,
            total_cost: draft.total_cost,
            status: BookingStatus::Initiated,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO bookings (id, flight_id, user_id, seats, total_cost, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(booking.id)
        .bind(booking.flight_id)
        .bind(booking.user_id)
        .bind(booking.seats)
        .bind(booking.total_cost)
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(storage_err)?;

        Ok(booking)
    }

    async fn get_for_update(&self, tx: &mut Self::Tx, id: Uuid) -> Result<Booking, BookingError> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(storage_err)?;

        row.ok_or(BookingError::NotFound(id))?.into_booking()
    }

    async fn update_status(
        &self,
        tx: &mut Self::Tx,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<u64, BookingError> {
        let result = sqlx::query("UPDATE bookings SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(storage_err)?;

        Ok(result.rows_affected())
    }

    async fn find_stale_unresolved(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Booking>, BookingError> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE created_at < $1 AND status <> $2 ORDER BY created_at"
        ))
        .bind(cutoff)
        .bind(BookingStatus::Booked.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.into_iter().map(BookingRow::into_booking).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> BookingRow {
        let now = Utc::now();
        BookingRow {
            id: Uuid::new_v4(),
            flight_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            seats: 2,
            total_cost: 200,
            status: status.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn row_maps_stored_status_back_to_enum() {
        let booking = row("BOOKED").into_booking().unwrap();
        assert_eq!(booking.status, BookingStatus::Booked);
        assert_eq!(booking.seats, 2);
        assert_eq!(booking.total_cost, 200);
    }

    #[test]
    fn unknown_status_is_a_storage_error() {
        let err = row("REFUNDED").into_booking().unwrap_err();
        assert!(matches!(err, BookingError::Storage(_)));
    }
}
