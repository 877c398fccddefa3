//! In-process doubles for exercising the saga without Postgres or a live
//! flight service. The ledger serializes whole transactions behind one owned
//! mutex guard, which is stricter than row locking but preserves the
//! observable property: mutators of the same booking never interleave.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use holdfast_core::{
    Booking, BookingError, BookingStatus, FlightQuote, InventoryApi, Ledger, NewBooking,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct MemoryLedger {
    inner: Arc<Mutex<HashMap<Uuid, Booking>>>,
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<HashMap<Uuid, Booking>>,
    snapshot: HashMap<Uuid, Booking>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, booking: Booking) {
        self.inner.lock().await.insert(booking.id, booking);
    }

    pub async fn get(&self, id: Uuid) -> Option<Booking> {
        self.inner.lock().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<Self::Tx, BookingError> {
        let guard = Arc::clone(&self.inner).lock_owned().await;
        let snapshot = guard.clone();
        Ok(MemoryTx { guard, snapshot })
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), BookingError> {
        drop(tx);
        Ok(())
    }

    async fn rollback(&self, mut tx: Self::Tx) -> Result<(), BookingError> {
        *tx.guard = tx.snapshot;
        Ok(())
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
        tx.guard.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn get_for_update(&self, tx: &mut Self::Tx, id: Uuid) -> Result<Booking, BookingError> {
        tx.guard.get(&id).cloned().ok_or(BookingError::NotFound(id))
    }

    async fn update_status(
        &self,
        tx: &mut Self::Tx,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<u64, BookingError> {
        match tx.guard.get_mut(&id) {
            Some(booking) => {
                booking.status = status;
                booking.updated_at = Utc::now();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn find_stale_unresolved(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Booking>, BookingError> {
        let mut stale: Vec<Booking> = self
            .inner
            .lock()
            .await
            .values()
            .filter(|b| b.created_at < cutoff && b.status != BookingStatus::Booked)
            .cloned()
            .collect();
        stale.sort_by_key(|b| b.created_at);
        Ok(stale)
    }
}

/// Inventory double that records every call and can fail on demand.
pub struct RecordingInventory {
    quote: FlightQuote,
    quotes: StdMutex<u32>,
    reserves: StdMutex<Vec<(Uuid, i32)>>,
    releases: StdMutex<Vec<(Uuid, i32)>>,
    fail_reserve: AtomicBool,
    fail_release: AtomicBool,
}

impl RecordingInventory {
    pub fn new(quote: FlightQuote) -> Self {
        Self {
            quote,
            quotes: StdMutex::new(0),
            reserves: StdMutex::new(Vec::new()),
            releases: StdMutex::new(Vec::new()),
            fail_reserve: AtomicBool::new(false),
            fail_release: AtomicBool::new(false),
        }
    }

    pub fn fail_next_reserve(&self) {
        self.fail_reserve.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_release(&self) {
        self.fail_release.store(true, Ordering::SeqCst);
    }

    pub fn quote_count(&self) -> u32 {
        *self.quotes.lock().unwrap()
    }

    pub fn reserved(&self) -> Vec<(Uuid, i32)> {
        self.reserves.lock().unwrap().clone()
    }

    pub fn reserve_count(&self) -> usize {
        self.reserves.lock().unwrap().len()
    }

    pub fn released(&self) -> Vec<(Uuid, i32)> {
        self.releases.lock().unwrap().clone()
    }

    pub fn release_count(&self) -> usize {
        self.releases.lock().unwrap().len()
    }

    fn rejected() -> BookingError {
        BookingError::RemoteRejected {
            status: 500,
            message: "injected failure".to_string(),
        }
    }
}

#[async_trait]
impl InventoryApi for RecordingInventory {
    async fn quote(&self, _flight_id: Uuid) -> Result<FlightQuote, BookingError> {
        *self.quotes.lock().unwrap() += 1;
        Ok(self.quote)
    }

    async fn reserve(&self, flight_id: Uuid, seats: i32) -> Result<(), BookingError> {
        if self.fail_reserve.swap(false, Ordering::SeqCst) {
            return Err(Self::rejected());
        }
        self.reserves.lock().unwrap().push((flight_id, seats));
        Ok(())
    }

    async fn release(&self, flight_id: Uuid, seats: i32) -> Result<(), BookingError> {
        if self.fail_release.swap(false, Ordering::SeqCst) {
            return Err(Self::rejected());
        }
        self.releases.lock().unwrap().push((flight_id, seats));
        Ok(())
    }
}

/// A hold created `age` ago, still unpaid.
pub fn aged_hold(seats: i32, total_cost: i32, age: Duration) -> Booking {
    let created = Utc::now() - age;
    Booking {
        id: Uuid::new_v4(),
        flight_id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        seats,
        total_cost,
        status: BookingStatus::Initiated,
        created_at: created,
        updated_at: created,
    }
}
