//! Persistence contracts for shows and tickets.
//!
//! Two backends implement them: [`memory`] for local runs and tests, and
//! [`postgres`] for deployments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{BookingStatus, Show, ShowFilter, Ticket, TicketFilter};

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryShowStore, InMemoryTicketStore};
pub use postgres::{PgShowStore, PgTicketStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Outcome of a conditional seat adjustment on an existing show.
#[derive(Debug, Clone, PartialEq)]
pub enum SeatAdjustment {
    Applied(Show),
    Insufficient { available: i32 },
}

#[async_trait]
pub trait ShowStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Show>, StoreError>;

    async fn find_active(&self, filter: &ShowFilter) -> Result<Vec<Show>, StoreError>;

    /// Inserts a new show, or rewrites an existing show's descriptive fields
    /// and active flag. Seat columns of an existing show are never touched
    /// here; they move only through the two seat operations below.
    async fn save(&self, show: Show) -> Result<Show, StoreError>;

    /// Applies `available_seats = min(total_seats, available_seats - seat_delta)`
    /// as a single operation, leaving the show untouched when the result
    /// would be negative. Returns `None` when the show does not exist.
    async fn adjust_available_seats(
        &self,
        id: Uuid,
        seat_delta: i32,
        at: DateTime<Utc>,
    ) -> Result<Option<SeatAdjustment>, StoreError>;

    /// Sets `total_seats` and shifts `available_seats` by the capacity change,
    /// refusing when more seats are booked than the new capacity.
    async fn set_capacity(
        &self,
        id: Uuid,
        total_seats: i32,
        at: DateTime<Utc>,
    ) -> Result<Option<SeatAdjustment>, StoreError>;
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ticket>, StoreError>;

    async fn find(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, StoreError>;

    /// Inserts a new ticket, or overwrites an existing one unconditionally.
    async fn save(&self, ticket: Ticket) -> Result<Ticket, StoreError>;

    /// Overwrites the stored ticket only while it still has `hold`. Returns
    /// `None` when the ticket is gone or its hold changed since it was read.
    async fn replace(
        &self,
        ticket: Ticket,
        hold: &TicketHold,
    ) -> Result<Option<Ticket>, StoreError>;

    /// Deletes the ticket only while it still has `hold`.
    async fn delete_if_held(&self, id: Uuid, hold: &TicketHold) -> Result<bool, StoreError>;
}

/// The part of a ticket that decides how many seats it takes from its show.
///
/// Seat bookkeeping for a ticket write is computed against the hold that was
/// read; the write only lands if the stored ticket still has that hold.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketHold {
    pub booking_status: BookingStatus,
    pub seat_numbers: Vec<String>,
}

impl TicketHold {
    pub fn of(ticket: &Ticket) -> Self {
        Self {
            booking_status: ticket.booking_status,
            seat_numbers: ticket.seat_numbers.clone(),
        }
    }

    pub fn is_held_by(&self, ticket: &Ticket) -> bool {
        self.booking_status == ticket.booking_status && self.seat_numbers == ticket.seat_numbers
    }
}

/// The seat rule shared by every backend.
pub(crate) fn next_available(show: &Show, seat_delta: i32) -> Option<i32> {
    let next = show.available_seats.checked_sub(seat_delta)?;
    if next < 0 {
        None
    } else {
        Some(next.min(show.total_seats))
    }
}

pub(crate) fn resized_available(show: &Show, total_seats: i32) -> Option<i32> {
    let next = show
        .available_seats
        .checked_add(total_seats.checked_sub(show.total_seats)?)?;
    if next < 0 {
        None
    } else {
        Some(next)
    }
}
