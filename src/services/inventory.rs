use chrono::Utc;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::BookingError;
use crate::models::Show;
use crate::store::{SeatAdjustment, ShowStore};

/// Applies signed seat deltas to a show's available-seat counter.
///
/// A positive delta reserves seats, a negative one releases them. Releases
/// are capped at the show's capacity, and a reservation that would leave
/// fewer than zero seats is refused without touching the show.
#[derive(Clone)]
pub struct SeatInventory {
    shows: Arc<dyn ShowStore>,
}

impl SeatInventory {
    pub fn new(shows: Arc<dyn ShowStore>) -> Self {
        Self { shows }
    }

    pub async fn adjust(&self, show_id: Uuid, seat_delta: i32) -> Result<Show, BookingError> {
        match self
            .shows
            .adjust_available_seats(show_id, seat_delta, Utc::now())
            .await?
        {
            Some(SeatAdjustment::Applied(show)) => {
                debug!(
                    show_id = %show_id,
                    seat_delta,
                    available_seats = show.available_seats,
                    "Adjusted seat inventory"
                );
                Ok(show)
            }
            Some(SeatAdjustment::Insufficient { available }) => {
                debug!(show_id = %show_id, seat_delta, available, "Seat adjustment refused");
                Err(BookingError::InsufficientSeats {
                    show_id,
                    requested: seat_delta,
                    available,
                })
            }
            None => Err(BookingError::ShowNotFound(show_id)),
        }
    }

    pub async fn reserve(&self, show_id: Uuid, seats: i32) -> Result<Show, BookingError> {
        self.adjust(show_id, seats).await
    }

    pub async fn release(&self, show_id: Uuid, seats: i32) -> Result<Show, BookingError> {
        self.adjust(show_id, -seats).await
    }
}
