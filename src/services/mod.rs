use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

pub mod booking;
pub mod inventory;
pub mod shows;

pub use booking::BookingService;
pub use inventory::SeatInventory;
pub use shows::ShowService;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("show '{0}' was not found")]
    ShowNotFound(Uuid),

    #[error("ticket '{0}' was not found")]
    TicketNotFound(Uuid),

    #[error("show '{show_id}' has {available} seat(s) available, {requested} requested")]
    InsufficientSeats {
        show_id: Uuid,
        requested: i32,
        available: i32,
    },

    #[error("ticket '{0}' kept changing while it was being written")]
    TicketContended(Uuid),

    #[error("invalid booking: {0}")]
    InvalidBooking(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
