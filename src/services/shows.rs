use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::BookingError;
use crate::models::{NewShow, Show, ShowChanges, ShowFilter};
use crate::store::{SeatAdjustment, ShowStore};

#[derive(Clone)]
pub struct ShowService {
    shows: Arc<dyn ShowStore>,
}

impl ShowService {
    pub fn new(shows: Arc<dyn ShowStore>) -> Self {
        Self { shows }
    }

    pub async fn list(&self, filter: &ShowFilter) -> Result<Vec<Show>, BookingError> {
        Ok(self.shows.find_active(filter).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Show, BookingError> {
        self.shows
            .find_by_id(id)
            .await?
            .ok_or(BookingError::ShowNotFound(id))
    }

    pub async fn create(&self, new: NewShow) -> Result<Show, BookingError> {
        check_capacity(new.total_seats)?;
        check_price(new.ticket_price)?;

        let now = Utc::now();
        let show = self
            .shows
            .save(Show {
                id: Uuid::new_v4(),
                movie_id: new.movie_id,
                theater_id: new.theater_id,
                screen_number: new.screen_number,
                show_date: new.show_date,
                show_time: new.show_time,
                ticket_price: new.ticket_price,
                total_seats: new.total_seats,
                available_seats: new.total_seats,
                show_type: new.show_type,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!(show_id = %show.id, total_seats = show.total_seats, "Show created");
        Ok(show)
    }

    /// Replaces a show's details. A capacity change moves the available
    /// seats by the same amount and fails if it would drop below the seats
    /// already booked.
    pub async fn update(&self, id: Uuid, changes: ShowChanges) -> Result<Show, BookingError> {
        check_capacity(changes.total_seats)?;
        check_price(changes.ticket_price)?;

        let mut show = self.get(id).await?;
        let now = Utc::now();

        if changes.total_seats != show.total_seats {
            match self.shows.set_capacity(id, changes.total_seats, now).await? {
                Some(SeatAdjustment::Applied(resized)) => {
                    show.total_seats = resized.total_seats;
                    show.available_seats = resized.available_seats;
                }
                Some(SeatAdjustment::Insufficient { available }) => {
                    return Err(BookingError::InvalidBooking(format!(
                        "cannot shrink show to {} seats, {} already booked",
                        changes.total_seats,
                        show.total_seats - available
                    )));
                }
                None => return Err(BookingError::ShowNotFound(id)),
            }
        }

        show.movie_id = changes.movie_id;
        show.theater_id = changes.theater_id;
        show.screen_number = changes.screen_number;
        show.show_date = changes.show_date;
        show.show_time = changes.show_time;
        show.ticket_price = changes.ticket_price;
        show.show_type = changes.show_type;
        show.updated_at = now;

        Ok(self.shows.save(show).await?)
    }

    /// Soft delete: the show stays readable by id but drops out of listings.
    pub async fn deactivate(&self, id: Uuid) -> Result<(), BookingError> {
        let mut show = self.get(id).await?;
        show.is_active = false;
        show.updated_at = Utc::now();
        self.shows.save(show).await?;

        info!(show_id = %id, "Show deactivated");
        Ok(())
    }
}

fn check_capacity(total_seats: i32) -> Result<(), BookingError> {
    if total_seats < 0 {
        return Err(BookingError::InvalidBooking(
            "total seats must not be negative".into(),
        ));
    }
    Ok(())
}

fn check_price(price: Decimal) -> Result<(), BookingError> {
    if price < Decimal::ZERO {
        return Err(BookingError::InvalidBooking(
            "ticket price must not be negative".into(),
        ));
    }
    Ok(())
}
