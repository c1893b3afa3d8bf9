use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A scheduled screening of a movie on one screen of a theater.
///
/// `available_seats` only moves through the seat inventory; it stays within
/// `0..=total_seats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Show {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub theater_id: Uuid,
    pub screen_number: String,
    pub show_date: NaiveDate,
    pub show_time: NaiveTime,
    pub ticket_price: Decimal,
    pub total_seats: i32,
    pub available_seats: i32,
    pub show_type: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Show {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.show_date.and_time(self.show_time)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewShow {
    pub movie_id: Uuid,
    pub theater_id: Uuid,
    pub screen_number: String,
    pub show_date: NaiveDate,
    pub show_time: NaiveTime,
    pub ticket_price: Decimal,
    pub total_seats: i32,
    pub show_type: Option<String>,
}

/// Replacement values for a show's descriptive fields.
///
/// There is no `available_seats` here: the counter is derived from the
/// capacity change and the seats already booked.
#[derive(Debug, Clone, Deserialize)]
pub struct ShowChanges {
    pub movie_id: Uuid,
    pub theater_id: Uuid,
    pub screen_number: String,
    pub show_date: NaiveDate,
    pub show_time: NaiveTime,
    pub ticket_price: Decimal,
    pub total_seats: i32,
    pub show_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowFilter {
    pub movie_id: Option<Uuid>,
    pub theater_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
}

impl ShowFilter {
    pub fn matches(&self, show: &Show) -> bool {
        show.is_active
            && self.movie_id.map_or(true, |id| show.movie_id == id)
            && self.theater_id.map_or(true, |id| show.theater_id == id)
            && self.date.map_or(true, |date| show.show_date == date)
    }
}
