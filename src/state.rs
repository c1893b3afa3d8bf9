use std::sync::Arc;

use crate::services::{BookingService, ShowService};
use crate::store::{ShowStore, TicketStore};

#[derive(Clone)]
pub struct AppState {
    pub shows: ShowService,
    pub bookings: BookingService,
}

impl AppState {
    pub fn new(shows: Arc<dyn ShowStore>, tickets: Arc<dyn TicketStore>) -> Self {
        Self {
            shows: ShowService::new(shows.clone()),
            bookings: BookingService::new(tickets, shows),
        }
    }
}
