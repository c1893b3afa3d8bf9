use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    next_available, resized_available, SeatAdjustment, ShowStore, StoreError, TicketHold,
    TicketStore,
};
use crate::models::{Show, ShowFilter, Ticket, TicketFilter};

#[derive(Clone, Default)]
pub struct InMemoryShowStore {
    shows: Arc<RwLock<HashMap<Uuid, Show>>>,
}

impl InMemoryShowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShowStore for InMemoryShowStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Show>, StoreError> {
        Ok(self.shows.read().await.get(&id).cloned())
    }

    async fn find_active(&self, filter: &ShowFilter) -> Result<Vec<Show>, StoreError> {
        let shows = self.shows.read().await;
        let mut found: Vec<Show> = shows
            .values()
            .filter(|show| filter.matches(show))
            .cloned()
            .collect();
        found.sort_by_key(|show| (show.show_date, show.show_time, show.id));
        Ok(found)
    }

    async fn save(&self, mut show: Show) -> Result<Show, StoreError> {
        let mut shows = self.shows.write().await;
        if let Some(existing) = shows.get(&show.id) {
            show.total_seats = existing.total_seats;
            show.available_seats = existing.available_seats;
        }
        shows.insert(show.id, show.clone());
        Ok(show)
    }

    async fn adjust_available_seats(
        &self,
        id: Uuid,
        seat_delta: i32,
        at: DateTime<Utc>,
    ) -> Result<Option<SeatAdjustment>, StoreError> {
        // Read and write under one guard so concurrent bookings serialize.
        let mut shows = self.shows.write().await;
        let Some(show) = shows.get_mut(&id) else {
            return Ok(None);
        };

        match next_available(show, seat_delta) {
            Some(available) => {
                show.available_seats = available;
                show.updated_at = at;
                Ok(Some(SeatAdjustment::Applied(show.clone())))
            }
            None => Ok(Some(SeatAdjustment::Insufficient {
                available: show.available_seats,
            })),
        }
    }

    async fn set_capacity(
        &self,
        id: Uuid,
        total_seats: i32,
        at: DateTime<Utc>,
    ) -> Result<Option<SeatAdjustment>, StoreError> {
        let mut shows = self.shows.write().await;
        let Some(show) = shows.get_mut(&id) else {
            return Ok(None);
        };

        match resized_available(show, total_seats) {
            Some(available) => {
                show.total_seats = total_seats;
                show.available_seats = available;
                show.updated_at = at;
                Ok(Some(SeatAdjustment::Applied(show.clone())))
            }
            None => Ok(Some(SeatAdjustment::Insufficient {
                available: show.available_seats,
            })),
        }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryTicketStore {
    tickets: Arc<RwLock<HashMap<Uuid, Ticket>>>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ticket>, StoreError> {
        Ok(self.tickets.read().await.get(&id).cloned())
    }

    async fn find(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, StoreError> {
        let tickets = self.tickets.read().await;
        let mut found: Vec<Ticket> = tickets
            .values()
            .filter(|ticket| filter.matches(ticket))
            .cloned()
            .collect();
        found.sort_by_key(|ticket| (ticket.booking_date, ticket.id));
        Ok(found)
    }

    async fn save(&self, ticket: Ticket) -> Result<Ticket, StoreError> {
        self.tickets.write().await.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    async fn replace(
        &self,
        ticket: Ticket,
        hold: &TicketHold,
    ) -> Result<Option<Ticket>, StoreError> {
        let mut tickets = self.tickets.write().await;
        match tickets.get_mut(&ticket.id) {
            Some(stored) if hold.is_held_by(stored) => {
                *stored = ticket.clone();
                Ok(Some(ticket))
            }
            _ => Ok(None),
        }
    }

    async fn delete_if_held(&self, id: Uuid, hold: &TicketHold) -> Result<bool, StoreError> {
        let mut tickets = self.tickets.write().await;
        match tickets.get(&id) {
            Some(stored) if hold.is_held_by(stored) => Ok(tickets.remove(&id).is_some()),
            _ => Ok(false),
        }
    }
}
