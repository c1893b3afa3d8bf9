use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{BookingError, SeatInventory};
use crate::models::{BookingStatus, NewTicket, PaymentStatus, Ticket, TicketChanges, TicketFilter};
use crate::store::{ShowStore, TicketHold, TicketStore};

/// Reads and conditional writes tried before giving up on a ticket that
/// keeps changing underneath.
const MAX_WRITE_ATTEMPTS: usize = 3;

/// Ticket lifecycle on top of the seat inventory.
///
/// Booking is gated on the inventory: no ticket is written unless its seats
/// were taken first. Writes to an existing ticket are conditional on the seat
/// hold that was read, and seats are only released once such a write lands.
/// Cancelling always succeeds once the ticket exists; a failed seat release is
/// logged and the ticket stays cancelled.
#[derive(Clone)]
pub struct BookingService {
    tickets: Arc<dyn TicketStore>,
    inventory: SeatInventory,
}

impl BookingService {
    pub fn new(tickets: Arc<dyn TicketStore>, shows: Arc<dyn ShowStore>) -> Self {
        Self {
            tickets,
            inventory: SeatInventory::new(shows),
        }
    }

    pub async fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, BookingError> {
        Ok(self.tickets.find(filter).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Ticket, BookingError> {
        self.tickets
            .find_by_id(id)
            .await?
            .ok_or(BookingError::TicketNotFound(id))
    }

    pub async fn create(&self, new: NewTicket) -> Result<Ticket, BookingError> {
        let seats = seat_count(&new.seat_numbers)?;
        check_amount(new.total_amount)?;
        let price_per_seat = new
            .total_amount
            .checked_div(Decimal::from(seats))
            .ok_or_else(|| BookingError::InvalidBooking("total amount is malformed".into()))?;

        let show = self.inventory.reserve(new.show_id, seats).await?;

        let now = Utc::now();
        let ticket = Ticket {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            show_id: show.id,
            movie_id: show.movie_id,
            theater_id: show.theater_id,
            seat_numbers: new.seat_numbers,
            total_amount: new.total_amount,
            booking_status: BookingStatus::Confirmed,
            payment_status: PaymentStatus::Paid,
            payment_method: new.payment_method,
            booking_date: now,
            show_date_time: show.starts_at(),
            created_at: now,
            updated_at: now,
        };

        match self.tickets.save(ticket).await {
            Ok(ticket) => {
                info!(
                    ticket_id = %ticket.id,
                    show_id = %ticket.show_id,
                    seats,
                    %price_per_seat,
                    available_seats = show.available_seats,
                    "Ticket booked"
                );
                Ok(ticket)
            }
            Err(e) => {
                // Give the seats back; the ticket never existed.
                self.release_quietly(show.id, seats, None).await;
                Err(e.into())
            }
        }
    }

    /// Rewrites a ticket's seats, amount, statuses and payment method.
    ///
    /// Extra seats are reserved before the write and dropped seats are
    /// released after it, so a failed write never hands out seats the
    /// stored ticket still holds.
    pub async fn update(&self, id: Uuid, changes: TicketChanges) -> Result<Ticket, BookingError> {
        if let Some(seat_numbers) = &changes.seat_numbers {
            seat_count(seat_numbers)?;
        }
        if let Some(total_amount) = changes.total_amount {
            check_amount(total_amount)?;
        }

        for _ in 0..MAX_WRITE_ATTEMPTS {
            let current = self.get(id).await?;
            let hold = TicketHold::of(&current);
            let held_before = current.held_seats();
            let show_id = current.show_id;

            let ticket = apply_changes(current, &changes);
            let seat_delta = ticket.held_seats() - held_before;
            if seat_delta > 0 {
                self.inventory.reserve(show_id, seat_delta).await?;
            }

            match self.tickets.replace(ticket, &hold).await {
                Ok(Some(ticket)) => {
                    if seat_delta < 0 {
                        self.release_quietly(show_id, -seat_delta, Some(id)).await;
                    }
                    debug!(ticket_id = %id, seat_delta, "Ticket updated");
                    return Ok(ticket);
                }
                Ok(None) => {
                    if seat_delta > 0 {
                        self.release_quietly(show_id, seat_delta, Some(id)).await;
                    }
                    debug!(ticket_id = %id, "Ticket changed during update, retrying");
                }
                Err(e) => {
                    if seat_delta > 0 {
                        self.release_quietly(show_id, seat_delta, Some(id)).await;
                    }
                    return Err(e.into());
                }
            }
        }

        Err(BookingError::TicketContended(id))
    }

    /// Marks a ticket cancelled and returns its seats.
    ///
    /// Cancelling a ticket that is already cancelled changes nothing. Of two
    /// concurrent cancellations only one releases the seats.
    pub async fn cancel(&self, id: Uuid) -> Result<Ticket, BookingError> {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let current = self.get(id).await?;
            if current.booking_status == BookingStatus::Cancelled {
                debug!(ticket_id = %id, "Ticket already cancelled");
                return Ok(current);
            }

            let hold = TicketHold::of(&current);
            let held = current.held_seats();
            let mut ticket = current;
            ticket.booking_status = BookingStatus::Cancelled;
            ticket.updated_at = Utc::now();

            if let Some(ticket) = self.tickets.replace(ticket, &hold).await? {
                self.release_quietly(ticket.show_id, held, Some(id)).await;
                info!(ticket_id = %id, show_id = %ticket.show_id, seats = held, "Ticket cancelled");
                return Ok(ticket);
            }
            debug!(ticket_id = %id, "Ticket changed during cancel, retrying");
        }

        Err(BookingError::TicketContended(id))
    }

    /// Removes a ticket, then returns any seats it still held.
    pub async fn delete(&self, id: Uuid) -> Result<(), BookingError> {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let current = self.get(id).await?;

            if self
                .tickets
                .delete_if_held(id, &TicketHold::of(&current))
                .await?
            {
                self.release_quietly(current.show_id, current.held_seats(), Some(id))
                    .await;
                info!(ticket_id = %id, "Ticket deleted");
                return Ok(());
            }
            debug!(ticket_id = %id, "Ticket changed during delete, retrying");
        }

        Err(BookingError::TicketContended(id))
    }

    async fn release_quietly(&self, show_id: Uuid, seats: i32, ticket_id: Option<Uuid>) {
        if seats == 0 {
            return;
        }
        if let Err(e) = self.inventory.release(show_id, seats).await {
            warn!(
                show_id = %show_id,
                ticket_id = ?ticket_id,
                seats,
                error = %e,
                "Failed to release seats"
            );
        }
    }
}

fn seat_count(seat_numbers: &[String]) -> Result<i32, BookingError> {
    if seat_numbers.is_empty() {
        return Err(BookingError::InvalidBooking(
            "at least one seat number is required".into(),
        ));
    }
    if seat_numbers.iter().any(|seat| seat.trim().is_empty()) {
        return Err(BookingError::InvalidBooking(
            "seat numbers must not be blank".into(),
        ));
    }
    i32::try_from(seat_numbers.len())
        .map_err(|_| BookingError::InvalidBooking("too many seats in one ticket".into()))
}

fn apply_changes(mut ticket: Ticket, changes: &TicketChanges) -> Ticket {
    if let Some(seat_numbers) = &changes.seat_numbers {
        ticket.seat_numbers = seat_numbers.clone();
    }
    if let Some(total_amount) = changes.total_amount {
        ticket.total_amount = total_amount;
    }
    if let Some(status) = changes.booking_status {
        ticket.booking_status = status;
    }
    if let Some(status) = changes.payment_status {
        ticket.payment_status = status;
    }
    if changes.payment_method.is_some() {
        ticket.payment_method = changes.payment_method.clone();
    }
    ticket.updated_at = Utc::now();
    ticket
}

fn check_amount(amount: Decimal) -> Result<(), BookingError> {
    if amount < Decimal::ZERO {
        return Err(BookingError::InvalidBooking(
            "total amount must not be negative".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Show;
    use crate::store::{InMemoryShowStore, InMemoryTicketStore, StoreError};
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime};
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Fixture {
        service: BookingService,
        shows: Arc<InMemoryShowStore>,
        tickets: Arc<InMemoryTicketStore>,
        show_id: Uuid,
    }

    fn show(total: i32) -> Show {
        let now = Utc::now();
        Show {
            id: Uuid::new_v4(),
            movie_id: Uuid::new_v4(),
            theater_id: Uuid::new_v4(),
            screen_number: "2".to_string(),
            show_date: NaiveDate::from_ymd_opt(2026, 11, 20).unwrap(),
            show_time: NaiveTime::from_hms_opt(18, 45, 0).unwrap(),
            ticket_price: Decimal::new(1000, 2),
            total_seats: total,
            available_seats: total,
            show_type: Some("IMAX".to_string()),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    async fn fixture(total: i32) -> Fixture {
        let shows = Arc::new(InMemoryShowStore::new());
        let tickets = Arc::new(InMemoryTicketStore::new());
        let show_id = shows.save(show(total)).await.unwrap().id;
        Fixture {
            service: BookingService::new(tickets.clone(), shows.clone()),
            shows,
            tickets,
            show_id,
        }
    }

    fn booking(show_id: Uuid, seats: &[&str]) -> NewTicket {
        NewTicket {
            user_id: Uuid::new_v4(),
            show_id,
            seat_numbers: seats.iter().map(|s| s.to_string()).collect(),
            total_amount: Decimal::new(1000, 2) * Decimal::from(seats.len()),
            payment_method: Some("CARD".to_string()),
        }
    }

    impl Fixture {
        async fn available(&self) -> i32 {
            self.shows
                .find_by_id(self.show_id)
                .await
                .unwrap()
                .unwrap()
                .available_seats
        }
    }

    #[tokio::test]
    async fn test_book_reject_then_cancel_scenario() {
        let f = fixture(10).await;

        let a = f
            .service
            .create(booking(f.show_id, &["A1", "A2", "A3", "A4"]))
            .await
            .unwrap();
        assert_eq!(f.available().await, 6);
        assert_eq!(a.booking_status, BookingStatus::Confirmed);
        assert_eq!(a.payment_status, PaymentStatus::Paid);

        let seven = ["B1", "B2", "B3", "B4", "B5", "B6", "B7"];
        let err = f.service.create(booking(f.show_id, &seven)).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::InsufficientSeats { requested: 7, available: 6, .. }
        ));
        assert_eq!(f.available().await, 6);
        assert_eq!(f.tickets.find(&TicketFilter::default()).await.unwrap().len(), 1);

        let cancelled = f.service.cancel(a.id).await.unwrap();
        assert_eq!(cancelled.booking_status, BookingStatus::Cancelled);
        assert_eq!(f.available().await, 10);
    }

    #[tokio::test]
    async fn test_booking_copies_show_details() {
        let f = fixture(4).await;
        let stored_show = f.shows.find_by_id(f.show_id).await.unwrap().unwrap();

        let ticket = f.service.create(booking(f.show_id, &["C1"])).await.unwrap();

        assert_eq!(ticket.movie_id, stored_show.movie_id);
        assert_eq!(ticket.theater_id, stored_show.theater_id);
        assert_eq!(ticket.show_date_time, stored_show.starts_at());
        assert_eq!(ticket.booking_date, ticket.created_at);
    }

    #[tokio::test]
    async fn test_empty_seat_list_writes_nothing() {
        let f = fixture(10).await;
        let before = f.shows.find_by_id(f.show_id).await.unwrap().unwrap();

        let err = f.service.create(booking(f.show_id, &[])).await.unwrap_err();

        assert!(matches!(err, BookingError::InvalidBooking(_)));
        assert_eq!(f.shows.find_by_id(f.show_id).await.unwrap().unwrap(), before);
        assert!(f.tickets.find(&TicketFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_negative_amount_is_invalid() {
        let f = fixture(10).await;
        let mut new = booking(f.show_id, &["A1"]);
        new.total_amount = Decimal::new(-100, 2);

        let err = f.service.create(new).await.unwrap_err();

        assert!(matches!(err, BookingError::InvalidBooking(_)));
        assert_eq!(f.available().await, 10);
    }

    #[tokio::test]
    async fn test_booking_unknown_show() {
        let f = fixture(10).await;
        let missing = Uuid::new_v4();

        let err = f.service.create(booking(missing, &["A1"])).await.unwrap_err();

        assert!(matches!(err, BookingError::ShowNotFound(id) if id == missing));
        assert!(f.tickets.find(&TicketFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_cancel_is_a_no_op() {
        let f = fixture(10).await;
        let ticket = f.service.create(booking(f.show_id, &["A1", "A2"])).await.unwrap();
        f.service.create(booking(f.show_id, &["B1", "B2", "B3"])).await.unwrap();

        let first = f.service.cancel(ticket.id).await.unwrap();
        assert_eq!(f.available().await, 7);

        let second = f.service.cancel(ticket.id).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(f.available().await, 7);
    }

    #[tokio::test]
    async fn test_cancel_unknown_ticket() {
        let f = fixture(10).await;
        let missing = Uuid::new_v4();

        let err = f.service.cancel(missing).await.unwrap_err();
        assert!(matches!(err, BookingError::TicketNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_cancel_succeeds_when_show_is_gone() {
        let f = fixture(10).await;
        let mut orphan = f.service.create(booking(f.show_id, &["A1"])).await.unwrap();
        orphan.id = Uuid::new_v4();
        orphan.show_id = Uuid::new_v4();
        f.tickets.save(orphan.clone()).await.unwrap();

        let cancelled = f.service.cancel(orphan.id).await.unwrap();

        assert_eq!(cancelled.booking_status, BookingStatus::Cancelled);
        assert_eq!(f.available().await, 9);
    }

    #[tokio::test]
    async fn test_update_adding_seats_goes_through_inventory() {
        let f = fixture(5).await;
        let ticket = f.service.create(booking(f.show_id, &["A1", "A2"])).await.unwrap();

        let changes = TicketChanges {
            seat_numbers: Some(vec!["A1".into(), "A2".into(), "A3".into()]),
            ..Default::default()
        };
        let updated = f.service.update(ticket.id, changes).await.unwrap();
        assert_eq!(updated.seat_count(), 3);
        assert_eq!(f.available().await, 2);

        let too_many = TicketChanges {
            seat_numbers: Some((1..=6).map(|n| format!("A{}", n)).collect()),
            ..Default::default()
        };
        let err = f.service.update(ticket.id, too_many).await.unwrap_err();
        assert!(matches!(err, BookingError::InsufficientSeats { requested: 3, .. }));
        assert_eq!(f.available().await, 2);
        assert_eq!(f.service.get(ticket.id).await.unwrap().seat_count(), 3);
    }

    #[tokio::test]
    async fn test_update_dropping_seats_releases_them() {
        let f = fixture(5).await;
        let ticket = f
            .service
            .create(booking(f.show_id, &["A1", "A2", "A3"]))
            .await
            .unwrap();

        let changes = TicketChanges {
            seat_numbers: Some(vec!["A1".into()]),
            total_amount: Some(Decimal::new(1000, 2)),
            ..Default::default()
        };
        f.service.update(ticket.id, changes).await.unwrap();

        assert_eq!(f.available().await, 4);
    }

    #[tokio::test]
    async fn test_update_status_round_trip_keeps_inventory_in_sync() {
        let f = fixture(5).await;
        let ticket = f.service.create(booking(f.show_id, &["A1", "A2"])).await.unwrap();

        let cancel = TicketChanges {
            booking_status: Some(BookingStatus::Cancelled),
            ..Default::default()
        };
        f.service.update(ticket.id, cancel).await.unwrap();
        assert_eq!(f.available().await, 5);

        let reinstate = TicketChanges {
            booking_status: Some(BookingStatus::Confirmed),
            payment_status: Some(PaymentStatus::Pending),
            ..Default::default()
        };
        let updated = f.service.update(ticket.id, reinstate).await.unwrap();
        assert_eq!(updated.payment_status, PaymentStatus::Pending);
        assert_eq!(f.available().await, 3);
    }

    #[tokio::test]
    async fn test_update_with_empty_seats_is_invalid() {
        let f = fixture(5).await;
        let ticket = f.service.create(booking(f.show_id, &["A1"])).await.unwrap();

        let changes = TicketChanges {
            seat_numbers: Some(Vec::new()),
            ..Default::default()
        };
        let err = f.service.update(ticket.id, changes).await.unwrap_err();

        assert!(matches!(err, BookingError::InvalidBooking(_)));
        assert_eq!(f.available().await, 4);
    }

    #[tokio::test]
    async fn test_delete_returns_held_seats() {
        let f = fixture(5).await;
        let held = f.service.create(booking(f.show_id, &["A1", "A2"])).await.unwrap();
        let cancelled = f.service.create(booking(f.show_id, &["B1"])).await.unwrap();
        f.service.cancel(cancelled.id).await.unwrap();
        assert_eq!(f.available().await, 3);

        f.service.delete(held.id).await.unwrap();
        f.service.delete(cancelled.id).await.unwrap();

        assert_eq!(f.available().await, 5);
        assert!(matches!(
            f.service.get(held.id).await.unwrap_err(),
            BookingError::TicketNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_list_filters() {
        let f = fixture(10).await;
        let mine = booking(f.show_id, &["A1"]);
        let user_id = mine.user_id;
        let first = f.service.create(mine).await.unwrap();
        let mut again = booking(f.show_id, &["A2"]);
        again.user_id = user_id;
        let second = f.service.create(again).await.unwrap();
        f.service.create(booking(f.show_id, &["A3"])).await.unwrap();
        f.service.cancel(second.id).await.unwrap();

        let by_user = TicketFilter {
            user_id: Some(user_id),
            ..Default::default()
        };
        assert_eq!(f.service.list(&by_user).await.unwrap().len(), 2);

        let confirmed_for_user = TicketFilter {
            user_id: Some(user_id),
            status: Some(BookingStatus::Confirmed),
            ..Default::default()
        };
        let found = f.service.list(&confirmed_for_user).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, first.id);

        let by_show = TicketFilter {
            show_id: Some(f.show_id),
            ..Default::default()
        };
        assert_eq!(f.service.list(&by_show).await.unwrap().len(), 3);
    }

    /// Wraps the in-memory store; can refuse writes, and can yield after each
    /// read the way a database round-trip would.
    #[derive(Default)]
    struct ScriptedTicketStore {
        inner: InMemoryTicketStore,
        refuse_writes: AtomicBool,
        yield_after_read: bool,
    }

    impl ScriptedTicketStore {
        fn refusing() -> Self {
            Self {
                refuse_writes: AtomicBool::new(true),
                ..Default::default()
            }
        }

        fn yielding() -> Self {
            Self {
                yield_after_read: true,
                ..Default::default()
            }
        }

        fn refuse_writes(&self) {
            self.refuse_writes.store(true, Ordering::SeqCst);
        }

        fn check_write(&self) -> Result<(), StoreError> {
            if self.refuse_writes.load(Ordering::SeqCst) {
                Err(StoreError::Corrupt("write refused".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl TicketStore for ScriptedTicketStore {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Ticket>, StoreError> {
            let found = self.inner.find_by_id(id).await;
            if self.yield_after_read {
                tokio::task::yield_now().await;
            }
            found
        }

        async fn find(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, StoreError> {
            self.inner.find(filter).await
        }

        async fn save(&self, ticket: Ticket) -> Result<Ticket, StoreError> {
            self.check_write()?;
            self.inner.save(ticket).await
        }

        async fn replace(
            &self,
            ticket: Ticket,
            hold: &TicketHold,
        ) -> Result<Option<Ticket>, StoreError> {
            self.check_write()?;
            self.inner.replace(ticket, hold).await
        }

        async fn delete_if_held(&self, id: Uuid, hold: &TicketHold) -> Result<bool, StoreError> {
            self.check_write()?;
            self.inner.delete_if_held(id, hold).await
        }
    }

    async fn scripted(
        total: i32,
        tickets: ScriptedTicketStore,
    ) -> (BookingService, Arc<ScriptedTicketStore>, Arc<InMemoryShowStore>, Uuid) {
        let shows = Arc::new(InMemoryShowStore::new());
        let show_id = shows.save(show(total)).await.unwrap().id;
        let tickets = Arc::new(tickets);
        let service = BookingService::new(tickets.clone(), shows.clone());
        (service, tickets, shows, show_id)
    }

    async fn available_in(shows: &InMemoryShowStore, show_id: Uuid) -> i32 {
        shows
            .find_by_id(show_id)
            .await
            .unwrap()
            .unwrap()
            .available_seats
    }

    #[tokio::test]
    async fn test_failed_ticket_write_gives_seats_back() {
        let (service, _, shows, show_id) = scripted(6, ScriptedTicketStore::refusing()).await;

        let err = service.create(booking(show_id, &["A1", "A2"])).await.unwrap_err();

        assert!(matches!(err, BookingError::Store(_)));
        assert_eq!(available_in(&shows, show_id).await, 6);
    }

    #[tokio::test]
    async fn test_failed_write_when_dropping_seats_keeps_them_held() {
        let (service, tickets, shows, show_id) =
            scripted(10, ScriptedTicketStore::default()).await;
        let ticket = service
            .create(booking(show_id, &["S0", "S1", "S2", "S3"]))
            .await
            .unwrap();
        assert_eq!(available_in(&shows, show_id).await, 6);
        tickets.refuse_writes();

        let changes = TicketChanges {
            seat_numbers: Some(vec!["S0".into()]),
            ..Default::default()
        };
        let err = service.update(ticket.id, changes).await.unwrap_err();

        assert!(matches!(err, BookingError::Store(_)));
        assert_eq!(service.get(ticket.id).await.unwrap().seat_count(), 4);
        assert_eq!(available_in(&shows, show_id).await, 6);
    }

    #[tokio::test]
    async fn test_failed_write_when_adding_seats_gives_them_back() {
        let (service, tickets, shows, show_id) =
            scripted(10, ScriptedTicketStore::default()).await;
        let ticket = service.create(booking(show_id, &["S0"])).await.unwrap();
        tickets.refuse_writes();

        let changes = TicketChanges {
            seat_numbers: Some(vec!["S0".into(), "S1".into(), "S2".into()]),
            ..Default::default()
        };
        service.update(ticket.id, changes).await.unwrap_err();

        assert_eq!(available_in(&shows, show_id).await, 9);
    }

    #[tokio::test]
    async fn test_failed_cancel_or_delete_keeps_seats_held() {
        let (service, tickets, shows, show_id) =
            scripted(10, ScriptedTicketStore::default()).await;
        let ticket = service
            .create(booking(show_id, &["S0", "S1", "S2", "S3"]))
            .await
            .unwrap();
        tickets.refuse_writes();

        assert!(matches!(
            service.cancel(ticket.id).await.unwrap_err(),
            BookingError::Store(_)
        ));
        assert!(matches!(
            service.delete(ticket.id).await.unwrap_err(),
            BookingError::Store(_)
        ));

        let stored = service.get(ticket.id).await.unwrap();
        assert_eq!(stored.booking_status, BookingStatus::Confirmed);
        assert_eq!(available_in(&shows, show_id).await, 6);
    }

    #[tokio::test]
    async fn test_concurrent_cancels_release_seats_once() {
        let (service, _, shows, show_id) = scripted(10, ScriptedTicketStore::yielding()).await;
        let a = service.create(booking(show_id, &["A1", "A2"])).await.unwrap();
        service
            .create(booking(show_id, &["B1", "B2", "B3", "B4", "B5"]))
            .await
            .unwrap();
        assert_eq!(available_in(&shows, show_id).await, 3);

        let (first, second) = tokio::join!(service.cancel(a.id), service.cancel(a.id));

        assert_eq!(first.unwrap().booking_status, BookingStatus::Cancelled);
        assert_eq!(second.unwrap().booking_status, BookingStatus::Cancelled);
        assert_eq!(available_in(&shows, show_id).await, 5);
    }

    #[tokio::test]
    async fn test_concurrent_cancel_and_delete_release_seats_once() {
        let (service, _, shows, show_id) = scripted(10, ScriptedTicketStore::yielding()).await;
        let a = service.create(booking(show_id, &["A1", "A2"])).await.unwrap();
        service
            .create(booking(show_id, &["B1", "B2", "B3", "B4", "B5"]))
            .await
            .unwrap();

        let (cancelled, deleted) = tokio::join!(service.cancel(a.id), service.delete(a.id));

        cancelled.unwrap();
        deleted.unwrap();
        assert!(matches!(
            service.get(a.id).await.unwrap_err(),
            BookingError::TicketNotFound(_)
        ));
        assert_eq!(available_in(&shows, show_id).await, 5);
    }

    #[tokio::test]
    async fn test_concurrent_seat_changes_stay_consistent() {
        let (service, _, shows, show_id) = scripted(10, ScriptedTicketStore::yielding()).await;
        let a = service.create(booking(show_id, &["A1", "A2"])).await.unwrap();

        let grow = TicketChanges {
            seat_numbers: Some(vec!["A1".into(), "A2".into(), "A3".into(), "A4".into()]),
            ..Default::default()
        };
        let shrink = TicketChanges {
            seat_numbers: Some(vec!["A1".into()]),
            ..Default::default()
        };
        let (grown, shrunk) = tokio::join!(
            service.update(a.id, grow),
            service.update(a.id, shrink)
        );
        grown.unwrap();
        shrunk.unwrap();

        let stored = service.get(a.id).await.unwrap();
        assert_eq!(
            available_in(&shows, show_id).await,
            10 - stored.held_seats()
        );
    }
}
