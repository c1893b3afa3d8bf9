use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{SeatAdjustment, ShowStore, StoreError, TicketHold, TicketStore};
use crate::models::{Show, ShowFilter, Ticket, TicketFilter};

const SHOW_COLUMNS: &str = "id, movie_id, theater_id, screen_number, show_date, show_time, \
     ticket_price, total_seats, available_seats, show_type, is_active, created_at, updated_at";

const TICKET_COLUMNS: &str = "id, user_id, show_id, movie_id, theater_id, seat_numbers, \
     total_amount, booking_status, payment_status, payment_method, booking_date, \
     show_date_time, created_at, updated_at";

pub async fn run_migrations(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!().run(pool).await?;
    Ok(())
}

#[derive(Clone)]
pub struct PgShowStore {
    pool: PgPool,
}

impl PgShowStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn available_seats(&self, id: Uuid) -> Result<Option<i32>, StoreError> {
        let available: Option<i32> =
            sqlx::query_scalar("SELECT available_seats FROM shows WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(available)
    }
}

#[async_trait]
impl ShowStore for PgShowStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Show>, StoreError> {
        let sql = format!("SELECT {SHOW_COLUMNS} FROM shows WHERE id = $1");
        let show = sqlx::query_as::<_, Show>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(show)
    }

    async fn find_active(&self, filter: &ShowFilter) -> Result<Vec<Show>, StoreError> {
        let sql = format!(
            "SELECT {SHOW_COLUMNS} FROM shows \
             WHERE is_active \
               AND ($1::uuid IS NULL OR movie_id = $1) \
               AND ($2::uuid IS NULL OR theater_id = $2) \
               AND ($3::date IS NULL OR show_date = $3) \
             ORDER BY show_date, show_time, id"
        );
        let shows = sqlx::query_as::<_, Show>(&sql)
            .bind(filter.movie_id)
            .bind(filter.theater_id)
            .bind(filter.date)
            .fetch_all(&self.pool)
            .await?;
        Ok(shows)
    }

    async fn save(&self, show: Show) -> Result<Show, StoreError> {
        let sql = format!(
            "INSERT INTO shows ({SHOW_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             ON CONFLICT (id) DO UPDATE SET \
               movie_id = EXCLUDED.movie_id, \
               theater_id = EXCLUDED.theater_id, \
               screen_number = EXCLUDED.screen_number, \
               show_date = EXCLUDED.show_date, \
               show_time = EXCLUDED.show_time, \
               ticket_price = EXCLUDED.ticket_price, \
               show_type = EXCLUDED.show_type, \
               is_active = EXCLUDED.is_active, \
               updated_at = EXCLUDED.updated_at \
             RETURNING {SHOW_COLUMNS}"
        );
        let saved = sqlx::query_as::<_, Show>(&sql)
            .bind(show.id)
            .bind(show.movie_id)
            .bind(show.theater_id)
            .bind(&show.screen_number)
            .bind(show.show_date)
            .bind(show.show_time)
            .bind(show.ticket_price)
            .bind(show.total_seats)
            .bind(show.available_seats)
            .bind(&show.show_type)
            .bind(show.is_active)
            .bind(show.created_at)
            .bind(show.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(saved)
    }

    async fn adjust_available_seats(
        &self,
        id: Uuid,
        seat_delta: i32,
        at: DateTime<Utc>,
    ) -> Result<Option<SeatAdjustment>, StoreError> {
        let sql = format!(
            "UPDATE shows \
             SET available_seats = LEAST(total_seats, available_seats - $2), updated_at = $3 \
             WHERE id = $1 AND available_seats - $2 >= 0 \
             RETURNING {SHOW_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Show>(&sql)
            .bind(id)
            .bind(seat_delta)
            .bind(at)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(show) = updated {
            return Ok(Some(SeatAdjustment::Applied(show)));
        }

        // The update matched nothing: either the show is gone or the seats ran out.
        Ok(self
            .available_seats(id)
            .await?
            .map(|available| SeatAdjustment::Insufficient { available }))
    }

    async fn set_capacity(
        &self,
        id: Uuid,
        total_seats: i32,
        at: DateTime<Utc>,
    ) -> Result<Option<SeatAdjustment>, StoreError> {
        let sql = format!(
            "UPDATE shows \
             SET available_seats = available_seats + ($2 - total_seats), \
                 total_seats = $2, \
                 updated_at = $3 \
             WHERE id = $1 AND available_seats + ($2 - total_seats) >= 0 \
             RETURNING {SHOW_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Show>(&sql)
            .bind(id)
            .bind(total_seats)
            .bind(at)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(show) = updated {
            return Ok(Some(SeatAdjustment::Applied(show)));
        }

        Ok(self
            .available_seats(id)
            .await?
            .map(|available| SeatAdjustment::Insufficient { available }))
    }
}

#[derive(Debug, FromRow)]
struct TicketRow {
    id: Uuid,
    user_id: Uuid,
    show_id: Uuid,
    movie_id: Uuid,
    theater_id: Uuid,
    seat_numbers: Vec<String>,
    total_amount: Decimal,
    booking_status: String,
    payment_status: String,
    payment_method: Option<String>,
    booking_date: DateTime<Utc>,
    show_date_time: NaiveDateTime,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = StoreError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        let booking_status = row
            .booking_status
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("ticket {}: {}", row.id, e)))?;
        let payment_status = row
            .payment_status
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("ticket {}: {}", row.id, e)))?;

        Ok(Ticket {
            id: row.id,
            user_id: row.user_id,
            show_id: row.show_id,
            movie_id: row.movie_id,
            theater_id: row.theater_id,
            seat_numbers: row.seat_numbers,
            total_amount: row.total_amount,
            booking_status,
            payment_status,
            payment_method: row.payment_method,
            booking_date: row.booking_date,
            show_date_time: row.show_date_time,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct PgTicketStore {
    pool: PgPool,
}

impl PgTicketStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketStore for PgTicketStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ticket>, StoreError> {
        let sql = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1");
        sqlx::query_as::<_, TicketRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Ticket::try_from)
            .transpose()
    }

    async fn find(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, StoreError> {
        let sql = format!(
            "SELECT {TICKET_COLUMNS} FROM tickets \
             WHERE ($1::uuid IS NULL OR user_id = $1) \
               AND ($2::uuid IS NULL OR show_id = $2) \
               AND ($3::text IS NULL OR booking_status = $3) \
             ORDER BY booking_date, id"
        );
        sqlx::query_as::<_, TicketRow>(&sql)
            .bind(filter.user_id)
            .bind(filter.show_id)
            .bind(filter.status.map(|status| status.as_str()))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Ticket::try_from)
            .collect()
    }

    async fn save(&self, ticket: Ticket) -> Result<Ticket, StoreError> {
        let sql = format!(
            "INSERT INTO tickets ({TICKET_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             ON CONFLICT (id) DO UPDATE SET \
               seat_numbers = EXCLUDED.seat_numbers, \
               total_amount = EXCLUDED.total_amount, \
               booking_status = EXCLUDED.booking_status, \
               payment_status = EXCLUDED.payment_status, \
               payment_method = EXCLUDED.payment_method, \
               updated_at = EXCLUDED.updated_at \
             RETURNING {TICKET_COLUMNS}"
        );
        let row = sqlx::query_as::<_, TicketRow>(&sql)
            .bind(ticket.id)
            .bind(ticket.user_id)
            .bind(ticket.show_id)
            .bind(ticket.movie_id)
            .bind(ticket.theater_id)
            .bind(&ticket.seat_numbers)
            .bind(ticket.total_amount)
            .bind(ticket.booking_status.as_str())
            .bind(ticket.payment_status.as_str())
            .bind(&ticket.payment_method)
            .bind(ticket.booking_date)
            .bind(ticket.show_date_time)
            .bind(ticket.created_at)
            .bind(ticket.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ticket::try_from(row)
    }

    async fn replace(
        &self,
        ticket: Ticket,
        hold: &TicketHold,
    ) -> Result<Option<Ticket>, StoreError> {
        let sql = format!(
            "UPDATE tickets \
             SET seat_numbers = $2, \
                 total_amount = $3, \
                 booking_status = $4, \
                 payment_status = $5, \
                 payment_method = $6, \
                 updated_at = $7 \
             WHERE id = $1 AND booking_status = $8 AND seat_numbers = $9 \
             RETURNING {TICKET_COLUMNS}"
        );
        sqlx::query_as::<_, TicketRow>(&sql)
            .bind(ticket.id)
            .bind(&ticket.seat_numbers)
            .bind(ticket.total_amount)
            .bind(ticket.booking_status.as_str())
            .bind(ticket.payment_status.as_str())
            .bind(&ticket.payment_method)
            .bind(ticket.updated_at)
            .bind(hold.booking_status.as_str())
            .bind(&hold.seat_numbers)
            .fetch_optional(&self.pool)
            .await?
            .map(Ticket::try_from)
            .transpose()
    }

    async fn delete_if_held(&self, id: Uuid, hold: &TicketHold) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "DELETE FROM tickets WHERE id = $1 AND booking_status = $2 AND seat_numbers = $3",
        )
        .bind(id)
        .bind(hold.booking_status.as_str())
        .bind(&hold.seat_numbers)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
