use axum::extract::State;
use axum::response::Response;
use uuid::Uuid;

use crate::models::{NewTicket, TicketChanges, TicketFilter};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::{AppJson, AppPath, AppQuery};
use crate::utils::response::{created, empty_success, success};

pub async fn list_tickets(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<TicketFilter>,
) -> Result<Response, AppError> {
    let tickets = state.bookings.list(&filter).await?;
    Ok(success(tickets, "Tickets retrieved"))
}

pub async fn get_ticket(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    let ticket = state.bookings.get(id).await?;
    Ok(success(ticket, "Ticket retrieved"))
}

pub async fn create_ticket(
    State(state): State<AppState>,
    AppJson(body): AppJson<NewTicket>,
) -> Result<Response, AppError> {
    let ticket = state.bookings.create(body).await?;
    Ok(created(ticket, "Ticket booked"))
}

pub async fn update_ticket(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<TicketChanges>,
) -> Result<Response, AppError> {
    let ticket = state.bookings.update(id, body).await?;
    Ok(success(ticket, "Ticket updated"))
}

pub async fn cancel_ticket(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    let ticket = state.bookings.cancel(id).await?;
    Ok(success(ticket, "Ticket cancelled"))
}

pub async fn delete_ticket(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    state.bookings.delete(id).await?;
    Ok(empty_success("Ticket deleted"))
}
