pub mod show;
pub mod ticket;

pub use show::{NewShow, Show, ShowChanges, ShowFilter};
pub use ticket::{BookingStatus, NewTicket, PaymentStatus, Ticket, TicketChanges, TicketFilter};
