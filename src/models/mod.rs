pub mod auth;
pub mod qr;
pub mod reserva;
pub mod roster;
pub mod solicitud;
