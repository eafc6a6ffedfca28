pub mod email;
pub mod horarios;
pub mod qr;
pub mod reservas;
pub mod roles;
pub mod roster;
pub mod solicitudes;
