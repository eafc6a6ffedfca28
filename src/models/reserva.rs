use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reserva {
    pub id: Uuid,
    pub fecha: NaiveDate,
    pub cupo: i32,
    pub monto_total: f64,
    pub saldo_pendiente: f64,
    pub estado: String,
    pub hora_inicio: NaiveTime,
    pub hora_fin: NaiveTime,
    pub id_cliente: Uuid,
    pub id_cancha: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Bloque horario de facturación persistido.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReservaHorario {
    pub id: Uuid,
    pub id_reserva: Uuid,
    pub fecha: NaiveDate,
    pub hora_inicio: NaiveTime,
    pub hora_fin: NaiveTime,
    pub monto: f64,
}

#[derive(Debug, Deserialize)]
pub struct CreateReservaRequest {
    pub id_cliente: Uuid,
    pub id_cancha: Uuid,
    pub fecha: NaiveDate,
    pub cupo: i32,
    pub monto_total: f64,
    pub hora_inicio: Option<String>, // "HH:MM"
    pub hora_fin: Option<String>,
}

/// Campos admitidos en la actualización parcial. Cualquier otro campo del
/// cuerpo se ignora; horas nuevas regeneran todos los bloques.
#[derive(Debug, Deserialize)]
pub struct UpdateReservaRequest {
    pub fecha: Option<NaiveDate>,
    pub cupo: Option<i32>,
    pub monto_total: Option<f64>,
    pub saldo_pendiente: Option<f64>,
    pub estado: Option<String>,
    pub hora_inicio: Option<String>,
    pub hora_fin: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarioQuery {
    pub desde: NaiveDate,
    pub hasta: NaiveDate,
    pub id_cancha: Option<Uuid>,
    pub id_espacio: Option<Uuid>,
}

/// Fila del calendario: bloque + datos de reserva/cancha/cliente para mostrar.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BloqueCalendario {
    pub id_reserva: Uuid,
    pub fecha: NaiveDate,
    pub hora_inicio: NaiveTime,
    pub hora_fin: NaiveTime,
    pub monto: f64,
    pub estado: String,
    pub cancha: String,
    pub espacio: String,
    pub cliente: String,
}
