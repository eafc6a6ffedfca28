use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Vínculo autoritativo reserva ↔ persona.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReservaDeportista {
    pub id: Uuid,
    pub id_reserva: Uuid,
    pub id_persona: Uuid,
    pub estado: String,
    pub unido_en: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UnirseRequest {
    pub code: String,
    pub id_persona: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UnirseInfoQuery {
    pub code: String,
    pub id_persona: Uuid,
}

/// Respuesta consultiva del endpoint de info: el flujo de unión vuelve a
/// validar todo por su cuenta, esto solo alimenta la UI.
#[derive(Debug, Serialize)]
pub struct UnirseInfo {
    pub id_reserva: Uuid,
    pub fecha: chrono::NaiveDate,
    pub cupo: i32,
    pub ocupados: i64,
    pub puede_unirse: bool,
    pub ya_unido: bool,
    pub cupo_lleno: bool,
    pub es_cliente_responsable: bool,
}

#[derive(Debug, Serialize)]
pub struct ReservaOcupacion {
    pub id_reserva: Uuid,
    pub cupo: i32,
    pub ocupados: i64,
    pub disponibles: i64,
}

#[derive(Debug, Deserialize)]
pub struct AgregarParticipanteRequest {
    pub id_persona: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ListarDeportistasQuery {
    pub id_reserva: Uuid,
    pub pagina: Option<i64>,
    pub limite: Option<i64>,
}

/// Fila del roster con los datos de la persona para mostrar.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DeportistaEnReserva {
    pub id_persona: Uuid,
    pub nombre: String,
    pub apellido: String,
    pub unido_en: DateTime<Utc>,
}
