use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::roster::{DeportistaEnReserva, ReservaOcupacion, UnirseInfo};
use crate::services::qr::esta_expirado;
use crate::services::roles::{self, Rol};

/// Cupo disponible para co-participantes: el cliente responsable ocupa
/// siempre una plaza implícita.
pub fn max_participantes(cupo: i32) -> i64 {
    if cupo > 1 {
        (cupo - 1) as i64
    } else {
        0
    }
}

/// Fila combinada QR + reserva usada por el flujo de unión.
#[derive(Debug, FromRow)]
struct QrReservaFila {
    id_reserva: Uuid,
    qr_estado: String,
    expira_en: Option<DateTime<Utc>>,
    reserva_estado: String,
    cupo: i32,
    fecha: NaiveDate,
    persona_cliente: Uuid,
}

pub struct RosterService;

impl RosterService {
    async fn contar_activos(
        tx: &mut Transaction<'_, Postgres>,
        id_reserva: Uuid,
    ) -> Result<i64, ApiError> {
        let activos: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reserva_deportista
             WHERE id_reserva = $1 AND estado = 'activo'",
        )
        .bind(id_reserva)
        .fetch_one(&mut **tx)
        .await?;
        Ok(activos)
    }

    /// Escribe la admisión en ambas representaciones del roster: upsert del
    /// rol deportista, alta (o reactivación) del vínculo autoritativo y
    /// espejo en `participa_en`.
    async fn admitir(
        tx: &mut Transaction<'_, Postgres>,
        id_reserva: Uuid,
        id_persona: Uuid,
    ) -> Result<(), ApiError> {
        roles::asignar(&mut **tx, id_persona, &Rol::Deportista).await?;

        sqlx::query(
            "INSERT INTO reserva_deportista (id_reserva, id_persona, estado, unido_en)
             VALUES ($1, $2, 'activo', NOW())
             ON CONFLICT (id_reserva, id_persona)
             DO UPDATE SET estado = 'activo', unido_en = NOW()",
        )
        .bind(id_reserva)
        .bind(id_persona)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            "INSERT INTO participa_en (id_deportista, id_reserva)
             SELECT d.id, $1 FROM deportista d WHERE d.id_persona = $2
             ON CONFLICT DO NOTHING",
        )
        .bind(id_reserva)
        .bind(id_persona)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Flujo de unión por código QR. Toda la validación y la escritura corren
    /// en una transacción que bloquea la fila de la reserva (`FOR UPDATE`):
    /// dos uniones concurrentes por la última plaza se serializan ahí.
    pub async fn unirse_por_codigo(
        pool: &PgPool,
        codigo: &str,
        id_persona: Uuid,
    ) -> Result<ReservaOcupacion, ApiError> {
        let mut tx = pool.begin().await?;

        let fila = sqlx::query_as::<_, QrReservaFila>(
            "SELECT q.id_reserva, q.estado AS qr_estado, q.expira_en,
                    r.estado AS reserva_estado, r.cupo, r.fecha,
                    c.id_persona AS persona_cliente
             FROM qr_reserva q
             JOIN reserva r ON r.id = q.id_reserva
             JOIN cliente c ON c.id = r.id_cliente
             WHERE q.codigo = $1
             FOR UPDATE OF r",
        )
        .bind(codigo)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NoEncontrado("Código QR no encontrado".into()))?;

        if fila.qr_estado != "activo" {
            return Err(ApiError::CodigoInactivo);
        }
        if esta_expirado(fila.expira_en, Utc::now()) {
            return Err(ApiError::CodigoExpirado);
        }
        if fila.reserva_estado == "cancelada" {
            return Err(ApiError::ReservaCancelada);
        }
        if fila.persona_cliente == id_persona {
            return Err(ApiError::AutoUnionProhibida);
        }

        let ya_activo: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM reserva_deportista
             WHERE id_reserva = $1 AND id_persona = $2 AND estado = 'activo'",
        )
        .bind(fila.id_reserva)
        .bind(id_persona)
        .fetch_optional(&mut *tx)
        .await?;
        if ya_activo.is_some() {
            return Err(ApiError::YaUnido);
        }

        let activos = Self::contar_activos(&mut tx, fila.id_reserva).await?;
        let maximo = max_participantes(fila.cupo);
        if activos >= maximo {
            return Err(ApiError::CupoLleno);
        }

        Self::admitir(&mut tx, fila.id_reserva, id_persona).await?;
        tx.commit().await?;

        tracing::info!(
            "persona {id_persona} unida a reserva {} ({} de {maximo})",
            fila.id_reserva,
            activos + 1
        );

        Ok(ReservaOcupacion {
            id_reserva: fila.id_reserva,
            cupo: fila.cupo,
            ocupados: activos + 1,
            disponibles: maximo - activos - 1,
        })
    }

    /// Chequeo consultivo para la UI: no muta nada y el flujo de unión
    /// revalida todo por su cuenta. Solo un código desconocido es error;
    /// las demás condiciones se reportan como booleanos.
    pub async fn info_union(
        pool: &PgPool,
        codigo: &str,
        id_persona: Uuid,
    ) -> Result<UnirseInfo, ApiError> {
        let fila = sqlx::query_as::<_, QrReservaFila>(
            "SELECT q.id_reserva, q.estado AS qr_estado, q.expira_en,
                    r.estado AS reserva_estado, r.cupo, r.fecha,
                    c.id_persona AS persona_cliente
             FROM qr_reserva q
             JOIN reserva r ON r.id = q.id_reserva
             JOIN cliente c ON c.id = r.id_cliente
             WHERE q.codigo = $1",
        )
        .bind(codigo)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NoEncontrado("Código QR no encontrado".into()))?;

        let ocupados: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reserva_deportista
             WHERE id_reserva = $1 AND estado = 'activo'",
        )
        .bind(fila.id_reserva)
        .fetch_one(pool)
        .await?;

        let ya_unido: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                 SELECT 1 FROM reserva_deportista
                 WHERE id_reserva = $1 AND id_persona = $2 AND estado = 'activo'
             )",
        )
        .bind(fila.id_reserva)
        .bind(id_persona)
        .fetch_one(pool)
        .await?;

        let cupo_lleno = ocupados >= max_participantes(fila.cupo);
        let es_cliente_responsable = fila.persona_cliente == id_persona;
        let codigo_valido = fila.qr_estado == "activo"
            && !esta_expirado(fila.expira_en, Utc::now())
            && fila.reserva_estado != "cancelada";

        Ok(UnirseInfo {
            id_reserva: fila.id_reserva,
            fecha: fila.fecha,
            cupo: fila.cupo,
            ocupados,
            puede_unirse: codigo_valido && !ya_unido && !cupo_lleno && !es_cliente_responsable,
            ya_unido,
            cupo_lleno,
            es_cliente_responsable,
        })
    }

    /// Alta por personal del espacio: mismas invariantes que la unión por
    /// código pero sin resolver QR, directo sobre reserva + persona.
    pub async fn agregar_por_staff(
        pool: &PgPool,
        id_reserva: Uuid,
        id_persona: Uuid,
    ) -> Result<ReservaOcupacion, ApiError> {
        let mut tx = pool.begin().await?;

        let fila: Option<(String, i32, Uuid)> = sqlx::query_as(
            "SELECT r.estado, r.cupo, c.id_persona
             FROM reserva r
             JOIN cliente c ON c.id = r.id_cliente
             WHERE r.id = $1
             FOR UPDATE OF r",
        )
        .bind(id_reserva)
        .fetch_optional(&mut *tx)
        .await?;

        let (estado, cupo, persona_cliente) =
            fila.ok_or_else(|| ApiError::NoEncontrado("Reserva no encontrada".into()))?;

        if estado == "cancelada" {
            return Err(ApiError::ReservaCancelada);
        }
        if persona_cliente == id_persona {
            return Err(ApiError::AutoUnionProhibida);
        }

        let ya_activo: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM reserva_deportista
             WHERE id_reserva = $1 AND id_persona = $2 AND estado = 'activo'",
        )
        .bind(id_reserva)
        .bind(id_persona)
        .fetch_optional(&mut *tx)
        .await?;
        if ya_activo.is_some() {
            return Err(ApiError::YaUnido);
        }

        let activos = Self::contar_activos(&mut tx, id_reserva).await?;
        let maximo = max_participantes(cupo);
        if activos >= maximo {
            return Err(ApiError::CupoLleno);
        }

        Self::admitir(&mut tx, id_reserva, id_persona).await?;
        tx.commit().await?;

        Ok(ReservaOcupacion {
            id_reserva,
            cupo,
            ocupados: activos + 1,
            disponibles: maximo - activos - 1,
        })
    }

    /// Baja de un participante por su id de rol deportista: desactiva el
    /// vínculo autoritativo y borra la fila espejo.
    pub async fn remover(
        pool: &PgPool,
        id_reserva: Uuid,
        id_deportista: Uuid,
    ) -> Result<(), ApiError> {
        let id_persona: Uuid = sqlx::query_scalar(
            "SELECT id_persona FROM deportista WHERE id = $1",
        )
        .bind(id_deportista)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NoEncontrado("Deportista no encontrado".into()))?;

        let mut tx = pool.begin().await?;

        let desactivado: Option<Uuid> = sqlx::query_scalar(
            "UPDATE reserva_deportista SET estado = 'inactivo'
             WHERE id_reserva = $1 AND id_persona = $2 AND estado = 'activo'
             RETURNING id",
        )
        .bind(id_reserva)
        .bind(id_persona)
        .fetch_optional(&mut *tx)
        .await?;

        if desactivado.is_none() {
            return Err(ApiError::NoEncontrado(
                "El deportista no participa en esta reserva".into(),
            ));
        }

        sqlx::query(
            "DELETE FROM participa_en WHERE id_deportista = $1 AND id_reserva = $2",
        )
        .bind(id_deportista)
        .bind(id_reserva)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Roster activo paginado más el resumen de ocupación.
    pub async fn listar_deportistas(
        pool: &PgPool,
        id_reserva: Uuid,
        pagina: i64,
        limite: i64,
    ) -> Result<(Vec<DeportistaEnReserva>, ReservaOcupacion), ApiError> {
        let cupo: i32 = sqlx::query_scalar("SELECT cupo FROM reserva WHERE id = $1")
            .bind(id_reserva)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::NoEncontrado("Reserva no encontrada".into()))?;

        let pagina = pagina.max(1);
        let limite = limite.clamp(1, 100);

        let filas = sqlx::query_as::<_, DeportistaEnReserva>(
            "SELECT rd.id_persona, p.nombre, p.apellido, rd.unido_en
             FROM reserva_deportista rd
             JOIN persona p ON p.id = rd.id_persona
             WHERE rd.id_reserva = $1 AND rd.estado = 'activo'
             ORDER BY rd.unido_en
             LIMIT $2 OFFSET $3",
        )
        .bind(id_reserva)
        .bind(limite)
        .bind((pagina - 1) * limite)
        .fetch_all(pool)
        .await?;

        let ocupados: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reserva_deportista
             WHERE id_reserva = $1 AND estado = 'activo'",
        )
        .bind(id_reserva)
        .fetch_one(pool)
        .await?;

        let maximo = max_participantes(cupo);
        Ok((
            filas,
            ReservaOcupacion {
                id_reserva,
                cupo,
                ocupados,
                disponibles: (maximo - ocupados).max(0),
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_participantes() {
        // El cliente responsable ocupa una plaza implícita
        assert_eq!(max_participantes(3), 2);
        assert_eq!(max_participantes(2), 1);
        // Con cupo 1 (o degenerado) no entra nadie más
        assert_eq!(max_participantes(1), 0);
        assert_eq!(max_participantes(0), 0);
    }
}
