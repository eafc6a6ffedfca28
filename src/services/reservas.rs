use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::reserva::{
    BloqueCalendario, CalendarioQuery, CreateReservaRequest, Reserva, UpdateReservaRequest,
};
use crate::services::horarios::{self, Bloque};
use crate::services::qr::QrService;

const ESTADOS_VALIDOS: [&str; 4] = ["pendiente", "confirmada", "cancelada", "completada"];

pub struct ReservaService;

impl ReservaService {
    /// Crea la reserva con sus bloques horarios y emite su código QR.
    /// La validación corre completa antes de tocar la base.
    pub async fn crear(
        pool: &PgPool,
        req: &CreateReservaRequest,
        vigencia_qr_horas: i64,
    ) -> Result<(Reserva, String), ApiError> {
        if req.cupo < 1 {
            return Err(ApiError::Validacion("El cupo debe ser al menos 1".into()));
        }
        if req.monto_total < 0.0 {
            return Err(ApiError::Validacion("El monto no puede ser negativo".into()));
        }

        let hora_inicio = horarios::parsear_hora(req.hora_inicio.as_deref().unwrap_or("08:00"))?;
        let hora_fin = horarios::parsear_hora(req.hora_fin.as_deref().unwrap_or("09:00"))?;
        let bloques = horarios::generar_bloques(req.fecha, hora_inicio, hora_fin, req.monto_total)?;

        let reserva = sqlx::query_as::<_, Reserva>(
            "INSERT INTO reserva
                 (fecha, cupo, monto_total, saldo_pendiente, estado,
                  hora_inicio, hora_fin, id_cliente, id_cancha)
             VALUES ($1, $2, $3, $3, 'pendiente', $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(req.fecha)
        .bind(req.cupo)
        .bind(req.monto_total)
        .bind(hora_inicio)
        .bind(hora_fin)
        .bind(req.id_cliente)
        .bind(req.id_cancha)
        .fetch_one(pool)
        .await
        .map_err(fk_como_validacion)?;

        Self::insertar_bloques(pool, reserva.id, &bloques).await?;
        let qr = QrService::emitir(pool, reserva.id, vigencia_qr_horas).await?;

        tracing::info!("reserva {} creada con {} bloques", reserva.id, bloques.len());
        Ok((reserva, qr.codigo))
    }

    /// Lectura acotada al espacio que administra el solicitante: la cancha
    /// de la reserva debe pertenecer a ese espacio.
    pub async fn obtener(
        pool: &PgPool,
        id: Uuid,
        id_espacio: Uuid,
    ) -> Result<Reserva, ApiError> {
        sqlx::query_as::<_, Reserva>(
            "SELECT r.* FROM reserva r
             JOIN cancha ca ON ca.id = r.id_cancha
             WHERE r.id = $1 AND ca.id_espacio = $2",
        )
        .bind(id)
        .bind(id_espacio)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NoEncontrado("Reserva no encontrada".into()))
    }

    /// Actualización parcial. Horas nuevas regeneran todos los bloques
    /// (borrar y reinsertar); el QR se reemite siempre conservando el código.
    pub async fn actualizar(
        pool: &PgPool,
        id: Uuid,
        id_espacio: Uuid,
        req: &UpdateReservaRequest,
        vigencia_qr_horas: i64,
    ) -> Result<Reserva, ApiError> {
        if let Some(estado) = &req.estado {
            if !ESTADOS_VALIDOS.contains(&estado.as_str()) {
                return Err(ApiError::Validacion(format!("Estado inválido: {estado}")));
            }
        }
        if let Some(cupo) = req.cupo {
            if cupo < 1 {
                return Err(ApiError::Validacion("El cupo debe ser al menos 1".into()));
            }
        }

        let actual = Self::obtener(pool, id, id_espacio).await?;

        let hora_inicio = match &req.hora_inicio {
            Some(h) => horarios::parsear_hora(h)?,
            None => actual.hora_inicio,
        };
        let hora_fin = match &req.hora_fin {
            Some(h) => horarios::parsear_hora(h)?,
            None => actual.hora_fin,
        };
        let horas_nuevas = req.hora_inicio.is_some() || req.hora_fin.is_some();

        let fecha = req.fecha.unwrap_or(actual.fecha);
        let monto_total = req.monto_total.unwrap_or(actual.monto_total);

        // Validar el rango antes de escribir nada
        let bloques = if horas_nuevas {
            Some(horarios::generar_bloques(fecha, hora_inicio, hora_fin, monto_total)?)
        } else {
            None
        };

        let reserva = sqlx::query_as::<_, Reserva>(
            "UPDATE reserva
             SET fecha = COALESCE($2, fecha),
                 cupo = COALESCE($3, cupo),
                 monto_total = COALESCE($4, monto_total),
                 saldo_pendiente = COALESCE($5, saldo_pendiente),
                 estado = COALESCE($6, estado),
                 hora_inicio = $7,
                 hora_fin = $8,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(req.fecha)
        .bind(req.cupo)
        .bind(req.monto_total)
        .bind(req.saldo_pendiente)
        .bind(&req.estado)
        .bind(hora_inicio)
        .bind(hora_fin)
        .fetch_one(pool)
        .await?;

        if let Some(bloques) = bloques {
            sqlx::query("DELETE FROM reserva_horario WHERE id_reserva = $1")
                .bind(id)
                .execute(pool)
                .await?;
            Self::insertar_bloques(pool, id, &bloques).await?;
        }

        // Reemisión posterior a la actualización: conserva el código, refresca
        // vigencia. No se revierte la actualización si esto falla.
        QrService::regenerar(pool, id, false, vigencia_qr_horas).await?;

        Ok(reserva)
    }

    /// Borrado acotado al espacio. Las FK con ON DELETE CASCADE arrastran
    /// bloques, QR y filas del roster.
    pub async fn eliminar(pool: &PgPool, id: Uuid, id_espacio: Uuid) -> Result<(), ApiError> {
        Self::obtener(pool, id, id_espacio).await?;

        sqlx::query("DELETE FROM reserva WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        tracing::info!("reserva {id} eliminada con sus bloques, QR y roster");
        Ok(())
    }

    /// Bloques que intersecan la ventana [desde, hasta), con datos de
    /// reserva/cancha/cliente para el calendario, ordenados por inicio.
    pub async fn calendario(
        pool: &PgPool,
        q: &CalendarioQuery,
    ) -> Result<Vec<BloqueCalendario>, ApiError> {
        if q.hasta <= q.desde {
            return Err(ApiError::Validacion(
                "La ventana del calendario es inválida".into(),
            ));
        }

        let filas = sqlx::query_as::<_, BloqueCalendario>(
            "SELECT rh.id_reserva, rh.fecha, rh.hora_inicio, rh.hora_fin, rh.monto,
                    r.estado, ca.nombre AS cancha, e.nombre AS espacio,
                    p.nombre || ' ' || p.apellido AS cliente
             FROM reserva_horario rh
             JOIN reserva r ON r.id = rh.id_reserva
             JOIN cancha ca ON ca.id = r.id_cancha
             JOIN espacio e ON e.id = ca.id_espacio
             JOIN cliente c ON c.id = r.id_cliente
             JOIN persona p ON p.id = c.id_persona
             WHERE rh.fecha >= $1 AND rh.fecha < $2
               AND ($3::uuid IS NULL OR r.id_cancha = $3)
               AND ($4::uuid IS NULL OR ca.id_espacio = $4)
             ORDER BY rh.fecha, rh.hora_inicio",
        )
        .bind(q.desde)
        .bind(q.hasta)
        .bind(q.id_cancha)
        .bind(q.id_espacio)
        .fetch_all(pool)
        .await?;
        Ok(filas)
    }

    async fn insertar_bloques(
        pool: &PgPool,
        id_reserva: Uuid,
        bloques: &[Bloque],
    ) -> Result<(), ApiError> {
        for b in bloques {
            sqlx::query(
                "INSERT INTO reserva_horario (id_reserva, fecha, hora_inicio, hora_fin, monto)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(id_reserva)
            .bind(b.fecha)
            .bind(b.hora_inicio)
            .bind(b.hora_fin)
            .bind(b.monto)
            .execute(pool)
            .await?;
        }
        Ok(())
    }
}

/// Una violación de FK en el insert significa cliente o cancha inexistentes:
/// error del cliente, no del servidor.
fn fk_como_validacion(e: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_foreign_key_violation() {
            return ApiError::Validacion("Cliente o cancha inexistente".into());
        }
    }
    ApiError::Db(e)
}
