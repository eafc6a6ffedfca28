use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::qr::{QrPayload, QrReserva};

pub struct QrService;

/// Genera el código opaco: base64 de `{rid, ts, nonce, v}` con nonce
/// aleatorio de 8 bytes en hex. Sin firma; ver modelo en `models::qr`.
pub fn generar_codigo(id_reserva: Uuid) -> String {
    let mut nonce = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut nonce);

    let payload = QrPayload {
        rid: id_reserva,
        ts: Utc::now().timestamp_millis(),
        nonce: hex::encode(nonce),
        v: 1,
    };
    // La serialización de un struct plano no puede fallar
    let json = serde_json::to_vec(&payload).expect("payload QR serializable");
    BASE64.encode(json)
}

pub fn decodificar_codigo(codigo: &str) -> Option<QrPayload> {
    let bytes = BASE64.decode(codigo).ok()?;
    serde_json::from_slice(&bytes).ok()
}

pub fn esta_expirado(expira_en: Option<DateTime<Utc>>, ahora: DateTime<Utc>) -> bool {
    matches!(expira_en, Some(limite) if ahora >= limite)
}

impl QrService {
    pub async fn por_reserva(
        pool: &PgPool,
        id_reserva: Uuid,
    ) -> Result<Option<QrReserva>, ApiError> {
        let qr = sqlx::query_as::<_, QrReserva>(
            "SELECT * FROM qr_reserva WHERE id_reserva = $1",
        )
        .bind(id_reserva)
        .fetch_optional(pool)
        .await?;
        Ok(qr)
    }

    /// Crea el único registro QR de una reserva recién creada.
    /// Falla con Conflicto si la reserva ya tiene uno.
    pub async fn emitir(
        pool: &PgPool,
        id_reserva: Uuid,
        vigencia_horas: i64,
    ) -> Result<QrReserva, ApiError> {
        if Self::por_reserva(pool, id_reserva).await?.is_some() {
            return Err(ApiError::Conflicto(
                "La reserva ya tiene un código QR".into(),
            ));
        }

        let qr = sqlx::query_as::<_, QrReserva>(
            "INSERT INTO qr_reserva (id_reserva, codigo, generado_en, expira_en, estado, verificado)
             VALUES ($1, $2, NOW(), $3, 'activo', FALSE)
             RETURNING *",
        )
        .bind(id_reserva)
        .bind(generar_codigo(id_reserva))
        .bind(Utc::now() + Duration::hours(vigencia_horas))
        .fetch_one(pool)
        .await?;
        Ok(qr)
    }

    /// Regenera el QR de una reserva reutilizando siempre la misma fila.
    /// Con `forzar_nuevo = false` conserva el código y solo refresca
    /// timestamps y estado; con `true` emite un código distinto.
    pub async fn regenerar(
        pool: &PgPool,
        id_reserva: Uuid,
        forzar_nuevo: bool,
        vigencia_horas: i64,
    ) -> Result<QrReserva, ApiError> {
        let existe: Option<Uuid> = sqlx::query_scalar("SELECT id FROM reserva WHERE id = $1")
            .bind(id_reserva)
            .fetch_optional(pool)
            .await?;
        if existe.is_none() {
            return Err(ApiError::NoEncontrado("Reserva no encontrada".into()));
        }

        let expira_en = Utc::now() + Duration::hours(vigencia_horas);

        let qr = match Self::por_reserva(pool, id_reserva).await? {
            None => {
                sqlx::query_as::<_, QrReserva>(
                    "INSERT INTO qr_reserva (id_reserva, codigo, generado_en, expira_en, estado, verificado)
                     VALUES ($1, $2, NOW(), $3, 'activo', FALSE)
                     RETURNING *",
                )
                .bind(id_reserva)
                .bind(generar_codigo(id_reserva))
                .bind(expira_en)
                .fetch_one(pool)
                .await?
            }
            Some(actual) => {
                let codigo = if forzar_nuevo {
                    generar_codigo(id_reserva)
                } else {
                    actual.codigo
                };
                sqlx::query_as::<_, QrReserva>(
                    "UPDATE qr_reserva
                     SET codigo = $2, generado_en = NOW(), expira_en = $3,
                         estado = 'activo', verificado = FALSE
                     WHERE id_reserva = $1
                     RETURNING *",
                )
                .bind(id_reserva)
                .bind(codigo)
                .bind(expira_en)
                .fetch_one(pool)
                .await?
            }
        };

        tracing::info!("QR regenerado para reserva {id_reserva} (forzar_nuevo={forzar_nuevo})");
        Ok(qr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codigo_decodificable() {
        let rid = Uuid::new_v4();
        let antes = Utc::now().timestamp_millis();
        let codigo = generar_codigo(rid);
        let payload = decodificar_codigo(&codigo).unwrap();

        assert_eq!(payload.rid, rid);
        assert_eq!(payload.v, 1);
        assert_eq!(payload.nonce.len(), 16); // 8 bytes en hex
        assert!(payload.nonce.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(payload.ts >= antes);
    }

    #[test]
    fn test_codigos_distintos_por_nonce() {
        let rid = Uuid::new_v4();
        assert_ne!(generar_codigo(rid), generar_codigo(rid));
    }

    #[test]
    fn test_decodificar_basura() {
        assert!(decodificar_codigo("no-es-base64!!").is_none());
        assert!(decodificar_codigo(&BASE64.encode(b"{\"rid\": 42}")).is_none());
    }

    #[test]
    fn test_expiracion() {
        let ahora = Utc::now();
        assert!(!esta_expirado(None, ahora));
        assert!(!esta_expirado(Some(ahora + Duration::hours(1)), ahora));
        assert!(esta_expirado(Some(ahora - Duration::seconds(1)), ahora));
        assert!(esta_expirado(Some(ahora), ahora));
    }
}
