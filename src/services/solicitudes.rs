use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::solicitud::{CreateSolicitudRequest, SolicitudRol};
use crate::services::email::EmailService;
use crate::services::roles::{self, Rol};

pub struct SolicitudService;

impl SolicitudService {
    pub async fn crear(
        pool: &PgPool,
        req: &CreateSolicitudRequest,
    ) -> Result<SolicitudRol, ApiError> {
        // Valida el rol antes de persistir
        Rol::desde_nombre(&req.rol_solicitado, req.id_espacio)?;

        let solicitud = sqlx::query_as::<_, SolicitudRol>(
            "INSERT INTO solicitud_rol (id_persona, rol_solicitado, id_espacio)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(req.id_persona)
        .bind(&req.rol_solicitado)
        .bind(req.id_espacio)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_foreign_key_violation() {
                    return ApiError::Validacion("Persona inexistente".into());
                }
            }
            ApiError::Db(e)
        })?;
        Ok(solicitud)
    }

    pub async fn listar(pool: &PgPool) -> Result<Vec<SolicitudRol>, ApiError> {
        let solicitudes = sqlx::query_as::<_, SolicitudRol>(
            "SELECT * FROM solicitud_rol ORDER BY creado_en DESC",
        )
        .fetch_all(pool)
        .await?;
        Ok(solicitudes)
    }

    /// Aprobación bajo transacción con bloqueo de la fila de la solicitud:
    /// una segunda aprobación concurrente espera el lock y recibe Conflicto.
    pub async fn aprobar(
        pool: &PgPool,
        id: Uuid,
        email: Option<Arc<EmailService>>,
    ) -> Result<SolicitudRol, ApiError> {
        let mut tx = pool.begin().await?;

        let solicitud = sqlx::query_as::<_, SolicitudRol>(
            "SELECT * FROM solicitud_rol WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NoEncontrado("Solicitud no encontrada".into()))?;

        if solicitud.estado != "pendiente" {
            return Err(ApiError::Conflicto("La solicitud ya fue resuelta".into()));
        }

        let rol = Rol::desde_nombre(&solicitud.rol_solicitado, solicitud.id_espacio)?;
        roles::asignar(&mut *tx, solicitud.id_persona, &rol).await?;

        let resuelta = sqlx::query_as::<_, SolicitudRol>(
            "UPDATE solicitud_rol SET estado = 'aprobada', resuelto_en = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        notificar_resolucion(pool.clone(), email, &resuelta, true);
        Ok(resuelta)
    }

    pub async fn rechazar(
        pool: &PgPool,
        id: Uuid,
        email: Option<Arc<EmailService>>,
    ) -> Result<SolicitudRol, ApiError> {
        let mut tx = pool.begin().await?;

        let solicitud = sqlx::query_as::<_, SolicitudRol>(
            "SELECT * FROM solicitud_rol WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NoEncontrado("Solicitud no encontrada".into()))?;

        if solicitud.estado != "pendiente" {
            return Err(ApiError::Conflicto("La solicitud ya fue resuelta".into()));
        }

        let resuelta = sqlx::query_as::<_, SolicitudRol>(
            "UPDATE solicitud_rol SET estado = 'rechazada', resuelto_en = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        notificar_resolucion(pool.clone(), email, &resuelta, false);
        Ok(resuelta)
    }
}

/// Notificación por correo, fire-and-forget: nunca bloquea la respuesta ni
/// propaga errores, solo deja un warning en el log.
fn notificar_resolucion(
    pool: PgPool,
    email: Option<Arc<EmailService>>,
    solicitud: &SolicitudRol,
    aprobada: bool,
) {
    let Some(email) = email else { return };
    let id_persona = solicitud.id_persona;
    let rol = solicitud.rol_solicitado.clone();

    tokio::spawn(async move {
        let destinatario: Result<Option<(String, String)>, sqlx::Error> = sqlx::query_as(
            "SELECT correo, nombre FROM persona WHERE id = $1",
        )
        .bind(id_persona)
        .fetch_optional(&pool)
        .await;

        let (correo, nombre) = match destinatario {
            Ok(Some(fila)) => fila,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!("no se pudo resolver el destinatario de la notificación: {e}");
                return;
            }
        };

        if let Err(e) = email
            .enviar_solicitud_resuelta(&correo, &nombre, &rol, aprobada)
            .await
        {
            tracing::warn!("falló el envío de correo a {correo}: {e}");
        }
    });
}
