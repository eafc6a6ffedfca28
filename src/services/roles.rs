use uuid::Uuid;

use crate::errors::ApiError;

/// Roles asignables a una persona. Cada variante conoce su propia tabla y
/// atributos; la asignación pasa por una sola operación polimórfica en vez
/// de SQL ad hoc por rol.
#[derive(Debug, Clone, PartialEq)]
pub enum Rol {
    Cliente,
    Deportista,
    Control { id_espacio: Option<Uuid> },
    AdminEspacio { id_espacio: Uuid },
}

impl Rol {
    pub fn nombre(&self) -> &'static str {
        match self {
            Rol::Cliente => "cliente",
            Rol::Deportista => "deportista",
            Rol::Control { .. } => "control",
            Rol::AdminEspacio { .. } => "admin_espacio",
        }
    }

    /// Construye el rol desde el nombre persistido en `solicitud_rol`.
    pub fn desde_nombre(nombre: &str, id_espacio: Option<Uuid>) -> Result<Self, ApiError> {
        match nombre {
            "cliente" => Ok(Rol::Cliente),
            "deportista" => Ok(Rol::Deportista),
            "control" => Ok(Rol::Control { id_espacio }),
            "admin_espacio" => {
                let id_espacio = id_espacio.ok_or_else(|| {
                    ApiError::Validacion("admin_espacio requiere un espacio".into())
                })?;
                Ok(Rol::AdminEspacio { id_espacio })
            }
            otro => Err(ApiError::Validacion(format!("Rol inválido: {otro}"))),
        }
    }
}

/// Asigna el rol a la persona. Idempotente: si ya lo tiene, no hace nada
/// (ON CONFLICT sobre la clave id_persona). Acepta cualquier ejecutor para
/// poder correr dentro de una transacción.
pub async fn asignar<'e, E>(ejecutor: E, id_persona: Uuid, rol: &Rol) -> Result<(), ApiError>
where
    E: sqlx::PgExecutor<'e>,
{
    match rol {
        Rol::Cliente => {
            sqlx::query(
                "INSERT INTO cliente (id_persona) VALUES ($1)
                 ON CONFLICT (id_persona) DO NOTHING",
            )
            .bind(id_persona)
            .execute(ejecutor)
            .await?;
        }
        Rol::Deportista => {
            sqlx::query(
                "INSERT INTO deportista (id_persona) VALUES ($1)
                 ON CONFLICT (id_persona) DO NOTHING",
            )
            .bind(id_persona)
            .execute(ejecutor)
            .await?;
        }
        Rol::Control { id_espacio } => {
            sqlx::query(
                "INSERT INTO control (id_persona, id_espacio) VALUES ($1, $2)
                 ON CONFLICT (id_persona) DO NOTHING",
            )
            .bind(id_persona)
            .bind(id_espacio)
            .execute(ejecutor)
            .await?;
        }
        Rol::AdminEspacio { id_espacio } => {
            sqlx::query(
                "INSERT INTO admin_espacio (id_persona, id_espacio) VALUES ($1, $2)
                 ON CONFLICT (id_persona) DO NOTHING",
            )
            .bind(id_persona)
            .bind(id_espacio)
            .execute(ejecutor)
            .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desde_nombre() {
        assert_eq!(Rol::desde_nombre("deportista", None).unwrap(), Rol::Deportista);
        assert_eq!(Rol::desde_nombre("cliente", None).unwrap(), Rol::Cliente);
        assert!(Rol::desde_nombre("superadmin", None).is_err());
        // admin_espacio sin espacio es inválido
        assert!(Rol::desde_nombre("admin_espacio", None).is_err());
        let espacio = Uuid::new_v4();
        assert_eq!(
            Rol::desde_nombre("admin_espacio", Some(espacio)).unwrap(),
            Rol::AdminEspacio { id_espacio: espacio }
        );
    }

    #[test]
    fn test_nombre_redondo() {
        for nombre in ["cliente", "deportista", "control"] {
            assert_eq!(Rol::desde_nombre(nombre, None).unwrap().nombre(), nombre);
        }
    }
}
