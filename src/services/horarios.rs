use chrono::{Duration, NaiveDate, NaiveTime};

use crate::errors::ApiError;

/// Bloque horario calculado, aún sin persistir.
#[derive(Debug, Clone, PartialEq)]
pub struct Bloque {
    pub fecha: NaiveDate,
    pub hora_inicio: NaiveTime,
    pub hora_fin: NaiveTime,
    pub monto: f64,
}

/// Parsea "HH:MM" (acepta también "HH:MM:SS").
pub fn parsear_hora(valor: &str) -> Result<NaiveTime, ApiError> {
    NaiveTime::parse_from_str(valor, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(valor, "%H:%M:%S"))
        .map_err(|_| ApiError::Validacion(format!("Hora inválida: {valor}")))
}

/// Divide [hora_inicio, hora_fin) en bloques de una hora. El último bloque
/// puede ser más corto si el rango no está alineado a la hora, pero el monto
/// por bloque es siempre `monto_total / cantidad_de_pasos` — división
/// uniforme por pasos, no ponderada por duración.
pub fn generar_bloques(
    fecha: NaiveDate,
    hora_inicio: NaiveTime,
    hora_fin: NaiveTime,
    monto_total: f64,
) -> Result<Vec<Bloque>, ApiError> {
    if hora_fin <= hora_inicio {
        return Err(ApiError::Validacion(
            "La hora de fin debe ser posterior a la de inicio".into(),
        ));
    }

    let duracion_min = (hora_fin - hora_inicio).num_minutes();
    let pasos = (duracion_min + 59) / 60;
    let monto_por_bloque = monto_total / pasos as f64;

    let mut bloques = Vec::with_capacity(pasos as usize);
    let mut inicio = hora_inicio;
    for _ in 0..pasos {
        let fin_paso = inicio + Duration::hours(1);
        let fin = if fin_paso > hora_fin || fin_paso < inicio {
            // fin_paso < inicio: la suma dio la vuelta a medianoche
            hora_fin
        } else {
            fin_paso
        };
        bloques.push(Bloque {
            fecha,
            hora_inicio: inicio,
            hora_fin: fin,
            monto: monto_por_bloque,
        });
        inicio = fin;
    }

    Ok(bloques)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hora(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn fecha() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn test_tres_horas_exactas() {
        let bloques = generar_bloques(fecha(), hora(9, 0), hora(12, 0), 90.0).unwrap();
        assert_eq!(bloques.len(), 3);
        for (i, b) in bloques.iter().enumerate() {
            assert_eq!(b.hora_inicio, hora(9 + i as u32, 0));
            assert_eq!(b.hora_fin, hora(10 + i as u32, 0));
            assert!((b.monto - 30.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_rango_invalido() {
        assert!(generar_bloques(fecha(), hora(12, 0), hora(12, 0), 50.0).is_err());
        assert!(generar_bloques(fecha(), hora(14, 0), hora(12, 0), 50.0).is_err());
    }

    #[test]
    fn test_ultimo_bloque_corto() {
        // 10:00–11:30 → dos pasos, el segundo de media hora, monto uniforme
        let bloques = generar_bloques(fecha(), hora(10, 0), hora(11, 30), 60.0).unwrap();
        assert_eq!(bloques.len(), 2);
        assert_eq!(bloques[1].hora_inicio, hora(11, 0));
        assert_eq!(bloques[1].hora_fin, hora(11, 30));
        // División por pasos, no por duración: 30 y 30, no 40 y 20
        assert!((bloques[0].monto - 30.0).abs() < 1e-9);
        assert!((bloques[1].monto - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_bloques_contiguos_y_suma() {
        let bloques = generar_bloques(fecha(), hora(8, 15), hora(13, 45), 110.0).unwrap();
        // Cubren exactamente el rango, sin huecos ni solapes
        assert_eq!(bloques.first().unwrap().hora_inicio, hora(8, 15));
        assert_eq!(bloques.last().unwrap().hora_fin, hora(13, 45));
        for par in bloques.windows(2) {
            assert_eq!(par[0].hora_fin, par[1].hora_inicio);
        }
        let suma: f64 = bloques.iter().map(|b| b.monto).sum();
        assert!((suma - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_menos_de_una_hora() {
        let bloques = generar_bloques(fecha(), hora(18, 0), hora(18, 30), 25.0).unwrap();
        assert_eq!(bloques.len(), 1);
        assert_eq!(bloques[0].hora_fin, hora(18, 30));
        assert!((bloques[0].monto - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_parsear_hora() {
        assert_eq!(parsear_hora("09:30").unwrap(), hora(9, 30));
        assert_eq!(parsear_hora("09:30:00").unwrap(), hora(9, 30));
        assert!(parsear_hora("25:00").is_err());
        assert!(parsear_hora("hola").is_err());
    }
}
