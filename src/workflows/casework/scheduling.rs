//! Interview scheduling rules.
//!
//! Pure checks and note formatting; the (coordinadora, fecha) exclusivity
//! guard itself lives in the repository so racing writers serialize on the
//! storage constraint, not on a read-then-write check here.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};

use super::availability::{AgendaConfig, HolidayProvider};
use super::domain::{Entrevista, EstadoEntrevista, PerfilId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgendaError {
    #[error("el horario ya está ocupado para la coordinadora {}", coordinadora.0)]
    SlotConflict {
        coordinadora: PerfilId,
        fecha: DateTime<Utc>,
    },
    #[error("la hora {hora} está fuera del horario de atención")]
    FueraDeHorario { hora: NaiveTime },
    #[error("la fecha {fecha} cae en fin de semana o feriado")]
    DiaInhabil { fecha: NaiveDate },
    #[error("fecha y hora no forman un instante válido")]
    FechaInvalida,
    #[error("la entrevista en estado {} no admite esta operación", .0.label())]
    EstadoInvalido(EstadoEntrevista),
}

/// Outcome recorded when the coordinator closes an interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultadoEntrevista {
    Realizada,
    NoAsistio,
}

impl ResultadoEntrevista {
    pub const fn estado(self) -> EstadoEntrevista {
        match self {
            Self::Realizada => EstadoEntrevista::Realizada,
            Self::NoAsistio => EstadoEntrevista::NoAsistio,
        }
    }
}

/// Builds the interview timestamp. Rejects days the calendar never offers
/// (weekends and national holidays) and hours outside the working grid.
pub fn componer_fecha(
    dia: NaiveDate,
    hora: NaiveTime,
    config: &AgendaConfig,
    feriados: &dyn HolidayProvider,
) -> Result<DateTime<Utc>, AgendaError> {
    if matches!(dia.weekday(), Weekday::Sat | Weekday::Sun)
        || feriados.feriados(dia.year()).iter().any(|f| f.fecha == dia)
    {
        return Err(AgendaError::DiaInhabil { fecha: dia });
    }
    if !config.contiene(hora) {
        return Err(AgendaError::FueraDeHorario { hora });
    }
    match Utc.from_local_datetime(&dia.and_time(hora)) {
        chrono::LocalResult::Single(fecha) => Ok(fecha),
        _ => Err(AgendaError::FechaInvalida),
    }
}

/// Only pending interviews can be cancelled, confirmed, or rescheduled.
pub fn exigir_pendiente(entrevista: &Entrevista) -> Result<(), AgendaError> {
    if entrevista.estado == EstadoEntrevista::Pendiente {
        Ok(())
    } else {
        Err(AgendaError::EstadoInvalido(entrevista.estado))
    }
}

/// Appends an audit line to the free-form notes, keeping existing content.
pub fn anexar_nota(notas: &str, linea: &str) -> String {
    if notas.trim().is_empty() {
        linea.to_string()
    } else {
        format!("{notas}\n{linea}")
    }
}

pub fn nota_reagendamiento(anterior: DateTime<Utc>, nueva: DateTime<Utc>) -> String {
    format!(
        "Reagendada desde {} hacia {}.",
        anterior.format("%d-%m-%Y %H:%M"),
        nueva.format("%d-%m-%Y %H:%M")
    )
}

pub fn nota_confirmacion(resultado: ResultadoEntrevista, ahora: DateTime<Utc>) -> String {
    format!(
        "Registrada como {} el {}.",
        resultado.estado().label(),
        ahora.format("%d-%m-%Y %H:%M")
    )
}
