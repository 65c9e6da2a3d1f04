//! Month availability engine for interview scheduling.
//!
//! Produces, per coordinator and month, the candidate dates and their free
//! time slots after removing national holidays, blocked timestamps, and slots
//! already taken by live interviews. Weekends are never offered.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Working-hour grid offered for interviews. Loaded from configuration; the
/// default mirrors the office's morning and afternoon blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaConfig {
    horas: Vec<NaiveTime>,
}

impl AgendaConfig {
    pub fn new(mut horas: Vec<NaiveTime>) -> Self {
        horas.sort();
        horas.dedup();
        Self { horas }
    }

    pub fn horas(&self) -> &[NaiveTime] {
        &self.horas
    }

    pub fn contiene(&self, hora: NaiveTime) -> bool {
        self.horas.contains(&hora)
    }
}

impl Default for AgendaConfig {
    fn default() -> Self {
        let hhmm = [(9, 0), (10, 0), (11, 0), (15, 0), (16, 0)];
        Self::new(
            hhmm.iter()
                .filter_map(|&(h, m)| NaiveTime::from_hms_opt(h, m, 0))
                .collect(),
        )
    }
}

/// Calendar month in `YYYY-MM` form, as received on the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mes {
    pub anio: i32,
    pub mes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("mes inválido, se espera YYYY-MM")]
pub struct MesInvalido;

impl FromStr for Mes {
    type Err = MesInvalido;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (anio, mes) = s.trim().split_once('-').ok_or(MesInvalido)?;
        let anio: i32 = anio.parse().map_err(|_| MesInvalido)?;
        let mes: u32 = mes.parse().map_err(|_| MesInvalido)?;
        if !(1..=12).contains(&mes) {
            return Err(MesInvalido);
        }
        Ok(Self { anio, mes })
    }
}

impl Mes {
    fn dias(self) -> impl Iterator<Item = NaiveDate> {
        let Self { anio, mes } = self;
        (1..=31).filter_map(move |dia| NaiveDate::from_ymd_opt(anio, mes, dia))
    }
}

/// National holiday as reported by the provider, English name included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feriado {
    pub fecha: NaiveDate,
    pub nombre: String,
}

/// Source of national holidays. The production collaborator is an external
/// calendar API; tests plug in fixed tables.
pub trait HolidayProvider: Send + Sync {
    fn feriados(&self, anio: i32) -> Vec<Feriado>;
}

/// Fixed-date Chilean national holidays. Movable feasts are out of scope for
/// the scheduling window this serves.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeriadosChile;

impl HolidayProvider for FeriadosChile {
    fn feriados(&self, anio: i32) -> Vec<Feriado> {
        const FIJOS: [(u32, u32, &str); 10] = [
            (1, 1, "New Year's Day"),
            (5, 1, "Labour Day"),
            (5, 21, "Navy Day"),
            (7, 16, "Our Lady of Mount Carmel"),
            (8, 15, "Assumption of Mary"),
            (9, 18, "Independence Day"),
            (9, 19, "Army Day"),
            (11, 1, "All Saints' Day"),
            (12, 8, "Immaculate Conception"),
            (12, 25, "Christmas Day"),
        ];
        FIJOS
            .iter()
            .filter_map(|&(mes, dia, nombre)| {
                NaiveDate::from_ymd_opt(anio, mes, dia).map(|fecha| Feriado {
                    fecha,
                    nombre: nombre.to_string(),
                })
            })
            .collect()
    }
}

/// Translates the provider's English holiday names to the Spanish names shown
/// in the calendar. Unmapped names pass through unchanged.
pub fn traducir_feriado(nombre: &str) -> String {
    const TABLA: [(&str, &str); 10] = [
        ("New Year's Day", "Año Nuevo"),
        ("Labour Day", "Día del Trabajo"),
        ("Navy Day", "Día de las Glorias Navales"),
        ("Our Lady of Mount Carmel", "Virgen del Carmen"),
        ("Assumption of Mary", "Asunción de la Virgen"),
        ("Independence Day", "Fiestas Patrias"),
        ("Army Day", "Día de las Glorias del Ejército"),
        ("All Saints' Day", "Día de Todos los Santos"),
        ("Immaculate Conception", "Inmaculada Concepción"),
        ("Christmas Day", "Navidad"),
    ];
    TABLA
        .iter()
        .find(|(ingles, _)| *ingles == nombre)
        .map(|(_, espanol)| (*espanol).to_string())
        .unwrap_or_else(|| nombre.to_string())
}

/// Month view for one coordinator: free slots per bookable date plus the
/// holidays that removed whole days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisponibilidadMensual {
    pub dias: BTreeMap<NaiveDate, Vec<NaiveTime>>,
    pub feriados: Vec<Feriado>,
}

impl DisponibilidadMensual {
    /// Dates with at least one free slot, ascending. Restartable: each call
    /// iterates from the start of the month again.
    pub fn fechas_con_disponibilidad(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dias
            .iter()
            .filter(|(_, horas)| !horas.is_empty())
            .map(|(fecha, _)| *fecha)
    }
}

/// Computes the month view. `ocupados` carries every timestamp already taken
/// for this coordinator, live interviews and blocked slots alike.
pub fn disponibilidad_mensual(
    mes: Mes,
    config: &AgendaConfig,
    provider: &dyn HolidayProvider,
    ocupados: &[DateTime<Utc>],
) -> DisponibilidadMensual {
    let feriados: Vec<Feriado> = provider
        .feriados(mes.anio)
        .into_iter()
        .filter(|f| f.fecha.month() == mes.mes)
        .map(|f| Feriado {
            fecha: f.fecha,
            nombre: traducir_feriado(&f.nombre),
        })
        .collect();

    let mut dias = BTreeMap::new();
    for fecha in mes.dias() {
        if matches!(fecha.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }
        if feriados.iter().any(|f| f.fecha == fecha) {
            continue;
        }
        let horas: Vec<NaiveTime> = config
            .horas()
            .iter()
            .copied()
            .filter(|hora| {
                !ocupados
                    .iter()
                    .any(|t| t.naive_utc().date() == fecha && t.naive_utc().time() == *hora)
            })
            .collect();
        dias.insert(fecha, horas);
    }

    DisponibilidadMensual { dias, feriados }
}

/// Month view against an empty agenda with the national holiday calendar;
/// backs the CLI inspection command.
pub fn disponibilidad_demo(mes: Mes, config: &AgendaConfig) -> DisponibilidadMensual {
    disponibilidad_mensual(mes, config, &FeriadosChile, &[])
}
