//! Per-adjustment approval policies.
//!
//! The director approves or rejects each [`AjusteAsignado`] individually; the
//! aggregation policy decides when the set as a whole clears the final gate.
//! Teacher decisions are advisory by default and only become blocking under
//! [`PoliticaVetoDocente::Bloquear`].

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    AjusteAsignado, AjusteAsignadoId, Asignatura, DecisionDocente, DecisionDocenteAjuste,
    EstadoAprobacion, PerfilId,
};

/// When the adjustment set counts as ready for final approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoliticaAprobacion {
    /// Every adjustment must be explicitly approved.
    TodosAprobados,
    /// No adjustment may be rejected; pending ones do not block.
    SinRechazos,
}

impl PoliticaAprobacion {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "todos_aprobados" => Some(Self::TodosAprobados),
            "sin_rechazos" => Some(Self::SinRechazos),
            _ => None,
        }
    }
}

/// Weight of a teacher rejection on an adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoliticaVetoDocente {
    /// Surface the rejection in the read model, nothing more.
    Senalar,
    /// A teacher rejection makes the adjustment count as unapproved.
    Bloquear,
}

impl PoliticaVetoDocente {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "senalar" => Some(Self::Senalar),
            "bloquear" => Some(Self::Bloquear),
            _ => None,
        }
    }
}

/// Snapshot of one Solicitud's adjustment set against the recorded teacher
/// decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgregadoAjustes {
    pub total: usize,
    pub aprobados: usize,
    pub rechazados: usize,
    pub pendientes: usize,
    /// Adjustments with at least one teacher rejection on record.
    pub vetados: HashSet<AjusteAsignadoId>,
}

impl AgregadoAjustes {
    pub fn evaluar(ajustes: &[AjusteAsignado], decisiones: &[DecisionDocenteAjuste]) -> Self {
        let vetados = decisiones
            .iter()
            .filter(|d| d.decision == DecisionDocente::Rechazado)
            .map(|d| d.ajuste_asignado_id)
            .collect();

        let mut agregado = Self {
            total: ajustes.len(),
            aprobados: 0,
            rechazados: 0,
            pendientes: 0,
            vetados,
        };
        for ajuste in ajustes {
            match ajuste.estado_aprobacion {
                EstadoAprobacion::Aprobado => agregado.aprobados += 1,
                EstadoAprobacion::Rechazado => agregado.rechazados += 1,
                EstadoAprobacion::Pendiente => agregado.pendientes += 1,
            }
        }
        agregado
    }

    fn bloqueados_por_veto(&self, ajustes: &[AjusteAsignado]) -> usize {
        ajustes
            .iter()
            .filter(|a| {
                a.estado_aprobacion == EstadoAprobacion::Aprobado && self.vetados.contains(&a.id)
            })
            .count()
    }

    /// Whether the set clears the final approval gate under the configured
    /// policies. An empty set never clears it.
    pub fn listo(
        &self,
        ajustes: &[AjusteAsignado],
        aprobacion: PoliticaAprobacion,
        veto: PoliticaVetoDocente,
    ) -> bool {
        if self.total == 0 {
            return false;
        }
        let aprobados_efectivos = match veto {
            PoliticaVetoDocente::Senalar => self.aprobados,
            PoliticaVetoDocente::Bloquear => self.aprobados - self.bloqueados_por_veto(ajustes),
        };
        match aprobacion {
            PoliticaAprobacion::TodosAprobados => aprobados_efectivos == self.total,
            PoliticaAprobacion::SinRechazos => {
                self.rechazados == 0
                    && (veto == PoliticaVetoDocente::Senalar
                        || self.bloqueados_por_veto(ajustes) == 0)
            }
        }
    }

    /// Count of adjustments still keeping the gate closed under
    /// `TodosAprobados`; used for error detail.
    pub fn sin_resolver(&self) -> usize {
        self.total - self.aprobados
    }
}

/// Applies the director's verdict to a single adjustment, stamping the
/// approver and timestamp.
pub fn registrar_aprobacion(
    ajuste: &mut AjusteAsignado,
    director: PerfilId,
    estado: EstadoAprobacion,
    comentarios: String,
    ahora: DateTime<Utc>,
) {
    ajuste.estado_aprobacion = estado;
    ajuste.director_aprobador = Some(director);
    ajuste.fecha_aprobacion = Some(ahora);
    ajuste.comentarios = comentarios;
}

/// A teacher may only decide on adjustments of a Solicitud that touches a
/// subject-section they own.
pub fn docente_imparte(docente: PerfilId, asignaturas: &[Asignatura]) -> bool {
    asignaturas.iter().any(|a| a.docente == docente)
}
