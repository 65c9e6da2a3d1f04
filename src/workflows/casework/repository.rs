//! Storage seams for the casework domain.
//!
//! Production deployments back these with the institutional database; the
//! in-memory implementations in [`super::memory`] keep the same contracts,
//! including the uniqueness constraints the scheduler relies on.

use super::domain::{
    AjusteAsignado, AjusteAsignadoId, Asignatura, AsignaturaId, DecisionDocenteAjuste, Entrevista,
    EntrevistaId, HorarioBloqueado, PerfilId, Solicitud, SolicitudId,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

pub trait SolicitudRepository: Send + Sync {
    fn insert(&self, solicitud: Solicitud) -> Result<Solicitud, RepositoryError>;
    fn update(&self, solicitud: Solicitud) -> Result<(), RepositoryError>;
    fn fetch(&self, id: SolicitudId) -> Result<Option<Solicitud>, RepositoryError>;
    fn list(&self) -> Result<Vec<Solicitud>, RepositoryError>;
}

/// Interviews and blocked slots share one store: the (coordinadora, fecha)
/// exclusivity constraint spans both, and `insert_entrevista` must check it
/// atomically against the two.
pub trait AgendaRepository: Send + Sync {
    /// Fails with [`RepositoryError::Conflict`] when the slot is taken by a
    /// non-cancelled interview or a blocked timestamp. This is the
    /// authoritative guard; callers never pre-check.
    fn insert_entrevista(&self, entrevista: Entrevista) -> Result<Entrevista, RepositoryError>;
    fn update_entrevista(&self, entrevista: Entrevista) -> Result<(), RepositoryError>;
    fn fetch_entrevista(&self, id: EntrevistaId) -> Result<Option<Entrevista>, RepositoryError>;
    fn entrevistas_de_solicitud(
        &self,
        solicitud: SolicitudId,
    ) -> Result<Vec<Entrevista>, RepositoryError>;
    fn entrevistas_de_coordinadora(
        &self,
        coordinadora: PerfilId,
    ) -> Result<Vec<Entrevista>, RepositoryError>;
    /// Same exclusivity rule as `insert_entrevista`, from the other side.
    fn insert_bloqueo(&self, bloqueo: HorarioBloqueado) -> Result<(), RepositoryError>;
    fn bloqueos_de_coordinadora(
        &self,
        coordinadora: PerfilId,
    ) -> Result<Vec<HorarioBloqueado>, RepositoryError>;
}

pub trait AjusteRepository: Send + Sync {
    fn insert(&self, ajuste: AjusteAsignado) -> Result<AjusteAsignado, RepositoryError>;
    fn update(&self, ajuste: AjusteAsignado) -> Result<(), RepositoryError>;
    fn fetch(&self, id: AjusteAsignadoId) -> Result<Option<AjusteAsignado>, RepositoryError>;
    fn ajustes_de_solicitud(
        &self,
        solicitud: SolicitudId,
    ) -> Result<Vec<AjusteAsignado>, RepositoryError>;
    /// Unique per (ajuste, docente); a repeated decision overwrites.
    fn upsert_decision(&self, decision: DecisionDocenteAjuste) -> Result<(), RepositoryError>;
    fn decisiones_de_ajuste(
        &self,
        ajuste: AjusteAsignadoId,
    ) -> Result<Vec<DecisionDocenteAjuste>, RepositoryError>;
}

pub trait AsignaturaRepository: Send + Sync {
    fn insert(&self, asignatura: Asignatura) -> Result<Asignatura, RepositoryError>;
    fn fetch(&self, id: AsignaturaId) -> Result<Option<Asignatura>, RepositoryError>;
    fn muchas(&self, ids: &[AsignaturaId]) -> Result<Vec<Asignatura>, RepositoryError>;
}
