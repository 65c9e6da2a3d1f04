//! Mutex-guarded in-memory repositories. The agenda store performs its
//! uniqueness check and insert under one lock so concurrent bookings of the
//! same slot resolve to exactly one winner.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::domain::{
    AjusteAsignado, AjusteAsignadoId, Asignatura, AsignaturaId, DecisionDocenteAjuste, Entrevista,
    EntrevistaId, HorarioBloqueado, PerfilId, Solicitud, SolicitudId,
};
use super::repository::{
    AgendaRepository, AjusteRepository, AsignaturaRepository, RepositoryError, SolicitudRepository,
};

#[derive(Default, Clone)]
pub struct MemorySolicitudes {
    records: Arc<Mutex<HashMap<SolicitudId, Solicitud>>>,
}

impl SolicitudRepository for MemorySolicitudes {
    fn insert(&self, solicitud: Solicitud) -> Result<Solicitud, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&solicitud.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(solicitud.id, solicitud.clone());
        Ok(solicitud)
    }

    fn update(&self, solicitud: Solicitud) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&solicitud.id) {
            guard.insert(solicitud.id, solicitud);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: SolicitudId) -> Result<Option<Solicitud>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Solicitud>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut todas: Vec<Solicitud> = guard.values().cloned().collect();
        todas.sort_by_key(|s| s.id);
        Ok(todas)
    }
}

#[derive(Default)]
struct AgendaState {
    entrevistas: HashMap<EntrevistaId, Entrevista>,
    bloqueos: Vec<HorarioBloqueado>,
}

impl AgendaState {
    fn slot_ocupado(&self, coordinadora: PerfilId, fecha: chrono::DateTime<chrono::Utc>) -> bool {
        let entrevista_viva = self
            .entrevistas
            .values()
            .any(|e| e.coordinadora == coordinadora && e.fecha == fecha && e.estado.ocupa_slot());
        let bloqueado = self
            .bloqueos
            .iter()
            .any(|b| b.coordinadora == coordinadora && b.fecha == fecha);
        entrevista_viva || bloqueado
    }
}

#[derive(Default, Clone)]
pub struct MemoryAgenda {
    state: Arc<Mutex<AgendaState>>,
}

impl AgendaRepository for MemoryAgenda {
    fn insert_entrevista(&self, entrevista: Entrevista) -> Result<Entrevista, RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        if guard.entrevistas.contains_key(&entrevista.id)
            || guard.slot_ocupado(entrevista.coordinadora, entrevista.fecha)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.entrevistas.insert(entrevista.id, entrevista.clone());
        Ok(entrevista)
    }

    fn update_entrevista(&self, entrevista: Entrevista) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        if guard.entrevistas.contains_key(&entrevista.id) {
            guard.entrevistas.insert(entrevista.id, entrevista);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch_entrevista(&self, id: EntrevistaId) -> Result<Option<Entrevista>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard.entrevistas.get(&id).cloned())
    }

    fn entrevistas_de_solicitud(
        &self,
        solicitud: SolicitudId,
    ) -> Result<Vec<Entrevista>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        let mut encontradas: Vec<Entrevista> = guard
            .entrevistas
            .values()
            .filter(|e| e.solicitud_id == solicitud)
            .cloned()
            .collect();
        encontradas.sort_by_key(|e| e.id);
        Ok(encontradas)
    }

    fn entrevistas_de_coordinadora(
        &self,
        coordinadora: PerfilId,
    ) -> Result<Vec<Entrevista>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        let mut encontradas: Vec<Entrevista> = guard
            .entrevistas
            .values()
            .filter(|e| e.coordinadora == coordinadora)
            .cloned()
            .collect();
        encontradas.sort_by_key(|e| e.id);
        Ok(encontradas)
    }

    fn insert_bloqueo(&self, bloqueo: HorarioBloqueado) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        if guard.slot_ocupado(bloqueo.coordinadora, bloqueo.fecha) {
            return Err(RepositoryError::Conflict);
        }
        guard.bloqueos.push(bloqueo);
        Ok(())
    }

    fn bloqueos_de_coordinadora(
        &self,
        coordinadora: PerfilId,
    ) -> Result<Vec<HorarioBloqueado>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard
            .bloqueos
            .iter()
            .filter(|b| b.coordinadora == coordinadora)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct AjusteState {
    ajustes: HashMap<AjusteAsignadoId, AjusteAsignado>,
    decisiones: HashMap<(AjusteAsignadoId, PerfilId), DecisionDocenteAjuste>,
}

#[derive(Default, Clone)]
pub struct MemoryAjustes {
    state: Arc<Mutex<AjusteState>>,
}

impl AjusteRepository for MemoryAjustes {
    fn insert(&self, ajuste: AjusteAsignado) -> Result<AjusteAsignado, RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        if guard.ajustes.contains_key(&ajuste.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.ajustes.insert(ajuste.id, ajuste.clone());
        Ok(ajuste)
    }

    fn update(&self, ajuste: AjusteAsignado) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        if guard.ajustes.contains_key(&ajuste.id) {
            guard.ajustes.insert(ajuste.id, ajuste);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: AjusteAsignadoId) -> Result<Option<AjusteAsignado>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard.ajustes.get(&id).cloned())
    }

    fn ajustes_de_solicitud(
        &self,
        solicitud: SolicitudId,
    ) -> Result<Vec<AjusteAsignado>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        let mut encontrados: Vec<AjusteAsignado> = guard
            .ajustes
            .values()
            .filter(|a| a.solicitud_id == solicitud)
            .cloned()
            .collect();
        encontrados.sort_by_key(|a| a.id);
        Ok(encontrados)
    }

    fn upsert_decision(&self, decision: DecisionDocenteAjuste) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        if !guard.ajustes.contains_key(&decision.ajuste_asignado_id) {
            return Err(RepositoryError::NotFound);
        }
        guard
            .decisiones
            .insert((decision.ajuste_asignado_id, decision.docente), decision);
        Ok(())
    }

    fn decisiones_de_ajuste(
        &self,
        ajuste: AjusteAsignadoId,
    ) -> Result<Vec<DecisionDocenteAjuste>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        let mut encontradas: Vec<DecisionDocenteAjuste> = guard
            .decisiones
            .values()
            .filter(|d| d.ajuste_asignado_id == ajuste)
            .cloned()
            .collect();
        encontradas.sort_by_key(|d| d.docente);
        Ok(encontradas)
    }
}

#[derive(Default, Clone)]
pub struct MemoryAsignaturas {
    records: Arc<Mutex<HashMap<AsignaturaId, Asignatura>>>,
}

impl AsignaturaRepository for MemoryAsignaturas {
    fn insert(&self, asignatura: Asignatura) -> Result<Asignatura, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&asignatura.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(asignatura.id, asignatura.clone());
        Ok(asignatura)
    }

    fn fetch(&self, id: AsignaturaId) -> Result<Option<Asignatura>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn muchas(&self, ids: &[AsignaturaId]) -> Result<Vec<Asignatura>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(ids.iter().filter_map(|id| guard.get(id).cloned()).collect())
    }
}
