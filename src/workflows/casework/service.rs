//! Service composing the role gate, state machine, scheduler, and approval
//! policies over the storage seams. Every mutating operation takes the
//! [`Actor`] explicitly and performs its role check before touching storage.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::approvals::{
    docente_imparte, registrar_aprobacion, PoliticaAprobacion, PoliticaVetoDocente,
};
use super::availability::{
    disponibilidad_mensual, AgendaConfig, DisponibilidadMensual, HolidayProvider, Mes,
};
use super::domain::{
    Actor, AjusteAsignado, AjusteAsignadoId, DecisionDocente, DecisionDocenteAjuste, Entrevista,
    EntrevistaId, EstadoAprobacion, EstadoEntrevista, EstadoSolicitud, HorarioBloqueado, Modalidad,
    PerfilId, Rol, Solicitud, SolicitudId,
};
use super::gate::{self, Unauthorized};
use super::intake::{validar_solicitud, IntakeError, SolicitudEnviada};
use super::repository::{
    AgendaRepository, AjusteRepository, AsignaturaRepository, RepositoryError, SolicitudRepository,
};
use super::scheduling::{
    anexar_nota, componer_fecha, exigir_pendiente, nota_confirmacion, nota_reagendamiento,
    AgendaError, ResultadoEntrevista,
};
use super::state::{validar_avance, validar_rechazo, ContextoAvance, TransitionError};

/// Policy dials the service reads on every decision.
#[derive(Debug, Clone)]
pub struct CaseworkConfig {
    pub agenda: AgendaConfig,
    pub aprobacion: PoliticaAprobacion,
    pub veto: PoliticaVetoDocente,
}

impl Default for CaseworkConfig {
    fn default() -> Self {
        Self {
            agenda: AgendaConfig::default(),
            aprobacion: PoliticaAprobacion::TodosAprobados,
            veto: PoliticaVetoDocente::Senalar,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CaseworkError {
    #[error(transparent)]
    NoAutorizado(#[from] Unauthorized),
    #[error(transparent)]
    Transicion(#[from] TransitionError),
    #[error(transparent)]
    Agenda(#[from] AgendaError),
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Repositorio(#[from] RepositoryError),
}

static SOLICITUD_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static ENTREVISTA_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static AJUSTE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_solicitud_id() -> SolicitudId {
    SolicitudId(SOLICITUD_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

fn next_entrevista_id() -> EntrevistaId {
    EntrevistaId(ENTREVISTA_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

fn next_ajuste_id() -> AjusteAsignadoId {
    AjusteAsignadoId(AJUSTE_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgendarEntrevista {
    pub solicitud_id: SolicitudId,
    pub fecha_agendar: NaiveDate,
    pub hora_agendar: NaiveTime,
    pub modalidad: Modalidad,
    #[serde(default)]
    pub notas: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Reagendar {
    pub fecha_agendar: NaiveDate,
    pub hora_agendar: NaiveTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Confirmacion {
    pub resultado: ResultadoEntrevista,
    #[serde(default)]
    pub notas_adicionales: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Avance {
    #[serde(default)]
    pub siguiente_responsable: Option<PerfilId>,
    #[serde(default)]
    pub nota: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rechazo {
    #[serde(default)]
    pub motivo: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrarAjuste {
    pub solicitud_id: SolicitudId,
    pub descripcion: String,
    pub categoria: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AprobacionAjuste {
    pub aprobado: bool,
    #[serde(default)]
    pub comentarios: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionSobreAjuste {
    pub decision: DecisionDocente,
    #[serde(default)]
    pub comentario: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BloquearHorario {
    pub fecha: NaiveDate,
    pub hora: NaiveTime,
    #[serde(default)]
    pub motivo: String,
}

/// Full read model of one Solicitud for the detail endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct DetalleSolicitud {
    pub solicitud: Solicitud,
    pub entrevistas: Vec<Entrevista>,
    pub ajustes: Vec<AjusteConDecisiones>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AjusteConDecisiones {
    #[serde(flatten)]
    pub ajuste: AjusteAsignado,
    pub decisiones_docentes: Vec<DecisionDocenteAjuste>,
}

pub struct CaseworkService<S, G, J, C> {
    solicitudes: Arc<S>,
    agenda: Arc<G>,
    ajustes: Arc<J>,
    asignaturas: Arc<C>,
    feriados: Arc<dyn HolidayProvider>,
    config: CaseworkConfig,
}

impl<S, G, J, C> CaseworkService<S, G, J, C>
where
    S: SolicitudRepository + 'static,
    G: AgendaRepository + 'static,
    J: AjusteRepository + 'static,
    C: AsignaturaRepository + 'static,
{
    pub fn new(
        solicitudes: Arc<S>,
        agenda: Arc<G>,
        ajustes: Arc<J>,
        asignaturas: Arc<C>,
        feriados: Arc<dyn HolidayProvider>,
        config: CaseworkConfig,
    ) -> Self {
        Self {
            solicitudes,
            agenda,
            ajustes,
            asignaturas,
            feriados,
            config,
        }
    }

    pub fn config(&self) -> &CaseworkConfig {
        &self.config
    }

    /// Anonymous intake. Validation happens before any id is allocated.
    pub fn submit_solicitud(&self, envio: SolicitudEnviada) -> Result<Solicitud, CaseworkError> {
        let validada = validar_solicitud(envio)?;
        let solicitud = Solicitud {
            id: next_solicitud_id(),
            asunto: validada.asunto,
            descripcion: validada.descripcion,
            autorizacion_datos: true,
            estudiante: validada.estudiante,
            asignaturas_solicitadas: validada.asignaturas,
            estado: EstadoSolicitud::PendienteEntrevista,
            encargada_inclusion: None,
            coordinador_tecnico: None,
            asesor_pedagogico: None,
            nota_resolucion: None,
            created_at: Utc::now(),
        };
        let guardada = self.solicitudes.insert(solicitud)?;
        tracing::info!(solicitud = guardada.id.0, "solicitud recibida");
        Ok(guardada)
    }

    pub fn listar(&self, actor: &Actor) -> Result<Vec<Solicitud>, CaseworkError> {
        gate::exigir_personal(actor)?;
        Ok(self.solicitudes.list()?)
    }

    pub fn detalle(
        &self,
        actor: &Actor,
        id: SolicitudId,
    ) -> Result<DetalleSolicitud, CaseworkError> {
        gate::exigir_personal(actor)?;
        let solicitud = self.cargar_solicitud(id)?;
        let entrevistas = self.agenda.entrevistas_de_solicitud(id)?;
        let mut ajustes = Vec::new();
        for ajuste in self.ajustes.ajustes_de_solicitud(id)? {
            let decisiones_docentes = self.ajustes.decisiones_de_ajuste(ajuste.id)?;
            ajustes.push(AjusteConDecisiones {
                ajuste,
                decisiones_docentes,
            });
        }
        Ok(DetalleSolicitud {
            solicitud,
            entrevistas,
            ajustes,
        })
    }

    /// Forward transition. The required role depends on the state being left.
    pub fn avanzar(
        &self,
        actor: &Actor,
        id: SolicitudId,
        avance: Avance,
    ) -> Result<Solicitud, CaseworkError> {
        let mut solicitud = self.cargar_solicitud(id)?;

        match gate::rol_de_salida(solicitud.estado) {
            Some(rol) => gate::exigir_rol(actor, rol)?,
            None => return Err(TransitionError::SolicitudTerminal(solicitud.estado).into()),
        }

        let entrevistas = self.agenda.entrevistas_de_solicitud(id)?;
        let entrevista_realizada = entrevistas
            .iter()
            .any(|e| e.estado == EstadoEntrevista::Realizada);
        let ajustes = self.ajustes.ajustes_de_solicitud(id)?;
        let mut decisiones = Vec::new();
        for ajuste in &ajustes {
            decisiones.extend(self.ajustes.decisiones_de_ajuste(ajuste.id)?);
        }

        let siguiente = validar_avance(
            &solicitud,
            ContextoAvance {
                entrevista_realizada,
                ajustes: &ajustes,
                decisiones: &decisiones,
                aprobacion: self.config.aprobacion,
                veto: self.config.veto,
            },
        )?;

        let anterior = solicitud.estado;
        solicitud.estado = siguiente;
        if let Some(responsable) = avance.siguiente_responsable {
            match siguiente {
                EstadoSolicitud::PendienteFormulacionCaso
                | EstadoSolicitud::PendienteFormulacionAjustes => {
                    solicitud.coordinador_tecnico = Some(responsable);
                }
                EstadoSolicitud::PendientePreaprobacion => {
                    solicitud.asesor_pedagogico = Some(responsable);
                }
                _ => {}
            }
        }
        if siguiente.es_terminal() {
            solicitud.nota_resolucion = avance.nota.clone();
        }
        self.solicitudes.update(solicitud.clone())?;
        tracing::info!(
            solicitud = id.0,
            desde = anterior.label(),
            hacia = siguiente.label(),
            "solicitud avanzada"
        );
        Ok(solicitud)
    }

    /// Terminal rejection, valid from any non-terminal state.
    pub fn rechazar(
        &self,
        actor: &Actor,
        id: SolicitudId,
        rechazo: Rechazo,
    ) -> Result<Solicitud, CaseworkError> {
        gate::exigir_rol(actor, Rol::DirectorCarrera)?;
        let mut solicitud = self.cargar_solicitud(id)?;
        solicitud.estado = validar_rechazo(&solicitud)?;
        solicitud.nota_resolucion = rechazo.motivo;
        self.solicitudes.update(solicitud.clone())?;
        tracing::info!(solicitud = id.0, "solicitud rechazada");
        Ok(solicitud)
    }

    /// Books an interview for the acting coordinator. The repository
    /// constraint is the only slot guard.
    pub fn agendar(
        &self,
        actor: &Actor,
        peticion: AgendarEntrevista,
    ) -> Result<Entrevista, CaseworkError> {
        gate::exigir_rol(actor, Rol::EncargadoInclusion)?;
        let mut solicitud = self.cargar_solicitud(peticion.solicitud_id)?;
        if solicitud.estado.es_terminal() {
            return Err(TransitionError::SolicitudTerminal(solicitud.estado).into());
        }
        let fecha = componer_fecha(
            peticion.fecha_agendar,
            peticion.hora_agendar,
            &self.config.agenda,
            self.feriados.as_ref(),
        )?;

        let entrevista = Entrevista {
            id: next_entrevista_id(),
            solicitud_id: solicitud.id,
            coordinadora: actor.perfil,
            fecha,
            modalidad: peticion.modalidad,
            estado: EstadoEntrevista::Pendiente,
            notas: peticion.notas,
        };
        let guardada = self.insertar_en_agenda(entrevista, actor.perfil, fecha)?;

        if solicitud.encargada_inclusion != Some(actor.perfil) {
            solicitud.encargada_inclusion = Some(actor.perfil);
            self.solicitudes.update(solicitud)?;
        }
        Ok(guardada)
    }

    /// Books a replacement slot; the original row stays as audit trail marked
    /// `no_asistio`. Nothing changes when the new slot is taken.
    pub fn reagendar(
        &self,
        actor: &Actor,
        id: EntrevistaId,
        peticion: Reagendar,
    ) -> Result<Entrevista, CaseworkError> {
        gate::exigir_rol(actor, Rol::EncargadoInclusion)?;
        let mut original = self.cargar_entrevista(id)?;
        exigir_pendiente(&original)?;
        let nueva_fecha = componer_fecha(
            peticion.fecha_agendar,
            peticion.hora_agendar,
            &self.config.agenda,
            self.feriados.as_ref(),
        )?;

        let nueva = Entrevista {
            id: next_entrevista_id(),
            solicitud_id: original.solicitud_id,
            coordinadora: original.coordinadora,
            fecha: nueva_fecha,
            modalidad: original.modalidad,
            estado: EstadoEntrevista::Pendiente,
            notas: anexar_nota(&original.notas, &nota_reagendamiento(original.fecha, nueva_fecha)),
        };
        let guardada = self.insertar_en_agenda(nueva, original.coordinadora, nueva_fecha)?;

        original.estado = EstadoEntrevista::NoAsistio;
        original.notas = anexar_nota(
            &original.notas,
            &nota_reagendamiento(original.fecha, nueva_fecha),
        );
        self.agenda.update_entrevista(original)?;
        Ok(guardada)
    }

    pub fn cancelar(&self, actor: &Actor, id: EntrevistaId) -> Result<Entrevista, CaseworkError> {
        gate::exigir_rol(actor, Rol::EncargadoInclusion)?;
        let mut entrevista = self.cargar_entrevista(id)?;
        exigir_pendiente(&entrevista)?;
        entrevista.estado = EstadoEntrevista::Cancelada;
        self.agenda.update_entrevista(entrevista.clone())?;
        Ok(entrevista)
    }

    pub fn confirmar(
        &self,
        actor: &Actor,
        id: EntrevistaId,
        confirmacion: Confirmacion,
    ) -> Result<Entrevista, CaseworkError> {
        gate::exigir_rol(actor, Rol::EncargadoInclusion)?;
        let mut entrevista = self.cargar_entrevista(id)?;
        exigir_pendiente(&entrevista)?;
        entrevista.estado = confirmacion.resultado.estado();
        entrevista.notas = anexar_nota(
            &entrevista.notas,
            &nota_confirmacion(confirmacion.resultado, Utc::now()),
        );
        if let Some(extra) = confirmacion.notas_adicionales {
            entrevista.notas = anexar_nota(&entrevista.notas, &extra);
        }
        self.agenda.update_entrevista(entrevista.clone())?;
        Ok(entrevista)
    }

    /// Notes are editable in every interview state.
    pub fn editar_notas(
        &self,
        actor: &Actor,
        id: EntrevistaId,
        notas: String,
    ) -> Result<Entrevista, CaseworkError> {
        gate::exigir_rol(actor, Rol::EncargadoInclusion)?;
        let mut entrevista = self.cargar_entrevista(id)?;
        entrevista.notas = notas;
        self.agenda.update_entrevista(entrevista.clone())?;
        Ok(entrevista)
    }

    pub fn bloquear_horario(
        &self,
        actor: &Actor,
        peticion: BloquearHorario,
    ) -> Result<(), CaseworkError> {
        gate::exigir_rol(actor, Rol::EncargadoInclusion)?;
        let fecha = componer_fecha(
            peticion.fecha,
            peticion.hora,
            &self.config.agenda,
            self.feriados.as_ref(),
        )?;
        self.agenda
            .insert_bloqueo(HorarioBloqueado {
                coordinadora: actor.perfil,
                fecha,
                motivo: peticion.motivo,
            })
            .map_err(|err| match err {
                RepositoryError::Conflict => CaseworkError::Agenda(AgendaError::SlotConflict {
                    coordinadora: actor.perfil,
                    fecha,
                }),
                otro => otro.into(),
            })
    }

    pub fn disponibilidad(
        &self,
        actor: &Actor,
        coordinadora: PerfilId,
        mes: Mes,
    ) -> Result<DisponibilidadMensual, CaseworkError> {
        gate::exigir_personal(actor)?;
        let mut ocupados: Vec<_> = self
            .agenda
            .entrevistas_de_coordinadora(coordinadora)?
            .into_iter()
            .filter(|e| e.estado.ocupa_slot())
            .map(|e| e.fecha)
            .collect();
        ocupados.extend(
            self.agenda
                .bloqueos_de_coordinadora(coordinadora)?
                .into_iter()
                .map(|b| b.fecha),
        );
        Ok(disponibilidad_mensual(
            mes,
            &self.config.agenda,
            self.feriados.as_ref(),
            &ocupados,
        ))
    }

    pub fn registrar_ajuste(
        &self,
        actor: &Actor,
        peticion: RegistrarAjuste,
    ) -> Result<AjusteAsignado, CaseworkError> {
        gate::exigir_rol(actor, Rol::CoordinadorTecnicoPedagogico)?;
        let solicitud = self.cargar_solicitud(peticion.solicitud_id)?;
        if solicitud.estado.es_terminal() {
            return Err(TransitionError::SolicitudTerminal(solicitud.estado).into());
        }
        let ajuste = AjusteAsignado {
            id: next_ajuste_id(),
            solicitud_id: solicitud.id,
            descripcion: peticion.descripcion,
            categoria: peticion.categoria,
            estado_aprobacion: EstadoAprobacion::Pendiente,
            director_aprobador: None,
            fecha_aprobacion: None,
            comentarios: String::new(),
        };
        Ok(self.ajustes.insert(ajuste)?)
    }

    /// Director verdict on one adjustment; re-recording overwrites.
    pub fn aprobar_ajuste(
        &self,
        actor: &Actor,
        id: AjusteAsignadoId,
        aprobacion: AprobacionAjuste,
    ) -> Result<AjusteAsignado, CaseworkError> {
        gate::exigir_rol(actor, Rol::DirectorCarrera)?;
        let mut ajuste = self
            .ajustes
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        let estado = if aprobacion.aprobado {
            EstadoAprobacion::Aprobado
        } else {
            EstadoAprobacion::Rechazado
        };
        registrar_aprobacion(
            &mut ajuste,
            actor.perfil,
            estado,
            aprobacion.comentarios,
            Utc::now(),
        );
        self.ajustes.update(ajuste.clone())?;
        Ok(ajuste)
    }

    /// Teacher decision, restricted to teachers owning one of the request's
    /// subject-sections. Upsert on (ajuste, docente).
    pub fn decision_docente(
        &self,
        actor: &Actor,
        id: AjusteAsignadoId,
        peticion: DecisionSobreAjuste,
    ) -> Result<DecisionDocenteAjuste, CaseworkError> {
        gate::exigir_rol(actor, Rol::Docente)?;
        let ajuste = self
            .ajustes
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        let solicitud = self.cargar_solicitud(ajuste.solicitud_id)?;
        let asignaturas = self
            .asignaturas
            .muchas(&solicitud.asignaturas_solicitadas)?;
        if !actor.superuser && !docente_imparte(actor.perfil, &asignaturas) {
            return Err(Unauthorized {
                requerido: "Docente de una asignatura de la solicitud",
                actual: Rol::Docente.label(),
            }
            .into());
        }
        let decision = DecisionDocenteAjuste {
            ajuste_asignado_id: id,
            docente: actor.perfil,
            decision: peticion.decision,
            comentario: peticion.comentario,
            fecha_decision: Utc::now(),
        };
        self.ajustes.upsert_decision(decision.clone())?;
        Ok(decision)
    }

    fn cargar_solicitud(&self, id: SolicitudId) -> Result<Solicitud, CaseworkError> {
        Ok(self
            .solicitudes
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    fn cargar_entrevista(&self, id: EntrevistaId) -> Result<Entrevista, CaseworkError> {
        Ok(self
            .agenda
            .fetch_entrevista(id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    fn insertar_en_agenda(
        &self,
        entrevista: Entrevista,
        coordinadora: PerfilId,
        fecha: chrono::DateTime<Utc>,
    ) -> Result<Entrevista, CaseworkError> {
        self.agenda
            .insert_entrevista(entrevista)
            .map_err(|err| match err {
                RepositoryError::Conflict => CaseworkError::Agenda(AgendaError::SlotConflict {
                    coordinadora,
                    fecha,
                }),
                otro => otro.into(),
            })
    }
}
