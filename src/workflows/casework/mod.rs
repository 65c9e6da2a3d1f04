//! Reasonable-accommodation casework: intake, interview scheduling, the
//! request state machine, and per-adjustment approvals.

pub mod approvals;
pub mod availability;
pub mod domain;
pub mod gate;
pub mod intake;
pub mod memory;
pub mod repository;
pub mod router;
pub mod scheduling;
pub mod service;
pub mod state;

pub use approvals::{AgregadoAjustes, PoliticaAprobacion, PoliticaVetoDocente};
pub use availability::{
    disponibilidad_demo, AgendaConfig, DisponibilidadMensual, Feriado, FeriadosChile,
    HolidayProvider, Mes,
};
pub use domain::{
    Actor, AjusteAsignado, AjusteAsignadoId, Asignatura, AsignaturaId, DecisionDocente,
    DecisionDocenteAjuste, Entrevista, EntrevistaId, EstadoAprobacion, EstadoEntrevista,
    EstadoSolicitud, Estudiante, HorarioBloqueado, Modalidad, PerfilId, Rol, Solicitud,
    SolicitudId,
};
pub use gate::Unauthorized;
pub use intake::{IntakeError, SolicitudEnviada};
pub use memory::{MemoryAgenda, MemoryAjustes, MemoryAsignaturas, MemorySolicitudes};
pub use repository::{
    AgendaRepository, AjusteRepository, AsignaturaRepository, RepositoryError, SolicitudRepository,
};
pub use router::casework_router;
pub use scheduling::{AgendaError, ResultadoEntrevista};
pub use service::{
    AgendarEntrevista, AprobacionAjuste, Avance, BloquearHorario, CaseworkConfig, CaseworkError,
    CaseworkService, Confirmacion, DecisionSobreAjuste, DetalleSolicitud, Reagendar, Rechazo,
    RegistrarAjuste,
};
pub use state::TransitionError;
