use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SolicitudId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntrevistaId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AjusteAsignadoId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AsignaturaId(pub u64);

/// Staff profile identifier resolved by the auth collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PerfilId(pub u64);

/// Closed set of staff roles. The Spanish labels are the exact strings the
/// auth collaborator stores, so `from_label` is the only place they are parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rol {
    EncargadoInclusion,
    CoordinadorTecnicoPedagogico,
    AsesorPedagogico,
    DirectorCarrera,
    Docente,
}

impl Rol {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::EncargadoInclusion,
            Self::CoordinadorTecnicoPedagogico,
            Self::AsesorPedagogico,
            Self::DirectorCarrera,
            Self::Docente,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::EncargadoInclusion => "Encargado de Inclusión",
            Self::CoordinadorTecnicoPedagogico => "Coordinador Técnico Pedagógico",
            Self::AsesorPedagogico => "Asesor Pedagógico",
            Self::DirectorCarrera => "Director de Carrera",
            Self::Docente => "Docente",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|rol| rol.label() == label.trim())
    }

    /// ASCII identifier carried on the wire (headers, config); matches the
    /// serde snake_case form.
    pub const fn slug(self) -> &'static str {
        match self {
            Self::EncargadoInclusion => "encargado_inclusion",
            Self::CoordinadorTecnicoPedagogico => "coordinador_tecnico_pedagogico",
            Self::AsesorPedagogico => "asesor_pedagogico",
            Self::DirectorCarrera => "director_carrera",
            Self::Docente => "docente",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|rol| rol.slug() == slug.trim())
    }
}

/// Authenticated actor context. Always passed explicitly into core operations;
/// the domain never reads ambient request state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub perfil: PerfilId,
    pub rol: Option<Rol>,
    pub superuser: bool,
}

impl Actor {
    pub fn staff(perfil: PerfilId, rol: Rol) -> Self {
        Self {
            perfil,
            rol: Some(rol),
            superuser: false,
        }
    }

    pub fn superuser(perfil: PerfilId) -> Self {
        Self {
            perfil,
            rol: None,
            superuser: true,
        }
    }
}

/// Lifecycle states of a Solicitud, in forward order. `Rechazado` is terminal
/// and reachable from every non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstadoSolicitud {
    PendienteEntrevista,
    PendienteFormulacionCaso,
    PendienteFormulacionAjustes,
    PendientePreaprobacion,
    PendienteAprobacion,
    Aprobado,
    Rechazado,
}

impl EstadoSolicitud {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::PendienteEntrevista,
            Self::PendienteFormulacionCaso,
            Self::PendienteFormulacionAjustes,
            Self::PendientePreaprobacion,
            Self::PendienteAprobacion,
            Self::Aprobado,
            Self::Rechazado,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PendienteEntrevista => "pendiente_entrevista",
            Self::PendienteFormulacionCaso => "pendiente_formulacion_caso",
            Self::PendienteFormulacionAjustes => "pendiente_formulacion_ajustes",
            Self::PendientePreaprobacion => "pendiente_preaprobacion",
            Self::PendienteAprobacion => "pendiente_aprobacion",
            Self::Aprobado => "aprobado",
            Self::Rechazado => "rechazado",
        }
    }

    pub const fn es_terminal(self) -> bool {
        matches!(self, Self::Aprobado | Self::Rechazado)
    }

    /// Next state along the forward path, `None` for terminal states.
    pub const fn siguiente(self) -> Option<Self> {
        match self {
            Self::PendienteEntrevista => Some(Self::PendienteFormulacionCaso),
            Self::PendienteFormulacionCaso => Some(Self::PendienteFormulacionAjustes),
            Self::PendienteFormulacionAjustes => Some(Self::PendientePreaprobacion),
            Self::PendientePreaprobacion => Some(Self::PendienteAprobacion),
            Self::PendienteAprobacion => Some(Self::Aprobado),
            Self::Aprobado | Self::Rechazado => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estudiante {
    pub nombres: String,
    pub apellidos: String,
    pub rut: String,
    pub email: String,
    pub carrera: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solicitud {
    pub id: SolicitudId,
    pub asunto: String,
    pub descripcion: String,
    pub autorizacion_datos: bool,
    pub estudiante: Estudiante,
    pub asignaturas_solicitadas: Vec<AsignaturaId>,
    pub estado: EstadoSolicitud,
    pub encargada_inclusion: Option<PerfilId>,
    pub coordinador_tecnico: Option<PerfilId>,
    pub asesor_pedagogico: Option<PerfilId>,
    /// Closing note recorded when the request reaches a terminal state.
    pub nota_resolucion: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modalidad {
    Presencial,
    Online,
}

impl Modalidad {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Presencial => "Presencial",
            Self::Online => "Online",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstadoEntrevista {
    Pendiente,
    Realizada,
    Cancelada,
    NoAsistio,
}

impl EstadoEntrevista {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pendiente => "pendiente",
            Self::Realizada => "realizada",
            Self::Cancelada => "cancelada",
            Self::NoAsistio => "no_asistio",
        }
    }

    /// A cancelled interview releases its calendar slot; every other state
    /// keeps the (coordinadora, fecha) pair occupied.
    pub const fn ocupa_slot(self) -> bool {
        !matches!(self, Self::Cancelada)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entrevista {
    pub id: EntrevistaId,
    pub solicitud_id: SolicitudId,
    pub coordinadora: PerfilId,
    pub fecha: DateTime<Utc>,
    pub modalidad: Modalidad,
    pub estado: EstadoEntrevista,
    pub notas: String,
}

/// Coordinator-specific timestamp marked unavailable for booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorarioBloqueado {
    pub coordinadora: PerfilId,
    pub fecha: DateTime<Utc>,
    pub motivo: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstadoAprobacion {
    Pendiente,
    Aprobado,
    Rechazado,
}

impl EstadoAprobacion {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pendiente => "pendiente",
            Self::Aprobado => "aprobado",
            Self::Rechazado => "rechazado",
        }
    }
}

/// A catalog accommodation bound to a concrete Solicitud, carrying its own
/// director-approval trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AjusteAsignado {
    pub id: AjusteAsignadoId,
    pub solicitud_id: SolicitudId,
    pub descripcion: String,
    pub categoria: String,
    pub estado_aprobacion: EstadoAprobacion,
    pub director_aprobador: Option<PerfilId>,
    pub fecha_aprobacion: Option<DateTime<Utc>>,
    pub comentarios: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionDocente {
    Aprobado,
    Rechazado,
}

impl DecisionDocente {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Aprobado => "aprobado",
            Self::Rechazado => "rechazado",
        }
    }
}

/// One teacher's standing decision on one assigned adjustment. Unique per
/// (ajuste_asignado, docente); re-recording overwrites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionDocenteAjuste {
    pub ajuste_asignado_id: AjusteAsignadoId,
    pub docente: PerfilId,
    pub decision: DecisionDocente,
    pub comentario: String,
    pub fecha_decision: DateTime<Utc>,
}

/// Subject-section owned by a single teacher; gates docente decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asignatura {
    pub id: AsignaturaId,
    pub nombre: String,
    pub seccion: String,
    pub docente: PerfilId,
}
