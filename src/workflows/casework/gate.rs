//! Role/permission gate. Authorization is a capability check over the closed
//! [`Rol`] enum; the role label strings never leak past `Rol::from_label`.

use super::domain::{Actor, EstadoSolicitud, Rol};

/// Raised whenever an actor's resolved role does not cover the attempted
/// operation. Maps to HTTP 403 at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("se requiere el rol {requerido}, el actor tiene {actual}")]
pub struct Unauthorized {
    pub requerido: &'static str,
    pub actual: &'static str,
}

fn actual_de(actor: &Actor) -> &'static str {
    match actor.rol {
        Some(rol) => rol.label(),
        None => "(sin rol)",
    }
}

/// Requires the actor to hold exactly `requerido`. Superusers bypass every
/// role check.
pub fn exigir_rol(actor: &Actor, requerido: Rol) -> Result<(), Unauthorized> {
    if actor.superuser || actor.rol == Some(requerido) {
        return Ok(());
    }
    Err(Unauthorized {
        requerido: requerido.label(),
        actual: actual_de(actor),
    })
}

/// Requires any staff role at all; used for read models open to the whole
/// academic staff.
pub fn exigir_personal(actor: &Actor) -> Result<(), Unauthorized> {
    if actor.superuser || actor.rol.is_some() {
        return Ok(());
    }
    Err(Unauthorized {
        requerido: "personal académico",
        actual: actual_de(actor),
    })
}

/// Role authorized to advance a Solicitud out of `estado`. Terminal states
/// have no exit.
pub const fn rol_de_salida(estado: EstadoSolicitud) -> Option<Rol> {
    match estado {
        EstadoSolicitud::PendienteEntrevista => Some(Rol::EncargadoInclusion),
        EstadoSolicitud::PendienteFormulacionCaso
        | EstadoSolicitud::PendienteFormulacionAjustes => Some(Rol::CoordinadorTecnicoPedagogico),
        EstadoSolicitud::PendientePreaprobacion => Some(Rol::AsesorPedagogico),
        EstadoSolicitud::PendienteAprobacion => Some(Rol::DirectorCarrera),
        EstadoSolicitud::Aprobado | EstadoSolicitud::Rechazado => None,
    }
}
