//! Solicitud state machine.
//!
//! Transitions move strictly forward along [`EstadoSolicitud::siguiente`];
//! rejection is the only lateral move and lands in the terminal `rechazado`.
//! Who may fire each transition lives in [`gate::rol_de_salida`]; this module
//! validates the data preconditions.

use super::approvals::{AgregadoAjustes, PoliticaAprobacion, PoliticaVetoDocente};
use super::domain::{AjusteAsignado, DecisionDocenteAjuste, EstadoSolicitud, Solicitud};
use super::gate;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("la solicitud ya está en el estado terminal {}", .0.label())]
    SolicitudTerminal(EstadoSolicitud),
    #[error("la solicitud requiere una entrevista realizada antes de avanzar")]
    SinEntrevistaRealizada,
    #[error("la solicitud no tiene ajustes asignados")]
    SinAjustesAsignados,
    #[error("quedan {pendientes} ajustes sin resolver por el director")]
    AjustesSinAprobar { pendientes: usize },
}

/// Data the current state needs before it can be left. The service loads it
/// from the repositories; nothing here touches storage.
#[derive(Debug, Clone, Copy)]
pub struct ContextoAvance<'a> {
    pub entrevista_realizada: bool,
    pub ajustes: &'a [AjusteAsignado],
    pub decisiones: &'a [DecisionDocenteAjuste],
    pub aprobacion: PoliticaAprobacion,
    pub veto: PoliticaVetoDocente,
}

/// Validates the forward transition out of the Solicitud's current state and
/// returns the state it moves into.
pub fn validar_avance(
    solicitud: &Solicitud,
    ctx: ContextoAvance<'_>,
) -> Result<EstadoSolicitud, TransitionError> {
    let siguiente = solicitud
        .estado
        .siguiente()
        .ok_or(TransitionError::SolicitudTerminal(solicitud.estado))?;

    match solicitud.estado {
        EstadoSolicitud::PendienteEntrevista if !ctx.entrevista_realizada => {
            return Err(TransitionError::SinEntrevistaRealizada);
        }
        EstadoSolicitud::PendienteFormulacionAjustes | EstadoSolicitud::PendientePreaprobacion
            if ctx.ajustes.is_empty() =>
        {
            return Err(TransitionError::SinAjustesAsignados);
        }
        EstadoSolicitud::PendienteAprobacion => {
            let agregado = AgregadoAjustes::evaluar(ctx.ajustes, ctx.decisiones);
            if ctx.ajustes.is_empty() {
                return Err(TransitionError::SinAjustesAsignados);
            }
            if !agregado.listo(ctx.ajustes, ctx.aprobacion, ctx.veto) {
                return Err(TransitionError::AjustesSinAprobar {
                    pendientes: agregado.sin_resolver(),
                });
            }
        }
        _ => {}
    }

    Ok(siguiente)
}

/// Rejection is valid from any non-terminal state.
pub fn validar_rechazo(solicitud: &Solicitud) -> Result<EstadoSolicitud, TransitionError> {
    if solicitud.estado.es_terminal() {
        return Err(TransitionError::SolicitudTerminal(solicitud.estado));
    }
    Ok(EstadoSolicitud::Rechazado)
}

pub use gate::rol_de_salida;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::casework::domain::{
        AjusteAsignadoId, EstadoAprobacion, Estudiante, PerfilId, SolicitudId,
    };
    use chrono::Utc;

    fn solicitud(estado: EstadoSolicitud) -> Solicitud {
        Solicitud {
            id: SolicitudId(1),
            asunto: "Apoyo en evaluaciones".to_string(),
            descripcion: "Requiere tiempo adicional".to_string(),
            autorizacion_datos: true,
            estudiante: Estudiante {
                nombres: "Ana".to_string(),
                apellidos: "Rojas".to_string(),
                rut: "12.345.678-5".to_string(),
                email: "ana.rojas@example.cl".to_string(),
                carrera: "Ingeniería".to_string(),
            },
            asignaturas_solicitadas: Vec::new(),
            estado,
            encargada_inclusion: None,
            coordinador_tecnico: None,
            asesor_pedagogico: None,
            nota_resolucion: None,
            created_at: Utc::now(),
        }
    }

    fn ajuste_aprobado(id: u64) -> AjusteAsignado {
        AjusteAsignado {
            id: AjusteAsignadoId(id),
            solicitud_id: SolicitudId(1),
            descripcion: "Material en formato accesible".to_string(),
            categoria: "Material".to_string(),
            estado_aprobacion: EstadoAprobacion::Aprobado,
            director_aprobador: Some(PerfilId(4)),
            fecha_aprobacion: Some(Utc::now()),
            comentarios: String::new(),
        }
    }

    fn ctx<'a>(
        entrevista_realizada: bool,
        ajustes: &'a [AjusteAsignado],
    ) -> ContextoAvance<'a> {
        ContextoAvance {
            entrevista_realizada,
            ajustes,
            decisiones: &[],
            aprobacion: PoliticaAprobacion::TodosAprobados,
            veto: PoliticaVetoDocente::Senalar,
        }
    }

    #[test]
    fn avance_inicial_exige_entrevista_realizada() {
        let s = solicitud(EstadoSolicitud::PendienteEntrevista);
        assert_eq!(
            validar_avance(&s, ctx(false, &[])),
            Err(TransitionError::SinEntrevistaRealizada)
        );
        assert_eq!(
            validar_avance(&s, ctx(true, &[])),
            Ok(EstadoSolicitud::PendienteFormulacionCaso)
        );
    }

    #[test]
    fn preaprobacion_exige_ajustes_asignados() {
        let s = solicitud(EstadoSolicitud::PendientePreaprobacion);
        assert_eq!(
            validar_avance(&s, ctx(true, &[])),
            Err(TransitionError::SinAjustesAsignados)
        );
        let ajustes = vec![ajuste_aprobado(1)];
        assert_eq!(
            validar_avance(&s, ctx(true, &ajustes)),
            Ok(EstadoSolicitud::PendienteAprobacion)
        );
    }

    #[test]
    fn aprobacion_final_exige_ajustes_resueltos() {
        let s = solicitud(EstadoSolicitud::PendienteAprobacion);
        let mut ajustes = vec![ajuste_aprobado(1)];
        ajustes.push(AjusteAsignado {
            estado_aprobacion: EstadoAprobacion::Pendiente,
            ..ajuste_aprobado(2)
        });
        assert_eq!(
            validar_avance(&s, ctx(true, &ajustes)),
            Err(TransitionError::AjustesSinAprobar { pendientes: 1 })
        );

        let ajustes = vec![ajuste_aprobado(1), ajuste_aprobado(2)];
        assert_eq!(
            validar_avance(&s, ctx(true, &ajustes)),
            Ok(EstadoSolicitud::Aprobado)
        );
    }

    #[test]
    fn estados_terminales_no_avanzan_ni_se_rechazan() {
        for estado in [EstadoSolicitud::Aprobado, EstadoSolicitud::Rechazado] {
            let s = solicitud(estado);
            assert_eq!(
                validar_avance(&s, ctx(true, &[])),
                Err(TransitionError::SolicitudTerminal(estado))
            );
            assert_eq!(
                validar_rechazo(&s),
                Err(TransitionError::SolicitudTerminal(estado))
            );
        }
    }

    #[test]
    fn rechazo_valido_desde_cualquier_estado_no_terminal() {
        for estado in EstadoSolicitud::ordered() {
            let s = solicitud(estado);
            if !estado.es_terminal() {
                assert_eq!(validar_rechazo(&s), Ok(EstadoSolicitud::Rechazado));
            }
        }
    }
}
