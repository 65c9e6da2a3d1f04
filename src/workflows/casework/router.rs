//! HTTP surface for the casework service.
//!
//! The auth collaborator terminates sessions upstream and forwards the actor
//! context as headers (`x-perfil-id`, `x-rol`, `x-superuser`); handlers only
//! translate between HTTP and the service.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{Actor, AjusteAsignadoId, EntrevistaId, PerfilId, Rol, SolicitudId};
use super::intake::SolicitudEnviada;
use super::repository::{
    AgendaRepository, AjusteRepository, AsignaturaRepository, RepositoryError, SolicitudRepository,
};
use super::scheduling::AgendaError;
use super::service::{
    AgendarEntrevista, AprobacionAjuste, Avance, BloquearHorario, CaseworkError, CaseworkService,
    Confirmacion, DecisionSobreAjuste, Reagendar, Rechazo, RegistrarAjuste,
};

type Service<S, G, J, C> = Arc<CaseworkService<S, G, J, C>>;

pub fn casework_router<S, G, J, C>(service: Service<S, G, J, C>) -> Router
where
    S: SolicitudRepository + 'static,
    G: AgendaRepository + 'static,
    J: AjusteRepository + 'static,
    C: AsignaturaRepository + 'static,
{
    Router::new()
        .route(
            "/api/solicitudes",
            post(submit_handler::<S, G, J, C>).get(listar_handler::<S, G, J, C>),
        )
        .route("/api/solicitudes/:id", get(detalle_handler::<S, G, J, C>))
        .route(
            "/api/solicitudes/:id/avanzar",
            post(avanzar_handler::<S, G, J, C>),
        )
        .route(
            "/api/solicitudes/:id/rechazar",
            post(rechazar_handler::<S, G, J, C>),
        )
        .route(
            "/api/calendario-disponible",
            get(calendario_handler::<S, G, J, C>),
        )
        .route("/api/entrevistas", post(agendar_handler::<S, G, J, C>))
        .route(
            "/api/entrevistas/:id/reagendar",
            post(reagendar_handler::<S, G, J, C>),
        )
        .route(
            "/api/entrevistas/:id/cancelar",
            post(cancelar_handler::<S, G, J, C>),
        )
        .route(
            "/api/entrevistas/:id/confirmar",
            post(confirmar_handler::<S, G, J, C>),
        )
        .route(
            "/api/entrevistas/:id/notas",
            post(notas_handler::<S, G, J, C>),
        )
        .route(
            "/api/horarios-bloqueados",
            post(bloquear_handler::<S, G, J, C>),
        )
        .route(
            "/api/ajustes-asignados",
            post(registrar_ajuste_handler::<S, G, J, C>),
        )
        .route(
            "/api/ajustes-asignados/:id/aprobacion",
            post(aprobacion_handler::<S, G, J, C>),
        )
        .route(
            "/api/ajustes-asignados/:id/decision-docente",
            post(decision_docente_handler::<S, G, J, C>),
        )
        .with_state(service)
}

fn actor_de(headers: &HeaderMap) -> Result<Actor, Response> {
    let perfil = headers
        .get("x-perfil-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let Some(perfil) = perfil else {
        let payload = json!({"error": "falta la cabecera x-perfil-id"});
        return Err((StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response());
    };
    // Header values must stay ASCII, so the role travels as its slug.
    let rol = headers
        .get("x-rol")
        .and_then(|v| v.to_str().ok())
        .and_then(Rol::from_slug);
    let superuser = headers
        .get("x-superuser")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
    Ok(Actor {
        perfil: PerfilId(perfil),
        rol,
        superuser,
    })
}

fn respuesta_de_error(error: CaseworkError) -> Response {
    let status = match &error {
        CaseworkError::NoAutorizado(_) => StatusCode::FORBIDDEN,
        CaseworkError::Transicion(_) => StatusCode::CONFLICT,
        CaseworkError::Agenda(AgendaError::SlotConflict { .. })
        | CaseworkError::Agenda(AgendaError::EstadoInvalido(_)) => StatusCode::CONFLICT,
        CaseworkError::Agenda(_) | CaseworkError::Intake(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CaseworkError::Repositorio(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        CaseworkError::Repositorio(RepositoryError::Conflict) => StatusCode::CONFLICT,
        CaseworkError::Repositorio(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({"error": error.to_string()});
    (status, axum::Json(payload)).into_response()
}

async fn submit_handler<S, G, J, C>(
    State(service): State<Service<S, G, J, C>>,
    axum::Json(envio): axum::Json<SolicitudEnviada>,
) -> Response
where
    S: SolicitudRepository + 'static,
    G: AgendaRepository + 'static,
    J: AjusteRepository + 'static,
    C: AsignaturaRepository + 'static,
{
    match service.submit_solicitud(envio) {
        Ok(solicitud) => (StatusCode::CREATED, axum::Json(solicitud)).into_response(),
        Err(error) => respuesta_de_error(error),
    }
}

async fn listar_handler<S, G, J, C>(
    State(service): State<Service<S, G, J, C>>,
    headers: HeaderMap,
) -> Response
where
    S: SolicitudRepository + 'static,
    G: AgendaRepository + 'static,
    J: AjusteRepository + 'static,
    C: AsignaturaRepository + 'static,
{
    let actor = match actor_de(&headers) {
        Ok(actor) => actor,
        Err(respuesta) => return respuesta,
    };
    match service.listar(&actor) {
        Ok(solicitudes) => (StatusCode::OK, axum::Json(solicitudes)).into_response(),
        Err(error) => respuesta_de_error(error),
    }
}

async fn detalle_handler<S, G, J, C>(
    State(service): State<Service<S, G, J, C>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response
where
    S: SolicitudRepository + 'static,
    G: AgendaRepository + 'static,
    J: AjusteRepository + 'static,
    C: AsignaturaRepository + 'static,
{
    let actor = match actor_de(&headers) {
        Ok(actor) => actor,
        Err(respuesta) => return respuesta,
    };
    match service.detalle(&actor, SolicitudId(id)) {
        Ok(detalle) => (StatusCode::OK, axum::Json(detalle)).into_response(),
        Err(error) => respuesta_de_error(error),
    }
}

async fn avanzar_handler<S, G, J, C>(
    State(service): State<Service<S, G, J, C>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    axum::Json(avance): axum::Json<Avance>,
) -> Response
where
    S: SolicitudRepository + 'static,
    G: AgendaRepository + 'static,
    J: AjusteRepository + 'static,
    C: AsignaturaRepository + 'static,
{
    let actor = match actor_de(&headers) {
        Ok(actor) => actor,
        Err(respuesta) => return respuesta,
    };
    match service.avanzar(&actor, SolicitudId(id), avance) {
        Ok(solicitud) => (StatusCode::OK, axum::Json(solicitud)).into_response(),
        Err(error) => respuesta_de_error(error),
    }
}

async fn rechazar_handler<S, G, J, C>(
    State(service): State<Service<S, G, J, C>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    axum::Json(rechazo): axum::Json<Rechazo>,
) -> Response
where
    S: SolicitudRepository + 'static,
    G: AgendaRepository + 'static,
    J: AjusteRepository + 'static,
    C: AsignaturaRepository + 'static,
{
    let actor = match actor_de(&headers) {
        Ok(actor) => actor,
        Err(respuesta) => return respuesta,
    };
    match service.rechazar(&actor, SolicitudId(id), rechazo) {
        Ok(solicitud) => (StatusCode::OK, axum::Json(solicitud)).into_response(),
        Err(error) => respuesta_de_error(error),
    }
}

#[derive(Debug, Deserialize)]
struct CalendarioQuery {
    month: String,
    coordinadora: u64,
}

async fn calendario_handler<S, G, J, C>(
    State(service): State<Service<S, G, J, C>>,
    headers: HeaderMap,
    Query(consulta): Query<CalendarioQuery>,
) -> Response
where
    S: SolicitudRepository + 'static,
    G: AgendaRepository + 'static,
    J: AjusteRepository + 'static,
    C: AsignaturaRepository + 'static,
{
    let actor = match actor_de(&headers) {
        Ok(actor) => actor,
        Err(respuesta) => return respuesta,
    };
    let mes = match consulta.month.parse() {
        Ok(mes) => mes,
        Err(error) => {
            let payload = json!({"error": format!("{error}")});
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
        }
    };
    match service.disponibilidad(&actor, PerfilId(consulta.coordinadora), mes) {
        Ok(vista) => {
            let fechas: Vec<_> = vista
                .fechas_con_disponibilidad()
                .map(|fecha| {
                    json!({
                        "fecha": fecha,
                        "horas": vista.dias[&fecha],
                    })
                })
                .collect();
            let payload = json!({
                "fechasConDisponibilidad": fechas,
                "feriados": vista.feriados,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => respuesta_de_error(error),
    }
}

async fn agendar_handler<S, G, J, C>(
    State(service): State<Service<S, G, J, C>>,
    headers: HeaderMap,
    axum::Json(peticion): axum::Json<AgendarEntrevista>,
) -> Response
where
    S: SolicitudRepository + 'static,
    G: AgendaRepository + 'static,
    J: AjusteRepository + 'static,
    C: AsignaturaRepository + 'static,
{
    let actor = match actor_de(&headers) {
        Ok(actor) => actor,
        Err(respuesta) => return respuesta,
    };
    match service.agendar(&actor, peticion) {
        Ok(entrevista) => (StatusCode::CREATED, axum::Json(entrevista)).into_response(),
        Err(error) => respuesta_de_error(error),
    }
}

async fn reagendar_handler<S, G, J, C>(
    State(service): State<Service<S, G, J, C>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    axum::Json(peticion): axum::Json<Reagendar>,
) -> Response
where
    S: SolicitudRepository + 'static,
    G: AgendaRepository + 'static,
    J: AjusteRepository + 'static,
    C: AsignaturaRepository + 'static,
{
    let actor = match actor_de(&headers) {
        Ok(actor) => actor,
        Err(respuesta) => return respuesta,
    };
    match service.reagendar(&actor, EntrevistaId(id), peticion) {
        Ok(entrevista) => (StatusCode::CREATED, axum::Json(entrevista)).into_response(),
        Err(error) => respuesta_de_error(error),
    }
}

async fn cancelar_handler<S, G, J, C>(
    State(service): State<Service<S, G, J, C>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response
where
    S: SolicitudRepository + 'static,
    G: AgendaRepository + 'static,
    J: AjusteRepository + 'static,
    C: AsignaturaRepository + 'static,
{
    let actor = match actor_de(&headers) {
        Ok(actor) => actor,
        Err(respuesta) => return respuesta,
    };
    match service.cancelar(&actor, EntrevistaId(id)) {
        Ok(entrevista) => (StatusCode::OK, axum::Json(entrevista)).into_response(),
        Err(error) => respuesta_de_error(error),
    }
}

async fn confirmar_handler<S, G, J, C>(
    State(service): State<Service<S, G, J, C>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    axum::Json(confirmacion): axum::Json<Confirmacion>,
) -> Response
where
    S: SolicitudRepository + 'static,
    G: AgendaRepository + 'static,
    J: AjusteRepository + 'static,
    C: AsignaturaRepository + 'static,
{
    let actor = match actor_de(&headers) {
        Ok(actor) => actor,
        Err(respuesta) => return respuesta,
    };
    match service.confirmar(&actor, EntrevistaId(id), confirmacion) {
        Ok(entrevista) => (StatusCode::OK, axum::Json(entrevista)).into_response(),
        Err(error) => respuesta_de_error(error),
    }
}

#[derive(Debug, Deserialize)]
struct NotasPayload {
    notas: String,
}

async fn notas_handler<S, G, J, C>(
    State(service): State<Service<S, G, J, C>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    axum::Json(payload): axum::Json<NotasPayload>,
) -> Response
where
    S: SolicitudRepository + 'static,
    G: AgendaRepository + 'static,
    J: AjusteRepository + 'static,
    C: AsignaturaRepository + 'static,
{
    let actor = match actor_de(&headers) {
        Ok(actor) => actor,
        Err(respuesta) => return respuesta,
    };
    match service.editar_notas(&actor, EntrevistaId(id), payload.notas) {
        Ok(entrevista) => (StatusCode::OK, axum::Json(entrevista)).into_response(),
        Err(error) => respuesta_de_error(error),
    }
}

async fn bloquear_handler<S, G, J, C>(
    State(service): State<Service<S, G, J, C>>,
    headers: HeaderMap,
    axum::Json(peticion): axum::Json<BloquearHorario>,
) -> Response
where
    S: SolicitudRepository + 'static,
    G: AgendaRepository + 'static,
    J: AjusteRepository + 'static,
    C: AsignaturaRepository + 'static,
{
    let actor = match actor_de(&headers) {
        Ok(actor) => actor,
        Err(respuesta) => return respuesta,
    };
    match service.bloquear_horario(&actor, peticion) {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(error) => respuesta_de_error(error),
    }
}

async fn registrar_ajuste_handler<S, G, J, C>(
    State(service): State<Service<S, G, J, C>>,
    headers: HeaderMap,
    axum::Json(peticion): axum::Json<RegistrarAjuste>,
) -> Response
where
    S: SolicitudRepository + 'static,
    G: AgendaRepository + 'static,
    J: AjusteRepository + 'static,
    C: AsignaturaRepository + 'static,
{
    let actor = match actor_de(&headers) {
        Ok(actor) => actor,
        Err(respuesta) => return respuesta,
    };
    match service.registrar_ajuste(&actor, peticion) {
        Ok(ajuste) => (StatusCode::CREATED, axum::Json(ajuste)).into_response(),
        Err(error) => respuesta_de_error(error),
    }
}

async fn aprobacion_handler<S, G, J, C>(
    State(service): State<Service<S, G, J, C>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    axum::Json(aprobacion): axum::Json<AprobacionAjuste>,
) -> Response
where
    S: SolicitudRepository + 'static,
    G: AgendaRepository + 'static,
    J: AjusteRepository + 'static,
    C: AsignaturaRepository + 'static,
{
    let actor = match actor_de(&headers) {
        Ok(actor) => actor,
        Err(respuesta) => return respuesta,
    };
    match service.aprobar_ajuste(&actor, AjusteAsignadoId(id), aprobacion) {
        Ok(ajuste) => (StatusCode::OK, axum::Json(ajuste)).into_response(),
        Err(error) => respuesta_de_error(error),
    }
}

async fn decision_docente_handler<S, G, J, C>(
    State(service): State<Service<S, G, J, C>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    axum::Json(peticion): axum::Json<DecisionSobreAjuste>,
) -> Response
where
    S: SolicitudRepository + 'static,
    G: AgendaRepository + 'static,
    J: AjusteRepository + 'static,
    C: AsignaturaRepository + 'static,
{
    let actor = match actor_de(&headers) {
        Ok(actor) => actor,
        Err(respuesta) => return respuesta,
    };
    match service.decision_docente(&actor, AjusteAsignadoId(id), peticion) {
        Ok(decision) => (StatusCode::OK, axum::Json(decision)).into_response(),
        Err(error) => respuesta_de_error(error),
    }
}
