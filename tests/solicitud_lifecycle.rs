use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use inclusion_flow::workflows::casework::{
    Actor, AgendarEntrevista, AprobacionAjuste, Asignatura, AsignaturaId, Avance, CaseworkConfig,
    CaseworkError, CaseworkService, Confirmacion, DecisionDocente, DecisionSobreAjuste,
    EstadoAprobacion, EstadoSolicitud, FeriadosChile, MemoryAgenda, MemoryAjustes,
    MemoryAsignaturas, MemorySolicitudes, Modalidad, PerfilId, Rechazo, RegistrarAjuste,
    ResultadoEntrevista, Rol, Solicitud, SolicitudEnviada, TransitionError,
};

type Servicio = CaseworkService<MemorySolicitudes, MemoryAgenda, MemoryAjustes, MemoryAsignaturas>;

const DOCENTE_CALCULO: u64 = 50;

fn servicio() -> Arc<Servicio> {
    let asignaturas = MemoryAsignaturas::default();
    use inclusion_flow::workflows::casework::AsignaturaRepository;
    asignaturas
        .insert(Asignatura {
            id: AsignaturaId(1),
            nombre: "Cálculo I".to_string(),
            seccion: "001".to_string(),
            docente: PerfilId(DOCENTE_CALCULO),
        })
        .expect("seed asignatura");

    Arc::new(CaseworkService::new(
        Arc::new(MemorySolicitudes::default()),
        Arc::new(MemoryAgenda::default()),
        Arc::new(MemoryAjustes::default()),
        Arc::new(asignaturas),
        Arc::new(FeriadosChile),
        CaseworkConfig::default(),
    ))
}

fn envio() -> SolicitudEnviada {
    SolicitudEnviada {
        asunto: "Apoyo en evaluaciones".to_string(),
        descripcion: "Requiere tiempo adicional por diagnóstico".to_string(),
        autorizacion_datos: true,
        nombres: "Ana".to_string(),
        apellidos: "Rojas".to_string(),
        rut: "12.345.678-5".to_string(),
        email: "ana.rojas@example.cl".to_string(),
        carrera: "Ingeniería Civil".to_string(),
        asignaturas: vec![AsignaturaId(1)],
        evidencias: vec!["informe_medico.pdf".to_string()],
        contrasena: None,
    }
}

fn encargada() -> Actor {
    Actor::staff(PerfilId(10), Rol::EncargadoInclusion)
}

fn coordinador() -> Actor {
    Actor::staff(PerfilId(20), Rol::CoordinadorTecnicoPedagogico)
}

fn asesor() -> Actor {
    Actor::staff(PerfilId(30), Rol::AsesorPedagogico)
}

fn director() -> Actor {
    Actor::staff(PerfilId(40), Rol::DirectorCarrera)
}

fn avance() -> Avance {
    Avance {
        siguiente_responsable: None,
        nota: None,
    }
}

/// Books and confirms an interview so the request can leave its first state.
fn entrevista_realizada(servicio: &Servicio, solicitud: &Solicitud, dia: u32) {
    let entrevista = servicio
        .agendar(
            &encargada(),
            AgendarEntrevista {
                solicitud_id: solicitud.id,
                fecha_agendar: NaiveDate::from_ymd_opt(2026, 9, dia).expect("weekday"),
                hora_agendar: NaiveTime::from_hms_opt(9, 0, 0).expect("valid hour"),
                modalidad: Modalidad::Presencial,
                notas: String::new(),
            },
        )
        .expect("entrevista agendada");
    servicio
        .confirmar(
            &encargada(),
            entrevista.id,
            Confirmacion {
                resultado: ResultadoEntrevista::Realizada,
                notas_adicionales: None,
            },
        )
        .expect("entrevista confirmada");
}

#[test]
fn ciclo_completo_hasta_aprobado() {
    let servicio = servicio();
    let solicitud = servicio.submit_solicitud(envio()).expect("intake valido");
    assert_eq!(solicitud.estado, EstadoSolicitud::PendienteEntrevista);

    entrevista_realizada(&servicio, &solicitud, 7);

    let solicitud = servicio
        .avanzar(&encargada(), solicitud.id, avance())
        .expect("pasa a formulacion de caso");
    assert_eq!(solicitud.estado, EstadoSolicitud::PendienteFormulacionCaso);

    let solicitud = servicio
        .avanzar(&coordinador(), solicitud.id, avance())
        .expect("pasa a formulacion de ajustes");
    assert_eq!(solicitud.estado, EstadoSolicitud::PendienteFormulacionAjustes);

    let ajuste = servicio
        .registrar_ajuste(
            &coordinador(),
            RegistrarAjuste {
                solicitud_id: solicitud.id,
                descripcion: "Tiempo adicional en evaluaciones".to_string(),
                categoria: "Evaluación".to_string(),
            },
        )
        .expect("ajuste registrado");
    assert_eq!(ajuste.estado_aprobacion, EstadoAprobacion::Pendiente);

    let solicitud = servicio
        .avanzar(&coordinador(), solicitud.id, avance())
        .expect("pasa a preaprobacion");
    assert_eq!(solicitud.estado, EstadoSolicitud::PendientePreaprobacion);

    let solicitud = servicio
        .avanzar(&asesor(), solicitud.id, avance())
        .expect("pasa a aprobacion");
    assert_eq!(solicitud.estado, EstadoSolicitud::PendienteAprobacion);

    // The final gate stays closed while the adjustment is unresolved.
    let bloqueado = servicio.avanzar(&director(), solicitud.id, avance());
    assert!(matches!(
        bloqueado,
        Err(CaseworkError::Transicion(
            TransitionError::AjustesSinAprobar { pendientes: 1 }
        ))
    ));

    let ajuste = servicio
        .aprobar_ajuste(
            &director(),
            ajuste.id,
            AprobacionAjuste {
                aprobado: true,
                comentarios: "Conforme".to_string(),
            },
        )
        .expect("ajuste aprobado");
    assert_eq!(ajuste.director_aprobador, Some(director().perfil));

    let solicitud = servicio
        .avanzar(&director(), solicitud.id, avance())
        .expect("solicitud aprobada");
    assert_eq!(solicitud.estado, EstadoSolicitud::Aprobado);

    let detalle = servicio
        .detalle(&director(), solicitud.id)
        .expect("detalle disponible");
    assert_eq!(detalle.entrevistas.len(), 1);
    assert_eq!(detalle.ajustes.len(), 1);
}

#[test]
fn el_rol_de_salida_gobierna_cada_transicion() {
    let servicio = servicio();
    let solicitud = servicio.submit_solicitud(envio()).expect("intake valido");
    entrevista_realizada(&servicio, &solicitud, 8);
    let solicitud = servicio
        .avanzar(&encargada(), solicitud.id, avance())
        .expect("pasa a formulacion de caso");

    // The pedagogical advisor cannot leave the coordinator's state.
    let negado = servicio.avanzar(&asesor(), solicitud.id, avance());
    assert!(matches!(negado, Err(CaseworkError::NoAutorizado(_))));

    let solicitud = servicio
        .avanzar(&coordinador(), solicitud.id, avance())
        .expect("el coordinador si puede");
    assert_eq!(solicitud.estado, EstadoSolicitud::PendienteFormulacionAjustes);
}

#[test]
fn superuser_omite_el_control_de_rol() {
    let servicio = servicio();
    let solicitud = servicio.submit_solicitud(envio()).expect("intake valido");
    entrevista_realizada(&servicio, &solicitud, 9);

    let admin = Actor::superuser(PerfilId(99));
    let solicitud = servicio
        .avanzar(&admin, solicitud.id, avance())
        .expect("superuser avanza");
    assert_eq!(solicitud.estado, EstadoSolicitud::PendienteFormulacionCaso);
}

#[test]
fn sin_entrevista_realizada_no_se_avanza() {
    let servicio = servicio();
    let solicitud = servicio.submit_solicitud(envio()).expect("intake valido");

    let negado = servicio.avanzar(&encargada(), solicitud.id, avance());
    assert!(matches!(
        negado,
        Err(CaseworkError::Transicion(
            TransitionError::SinEntrevistaRealizada
        ))
    ));
}

#[test]
fn el_director_rechaza_desde_cualquier_estado_no_terminal() {
    let servicio = servicio();
    let solicitud = servicio.submit_solicitud(envio()).expect("intake valido");

    // Only the director may reject.
    let negado = servicio.rechazar(
        &coordinador(),
        solicitud.id,
        Rechazo { motivo: None },
    );
    assert!(matches!(negado, Err(CaseworkError::NoAutorizado(_))));

    let solicitud = servicio
        .rechazar(
            &director(),
            solicitud.id,
            Rechazo {
                motivo: Some("Evidencia insuficiente".to_string()),
            },
        )
        .expect("rechazo valido");
    assert_eq!(solicitud.estado, EstadoSolicitud::Rechazado);
    assert_eq!(
        solicitud.nota_resolucion.as_deref(),
        Some("Evidencia insuficiente")
    );

    // Terminal: nothing moves it again.
    let terminal = servicio.rechazar(&director(), solicitud.id, Rechazo { motivo: None });
    assert!(matches!(
        terminal,
        Err(CaseworkError::Transicion(
            TransitionError::SolicitudTerminal(EstadoSolicitud::Rechazado)
        ))
    ));
    let terminal = servicio.avanzar(&director(), solicitud.id, avance());
    assert!(matches!(
        terminal,
        Err(CaseworkError::Transicion(TransitionError::SolicitudTerminal(_)))
    ));
}

#[test]
fn decision_docente_exige_dictar_la_asignatura() {
    let servicio = servicio();
    let solicitud = servicio.submit_solicitud(envio()).expect("intake valido");
    entrevista_realizada(&servicio, &solicitud, 10);

    let ajuste = servicio
        .registrar_ajuste(
            &coordinador(),
            RegistrarAjuste {
                solicitud_id: solicitud.id,
                descripcion: "Material accesible".to_string(),
                categoria: "Material".to_string(),
            },
        )
        .expect("ajuste registrado");

    let ajeno = Actor::staff(PerfilId(51), Rol::Docente);
    let negado = servicio.decision_docente(
        &ajeno,
        ajuste.id,
        DecisionSobreAjuste {
            decision: DecisionDocente::Aprobado,
            comentario: String::new(),
        },
    );
    assert!(matches!(negado, Err(CaseworkError::NoAutorizado(_))));

    let titular = Actor::staff(PerfilId(DOCENTE_CALCULO), Rol::Docente);
    let decision = servicio
        .decision_docente(
            &titular,
            ajuste.id,
            DecisionSobreAjuste {
                decision: DecisionDocente::Rechazado,
                comentario: "No aplicable en terreno".to_string(),
            },
        )
        .expect("el titular decide");
    assert_eq!(decision.decision, DecisionDocente::Rechazado);

    // Re-recording overwrites the previous decision for the same pair.
    let decision = servicio
        .decision_docente(
            &titular,
            ajuste.id,
            DecisionSobreAjuste {
                decision: DecisionDocente::Aprobado,
                comentario: "Acordado con la estudiante".to_string(),
            },
        )
        .expect("decision actualizada");
    assert_eq!(decision.decision, DecisionDocente::Aprobado);

    let detalle = servicio
        .detalle(&coordinador(), solicitud.id)
        .expect("detalle disponible");
    assert_eq!(detalle.ajustes[0].decisiones_docentes.len(), 1);
    assert_eq!(
        detalle.ajustes[0].decisiones_docentes[0].decision,
        DecisionDocente::Aprobado
    );
}

#[test]
fn intake_invalido_no_crea_registros() {
    let servicio = servicio();

    let mut sin_consentimiento = envio();
    sin_consentimiento.autorizacion_datos = false;
    assert!(matches!(
        servicio.submit_solicitud(sin_consentimiento),
        Err(CaseworkError::Intake(_))
    ));

    let mut rut_malo = envio();
    rut_malo.rut = "12345678-9".to_string();
    assert!(matches!(
        servicio.submit_solicitud(rut_malo),
        Err(CaseworkError::Intake(_))
    ));

    let solicitudes = servicio
        .listar(&director())
        .expect("listado disponible");
    assert!(solicitudes.is_empty());
}
