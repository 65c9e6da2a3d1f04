//! Public intake guard.
//!
//! The anonymous submission form is the only unauthenticated entry point, so
//! every field is validated here before a `Solicitud` record exists. Rejection
//! happens before any write.

use serde::{Deserialize, Serialize};

use crate::validators::{
    formatear_rut, validar_contrasena, validar_evidencia, validar_rut_chileno, ValidationError,
};

use super::domain::{AsignaturaId, Estudiante};

/// Raw submission as received from the public form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolicitudEnviada {
    pub asunto: String,
    pub descripcion: String,
    pub autorizacion_datos: bool,
    pub nombres: String,
    pub apellidos: String,
    pub rut: String,
    pub email: String,
    pub carrera: String,
    #[serde(default)]
    pub asignaturas: Vec<AsignaturaId>,
    /// File names of attached evidence; content is stored by a collaborator.
    #[serde(default)]
    pub evidencias: Vec<String>,
    /// Present when the student also creates an account in the same step.
    #[serde(default)]
    pub contrasena: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error(transparent)]
    Validacion(#[from] ValidationError),
    #[error("el campo {0} es obligatorio")]
    CampoObligatorio(&'static str),
}

/// Validated payload ready for the service to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolicitudValidada {
    pub asunto: String,
    pub descripcion: String,
    pub estudiante: Estudiante,
    pub asignaturas: Vec<AsignaturaId>,
    pub evidencias: Vec<String>,
}

/// Rejects the submission unless consent was given, the RUT checks out, every
/// evidence file is of an allowed type, and the optional password meets the
/// policy. The RUT is stored in its dotted display format regardless of how
/// the student typed it.
pub fn validar_solicitud(envio: SolicitudEnviada) -> Result<SolicitudValidada, IntakeError> {
    if !envio.autorizacion_datos {
        return Err(ValidationError::ConsentimientoFaltante.into());
    }
    for (campo, valor) in [
        ("asunto", &envio.asunto),
        ("nombres", &envio.nombres),
        ("apellidos", &envio.apellidos),
        ("email", &envio.email),
        ("carrera", &envio.carrera),
    ] {
        if valor.trim().is_empty() {
            return Err(IntakeError::CampoObligatorio(campo));
        }
    }
    validar_rut_chileno(&envio.rut)?;
    for evidencia in &envio.evidencias {
        validar_evidencia(evidencia)?;
    }
    if let Some(contrasena) = &envio.contrasena {
        validar_contrasena(contrasena)?;
    }

    Ok(SolicitudValidada {
        asunto: envio.asunto,
        descripcion: envio.descripcion,
        estudiante: Estudiante {
            nombres: envio.nombres,
            apellidos: envio.apellidos,
            rut: formatear_rut(&envio.rut),
            email: envio.email,
            carrera: envio.carrera,
        },
        asignaturas: envio.asignaturas,
        evidencias: envio.evidencias,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envio() -> SolicitudEnviada {
        SolicitudEnviada {
            asunto: "Apoyo en evaluaciones".to_string(),
            descripcion: "Tiempo adicional por diagnóstico TDAH".to_string(),
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

    #[test]
    fn envio_completo_pasa() {
        let validada = validar_solicitud(envio()).unwrap();
        assert_eq!(validada.estudiante.rut, "12.345.678-5");
        assert_eq!(validada.asignaturas, vec![AsignaturaId(1)]);
    }

    #[test]
    fn sin_consentimiento_se_rechaza_antes_de_todo() {
        let mut e = envio();
        e.autorizacion_datos = false;
        e.rut = "no-es-rut".to_string();
        assert_eq!(
            validar_solicitud(e),
            Err(IntakeError::Validacion(
                ValidationError::ConsentimientoFaltante
            ))
        );
    }

    #[test]
    fn el_rut_queda_en_formato_con_puntos() {
        let mut e = envio();
        e.rut = "123456785".to_string();
        let validada = validar_solicitud(e).unwrap();
        assert_eq!(validada.estudiante.rut, "12.345.678-5");
    }

    #[test]
    fn rut_invalido_se_rechaza() {
        let mut e = envio();
        e.rut = "12345678-9".to_string();
        assert_eq!(
            validar_solicitud(e),
            Err(IntakeError::Validacion(ValidationError::RutInvalido))
        );
    }

    #[test]
    fn evidencia_ejecutable_se_rechaza() {
        let mut e = envio();
        e.evidencias.push("instalador.exe".to_string());
        assert!(matches!(
            validar_solicitud(e),
            Err(IntakeError::Validacion(
                ValidationError::ArchivoNoPermitido { .. }
            ))
        ));
    }

    #[test]
    fn contrasena_debil_se_rechaza() {
        let mut e = envio();
        e.contrasena = Some("abc".to_string());
        assert_eq!(
            validar_solicitud(e),
            Err(IntakeError::Validacion(ValidationError::ContrasenaCorta))
        );
    }

    #[test]
    fn campos_obligatorios_vacios_se_senalan() {
        let mut e = envio();
        e.carrera = "  ".to_string();
        assert_eq!(
            validar_solicitud(e),
            Err(IntakeError::CampoObligatorio("carrera"))
        );
    }
}
