//! Pure input validators shared by intake and user management.
//!
//! Every function returns `Ok(())` or a [`ValidationError`] carrying the
//! localized message shown to the requester; none of them panic.

use mime_guess::mime;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("RUT inválido")]
    RutInvalido,
    #[error("La contraseña no puede estar vacía")]
    ContrasenaVacia,
    #[error("La contraseña debe tener al menos 8 caracteres")]
    ContrasenaCorta,
    #[error("La contraseña debe contener al menos una letra")]
    ContrasenaSinLetra,
    #[error("La contraseña debe contener al menos un número")]
    ContrasenaSinNumero,
    #[error("Tipo de archivo no permitido: {extension}")]
    ArchivoNoPermitido { extension: String },
    #[error("Debe aceptar las políticas de privacidad y términos de servicio")]
    ConsentimientoFaltante,
}

/// Validates a Chilean RUT like `"12345678-5"` or `"12.345.678-5"` using the
/// modulo-11 check digit (11 maps to '0', 10 to 'K').
pub fn validar_rut_chileno(rut: &str) -> Result<(), ValidationError> {
    let limpio: String = rut
        .trim()
        .chars()
        .filter(|c| *c != '.' && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if limpio.len() < 7 || limpio.len() > 9 {
        return Err(ValidationError::RutInvalido);
    }

    let (numero, verificador) = limpio.split_at(limpio.len() - 1);
    let verificador = verificador.chars().next().ok_or(ValidationError::RutInvalido)?;

    if !numero.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::RutInvalido);
    }
    if !verificador.is_ascii_digit() && verificador != 'K' {
        return Err(ValidationError::RutInvalido);
    }

    let mut suma: u32 = 0;
    let mut multiplicador = 2;
    for digito in numero.chars().rev() {
        let valor = digito.to_digit(10).ok_or(ValidationError::RutInvalido)?;
        suma += valor * multiplicador;
        multiplicador = if multiplicador == 7 { 2 } else { multiplicador + 1 };
    }

    let calculado = match 11 - (suma % 11) {
        11 => '0',
        10 => 'K',
        resto => char::from_digit(resto, 10).ok_or(ValidationError::RutInvalido)?,
    };

    if calculado == verificador {
        Ok(())
    } else {
        Err(ValidationError::RutInvalido)
    }
}

/// Formats a RUT with thousands dots and the check-digit dash, e.g.
/// `"123456785"` -> `"12.345.678-5"`. Inputs too short to split are returned
/// unchanged.
pub fn formatear_rut(rut: &str) -> String {
    let limpio: String = rut
        .trim()
        .chars()
        .filter(|c| *c != '.' && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if limpio.len() < 2 {
        return rut.to_string();
    }

    let (numero, verificador) = limpio.split_at(limpio.len() - 1);
    let mut formateado = String::new();
    for (i, digito) in numero.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            formateado.insert(0, '.');
        }
        formateado.insert(0, digito);
    }

    format!("{formateado}-{verificador}")
}

/// Password policy: at least 8 characters, one letter, and one digit.
pub fn validar_contrasena(contrasena: &str) -> Result<(), ValidationError> {
    if contrasena.is_empty() {
        return Err(ValidationError::ContrasenaVacia);
    }
    if contrasena.chars().count() < 8 {
        return Err(ValidationError::ContrasenaCorta);
    }
    if !contrasena.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::ContrasenaSinLetra);
    }
    if !contrasena.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::ContrasenaSinNumero);
    }
    Ok(())
}

const EXTENSIONES_PERMITIDAS: [&str; 6] = ["pdf", "doc", "docx", "jpg", "jpeg", "png"];

/// Pre-upload gate for evidence files. Accepts only the documented extension
/// allow-list, cross-checked against the guessed MIME type so renamed
/// executables still land in a document/image family.
pub fn validar_evidencia(nombre_archivo: &str) -> Result<(), ValidationError> {
    let extension = nombre_archivo
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let rechazo = || ValidationError::ArchivoNoPermitido {
        extension: if extension.is_empty() {
            "(sin extensión)".to_string()
        } else {
            format!(".{extension}")
        },
    };

    if !EXTENSIONES_PERMITIDAS.contains(&extension.as_str()) {
        return Err(rechazo());
    }

    let mime = mime_guess::from_path(nombre_archivo).first_or_octet_stream();
    match mime.type_() {
        mime::APPLICATION | mime::IMAGE => Ok(()),
        _ => Err(rechazo()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rut_valido_con_digito_correcto() {
        assert_eq!(validar_rut_chileno("12345678-5"), Ok(()));
        assert_eq!(validar_rut_chileno("12.345.678-5"), Ok(()));
    }

    #[test]
    fn rut_invalido_al_cambiar_el_digito() {
        assert_eq!(
            validar_rut_chileno("12345678-9"),
            Err(ValidationError::RutInvalido)
        );
    }

    #[test]
    fn rut_corto_siempre_invalido() {
        assert_eq!(validar_rut_chileno("123-4"), Err(ValidationError::RutInvalido));
        assert_eq!(validar_rut_chileno(""), Err(ValidationError::RutInvalido));
    }

    #[test]
    fn rut_acepta_digito_k() {
        // 20.347.878 has check digit K under modulo-11.
        assert_eq!(validar_rut_chileno("20347878-K"), Ok(()));
        assert_eq!(validar_rut_chileno("20347878-k"), Ok(()));
    }

    #[test]
    fn rut_rechaza_caracteres_no_numericos() {
        assert_eq!(
            validar_rut_chileno("12a45678-5"),
            Err(ValidationError::RutInvalido)
        );
    }

    #[test]
    fn formatea_rut_con_puntos_y_guion() {
        assert_eq!(formatear_rut("123456785"), "12.345.678-5");
        assert_eq!(formatear_rut("12345678-5"), "12.345.678-5");
        assert_eq!(formatear_rut("1"), "1");
    }

    #[test]
    fn contrasena_corta_es_invalida() {
        assert_eq!(validar_contrasena("abc"), Err(ValidationError::ContrasenaCorta));
    }

    #[test]
    fn contrasena_sin_numero_es_invalida() {
        assert_eq!(
            validar_contrasena("abcdefgh"),
            Err(ValidationError::ContrasenaSinNumero)
        );
    }

    #[test]
    fn contrasena_con_letra_y_numero_es_valida() {
        assert_eq!(validar_contrasena("abcdefg1"), Ok(()));
    }

    #[test]
    fn contrasena_vacia_tiene_mensaje_propio() {
        assert_eq!(validar_contrasena(""), Err(ValidationError::ContrasenaVacia));
    }

    #[test]
    fn evidencia_pdf_se_acepta() {
        assert_eq!(validar_evidencia("informe_medico.pdf"), Ok(()));
        assert_eq!(validar_evidencia("certificado.PNG"), Ok(()));
    }

    #[test]
    fn evidencia_exe_se_rechaza() {
        assert_eq!(
            validar_evidencia("malware.exe"),
            Err(ValidationError::ArchivoNoPermitido {
                extension: ".exe".to_string()
            })
        );
    }

    #[test]
    fn evidencia_sin_extension_se_rechaza() {
        assert!(matches!(
            validar_evidencia("archivo"),
            Err(ValidationError::ArchivoNoPermitido { .. })
        ));
    }
}
