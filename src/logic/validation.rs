//! Field Validation
//!
//! Input checks for every form in the app. Messages are shown to the user
//! as-is, in the clinic's language.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, AppResult};
use crate::logic::auth::password::constant_time_compare;
use crate::logic::records::types::{NewPatient, NewSessionNote};

static UPPERCASE: Lazy<Regex> = Lazy::new(|| Regex::new("[A-Z]").unwrap());
static LOWERCASE: Lazy<Regex> = Lazy::new(|| Regex::new("[a-z]").unwrap());
static DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new("[0-9]").unwrap());
static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

fn require_length(
    value: &str,
    min: usize,
    max: usize,
    too_short: &str,
    too_long: &str,
) -> AppResult<()> {
    let length = value.trim().chars().count();
    if length < min {
        return Err(AppError::Validation(too_short.to_string()));
    }
    if length > max {
        return Err(AppError::Validation(too_long.to_string()));
    }
    Ok(())
}

/// Patient registration form
pub fn validate_new_patient(patient: &NewPatient) -> AppResult<()> {
    require_length(
        &patient.name,
        3,
        100,
        "Nome deve ter pelo menos 3 caracteres",
        "Nome não pode exceder 100 caracteres",
    )?;
    require_length(
        &patient.phone,
        10,
        20,
        "Telefone inválido",
        "Telefone não pode exceder 20 caracteres",
    )?;
    require_length(
        &patient.pathology,
        3,
        200,
        "Patologia deve ter pelo menos 3 caracteres",
        "Patologia não pode exceder 200 caracteres",
    )?;
    require_length(
        &patient.session_package,
        1,
        50,
        "Pacote de sessões é obrigatório",
        "Pacote de sessões não pode exceder 50 caracteres",
    )?;
    Ok(())
}

/// Session note form
pub fn validate_session_note(session: &NewSessionNote) -> AppResult<()> {
    require_length(
        &session.evolution,
        10,
        1000,
        "Evolução deve ter pelo menos 10 caracteres",
        "Evolução não pode exceder 1000 caracteres",
    )
}

/// Kiosk password setup form
pub fn validate_password_setup(password: &str, confirmation: &str) -> AppResult<()> {
    if password.chars().count() < 4 {
        return Err(AppError::Validation(
            "A senha deve ter pelo menos 4 caracteres".to_string(),
        ));
    }
    if !constant_time_compare(password, confirmation) {
        return Err(AppError::Validation("As senhas não coincidem".to_string()));
    }
    Ok(())
}

/// Account sign-up form (name, e-mail, strong password)
pub fn validate_sign_up(full_name: &str, email: &str, password: &str) -> AppResult<()> {
    require_length(
        full_name,
        3,
        100,
        "Nome deve ter pelo menos 3 caracteres",
        "Nome não pode exceder 100 caracteres",
    )?;

    let email = email.trim();
    if email.chars().count() > 255 {
        return Err(AppError::Validation(
            "Email não pode exceder 255 caracteres".to_string(),
        ));
    }
    if !EMAIL.is_match(email) {
        return Err(AppError::Validation("Email inválido".to_string()));
    }

    require_length(
        password,
        8,
        100,
        "Senha deve ter pelo menos 8 caracteres",
        "Senha não pode exceder 100 caracteres",
    )?;
    if !UPPERCASE.is_match(password) {
        return Err(AppError::Validation(
            "Senha deve conter pelo menos uma letra maiúscula".to_string(),
        ));
    }
    if !LOWERCASE.is_match(password) {
        return Err(AppError::Validation(
            "Senha deve conter pelo menos uma letra minúscula".to_string(),
        ));
    }
    if !DIGIT.is_match(password) {
        return Err(AppError::Validation(
            "Senha deve conter pelo menos um número".to_string(),
        ));
    }
    Ok(())
}

/// Kiosk survey: an emoji pick is mandatory, the phrase is optional.
pub fn validate_evaluation(emoji: &str) -> AppResult<()> {
    if emoji.trim().is_empty() {
        return Err(AppError::Validation(
            "Por favor, selecione um emoji".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn valid_patient() -> NewPatient {
        NewPatient {
            name: "Ana Souza".to_string(),
            phone: "11999990000".to_string(),
            pathology: "Lesão no joelho".to_string(),
            session_package: "10 sessões".to_string(),
            treatment_start_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            photo_url: None,
        }
    }

    fn message(result: AppResult<()>) -> String {
        match result {
            Err(AppError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_patient_passes() {
        assert!(validate_new_patient(&valid_patient()).is_ok());
    }

    #[test]
    fn test_patient_field_messages() {
        let mut p = valid_patient();
        p.name = "Jo".to_string();
        assert_eq!(
            message(validate_new_patient(&p)),
            "Nome deve ter pelo menos 3 caracteres"
        );

        let mut p = valid_patient();
        p.phone = "119".to_string();
        assert_eq!(message(validate_new_patient(&p)), "Telefone inválido");

        let mut p = valid_patient();
        p.session_package = "  ".to_string();
        assert_eq!(
            message(validate_new_patient(&p)),
            "Pacote de sessões é obrigatório"
        );
    }

    #[test]
    fn test_whitespace_does_not_count_toward_length() {
        let mut p = valid_patient();
        p.name = "  A  ".to_string();
        assert!(validate_new_patient(&p).is_err());
    }

    #[test]
    fn test_session_note_length() {
        let short = NewSessionNote {
            patient_id: uuid::Uuid::new_v4(),
            session_date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            evolution: "Melhorou".to_string(),
        };
        assert_eq!(
            message(validate_session_note(&short)),
            "Evolução deve ter pelo menos 10 caracteres"
        );
    }

    #[test]
    fn test_password_setup_rules() {
        assert_eq!(
            message(validate_password_setup("abc", "abc")),
            "A senha deve ter pelo menos 4 caracteres"
        );
        assert_eq!(
            message(validate_password_setup("abcd", "abce")),
            "As senhas não coincidem"
        );
        assert!(validate_password_setup("fisio2024", "fisio2024").is_ok());
    }

    #[test]
    fn test_sign_up_rules() {
        assert_eq!(
            message(validate_sign_up("Ana", "ana-sem-arroba", "Senha123")),
            "Email inválido"
        );
        assert_eq!(
            message(validate_sign_up("Ana", "ana@clinica.com", "senha123")),
            "Senha deve conter pelo menos uma letra maiúscula"
        );
        assert_eq!(
            message(validate_sign_up("Ana", "ana@clinica.com", "SENHA123")),
            "Senha deve conter pelo menos uma letra minúscula"
        );
        assert_eq!(
            message(validate_sign_up("Ana", "ana@clinica.com", "SenhaForte")),
            "Senha deve conter pelo menos um número"
        );
        assert!(validate_sign_up("Ana Souza", "ana@clinica.com", "Senha123").is_ok());
    }

    #[test]
    fn test_evaluation_requires_emoji() {
        assert_eq!(
            message(validate_evaluation("")),
            "Por favor, selecione um emoji"
        );
        assert!(validate_evaluation("😀").is_ok());
    }
}
