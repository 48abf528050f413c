use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::services::auth_services::AuthUser;

#[derive(Debug, Deserialize)]
pub struct SignupIn {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginIn {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionOut {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub token_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthOut {
    pub user: AuthUser,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionOut>,
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

impl SignupIn {
    /// Field-level validation, checked before any Supabase call.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.email.trim().is_empty() {
            errors.push("Email é obrigatório".to_string());
        } else if !is_valid_email(self.email.trim()) {
            errors.push("Email inválido".to_string());
        }

        if self.password.chars().count() < 6 {
            errors.push("Senha deve ter pelo menos 6 caracteres".to_string());
        }
        if !self.password.chars().any(|c| c.is_uppercase()) {
            errors.push("Senha deve conter pelo menos uma letra maiúscula".to_string());
        }
        if !self.password.chars().any(|c| c.is_lowercase()) {
            errors.push("Senha deve conter pelo menos uma letra minúscula".to_string());
        }
        if !self.password.chars().any(|c| c.is_ascii_digit()) {
            errors.push("Senha deve conter pelo menos um número".to_string());
        }

        errors
    }
}

impl LoginIn {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.email.trim().is_empty() {
            errors.push("Email é obrigatório".to_string());
        } else if !is_valid_email(self.email.trim()) {
            errors.push("Email inválido".to_string());
        }
        if self.password.chars().count() < 6 {
            errors.push("Senha deve ter pelo menos 6 caracteres".to_string());
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("fulano@mercado.com.br"));
        assert!(!is_valid_email("fulano"));
        assert!(!is_valid_email("fulano@"));
        assert!(!is_valid_email("fu lano@mercado.com"));
    }

    #[test]
    fn signup_password_rules() {
        let weak = SignupIn {
            email: "fulano@mercado.com".to_string(),
            password: "abc".to_string(),
        };
        let errors = weak.validate();
        assert!(errors.contains(&"Senha deve ter pelo menos 6 caracteres".to_string()));
        assert!(errors.contains(&"Senha deve conter pelo menos uma letra maiúscula".to_string()));
        assert!(errors.contains(&"Senha deve conter pelo menos um número".to_string()));

        let strong = SignupIn {
            email: "fulano@mercado.com".to_string(),
            password: "Valido123".to_string(),
        };
        assert!(strong.validate().is_empty());
    }
}
