// Input validation rules shared by the request structs.
// Messages are user-facing and in Portuguese.

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

pub static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap()
});

/// Allowed upload extensions for avatars and post images.
pub static IMAGE_EXTENSION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(jpe?g|png|gif)$").unwrap());

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Password policy: at least eight characters containing uppercase,
/// lowercase, digit and special character.
pub fn is_valid_password(password: &str) -> bool {
    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_alphanumeric());
    password.chars().count() >= 8 && has_uppercase && has_lowercase && has_digit && has_special
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if is_valid_password(password) {
        Ok(())
    } else {
        let mut error = ValidationError::new("password_policy");
        error.message = Some(
            "Senha inválida, senha deve conter pelo menos um caractér maiúsculo, minúsculo, \
             numérico e especial, além de ter pelo menos oito dígitos."
                .into(),
        );
        Err(error)
    }
}

/// Confirmation codes issued by the identity provider are exactly six
/// characters long.
pub fn is_valid_confirmation_code(code: &str) -> bool {
    code.chars().count() == 6
}

pub fn validate_confirmation_code(code: &str) -> Result<(), ValidationError> {
    if is_valid_confirmation_code(code) {
        Ok(())
    } else {
        let mut error = ValidationError::new("confirmation_code");
        error.message = Some("Código de confirmação inválido".into());
        Err(error)
    }
}

pub fn is_allowed_image(filename: &str) -> bool {
    IMAGE_EXTENSION_REGEX.is_match(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_conforming_password() {
        assert!(is_valid_password("Abcdef1!"));
    }

    #[test]
    fn rejects_password_without_classes() {
        // no uppercase, digit or special
        assert!(!is_valid_password("abcdefgh"));
    }

    #[test]
    fn rejects_short_password() {
        assert!(!is_valid_password("Abc1!"));
    }

    #[test]
    fn email_regex_basics() {
        assert!(is_valid_email("pessoa@example.com.br"));
        assert!(!is_valid_email("pessoa@"));
        assert!(!is_valid_email("sem-arroba.com"));
    }

    #[test]
    fn confirmation_code_must_have_six_chars() {
        assert!(is_valid_confirmation_code("123456"));
        assert!(!is_valid_confirmation_code("12345"));
        assert!(!is_valid_confirmation_code("1234567"));
    }

    #[test]
    fn image_extensions() {
        assert!(is_allowed_image("foto.jpg"));
        assert!(is_allowed_image("FOTO.JPEG"));
        assert!(is_allowed_image("avatar.png"));
        assert!(is_allowed_image("anim.gif"));
        assert!(!is_allowed_image("script.exe"));
        assert!(!is_allowed_image("sem_extensao"));
    }
}
