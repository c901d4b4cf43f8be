use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

const COMMON_PASSWORDS: [&str; 8] = [
    "password1",
    "12345678",
    "123456789",
    "qwerty123",
    "admin123",
    "abcd1234",
    "letmein1",
    "welcome1",
];

/// 邮箱统一为小写并去除首尾空白
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_name(name: &str) -> Result<(), &'static str> {
    let length = name.trim().chars().count();
    if !(2..=64).contains(&length) {
        return Err("Name length must be between 2 and 64 characters");
    }
    if name.chars().any(char::is_control) {
        return Err("Name must not contain control characters");
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.len() > 254 || !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 密码策略：至少 8 位，包含大写、小写字母和数字，且不是常见弱密码
///
/// 返回所有未满足的规则，用分号拼接。
pub fn validate_password(password: &str) -> Result<(), String> {
    let mut errors = Vec::new();

    if password.chars().count() < 8 {
        errors.push("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one digit");
    }
    if COMMON_PASSWORDS
        .iter()
        .any(|weak| password.eq_ignore_ascii_case(weak))
    {
        errors.push("Password is too common, please choose a stronger password");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_rules() {
        assert!(validate_name("Ada Lovelace").is_ok());
        assert!(validate_name("李雷").is_ok());
        assert!(validate_name(" a ").is_err());
        assert!(validate_name(&"x".repeat(65)).is_err());
        assert!(validate_name("bad\u{0007}name").is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("student@eduplatform.com").is_ok());
        assert!(validate_email("first.last+lms@school.edu").is_ok());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("user@host").is_err());
        assert_eq!(normalize_email("  Alice@EduPlatform.com "), "alice@eduplatform.com");
    }

    #[test]
    fn test_strong_password_accepted() {
        assert!(validate_password("SecurePass123").is_ok());
        assert!(validate_password("MyC0urses!").is_ok());
    }

    #[test]
    fn test_weak_passwords_report_every_rule() {
        let err = validate_password("abc").unwrap_err();
        assert!(err.contains("at least 8 characters"));
        assert!(err.contains("uppercase"));
        assert!(err.contains("digit"));

        let err = validate_password("Password1").unwrap_err();
        assert!(err.contains("too common"));
    }
}
