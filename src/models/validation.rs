// Shared field checks used by the request models

use serde::{Deserialize, Deserializer};

/// シンプルなメールフォーマット検証。
/// 正規表現を使わず、`split('@')` などで最小限のルールをチェックしている。
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || local.len() > 64 {
        return false;
    }

    if domain.is_empty() || domain.len() > 253 || domain.contains('@') {
        return false;
    }

    // Domain should contain at least one dot, and not at either end
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }

    let valid_local = |c: char| c.is_alphanumeric() || ".-_+".contains(c);
    let valid_domain = |c: char| c.is_alphanumeric() || ".-".contains(c);

    local.chars().all(valid_local) && domain.chars().all(valid_domain)
}

/// Usernames are restricted to a URL-safe alphabet.
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_.-".contains(c))
}

pub fn is_valid_phone(phone: &str) -> bool {
    phone.chars().any(|c| c.is_ascii_digit())
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || "+-() ".contains(c))
}

pub fn is_valid_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));

    match rest {
        Some(rest) => !rest.is_empty() && !rest.chars().any(char::is_whitespace),
        None => false,
    }
}

/// Counts characters rather than bytes so non-ASCII text gets the same limit.
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Checks a required text field after trimming.
pub fn require_text(field: &str, value: &str, max: usize) -> Result<(), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{} cannot be empty", field));
    }
    if char_len(trimmed) > max {
        return Err(format!("{} cannot exceed {} characters", field, max));
    }
    Ok(())
}

/// Checks an optional text field that may legitimately be blank.
pub fn limit_text(field: &str, value: &str, max: usize) -> Result<(), String> {
    if char_len(value.trim()) > max {
        return Err(format!("{} cannot exceed {} characters", field, max));
    }
    Ok(())
}

/// Validates an optional media/avatar reference; blank means "clear".
pub fn optional_url(field: &str, value: Option<&str>) -> Result<(), String> {
    if let Some(url) = value.map(str::trim).filter(|u| !u.is_empty()) {
        if char_len(url) > 500 {
            return Err(format!("{} cannot exceed 500 characters", field));
        }
        if !is_valid_url(url) {
            return Err(format!("{} must be an http(s) URL", field));
        }
    }
    Ok(())
}

/// 空白のみの文字列は `None` に畳み込む。
pub fn normalize_optional(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Escapes `LIKE` metacharacters so user input is matched literally.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Distinguishes an absent JSON key (`None`) from an explicit `null`
/// (`Some(None)`) when combined with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("test@example.com"));
        assert!(is_valid_email("user.name@domain.co.uk"));
        assert!(is_valid_email("user+tag@example.org"));

        assert!(!is_valid_email("invalid"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@domain"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("a@b@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_username_validation() {
        assert!(is_valid_username("dicaprio"));
        assert!(is_valid_username("leo_d.caprio-1"));

        assert!(!is_valid_username(""));
        assert!(!is_valid_username("leo dicaprio"));
        assert!(!is_valid_username("leo@home"));
    }

    #[test]
    fn test_phone_validation() {
        assert!(is_valid_phone("+1 (555) 123-4567"));
        assert!(!is_valid_phone("call me"));
        assert!(!is_valid_phone("+-()"));
    }

    #[test]
    fn test_url_validation() {
        assert!(is_valid_url("https://cdn.example.com/a.png"));
        assert!(is_valid_url("http://localhost/img.jpg"));

        assert!(!is_valid_url("ftp://example.com/a.png"));
        assert!(!is_valid_url("https://"));
        assert!(!is_valid_url("https://example.com/a b.png"));
    }

    #[test]
    fn test_text_limits_count_characters() {
        assert!(require_text("Content", &"é".repeat(10), 10).is_ok());
        assert!(require_text("Content", &"é".repeat(11), 10).is_err());
        assert_eq!(
            require_text("Content", "   ", 10).unwrap_err(),
            "Content cannot be empty"
        );
        assert!(limit_text("Bio", "", 10).is_ok());
    }

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("leo"), "%leo%");
        assert_eq!(like_pattern("100%_"), "%100\\%\\_%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_normalize_optional() {
        assert_eq!(normalize_optional(Some(&"  hi ".to_string())), Some("hi".to_string()));
        assert_eq!(normalize_optional(Some(&"   ".to_string())), None);
        assert_eq!(normalize_optional(None), None);
    }
}
