use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for postal codes (PIN codes)
    /// Exactly six ASCII digits
    /// - Valid: "388001", "110001"
    /// - Invalid: "38800", "3880012", "38800a", " 388001"
    pub static ref POSTAL_CODE_REGEX: Regex = Regex::new(r"^[0-9]{6}$").unwrap();

    /// Regex for validating username fields
    /// Must start with letter or underscore and contain only alphanumeric characters and underscores
    /// - Valid: "john_doe", "user123", "_admin", "JohnDoe"
    /// - Invalid: "123user", "-user", "user-name", "user name"
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();
}

/// Whether `value` is a well-formed 6-digit postal code
pub fn is_valid_postal_code(value: &str) -> bool {
    POSTAL_CODE_REGEX.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postal_code_regex_valid() {
        assert!(is_valid_postal_code("388001"));
        assert!(is_valid_postal_code("110001"));
        assert!(is_valid_postal_code("000000"));
    }

    #[test]
    fn test_postal_code_regex_invalid() {
        assert!(!is_valid_postal_code("38800")); // too short
        assert!(!is_valid_postal_code("3880012")); // too long
        assert!(!is_valid_postal_code("38800a")); // letter
        assert!(!is_valid_postal_code(" 388001")); // whitespace
        assert!(!is_valid_postal_code("")); // empty
        assert!(!is_valid_postal_code("３８８００１")); // full-width digits
    }

    #[test]
    fn test_username_regex() {
        assert!(USERNAME_REGEX.is_match("john_doe"));
        assert!(USERNAME_REGEX.is_match("_admin"));
        assert!(!USERNAME_REGEX.is_match("123user"));
        assert!(!USERNAME_REGEX.is_match("user name"));
    }
}
