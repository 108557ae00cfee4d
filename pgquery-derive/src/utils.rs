//! Utility functions for code generation

/// Convert string to snake_case
pub fn snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            result.push('_');
        }
        result.extend(c.to_lowercase());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("UserId"), "user_id");
        assert_eq!(snake_case("user_id"), "user_id");
        assert_eq!(snake_case("User"), "user");
        assert_eq!(snake_case("createdAt"), "created_at");
    }
}
