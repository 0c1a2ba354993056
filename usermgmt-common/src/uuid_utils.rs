//! UUID utilities

use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Generate a new UUIDv4 as its hyphenated string form
///
/// User identifiers are stored and compared as strings.
pub fn generate_string() -> String {
    generate().to_string()
}

/// Parse UUID from string
pub fn parse(s: &str) -> Result<Uuid, uuid::Error> {
    Uuid::parse_str(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(generate_string(), generate_string());
    }

    #[test]
    fn test_generated_string_parses() {
        let id = generate_string();
        assert_eq!(parse(&id).unwrap().to_string(), id);
    }
}
