//! Request body helpers.

use serde::{Deserialize, Deserializer};

/// Deserialize an optional string, treating `""` (or whitespace only) as absent.
///
/// Partial updates leave a field unchanged when the client sends it blank,
/// so the value never reaches validation.
pub fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "blank_as_none")]
        email: Option<String>,
    }

    fn parse(json: &str) -> Patch {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_blank_is_none() {
        assert_eq!(parse(r#"{"email":""}"#).email, None);
        assert_eq!(parse(r#"{"email":"   "}"#).email, None);
        assert_eq!(parse(r#"{"email":null}"#).email, None);
        assert_eq!(parse("{}").email, None);
    }

    #[test]
    fn test_value_kept() {
        assert_eq!(
            parse(r#"{"email":"jane@example.com"}"#).email.as_deref(),
            Some("jane@example.com")
        );
    }
}
