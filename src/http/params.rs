//! Query parameter coercion.
//!
//! `lyrics` and `songdata` follow two different rules that clients rely on:
//! `lyrics` is off unless given with a value other than `false`, while
//! `songdata` is on unless given with a value other than `true`.

use rouille::Request;

/// A parameter that must be present and non-empty.
pub fn required(request: &Request, name: &str) -> Option<String> {
    request.get_param(name).filter(|value| !value.is_empty())
}

pub fn lyrics_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty() && v.to_lowercase() != "false")
}

pub fn songdata_flag(value: Option<&str>) -> bool {
    !value.is_some_and(|v| !v.is_empty() && v.to_lowercase() != "true")
}

pub fn lyrics(request: &Request) -> bool {
    lyrics_flag(request.get_param("lyrics").as_deref())
}

pub fn songdata(request: &Request) -> bool {
    songdata_flag(request.get_param("songdata").as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lyrics_flag() {
        assert!(!lyrics_flag(None));
        assert!(!lyrics_flag(Some("")));
        assert!(!lyrics_flag(Some("false")));
        assert!(!lyrics_flag(Some("FALSE")));
        assert!(lyrics_flag(Some("true")));
        assert!(lyrics_flag(Some("0")));
        assert!(lyrics_flag(Some("no")));
    }

    #[test]
    fn test_songdata_flag() {
        assert!(songdata_flag(None));
        assert!(songdata_flag(Some("")));
        assert!(songdata_flag(Some("true")));
        assert!(songdata_flag(Some("True")));
        assert!(!songdata_flag(Some("false")));
        assert!(!songdata_flag(Some("1")));
        assert!(!songdata_flag(Some("yes")));
    }

    #[test]
    fn test_required_rejects_empty() {
        let request = Request::fake_http("GET", "/song/?query=&id=42", vec![], vec![]);

        assert_eq!(required(&request, "query"), None);
        assert_eq!(required(&request, "id"), Some("42".to_string()));
        assert_eq!(required(&request, "missing"), None);
    }
}
