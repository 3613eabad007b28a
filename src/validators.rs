use crate::errors::ApiError;

/// First non-empty candidate wins; no format checks, GitHub validates logins itself.
pub fn require_username<I>(candidates: I) -> Result<String, ApiError>
where
    I: IntoIterator<Item = Option<String>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
        .ok_or(ApiError::MissingUsername)
}

/// Percent-decoded final segment of `path` below `prefix`, the way
/// `pathname.split('/').pop()` reads a URL. `None` when `path` is not under
/// `prefix` or the segment is not valid UTF-8.
pub fn last_path_segment(path: &str, prefix: &str) -> Option<String> {
    let rest = path.strip_prefix(prefix)?;
    let segment = rest.rsplit('/').next().unwrap_or_default();
    urlencoding::decode(segment).ok().map(|segment| segment.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_missing_values_are_rejected() {
        assert!(matches!(require_username([None]), Err(ApiError::MissingUsername)));
        assert!(matches!(require_username([Some(String::new())]), Err(ApiError::MissingUsername)));
    }

    #[test]
    fn path_value_takes_precedence_over_query() {
        let username = require_username([Some("octocat".to_string()), Some("hubot".to_string())]).unwrap();
        assert_eq!(username, "octocat");

        let username = require_username([None, Some("hubot".to_string())]).unwrap();
        assert_eq!(username, "hubot");
    }

    #[test]
    fn last_segment_wins_for_nested_paths() {
        assert_eq!(last_path_segment("/api/github/octocat", "/api/github").as_deref(), Some("octocat"));
        assert_eq!(last_path_segment("/api/github/x/octocat", "/api/github").as_deref(), Some("octocat"));
        assert_eq!(last_path_segment("/api/github/octo%20cat", "/api/github").as_deref(), Some("octo cat"));
    }

    #[test]
    fn bare_prefix_and_trailing_slash_give_empty_segment() {
        assert_eq!(last_path_segment("/api/github", "/api/github").as_deref(), Some(""));
        assert_eq!(last_path_segment("/api/github/", "/api/github").as_deref(), Some(""));
        assert_eq!(last_path_segment("/api/github/octocat/", "/api/github").as_deref(), Some(""));
        assert_eq!(last_path_segment("/elsewhere/octocat", "/api/github"), None);
    }

    #[test]
    fn whitespace_is_passed_through() {
        assert_eq!(require_username([Some(" ".to_string())]).unwrap(), " ");
    }
}
