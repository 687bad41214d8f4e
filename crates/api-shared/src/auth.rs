//! Bearer-token authentication helpers.

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing Authorization header")]
    Missing,
    #[error("Authorization header is not a bearer token")]
    Malformed,
    #[error("invalid bearer token")]
    Invalid,
}

/// Formats the `Authorization` header value for `token`.
pub fn bearer_header_value(token: &str) -> String {
    format!("{BEARER_PREFIX}{token}")
}

/// Validates an `Authorization` header value against the expected token.
///
/// Returns `Ok(())` if the header carries exactly `Bearer <expected>`.
pub fn validate_bearer(header: Option<&str>, expected: &str) -> Result<(), AuthError> {
    let header = header.ok_or(AuthError::Missing)?;
    let token = header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::Malformed)?;

    if token == expected {
        Ok(())
    } else {
        Err(AuthError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_matching_token() {
        let header = bearer_header_value("s3cret");
        assert_eq!(validate_bearer(Some(&header), "s3cret"), Ok(()));
    }

    #[test]
    fn test_rejects_missing_malformed_and_wrong_tokens() {
        assert_eq!(validate_bearer(None, "s3cret"), Err(AuthError::Missing));
        assert_eq!(
            validate_bearer(Some("Basic dXNlcjpwYXNz"), "s3cret"),
            Err(AuthError::Malformed)
        );
        assert_eq!(validate_bearer(Some("Bearer "), "s3cret"), Err(AuthError::Malformed));
        assert_eq!(
            validate_bearer(Some("Bearer guess"), "s3cret"),
            Err(AuthError::Invalid)
        );
    }
}
