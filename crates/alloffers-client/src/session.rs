use percent_encoding::percent_decode_str;

/// Name of the cookie holding the anti-forgery token.
pub const CSRF_COOKIE: &str = "csrftoken";

/// Header mutating requests must echo the token in.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Browser session state the client replays: the raw cookie header and the
/// CSRF token extracted from it. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Session {
    cookies: Option<String>,
    csrf_token: Option<String>,
}

impl Session {
    /// Session without cookies. Read-only endpoints still work.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Build from a `Cookie` header value such as
    /// `sessionid=abc; csrftoken=xyz`.
    pub fn from_cookie_header(header: &str) -> Self {
        let header = header.trim();
        if header.is_empty() {
            return Self::anonymous();
        }
        Self {
            csrf_token: cookie_value(header, CSRF_COOKIE),
            cookies: Some(header.to_string()),
        }
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    pub fn cookie_header(&self) -> Option<&str> {
        self.cookies.as_deref()
    }
}

/// Value of the first cookie called `name`, percent-decoded.
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
        .map(|raw| percent_decode_str(raw).decode_utf8_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csrf_token_found_among_other_cookies() {
        let session = Session::from_cookie_header("sessionid=s3cr3t; csrftoken=AbC123; theme=dark");
        assert_eq!(session.csrf_token(), Some("AbC123"));
        assert_eq!(session.cookie_header(), Some("sessionid=s3cr3t; csrftoken=AbC123; theme=dark"));
    }

    #[test]
    fn cookie_value_is_percent_decoded() {
        assert_eq!(cookie_value("csrftoken=a%2Bb%3D", CSRF_COOKIE).as_deref(), Some("a+b="));
    }

    #[test]
    fn prefix_named_cookie_does_not_match() {
        assert_eq!(cookie_value("csrftokenx=nope; other=1", CSRF_COOKIE), None);
    }

    #[test]
    fn empty_header_is_anonymous() {
        let session = Session::from_cookie_header("   ");
        assert!(session.csrf_token().is_none());
        assert!(session.cookie_header().is_none());
    }
}
