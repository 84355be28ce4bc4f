//! Request methods understood by the router.

/// Methods with registered handlers. Anything else still parses; it simply
/// never matches a handler and earns a 405.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    /// RFC 2324 §2.1.1
    Brew,
    /// RFC 2324 §2.1.4
    When,
    /// RFC 2324 §2.1.3
    Propfind,
}

impl Method {
    pub const ALL: [Method; 5] = [
        Method::Get,
        Method::Post,
        Method::Brew,
        Method::When,
        Method::Propfind,
    ];

    /// Match an uppercased method token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            "BREW" => Some(Method::Brew),
            "WHEN" => Some(Method::When),
            "PROPFIND" => Some(Method::Propfind),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Brew => "BREW",
            Method::When => "WHEN",
            Method::Propfind => "PROPFIND",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_round_trip() {
        for method in Method::ALL {
            assert_eq!(Method::from_token(method.as_str()), Some(method));
        }
    }

    #[test]
    fn test_unknown_and_lowercase_tokens() {
        assert_eq!(Method::from_token("DELETE"), None);
        assert_eq!(Method::from_token("brew"), None);
    }
}
