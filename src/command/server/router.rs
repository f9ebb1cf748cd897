use hyper::{Method, Uri};

pub const STATUS_PATH: &str = "/status";

#[derive(Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    Status,
    Unknown,
}

impl Route {
    pub fn action_name(&self) -> &'static str {
        match self {
            Route::Login => "login",
            Route::Status => "status",
            Route::Unknown => "unknown",
        }
    }
}

/// Only strategies handing out credentials mount a login route.
pub fn parse(method: &Method, uri: &Uri, login_path: Option<&str>) -> Route {
    let path = uri.path();

    match login_path {
        Some(login_path) if method == Method::POST && path == login_path => {
            return Route::Login;
        }
        _ => {}
    }

    match path {
        STATUS_PATH if method == Method::GET => Route::Status,
        _ => Route::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(value: &str) -> Uri {
        value.parse().unwrap()
    }

    #[test]
    fn test_parse_login() {
        let route = parse(&Method::POST, &uri("/login"), Some("/login"));
        assert_eq!(route, Route::Login);

        let route = parse(&Method::POST, &uri("/login?next=/status"), Some("/login"));
        assert_eq!(route, Route::Login);
    }

    #[test]
    fn test_parse_login_requires_post() {
        let route = parse(&Method::GET, &uri("/login"), Some("/login"));
        assert_eq!(route, Route::Unknown);
    }

    #[test]
    fn test_parse_login_not_mounted() {
        let route = parse(&Method::POST, &uri("/login"), None);
        assert_eq!(route, Route::Unknown);
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse(&Method::GET, &uri("/status"), None), Route::Status);
        assert_eq!(
            parse(&Method::GET, &uri("/status?apikey=abc"), Some("/login")),
            Route::Status
        );
        assert_eq!(parse(&Method::POST, &uri("/status"), None), Route::Unknown);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(parse(&Method::GET, &uri("/"), None), Route::Unknown);
        assert_eq!(parse(&Method::GET, &uri("/status/"), None), Route::Unknown);
        assert_eq!(
            parse(&Method::DELETE, &uri("/ingest"), Some("/login")),
            Route::Unknown
        );
    }

    #[test]
    fn test_action_name() {
        assert_eq!(Route::Login.action_name(), "login");
        assert_eq!(Route::Status.action_name(), "status");
        assert_eq!(Route::Unknown.action_name(), "unknown");
    }
}
