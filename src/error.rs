use thiserror::Error;

/// RouteTableError
///
/// Problems found while validating the route table at startup. These are configuration
/// errors: the process must not start serving with a table that produced one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    #[error("route path `{path}` is registered more than once (normalized: `{normalized}`)")]
    DuplicatePath { path: String, normalized: String },

    #[error("route name `{0}` is registered more than once")]
    DuplicateName(String),

    #[error("route path `{path}` is malformed: {reason}")]
    MalformedPattern { path: String, reason: &'static str },

    #[error("route path `{path}` binds parameter `{param}` twice")]
    DuplicateParam { path: String, param: String },

    #[error("route `{route}` refers to unregistered view `{view}`")]
    UnknownView { route: String, view: String },
}

/// HrefError
///
/// Failures of reverse URL generation. Unlike table errors these surface at call time,
/// because the caller supplies the name and parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HrefError {
    #[error("no route is named `{0}`")]
    UnknownRoute(String),

    #[error("route `{route}` needs a value for `{param}`")]
    MissingParam { route: String, param: String },

    #[error("value for `{param}` must be a single non-empty path component")]
    InvalidParam { param: String },
}
