use percent_encoding::percent_decode_str;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::{
    access::AccessLevel,
    error::{HrefError, RouteTableError},
    view::{ViewDescriptor, ViewRegistry},
};

/// RouteDefinition
///
/// One row of the route table: a path pattern, the route's display name, the view it
/// renders and, optionally, the minimum access level needed to see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    pub path: String,
    pub name: String,
    pub view: String,
    /// `None` means the page is public.
    pub access: Option<AccessLevel>,
}

impl RouteDefinition {
    pub fn new(path: &str, name: &str, view: &str) -> Self {
        Self {
            path: path.to_string(),
            name: name.to_string(),
            view: view.to_string(),
            access: None,
        }
    }

    pub fn access(mut self, level: AccessLevel) -> Self {
        self.access = Some(level);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

#[derive(Debug, Clone)]
struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    fn parse(path: &str) -> Result<Self, RouteTableError> {
        let malformed = |reason| RouteTableError::MalformedPattern {
            path: path.to_string(),
            reason,
        };

        if !path.starts_with('/') {
            return Err(malformed("must start with `/`"));
        }
        if path.contains(['?', '#']) {
            return Err(malformed("must not carry a query or fragment"));
        }

        let mut seen = HashSet::new();
        let mut segments = Vec::new();
        for raw in path.split('/').filter(|s| !s.is_empty()) {
            match raw.strip_prefix(':') {
                Some(name) => {
                    if name.is_empty() {
                        return Err(malformed("dynamic segment has no name"));
                    }
                    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                        return Err(malformed("dynamic segment name must be alphanumeric"));
                    }
                    if !seen.insert(name) {
                        return Err(RouteTableError::DuplicateParam {
                            path: path.to_string(),
                            param: name.to_string(),
                        });
                    }
                    segments.push(Segment::Param(name.to_string()));
                }
                None => segments.push(Segment::Static(raw.to_string())),
            }
        }
        Ok(Self { segments })
    }

    fn is_static(&self) -> bool {
        self.segments.iter().all(|s| matches!(s, Segment::Static(_)))
    }

    fn static_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Static(_)))
            .count()
    }

    /// Shape used for uniqueness: parameter names and letter case do not distinguish two
    /// patterns.
    fn shape(&self) -> String {
        let parts: Vec<String> = self
            .segments
            .iter()
            .map(|s| match s {
                Segment::Static(lit) => lit.to_lowercase(),
                Segment::Param(_) => ":".to_string(),
            })
            .collect();
        format!("/{}", parts.join("/"))
    }

    fn capture(&self, components: &[&str]) -> Option<BTreeMap<String, String>> {
        if components.len() != self.segments.len() {
            return None;
        }
        let mut params = BTreeMap::new();
        for (segment, component) in self.segments.iter().zip(components) {
            match segment {
                Segment::Static(lit) if lit.to_lowercase() == component.to_lowercase() => {}
                Segment::Static(_) => return None,
                Segment::Param(name) => {
                    let value = percent_decode_str(component).decode_utf8_lossy();
                    params.insert(name.clone(), value.into_owned());
                }
            }
        }
        Some(params)
    }
}

#[derive(Debug)]
struct CompiledRoute {
    definition: RouteDefinition,
    pattern: PathPattern,
}

/// A successful lookup: the matched definition plus the values bound to its dynamic
/// segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub route: &'a RouteDefinition,
    pub params: BTreeMap<String, String>,
}

/// Resolution
///
/// The outcome of looking a path up in the table. Missing routes are an ordinary
/// outcome carrying the catch-all view, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    Matched(RouteMatch<'a>),
    NotFound { path: String, view: &'a str },
}

impl Resolution<'_> {
    pub fn required_access(&self) -> Option<AccessLevel> {
        match self {
            Resolution::Matched(m) => m.route.access,
            Resolution::NotFound { .. } => None,
        }
    }

    pub fn view(&self) -> &str {
        match self {
            Resolution::Matched(m) => &m.route.view,
            Resolution::NotFound { view, .. } => view,
        }
    }
}

/// RouteTable
///
/// The validated, immutable page map of the console. Built once at startup; every
/// navigation afterwards is a pure lookup against it.
#[derive(Debug)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
    exact: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    not_found_view: String,
    base: Vec<String>,
    views: ViewRegistry,
}

impl RouteTable {
    /// build
    ///
    /// Validates `definitions` against the view registry and compiles their patterns.
    /// Paths must be unique once parameter names are ignored, names must be unique and
    /// every view (including the catch-all `not_found_view`) must be registered. The
    /// table takes ownership of the registry so lookups can rely on that check.
    pub fn build(
        definitions: Vec<RouteDefinition>,
        not_found_view: &str,
        views: ViewRegistry,
    ) -> Result<Self, RouteTableError> {
        if !views.contains(not_found_view) {
            return Err(RouteTableError::UnknownView {
                route: "<not found>".to_string(),
                view: not_found_view.to_string(),
            });
        }

        let mut routes = Vec::with_capacity(definitions.len());
        let mut shapes: HashMap<String, usize> = HashMap::new();
        let mut exact = HashMap::new();
        let mut by_name = HashMap::new();

        for definition in definitions {
            let pattern = PathPattern::parse(&definition.path)?;
            let shape = pattern.shape();
            let index = routes.len();

            if shapes.insert(shape.clone(), index).is_some() {
                return Err(RouteTableError::DuplicatePath {
                    path: definition.path,
                    normalized: shape,
                });
            }
            if by_name.insert(definition.name.clone(), index).is_some() {
                return Err(RouteTableError::DuplicateName(definition.name));
            }
            if !views.contains(&definition.view) {
                return Err(RouteTableError::UnknownView {
                    route: definition.name,
                    view: definition.view,
                });
            }
            if pattern.is_static() {
                exact.insert(shape, index);
            }
            routes.push(CompiledRoute {
                definition,
                pattern,
            });
        }

        tracing::debug!(routes = routes.len(), "route table validated");

        Ok(Self {
            routes,
            exact,
            by_name,
            not_found_view: not_found_view.to_string(),
            base: Vec::new(),
            views,
        })
    }

    /// Mounts the table under `base` (e.g. `/console`). Incoming paths must carry the
    /// prefix and generated hrefs include it.
    pub fn with_base_path(mut self, base: &str) -> Self {
        self.base = components(base).into_iter().map(str::to_string).collect();
        self
    }

    pub fn base_path(&self) -> String {
        format!("/{}", self.base.join("/"))
    }

    pub fn not_found_view(&self) -> &str {
        &self.not_found_view
    }

    pub fn views(&self) -> &ViewRegistry {
        &self.views
    }

    /// Loads the view a resolution of this table points at. Lazy views run their loader
    /// here, once.
    pub(crate) fn load_view(&self, resolution: &Resolution<'_>) -> ViewDescriptor {
        self.views
            .resolve(resolution.view())
            .expect("view ids are checked against the registry when the table is built")
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RouteDefinition> {
        self.routes.iter().map(|r| &r.definition)
    }

    pub fn get(&self, name: &str) -> Option<&RouteDefinition> {
        self.by_name.get(name).map(|&i| &self.routes[i].definition)
    }

    /// resolve
    ///
    /// Looks `path` up. Query string, fragment, empty segments and the trailing slash are
    /// ignored, and literal segments match regardless of letter case. An exact static
    /// route always wins; otherwise the dynamic pattern with the most literal segments
    /// wins, and table order breaks ties. Bound parameter values are percent-decoded.
    pub fn resolve(&self, path: &str) -> Resolution<'_> {
        let all = components(path);
        let Some(parts) = self.strip_base(&all) else {
            return self.not_found(path);
        };

        let key = format!("/{}", parts.join("/")).to_lowercase();
        if let Some(&index) = self.exact.get(&key) {
            return Resolution::Matched(RouteMatch {
                route: &self.routes[index].definition,
                params: BTreeMap::new(),
            });
        }

        let mut best: Option<(usize, &CompiledRoute, BTreeMap<String, String>)> = None;
        for route in self.routes.iter().filter(|r| !r.pattern.is_static()) {
            let Some(params) = route.pattern.capture(parts) else {
                continue;
            };
            let score = route.pattern.static_count();
            if best.as_ref().is_none_or(|(top, _, _)| score > *top) {
                best = Some((score, route, params));
            }
        }

        match best {
            Some((_, route, params)) => Resolution::Matched(RouteMatch {
                route: &route.definition,
                params,
            }),
            None => self.not_found(path),
        }
    }

    /// href
    ///
    /// Builds the URL of the route called `name`, filling its dynamic segments from
    /// `params`.
    pub fn href(&self, name: &str, params: &[(&str, &str)]) -> Result<String, HrefError> {
        let index = self
            .by_name
            .get(name)
            .ok_or_else(|| HrefError::UnknownRoute(name.to_string()))?;
        let route = &self.routes[*index];

        let mut parts: Vec<&str> = self.base.iter().map(String::as_str).collect();
        for segment in &route.pattern.segments {
            match segment {
                Segment::Static(lit) => parts.push(lit),
                Segment::Param(param) => {
                    let value = params
                        .iter()
                        .find(|(key, _)| *key == param.as_str())
                        .map(|(_, value)| *value)
                        .ok_or_else(|| HrefError::MissingParam {
                            route: name.to_string(),
                            param: param.clone(),
                        })?;
                    if value.is_empty() || value.contains(['/', '?', '#']) {
                        return Err(HrefError::InvalidParam {
                            param: param.clone(),
                        });
                    }
                    parts.push(value);
                }
            }
        }
        Ok(format!("/{}", parts.join("/")))
    }

    fn strip_base<'p>(&self, parts: &'p [&'p str]) -> Option<&'p [&'p str]> {
        if parts.len() < self.base.len() {
            return None;
        }
        let (head, rest) = parts.split_at(self.base.len());
        head.iter()
            .zip(&self.base)
            .all(|(a, b)| *a == b.as_str())
            .then_some(rest)
    }

    fn not_found(&self, path: &str) -> Resolution<'_> {
        Resolution::NotFound {
            path: path.to_string(),
            view: &self.not_found_view,
        }
    }
}

/// Splits a request path into its non-empty components, dropping query and fragment.
fn components(path: &str) -> Vec<&str> {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path[..end].split('/').filter(|s| !s.is_empty()).collect()
}
