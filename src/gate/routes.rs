use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One entry of the static route table. Absence of `public` in the config
/// means the route is protected.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct RouteDescriptor {
    /// Path pattern; segments starting with ':' match any single segment,
    /// e.g. "/resume/:id".
    pub path: String,
    pub name: String,
    #[serde(default)]
    pub public: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouteClass {
    Public,
    Protected,
}

/// Immutable route classification table, built once at startup from config
/// and consumed, never mutated, by the gate.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDescriptor>) -> Self {
        RouteTable { routes }
    }

    pub fn find(&self, path: &str) -> Option<&RouteDescriptor> {
        self.routes.iter().find(|route| matches(&route.path, path))
    }

    /// Unknown paths classify as protected (fail-closed).
    pub fn classify(&self, path: &str) -> RouteClass {
        match self.find(path) {
            Some(route) if route.public => RouteClass::Public,
            _ => RouteClass::Protected,
        }
    }
}

fn matches(pattern: &str, path: &str) -> bool {
    let pattern_segments: Vec<&str> = pattern.trim_matches('/').split('/').collect();
    let path_segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    if pattern_segments.len() != path_segments.len() {
        return false;
    }
    pattern_segments
        .iter()
        .zip(&path_segments)
        .all(|(pat, seg)| pat.starts_with(':') || pat == seg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::new(vec![
            RouteDescriptor {
                path: "/".to_string(),
                name: "home".to_string(),
                public: true,
            },
            RouteDescriptor {
                path: "/profile".to_string(),
                name: "profile".to_string(),
                public: false,
            },
            RouteDescriptor {
                path: "/resume/:id".to_string(),
                name: "resume".to_string(),
                public: false,
            },
        ])
    }

    #[test]
    fn test_classify_public_and_protected() {
        let table = table();
        assert_eq!(table.classify("/"), RouteClass::Public);
        assert_eq!(table.classify("/profile"), RouteClass::Protected);
    }

    #[test]
    fn test_classify_parameterized_route() {
        let table = table();
        assert_eq!(table.find("/resume/42").unwrap().name, "resume");
        assert_eq!(table.classify("/resume/42"), RouteClass::Protected);
    }

    /// Paths not in the table fail closed.
    #[test]
    fn test_unknown_path_is_protected() {
        let table = table();
        assert!(table.find("/nowhere").is_none());
        assert_eq!(table.classify("/nowhere"), RouteClass::Protected);
        assert_eq!(table.classify("/resume/42/extra"), RouteClass::Protected);
    }
}
