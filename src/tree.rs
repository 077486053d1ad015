//! The radix tree the router matches against.
//!
//! Patterns are stored as opaque byte sequences: literal runs live on
//! compressed-trie edges, `{name}` / `{name:constraint}` placeholders become
//! dedicated parameter nodes. `/` has no structural meaning in the tree
//! itself, it only terminates parameter values during matching.

use crate::constraint::ConstraintRegistry;
use crate::cors::CorsConfig;
use crate::error::ConfigError;

use http::Method;
use std::collections::HashMap;
use std::{mem, str};

/// A node in the routing tree.
///
/// Either a literal node (a non-empty label, part of one or more literal
/// runs) or a parameter node (label unused, keyed among its siblings by its
/// constraint string). The two kinds never merge.
pub(crate) struct Node<T> {
    label: Vec<u8>,
    is_param: bool,
    constraint: String,
    // Ordered: literal children first, then constrained parameter children
    // in insertion order, then the unconstrained parameter child (if any).
    children: Vec<Node<T>>,
    // None until some pattern terminates at this node.
    handlers: Option<HashMap<Method, T>>,
    // Parameter names accumulated from the root, fixed by the first
    // registration at this node. Only meaningful on terminal nodes.
    param_names: Vec<String>,
    cors: Option<CorsConfig>,
}

impl<T> Node<T> {
    pub(crate) fn root() -> Self {
        Self::literal(Vec::new())
    }

    fn literal(label: Vec<u8>) -> Self {
        Self {
            label,
            is_param: false,
            constraint: String::new(),
            children: Vec::new(),
            handlers: None,
            param_names: Vec::new(),
            cors: None,
        }
    }

    fn param(constraint: String) -> Self {
        Self {
            label: Vec::new(),
            is_param: true,
            constraint,
            children: Vec::new(),
            handlers: None,
            param_names: Vec::new(),
            cors: None,
        }
    }

    pub(crate) fn handlers(&self) -> Option<&HashMap<Method, T>> {
        self.handlers.as_ref()
    }

    pub(crate) fn param_names(&self) -> &[String] {
        &self.param_names
    }

    pub(crate) fn cors(&self) -> Option<&CorsConfig> {
        self.cors.as_ref()
    }

    pub(crate) fn set_cors(&mut self, config: CorsConfig) {
        self.cors = Some(config);
    }

    /// Compiles `pattern` into the tree, returning the terminal node and
    /// the parameter names encountered along the way (in order).
    pub(crate) fn insert_pattern(
        &mut self,
        pattern: &str,
        registry: &ConstraintRegistry,
    ) -> Result<(&mut Node<T>, Vec<String>), ConfigError> {
        let mut names = Vec::new();
        let node = self.compile(pattern.as_bytes(), &mut names, pattern, registry)?;
        Ok((node, names))
    }

    // Consumes the leftmost placeholder first: the literal prefix before it
    // goes through prefix-splitting insertion, then a parameter child keyed
    // by the constraint string picks up the remainder.
    fn compile(
        &mut self,
        rest: &[u8],
        names: &mut Vec<String>,
        pattern: &str,
        registry: &ConstraintRegistry,
    ) -> Result<&mut Node<T>, ConfigError> {
        let malformed = || ConfigError::MalformedPattern {
            pattern: pattern.to_owned(),
        };

        let open = match rest.iter().position(|&b| b == b'{') {
            Some(open) => open,
            None => {
                if rest.contains(&b'}') {
                    return Err(malformed());
                }
                return Ok(self.insert_literal(rest));
            }
        };

        let prefix = &rest[..open];
        if prefix.contains(&b'}') {
            return Err(malformed());
        }

        let after = &rest[open + 1..];
        let close = after
            .iter()
            .position(|&b| b == b'}')
            .ok_or_else(malformed)?;

        let body = &after[..close];
        if body.contains(&b'{') {
            return Err(malformed());
        }

        // The pattern is a &str, so placeholder bodies are valid UTF-8.
        let body = str::from_utf8(body).map_err(|_| malformed())?;
        let (name, constraint) = match body.split_once(':') {
            Some((name, constraint)) => (name, constraint),
            None => (body, ""),
        };

        if name.is_empty() {
            return Err(malformed());
        }
        registry.validate(constraint)?;

        names.push(name.to_owned());

        let node = self.insert_literal(prefix);
        let child = node.param_child(constraint);
        child.compile(&after[close + 1..], names, pattern, registry)
    }

    /// Prefix-splitting insertion of a literal run, returning the node the
    /// run ends at.
    fn insert_literal(&mut self, text: &[u8]) -> &mut Node<T> {
        if text.is_empty() {
            return self;
        }

        for i in 0..self.children.len() {
            if self.children[i].is_param {
                break;
            }

            let lcp = common_prefix(&self.children[i].label, text);
            if lcp == 0 {
                continue;
            }

            if lcp < self.children[i].label.len() {
                self.children[i].split(lcp);
            }

            if lcp == text.len() {
                return &mut self.children[i];
            }
            return self.children[i].insert_literal(&text[lcp..]);
        }

        // No shared prefix anywhere: append a fresh literal node, ahead of
        // any parameter children.
        let pos = self
            .children
            .iter()
            .position(|child| child.is_param)
            .unwrap_or(self.children.len());
        self.children.insert(pos, Node::literal(text.to_vec()));
        &mut self.children[pos]
    }

    // Splits this literal node at `at`: a new child inherits the label
    // suffix along with all handlers, children, and CORS config, so no
    // previously registered route is lost.
    fn split(&mut self, at: usize) {
        debug_assert!(!self.is_param && at < self.label.len());

        let suffix = self.label.split_off(at);
        let mut grandchild = Node::literal(suffix);
        grandchild.children = mem::take(&mut self.children);
        grandchild.handlers = self.handlers.take();
        grandchild.param_names = mem::take(&mut self.param_names);
        grandchild.cors = self.cors.take();

        self.children.push(grandchild);
    }

    // Finds or creates the parameter child for `constraint`, preserving the
    // sibling order invariant: constrained children ahead of the
    // unconstrained one, which always stays last.
    fn param_child(&mut self, constraint: &str) -> &mut Node<T> {
        if let Some(i) = self
            .children
            .iter()
            .position(|child| child.is_param && child.constraint == constraint)
        {
            return &mut self.children[i];
        }

        let pos = if constraint.is_empty() {
            self.children.len()
        } else {
            self.children
                .iter()
                .position(|child| child.is_param && child.constraint.is_empty())
                .unwrap_or(self.children.len())
        };

        self.children
            .insert(pos, Node::param(constraint.to_owned()));
        &mut self.children[pos]
    }

    /// Attaches a handler at this (terminal) node.
    pub(crate) fn register(
        &mut self,
        pattern: &str,
        method: Method,
        handler: T,
        names: Vec<String>,
    ) -> Result<(), ConfigError> {
        let handlers = self.handlers.get_or_insert_with(HashMap::new);
        if handlers.contains_key(&method) {
            return Err(ConfigError::DuplicateRoute {
                pattern: pattern.to_owned(),
                method: method.to_string(),
            });
        }

        // The first registration fixes the node's parameter names; later
        // methods on the same pattern necessarily agree.
        if handlers.is_empty() {
            self.param_names = names;
        }

        handlers.insert(method, handler);
        Ok(())
    }

    /// Matches `path` against this node's subtree.
    ///
    /// Children are tried in order, which by construction means literal
    /// alternatives before parameter alternatives and constrained parameters
    /// before the unconstrained fallback. A rejected alternative backtracks
    /// fully to the next sibling. Only handler-bearing nodes terminate a
    /// match, so nodes that exist purely as split artifacts stay invisible.
    pub(crate) fn find<'p>(
        &self,
        path: &'p [u8],
        registry: &ConstraintRegistry,
    ) -> Option<(&Node<T>, Vec<&'p str>)> {
        if path.is_empty() {
            if self.handlers.is_some() {
                return Some((self, Vec::new()));
            }
            return None;
        }

        for child in &self.children {
            if child.is_param {
                let end = path
                    .iter()
                    .position(|&b| b == b'/')
                    .unwrap_or(path.len());

                let value = match str::from_utf8(&path[..end]) {
                    Ok(value) => value,
                    Err(_) => continue,
                };

                if !registry.is_valid(value, &child.constraint) {
                    continue;
                }

                if let Some((node, mut values)) = child.find(&path[end..], registry) {
                    // Prepend as the recursion unwinds: values end up
                    // ordered outermost-parameter-first.
                    values.insert(0, value);
                    return Some((node, values));
                }
            } else if path.starts_with(&child.label) {
                if let Some(found) = child.find(&path[child.label.len()..], registry) {
                    return Some(found);
                }
            }
        }

        None
    }
}

fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ConstraintRegistry {
        ConstraintRegistry::new()
    }

    fn insert(root: &mut Node<&str>, pattern: &str, handler: &'static str) {
        let reg = registry();
        let (node, names) = root.insert_pattern(pattern, &reg).unwrap();
        node.register(pattern, Method::GET, handler, names).unwrap();
    }

    #[test]
    fn split_preserves_routes() {
        let mut root = Node::root();
        insert(&mut root, "/Sleepers", "sleepers");
        insert(&mut root, "/Sleep", "sleep");

        let reg = registry();
        let (node, _) = root.find(b"/Sleep", &reg).unwrap();
        assert_eq!(node.handlers().unwrap()[&Method::GET], "sleep");
        let (node, _) = root.find(b"/Sleepers", &reg).unwrap();
        assert_eq!(node.handlers().unwrap()[&Method::GET], "sleepers");
    }

    #[test]
    fn split_artifact_does_not_match() {
        let mut root = Node::root();
        insert(&mut root, "/Sleepers", "sleepers");

        let reg = registry();
        assert!(root.find(b"/Sleep", &reg).is_none());
    }

    #[test]
    fn literal_children_precede_params() {
        let mut root = Node::root();
        insert(&mut root, "/eyecolor/{color}", "param");
        insert(&mut root, "/eyecolor/green", "literal");

        let reg = registry();
        let (node, values) = root.find(b"/eyecolor/green", &reg).unwrap();
        assert_eq!(node.handlers().unwrap()[&Method::GET], "literal");
        assert!(values.is_empty());

        let (node, values) = root.find(b"/eyecolor/blue", &reg).unwrap();
        assert_eq!(node.handlers().unwrap()[&Method::GET], "param");
        assert_eq!(values, ["blue"]);
    }

    #[test]
    fn constrained_param_gets_first_refusal() {
        for patterns in [
            ["/tag/{v}", "/tag/{v:digits}"],
            ["/tag/{v:digits}", "/tag/{v}"],
        ] {
            let mut root = Node::root();
            insert(&mut root, patterns[0], patterns[0]);
            insert(&mut root, patterns[1], patterns[1]);

            let reg = registry();
            let (node, _) = root.find(b"/tag/123", &reg).unwrap();
            assert!(node.handlers().unwrap()[&Method::GET].contains("digits"));

            let (node, _) = root.find(b"/tag/abc", &reg).unwrap();
            assert!(!node.handlers().unwrap()[&Method::GET].contains("digits"));
        }
    }

    #[test]
    fn malformed_patterns() {
        let reg = registry();
        let mut root: Node<&str> = Node::root();
        for pattern in ["/a/{id", "/a/id}", "/a/{{id}", "/a/{}"] {
            assert_eq!(
                root.insert_pattern(pattern, &reg).err(),
                Some(ConfigError::MalformedPattern {
                    pattern: pattern.to_owned()
                }),
                "{pattern}"
            );
        }
    }
}
