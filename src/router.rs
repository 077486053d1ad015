use crate::constraint::{Constraint, ConstraintRegistry};
use crate::cors::{self, CorsConfig, CorsRequest};
use crate::error::{ConfigError, MatchError};
use crate::params::Params;
use crate::tree::Node;

use http::{HeaderMap, Method};
use log::debug;
use std::collections::HashMap;

/// A URL router: patterns with typed path constraints, per-method handlers,
/// and per-route CORS policies, matched over a compressed radix tree.
///
/// Registration is a single-threaded startup activity; every registration
/// call returns a [`ConfigError`] for programmer mistakes (malformed
/// patterns, duplicate routes, unknown constraints) and callers are expected
/// to fail fast on them. Once registration is done the router is logically
/// immutable and [`resolve`](Router::resolve) may be called from any number
/// of threads concurrently.
///
/// ```rust
/// use trailmap::Router;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut router = Router::new();
/// router.get("/home", "Welcome!")?;
/// router.get("/users/{id:int32}", "A User")?;
///
/// let resource = router.resolve("/users/978")?;
/// assert_eq!(resource.params.get("id"), Some("978"));
/// # Ok(())
/// # }
/// ```
pub struct Router<T> {
    root: Node<T>,
    constraints: ConstraintRegistry,
    global_cors: Option<CorsConfig>,
}

impl<T> Router<T> {
    /// Creates an empty router. The constraint registry starts out loaded
    /// with the built-in constraints.
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            constraints: ConstraintRegistry::new(),
            global_cors: None,
        }
    }

    /// Registers `handler` for `method` requests matching `pattern`.
    ///
    /// Patterns are literal byte sequences interleaved with `{name}`,
    /// `{name:constraint}` or `{name:constraint(args)}` placeholders. A
    /// placeholder matches everything up to the next `/` (or the end of the
    /// path), subject to its constraint.
    ///
    /// Constraints referenced by the pattern must already be registered,
    /// so custom constraints go in before the routes using them.
    pub fn insert(&mut self, pattern: &str, method: Method, handler: T) -> Result<(), ConfigError> {
        let (node, names) = self.root.insert_pattern(pattern, &self.constraints)?;
        node.register(pattern, method.clone(), handler, names)?;

        debug!("registered route {} {}", method, pattern);
        Ok(())
    }

    /// Register a handler for GET requests.
    pub fn get(&mut self, pattern: &str, handler: T) -> Result<(), ConfigError> {
        self.insert(pattern, Method::GET, handler)
    }

    /// Register a handler for HEAD requests.
    pub fn head(&mut self, pattern: &str, handler: T) -> Result<(), ConfigError> {
        self.insert(pattern, Method::HEAD, handler)
    }

    /// Register a handler for OPTIONS requests.
    pub fn options(&mut self, pattern: &str, handler: T) -> Result<(), ConfigError> {
        self.insert(pattern, Method::OPTIONS, handler)
    }

    /// Register a handler for POST requests.
    pub fn post(&mut self, pattern: &str, handler: T) -> Result<(), ConfigError> {
        self.insert(pattern, Method::POST, handler)
    }

    /// Register a handler for PUT requests.
    pub fn put(&mut self, pattern: &str, handler: T) -> Result<(), ConfigError> {
        self.insert(pattern, Method::PUT, handler)
    }

    /// Register a handler for PATCH requests.
    pub fn patch(&mut self, pattern: &str, handler: T) -> Result<(), ConfigError> {
        self.insert(pattern, Method::PATCH, handler)
    }

    /// Register a handler for DELETE requests.
    pub fn delete(&mut self, pattern: &str, handler: T) -> Result<(), ConfigError> {
        self.insert(pattern, Method::DELETE, handler)
    }

    /// Installs the router-wide default CORS policy, used by every route
    /// without a policy of its own.
    pub fn set_global_cors(&mut self, config: CorsConfig) {
        debug!("global CORS policy set");
        self.global_cors = Some(config);
    }

    /// Attaches `config` to `pattern`, replacing any policy the route
    /// already carries. The pattern's node is created if it does not exist
    /// yet; a later `insert` for the same pattern picks it up.
    pub fn set_cors(&mut self, pattern: &str, config: CorsConfig) -> Result<(), ConfigError> {
        let (node, _) = self.root.insert_pattern(pattern, &self.constraints)?;
        node.set_cors(config);

        debug!("CORS policy set for {}", pattern);
        Ok(())
    }

    /// Attaches the global policy overlaid with `config` to `pattern`.
    ///
    /// The merge keeps the global list entries first and appends `config`'s
    /// additions (duplicates dropped); `config`'s scalar fields win. The
    /// merge happens here, at registration time, never per request.
    pub fn add_cors(&mut self, pattern: &str, config: CorsConfig) -> Result<(), ConfigError> {
        let mut merged = match &self.global_cors {
            Some(global) => global.clone(),
            None => return Err(ConfigError::MissingGlobalCors),
        };
        merged.merge(&config);

        let (node, _) = self.root.insert_pattern(pattern, &self.constraints)?;
        node.set_cors(merged);

        debug!("CORS policy merged onto global for {}", pattern);
        Ok(())
    }

    /// Registers a custom constraint under its declared name.
    pub fn add_constraint(&mut self, constraint: Box<dyn Constraint>) -> Result<(), ConfigError> {
        debug!("adding constraint '{}'", constraint.name());
        self.constraints.add(constraint)
    }

    /// Registers a batch of custom constraints.
    pub fn add_constraints(
        &mut self,
        constraints: Vec<Box<dyn Constraint>>,
    ) -> Result<(), ConfigError> {
        for constraint in constraints {
            self.add_constraint(constraint)?;
        }
        Ok(())
    }

    /// Resolves a concrete request path to a [`Resource`].
    ///
    /// A path no pattern matches is a normal outcome and comes back as
    /// [`MatchError::NotFound`]; picking the handler for the request's
    /// method (and answering method-not-allowed when there is none) is the
    /// caller's job.
    pub fn resolve<'p>(&self, path: &'p str) -> Result<Resource<'_, 'p, T>, MatchError> {
        let (node, values) = self
            .root
            .find(path.as_bytes(), &self.constraints)
            .ok_or(MatchError::NotFound)?;

        // `find` only terminates at handler-bearing nodes.
        let handlers = node.handlers().ok_or(MatchError::NotFound)?;

        Ok(Resource {
            handlers,
            params: Params::new(node.param_names(), &values),
            cors: node.cors().or(self.global_cors.as_ref()),
        })
    }

    /// Returns the methods implemented by the route matching `path`, sorted
    /// for deterministic output. Empty when no route matches.
    pub fn allowed(&self, path: &str) -> Vec<Method> {
        let mut methods: Vec<Method> = match self.resolve(path) {
            Ok(resource) => resource.methods().cloned().collect(),
            Err(MatchError::NotFound) => return Vec::new(),
        };

        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The result of a successful path match: the matched route's
/// method→handler mapping, the parameter values the path bound, and the
/// effective CORS policy. A transient, read-only view into the router.
pub struct Resource<'r, 'p, T> {
    handlers: &'r HashMap<Method, T>,
    /// The path parameters, in declaration order.
    pub params: Params<'r, 'p>,
    cors: Option<&'r CorsConfig>,
}

impl<'r, 'p, T> Resource<'r, 'p, T> {
    /// Returns the handler registered for `method`, if any. `None` is the
    /// dispatcher's cue to answer method-not-allowed.
    pub fn handler(&self, method: &Method) -> Option<&'r T> {
        self.handlers.get(method)
    }

    /// Returns `true` if a handler is registered for `method`.
    pub fn allows(&self, method: &Method) -> bool {
        self.handlers.contains_key(method)
    }

    /// Returns the methods this resource implements, in no particular
    /// order.
    pub fn methods(&self) -> impl Iterator<Item = &'r Method> + '_ {
        self.handlers.keys()
    }

    /// The effective CORS policy: the route's own if set, else the router's
    /// global one, else none (CORS is a no-op for this resource).
    pub fn cors(&self) -> Option<&'r CorsConfig> {
        self.cors
    }

    /// Evaluates the effective CORS policy against a request.
    ///
    /// Returns the headers to append to the response; an empty map for a
    /// disallowed origin, a failed preflight, an origin-less request, or a
    /// resource without any policy. Never an error: CORS outcomes are
    /// additive headers, not statuses.
    pub fn cors_headers(&self, request: &CorsRequest<'_>) -> HeaderMap {
        match self.cors {
            Some(policy) => cors::evaluate(policy, request, |m| self.handlers.contains_key(m)),
            None => HeaderMap::new(),
        }
    }
}
