#![deny(clippy::all)]
#![forbid(unsafe_code)]

//! A high performance URL router with typed path constraints and per-route
//! CORS policies.
//!
//! Registered patterns are stored in a compressing radix tree, so lookups
//! stay fast even with long paths and large route sets. Patterns mix
//! literal text with named parameters, and parameters can carry a
//! constraint restricting what they bind to:
//!
//! ```text
//! /blog/{category}/{post}           unconstrained parameters
//! /users/{id:int32}                 built-in typed constraint
//! /api/{version:int(1,3)}           constraint with arguments
//! ```
//!
//! Matching tries literal alternatives before parameters, and constrained
//! parameters before unconstrained ones, backtracking across siblings, so a
//! request path resolves to exactly one route or to none.
//!
//! ```rust
//! use trailmap::{CorsConfig, Method, Router};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut router = Router::new();
//! router.get("/home", "Welcome!")?;
//! router.get("/users/{id:int32}", "A User")?;
//! router.post("/users/{id:int32}", "Update a User")?;
//!
//! router.set_global_cors(CorsConfig {
//!     origins: vec!["*".into()],
//!     methods: vec![Method::GET, Method::POST],
//!     ..CorsConfig::default()
//! });
//!
//! let resource = router.resolve("/users/978")?;
//! assert_eq!(resource.params.get("id"), Some("978"));
//! assert_eq!(resource.handler(&Method::GET), Some(&"A User"));
//! assert!(resource.cors().is_some());
//! # Ok(())
//! # }
//! ```
//!
//! Routes, constraints, and CORS policies are registered once at startup;
//! registration mistakes surface immediately as [`ConfigError`]. After
//! that the router is read-only and [`Router::resolve`] is safe to call
//! from any number of threads.

mod constraint;
mod cors;
mod error;
mod params;
mod router;
mod tree;

pub use constraint::{Constraint, ConstraintRegistry};
pub use cors::{CorsConfig, CorsRequest};
pub use error::{ConfigError, MatchError};
pub use params::{Params, ParamsIter};
pub use router::{Resource, Router};

pub use http::Method;
