//! Named predicates restricting the values a path parameter may bind to.
//!
//! A pattern like `/users/{id:int32}` only matches when the candidate
//! segment satisfies the `int32` constraint. Constraints are looked up by
//! name in a [`ConstraintRegistry`], which ships with a set of built-ins
//! and accepts user-supplied implementations of [`Constraint`].

use crate::error::ConfigError;

use std::collections::HashMap;

/// A named predicate over candidate parameter values.
///
/// Implementations must be pure, fast, and synchronous: `check` runs on
/// the request path for every candidate segment the matcher tries.
///
/// ```
/// use trailmap::{Constraint, Router};
///
/// struct Even;
///
/// impl Constraint for Even {
///     fn name(&self) -> &str {
///         "even"
///     }
///
///     fn check(&self, value: &str, _args: &[&str]) -> bool {
///         value.parse::<i64>().map_or(false, |n| n % 2 == 0)
///     }
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut router = Router::new();
/// router.add_constraint(Box::new(Even))?;
/// router.get("/seats/{n:even}", "even seat")?;
/// # Ok(())
/// # }
/// ```
pub trait Constraint: Send + Sync {
    /// The name patterns use to reference this constraint.
    fn name(&self) -> &str;

    /// Returns `true` if `value` may bind to a parameter carrying this
    /// constraint. `args` holds the raw arguments from a
    /// `name(arg1,arg2,...)` expression, uninterpreted by the router.
    fn check(&self, value: &str, args: &[&str]) -> bool;
}

/// The set of constraints available to a router's patterns.
pub struct ConstraintRegistry {
    inner: HashMap<String, Box<dyn Constraint>>,
}

impl ConstraintRegistry {
    /// Creates a registry pre-loaded with the built-in constraints.
    pub fn new() -> Self {
        let mut registry = Self {
            inner: HashMap::new(),
        };

        for builtin in builtins() {
            // Built-in names are distinct, this cannot fail.
            let _ = registry.add(builtin);
        }

        registry
    }

    /// Registers a constraint under its declared name.
    pub fn add(&mut self, constraint: Box<dyn Constraint>) -> Result<(), ConfigError> {
        let name = constraint.name().to_owned();
        if self.inner.contains_key(&name) {
            return Err(ConfigError::DuplicateConstraint { name });
        }

        self.inner.insert(name, constraint);
        Ok(())
    }

    /// Checks a constraint expression for well-formedness and a known name.
    ///
    /// Called once per placeholder at registration time, so that request
    /// time evaluation can never fail.
    pub fn validate(&self, expr: &str) -> Result<(), ConfigError> {
        let (name, _) = parse_expr(expr).ok_or_else(|| ConfigError::MalformedConstraint {
            expr: expr.to_owned(),
        })?;

        if !self.inner.contains_key(name) {
            return Err(ConfigError::UnknownConstraint {
                name: name.to_owned(),
            });
        }

        Ok(())
    }

    /// Evaluates `value` against a constraint expression.
    ///
    /// Expressions reaching this point were validated at registration;
    /// anything unparseable or unknown simply fails the candidate.
    pub fn is_valid(&self, value: &str, expr: &str) -> bool {
        let (name, args) = match parse_expr(expr) {
            Some(parsed) => parsed,
            None => return false,
        };

        match self.inner.get(name) {
            Some(constraint) => constraint.check(value, &args),
            None => false,
        }
    }
}

impl Default for ConstraintRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits `name` or `name(arg1,arg2,...)` into the name and its arguments.
/// Returns `None` for unbalanced parentheses.
fn parse_expr(expr: &str) -> Option<(&str, Vec<&str>)> {
    match expr.find('(') {
        None => {
            if expr.contains(')') {
                return None;
            }
            Some((expr, Vec::new()))
        }
        Some(open) => {
            let rest = &expr[open + 1..];
            let inner = rest.strip_suffix(')')?;
            if inner.contains('(') || inner.contains(')') {
                return None;
            }

            let args = if inner.is_empty() {
                Vec::new()
            } else {
                inner.split(',').map(str::trim).collect()
            };
            Some((&expr[..open], args))
        }
    }
}

fn builtins() -> Vec<Box<dyn Constraint>> {
    vec![
        Box::new(AnyValue),
        Box::new(Int),
        Box::new(Int32),
        Box::new(Int64),
        Box::new(Uint32),
        Box::new(Uint64),
        Box::new(Hex),
        Box::new(Hex32),
        Box::new(Hex64),
        Box::new(Alpha),
        Box::new(Alphanum),
        Box::new(Digits),
        Box::new(Uuid),
    ]
}

/// The default constraint: an unconstrained `{name}` parameter accepts
/// any value, registered under the empty name.
struct AnyValue;

impl Constraint for AnyValue {
    fn name(&self) -> &str {
        ""
    }

    fn check(&self, _value: &str, _args: &[&str]) -> bool {
        true
    }
}

/// `int` or `int(min,max)`: a signed 64-bit integer, optionally bounded
/// to an inclusive range.
struct Int;

impl Constraint for Int {
    fn name(&self) -> &str {
        "int"
    }

    fn check(&self, value: &str, args: &[&str]) -> bool {
        let n: i64 = match value.parse() {
            Ok(n) => n,
            Err(_) => return false,
        };

        if let [min, max] = args {
            match (min.parse::<i64>(), max.parse::<i64>()) {
                (Ok(min), Ok(max)) => n >= min && n <= max,
                _ => false,
            }
        } else {
            args.is_empty()
        }
    }
}

// The fixed-width integer constraints delegate the range check to the
// native parser, so the accepted sets are exactly the native boundaries
// (e.g. int32 accepts [-2147483648, 2147483647] and nothing else).

struct Int32;

impl Constraint for Int32 {
    fn name(&self) -> &str {
        "int32"
    }

    fn check(&self, value: &str, _args: &[&str]) -> bool {
        value.parse::<i32>().is_ok()
    }
}

struct Int64;

impl Constraint for Int64 {
    fn name(&self) -> &str {
        "int64"
    }

    fn check(&self, value: &str, _args: &[&str]) -> bool {
        value.parse::<i64>().is_ok()
    }
}

struct Uint32;

impl Constraint for Uint32 {
    fn name(&self) -> &str {
        "uint32"
    }

    fn check(&self, value: &str, _args: &[&str]) -> bool {
        !value.starts_with('+') && value.parse::<u32>().is_ok()
    }
}

struct Uint64;

impl Constraint for Uint64 {
    fn name(&self) -> &str {
        "uint64"
    }

    fn check(&self, value: &str, _args: &[&str]) -> bool {
        !value.starts_with('+') && value.parse::<u64>().is_ok()
    }
}

/// `hex`: one or more hexadecimal digits, any length.
struct Hex;

impl Constraint for Hex {
    fn name(&self) -> &str {
        "hex"
    }

    fn check(&self, value: &str, _args: &[&str]) -> bool {
        !value.is_empty() && value.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

struct Hex32;

impl Constraint for Hex32 {
    fn name(&self) -> &str {
        "hex32"
    }

    fn check(&self, value: &str, _args: &[&str]) -> bool {
        u32::from_str_radix(value, 16).is_ok() && !value.starts_with('+')
    }
}

struct Hex64;

impl Constraint for Hex64 {
    fn name(&self) -> &str {
        "hex64"
    }

    fn check(&self, value: &str, _args: &[&str]) -> bool {
        u64::from_str_radix(value, 16).is_ok() && !value.starts_with('+')
    }
}

struct Alpha;

impl Constraint for Alpha {
    fn name(&self) -> &str {
        "alpha"
    }

    fn check(&self, value: &str, _args: &[&str]) -> bool {
        !value.is_empty() && value.bytes().all(|b| b.is_ascii_alphabetic())
    }
}

struct Alphanum;

impl Constraint for Alphanum {
    fn name(&self) -> &str {
        "alphanum"
    }

    fn check(&self, value: &str, _args: &[&str]) -> bool {
        !value.is_empty() && value.bytes().all(|b| b.is_ascii_alphanumeric())
    }
}

struct Digits;

impl Constraint for Digits {
    fn name(&self) -> &str {
        "digits"
    }

    fn check(&self, value: &str, _args: &[&str]) -> bool {
        !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
    }
}

/// `uuid`: the 8-4-4-4-12 hexadecimal shape, with optional `{...}` or
/// `(...)` bookends that must pair consistently.
struct Uuid;

impl Constraint for Uuid {
    fn name(&self) -> &str {
        "uuid"
    }

    fn check(&self, value: &str, _args: &[&str]) -> bool {
        let inner = if value.starts_with('{') || value.ends_with('}') {
            match value.strip_prefix('{').and_then(|v| v.strip_suffix('}')) {
                Some(inner) => inner,
                None => return false,
            }
        } else if value.starts_with('(') || value.ends_with(')') {
            match value.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
                Some(inner) => inner,
                None => return false,
            }
        } else {
            value
        };

        let mut groups = inner.split('-');
        for expected in [8, 4, 4, 4, 12] {
            let group = match groups.next() {
                Some(group) => group,
                None => return false,
            };

            if group.len() != expected || !group.bytes().all(|b| b.is_ascii_hexdigit()) {
                return false;
            }
        }

        groups.next().is_none()
    }
}
