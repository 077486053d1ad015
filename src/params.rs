use std::{fmt, slice};

/// A single URL parameter, consisting of a key and a value.
///
/// Keys borrow from the registered pattern, values from the matched
/// request path, so a lookup allocates nothing for its bindings.
#[derive(PartialEq, Eq, Ord, PartialOrd, Copy, Clone)]
struct Param<'k, 'v> {
    key: &'k str,
    value: &'v str,
}

/// The parameters bound by a route match, in declaration order.
///
/// The first parameter in the registered pattern is also the first entry
/// here, so values can safely be read by index as well as by name.
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let mut router = trailmap::Router::new();
/// # router.get("/users/{id}", true)?;
/// let resource = router.resolve("/users/1")?;
///
/// // Iterate through the keys and values.
/// for (key, value) in resource.params.iter() {
///     println!("key: {}, value: {}", key, value);
/// }
///
/// // Get a specific value by name.
/// let id = resource.params.get("id");
/// assert_eq!(id, Some("1"));
/// # Ok(())
/// # }
/// ```
#[derive(PartialEq, Eq, Ord, PartialOrd, Clone, Default)]
pub struct Params<'k, 'v> {
    inner: Vec<Param<'k, 'v>>,
}

impl<'k, 'v> Params<'k, 'v> {
    pub(crate) fn new(keys: &'k [String], values: &[&'v str]) -> Self {
        debug_assert_eq!(keys.len(), values.len());

        Self {
            inner: keys
                .iter()
                .zip(values)
                .map(|(key, &value)| Param {
                    key: key.as_str(),
                    value,
                })
                .collect(),
        }
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if there are no parameters in the list.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the value of the first parameter registered under the given key.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&'v str> {
        let key = key.as_ref();
        self.inner
            .iter()
            .find(|param| param.key == key)
            .map(|param| param.value)
    }

    /// Returns an iterator over the parameters in declaration order.
    pub fn iter(&self) -> ParamsIter<'_, 'k, 'v> {
        ParamsIter {
            inner: self.inner.iter(),
        }
    }
}

impl fmt::Debug for Params<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// An iterator over the keys and values of a route's [parameters](Params).
pub struct ParamsIter<'ps, 'k, 'v> {
    inner: slice::Iter<'ps, Param<'k, 'v>>,
}

impl<'ps, 'k, 'v> Iterator for ParamsIter<'ps, 'k, 'v> {
    type Item = (&'k str, &'v str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|p| (p.key, p.value))
    }
}

impl ExactSizeIterator for ParamsIter<'_, '_, '_> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}
