use crate::Value;
use std::fmt::{self, Display, Formatter};

/// Ordered name to value map bound alongside a statement.
///
/// Names are the exact placeholder text (`@p0`, `@FirstName`), unique and kept in
/// insertion order, so the statement text and the map line up one to one.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Parameters {
    entries: Vec<(String, Value)>,
}

/// Key member or column names with their values, used for lookups and deletes by key.
pub type KeyValues = Parameters;

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find_map(|(k, v)| if k == name { Some(v) } else { None })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl ExactSizeIterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl ExactSizeIterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Add a value under `name`, suffixing the name when it is already taken.
    /// Returns the name actually used.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) -> String {
        let name = name.into();
        let mut unique = name.clone();
        let mut counter = 1;
        while self.contains(&unique) {
            unique = format!("{}_{}", name, counter);
            counter += 1;
        }
        self.entries.push((unique.clone(), value));
        unique
    }

    /// Set `name`, replacing a previous value in place.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder flavour of [`Parameters::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value.into());
        self
    }
}

impl<S: Into<String>, V: Into<Value>> FromIterator<(S, V)> for Parameters {
    fn from_iter<T: IntoIterator<Item = (S, V)>>(iter: T) -> Self {
        let mut result = Self::new();
        for (k, v) in iter {
            result.set(k, v.into());
        }
        result
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = &'a (String, Value);
    type IntoIter = std::slice::Iter<'a, (String, Value)>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Display for Parameters {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        f.write_str("}")
    }
}
