use crate::base::neterror::NetError;
use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use std::str::FromStr;

/// A header map that strictly preserves insertion order.
///
/// Keys compare case-insensitively (`HeaderName` is always lowercase) and a
/// name may carry several values, kept in the order they were appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedHeaderMap {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl OrderedHeaderMap {
    pub fn new() -> Self {
        Self {
            headers: Vec::new(),
        }
    }

    /// Set a header, replacing every existing value for the same name.
    /// The first occurrence keeps its position.
    pub fn insert(&mut self, name: &str, value: &str) -> Result<(), NetError> {
        let (name, value) = parse_pair(name, value)?;
        match self.headers.iter().position(|(n, _)| *n == name) {
            Some(idx) => {
                self.headers[idx].1 = value;
                let mut seen = 0;
                self.headers.retain(|(n, _)| {
                    if *n != name {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.headers.push((name, value)),
        }
        Ok(())
    }

    /// Add a value without touching existing values of the same name.
    pub fn append(&mut self, name: &str, value: &str) -> Result<(), NetError> {
        let (name, value) = parse_pair(name, value)?;
        self.headers.push((name, value));
        Ok(())
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        let target = HeaderName::from_str(name).ok()?;
        self.headers
            .iter()
            .find(|(n, _)| *n == target)
            .map(|(_, v)| v)
    }

    /// All values for `name`, in insertion order.
    pub fn get_all<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a HeaderValue> + 'a {
        let target = HeaderName::from_str(name).ok();
        self.headers
            .iter()
            .filter(move |(n, _)| target.as_ref() == Some(n))
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.headers.iter().map(|(n, v)| (n, v))
    }

    /// Number of entries, counting each value of a repeated name.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

impl From<&HeaderMap> for OrderedHeaderMap {
    fn from(map: &HeaderMap) -> Self {
        Self {
            headers: map
                .iter()
                .map(|(n, v)| (n.clone(), v.clone()))
                .collect(),
        }
    }
}

impl FromIterator<(HeaderName, HeaderValue)> for OrderedHeaderMap {
    fn from_iter<I: IntoIterator<Item = (HeaderName, HeaderValue)>>(iter: I) -> Self {
        Self {
            headers: iter.into_iter().collect(),
        }
    }
}

fn parse_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), NetError> {
    let name = HeaderName::from_str(name).map_err(|_| NetError::InvalidHeader)?;
    let value = HeaderValue::from_str(value).map_err(|_| NetError::InvalidHeader)?;
    Ok((name, value))
}
