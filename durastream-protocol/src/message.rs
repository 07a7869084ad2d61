//! Outbound and reply messages with their headers.

use bytes::Bytes;

/// Ordered message headers.
///
/// Setting a name that is already present replaces its value in place, so
/// entry order stays the order in which names were first set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a header, replacing the value of an existing entry with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.set(name, value);
        }
        headers
    }
}

/// A message addressed to a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Subject the message is sent to.
    pub subject: String,

    /// Headers, if any were attached.
    pub headers: Option<Headers>,

    /// Message body.
    pub payload: Bytes,
}

impl Message {
    pub fn new(subject: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            subject: subject.into(),
            headers: None,
            payload: payload.into(),
        }
    }

    /// Creates a message with an empty body.
    pub fn empty(subject: impl Into<String>) -> Self {
        Self::new(subject, Bytes::new())
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn has_headers(&self) -> bool {
        self.headers.as_ref().is_some_and(|h| !h.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_set_replaces_in_place() {
        let mut headers = Headers::new();
        headers.set("A", "1");
        headers.set("B", "2");
        headers.set("A", "3");

        let entries: Vec<_> = headers.iter().collect();
        assert_eq!(entries, vec![("A", "3"), ("B", "2")]);
    }

    #[test]
    fn test_headers_get_and_contains() {
        let headers = Headers::new().with("Trace-Id", "abc");
        assert_eq!(headers.get("Trace-Id"), Some("abc"));
        assert!(headers.contains("Trace-Id"));
        assert!(!headers.contains("trace-id"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_headers_from_iter() {
        let headers: Headers = [("X", "1"), ("Y", "2")].into_iter().collect();
        assert_eq!(headers.get("Y"), Some("2"));
    }

    #[test]
    fn test_message_has_headers() {
        let msg = Message::new("orders.new", "hello");
        assert!(!msg.has_headers());

        let msg = msg.with_headers(Headers::new());
        assert!(!msg.has_headers());

        let msg = Message::empty("orders.new").with_headers(Headers::new().with("K", "V"));
        assert!(msg.has_headers());
        assert!(msg.payload.is_empty());
    }
}
