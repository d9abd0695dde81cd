/// Narrow read/write surface the codecs need over a request or response.
///
/// Header names are case-insensitive. Implementations own their storage; the
/// codecs never keep references past a call.
pub trait Envelope {
    /// Returns the value of `name`, if present.
    fn header(&self, name: &str) -> Option<&str>;

    /// Sets `name`, replacing any existing value.
    fn set_header(&mut self, name: &str, value: &str);

    /// Calls `visit` once per header, in insertion order.
    fn visit_headers(&self, visit: &mut dyn FnMut(&str, &str));

    /// Full body.
    fn body(&self) -> &[u8];

    /// Appends bytes to the body.
    fn append_body(&mut self, bytes: &[u8]);

    /// `Content-Type` value, or the empty string.
    fn content_type(&self) -> &str {
        self.header("Content-Type").unwrap_or_default()
    }
}

/// Ordered header list with case-insensitive names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Sets `name`, replacing any existing value in place.
    pub fn set(&mut self, name: &str, value: &str) {
        match self.0.iter().position(|(key, _)| key.eq_ignore_ascii_case(name)) {
            Some(index) => {
                self.0[index].1 = value.to_string();
                let mut i = index + 1;
                while i < self.0.len() {
                    if self.0[i].0.eq_ignore_ascii_case(name) {
                        self.0.remove(i);
                    } else {
                        i += 1;
                    }
                }
            }
            None => self.0.push((name.to_string(), value.to_string())),
        }
    }

    /// Removes `name`, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.0.iter().position(|(key, _)| key.eq_ignore_ascii_case(name))?;
        Some(self.0.remove(index).1)
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when there are no headers.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Outbound or inbound request, held as plain data. The host performs I/O.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request method, e.g. `POST`.
    pub method: String,
    /// Request target.
    pub uri: String,
    /// Header list.
    pub headers: Headers,
    /// Body bytes.
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Creates a request with no headers and an empty body.
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            ..Self::default()
        }
    }
}

/// Response counterpart of [`HttpRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Header list.
    pub headers: Headers,
    /// Body bytes.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response with no headers and an empty body.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new(200)
    }
}

macro_rules! impl_envelope {
    ($($ty:ty),+) => {$(
        impl Envelope for $ty {
            fn header(&self, name: &str) -> Option<&str> {
                self.headers.get(name)
            }

            fn set_header(&mut self, name: &str, value: &str) {
                self.headers.set(name, value);
            }

            fn visit_headers(&self, visit: &mut dyn FnMut(&str, &str)) {
                for (name, value) in self.headers.iter() {
                    visit(name, value);
                }
            }

            fn body(&self) -> &[u8] {
                &self.body
            }

            fn append_body(&mut self, bytes: &[u8]) {
                self.body.extend_from_slice(bytes);
            }
        }
    )+};
}

impl_envelope!(HttpRequest, HttpResponse);
