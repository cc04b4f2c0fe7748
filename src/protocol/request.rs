//! Decoded client requests.

use bytes::Bytes;

/// A command token plus its ordered parameters.
///
/// Parameters are opaque byte strings. Only the handler for the command
/// interprets them, and only as integers, floats or flag literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    command: String,
    params: Vec<Bytes>,
}

impl Request {
    /// Creates a request from a command token and its parameters.
    pub fn new(command: impl Into<String>, params: Vec<Bytes>) -> Self {
        Self {
            command: command.into(),
            params,
        }
    }

    /// Builds a request from string slices, mostly useful in tests and benches.
    ///
    /// # Example
    /// ```
    /// use rstore::protocol::Request;
    /// let req = Request::from_parts(&["SET", "name", "Ariz"]);
    /// assert_eq!(req.command(), "SET");
    /// assert_eq!(req.params().len(), 2);
    /// ```
    pub fn from_parts(parts: &[&str]) -> Self {
        let (command, params) = match parts.split_first() {
            Some((command, params)) => (*command, params),
            None => ("", &[][..]),
        };
        Self::new(
            command,
            params
                .iter()
                .map(|p| Bytes::copy_from_slice(p.as_bytes()))
                .collect(),
        )
    }

    /// The command token exactly as the client sent it.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// The ordered parameters.
    pub fn params(&self) -> &[Bytes] {
        &self.params
    }
}
