//! HTTP transport types and the `Transport` seam.
//!
//! # Design
//! Requests and responses are plain data. `PetFriendsClient` builds
//! `HttpRequest` values and normalizes `HttpResponse` values; the only code
//! that touches the network is a `Transport` implementation supplied by the
//! caller. The default one lives in `crate::transport` behind the `blocking`
//! feature.
//!
//! All fields use owned types so requests can be inspected in tests and
//! handed to any backend without lifetime concerns.

use crate::error::TransportError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A single multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

impl FormPart {
    pub fn text(name: &str, value: &str) -> Self {
        FormPart::Text {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FormPart::Text { name, .. } | FormPart::File { name, .. } => name,
        }
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// `application/x-www-form-urlencoded` pairs, in order.
    Form(Vec<(String, String)>),
    /// `multipart/form-data` parts, in order.
    Multipart(Vec<FormPart>),
}

/// An HTTP request described as plain data.
///
/// Built by `PetFriendsClient::build_*` methods and executed by a
/// `Transport`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// `body` is the payload decoded as text (lossy for non-UTF-8 bytes), exactly
/// what the normalizer falls back to when it is not JSON.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Executes one `HttpRequest` and returns the raw response.
///
/// Implementations must return every status code as a response, including
/// 4xx and 5xx. `Err` is reserved for failures where no response exists at
/// all (connection refused, DNS, timeout).
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let req = HttpRequest {
            method: HttpMethod::Get,
            url: "http://localhost/api/pets".to_string(),
            headers: vec![("auth_key".to_string(), "abc".to_string())],
            query: Vec::new(),
            body: RequestBody::Empty,
        };
        assert_eq!(req.header("AUTH_KEY"), Some("abc"));
        assert_eq!(req.header("email"), None);
    }

    #[test]
    fn form_part_name_covers_both_variants() {
        let text = FormPart::text("name", "Kisa");
        let file = FormPart::File {
            name: "pet_photo".to_string(),
            file_name: "cat.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![0xff, 0xd8],
        };
        assert_eq!(text.name(), "name");
        assert_eq!(file.name(), "pet_photo");
    }

    #[test]
    fn method_names_are_uppercase() {
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
        assert_eq!(HttpMethod::Put.as_str(), "PUT");
    }
}
