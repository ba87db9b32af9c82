//! Blocking `Transport` backed by `reqwest::blocking::Client`.

use std::time::Duration;

use reqwest::blocking::{multipart, Client, RequestBuilder};
use reqwest::Method;

use crate::error::TransportError;
use crate::http::{FormPart, HttpMethod, HttpRequest, HttpResponse, RequestBody, Transport};

/// Executes requests with a blocking reqwest client.
///
/// Status codes are never turned into errors. A timeout is only applied when
/// the caller asks for one.
#[derive(Debug, Clone)]
pub struct BlockingTransport {
    inner: Client,
}

impl BlockingTransport {
    pub fn new() -> Result<Self, TransportError> {
        let inner = Client::builder().build()?;
        Ok(Self { inner })
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let inner = Client::builder().timeout(timeout).build()?;
        Ok(Self { inner })
    }

    /// Wrap a preconfigured reqwest client.
    pub fn from_client(inner: Client) -> Self {
        Self { inner }
    }

    fn prepare(&self, request: HttpRequest) -> Result<RequestBuilder, TransportError> {
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        };
        let mut builder = self.inner.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        let builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(pairs) => builder.form(&pairs),
            RequestBody::Multipart(parts) => builder.multipart(multipart_form(parts)?),
        };
        Ok(builder)
    }
}

impl Transport for BlockingTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.prepare(request)?.send()?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                let value = String::from_utf8_lossy(v.as_bytes()).into_owned();
                (k.as_str().to_string(), value)
            })
            .collect();
        let bytes = response.bytes()?;
        let body = String::from_utf8_lossy(&bytes).into_owned();
        tracing::debug!(status, len = body.len(), "received response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn multipart_form(parts: Vec<FormPart>) -> Result<multipart::Form, TransportError> {
    let mut form = multipart::Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name, value),
            FormPart::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                let part = multipart::Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&content_type)?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_creation() {
        assert!(BlockingTransport::new().is_ok());
        assert!(BlockingTransport::with_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn prepare_applies_query_and_headers() {
        let transport = BlockingTransport::new().unwrap();
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "http://localhost:3000/api/pets".to_string(),
            headers: vec![("auth_key".to_string(), "k".to_string())],
            query: vec![("filter".to_string(), "my_pets".to_string())],
            body: RequestBody::Empty,
        };
        let built = transport.prepare(request).unwrap().build().unwrap();
        assert_eq!(built.method(), &Method::GET);
        assert_eq!(built.url().as_str(), "http://localhost:3000/api/pets?filter=my_pets");
        assert_eq!(built.headers()["auth_key"], "k");
    }

    #[test]
    fn bad_content_type_is_a_transport_error() {
        let parts = vec![FormPart::File {
            name: "pet_photo".to_string(),
            file_name: "x.jpg".to_string(),
            content_type: "not a mime".to_string(),
            bytes: Vec::new(),
        }];
        assert!(multipart_form(parts).is_err());
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        let transport = BlockingTransport::with_timeout(Duration::from_secs(2)).unwrap();
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "http://127.0.0.1:9/api/key".to_string(),
            headers: Vec::new(),
            query: Vec::new(),
            body: RequestBody::Empty,
        };
        assert!(transport.execute(request).is_err());
    }
}
