//! Request descriptors handed to the gateway

use crate::client::error::ClientError;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;

/// A single backend call: target, method, headers and optional body.
///
/// The body is kept in a replayable form so the gateway can send the same
/// request a second time after renewing the access token.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Absolute URL or path relative to the client's base URL
    pub target: String,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

/// Request payload
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Pre-serialized JSON document
    Json(Bytes),
    /// `multipart/form-data` fields; the boundary is chosen by the transport
    Multipart(Vec<FormPart>),
    /// Opaque bytes; content type comes from the caller's headers, if any
    Binary(Bytes),
}

/// One multipart field
#[derive(Debug, Clone)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime: Option<String>,
        data: Bytes,
    },
}

impl RequestBody {
    /// Whether the transport must pick the content type itself
    pub fn is_opaque(&self) -> bool {
        matches!(self, Self::Multipart(_) | Self::Binary(_))
    }
}

impl ApiRequest {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::GET, target)
    }

    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::POST, target)
    }

    /// Add a header, replacing any previous value with the same name
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Serialize `value` as the JSON body
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, ClientError> {
        self.body = RequestBody::Json(Bytes::from(serde_json::to_vec(value)?));
        Ok(self)
    }

    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    pub fn binary(mut self, data: impl Into<Bytes>) -> Self {
        self.body = RequestBody::Binary(data.into());
        self
    }
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: Option<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self::File {
            name: name.into(),
            file_name: file_name.into(),
            mime,
            data: data.into(),
        }
    }
}

/// Materialize multipart fields into a fresh form for one attempt
pub(crate) fn build_form(parts: &[FormPart]) -> Result<Form, ClientError> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
            FormPart::File {
                name,
                file_name,
                mime,
                data,
            } => {
                let mut file = Part::bytes(data.to_vec()).file_name(file_name.clone());
                if let Some(mime) = mime {
                    file = file.mime_str(mime)?;
                }
                form.part(name.clone(), file)
            }
        };
    }
    Ok(form)
}
