use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE},
    multipart::{Form, Part},
    Method, Url,
};
use serde::Serialize;

use crate::{HairscanError, Result, RetryPolicy};

/// One named field of a multipart form.
#[derive(Clone, Debug, PartialEq)]
pub struct FormPart {
    /// Form field name.
    pub name: String,
    /// Optional file name reported in `Content-Disposition`.
    pub file_name: Option<String>,
    /// Optional part content type, e.g. `image/jpeg`.
    pub content_type: Option<String>,
    /// Raw part contents.
    pub data: Vec<u8>,
}

impl FormPart {
    /// Creates a plain text field.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_name: None,
            content_type: None,
            data: value.into().into_bytes(),
        }
    }

    /// Creates a file field.
    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            file_name: Some(file_name.into()),
            content_type: Some(content_type.into()),
            data: data.into(),
        }
    }
}

/// Request payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Body {
    #[default]
    Empty,
    /// Raw bytes with an optional content type.
    Bytes {
        data: Vec<u8>,
        content_type: Option<String>,
    },
    /// JSON document, sent as `application/json`.
    Json(serde_json::Value),
    /// `multipart/form-data` with the given parts, in order.
    Multipart(Vec<FormPart>),
}

impl Body {
    /// Serializes `value` into a JSON body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|err| HairscanError::InvalidRequest(format!("unserializable body: {err}")))
    }
}

/// Description of one logical request.
///
/// Every attempt made for it sends an identical copy.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub url: String,
    pub method: Method,
    /// Header pairs, in insertion order.
    pub headers: Vec<(String, String)>,
    pub body: Body,
    /// Overrides the client's retry policy for this request.
    pub retry: Option<RetryPolicy>,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: Vec::new(),
            body: Body::Empty,
            retry: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Validates the descriptor once, before any attempt is made.
    pub(crate) fn prepare(&self) -> Result<PreparedRequest> {
        let url = Url::parse(self.url.trim()).map_err(|err| {
            HairscanError::InvalidRequest(format!("invalid url '{}': {err}", self.url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(HairscanError::InvalidRequest(format!(
                "unsupported url scheme '{}'",
                url.scheme()
            )));
        }

        let mut headers = HeaderMap::with_capacity(self.headers.len() + 1);
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                HairscanError::InvalidRequest(format!("invalid header name '{name}': {err}"))
            })?;
            headers.append(name, parse_header_value(value)?);
        }

        let body = match &self.body {
            Body::Empty => PreparedBody::Empty,
            Body::Bytes { data, content_type } => {
                if let Some(content_type) = content_type {
                    set_content_type(&mut headers, parse_header_value(content_type)?);
                }
                PreparedBody::Bytes(data.clone())
            }
            Body::Json(value) => {
                let data = serde_json::to_vec(value).map_err(|err| {
                    HairscanError::InvalidRequest(format!("unserializable body: {err}"))
                })?;
                set_content_type(&mut headers, HeaderValue::from_static("application/json"));
                PreparedBody::Bytes(data)
            }
            Body::Multipart(parts) => PreparedBody::Multipart(
                parts
                    .iter()
                    .map(PreparedPart::new)
                    .collect::<Result<Vec<_>>>()?,
            ),
        };

        Ok(PreparedRequest {
            method: self.method.clone(),
            url,
            headers,
            body,
        })
    }
}

/// A validated request that can be turned into any number of identical
/// `reqwest` requests.
#[derive(Debug)]
pub(crate) struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: PreparedBody,
}

#[derive(Debug)]
pub(crate) enum PreparedBody {
    Empty,
    Bytes(Vec<u8>),
    Multipart(Vec<PreparedPart>),
}

#[derive(Debug)]
pub(crate) struct PreparedPart {
    name: String,
    file_name: Option<String>,
    headers: HeaderMap,
    data: Vec<u8>,
}

impl PreparedPart {
    fn new(part: &FormPart) -> Result<Self> {
        if part.name.is_empty() {
            return Err(HairscanError::InvalidRequest(
                "multipart field name cannot be empty".to_owned(),
            ));
        }
        let mut headers = HeaderMap::new();
        if let Some(content_type) = &part.content_type {
            headers.insert(CONTENT_TYPE, parse_header_value(content_type)?);
        }
        Ok(Self {
            name: part.name.clone(),
            file_name: part.file_name.clone(),
            headers,
            data: part.data.clone(),
        })
    }
}

impl PreparedBody {
    /// Builds a fresh multipart form; `reqwest` consumes forms on send.
    pub(crate) fn form(parts: &[PreparedPart]) -> Form {
        parts.iter().fold(Form::new(), |form, part| {
            let mut field = Part::bytes(part.data.clone()).headers(part.headers.clone());
            if let Some(file_name) = &part.file_name {
                field = field.file_name(file_name.clone());
            }
            form.part(part.name.clone(), field)
        })
    }
}

fn parse_header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|err| {
        HairscanError::InvalidRequest(format!("invalid header value '{value}': {err}"))
    })
}

fn set_content_type(headers: &mut HeaderMap, value: HeaderValue) {
    if !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, value);
    }
}
