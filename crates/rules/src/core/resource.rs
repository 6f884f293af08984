use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

/// Coarse classification of a resource, derived from its Content-Type header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Html,
    Text,
    Css,
    Image,
    Js,
    Other,
}

/// One captured network resource: a request/response pair with headers,
/// an optional recorded body, and optional timing data.
///
/// Identity within an input set is the request URL. Header lookups are
/// case-insensitive; setting a header under a key that already exists
/// comma-joins the new value onto the old one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    request_url: String,
    request_method: String,
    status_code: i32,
    request_headers: BTreeMap<String, String>,
    response_headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    response_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    request_start_millis: Option<u64>,
}

/// Response status codes that signal an HTTP redirect.
const REDIRECT_STATUS_CODES: &[i32] = &[300, 301, 302, 303, 307, 308];

impl Resource {
    pub fn new(request_url: impl Into<String>, status_code: i32) -> Self {
        Self {
            request_url: request_url.into(),
            request_method: "GET".to_string(),
            status_code,
            request_headers: BTreeMap::new(),
            response_headers: BTreeMap::new(),
            response_body: None,
            request_start_millis: None,
        }
    }

    pub fn with_request_method(mut self, method: impl Into<String>) -> Self {
        self.request_method = method.into();
        self
    }

    pub fn with_request_header(mut self, name: &str, value: &str) -> Self {
        insert_header(&mut self.request_headers, name, value);
        self
    }

    pub fn with_response_header(mut self, name: &str, value: &str) -> Self {
        insert_header(&mut self.response_headers, name, value);
        self
    }

    pub fn with_response_body(mut self, body: impl Into<String>) -> Self {
        self.response_body = Some(body.into());
        self
    }

    pub fn with_request_start_millis(mut self, millis: u64) -> Self {
        self.request_start_millis = Some(millis);
        self
    }

    pub fn request_url(&self) -> &str {
        &self.request_url
    }

    pub fn request_method(&self) -> &str {
        &self.request_method
    }

    pub fn status_code(&self) -> i32 {
        self.status_code
    }

    pub fn request_header(&self, name: &str) -> Option<&str> {
        self.request_headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn response_header(&self, name: &str) -> Option<&str> {
        self.response_headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn has_request_headers(&self) -> bool {
        !self.request_headers.is_empty()
    }

    pub fn response_body(&self) -> Option<&str> {
        self.response_body.as_deref()
    }

    pub fn response_body_len(&self) -> u64 {
        self.response_body.as_ref().map_or(0, |b| b.len() as u64)
    }

    pub fn request_start_millis(&self) -> Option<u64> {
        self.request_start_millis
    }

    /// Host portion of the request URL, or an empty string if the URL does
    /// not parse.
    pub fn host(&self) -> String {
        Url::parse(&self.request_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default()
    }

    pub fn is_redirect(&self) -> bool {
        REDIRECT_STATUS_CODES.contains(&self.status_code)
    }

    /// Target of this redirect: the Location header resolved against the
    /// resource's own URL (relative targets are resolved document-style),
    /// with any fragment identifier stripped. None for non-redirects and
    /// for redirects whose Location is missing or unresolvable.
    pub fn redirected_url(&self) -> Option<String> {
        if !self.is_redirect() {
            return None;
        }
        let location = self.response_header("location")?;
        let resolved = match Url::parse(location) {
            Ok(absolute) => absolute,
            Err(_) => {
                let base = Url::parse(&self.request_url).ok()?;
                base.join(location).ok()?
            }
        };
        Some(strip_fragment(resolved))
    }

    pub fn resource_type(&self) -> ResourceType {
        let content_type = match self.response_header("content-type") {
            Some(value) => value.to_ascii_lowercase(),
            None => return ResourceType::Other,
        };
        // Ignore any charset or boundary parameters.
        let mime = content_type.split(';').next().unwrap_or("").trim();
        if mime == "text/html" || mime == "application/xhtml+xml" {
            ResourceType::Html
        } else if mime == "text/css" {
            ResourceType::Css
        } else if mime.contains("javascript") || mime.contains("ecmascript") || mime == "application/json" {
            ResourceType::Js
        } else if mime.starts_with("image/") {
            ResourceType::Image
        } else if mime.starts_with("text/") {
            ResourceType::Text
        } else {
            ResourceType::Other
        }
    }
}

fn insert_header(headers: &mut BTreeMap<String, String>, name: &str, value: &str) {
    let key = name.to_ascii_lowercase();
    match headers.get_mut(&key) {
        Some(existing) => {
            existing.push_str(", ");
            existing.push_str(value);
        }
        None => {
            headers.insert(key, value.to_string());
        }
    }
}

/// Drops the fragment identifier from a URL, returning the remainder as a
/// string. Fragments never reach the server, so they are not part of a
/// resource's identity.
pub fn strip_fragment(mut url: Url) -> String {
    url.set_fragment(None);
    url.to_string()
}

/// Canonical form of a URL string used for resource lookups: parsed and
/// fragment-stripped when possible, unchanged otherwise.
pub fn canonical_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => strip_fragment(parsed),
        Err(_) => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let resource =
            Resource::new("http://www.example.com/", 200).with_response_header("Content-Type", "text/html");
        assert_eq!(resource.response_header("content-type"), Some("text/html"));
        assert_eq!(resource.response_header("CONTENT-TYPE"), Some("text/html"));
    }

    #[test]
    fn duplicate_headers_are_comma_joined() {
        let resource = Resource::new("http://www.example.com/", 200)
            .with_response_header("Cache-Control", "private")
            .with_response_header("cache-control", "max-age=0");
        assert_eq!(
            resource.response_header("Cache-Control"),
            Some("private, max-age=0")
        );
    }

    #[test]
    fn redirect_target_resolves_relative_location() {
        let resource = Resource::new("http://www.example.com/a/b", 302)
            .with_response_header("Location", "/c#frag");
        assert_eq!(
            resource.redirected_url().as_deref(),
            Some("http://www.example.com/c")
        );
    }

    #[test]
    fn redirect_target_strips_fragment_from_absolute_location() {
        let resource = Resource::new("http://www.example.com/", 301)
            .with_response_header("Location", "http://www.example.com/next#section");
        assert_eq!(
            resource.redirected_url().as_deref(),
            Some("http://www.example.com/next")
        );
    }

    #[test]
    fn non_redirect_has_no_target() {
        let resource = Resource::new("http://www.example.com/", 200)
            .with_response_header("Location", "http://www.example.com/elsewhere");
        assert_eq!(resource.redirected_url(), None);
    }

    #[test]
    fn resource_type_from_content_type() {
        let css = Resource::new("http://www.example.com/s.css", 200)
            .with_response_header("Content-Type", "text/css; charset=utf-8");
        assert_eq!(css.resource_type(), ResourceType::Css);

        let js = Resource::new("http://www.example.com/s.js", 200)
            .with_response_header("Content-Type", "application/x-javascript");
        assert_eq!(js.resource_type(), ResourceType::Js);

        let untyped = Resource::new("http://www.example.com/x", 200);
        assert_eq!(untyped.resource_type(), ResourceType::Other);
    }

    #[test]
    fn host_extraction() {
        let resource = Resource::new("http://static.example.com/img.png", 200);
        assert_eq!(resource.host(), "static.example.com");
    }
}
