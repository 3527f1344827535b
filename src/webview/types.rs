//! Web view payload types.
//!
//! Each type converts to and from the structured [`Map`] it travels as.
//! Decoding goes through [`Arguments`], so a missing or mistyped key yields
//! [`Error::InvalidArgument`](crate::Error::InvalidArgument) naming the key.

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::protocol::Arguments;
use crate::value::{Map, Value};

// ============================================================================
// Helpers
// ============================================================================

/// Header map: name → value.
pub type Headers = BTreeMap<String, String>;

/// Decodes an optional map of strings.
fn optional_headers(map: &Map, key: &str) -> Result<Option<Headers>> {
    let Some(raw) = map.optional::<Map>(key)? else {
        return Ok(None);
    };

    raw.into_iter()
        .map(|(name, value)| match value {
            Value::String(s) => Ok((name, s)),
            _ => Err(Error::argument_type(key, "a map of strings")),
        })
        .collect::<Result<Headers>>()
        .map(Some)
}

fn headers_value(headers: Option<&Headers>) -> Value {
    match headers {
        Some(headers) => Value::Map(
            headers
                .iter()
                .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
                .collect(),
        ),
        None => Value::Null,
    }
}

fn insert(map: &mut Map, key: &str, value: impl Into<Value>) {
    map.insert(key.to_string(), value.into());
}

// ============================================================================
// UrlRequest
// ============================================================================

/// A URL load request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlRequest {
    /// Target URL.
    pub url: String,
    /// HTTP method, engine default when `None`.
    pub method: Option<String>,
    /// Extra request headers.
    pub headers: Option<Headers>,
    /// Request body.
    pub body: Option<Vec<u8>>,
}

impl UrlRequest {
    /// Creates a GET request for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Decodes from a map.
    ///
    /// # Errors
    ///
    /// `url` is required; other keys must have the right shape when present.
    pub fn from_map(map: &Map) -> Result<Self> {
        Ok(Self {
            url: map.required("url")?,
            method: map.optional("method")?,
            headers: optional_headers(map, "headers")?,
            body: map.optional("body")?,
        })
    }

    /// Encodes to a map.
    #[must_use]
    pub fn to_map(&self) -> Map {
        let mut map = Map::new();
        insert(&mut map, "url", self.url.as_str());
        insert(&mut map, "method", self.method.clone());
        insert(&mut map, "headers", headers_value(self.headers.as_ref()));
        insert(&mut map, "body", self.body.clone());
        map
    }
}

impl From<UrlRequest> for Value {
    fn from(request: UrlRequest) -> Self {
        Value::Map(request.to_map())
    }
}

// ============================================================================
// ContentWorld
// ============================================================================

/// JavaScript execution world.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentWorld {
    /// World name.
    pub name: String,
}

impl ContentWorld {
    /// Name of the page's own world.
    pub const PAGE: &'static str = "page";
    /// Name of the default isolated world.
    pub const DEFAULT_CLIENT: &'static str = "defaultClient";

    /// Creates a named world.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The page's own world.
    #[must_use]
    pub fn page() -> Self {
        Self::new(Self::PAGE)
    }

    /// The default isolated world.
    #[must_use]
    pub fn default_client() -> Self {
        Self::new(Self::DEFAULT_CLIENT)
    }

    /// Returns `true` for the page's own world.
    #[inline]
    #[must_use]
    pub fn is_page(&self) -> bool {
        self.name == Self::PAGE
    }

    /// Decodes from a map.
    ///
    /// # Errors
    ///
    /// `name` is required.
    pub fn from_map(map: &Map) -> Result<Self> {
        Ok(Self::new(map.required::<String>("name")?))
    }

    /// Encodes to a map.
    #[must_use]
    pub fn to_map(&self) -> Map {
        Map::from([("name".to_string(), Value::from(self.name.as_str()))])
    }
}

impl Default for ContentWorld {
    fn default() -> Self {
        Self::page()
    }
}

// ============================================================================
// UserScript
// ============================================================================

/// When a user script is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserScriptInjectionTime {
    /// Before any page content.
    #[default]
    AtDocumentStart = 0,
    /// After the document finished loading.
    AtDocumentEnd = 1,
}

impl UserScriptInjectionTime {
    /// Parses the integer form.
    #[must_use]
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::AtDocumentStart),
            1 => Some(Self::AtDocumentEnd),
            _ => None,
        }
    }
}

/// A script injected into every matching page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserScript {
    /// Group for bulk removal.
    pub group_name: Option<String>,
    /// Script source.
    pub source: String,
    /// Injection time.
    pub injection_time: UserScriptInjectionTime,
    /// Origins the script runs on; empty means all.
    pub allowed_origin_rules: Vec<String>,
    /// World the script runs in.
    pub content_world: ContentWorld,
}

impl UserScript {
    /// Creates a document-start script in the page world.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            group_name: None,
            source: source.into(),
            injection_time: UserScriptInjectionTime::default(),
            allowed_origin_rules: Vec::new(),
            content_world: ContentWorld::page(),
        }
    }

    /// Sets the group name.
    #[must_use]
    pub fn with_group(mut self, group_name: impl Into<String>) -> Self {
        self.group_name = Some(group_name.into());
        self
    }

    /// Decodes from a map.
    ///
    /// # Errors
    ///
    /// `source` is required; `injectionTime` must be 0 or 1.
    pub fn from_map(map: &Map) -> Result<Self> {
        let injection_time = match map.optional::<i64>("injectionTime")? {
            Some(raw) => UserScriptInjectionTime::from_i64(raw)
                .ok_or_else(|| Error::argument_type("injectionTime", "0 or 1"))?,
            None => UserScriptInjectionTime::default(),
        };

        let allowed_origin_rules = map
            .optional::<Vec<Value>>("allowedOriginRules")?
            .unwrap_or_default()
            .into_iter()
            .map(|rule| match rule {
                Value::String(s) => Ok(s),
                _ => Err(Error::argument_type("allowedOriginRules", "a list of strings")),
            })
            .collect::<Result<Vec<_>>>()?;

        let content_world = match map.optional::<Map>("contentWorld")? {
            Some(world) => ContentWorld::from_map(&world)?,
            None => ContentWorld::page(),
        };

        Ok(Self {
            group_name: map.optional("groupName")?,
            source: map.required("source")?,
            injection_time,
            allowed_origin_rules,
            content_world,
        })
    }

    /// Encodes to a map.
    #[must_use]
    pub fn to_map(&self) -> Map {
        let mut map = Map::new();
        insert(&mut map, "groupName", self.group_name.clone());
        insert(&mut map, "source", self.source.as_str());
        insert(&mut map, "injectionTime", self.injection_time as i64);
        insert(
            &mut map,
            "allowedOriginRules",
            self.allowed_origin_rules
                .iter()
                .map(|rule| Value::from(rule.as_str()))
                .collect::<Vec<_>>(),
        );
        insert(&mut map, "contentWorld", self.content_world.to_map());
        map
    }
}

// ============================================================================
// Screenshot
// ============================================================================

/// Image format of a screenshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressFormat {
    /// PNG (lossless).
    #[default]
    Png,
    /// JPEG.
    Jpeg,
    /// WebP.
    Webp,
}

impl CompressFormat {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Webp => "WEBP",
        }
    }

    /// Parses the wire label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "PNG" => Some(Self::Png),
            "JPEG" => Some(Self::Jpeg),
            "WEBP" => Some(Self::Webp),
            _ => None,
        }
    }
}

/// Rectangle in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Decodes from a map; all four keys are required.
    ///
    /// # Errors
    ///
    /// Missing or non-numeric coordinates.
    pub fn from_map(map: &Map) -> Result<Self> {
        Ok(Self {
            x: map.required("x")?,
            y: map.required("y")?,
            width: map.required("width")?,
            height: map.required("height")?,
        })
    }
}

/// Screenshot options.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenshotConfiguration {
    /// Area to capture; whole viewport when `None`.
    pub rect: Option<Rect>,
    /// Output width, height scaled to match.
    pub snapshot_width: Option<f64>,
    /// Output format.
    pub compress_format: CompressFormat,
    /// Quality hint, 0-100.
    pub quality: u8,
}

impl Default for ScreenshotConfiguration {
    fn default() -> Self {
        Self {
            rect: None,
            snapshot_width: None,
            compress_format: CompressFormat::Png,
            quality: 100,
        }
    }
}

impl ScreenshotConfiguration {
    /// Decodes from a map.
    ///
    /// # Errors
    ///
    /// Unknown `compressFormat`, or `quality` outside 0-100.
    pub fn from_map(map: &Map) -> Result<Self> {
        let rect = match map.optional::<Map>("rect")? {
            Some(rect) => Some(Rect::from_map(&rect)?),
            None => None,
        };

        let compress_format = match map.optional::<String>("compressFormat")? {
            Some(label) => CompressFormat::from_label(&label)
                .ok_or_else(|| Error::argument_type("compressFormat", "PNG, JPEG or WEBP"))?,
            None => CompressFormat::default(),
        };

        let quality = match map.optional::<i64>("quality")? {
            Some(q) => u8::try_from(q)
                .ok()
                .filter(|q| *q <= 100)
                .ok_or_else(|| Error::argument_type("quality", "between 0 and 100"))?,
            None => 100,
        };

        Ok(Self {
            rect,
            snapshot_width: map.optional("snapshotWidth")?,
            compress_format,
            quality,
        })
    }
}

// ============================================================================
// Navigation
// ============================================================================

/// A navigation the page is about to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationAction {
    /// Request being made.
    pub request: UrlRequest,
    /// `true` when the main frame navigates.
    pub is_for_main_frame: bool,
    /// `true` for a server redirect.
    pub is_redirect: Option<bool>,
    /// Engine-specific navigation kind.
    pub navigation_type: Option<i64>,
}

impl NavigationAction {
    /// Creates a main-frame navigation.
    #[must_use]
    pub fn new(request: UrlRequest) -> Self {
        Self {
            request,
            is_for_main_frame: true,
            is_redirect: None,
            navigation_type: None,
        }
    }

    /// Encodes to a map.
    #[must_use]
    pub fn to_map(&self) -> Map {
        let mut map = Map::new();
        insert(&mut map, "request", self.request.to_map());
        insert(&mut map, "isForMainFrame", self.is_for_main_frame);
        insert(&mut map, "isRedirect", self.is_redirect);
        insert(&mut map, "navigationType", self.navigation_type);
        map
    }
}

/// Host decision for a pending navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationActionPolicy {
    /// Block the navigation.
    #[default]
    Cancel = 0,
    /// Let it proceed.
    Allow = 1,
}

impl NavigationActionPolicy {
    /// Decodes the host's answer.
    ///
    /// No answer, `null`, a non-integer, or an unknown integer all mean
    /// [`Cancel`](Self::Cancel).
    #[must_use]
    pub fn decode(raw: Option<Value>) -> Self {
        match raw.as_ref().and_then(Value::as_i64) {
            Some(1) => Self::Allow,
            _ => Self::Cancel,
        }
    }
}

impl From<NavigationActionPolicy> for Value {
    fn from(policy: NavigationActionPolicy) -> Self {
        Value::Int(policy as i64)
    }
}

// ============================================================================
// Web Resources
// ============================================================================

/// A subresource or frame request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WebResourceRequest {
    pub url: String,
    pub headers: Option<Headers>,
    pub method: Option<String>,
    pub is_for_main_frame: Option<bool>,
}

impl WebResourceRequest {
    /// Creates a request for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Encodes to a map.
    #[must_use]
    pub fn to_map(&self) -> Map {
        let mut map = Map::new();
        insert(&mut map, "url", self.url.as_str());
        insert(&mut map, "headers", headers_value(self.headers.as_ref()));
        insert(&mut map, "method", self.method.clone());
        insert(&mut map, "isForMainFrame", self.is_for_main_frame);
        map
    }
}

/// A failed load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebResourceError {
    /// Human readable description.
    pub description: String,
    /// Engine error code.
    pub error_type: i64,
}

impl WebResourceError {
    /// Encodes to a map.
    #[must_use]
    pub fn to_map(&self) -> Map {
        let mut map = Map::new();
        insert(&mut map, "description", self.description.as_str());
        insert(&mut map, "type", self.error_type);
        map
    }
}

/// An HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WebResourceResponse {
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    pub status_code: Option<i64>,
    pub reason_phrase: Option<String>,
    pub headers: Option<Headers>,
    pub data: Option<Vec<u8>>,
}

impl WebResourceResponse {
    /// Encodes to a map.
    #[must_use]
    pub fn to_map(&self) -> Map {
        let mut map = Map::new();
        insert(&mut map, "contentType", self.content_type.clone());
        insert(&mut map, "contentEncoding", self.content_encoding.clone());
        insert(&mut map, "statusCode", self.status_code);
        insert(&mut map, "reasonPhrase", self.reason_phrase.clone());
        insert(&mut map, "headers", headers_value(self.headers.as_ref()));
        insert(&mut map, "data", self.data.clone());
        map
    }
}

// ============================================================================
// History
// ============================================================================

/// One back/forward list entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WebHistoryItem {
    pub original_url: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    /// Absolute position in the list.
    pub index: Option<i64>,
    /// Position relative to the current entry.
    pub offset: Option<i64>,
}

impl WebHistoryItem {
    fn from_map(map: &Map) -> Result<Self> {
        Ok(Self {
            original_url: map.optional("originalUrl")?,
            title: map.optional("title")?,
            url: map.optional("url")?,
            index: map.optional("index")?,
            offset: map.optional("offset")?,
        })
    }

    fn to_map(&self) -> Map {
        let mut map = Map::new();
        insert(&mut map, "originalUrl", self.original_url.clone());
        insert(&mut map, "title", self.title.clone());
        insert(&mut map, "url", self.url.clone());
        insert(&mut map, "index", self.index);
        insert(&mut map, "offset", self.offset);
        map
    }
}

/// Snapshot of the back/forward list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WebHistory {
    pub list: Vec<WebHistoryItem>,
    pub current_index: Option<i64>,
}

impl WebHistory {
    /// Decodes from a map.
    ///
    /// # Errors
    ///
    /// Mistyped keys, or list entries that are not maps.
    pub fn from_map(map: &Map) -> Result<Self> {
        let list = map
            .optional::<Vec<Value>>("list")?
            .unwrap_or_default()
            .iter()
            .map(|item| match item.as_map() {
                Some(item) => WebHistoryItem::from_map(item),
                None => Err(Error::argument_type("list", "a list of maps")),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            list,
            current_index: map.optional("currentIndex")?,
        })
    }

    /// Encodes to a map.
    #[must_use]
    pub fn to_map(&self) -> Map {
        let mut map = Map::new();
        insert(
            &mut map,
            "list",
            self.list
                .iter()
                .map(|item| Value::Map(item.to_map()))
                .collect::<Vec<_>>(),
        );
        insert(&mut map, "currentIndex", self.current_index);
        map
    }
}

impl From<WebHistory> for Value {
    fn from(history: WebHistory) -> Self {
        Value::Map(history.to_map())
    }
}

// ============================================================================
// Console
// ============================================================================

/// Severity of a console message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleMessageLevel {
    Tip = 0,
    #[default]
    Log = 1,
    Warning = 2,
    Error = 3,
    Debug = 4,
}

impl ConsoleMessageLevel {
    /// Parses the integer form.
    #[must_use]
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Tip),
            1 => Some(Self::Log),
            2 => Some(Self::Warning),
            3 => Some(Self::Error),
            4 => Some(Self::Debug),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
