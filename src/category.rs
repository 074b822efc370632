//! Resource categories reported by the host's request hook.
//!
//! Hosts describe the kind of resource being fetched with loosely defined
//! string tags, and several of them mean the same thing (`"mainFrame"` and
//! `"navigation"` both denote a top-level navigation). [`ResourceCategory`]
//! closes that set so that rules never fail to match because of a synonym.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The kind of resource a request loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceCategory {
    /// A top-level navigation that loads a page into the primary browsing context.
    MainFrame,
    SubFrame,
    Stylesheet,
    Script,
    Image,
    Font,
    Object,
    /// XHR and `fetch()` requests.
    XmlHttpRequest,
    Ping,
    CspReport,
    Media,
    WebSocket,
    /// Anything the host reports that is not one of the kinds above.
    Other,
}

impl ResourceCategory {
    /// Every category, in declaration order.
    pub const ALL: [ResourceCategory; 13] = [
        ResourceCategory::MainFrame,
        ResourceCategory::SubFrame,
        ResourceCategory::Stylesheet,
        ResourceCategory::Script,
        ResourceCategory::Image,
        ResourceCategory::Font,
        ResourceCategory::Object,
        ResourceCategory::XmlHttpRequest,
        ResourceCategory::Ping,
        ResourceCategory::CspReport,
        ResourceCategory::Media,
        ResourceCategory::WebSocket,
        ResourceCategory::Other,
    ];

    /// Strict tag lookup. Returns `None` for tags that are not recognized.
    ///
    /// Both the host's camelCase tags and snake_case spellings are accepted.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let category = match tag {
            "mainFrame" | "main_frame" | "navigation" => ResourceCategory::MainFrame,
            "subFrame" | "sub_frame" => ResourceCategory::SubFrame,
            "stylesheet" => ResourceCategory::Stylesheet,
            "script" => ResourceCategory::Script,
            "image" => ResourceCategory::Image,
            "font" => ResourceCategory::Font,
            "object" => ResourceCategory::Object,
            "xhr" | "xmlhttprequest" | "xmlHttpRequest" | "fetch" => {
                ResourceCategory::XmlHttpRequest
            }
            "ping" => ResourceCategory::Ping,
            "cspReport" | "csp_report" => ResourceCategory::CspReport,
            "media" => ResourceCategory::Media,
            "webSocket" | "websocket" | "web_socket" => ResourceCategory::WebSocket,
            "other" => ResourceCategory::Other,
            _ => return None,
        };
        Some(category)
    }

    /// Lenient tag lookup for request descriptors: unknown tags become
    /// [`ResourceCategory::Other`], which is never a top-level navigation.
    pub fn classify(tag: &str) -> Self {
        Self::from_tag(tag).unwrap_or(ResourceCategory::Other)
    }

    /// Canonical tag, as the host spells it.
    pub fn as_tag(&self) -> &'static str {
        match self {
            ResourceCategory::MainFrame => "mainFrame",
            ResourceCategory::SubFrame => "subFrame",
            ResourceCategory::Stylesheet => "stylesheet",
            ResourceCategory::Script => "script",
            ResourceCategory::Image => "image",
            ResourceCategory::Font => "font",
            ResourceCategory::Object => "object",
            ResourceCategory::XmlHttpRequest => "xhr",
            ResourceCategory::Ping => "ping",
            ResourceCategory::CspReport => "cspReport",
            ResourceCategory::Media => "media",
            ResourceCategory::WebSocket => "webSocket",
            ResourceCategory::Other => "other",
        }
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl Serialize for ResourceCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_tag())
    }
}

// Rule-set documents use the strict lookup so a misspelled tag is a load error
// rather than a rule that silently never matches.
impl<'de> Deserialize<'de> for ResourceCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        ResourceCategory::from_tag(&tag)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown resource category: {tag}")))
    }
}
