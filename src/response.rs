//! The disposition as the host's request callback expects it.
//!
//! The host hook is answered with a small object: `{"cancel": true}` to drop
//! the request, `{"redirectURL": "..."}` to substitute a navigation, and
//! `{"cancel": false}` to let it through.

use serde::Serialize;

use crate::policy::Disposition;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel: Option<bool>,
    #[serde(rename = "redirectURL", skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

impl From<&Disposition> for HostResponse {
    fn from(disposition: &Disposition) -> Self {
        match disposition {
            Disposition::Allow => Self {
                cancel: Some(false),
                redirect_url: None,
            },
            Disposition::Block => Self {
                cancel: Some(true),
                redirect_url: None,
            },
            Disposition::Redirect(target) => Self {
                cancel: None,
                redirect_url: Some(target.clone()),
            },
        }
    }
}

impl From<Disposition> for HostResponse {
    fn from(disposition: Disposition) -> Self {
        Self::from(&disposition)
    }
}

impl HostResponse {
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
