//! Redirect plumbing shared by the connector modules.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// HTTP method the rendering layer should use for the redirect.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

/// A browser redirect instruction: POST (or GET) `form_fields` to `endpoint`.
///
/// Owned solely by the response that produced it; the rendering layer reads
/// it once, typically into an auto-submitting HTML form.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct RedirectForm {
    /// Target URL of the hosted payment page.
    pub endpoint: String,
    /// HTTP verb for the submission.
    pub method: Method,
    /// Form fields to submit, exactly as the builder produced them.
    pub form_fields: HashMap<String, String>,
}
