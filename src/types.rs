
use serde::{Deserialize, Serialize};

use crate::dialect::DialectId;

/// One request line of the JSON-lines surface.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Detect {
        text: String,
        #[serde(default)]
        threshold: Option<f64>,
    },
    Rewrite {
        text: String,
        /// Kept as a string so unknown ids surface as `UnknownDialectError`.
        dialect: String,
        #[serde(default)]
        strict: bool,
    },
    Dialects,
    Info {
        dialect: String,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DetectResponse {
    pub dialect: DialectId,
    pub confidence: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RewriteResponse {
    pub original: String,
    pub converted: String,
    pub dialect: DialectId,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DialectsResponse {
    pub dialects: Vec<DialectId>,
    pub count: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
}
