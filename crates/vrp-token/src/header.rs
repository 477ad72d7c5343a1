//! # Token Header

use serde::{Deserialize, Serialize};
use vrp_core::TokenAlgorithm;

/// The first token segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    /// Signature algorithm name. Compared verbatim against configuration.
    pub alg: String,
    /// Media type, always `"JWT"` on issued tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

impl TokenHeader {
    /// Header for tokens issued with `algorithm`.
    pub fn for_algorithm(algorithm: TokenAlgorithm) -> Self {
        Self {
            alg: algorithm.as_str().to_string(),
            typ: Some("JWT".to_string()),
        }
    }
}
