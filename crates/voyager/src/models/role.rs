use serde::{Deserialize, Serialize};

/// Who authored a message. Tool results are carried on user-role messages
/// (as `ToolResponse` content) and converted to the wire-level `tool` role
/// by the providers; the system preamble travels as a dedicated argument to
/// `Provider::complete`, so neither needs a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}
