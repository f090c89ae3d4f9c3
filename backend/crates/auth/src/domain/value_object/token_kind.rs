use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Purpose a credential was minted for
///
/// Access credentials authorize requests; refresh credentials only mint new
/// pairs. A credential is never accepted in the other role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    #[display("access")]
    Access,
    #[display("refresh")]
    Refresh,
}
