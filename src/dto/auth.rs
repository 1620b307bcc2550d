use serde::{Deserialize, Serialize};

/// JWT claims minted by the identity service and consumed here.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}
