use serde::{Deserialize, Serialize};

/// JWT payload the identity provider signs for every client session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,           // user id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>, // optional, present for interactive logins
    pub iat: usize,            // issued at (unix timestamp)
    pub exp: usize,            // expires at (unix timestamp)
    pub iss: String,           // issuer
    pub aud: String,           // audience
}
