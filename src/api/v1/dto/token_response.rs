use serde::{Deserialize, Serialize};

/// Body of the acquire / refresh endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub valid: bool,
    /// Empty when `valid` is false.
    pub token: String,
}

impl TokenResponse {
    pub fn valid(token: String) -> Self {
        Self { valid: true, token }
    }

    pub fn invalid() -> Self {
        Self {
            valid: false,
            token: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invalid_body_shape() {
        assert_eq!(
            serde_json::to_value(TokenResponse::invalid()).unwrap(),
            json!({ "valid": false, "token": "" })
        );
    }
}
