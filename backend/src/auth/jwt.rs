use super::models::Claims;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT decoding error: {0}")]
    Decoding(String),
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
}

/// Verifies HS256 bearer tokens minted by the identity provider.
#[derive(Clone)]
pub struct JwtService {
    decoding_key: DecodingKey,
    #[cfg(test)]
    encoding_key: jsonwebtoken::EncodingKey,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            #[cfg(test)]
            encoding_key: jsonwebtoken::EncodingKey::from_secret(secret.as_ref()),
        }
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        if token.is_empty() || token.split('.').count() != 3 {
            return Err(JwtError::InvalidToken);
        }

        let validation = Validation::new(Algorithm::HS256);
        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(token_data) => {
                log::debug!(
                    "JWT token decoded. User: {}, Exp: {}",
                    token_data.claims.sub,
                    token_data.claims.exp
                );
                Ok(token_data.claims)
            }
            Err(err) => {
                log::debug!("JWT token decode error: {:?}", err);
                match err.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(JwtError::TokenExpired),
                    jsonwebtoken::errors::ErrorKind::InvalidToken
                    | jsonwebtoken::errors::ErrorKind::InvalidSignature => Err(JwtError::InvalidToken),
                    _ => Err(JwtError::Decoding(err.to_string())),
                }
            }
        }
    }

    /// Mints a token the way the identity provider would.
    #[cfg(test)]
    pub fn issue(&self, sub: &str, email: &str, ttl: chrono::Duration) -> String {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: sub.to_string(),
            email: email.to_string(),
            name: "Test Reviewer".to_string(),
            exp: (now + ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        jsonwebtoken::encode(
            &jsonwebtoken::Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )
        .unwrap()
    }
}
