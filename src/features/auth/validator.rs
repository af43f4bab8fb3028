use super::model::{AuthenticatedUser, Claims};
use crate::core::config::AuthConfig;
use crate::core::error::AppError;
use crate::shared::validation::USERNAME_REGEX;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};

/// Validates HS256 bearer tokens issued by the identity provider
pub struct JwtValidator {
    decoding_key: DecodingKey,
    issuer: Option<String>,
    leeway: u64,
}

impl JwtValidator {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.issuer.clone(),
            leeway: config.jwt_leeway.as_secs(),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Unauthorized(e.to_string()))?;

        if header.alg != Algorithm::HS256 {
            return Err(AppError::Unauthorized(format!(
                "Unsupported algorithm: {:?}. Only HS256 is allowed",
                header.alg
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
            validation.set_required_spec_claims(&["exp", "iss"]);
        }
        validation.leeway = self.leeway;
        validation.validate_nbf = true;
        validation.validate_aud = false;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Unauthorized(e.to_string()))?;

        let claims = token_data.claims;

        if claims.sub.trim().is_empty() {
            return Err(AppError::Unauthorized("Token subject is empty".to_string()));
        }
        if !USERNAME_REGEX.is_match(&claims.username) {
            return Err(AppError::Unauthorized(
                "Token carries an invalid username".to_string(),
            ));
        }

        Ok(claims.into())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::Duration;

    pub const TEST_SECRET: &str = "test-secret-for-unit-tests";

    pub fn test_auth_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
            issuer: None,
            jwt_leeway: Duration::from_secs(0),
        }
    }

    /// Unexpired claims without an issuer
    pub fn claims(sub: &str, username: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            username: username.to_string(),
            email: None,
            roles: vec![],
            exp: (chrono::Utc::now().timestamp() + 3600) as u64,
            iss: None,
        }
    }

    pub fn sign_claims(claims: Claims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap()
    }

    /// Sign a token the way the identity provider would
    pub fn sign_token(sub: &str, username: &str, roles: &[&str]) -> String {
        sign_claims(Claims {
            roles: roles.iter().map(|r| r.to_string()).collect(),
            ..claims(sub, username)
        })
    }

    #[test]
    fn test_valid_token_yields_user() {
        let validator = JwtValidator::new(&test_auth_config());
        let token = sign_token("auth0|42", "ana_pop", &["admin"]);

        let user = validator.validate_token(&token).unwrap();
        assert_eq!(user.sub, "auth0|42");
        assert_eq!(user.username, "ana_pop");
        assert!(user.is_admin());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let config = AuthConfig {
            jwt_secret: "another-secret".to_string(),
            ..test_auth_config()
        };
        let validator = JwtValidator::new(&config);
        let token = sign_token("auth0|42", "ana_pop", &[]);

        assert!(matches!(
            validator.validate_token(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = sign_claims(Claims {
            exp: (chrono::Utc::now().timestamp() - 3600) as u64,
            ..claims("auth0|42", "ana_pop")
        });

        let validator = JwtValidator::new(&test_auth_config());
        tokio_test::assert_err!(validator.validate_token(&token));
    }

    #[test]
    fn test_issuer_enforced_when_configured() {
        let config = AuthConfig {
            issuer: Some("https://id.micu.market".to_string()),
            ..test_auth_config()
        };
        let validator = JwtValidator::new(&config);
        let token = sign_token("auth0|42", "ana_pop", &[]);
        assert!(validator.validate_token(&token).is_err());

        let foreign = sign_claims(Claims {
            iss: Some("https://other.example".to_string()),
            ..claims("auth0|42", "ana_pop")
        });
        assert!(validator.validate_token(&foreign).is_err());

        let issued = sign_claims(Claims {
            iss: Some("https://id.micu.market".to_string()),
            ..claims("auth0|42", "ana_pop")
        });
        let user = validator.validate_token(&issued).unwrap();
        assert_eq!(user.sub, "auth0|42");
    }

    #[test]
    fn test_garbage_token_rejected() {
        let validator = JwtValidator::new(&test_auth_config());
        assert!(validator.validate_token("not-a-jwt").is_err());
    }

    #[test]
    fn test_invalid_username_rejected() {
        let validator = JwtValidator::new(&test_auth_config());
        let token = sign_token("auth0|42", "ana pop", &[]);
        assert!(validator.validate_token(&token).is_err());
    }
}
