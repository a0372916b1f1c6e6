//! OAuth 2.0 token acquisition
//!
//! Covers the four grants the request auth descriptor can name:
//! authorization code, client credentials, resource owner password, and
//! refresh. The authorization-code flow only builds the consent URL and
//! exchanges the pasted code; no callback listener is run.

use serde::Deserialize;
use url::Url;

use crate::errors::{ReqlabError, Result};
use crate::models::types::Auth;

const TOKEN_TIMEOUT_SECS: u64 = 30;
const STATE_PARAM: &str = "reqlab_oauth2_state";

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub scope: String,
}

impl TokenResponse {
    /// Write the tokens back into an auth descriptor. A grant that returns
    /// no refresh token keeps the one already stored.
    pub fn apply_to(&self, auth: &mut Auth) {
        auth.oauth2_access_token = self.access_token.clone();
        auth.token = self.access_token.clone();
        if !self.refresh_token.is_empty() {
            auth.oauth2_refresh_token = self.refresh_token.clone();
        }
    }
}

pub struct OAuth2Client {
    client: reqwest::Client,
}

impl OAuth2Client {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(TOKEN_TIMEOUT_SECS))
            .build()
            .map_err(|e| ReqlabError::Auth(format!("failed to build token client: {e}")))?;
        Ok(Self { client })
    }

    /// The consent URL for the authorization-code grant.
    pub fn authorization_url(&self, auth: &Auth) -> Result<String> {
        if auth.oauth2_auth_url.is_empty() {
            return Err(ReqlabError::Auth("authorization URL is required".into()));
        }
        if auth.oauth2_client_id.is_empty() {
            return Err(ReqlabError::Auth("client ID is required".into()));
        }
        let mut url = Url::parse(&auth.oauth2_auth_url)?;
        url.query_pairs_mut()
            .append_pair("client_id", &auth.oauth2_client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &auth.oauth2_redirect_url)
            .append_pair("scope", &auth.oauth2_scope)
            .append_pair("state", STATE_PARAM);
        Ok(url.to_string())
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, auth: &Auth, code: &str) -> Result<TokenResponse> {
        let form = vec![
            ("grant_type", "authorization_code".to_string()),
            ("code", code.to_string()),
            ("redirect_uri", auth.oauth2_redirect_url.clone()),
            ("client_id", auth.oauth2_client_id.clone()),
            ("client_secret", auth.oauth2_client_secret.clone()),
        ];
        self.request_token(&auth.oauth2_token_url, form).await
    }

    pub async fn client_credentials(&self, auth: &Auth) -> Result<TokenResponse> {
        let mut form = vec![
            ("grant_type", "client_credentials".to_string()),
            ("client_id", auth.oauth2_client_id.clone()),
            ("client_secret", auth.oauth2_client_secret.clone()),
        ];
        if !auth.oauth2_scope.is_empty() {
            form.push(("scope", auth.oauth2_scope.clone()));
        }
        self.request_token(&auth.oauth2_token_url, form).await
    }

    pub async fn password(&self, auth: &Auth) -> Result<TokenResponse> {
        let mut form = vec![
            ("grant_type", "password".to_string()),
            ("username", auth.username.clone()),
            ("password", auth.password.clone()),
            ("client_id", auth.oauth2_client_id.clone()),
            ("client_secret", auth.oauth2_client_secret.clone()),
        ];
        if !auth.oauth2_scope.is_empty() {
            form.push(("scope", auth.oauth2_scope.clone()));
        }
        self.request_token(&auth.oauth2_token_url, form).await
    }

    pub async fn refresh(&self, auth: &Auth) -> Result<TokenResponse> {
        if auth.oauth2_refresh_token.is_empty() {
            return Err(ReqlabError::Auth("no refresh token available".into()));
        }
        let form = vec![
            ("grant_type", "refresh_token".to_string()),
            ("refresh_token", auth.oauth2_refresh_token.clone()),
            ("client_id", auth.oauth2_client_id.clone()),
            ("client_secret", auth.oauth2_client_secret.clone()),
        ];
        self.request_token(&auth.oauth2_token_url, form).await
    }

    async fn request_token(
        &self,
        token_url: &str,
        form: Vec<(&str, String)>,
    ) -> Result<TokenResponse> {
        if token_url.is_empty() {
            return Err(ReqlabError::Auth("token URL is required".into()));
        }
        let response = self
            .client
            .post(token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| ReqlabError::Auth(format!("token request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ReqlabError::Auth(format!("failed to read token response: {e}")))?;
        if !status.is_success() {
            return Err(ReqlabError::Auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }
        serde_json::from_str(&body)
            .map_err(|e| ReqlabError::Auth(format!("malformed token response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::AuthType;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn oauth_auth(token_url: &str) -> Auth {
        Auth {
            auth_type: AuthType::OAuth2,
            oauth2_token_url: token_url.into(),
            oauth2_client_id: "client".into(),
            oauth2_client_secret: "secret".into(),
            oauth2_scope: "read".into(),
            ..Default::default()
        }
    }

    #[test]
    fn authorization_url_carries_required_parameters() {
        let client = OAuth2Client::new().unwrap();
        let mut auth = oauth_auth("https://example.com/token");
        auth.oauth2_auth_url = "https://example.com/authorize".into();
        auth.oauth2_redirect_url = "http://localhost:9876/callback".into();

        let url = client.authorization_url(&auth).unwrap();
        assert!(url.contains("client_id=client"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("state=reqlab_oauth2_state"));
    }

    #[test]
    fn authorization_url_requires_endpoint_and_client() {
        let client = OAuth2Client::new().unwrap();
        let auth = oauth_auth("https://example.com/token");
        assert!(client.authorization_url(&auth).is_err());
    }

    #[tokio::test]
    async fn client_credentials_posts_form_and_parses_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("scope=read"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "abc",
                "token_type": "Bearer",
                "expires_in": 3600,
                "refresh_token": "ref"
            })))
            .mount(&server)
            .await;

        let client = OAuth2Client::new().unwrap();
        let auth = oauth_auth(&format!("{}/token", server.uri()));
        let token = client.client_credentials(&auth).await.unwrap();
        assert_eq!(token.access_token, "abc");
        assert_eq!(token.expires_in, Some(3600));
    }

    #[tokio::test]
    async fn error_status_surfaces_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_client"}"#),
            )
            .mount(&server)
            .await;

        let client = OAuth2Client::new().unwrap();
        let auth = oauth_auth(&format!("{}/token", server.uri()));
        let err = client.client_credentials(&auth).await.unwrap_err().to_string();
        assert!(err.contains("invalid_client"), "{err}");
    }

    #[test]
    fn apply_to_keeps_existing_refresh_token_when_absent() {
        let mut auth = oauth_auth("https://example.com/token");
        auth.oauth2_refresh_token = "old-refresh".into();

        let token = TokenResponse {
            access_token: "new-access".into(),
            token_type: "Bearer".into(),
            expires_in: None,
            refresh_token: String::new(),
            scope: String::new(),
        };
        token.apply_to(&mut auth);
        assert_eq!(auth.oauth2_access_token, "new-access");
        assert_eq!(auth.oauth2_refresh_token, "old-refresh");
    }

    #[test]
    fn refresh_requires_a_stored_token() {
        let client = OAuth2Client::new().unwrap();
        let auth = oauth_auth("https://example.com/token");
        let result = tokio_test::block_on(client.refresh(&auth));
        assert!(result.is_err());
    }
}
