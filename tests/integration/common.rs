use cloudy_sf::auth::{SalesforceCredentials, UsernamePasswordLogin, PRODUCTION_LOGIN_URL};
use cloudy_sf::SalesforceRestClient;

/// Get authenticated credentials for integration tests.
///
/// Prefers `SF_USERNAME`/`SF_PASSWORD`/`SF_SECURITY_TOKEN` when set, otherwise
/// a pre-issued session from `SF_INSTANCE_URL`/`SF_ACCESS_TOKEN`. Panics with
/// a hint when neither is configured.
pub async fn get_credentials() -> SalesforceCredentials {
    if let Some(login) = login_from_env() {
        return login
            .authenticate()
            .await
            .unwrap_or_else(|e| panic!("SOAP login failed: {e}"));
    }

    SalesforceCredentials::from_env().unwrap_or_else(|e| {
        panic!(
            "{e}\n\nSet SF_USERNAME, SF_PASSWORD and SF_SECURITY_TOKEN, \
             or SF_INSTANCE_URL and SF_ACCESS_TOKEN, to run integration tests."
        )
    })
}

pub fn login_from_env() -> Option<UsernamePasswordLogin> {
    let username = std::env::var("SF_USERNAME").ok()?;
    let password = std::env::var("SF_PASSWORD").ok()?;
    let token = std::env::var("SF_SECURITY_TOKEN").unwrap_or_default();
    let login_url =
        std::env::var("SF_LOGIN_URL").unwrap_or_else(|_| PRODUCTION_LOGIN_URL.to_string());

    Some(UsernamePasswordLogin::new(username, password, token).with_login_url(login_url))
}

pub async fn rest_client() -> SalesforceRestClient {
    let creds = get_credentials().await;
    SalesforceRestClient::from_credentials(&creds).expect("Failed to create REST client")
}

/// A name unique to this test run.
pub fn unique_name(prefix: &str) -> String {
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("CloudyIntTest_{prefix}_{millis}")
}
