//! Login integration tests.

use super::common::login_from_env;
use cloudy_sf::auth::{Credentials, ErrorKind, UsernamePasswordLogin};

#[tokio::test]
#[ignore = "requires SF_USERNAME/SF_PASSWORD/SF_SECURITY_TOKEN"]
async fn test_soap_login() {
    let login = login_from_env().expect("SF_USERNAME and SF_PASSWORD must be set");
    let creds = login.authenticate().await.expect("login should succeed");

    assert!(creds.is_valid());
    assert!(creds.instance_url().starts_with("https://"));
    assert!(!creds.instance_url().contains("/services"));
}

#[tokio::test]
#[ignore = "talks to login.salesforce.com"]
async fn test_soap_login_bad_password_is_fault() {
    let err = UsernamePasswordLogin::new("nobody@example.invalid", "wrong", "")
        .authenticate()
        .await
        .expect_err("login must fail");

    assert!(
        matches!(err.kind, ErrorKind::SoapFault { .. }),
        "expected SOAP fault, got {err:?}"
    );
}
