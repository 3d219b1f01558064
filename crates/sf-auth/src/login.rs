//! Username/password login against the Salesforce SOAP partner endpoint.

use cloudy_sf_client::security::xml;
use cloudy_sf_client::{ClientConfig, SfHttpClient, DEFAULT_API_VERSION};
use tracing::{info, instrument, warn};

use crate::credentials::SalesforceCredentials;
use crate::error::{Error, ErrorKind, Result};
use crate::PRODUCTION_LOGIN_URL;

/// Username/password login with a security token.
///
/// The security token is appended to the password, as the SOAP `login`
/// call expects. All secrets are redacted in Debug output.
#[derive(Clone)]
pub struct UsernamePasswordLogin {
    username: String,
    password: String,
    security_token: String,
    login_url: String,
    api_version: String,
    config: ClientConfig,
}

impl std::fmt::Debug for UsernamePasswordLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsernamePasswordLogin")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("security_token", &"[REDACTED]")
            .field("login_url", &self.login_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl UsernamePasswordLogin {
    /// Create a login for the production login host.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        security_token: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            security_token: security_token.into(),
            login_url: PRODUCTION_LOGIN_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            config: ClientConfig::default(),
        }
    }

    /// Set the login host, e.g. [`crate::SANDBOX_LOGIN_URL`] or a My Domain URL.
    pub fn with_login_url(mut self, url: impl Into<String>) -> Self {
        self.login_url = url.into();
        self
    }

    /// Set the API version used for the login call and the resulting session.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set the HTTP configuration used for the login call.
    pub fn with_client_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    /// The SOAP endpoint the login is posted to.
    pub fn login_endpoint(&self) -> String {
        format!(
            "{}/services/Soap/u/{}",
            self.login_url.trim_end_matches('/'),
            self.api_version
        )
    }

    fn envelope(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<env:Envelope xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:env="http://schemas.xmlsoap.org/soap/envelope/">
  <env:Body>
    <n1:login xmlns:n1="urn:partner.soap.sforce.com">
      <n1:username>{}</n1:username>
      <n1:password>{}{}</n1:password>
    </n1:login>
  </env:Body>
</env:Envelope>"#,
            xml::escape(&self.username),
            xml::escape(&self.password),
            xml::escape(&self.security_token),
        )
    }

    /// Perform the login and return the session credentials.
    ///
    /// The instance URL is the origin of the returned `serverUrl`.
    #[instrument(skip(self), fields(username = %self.username, login_url = %self.login_url))]
    pub async fn authenticate(&self) -> Result<SalesforceCredentials> {
        let http = SfHttpClient::new(self.config.clone())?;
        let request = http
            .post(self.login_endpoint())
            .header("SOAPAction", "login")
            .xml(self.envelope());

        let body = match http.execute(request).await {
            Ok(response) => response.text().await?,
            Err(err) => {
                // Login faults usually arrive with a 500 status.
                if let Some(fault) = err.body().and_then(parse_soap_fault) {
                    warn!(code = %fault.0, "Login rejected");
                    return Err(soap_fault_error(fault));
                }
                return Err(err.into());
            }
        };

        if let Some(fault) = parse_soap_fault(&body) {
            warn!(code = %fault.0, "Login rejected");
            return Err(soap_fault_error(fault));
        }

        let session_id = extract_element(&body, "sessionId")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::new(ErrorKind::InvalidResponse(
                    "missing sessionId in login response".to_string(),
                ))
            })?;
        let server_url = extract_element(&body, "serverUrl")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::new(ErrorKind::InvalidResponse(
                    "missing serverUrl in login response".to_string(),
                ))
            })?;

        let instance_url = instance_url_from_server_url(&server_url)?;
        info!(instance_url = %instance_url, "Authentication successful");

        Ok(SalesforceCredentials::new(
            instance_url,
            session_id,
            &self.api_version,
        ))
    }
}

fn soap_fault_error((code, message): (String, String)) -> Error {
    Error::new(ErrorKind::SoapFault { code, message })
}

/// Returns `(faultcode, faultstring)` if the document is a SOAP fault.
fn parse_soap_fault(xml: &str) -> Option<(String, String)> {
    if !xml.contains("faultstring") {
        return None;
    }

    let message =
        extract_element(xml, "faultstring").unwrap_or_else(|| "Unknown error".to_string());
    let code = extract_element(xml, "faultcode").unwrap_or_else(|| "unknown".to_string());
    Some((code, message))
}

/// Extract the text of the first `<tag>...</tag>` element, with or without
/// a namespace prefix on the tag.
fn extract_element(xml: &str, tag: &str) -> Option<String> {
    for prefix in ["", "sf:", "soapenv:"] {
        let start = format!("<{prefix}{tag}>");
        let end = format!("</{prefix}{tag}>");
        if let Some(start_idx) = xml.find(&start) {
            let content = &xml[start_idx + start.len()..];
            let end_idx = content.find(&end)?;
            return Some(content[..end_idx].trim().to_string());
        }
    }
    None
}

fn instance_url_from_server_url(server_url: &str) -> Result<String> {
    let url = url::Url::parse(server_url)?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(Error::new(ErrorKind::InvalidResponse(format!(
            "serverUrl has no origin: {server_url}"
        ))));
    }
    Ok(origin.ascii_serialization())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Credentials;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LOGIN_OK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns="urn:partner.soap.sforce.com">
  <soapenv:Body>
    <loginResponse>
      <result>
        <metadataServerUrl>https://acme.my.salesforce.com/services/Soap/m/62.0/00D000000000001</metadataServerUrl>
        <passwordExpired>false</passwordExpired>
        <sandbox>false</sandbox>
        <serverUrl>https://acme.my.salesforce.com/services/Soap/u/62.0/00D000000000001</serverUrl>
        <sessionId>00D000000000001!AQ4AQFakeSession</sessionId>
        <userId>005000000000001</userId>
      </result>
    </loginResponse>
  </soapenv:Body>
</soapenv:Envelope>"#;

    const LOGIN_FAULT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:sf="urn:fault.partner.soap.sforce.com">
  <soapenv:Body>
    <soapenv:Fault>
      <faultcode>sf:INVALID_LOGIN</faultcode>
      <faultstring>INVALID_LOGIN: Invalid username, password, security token; or user locked out.</faultstring>
    </soapenv:Fault>
  </soapenv:Body>
</soapenv:Envelope>"#;

    fn login(server: &MockServer) -> UsernamePasswordLogin {
        UsernamePasswordLogin::new("me@example.com", "p&ss", "TOKEN")
            .with_login_url(server.uri())
            .with_api_version("62.0")
    }

    #[test]
    fn test_login_endpoint() {
        let login = UsernamePasswordLogin::new("u", "p", "t")
            .with_login_url("https://test.salesforce.com/")
            .with_api_version("52.0");
        assert_eq!(
            login.login_endpoint(),
            "https://test.salesforce.com/services/Soap/u/52.0"
        );
    }

    #[test]
    fn test_envelope_escapes_and_concatenates_token() {
        let login = UsernamePasswordLogin::new("a<b@example.com", "p&ss", "TOK");
        let envelope = login.envelope();

        assert!(envelope.contains("<n1:username>a&lt;b@example.com</n1:username>"));
        assert!(envelope.contains("<n1:password>p&amp;ssTOK</n1:password>"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let login = UsernamePasswordLogin::new("me@example.com", "hunter2", "sekrit");
        let debug = format!("{login:?}");
        assert!(debug.contains("me@example.com"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("sekrit"));
    }

    #[test]
    fn test_extract_element() {
        assert_eq!(
            extract_element(LOGIN_OK, "sessionId").as_deref(),
            Some("00D000000000001!AQ4AQFakeSession")
        );
        assert_eq!(
            extract_element(LOGIN_FAULT, "faultcode").as_deref(),
            Some("sf:INVALID_LOGIN")
        );
        assert!(extract_element(LOGIN_OK, "missing").is_none());
    }

    #[test]
    fn test_instance_url_from_server_url() {
        assert_eq!(
            instance_url_from_server_url(
                "https://acme.my.salesforce.com/services/Soap/u/62.0/00D000000000001"
            )
            .unwrap(),
            "https://acme.my.salesforce.com"
        );
        assert!(instance_url_from_server_url("not a url").is_err());
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/services/Soap/u/62.0"))
            .and(header("SOAPAction", "login"))
            .and(body_string_contains("<n1:password>p&amp;ssTOKEN</n1:password>"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_OK))
            .expect(1)
            .mount(&server)
            .await;

        let creds = login(&server).authenticate().await.unwrap();

        assert_eq!(creds.instance_url(), "https://acme.my.salesforce.com");
        assert_eq!(creds.access_token(), "00D000000000001!AQ4AQFakeSession");
        assert_eq!(creds.api_version(), "62.0");
    }

    #[tokio::test]
    async fn test_authenticate_fault_with_500() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/services/Soap/u/62.0"))
            .respond_with(ResponseTemplate::new(500).set_body_string(LOGIN_FAULT))
            .mount(&server)
            .await;

        let err = login(&server).authenticate().await.unwrap_err();
        match err.kind {
            ErrorKind::SoapFault { code, message } => {
                assert_eq!(code, "sf:INVALID_LOGIN");
                assert!(message.starts_with("INVALID_LOGIN"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_authenticate_fault_with_200() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/services/Soap/u/62.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_FAULT))
            .mount(&server)
            .await;

        let err = login(&server).authenticate().await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::SoapFault { .. }));
    }

    #[tokio::test]
    async fn test_authenticate_http_error_without_fault() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/services/Soap/u/62.0"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let err = login(&server).authenticate().await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Http { status: 503 }));
    }

    #[tokio::test]
    async fn test_authenticate_missing_session() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/services/Soap/u/62.0"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<loginResponse><result></result></loginResponse>"),
            )
            .mount(&server)
            .await;

        let err = login(&server).authenticate().await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidResponse(_)));
    }
}
