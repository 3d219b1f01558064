//! Code generation against a live org.

use super::common::get_credentials;
use cloudy_sf::Generator;

#[tokio::test]
#[ignore = "requires a Salesforce org"]
async fn test_generate_account_and_contact() {
    let creds = get_credentials().await;
    let client = creds.client().expect("client");
    let dir = tempfile::tempdir().unwrap();

    let generator = Generator::new(client, dir.path());
    let written = generator
        .generate_all(&["Account", "Contact"])
        .await
        .expect("generation should succeed");

    assert_eq!(written.len(), 3);
    let account = std::fs::read_to_string(dir.path().join("account.rs")).unwrap();
    assert!(account.contains("pub struct Account"));
}
