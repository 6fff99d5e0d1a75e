//! Registry lookups against a mock server.

use core::time::Duration;
use ossval_lib::facts::Ecosystem;
use ossval_lib::resolve::{RegistryEndpoints, RegistryResolver, Resolver};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn resolver(server: &MockServer) -> RegistryResolver {
    RegistryResolver::new(RegistryEndpoints::all(&server.uri()))
        .unwrap()
        .with_retry_delay(Duration::from_millis(1))
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri does not support network operations")]
async fn test_crates_io_repository() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/crates/serde"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "crate": {
                "name": "serde",
                "repository": "https://github.com/serde-rs/serde.git",
                "homepage": "https://serde.rs"
            }
        })))
        .mount(&server)
        .await;

    let url = resolver(&server).await.resolve("serde", Ecosystem::Cargo).await.unwrap();
    assert_eq!(url.as_str(), "https://github.com/serde-rs/serde");
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri does not support network operations")]
async fn test_crates_io_falls_back_to_forge_homepage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/crates/tiny"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "crate": { "repository": null, "homepage": "https://gitlab.com/acme/tiny" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/crates/docs-only"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "crate": { "repository": null, "homepage": "https://docs-only.example.com" }
        })))
        .mount(&server)
        .await;

    let resolver = resolver(&server).await;
    let url = resolver.resolve("tiny", Ecosystem::Cargo).await.unwrap();
    assert_eq!(url.as_str(), "https://gitlab.com/acme/tiny");
    assert!(resolver.resolve("docs-only", Ecosystem::Cargo).await.is_none());
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri does not support network operations")]
async fn test_pypi_project_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pypi/requests/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "info": {
                "home_page": "https://requests.readthedocs.io",
                "project_urls": {
                    "Documentation": "https://requests.readthedocs.io",
                    "Homepage": "https://requests.readthedocs.io",
                    "Source": "https://github.com/psf/requests"
                }
            }
        })))
        .mount(&server)
        .await;

    let url = resolver(&server).await.resolve("requests", Ecosystem::Pypi).await.unwrap();
    assert_eq!(url.as_str(), "https://github.com/psf/requests");
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri does not support network operations")]
async fn test_pypi_home_page_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pypi/oldpkg/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "info": { "home_page": "https://github.com/someone/oldpkg", "project_urls": null }
        })))
        .mount(&server)
        .await;

    let url = resolver(&server).await.resolve("oldpkg", Ecosystem::Pypi).await.unwrap();
    assert_eq!(url.as_str(), "https://github.com/someone/oldpkg");
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri does not support network operations")]
async fn test_npm_repository_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/express"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "express",
            "repository": { "type": "git", "url": "git+https://github.com/expressjs/express.git" }
        })))
        .mount(&server)
        .await;

    let url = resolver(&server).await.resolve("express", Ecosystem::Npm).await.unwrap();
    assert_eq!(url.as_str(), "https://github.com/expressjs/express");
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri does not support network operations")]
async fn test_unknown_package_is_unresolved() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/crates/does-not-exist"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    assert!(resolver(&server).await.resolve("does-not-exist", Ecosystem::Cargo).await.is_none());
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri does not support network operations")]
async fn test_registry_outage_is_unresolved() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/left-pad"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    assert!(resolver(&server).await.resolve("left-pad", Ecosystem::Npm).await.is_none());
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri does not support network operations")]
async fn test_malformed_response_is_unresolved() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/crates/weird"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    assert!(resolver(&server).await.resolve("weird", Ecosystem::Cargo).await.is_none());
}
