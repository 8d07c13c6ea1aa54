mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let app = common::test_app();
    let (status, body) = app.send(Method::GET, "/health", None, None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn empty_catalog_is_404() -> Result<()> {
    let app = common::test_app();
    let (status, body) = app.send(Method::GET, "/drinks", None, None).await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"success": false, "error": 404, "message": "resource not found"})
    );
    Ok(())
}

#[tokio::test]
async fn list_uses_short_projection() -> Result<()> {
    let app = common::test_app();
    let id = app.seed("latte").await;

    let (status, body) = app.send(Method::GET, "/drinks", None, None).await?;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(
        body,
        json!({
            "success": true,
            "drinks": [{
                "id": id,
                "title": "latte",
                "recipe": [
                    {"color": "brown", "parts": 1},
                    {"color": "white", "parts": 2}
                ]
            }]
        })
    );
    Ok(())
}

#[tokio::test]
async fn public_list_ignores_authorization_header() -> Result<()> {
    let app = common::test_app();
    app.seed("latte").await;

    let (status, _) = app
        .send(Method::GET, "/drinks", Some("garbage"), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn unknown_route_is_404_envelope() -> Result<()> {
    let app = common::test_app();
    let (status, body) = app.send(Method::GET, "/coffee", None, None).await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], 404);
    Ok(())
}

#[tokio::test]
async fn wrong_method_is_405_envelope() -> Result<()> {
    let app = common::test_app();

    for (method, uri) in [
        (Method::PUT, "/drinks"),
        (Method::DELETE, "/drinks"),
        (Method::POST, "/drinks-detail"),
        (Method::GET, "/drinks/1"),
    ] {
        let (status, body) = app.send(method.clone(), uri, None, None).await?;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{} {}", method, uri);
        assert_eq!(
            body,
            json!({"success": false, "error": 405, "message": "Method Not Allowed"})
        );
    }
    Ok(())
}
