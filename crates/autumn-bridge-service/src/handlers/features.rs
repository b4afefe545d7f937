//! Feature access and usage handlers.

use futures::future::BoxFuture;

use super::{HandlerArgs, HandlerResult};

/// Check whether the current subject may use a feature or product.
pub fn check(args: HandlerArgs) -> BoxFuture<'static, HandlerResult> {
    Box::pin(async move {
        match args.customer_body().await {
            Ok((client, body)) => HandlerResult::from_client(client.check(body).await),
            Err(result) => result,
        }
    })
}

/// Record usage for the current subject.
pub fn track(args: HandlerArgs) -> BoxFuture<'static, HandlerResult> {
    Box::pin(async move {
        match args.customer_body().await {
            Ok((client, body)) => HandlerResult::from_client(client.track(body).await),
            Err(result) => result,
        }
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::testing::{ann, args, RecordingApi};
    use super::*;

    #[tokio::test]
    async fn track_keeps_property_bag() {
        let api = RecordingApi::ok(json!({ "id": "evt_1" }));

        track(args(
            &api,
            json!({ "feature_id": "messages", "properties": { "modelName": "x" } }),
            ann(),
        ))
        .await;

        let body = api.last().body.unwrap();
        assert_eq!(body["properties"], json!({ "modelName": "x" }));
        assert_eq!(body["customer_id"], "u1");
    }

    #[tokio::test]
    async fn check_surfaces_provider_status() {
        let api = std::sync::Arc::new(super::super::testing::RecordingApi {
            requests: std::sync::Mutex::new(Vec::new()),
            response: autumn_bridge_client::BillingResponse {
                status: 402,
                body: json!({ "message": "limit exceeded", "code": "limit_exceeded" }),
            },
        });

        let result = check(args(&api, json!({ "feature_id": "messages" }), ann())).await;

        assert!(result.is_error());
        assert_eq!(result.message().as_deref(), Some("limit exceeded"));
        assert_eq!(api.last().path, "/check");
    }
}
