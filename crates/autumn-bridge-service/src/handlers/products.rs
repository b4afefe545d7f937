//! Product catalog handlers.

use futures::future::BoxFuture;

use super::{HandlerArgs, HandlerResult};

/// List products.
///
/// Does not need a billing subject, so the subject is never resolved.
pub fn list_products(args: HandlerArgs) -> BoxFuture<'static, HandlerResult> {
    Box::pin(async move { HandlerResult::from_client(args.client.list_products(args.query).await) })
}

#[cfg(test)]
mod tests {
    use autumn_bridge_client::BillingMethod;
    use serde_json::{json, Value};

    use super::super::testing::{ann, args, RecordingApi};
    use super::*;

    #[tokio::test]
    async fn lists_without_resolving_subject() {
        let api = RecordingApi::ok(json!({ "list": [{ "id": "pro" }] }));
        let mut handler_args = args(&api, Value::Null, ann());
        handler_args.subject = autumn_bridge_core::SubjectProvider::derived(
            None,
            autumn_bridge_core::OrganizationContext::none(),
            &autumn_bridge_core::PluginConfig::default(),
        );
        handler_args
            .query
            .insert("limit".to_string(), "1".to_string());

        let result = list_products(handler_args).await;

        assert_eq!(result.status, 200);
        let request = api.last();
        assert_eq!(request.method, BillingMethod::Get);
        assert_eq!(request.path, "/products");
        assert_eq!(request.query["limit"], "1");
    }
}
