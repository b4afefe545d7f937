//! Customer handlers.

use futures::future::BoxFuture;
use serde_json::{Map, Value};

use super::{merge_object, object_or_empty, HandlerArgs, HandlerResult};

/// Get or create the customer for the current subject.
///
/// The subject's id, name and email seed the customer record; body fields
/// such as `expand` are forwarded.
pub fn create_customer(args: HandlerArgs) -> BoxFuture<'static, HandlerResult> {
    Box::pin(async move {
        let subject = match args.require_subject().await {
            Ok(subject) => subject,
            Err(result) => return result,
        };

        let mut fields = Map::new();
        fields.insert("id".to_string(), Value::String(subject.subject_id));
        if let Some(name) = subject.display_data.name {
            fields.insert("name".to_string(), Value::String(name));
        }
        if let Some(email) = subject.display_data.email {
            fields.insert("email".to_string(), Value::String(email));
        }

        let body = match merge_object(args.body, fields) {
            Ok(body) => body,
            Err(result) => return result,
        };

        HandlerResult::from_client(args.client.create_customer(body).await)
    })
}

/// Open a billing portal session for the current subject.
pub fn billing_portal(args: HandlerArgs) -> BoxFuture<'static, HandlerResult> {
    Box::pin(async move {
        let (client, customer_id, body) = match args.scoped_to_customer().await {
            Ok(parts) => parts,
            Err(result) => return result,
        };

        HandlerResult::from_client(
            client
                .billing_portal(&customer_id, object_or_empty(body))
                .await,
        )
    })
}

#[cfg(test)]
mod tests {
    use autumn_bridge_client::BillingMethod;
    use serde_json::json;

    use super::super::testing::{ann, args, RecordingApi};
    use super::*;

    #[tokio::test]
    async fn create_customer_seeds_identity() {
        let api = RecordingApi::ok(json!({ "id": "u1" }));

        let result = create_customer(args(&api, json!({ "expand": ["invoices"] }), ann())).await;

        assert_eq!(result.status, 200);
        let request = api.last();
        assert_eq!(request.method, BillingMethod::Post);
        assert_eq!(request.path, "/customers");
        assert_eq!(
            request.body.unwrap(),
            json!({ "id": "u1", "name": "Ann", "email": "a@x.com", "expand": ["invoices"] })
        );
    }

    #[tokio::test]
    async fn create_customer_without_subject() {
        let api = RecordingApi::ok(json!({}));

        let result = create_customer(args(&api, Value::Null, None)).await;

        assert_eq!(result.status, 401);
        assert_eq!(result.code().as_deref(), Some("no_customer_id"));
        assert_eq!(api.count(), 0);
    }

    #[tokio::test]
    async fn billing_portal_is_customer_scoped() {
        let api = RecordingApi::ok(json!({ "url": "https://portal" }));

        let result = billing_portal(args(&api, Value::Null, ann())).await;

        assert_eq!(result.body["url"], "https://portal");
        let request = api.last();
        assert_eq!(request.path, "/customers/u1/billing_portal");
        assert_eq!(request.body.unwrap(), json!({}));
    }
}
