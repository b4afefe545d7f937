//! Entity handlers.
//!
//! Entities (seats, workspaces, ...) live under the current subject's
//! customer record.

use futures::future::BoxFuture;

use super::{object_or_empty, HandlerArgs, HandlerResult};

/// Path parameter naming the entity.
const ENTITY_ID_PARAM: &str = "entityId";

fn entity_id(args: &HandlerArgs) -> Result<String, HandlerResult> {
    args.path_params
        .get(ENTITY_ID_PARAM)
        .filter(|id| !id.is_empty())
        .cloned()
        .ok_or_else(|| HandlerResult::error(400, "Missing entity id", "invalid_request"))
}

/// Create one entity (object body) or several (array body).
pub fn create_entity(args: HandlerArgs) -> BoxFuture<'static, HandlerResult> {
    Box::pin(async move {
        let (client, customer_id, body) = match args.scoped_to_customer().await {
            Ok(parts) => parts,
            Err(result) => return result,
        };

        HandlerResult::from_client(
            client
                .create_entity(&customer_id, object_or_empty(body))
                .await,
        )
    })
}

/// Fetch an entity.
pub fn get_entity(args: HandlerArgs) -> BoxFuture<'static, HandlerResult> {
    Box::pin(async move {
        let entity_id = match entity_id(&args) {
            Ok(id) => id,
            Err(result) => return result,
        };
        let query = args.query.clone();
        let (client, customer_id, _) = match args.scoped_to_customer().await {
            Ok(parts) => parts,
            Err(result) => return result,
        };

        HandlerResult::from_client(client.get_entity(&customer_id, &entity_id, query).await)
    })
}

/// Delete an entity.
pub fn delete_entity(args: HandlerArgs) -> BoxFuture<'static, HandlerResult> {
    Box::pin(async move {
        let entity_id = match entity_id(&args) {
            Ok(id) => id,
            Err(result) => return result,
        };
        let (client, customer_id, _) = match args.scoped_to_customer().await {
            Ok(parts) => parts,
            Err(result) => return result,
        };

        HandlerResult::from_client(client.delete_entity(&customer_id, &entity_id).await)
    })
}

#[cfg(test)]
mod tests {
    use autumn_bridge_client::BillingMethod;
    use serde_json::{json, Value};

    use super::super::testing::{ann, args, RecordingApi};
    use super::*;

    #[tokio::test]
    async fn create_accepts_arrays() {
        let api = RecordingApi::ok(json!({ "success": true }));

        create_entity(args(
            &api,
            json!([{ "id": "seat-1", "feature_id": "seats" }]),
            ann(),
        ))
        .await;

        let request = api.last();
        assert_eq!(request.path, "/customers/u1/entities");
        assert_eq!(
            request.body.unwrap(),
            json!([{ "id": "seat-1", "feature_id": "seats" }])
        );
    }

    #[tokio::test]
    async fn get_and_delete_use_path_param() {
        let api = RecordingApi::ok(json!({ "id": "seat-1" }));

        let mut get_args = args(&api, Value::Null, ann());
        get_args
            .path_params
            .insert(ENTITY_ID_PARAM.to_string(), "seat-1".to_string());
        get_args
            .query
            .insert("expand".to_string(), "invoices".to_string());
        get_entity(get_args).await;

        let request = api.last();
        assert_eq!(request.method, BillingMethod::Get);
        assert_eq!(request.path, "/customers/u1/entities/seat-1");
        assert_eq!(request.query["expand"], "invoices");

        let mut delete_args = args(&api, Value::Null, ann());
        delete_args
            .path_params
            .insert(ENTITY_ID_PARAM.to_string(), "seat-1".to_string());
        delete_entity(delete_args).await;

        assert_eq!(api.last().method, BillingMethod::Delete);
    }

    #[tokio::test]
    async fn missing_entity_id() {
        let api = RecordingApi::ok(json!({}));

        let result = get_entity(args(&api, Value::Null, ann())).await;

        assert_eq!(result.status, 400);
        assert_eq!(api.count(), 0);
    }
}
