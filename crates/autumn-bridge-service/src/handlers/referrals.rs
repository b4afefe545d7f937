//! Referral handlers.

use futures::future::BoxFuture;

use super::{HandlerArgs, HandlerResult};

/// Create (or fetch) the current subject's referral code for a program.
pub fn create_code(args: HandlerArgs) -> BoxFuture<'static, HandlerResult> {
    Box::pin(async move {
        match args.customer_body().await {
            Ok((client, body)) => {
                HandlerResult::from_client(client.create_referral_code(body).await)
            }
            Err(result) => result,
        }
    })
}

/// Redeem a referral code on behalf of the current subject.
pub fn redeem_code(args: HandlerArgs) -> BoxFuture<'static, HandlerResult> {
    Box::pin(async move {
        match args.customer_body().await {
            Ok((client, body)) => {
                HandlerResult::from_client(client.redeem_referral_code(body).await)
            }
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
    async fn referral_paths() {
        let api = RecordingApi::ok(json!({ "code": "ABC" }));

        let result = create_code(args(&api, json!({ "program_id": "p1" }), ann())).await;
        assert_eq!(result.body["code"], "ABC");
        assert_eq!(api.last().path, "/referrals/code");

        redeem_code(args(&api, json!({ "code": "ABC" }), ann())).await;
        let request = api.last();
        assert_eq!(request.path, "/referrals/redeem");
        assert_eq!(request.body.unwrap()["customer_id"], "u1");
    }

    #[tokio::test]
    async fn redeem_requires_subject() {
        let api = RecordingApi::ok(json!({}));

        let result = redeem_code(args(&api, json!({ "code": "ABC" }), None)).await;

        assert_eq!(result.status, 401);
        assert_eq!(api.count(), 0);
    }
}
