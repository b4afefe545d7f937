//! Purchase flow handlers: checkout, attach and cancel.

use futures::future::BoxFuture;

use super::{HandlerArgs, HandlerResult};

/// Start a checkout for the current subject.
pub fn checkout(args: HandlerArgs) -> BoxFuture<'static, HandlerResult> {
    Box::pin(async move {
        match args.customer_body().await {
            Ok((client, body)) => HandlerResult::from_client(client.checkout(body).await),
            Err(result) => result,
        }
    })
}

/// Attach a product to the current subject.
pub fn attach(args: HandlerArgs) -> BoxFuture<'static, HandlerResult> {
    Box::pin(async move {
        match args.customer_body().await {
            Ok((client, body)) => HandlerResult::from_client(client.attach(body).await),
            Err(result) => result,
        }
    })
}

/// Cancel a product for the current subject.
pub fn cancel(args: HandlerArgs) -> BoxFuture<'static, HandlerResult> {
    Box::pin(async move {
        match args.customer_body().await {
            Ok((client, body)) => HandlerResult::from_client(client.cancel(body).await),
            Err(result) => result,
        }
    })
}
