//! Mail dispatcher: submit one message and get back a task ID.

use std::future::Future;

use crate::blockchain::wallet::Wallet;
use crate::observability::metrics;
use crate::web3mail::guard::{ChainGuard, ChainQuery};
use crate::web3mail::types::{GatewayError, SendRequest, TaskId, Web3MailError};

/// Submission path for a single message.
pub trait MailDispatcher: Send + Sync {
    fn send_email(
        &self,
        wallet: &Wallet,
        request: &SendRequest<'_>,
    ) -> impl Future<Output = Result<TaskId, GatewayError>> + Send;
}

/// Guarded single-message dispatch.
///
/// The chain check fails fast; nothing is submitted on a wrong network.
/// Task completion is not polled.
pub async fn send_mail<Q, M>(
    guard: &ChainGuard<Q>,
    dispatcher: &M,
    wallet: &Wallet,
    request: &SendRequest<'_>,
) -> Result<TaskId, Web3MailError>
where
    Q: ChainQuery,
    M: MailDispatcher,
{
    guard.check().await?;

    let task_id = match dispatcher.send_email(wallet, request).await {
        Ok(task_id) => task_id,
        Err(e) => {
            metrics::record_dispatch_failure();
            return Err(e.into());
        }
    };

    metrics::record_message_sent();
    tracing::info!(
        recipient = %request.recipient,
        task_id = %task_id,
        "iExec worker task submitted"
    );

    Ok(task_id)
}
