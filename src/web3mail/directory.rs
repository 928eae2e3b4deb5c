//! Contact directory: who granted the wallet owner permission to email them.

use std::future::Future;

use crate::blockchain::wallet::Wallet;
use crate::observability::metrics;
use crate::web3mail::guard::{ChainGuard, ChainQuery};
use crate::web3mail::types::{Contact, ContactFetch, GatewayError};

/// Lookup of the contacts authorized for a wallet.
pub trait ContactDirectory: Send + Sync {
    fn fetch_contacts(
        &self,
        wallet: &Wallet,
    ) -> impl Future<Output = Result<Vec<Contact>, GatewayError>> + Send;
}

/// Guarded contact fetch.
///
/// A failed chain check is recovered into [`ContactFetch::wrong_network`];
/// directory failures propagate. The full set is returned with no limit and
/// no retry.
pub async fn fetch_my_contacts<Q, D>(
    guard: &ChainGuard<Q>,
    directory: &D,
    wallet: &Wallet,
) -> Result<ContactFetch, GatewayError>
where
    Q: ChainQuery,
    D: ContactDirectory,
{
    if let Err(e) = guard.check().await {
        tracing::warn!(error = %e, "Chain check failed, contacts not fetched");
        return Ok(ContactFetch::wrong_network());
    }

    let contacts = directory.fetch_contacts(wallet).await?;
    metrics::record_contacts_fetched(contacts.len());
    tracing::info!(
        owner = %wallet.address(),
        count = contacts.len(),
        "Fetched contacts"
    );

    Ok(ContactFetch {
        contacts,
        error: None,
    })
}
