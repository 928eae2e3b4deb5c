//! Session state: wallet, contacts, draft, and the status shown to the user.
//!
//! # Design Decisions
//! - One owned state object, shared behind `Arc`, mutated only through methods
//! - Contacts and wallet live in `arc-swap` cells; a fetch replaces the list wholesale
//! - The contact list is tagged with the wallet it was fetched for and is only
//!   visible while that wallet is installed
//! - The progress label is a watch channel so observers can follow a bulk run

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use arc_swap::{ArcSwap, ArcSwapOption};
use tokio::sync::watch;

use crate::blockchain::client::ChainClient;
use crate::blockchain::wallet::Wallet;
use crate::config::schema::{DispatchConfig, Web3MailConfig};
use crate::resilience::timeouts::with_deadline;
use crate::session::bulk::BulkState;
use crate::session::error::{SessionError, SessionResult};
use crate::session::pagination::{Page, Pager};
use crate::web3mail::directory::{fetch_my_contacts, ContactDirectory};
use crate::web3mail::dispatcher::{send_mail, MailDispatcher};
use crate::web3mail::gateway::GatewayClient;
use crate::web3mail::guard::{ChainGuard, ChainQuery};
use crate::web3mail::types::{Contact, MessageDraft, SendRequest, TaskId};

/// Session wired to the real chain RPC and mail gateway.
pub type LiveSession = Session<ChainClient, GatewayClient, GatewayClient>;

/// Snapshot of what the user should see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub wallet: Option<Address>,
    pub contact_count: usize,
    /// At least one network operation is in flight.
    pub loading: bool,
    /// `"Sending i of n..."` during a bulk run, empty otherwise.
    pub progress: String,
    /// Message of the most recent failure.
    pub error: Option<String>,
    /// The most recent send (single or bulk) completed.
    pub email_sent: bool,
    pub bulk: BulkState,
}

/// Contacts together with the wallet that fetched them.
#[derive(Debug, Default)]
struct OwnedContacts {
    owner: Option<Address>,
    contacts: Arc<Vec<Contact>>,
}

/// One user's mail session.
pub struct Session<Q, D, M> {
    guard: ChainGuard<Q>,
    directory: D,
    dispatcher: M,
    config: DispatchConfig,
    pager: Pager,
    wallet: ArcSwapOption<Wallet>,
    contacts: ArcSwap<OwnedContacts>,
    draft: ArcSwap<MessageDraft>,
    last_error: ArcSwapOption<String>,
    email_sent: AtomicBool,
    in_flight: AtomicUsize,
    pub(super) busy: AtomicBool,
    pub(super) progress: watch::Sender<String>,
    pub(super) bulk_state: watch::Sender<BulkState>,
}

/// Marks an operation as in flight until dropped.
pub(super) struct Loading<'a>(&'a AtomicUsize);

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl LiveSession {
    /// Build a session from configuration.
    pub fn from_config(config: &Web3MailConfig) -> SessionResult<Self> {
        let chain = ChainClient::new(config.chain.clone())?;
        let gateway = GatewayClient::new(&config.gateway)?;
        let guard = ChainGuard::new(chain, config.chain.expected_chain_id.clone());
        Ok(Session::new(guard, gateway.clone(), gateway, config.dispatch.clone()))
    }
}

impl<Q, D, M> Session<Q, D, M>
where
    Q: ChainQuery,
    D: ContactDirectory,
    M: MailDispatcher,
{
    pub fn new(guard: ChainGuard<Q>, directory: D, dispatcher: M, config: DispatchConfig) -> Self {
        Self {
            guard,
            directory,
            dispatcher,
            pager: Pager::new(config.contacts_per_page, config.page_window),
            config,
            wallet: ArcSwapOption::empty(),
            contacts: ArcSwap::from_pointee(OwnedContacts::default()),
            draft: ArcSwap::from_pointee(MessageDraft::default()),
            last_error: ArcSwapOption::empty(),
            email_sent: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
            busy: AtomicBool::new(false),
            progress: watch::channel(String::new()).0,
            bulk_state: watch::channel(BulkState::Idle).0,
        }
    }

    /// Build the wallet from a private key and make it the session's wallet.
    ///
    /// Installing a wallet with a different address drops the contacts
    /// fetched for the previous one.
    pub fn create_wallet(&self, private_key: &str) -> SessionResult<Address> {
        if private_key.trim().is_empty() {
            tracing::error!("Please enter a valid private key");
            return Err(self.record(SessionError::InvalidCredential(
                "Please enter a valid private key".to_string(),
            )));
        }

        let wallet = Wallet::from_private_key(private_key).map_err(|e| {
            tracing::error!(error = %e, "Invalid private key");
            self.record(e.into())
        })?;

        let address = wallet.address();
        let previous = self.wallet.swap(Some(Arc::new(wallet)));
        if previous.map(|w| w.address()) != Some(address) {
            self.contacts.store(Arc::new(OwnedContacts::default()));
        }

        tracing::info!(address = %address, "Wallet successfully created");
        Ok(address)
    }

    pub fn wallet_address(&self) -> Option<Address> {
        self.wallet.load_full().map(|w| w.address())
    }

    /// Fetch the contacts for the current wallet, replacing any held list.
    ///
    /// Without a wallet the directory is not called. A wrong network leaves
    /// the held list untouched. If the wallet is replaced while the fetch is
    /// in flight, the result is discarded.
    pub async fn load_contacts(&self) -> SessionResult<usize> {
        let wallet = self.require_wallet()?;
        let _loading = self.begin_loading();

        let limit = Duration::from_secs(self.config.fetch_timeout_secs);
        let fetched = with_deadline(
            "fetch_contacts",
            limit,
            fetch_my_contacts(&self.guard, &self.directory, &wallet),
        )
        .await
        .map_err(SessionError::from)
        .and_then(|r| r.map_err(SessionError::from));

        let fetched = match fetched {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::error!(error = %e, "Contact fetch failed");
                return Err(self.record(e));
            }
        };

        if let Some(message) = fetched.error {
            return Err(self.record(SessionError::WrongNetwork(message)));
        }

        let owner = wallet.address();
        if self.wallet_address() != Some(owner) {
            tracing::warn!(owner = %owner, "Wallet changed during contact fetch, discarding result");
            return Err(self.record(SessionError::WalletChanged));
        }

        let count = fetched.contacts.len();
        self.contacts.store(Arc::new(OwnedContacts {
            owner: Some(owner),
            contacts: Arc::new(fetched.contacts),
        }));
        self.last_error.store(None);
        Ok(count)
    }

    /// Send the current draft to one recipient.
    pub async fn send_message(&self, recipient: &str) -> SessionResult<TaskId> {
        let wallet = self.require_wallet()?;
        let _loading = self.begin_loading();
        self.email_sent.store(false, Ordering::SeqCst);

        let draft = self.draft.load_full();
        match self.dispatch_one(&wallet, recipient, &draft).await {
            Ok(task_id) => {
                self.email_sent.store(true, Ordering::SeqCst);
                Ok(task_id)
            }
            Err(e) => {
                tracing::error!(recipient = %recipient, error = %e, "Send failed");
                Err(self.record(e))
            }
        }
    }

    /// Chain check plus one submission, under the send deadline.
    pub(super) async fn dispatch_one(
        &self,
        wallet: &Wallet,
        recipient: &str,
        draft: &MessageDraft,
    ) -> SessionResult<TaskId> {
        let request = SendRequest::from_draft(draft, recipient);
        let limit = Duration::from_secs(self.config.send_timeout_secs);
        with_deadline(
            "send_email",
            limit,
            send_mail(&self.guard, &self.dispatcher, wallet, &request),
        )
        .await?
        .map_err(SessionError::from)
    }

    pub fn draft(&self) -> MessageDraft {
        self.draft.load_full().as_ref().clone()
    }

    pub fn set_draft(&self, draft: MessageDraft) {
        self.draft.store(Arc::new(draft));
    }

    /// Edit the draft in place. Visible to a running bulk send from its next message.
    pub fn update_draft(&self, mut edit: impl FnMut(&mut MessageDraft)) {
        self.draft.rcu(|current| {
            let mut next = MessageDraft::clone(current);
            edit(&mut next);
            next
        });
    }

    /// Contacts fetched for the installed wallet. Empty if none were, or if
    /// they belong to a wallet that has since been replaced.
    pub fn contacts(&self) -> Arc<Vec<Contact>> {
        match self.wallet_address() {
            Some(address) => self.contacts_for(address),
            None => Arc::default(),
        }
    }

    pub(super) fn contacts_for(&self, owner: Address) -> Arc<Vec<Contact>> {
        let held = self.contacts.load_full();
        if held.owner == Some(owner) {
            Arc::clone(&held.contacts)
        } else {
            Arc::default()
        }
    }

    /// One page of the contact table.
    pub fn contact_page(&self, page: usize) -> Page<Contact> {
        self.pager.page(&self.contacts(), page)
    }

    pub fn progress_label(&self) -> String {
        self.progress.borrow().clone()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<String> {
        self.progress.subscribe()
    }

    pub fn bulk_state(&self) -> BulkState {
        *self.bulk_state.borrow()
    }

    pub fn subscribe_bulk_state(&self) -> watch::Receiver<BulkState> {
        self.bulk_state.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            wallet: self.wallet_address(),
            contact_count: self.contacts().len(),
            loading: self.in_flight.load(Ordering::SeqCst) > 0,
            progress: self.progress_label(),
            error: self.last_error.load_full().map(|e| String::clone(&e)),
            email_sent: self.email_sent.load(Ordering::SeqCst),
            bulk: self.bulk_state(),
        }
    }

    pub(super) fn require_wallet(&self) -> SessionResult<Arc<Wallet>> {
        self.wallet
            .load_full()
            .ok_or_else(|| self.record(SessionError::NoWallet))
    }

    pub(super) fn begin_loading(&self) -> Loading<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        Loading(&self.in_flight)
    }

    pub(super) fn set_email_sent(&self, sent: bool) {
        self.email_sent.store(sent, Ordering::SeqCst);
    }

    /// Remember the failure for the status view and hand it back.
    pub(super) fn record(&self, error: SessionError) -> SessionError {
        self.last_error.store(Some(Arc::new(error.to_string())));
        error
    }
}
