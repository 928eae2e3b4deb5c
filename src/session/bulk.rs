//! Send to all contacts, one at a time, with a progress label.
//!
//! # States
//! - Idle: no run has started
//! - Running(i, n): message i (zero-based) of n is being submitted
//! - Completed / Failed / Cancelled: terminal, until the next run
//!
//! # State Transitions
//! ```text
//! Idle | terminal → Running(0, n): at least one contact, not already running
//! Running(i, n) → Running(i+1, n): message i submitted
//! Running(n-1, n) → Completed: last message submitted
//! Running(i, n) → Failed: message i failed; no further sends, no retry
//! Running(i, n) → Cancelled: token fired before or during message i
//! ```
//!
//! # Design Decisions
//! - Strictly sequential: message i is submitted before message i+1 is attempted
//! - The chain guard runs before every message
//! - The draft is re-read before every message
//! - The run iterates the contact list it started with; a concurrent re-fetch
//!   affects the next run only

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::Instrument;
use uuid::Uuid;

use crate::blockchain::wallet::Wallet;
use crate::lifecycle::cancel::CancelToken;
use crate::session::error::{SessionError, SessionResult};
use crate::session::state::Session;
use crate::web3mail::directory::ContactDirectory;
use crate::web3mail::dispatcher::MailDispatcher;
use crate::web3mail::guard::ChainQuery;
use crate::web3mail::types::{Contact, TaskId};

/// Bulk-send state machine position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulkState {
    #[default]
    Idle,
    Running { index: usize, total: usize },
    Completed { sent: usize },
    Failed { sent: usize, total: usize },
    Cancelled { sent: usize, total: usize },
}

impl BulkState {
    pub fn is_running(&self) -> bool {
        matches!(self, BulkState::Running { .. })
    }
}

/// Position in a run, rendered one-based as `"Sending 2 of 3..."`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub index: usize,
    pub total: usize,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sending {} of {}...", self.index + 1, self.total)
    }
}

/// A message accepted by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub recipient: String,
    pub task_id: TaskId,
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct BulkReport {
    pub run_id: Uuid,
    pub total: usize,
    pub deliveries: Vec<Delivery>,
}

/// Holds the session's busy flag; clears it when dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<Q, D, M> Session<Q, D, M>
where
    Q: ChainQuery,
    D: ContactDirectory,
    M: MailDispatcher,
{
    /// Send the current draft to every fetched contact, in order.
    ///
    /// Stops at the first failure; the error reports how many messages were
    /// submitted before it. A second call while a run is active fails with
    /// [`SessionError::Busy`].
    pub async fn send_to_all(&self, cancel: Option<&CancelToken>) -> SessionResult<BulkReport> {
        let wallet = self.require_wallet()?;
        let contacts = self.contacts_for(wallet.address());
        if contacts.is_empty() {
            return Err(self.record(SessionError::NoContacts));
        }
        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            tracing::warn!("Send to all contacts already running");
            return Err(SessionError::Busy);
        };
        let _loading = self.begin_loading();
        self.set_email_sent(false);

        let total = contacts.len();
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("send_to_all", %run_id, total);

        let result = self
            .run_bulk(run_id, &wallet, &contacts, cancel)
            .instrument(span)
            .await;

        self.progress.send_replace(String::new());
        match &result {
            Ok(report) => {
                self.set_email_sent(true);
                self.bulk_state.send_replace(BulkState::Completed {
                    sent: report.deliveries.len(),
                });
                tracing::info!(%run_id, sent = report.deliveries.len(), "Sent to all contacts");
            }
            Err(SessionError::Cancelled { sent, total }) => {
                self.bulk_state.send_replace(BulkState::Cancelled {
                    sent: *sent,
                    total: *total,
                });
                tracing::warn!(%run_id, sent, total, "Send to all contacts cancelled");
            }
            Err(e) => {
                self.bulk_state.send_replace(BulkState::Failed {
                    sent: e.sent().unwrap_or(0),
                    total,
                });
                tracing::error!(%run_id, error = %e, "Send to all contacts failed");
            }
        }

        result.map_err(|e| self.record(e))
    }

    async fn run_bulk(
        &self,
        run_id: Uuid,
        wallet: &Wallet,
        contacts: &[Contact],
        cancel: Option<&CancelToken>,
    ) -> SessionResult<BulkReport> {
        let total = contacts.len();
        let mut deliveries = Vec::with_capacity(total);

        for (index, contact) in contacts.iter().enumerate() {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                return Err(SessionError::Cancelled { sent: index, total });
            }

            let progress = Progress { index, total };
            self.progress.send_replace(progress.to_string());
            self.bulk_state.send_replace(BulkState::Running { index, total });
            tracing::debug!(recipient = %contact.address, "{}", progress);

            let draft = self.draft();
            let send = self.dispatch_one(wallet, &contact.address, &draft);
            let outcome = match cancel {
                Some(token) => tokio::select! {
                    biased;
                    outcome = send => outcome,
                    _ = token.cancelled() => {
                        return Err(SessionError::Cancelled { sent: index, total });
                    }
                },
                None => send.await,
            };

            match outcome {
                Ok(task_id) => deliveries.push(Delivery {
                    recipient: contact.address.clone(),
                    task_id,
                }),
                Err(cause) => {
                    return Err(SessionError::Aborted {
                        sent: index,
                        total,
                        recipient: contact.address.clone(),
                        cause: Box::new(cause),
                    });
                }
            }
        }

        Ok(BulkReport {
            run_id,
            total,
            deliveries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_label_is_one_based() {
        assert_eq!(Progress { index: 0, total: 3 }.to_string(), "Sending 1 of 3...");
        assert_eq!(Progress { index: 2, total: 3 }.to_string(), "Sending 3 of 3...");
    }

    #[test]
    fn test_busy_guard_is_exclusive() {
        let flag = AtomicBool::new(false);
        let first = BusyGuard::acquire(&flag).expect("first acquire");
        assert!(BusyGuard::acquire(&flag).is_none());
        drop(first);
        assert!(!flag.load(Ordering::SeqCst));
        assert!(BusyGuard::acquire(&flag).is_some());
    }

    #[test]
    fn test_default_state_is_idle() {
        assert_eq!(BulkState::default(), BulkState::Idle);
        assert!(BulkState::Running { index: 0, total: 1 }.is_running());
        assert!(!BulkState::Completed { sent: 1 }.is_running());
    }
}
