//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};

use web3mail_dispatch::blockchain::types::{BlockchainError, BlockchainResult, ChainId};
use web3mail_dispatch::blockchain::Wallet;
use web3mail_dispatch::config::DispatchConfig;
use web3mail_dispatch::session::Session;
use web3mail_dispatch::web3mail::{
    ChainGuard, ChainQuery, Contact, ContactDirectory, GatewayError, MailDispatcher,
    SendRequest, TaskId,
};

// Anvil's first account; publicly known, never holds real funds
pub const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

// Anvil's second account
pub const OTHER_PRIVATE_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
pub const OTHER_ADDRESS: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";

pub const IEXEC_CHAIN: u64 = 134;

pub fn contacts(n: usize) -> Vec<Contact> {
    (1..=n).map(|i| Contact::new(format!("0x{:040x}", i))).collect()
}

/// Chain ID source that can be switched mid-test.
#[derive(Clone)]
pub struct MockChain {
    id: Arc<AtomicU64>,
    calls: Arc<AtomicUsize>,
    /// After this many calls, report chain 1.
    switch_after: Arc<Mutex<Option<usize>>>,
    unreachable: Arc<AtomicBool>,
}

impl MockChain {
    pub fn new(id: u64) -> Self {
        Self {
            id: Arc::new(AtomicU64::new(id)),
            calls: Arc::new(AtomicUsize::new(0)),
            switch_after: Arc::new(Mutex::new(None)),
            unreachable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Fail every chain ID query as an RPC error.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn switch_to(&self, id: u64) {
        self.id.store(id, Ordering::SeqCst);
    }

    pub fn switch_after(&self, calls: usize) {
        *self.switch_after.lock().unwrap() = Some(calls);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ChainQuery for MockChain {
    async fn chain_id(&self) -> BlockchainResult<ChainId> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(BlockchainError::Rpc("All RPC providers failed".into()));
        }
        let switch_after = *self.switch_after.lock().unwrap();
        if switch_after.is_some_and(|n| call >= n) {
            return Ok(ChainId(1));
        }
        Ok(ChainId(self.id.load(Ordering::SeqCst)))
    }
}

/// Directory returning a programmable contact list.
#[derive(Clone, Default)]
pub struct MockDirectory {
    contacts: Arc<Mutex<Vec<Contact>>>,
    calls: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
    delay: Arc<Mutex<Duration>>,
}

impl MockDirectory {
    pub fn set_contacts(&self, contacts: Vec<Contact>) {
        *self.contacts.lock().unwrap() = contacts;
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Delay every lookup, then answer with the list held at that point.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ContactDirectory for MockDirectory {
    async fn fetch_contacts(&self, _wallet: &Wallet) -> Result<Vec<Contact>, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        tokio::time::sleep(delay).await;
        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError::Status {
                status: 500,
                body: "subgraph unavailable".into(),
            });
        }
        Ok(self.contacts.lock().unwrap().clone())
    }
}

/// What the dispatcher saw for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub sender_name: String,
    /// Session progress label at the moment of the call.
    pub progress: Option<String>,
}

#[derive(Default)]
struct DispatcherState {
    sent: Mutex<Vec<SentMessage>>,
    fail_at: Mutex<Option<usize>>,
    delay: Mutex<Duration>,
    hang: AtomicBool,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    progress: Mutex<Option<watch::Receiver<String>>>,
}

/// Dispatcher recording every call, with programmable latency and failures.
#[derive(Clone, Default)]
pub struct MockDispatcher {
    state: Arc<DispatcherState>,
}

impl MockDispatcher {
    /// Make the call with this zero-based index fail.
    pub fn fail_at(&self, index: usize) {
        *self.state.fail_at.lock().unwrap() = Some(index);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = delay;
    }

    /// Never complete any call.
    pub fn hang(&self) {
        self.state.hang.store(true, Ordering::SeqCst);
    }

    /// Capture the session's progress label on every call.
    pub fn watch_progress(&self, progress: watch::Receiver<String>) {
        *self.state.progress.lock().unwrap() = Some(progress);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.state.sent.lock().unwrap().clone()
    }

    pub fn recipients(&self) -> Vec<String> {
        self.sent().into_iter().map(|m| m.recipient).collect()
    }

    pub fn calls(&self) -> usize {
        self.state.sent.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }
}

impl MailDispatcher for MockDispatcher {
    async fn send_email(
        &self,
        _wallet: &Wallet,
        request: &SendRequest<'_>,
    ) -> Result<TaskId, GatewayError> {
        let progress = self
            .state
            .progress
            .lock()
            .unwrap()
            .as_ref()
            .map(|rx| rx.borrow().clone());
        let index = {
            let mut sent = self.state.sent.lock().unwrap();
            sent.push(SentMessage {
                recipient: request.recipient.to_string(),
                subject: request.subject.to_string(),
                body: request.body.to_string(),
                sender_name: request.sender_name.to_string(),
                progress,
            });
            sent.len() - 1
        };

        let now = self.state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if self.state.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let delay = *self.state.delay.lock().unwrap();
        tokio::time::sleep(delay).await;

        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);

        let fail_at = *self.state.fail_at.lock().unwrap();
        if fail_at == Some(index) {
            return Err(GatewayError::Status {
                status: 503,
                body: "worker pool exhausted".into(),
            });
        }
        Ok(TaskId(format!("0xtask{}", index)))
    }
}

pub type TestSession = Session<MockChain, MockDirectory, MockDispatcher>;

/// A session wired to test doubles, with handles to inspect them.
pub struct Harness {
    pub session: Arc<TestSession>,
    pub chain: MockChain,
    pub directory: MockDirectory,
    pub dispatcher: MockDispatcher,
}

pub fn harness_with(config: DispatchConfig) -> Harness {
    let chain = MockChain::new(IEXEC_CHAIN);
    let directory = MockDirectory::default();
    let dispatcher = MockDispatcher::default();
    let session = Arc::new(Session::new(
        ChainGuard::new(chain.clone(), "134"),
        directory.clone(),
        dispatcher.clone(),
        config,
    ));
    dispatcher.watch_progress(session.subscribe_progress());

    Harness {
        session,
        chain,
        directory,
        dispatcher,
    }
}

pub fn harness() -> Harness {
    harness_with(DispatchConfig::default())
}

/// Harness with a wallet and `n` contacts already loaded.
pub async fn ready_harness(n: usize) -> Harness {
    let h = harness();
    h.session.create_wallet(TEST_PRIVATE_KEY).unwrap();
    h.directory.set_contacts(contacts(n));
    h.session.load_contacts().await.unwrap();
    h
}

/// A request as seen by the programmable backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Value,
}

/// Start a programmable HTTP backend on an ephemeral port.
///
/// Every request is answered by `handler` and then forwarded on the returned
/// channel.
pub async fn start_programmable_backend<F>(
    handler: F,
) -> (SocketAddr, mpsc::UnboundedReceiver<RecordedRequest>)
where
    F: Fn(&RecordedRequest) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let handler = handler.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = handler(&request);
                        let _ = tx.send(request);

                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            401 => "401 Unauthorized",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, rx)
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let end = (header_end + content_length).min(buf.len());
    let body = serde_json::from_slice(&buf[header_end..end]).unwrap_or(Value::Null);

    Some(RecordedRequest { method, path, body })
}
