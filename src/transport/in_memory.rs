use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::yield_now;

use crate::protocol::Message;
use crate::transport::{Connector, Transport};

/// Queue-backed channel end. Dropping or closing one end makes the other
/// end's `recv` fail once its queue is drained.
pub struct InMemoryTransport {
    recv_queue: Arc<Mutex<VecDeque<Message>>>,
    send_queue: Arc<Mutex<VecDeque<Message>>>,
    closed: Arc<AtomicBool>,
}

impl InMemoryTransport {
    pub fn pair() -> (Self, Self) {
        let q1 = Arc::new(Mutex::new(VecDeque::new()));
        let q2 = Arc::new(Mutex::new(VecDeque::new()));
        let closed = Arc::new(AtomicBool::new(false));
        (
            Self {
                recv_queue: q1.clone(),
                send_queue: q2.clone(),
                closed: closed.clone(),
            },
            Self {
                recv_queue: q2,
                send_queue: q1,
                closed,
            },
        )
    }

    fn peer_gone(&self) -> bool {
        self.closed.load(Ordering::SeqCst) || Arc::strong_count(&self.recv_queue) == 1
    }
}

impl Drop for InMemoryTransport {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl Transport for InMemoryTransport {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()> {
        if self.peer_gone() {
            return Err(anyhow::anyhow!("Channel closed"));
        }
        let mut queue = self
            .send_queue
            .lock()
            .map_err(|_| anyhow::anyhow!("Channel poisoned"))?;
        queue.push_back(msg);
        Ok(())
    }

    async fn recv(&mut self) -> anyhow::Result<Message> {
        loop {
            if let Some(msg) = {
                let mut queue = self
                    .recv_queue
                    .lock()
                    .map_err(|_| anyhow::anyhow!("Channel poisoned"))?;
                queue.pop_front()
            } {
                return Ok(msg);
            }
            if self.peer_gone() {
                return Err(anyhow::anyhow!("Channel closed"));
            }
            yield_now().await;
        }
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out pre-built channel ends in order; used to wire sessions to an
/// in-process referee.
#[derive(Default)]
pub struct InMemoryConnector {
    pending: VecDeque<InMemoryTransport>,
}

impl InMemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a channel end for the next `open`.
    pub fn push(&mut self, transport: InMemoryTransport) {
        self.pending.push_back(transport);
    }
}

#[async_trait::async_trait]
impl Connector for InMemoryConnector {
    async fn open(&mut self) -> anyhow::Result<Box<dyn Transport>> {
        self.pending
            .pop_front()
            .map(|t| Box::new(t) as Box<dyn Transport>)
            .ok_or_else(|| anyhow::anyhow!("No channel available"))
    }
}
