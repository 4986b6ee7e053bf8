use crate::protocol::Message;

/// Bidirectional, ordered message channel between a session and the referee.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()>;
    async fn recv(&mut self) -> anyhow::Result<Message>;
    /// Close the channel. Closing twice is not an error.
    async fn close(&mut self) -> anyhow::Result<()>;
}

/// Opens fresh channels to the referee, one per `Session::connect`.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    async fn open(&mut self) -> anyhow::Result<Box<dyn Transport>>;
}

pub mod in_memory;
pub mod tcp;
