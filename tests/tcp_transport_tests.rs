use fifteen::protocol::Message;
use fifteen::transport::tcp::TcpTransport;
use fifteen::transport::Transport;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::time::{sleep, Duration};

#[tokio::test(flavor = "multi_thread")]
async fn frames_round_trip() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await?;
        let mut transport = TcpTransport::new(socket);
        let hello = transport.recv().await?;
        transport.send(Message::GameState("{}".into())).await?;
        anyhow::Ok(hello)
    });

    let mut client = TcpTransport::connect(addr).await?;
    let hello = Message::Hello {
        match_id: "m1".into(),
        credential: "k1".into(),
    };
    client.send(hello.clone()).await?;
    assert_eq!(client.recv().await?, Message::GameState("{}".into()));
    assert_eq!(server.await??, hello);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn oversized_length_prefix_is_rejected() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        socket.write_all(&[0xFF, 0xFF, 0xFF, 0xFF]).await.unwrap();
        socket.flush().await.unwrap();
        sleep(Duration::from_millis(100)).await;
    });

    let mut transport = TcpTransport::connect(addr).await?;
    let err = transport.recv().await.unwrap_err();
    assert!(err.to_string().contains("too large"));
    server.await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn zero_length_frame_is_rejected() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        socket.write_all(&[0u8, 0, 0, 0]).await.unwrap();
        socket.flush().await.unwrap();
        sleep(Duration::from_millis(100)).await;
    });

    let mut transport = TcpTransport::connect(addr).await?;
    let err = transport.recv().await.unwrap_err();
    assert!(err.to_string().contains("length: 0"));
    server.await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn truncated_frame_reports_closed_peer() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        socket.write_all(&100u32.to_be_bytes()).await.unwrap();
        socket.write_all(&[0u8; 10]).await.unwrap();
        socket.flush().await.unwrap();
    });

    let mut transport = TcpTransport::connect(addr).await?;
    server.await?;
    let err = transport.recv().await.unwrap_err();
    assert!(err.to_string().contains("closed by peer"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn garbage_payload_fails_to_decode() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        socket.write_all(&4u32.to_be_bytes()).await.unwrap();
        socket.write_all(&[0xFF, 0xFF, 0xFF, 0xFF]).await.unwrap();
        socket.flush().await.unwrap();
        sleep(Duration::from_millis(100)).await;
    });

    let mut transport = TcpTransport::connect(addr).await?;
    let err = transport.recv().await.unwrap_err();
    assert!(err.to_string().contains("Deserialization error"));
    server.await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn cancelled_recv_loses_no_bytes() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let frame = bincode::serialize(&Message::Choice { choice: 7 }).unwrap();
        let mut bytes = (frame.len() as u32).to_be_bytes().to_vec();
        bytes.extend_from_slice(&frame);
        // Dribble the frame out one byte at a time.
        for b in bytes {
            socket.write_all(&[b]).await.unwrap();
            socket.flush().await.unwrap();
            sleep(Duration::from_millis(5)).await;
        }
        sleep(Duration::from_millis(100)).await;
    });

    let mut transport = TcpTransport::connect(addr).await?;
    let msg = loop {
        tokio::select! {
            msg = transport.recv() => break msg?,
            _ = sleep(Duration::from_millis(2)) => {}
        }
    };
    assert_eq!(msg, Message::Choice { choice: 7 });
    server.await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn close_is_idempotent() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let mut transport = TcpTransport::new(socket);
        transport.recv().await.is_err()
    });

    let mut transport = TcpTransport::connect(addr).await?;
    transport.close().await?;
    transport.close().await?;
    assert!(transport.send(Message::Ready).await.is_err());
    assert!(server.await?);
    Ok(())
}
