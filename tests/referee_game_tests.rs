use std::time::Duration;

use fifteen::protocol::Message;
use fifteen::transport::in_memory::{InMemoryConnector, InMemoryTransport};
use fifteen::transport::tcp::{TcpConnector, TcpTransport};
use fifteen::transport::{Connector, Transport};
use fifteen::{
    AiPlayer, Choice, GameStatus, PlayerNode, Referee, RefereeConfig, Session, Verdict, TARGET_SUM,
};
use rand::{rngs::SmallRng, SeedableRng};
use tokio::net::TcpListener;

fn ai_node(connector: impl Connector + 'static) -> PlayerNode {
    PlayerNode::new(Box::new(AiPlayer::new()), Session::new(Box::new(connector)))
}

fn in_memory_node(end: InMemoryTransport) -> PlayerNode {
    let mut connector = InMemoryConnector::new();
    connector.push(end);
    ai_node(connector)
}

fn check_outcome(verdict: Verdict, first: &PlayerNode, second: &PlayerNode) {
    let (v1, v2) = (first.session().view(), second.session().view());
    match verdict {
        Verdict::Winner(0) => {
            assert_eq!(v1.status, GameStatus::Victory);
            assert_eq!(v2.status, GameStatus::Defeat);
        }
        Verdict::Winner(_) => {
            assert_eq!(v1.status, GameStatus::Defeat);
            assert_eq!(v2.status, GameStatus::Victory);
        }
        Verdict::Draw => {
            assert_eq!(v1.status, GameStatus::Draw);
            assert_eq!(v2.status, GameStatus::Draw);
        }
    }
    // Both sides agree on the board, mirrored.
    assert_eq!(v1.local_choices, v2.remote_choices);
    assert_eq!(v1.remote_choices, v2.local_choices);
    assert_eq!(v1.triple, v2.triple);

    if let Verdict::Winner(w) = verdict {
        let winner = if w == 0 { &v1 } else { &v2 };
        let line: Vec<Choice> = winner.triple.iter().map(|c| c.unwrap()).collect();
        assert_eq!(line.iter().map(|c| c.get()).sum::<u8>(), TARGET_SUM);
        assert!(line.iter().all(|c| winner.local_choices.contains(c)));
    }
}

#[tokio::test]
async fn ai_match_in_memory() -> anyhow::Result<()> {
    for seed in 0..5u64 {
        let (r1, t1) = InMemoryTransport::pair();
        let (r2, t2) = InMemoryTransport::pair();
        let mut p1 = in_memory_node(t1);
        let mut p2 = in_memory_node(t2);
        let mut rng1 = SmallRng::seed_from_u64(seed);
        let mut rng2 = SmallRng::seed_from_u64(seed + 100);
        let mut referee = Referee::new(RefereeConfig::default());
        let sides: [Box<dyn Transport>; 2] = [Box::new(r1), Box::new(r2)];

        let (s1, s2, verdict) = tokio::try_join!(
            p1.run(&mut rng1, "m", "a"),
            p2.run(&mut rng2, "m", "b"),
            referee.serve(sides),
        )?;
        assert!(s1.is_terminal() && s2.is_terminal());
        check_outcome(verdict, &p1, &p2);
        assert_eq!(referee.verdict(), Some(verdict));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn ai_match_over_tcp() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?.to_string();

    let referee_task = tokio::spawn(async move {
        let (a, _) = listener.accept().await?;
        let (b, _) = listener.accept().await?;
        let sides: [Box<dyn Transport>; 2] =
            [Box::new(TcpTransport::new(a)), Box::new(TcpTransport::new(b))];
        let mut referee = Referee::new(RefereeConfig::default());
        referee.serve(sides).await
    });

    let mut p1 = ai_node(TcpConnector::new(addr.clone()));
    let mut p2 = ai_node(TcpConnector::new(addr));
    let mut rng1 = SmallRng::seed_from_u64(11);
    let mut rng2 = SmallRng::seed_from_u64(22);

    let (s1, s2) = tokio::try_join!(
        p1.run(&mut rng1, "tcp-match", "a"),
        p2.run(&mut rng2, "tcp-match", "b"),
    )?;
    let verdict = referee_task.await??;

    // Accept order decides who moves first, so match by status.
    match verdict {
        Verdict::Draw => assert_eq!((s1, s2), (GameStatus::Draw, GameStatus::Draw)),
        Verdict::Winner(_) => assert!(
            (s1, s2) == (GameStatus::Victory, GameStatus::Defeat)
                || (s1, s2) == (GameStatus::Defeat, GameStatus::Victory)
        ),
    }
    let (v1, v2) = (p1.session().view(), p2.session().view());
    assert_eq!(v1.local_choices, v2.remote_choices);
    assert_eq!(v1.remote_choices, v2.local_choices);
    Ok(())
}

#[tokio::test]
async fn silent_player_loses_on_time() -> anyhow::Result<()> {
    let (r1, mut silent) = InMemoryTransport::pair();
    let (r2, t2) = InMemoryTransport::pair();
    silent
        .send(Message::Hello {
            match_id: "m".into(),
            credential: "idle".into(),
        })
        .await?;
    silent.send(Message::Ready).await?;

    let mut p2 = in_memory_node(t2);
    let mut rng = SmallRng::seed_from_u64(3);
    let mut referee = Referee::new(RefereeConfig {
        turn_time: Duration::from_millis(200),
    });
    let sides: [Box<dyn Transport>; 2] = [Box::new(r1), Box::new(r2)];

    let (status, verdict) = tokio::try_join!(p2.run(&mut rng, "m", "b"), referee.serve(sides))?;
    assert_eq!(verdict, Verdict::Winner(1));
    assert_eq!(status, GameStatus::Victory);
    assert_eq!(referee.time_left(0), Duration::ZERO);
    // Won on time: no line to show.
    assert_eq!(p2.session().view().triple, fifteen::EMPTY_TRIPLE);
    Ok(())
}

#[tokio::test]
async fn leaving_player_forfeits() -> anyhow::Result<()> {
    let (r1, t1) = InMemoryTransport::pair();
    let (r2, mut quitter) = InMemoryTransport::pair();
    quitter
        .send(Message::Hello {
            match_id: "m".into(),
            credential: "q".into(),
        })
        .await?;
    quitter.send(Message::Ready).await?;

    let mut p1 = in_memory_node(t1);
    let mut rng = SmallRng::seed_from_u64(5);
    let mut referee = Referee::new(RefereeConfig::default());
    let sides: [Box<dyn Transport>; 2] = [Box::new(r1), Box::new(r2)];

    let quit = async move {
        // Wait for the opening snapshot, then walk away.
        quitter.recv().await?;
        drop(quitter);
        anyhow::Ok(())
    };
    let (status, verdict, ()) =
        tokio::try_join!(p1.run(&mut rng, "m", "a"), referee.serve(sides), quit)?;
    assert_eq!(verdict, Verdict::Winner(0));
    assert_eq!(status, GameStatus::Victory);
    Ok(())
}

#[tokio::test]
async fn mismatched_match_ids_are_refused() -> anyhow::Result<()> {
    let (r1, mut a) = InMemoryTransport::pair();
    let (r2, mut b) = InMemoryTransport::pair();
    for (end, id) in [(&mut a, "m1"), (&mut b, "m2")] {
        end.send(Message::Hello {
            match_id: id.into(),
            credential: "k".into(),
        })
        .await?;
        end.send(Message::Ready).await?;
    }
    let mut referee = Referee::new(RefereeConfig::default());
    let sides: [Box<dyn Transport>; 2] = [Box::new(r1), Box::new(r2)];
    assert!(referee.serve(sides).await.is_err());
    Ok(())
}
