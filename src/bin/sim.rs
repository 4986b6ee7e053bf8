use fifteen::{
    transport::{
        in_memory::{InMemoryConnector, InMemoryTransport},
        Transport,
    },
    AiPlayer, GameStatus, PlayerNode, Referee, RefereeConfig, Session, Verdict,
};
use rand::{rngs::SmallRng, SeedableRng};
use serde_json::json;

fn node(transport: InMemoryTransport) -> PlayerNode {
    let mut connector = InMemoryConnector::new();
    connector.push(transport);
    PlayerNode::new(Box::new(AiPlayer::new()), Session::new(Box::new(connector)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <seed1> <seed2>", args[0]);
        std::process::exit(1);
    }
    let seed1: u64 = args[1].parse()?;
    let seed2: u64 = args[2].parse()?;

    let mut rng1 = SmallRng::seed_from_u64(seed1);
    let mut rng2 = SmallRng::seed_from_u64(seed2);

    let (r1, t1) = InMemoryTransport::pair();
    let (r2, t2) = InMemoryTransport::pair();
    let mut p1 = node(t1);
    let mut p2 = node(t2);
    let mut referee = Referee::new(RefereeConfig::default());
    let sides: [Box<dyn Transport>; 2] = [Box::new(r1), Box::new(r2)];

    let f1 = async {
        let status = p1.run(&mut rng1, "sim", "player1").await?;
        Ok::<(GameStatus, usize), anyhow::Error>((status, p1.choice_count()))
    };
    let f2 = async {
        let status = p2.run(&mut rng2, "sim", "player2").await?;
        Ok::<(GameStatus, usize), anyhow::Error>((status, p2.choice_count()))
    };

    let (res1, res2, verdict) = tokio::try_join!(f1, f2, referee.serve(sides))?;

    let winner = match verdict {
        Verdict::Winner(0) => Some("player1"),
        Verdict::Winner(_) => Some("player2"),
        Verdict::Draw => None,
    };

    let result = json!({
        "player1": {"status": format!("{:?}", res1.0), "choices": res1.1},
        "player2": {"status": format!("{:?}", res2.0), "choices": res2.1},
        "winner": winner,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
