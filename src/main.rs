#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use fifteen::{
    init_logging,
    transport::{
        in_memory::{InMemoryConnector, InMemoryTransport},
        tcp::{TcpConnector, TcpTransport},
        Transport,
    },
    AiPlayer, CliPlayer, GameStatus, Player, PlayerNode, Referee, RefereeConfig, Session,
};

#[cfg(feature = "std")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::SeedableRng;
#[cfg(feature = "std")]
use tokio::net::TcpListener;
#[cfg(feature = "std")]
use tokio::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Debug)]
#[cfg(feature = "std")]
enum PlayerType {
    Human,
    Ai,
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Watch two AI players fight it out on the local machine.
    Local {
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Referee a single match between the first two players that connect.
    Referee {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
        #[arg(long, default_value_t = 30, help = "Seconds on each player's clock")]
        clock: u64,
    },
    /// Join a match hosted by a referee.
    Play {
        #[arg(long, default_value = "127.0.0.1:8080")]
        connect: String,
        #[arg(long)]
        match_id: String,
        #[arg(long)]
        key: String,
        #[arg(long, value_enum, default_value_t = PlayerType::Human)]
        player: PlayerType,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
}

#[cfg(feature = "std")]
fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    }
}

#[cfg(feature = "std")]
fn report(status: GameStatus) {
    match status {
        GameStatus::Victory => println!("\nVICTORY! You completed a line of 15."),
        GameStatus::Defeat => println!("\nDEFEAT. Your opponent completed a line of 15."),
        GameStatus::Draw => println!("\nDraw: every number was taken."),
        other => println!("\nMatch ended without a result ({:?}).", other),
    }
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Local { seed } => {
            println!("Starting local AI vs AI match...");
            if let Some(s) = seed {
                println!("Using fixed seed: {} (match will be reproducible)", s);
            }
            let mut rng1 = make_rng(seed);
            let mut rng2 = make_rng(seed.map(|s| s.wrapping_add(1)));

            let (ref1, t1) = InMemoryTransport::pair();
            let (ref2, t2) = InMemoryTransport::pair();
            let mut c1 = InMemoryConnector::new();
            c1.push(t1);
            let mut c2 = InMemoryConnector::new();
            c2.push(t2);

            let mut node1 = PlayerNode::new(Box::new(AiPlayer::new()), Session::new(Box::new(c1)));
            let mut node2 = PlayerNode::new(Box::new(AiPlayer::new()), Session::new(Box::new(c2)));
            let mut referee = Referee::new(RefereeConfig::default());
            let sides: [Box<dyn Transport>; 2] = [Box::new(ref1), Box::new(ref2)];

            let (s1, s2, verdict) = tokio::try_join!(
                node1.run(&mut rng1, "local", "ai-1"),
                node2.run(&mut rng2, "local", "ai-2"),
                referee.serve(sides),
            )?;
            println!("Player 1: {:?} {:?}", s1, referee.choices(0));
            println!("Player 2: {:?} {:?}", s2, referee.choices(1));
            println!("Verdict: {:?}", verdict);
        }
        Commands::Referee { bind, clock } => {
            println!("Refereeing at {}...", bind);
            let listener = TcpListener::bind(&bind).await?;
            let mut sides: Vec<Box<dyn Transport>> = Vec::with_capacity(2);
            while sides.len() < 2 {
                let (stream, addr) = listener.accept().await?;
                println!("Player {} connected from {}", sides.len() + 1, addr);
                sides.push(Box::new(TcpTransport::new(stream)));
            }
            let sides: [Box<dyn Transport>; 2] = sides
                .try_into()
                .map_err(|_| anyhow::anyhow!("expected two players"))?;
            let mut referee = Referee::new(RefereeConfig {
                turn_time: Duration::from_secs(clock),
            });
            let verdict = referee.serve(sides).await?;
            println!("Match over: {:?}", verdict);
        }
        Commands::Play {
            connect,
            match_id,
            key,
            player,
            seed,
        } => {
            println!("Joining match {} at {}...", match_id, connect);
            let mut rng = make_rng(seed);
            let player: Box<dyn Player> = match player {
                PlayerType::Human => Box::new(CliPlayer::new()),
                PlayerType::Ai => Box::new(AiPlayer::new()),
            };
            let session = Session::new(Box::new(TcpConnector::new(connect)));
            let mut node = PlayerNode::new(player, session);
            match node.run(&mut rng, &match_id, &key).await {
                Ok(status) => report(status),
                Err(e) => eprintln!("Match ended with an error: {}", e),
            }
        }
    }
    Ok(())
}
