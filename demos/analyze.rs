use std::path::PathBuf;

use clap::{Parser, Subcommand};

use decide_rs::circuit::{evaluate, random_circuit, Circuit, CircuitGenConfig};
use decide_rs::game::{random_game, solve, GameGenConfig, PositionGraph};
use decide_rs::grammar::{analyze, Grammar};
use decide_rs::ids::Sequential;
use decide_rs::io::{from_json, to_json, CircuitDoc, GameDoc, GrammarDoc};
use decide_rs::types::Player;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print the full analysis as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solve a position game given as a JSON document.
    Game {
        /// Path to a game document; a random game is generated if omitted.
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Declared starting player (1 or 2); defaults to the owner of the start position.
        #[arg(long, value_name = "PLAYER")]
        player: Option<Player>,

        /// Number of positions of the random game.
        #[arg(long, value_name = "INT", default_value = "8")]
        positions: usize,

        /// Allow cycles in the random game.
        #[arg(long)]
        cyclic: bool,

        #[arg(long, value_name = "INT", default_value = "42")]
        seed: u64,
    },

    /// Evaluate a circuit given as an expression or a JSON document.
    Circuit {
        /// Expression such as `AND(1, OR(0, ?))`; a random circuit is generated if omitted.
        #[arg(value_name = "EXPR")]
        expr: Option<String>,

        /// Read a circuit document instead.
        #[arg(long, value_name = "FILE", conflicts_with = "expr")]
        file: Option<PathBuf>,

        /// Depth of the random circuit.
        #[arg(long, value_name = "INT", default_value = "4")]
        depth: usize,

        #[arg(long, value_name = "INT", default_value = "42")]
        seed: u64,
    },

    /// Decide emptiness of a grammar given as text (`S -> a S | ε`) or JSON.
    Grammar {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn load_game(file: Option<PathBuf>, positions: usize, cyclic: bool, seed: u64) -> color_eyre::Result<PositionGraph> {
    match file {
        Some(path) => {
            let doc: GameDoc = from_json(&std::fs::read_to_string(path)?)?;
            Ok(PositionGraph::try_from(doc)?)
        }
        None => {
            let config = GameGenConfig {
                positions,
                acyclic: !cyclic,
                seed,
                ..Default::default()
            };
            let graph = random_game(&config, &mut Sequential::default())?;
            log::info!("generated game:\n{}", to_json(&GameDoc::from(&graph))?);
            Ok(graph)
        }
    }
}

fn load_circuit(
    expr: Option<String>,
    file: Option<PathBuf>,
    depth: usize,
    seed: u64,
) -> color_eyre::Result<Circuit> {
    if let Some(expr) = expr {
        return Ok(Circuit::parse(&expr)?);
    }
    if let Some(path) = file {
        let doc: CircuitDoc = from_json(&std::fs::read_to_string(path)?)?;
        return Ok(Circuit::try_from(doc)?);
    }
    let config = CircuitGenConfig {
        depth,
        seed,
        ..Default::default()
    };
    Ok(random_circuit(&config, &mut Sequential::default())?)
}

fn load_grammar(path: PathBuf) -> color_eyre::Result<Grammar> {
    let text = std::fs::read_to_string(&path)?;
    if text.trim_start().starts_with('{') {
        let doc: GrammarDoc = from_json(&text)?;
        Ok(Grammar::try_from(doc)?)
    } else {
        Ok(Grammar::parse(&text)?)
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let args = Cli::parse();
    println!("args = {:?}", args);

    match args.command {
        Command::Game {
            file,
            player,
            positions,
            cyclic,
            seed,
        } => {
            let graph = load_game(file, positions, cyclic, seed)?;
            let player = player.unwrap_or_else(|| graph.start_position().owner());
            let analysis = solve(&graph, player);
            if args.json {
                println!("{}", to_json(&analysis)?);
                return Ok(());
            }

            println!("Trace:\n{}", analysis.trace);
            println!("Verdict: {:?}", analysis.verdict);
            match &analysis.witness {
                Some(witness) => {
                    println!("Witness ({}):", witness.side);
                    for (from, to) in &witness.moves {
                        println!("  {} -> {}", from, to);
                    }
                    let line: Vec<String> = analysis.principal_line(&graph).iter().map(|id| id.to_string()).collect();
                    println!("Principal line: {}", line.join(" -> "));
                }
                None => println!("No witness"),
            }
        }

        Command::Circuit { expr, file, depth, seed } => {
            let circuit = load_circuit(expr, file, depth, seed)?;
            println!("circuit = {}", circuit);
            let analysis = evaluate(&circuit);
            if args.json {
                println!("{}", to_json(&analysis)?);
                return Ok(());
            }

            println!("Trace:\n{}", analysis.trace);
            println!("Output: {}", analysis.output);
        }

        Command::Grammar { file } => {
            let grammar = load_grammar(file)?;
            println!("grammar:\n{}", grammar);
            let analysis = analyze(&grammar);
            if args.json {
                println!("{}", to_json(&analysis)?);
                return Ok(());
            }

            println!("Trace:\n{}", analysis.trace);
            println!("Language is {}", if analysis.is_empty { "empty" } else { "non-empty" });
            let productive: Vec<&str> = analysis.productive.iter().map(|s| s.as_str()).collect();
            let unproductive: Vec<&str> = analysis.unproductive.iter().map(|s| s.as_str()).collect();
            println!("Productive: {}", productive.join(", "));
            println!("Unproductive: {}", unproductive.join(", "));
            match &analysis.derivation {
                Some(tree) => {
                    let word: Vec<&str> = tree.yield_string().into_iter().map(|s| s.as_str()).collect();
                    println!("Derivation: {}", tree);
                    println!("Yield: {}", if word.is_empty() { "ε".to_owned() } else { word.join(" ") });
                }
                None => println!("No derivation"),
            }
        }
    }

    Ok(())
}
