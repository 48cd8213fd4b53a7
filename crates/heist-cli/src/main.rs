use std::env;
use std::net::SocketAddr;

use contracts::{AttackType, GameConfig, PlannedAction};
use heist_api::serve;
use heist_core::GameWorld;

fn print_usage() {
    println!("heist-cli <command>");
    println!("commands:");
    println!("  serve [addr]");
    println!("    default addr: 127.0.0.1:8080");
    println!("  simulate <seed> [turns] [players]");
    println!("    runs a deterministic local game and prints each turn's outcomes");
}

fn parse_socket_addr(value: Option<&String>) -> Result<SocketAddr, String> {
    let raw = value.map(String::as_str).unwrap_or("127.0.0.1:8080");
    raw.parse::<SocketAddr>()
        .map_err(|_| format!("invalid addr: {raw}"))
}

fn parse_seed(value: Option<&String>) -> Result<u64, String> {
    let raw = value.ok_or_else(|| "missing seed".to_string())?;
    raw.parse::<u64>()
        .map_err(|_| format!("invalid seed: {raw}"))
}

fn parse_count(value: Option<&String>, label: &str, default: usize) -> Result<usize, String> {
    value
        .map(|raw| {
            raw.parse::<usize>()
                .map_err(|_| format!("invalid {label}: {raw}"))
        })
        .transpose()
        .map(|parsed| parsed.unwrap_or(default))
}

fn run_simulation(args: &[String]) -> Result<(), String> {
    let seed = parse_seed(args.get(2))?;
    let turns = parse_count(args.get(3), "turns", 5)?.max(1);
    let players = parse_count(args.get(4), "players", 3)?;

    let mut config = GameConfig::default();
    config.seed = seed;
    let players = players.clamp(config.min_players, config.max_players);

    let mut world = GameWorld::new(config);
    let mut crew_ids = Vec::new();
    for index in 0..players {
        let id = world
            .add_crew(&format!("Crew {}", index + 1))
            .map_err(|err| err.to_string())?;
        world.hire_crew_member(&id).map_err(|err| err.to_string())?;
        world.hire_crew_member(&id).map_err(|err| err.to_string())?;
        crew_ids.push(id);
    }
    world.start_game().map_err(|err| err.to_string())?;

    for _ in 0..turns {
        let bank_id = world
            .banks()
            .next()
            .map(|bank| bank.id.clone())
            .ok_or_else(|| "no banks generated".to_string())?;

        for crew_id in &crew_ids {
            let members: Vec<String> = match world.crew(crew_id) {
                Some(crew) => crew.healthy_members().map(|m| m.id.clone()).collect(),
                None => continue,
            };
            for member_id in members {
                world
                    .assign_action(
                        crew_id,
                        &member_id,
                        PlannedAction::Attack {
                            target_id: bank_id.clone(),
                            attack_type: AttackType::Cooperative,
                        },
                    )
                    .map_err(|err| err.to_string())?;
            }
        }
        for crew_id in &crew_ids {
            world.mark_crew_ready(crew_id).map_err(|err| err.to_string())?;
        }

        println!("turn {}", world.turn_number());
        for crew in world.crews() {
            println!(
                "  {}: capital={} ({:+}) reputation={} alive={}",
                crew.name,
                crew.capital,
                crew.turn_capital_gain,
                crew.reputation,
                crew.healthy_members().count(),
            );
            for report in &crew.turn_reports {
                println!("    {}", report.message);
            }
        }
        world.begin_next_turn().map_err(|err| err.to_string())?;
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);

    match command {
        Some("serve") => match parse_socket_addr(args.get(2)) {
            Ok(addr) => {
                println!("serving game on ws://{addr}/ws");
                if let Err(err) = serve(addr, GameConfig::default()).await {
                    eprintln!("server error: {err}");
                    std::process::exit(1);
                }
            }
            Err(err) => {
                eprintln!("error: {}", err);
                print_usage();
                std::process::exit(2);
            }
        },
        Some("simulate") => {
            if let Err(err) = run_simulation(&args) {
                eprintln!("error: {err}");
                print_usage();
                std::process::exit(2);
            }
        }
        _ => {
            print_usage();
        }
    }
}
