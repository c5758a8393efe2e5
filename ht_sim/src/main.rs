//! Self-playing driver for the table engine.
//!
//! Spawns a number of tables behind one `TableManager`, fills them with bots
//! and plays hands on all of them at once, checking after every hand that no
//! chips were created or lost.

mod bot;
mod config;

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use anyhow::{Error, bail};
use ctrlc::set_handler;
use holdem_table::{CreateTable, GameError, Round, TableConfig, TableError, TableManager};
use log::{error, info, warn};
use pico_args::Arguments;
use rand::{SeedableRng, rngs::StdRng};

use config::{Overrides, SimConfig};

const HELP: &str = "\
Play Texas Hold'em bots against each other on several tables at once

USAGE:
  ht_sim [OPTIONS]

OPTIONS:
  --tables     N           Tables played in parallel   [default: env SIM_TABLES or 1]
  --players    N           Bots per table              [default: env SIM_PLAYERS or 6]
  --hands      N           Hands per table             [default: env SIM_HANDS or 100]
  --seed       N           Seed shuffles and bots      [default: env SIM_SEED or random]

FLAGS:
  --json                   Print the final lobby as JSON
  -h, --help               Print help information

ENVIRONMENT:
  SIM_STACK                Starting stack per bot
  TABLE_SMALL_BLIND        Small blind
  TABLE_BIG_BLIND          Big blind
  RUST_LOG                 Log filter [default: info]
";

struct TableRun {
    game_id: String,
    bots: Vec<String>,
    hands: u64,
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let overrides = Overrides {
        tables: pargs.opt_value_from_str("--tables")?,
        players: pargs.opt_value_from_str("--players")?,
        hands: pargs.opt_value_from_str("--hands")?,
        seed: pargs.opt_value_from_str("--seed")?,
    };
    let print_json = pargs.contains("--json");

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let config = SimConfig::from_env(overrides)?;
    config.validate()?;

    // Catching signals for exit. Tables finish the hand they're in.
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    set_handler(move || flag.store(true, Ordering::SeqCst))?;

    info!(
        "Starting {} table(s) of {} bots, {} hands each",
        config.tables, config.players, config.hands
    );

    let manager = TableManager::new();
    let mut runs = Vec::with_capacity(config.tables);
    for i in 0..config.tables {
        let game_id = format!("sim-{}", i + 1);
        let bots: Vec<String> = (0..config.players)
            .map(|seat| format!("{game_id}-bot{seat}"))
            .collect();
        let table_config = config.table_config(i);
        let seed = table_config.seed;
        open_table(&manager, &game_id, &bots, table_config).await?;
        runs.push(TableRun {
            game_id,
            bots,
            hands: config.hands,
            seed,
        });
    }
    info!("{} table(s) ready", manager.active_table_count().await);

    let tasks: Vec<_> = runs
        .into_iter()
        .map(|run| tokio::spawn(play_table(manager.clone(), run, Arc::clone(&stop))))
        .collect();

    let mut failed = 0;
    for task in tasks {
        match task.await? {
            Ok((game_id, played)) => info!("{}: finished after {} hand(s)", game_id, played),
            Err(e) => {
                error!("{}", e);
                failed += 1;
            }
        }
    }

    let lobby = manager.list_tables().await;
    if print_json {
        println!("{}", serde_json::to_string_pretty(&lobby)?);
    }
    for summary in &lobby {
        if let Err(e) = manager.close_table(&summary.game_id).await {
            warn!("Failed to close table {}: {}", summary.game_id, e);
        }
    }

    if failed > 0 {
        bail!("{failed} table(s) failed");
    }
    info!("Simulation complete");
    Ok(())
}

/// Create a table hosted by the first bot and seat the rest.
async fn open_table(
    manager: &TableManager,
    game_id: &str,
    bots: &[String],
    config: TableConfig,
) -> Result<(), TableError> {
    let Some((host, guests)) = bots.split_first() else {
        return Err(TableError::InvalidConfig("no bots to seat".to_string()));
    };
    manager
        .create_table(CreateTable {
            game_id: game_id.to_string(),
            creator_token: host.clone(),
            creator_username: host.clone(),
            config,
        })
        .await?;
    for bot in guests {
        manager.join_table(game_id, bot, bot, None, None).await?;
    }
    Ok(())
}

/// Play hands until the count is reached, one bot has every chip, or the
/// user interrupts. Returns the number of hands played.
async fn play_table(
    manager: TableManager,
    run: TableRun,
    stop: Arc<AtomicBool>,
) -> Result<(String, u64), Error> {
    let TableRun {
        game_id,
        bots,
        hands,
        seed,
    } = run;
    let host = &bots[0];
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut view = manager.start_game(&game_id, host).await?;
    let mut expected = view.chips_in_play();
    let mut played = 0;

    loop {
        if view.round == Round::Showdown {
            played += 1;
            let winners: Vec<&str> = view
                .players
                .iter()
                .filter(|player| player.is_winner)
                .map(|player| player.username.as_str())
                .collect();
            info!(
                "{}: hand {} won by {}",
                game_id,
                view.hand_number,
                winners.join(", ")
            );

            if view.chips_in_play() != expected {
                bail!(
                    "{}: {} chips in play after hand {}, expected {}",
                    game_id,
                    view.chips_in_play(),
                    view.hand_number,
                    expected
                );
            }
            // Odd chips of a split pot don't carry into the next hand.
            expected -= view.pot;

            if played >= hands || stop.load(Ordering::SeqCst) {
                break;
            }
            match manager.start_new_hand(&game_id, host).await {
                Ok(next) => view = next,
                Err(TableError::Game(GameError::NotEnoughPlayers)) => {
                    info!("{}: only one bot has chips left", game_id);
                    break;
                }
                Err(e) => return Err(e.into()),
            }
            continue;
        }

        let Some(token) = view.current_player.clone() else {
            bail!("{}: hand {} has nobody to act", game_id, view.hand_number);
        };
        let hole = manager
            .hole_cards(&game_id, &token)
            .await?
            .map(|hand| hand.cards)
            .unwrap_or_default();
        let turn = manager.view(&game_id, &token).await?;
        let action = bot::decide(&turn, &token, &hole, &mut rng);
        log::debug!("{}: {} -> {}", game_id, token, action);
        view = manager.take_action(&game_id, &token, action).await?;
    }

    Ok((game_id, played))
}
