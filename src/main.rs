use std::env;

use roundkit::errors::ProfileError;
use roundkit::games::Variant;
use roundkit::players::{Archetype, Player};
use roundkit::profiles::{JsonProfileStore, ProfileStore};
use roundkit::session::{Session, SessionConfig};
use roundkit::strategy::CallingStation;

const HERO: &str = "hero";
const ROUNDS: usize = 25;

/// Reads the session configuration from the JSON file named on the command line,
/// or uses the defaults.
fn load_config() -> Result<SessionConfig, Box<dyn std::error::Error>> {
    match env::args().nth(1) {
        Some(path) => Ok(SessionConfig::from_json(&std::fs::read_to_string(path)?)?),
        None => Ok(SessionConfig {
            variant: Variant::FiveCardStud,
            ..Default::default()
        }),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = load_config()?;
    let store = JsonProfileStore::new(env::temp_dir().join("roundkit-profiles"))?;
    let mut profile = match store.load(HERO) {
        Ok(profile) => profile,
        Err(ProfileError::NotFound(_)) => store.create(HERO)?,
        Err(e) => return Err(e.into()),
    };
    profile.buy_in(config.starting_chips)?;
    store.save(&profile)?;

    let mut players = vec![Player::new(HERO, Archetype::Human)?];
    for (i, archetype) in Archetype::AI.iter().enumerate() {
        players.push(Player::new(&format!("{}_{}", archetype, i), *archetype)?);
    }

    let mut session = Session::new(config, players)?;
    session.seat_actor(0, Box::new(CallingStation));

    while !session.is_over() && session.rounds < ROUNDS {
        let outcome = session.play_round()?;
        log::info!("round {} paid {:?}", session.rounds, outcome.awards);
    }

    for (seat, player) in &session.table {
        println!("seat {}: {:<12} {:>6}", seat, player.name(), player.stack);
    }

    let cashout = session.table.seat(0).map_or(0, |p| p.stack);
    profile.deposit(cashout);
    store.save(&profile)?;
    println!("{} cashes out {} and has {} in the bank", HERO, cashout, profile.bank);
    Ok(())
}
