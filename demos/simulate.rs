use std::{
    error::Error,
    io::{self, StdoutLock, Write},
    path::Path,
};

use orrery_kepler::{
    body_presets, BodyId, CalendarDate, DateError, OrbitTrait, SimulationConfig, Universe,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SIMULATION_TICKS: u32 = 3600;
const FRAME_TIME: f64 = 1.0 / 60.0;
const PRINT_EVERY: u32 = 600;

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    // A RON config may be passed as the first argument.
    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::load(Path::new(&path))?,
        None => SimulationConfig {
            distance_scale: 1_000_000.0,
            simulation_speed: 86_400.0,
            ..Default::default()
        },
    };

    let start = CalendarDate::new(2024, 1, 1);
    let mut universe = generate_solar_system(config, &start)?;
    for (id, error) in universe.set_date(&start)? {
        eprintln!("Body {id} could not be placed: {error}");
    }
    describe_universe(&universe);

    let mut lock = io::stdout().lock();
    eprintln!("Simulating {SIMULATION_TICKS} frames...");
    for t in 0..SIMULATION_TICKS {
        for (id, error) in universe.tick(FRAME_TIME) {
            eprintln!("Body {id} failed on frame {t}: {error}");
        }
        if t % PRINT_EVERY == 0 {
            writeln!(&mut lock, "=== Frame {t}, {} ===", universe.date())?;
            print_all_body_positions(&mut lock, &universe)?;
        }
    }

    Ok(())
}

fn generate_solar_system(
    config: SimulationConfig,
    start: &CalendarDate,
) -> Result<Universe, DateError> {
    let mut universe = Universe::new(config, start.to_epoch()?);

    let sun = add(&mut universe, body_presets::stars::the_sun(), None);
    let earth = add(&mut universe, body_presets::planets::earth(), Some(sun));
    add(&mut universe, body_presets::moons::the_moon(), Some(earth));

    for planet in body_presets::planets::all() {
        if planet.name != "Earth" {
            add(&mut universe, planet, Some(sun));
        }
    }

    Ok(universe)
}

fn add(
    universe: &mut Universe,
    body: orrery_kepler::Body,
    parent: Option<BodyId>,
) -> BodyId {
    match universe.add_body(body, parent) {
        Ok(id) => id,
        Err((error, body)) => panic!("Failed to add {}: {error}", body.name),
    }
}

fn describe_universe(universe: &Universe) {
    println!("{universe}");
    for body in universe.get_bodies() {
        println!("    {:?}", body.name);
        println!("      Radius: {} km", body.radius);
        if let Some((inner, outer)) = body.get_ring() {
            println!("      Ring: {inner} to {outer} km");
        }
        if let Some(orbit) = &body.orbit {
            let elements = orbit.get_resolved_elements();
            println!("        Semi-major axis: {} AU", elements.get_semi_major_axis());
            println!("        Eccentricity: {}", elements.get_eccentricity());
            println!("        Inclination: {}", elements.get_inclination());
            println!("        Argument of periapsis: {}", elements.get_arg_pe());
            println!(
                "        Longitude of ascending node: {}",
                elements.get_long_asc_node()
            );
            println!("        Mean anomaly: {}", orbit.get_mean_anomaly());
            println!("        Path points: {}", orbit.sample_path().len());
        }
    }
}

fn print_all_body_positions(lock: &mut StdoutLock, universe: &Universe) -> io::Result<()> {
    for body in universe.get_bodies() {
        let id = universe.get_body_id_with_name(&body.name);
        let location = id.and_then(|id| universe.get_body_position(id));
        writeln!(lock, "{}: {:?}", body.name, location)?;
    }
    Ok(())
}
