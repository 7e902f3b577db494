mod host;

use clap::{Parser, Subcommand};
use host::{ConsoleMap, FixedGeolocator, TerminalView};
use maplog_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "maplog")]
#[command(about = "Map-based running and cycling log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Current position as LAT,LNG (overrides [location] in the config)
    #[arg(long, global = true, value_name = "LAT,LNG", allow_hyphen_values = true)]
    from: Option<Coordinates>,

    /// Log debug output
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a workout at a point on the map
    Add {
        /// Where the workout happened
        #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true)]
        at: Coordinates,

        /// Workout type (running, cycling)
        #[arg(long = "type", default_value = "running")]
        kind: String,

        /// Distance in km
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        distance: String,

        /// Duration in minutes
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        duration: String,

        /// Steps per minute (running)
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        cadence: String,

        /// Elevation gain in metres (cycling)
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        elevation: String,
    },

    /// List all logged workouts
    List,

    /// Center the map on a workout from the list
    Show {
        /// Workout id as shown by `list`
        id: String,
    },

    /// Export the log to CSV
    Export {
        /// Output file
        #[arg(long)]
        out: PathBuf,
    },

    /// Delete every logged workout
    Reset,
}

type Controller = AppController<ConsoleMap, TerminalView, FileStorage>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    maplog_core::logging::init(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());
    let position = cli.from.or(config.location.map(Coordinates::from));

    let mut controller = AppController::new(
        config,
        ConsoleMap,
        TerminalView::default(),
        FileStorage::new(&data_dir),
    );

    match cli.command {
        Commands::Add {
            at,
            kind,
            distance,
            duration,
            cadence,
            elevation,
        } => cmd_add(
            &mut controller,
            position.unwrap_or(at),
            at,
            FormInputArgs {
                kind,
                distance,
                duration,
                cadence,
                elevation,
            },
        ),
        Commands::List => cmd_list(&controller),
        Commands::Show { id } => cmd_show(&mut controller, position, &id),
        Commands::Export { out } => cmd_export(&controller, &out),
        Commands::Reset => cmd_reset(&mut controller),
    }
}

struct FormInputArgs {
    kind: String,
    distance: String,
    duration: String,
    cadence: String,
    elevation: String,
}

fn boot(controller: &mut Controller, position: Option<Coordinates>) -> Result<()> {
    controller.start(&mut FixedGeolocator(position));
    if controller.state() == AppState::AwaitingLocation {
        return Err(Error::Geolocation(GeolocationError::Unavailable));
    }
    Ok(())
}

fn cmd_add(
    controller: &mut Controller,
    position: Coordinates,
    at: Coordinates,
    args: FormInputArgs,
) -> Result<()> {
    boot(controller, Some(position))?;
    controller.map_clicked(at);

    if let Ok(kind) = args.kind.parse::<WorkoutKind>() {
        controller.type_changed(kind);
    }
    let view = controller.view_mut();
    view.set_field(FormField::Type, &args.kind);
    view.set_field(FormField::Distance, &args.distance);
    view.set_field(FormField::Duration, &args.duration);
    view.set_field(FormField::Cadence, &args.cadence);
    view.set_field(FormField::Elevation, &args.elevation);

    match controller.submit()? {
        SubmitOutcome::Committed { id } => {
            println!("✓ Workout logged!");
            if let Some(workout) = controller.store().find_by_id(&id) {
                println!("  {}", ListEntry::from(workout));
            }
            Ok(())
        }
        SubmitOutcome::Rejected(e) => Err(Error::Validation(e)),
        SubmitOutcome::Ignored => Err(Error::Other("No open workout form".into())),
    }
}

fn cmd_list(controller: &Controller) -> Result<()> {
    let entries = controller.view().entries();
    if entries.is_empty() {
        println!("No workouts logged yet.");
        return Ok(());
    }

    // Newest first, as the sidebar shows them
    for entry in entries.iter().rev() {
        println!("{}", entry);
    }
    println!();
    println!("{} workouts", entries.len());
    Ok(())
}

fn cmd_show(controller: &mut Controller, position: Option<Coordinates>, id: &str) -> Result<()> {
    boot(controller, position)?;

    if !controller.select(id)? {
        println!("No workout with id {}", id);
        return Ok(());
    }

    if let (Some(workout), Some(session)) = (controller.store().find_by_id(id), controller.session()) {
        println!("✓ Map centered on {} (zoom {})", session.center(), session.zoom());
        println!("  {}", ListEntry::from(workout));
        println!("  Viewed {} times", workout.interaction_count());
    }
    Ok(())
}

fn cmd_export(controller: &Controller, out: &std::path::Path) -> Result<()> {
    let count = export_csv(controller.store().all(), out)?;
    println!("✓ Exported {} workouts", count);
    println!("  CSV: {}", out.display());
    Ok(())
}

fn cmd_reset(controller: &mut Controller) -> Result<()> {
    let count = controller.store().len();
    controller.reset()?;
    println!("✓ Removed {} workouts", count);
    Ok(())
}
