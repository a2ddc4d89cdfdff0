use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use horizon_annotator::config::{LineThickness, SessionConfig};
use horizon_annotator::display::{DisplaySink, PngSnapshotSink};
use horizon_annotator::script::{parse_script, ScriptCommand};
use horizon_annotator::source::{FrameSource, ImageSequence};
use horizon_annotator::store::{row_count, GroundTruthStore, SavePolicy, StoreError};
use horizon_annotator::{Session, SessionError};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay an event script against a video and save its ground truth
    Replay {
        /// Directory holding one image file per frame
        #[arg(short, long)]
        frames: PathBuf,

        /// Event script, one command per line
        #[arg(short, long)]
        script: PathBuf,

        /// Directory the ground-truth file is written to
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Maximum displayed width
        #[arg(long, default_value_t = 1720)]
        max_width: u32,

        /// Maximum displayed height
        #[arg(long, default_value_t = 960)]
        max_height: u32,

        /// Padding of the display surface in pixels
        #[arg(long, default_value_t = 2)]
        padding: i32,

        /// Thickness of shown annotations (1-10)
        #[arg(long, default_value = "2")]
        thickness: String,

        /// Save even if some frames are not annotated
        #[arg(long)]
        allow_incomplete: bool,

        /// Write the last displayed image to this PNG
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Print a summary of a ground-truth file
    Inspect {
        /// Ground-truth `.npy` file
        file: PathBuf,

        /// Expected frame count; defaults to the row count of the file
        #[arg(long)]
        frames: Option<usize>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    match args.command {
        Command::Replay {
            frames,
            script,
            output,
            max_width,
            max_height,
            padding,
            thickness,
            allow_incomplete,
            snapshot,
        } => {
            let config = SessionConfig {
                max_width,
                max_height,
                padding,
                line_thickness: LineThickness::parse(&thickness),
                ..SessionConfig::default()
            };
            let policy = if allow_incomplete {
                SavePolicy::AllowIncomplete
            } else {
                SavePolicy::RequireComplete
            };
            replay(&frames, &script, &output, config, policy, snapshot)
        }
        Command::Inspect { file, frames } => inspect(&file, frames),
    }
}

fn replay(
    frames: &Path,
    script: &Path,
    output: &Path,
    config: SessionConfig,
    policy: SavePolicy,
    snapshot: Option<PathBuf>,
) -> Result<()> {
    let text = std::fs::read_to_string(script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;
    let commands = parse_script(&text).context("Failed to parse script")?;
    tracing::info!("Replaying {} commands from {}", commands.len(), script.display());

    let source = ImageSequence::open(frames).context("Failed to open frames")?;
    let snapshot_path =
        snapshot.unwrap_or_else(|| std::env::temp_dir().join("horizon-annotator.png"));
    let display = PngSnapshotSink::new(snapshot_path);
    let mut session =
        Session::open(source, display, config).context("Failed to start annotation session")?;

    let gt_path = session.ground_truth_path(output);
    for command in commands {
        match apply(&mut session, command, &gt_path, policy) {
            Ok(()) => {}
            Err(SessionError::Collaborator(err)) => return Err(err),
            // user-facing notices: report and carry on
            Err(err) => tracing::warn!("{}", err),
        }
    }

    tracing::info!(
        "Frame {}/{}: {}",
        session.frame_index() + 1,
        session.frame_count(),
        session.summary()
    );
    save(&session, &gt_path, policy)?;

    session
        .display_mut()
        .flush()
        .context("Failed to write display snapshot")?;
    Ok(())
}

fn apply<S, D>(
    session: &mut Session<S, D>,
    command: ScriptCommand,
    gt_path: &Path,
    policy: SavePolicy,
) -> Result<(), SessionError>
where
    S: FrameSource,
    D: DisplaySink,
{
    match command {
        ScriptCommand::Pointer(event) => {
            let outcome = session.pointer(event)?;
            tracing::debug!("{:?} -> {:?}", event, outcome);
        }
        ScriptCommand::Key(key) => {
            let outcome = session.command(key)?;
            tracing::info!("{:?}: {:?} ({})", key, outcome, session.summary());
        }
        ScriptCommand::Next => {
            session.next()?;
        }
        ScriptCommand::Back => {
            session.back()?;
        }
        ScriptCommand::Offset(value) => {
            session.set_browsing_offset(&value)?;
        }
        ScriptCommand::Thickness(value) => {
            session.set_line_thickness(&value);
        }
        ScriptCommand::Load(path) => session.load_ground_truth(&path)?,
        ScriptCommand::Save => session.save(gt_path, policy)?,
    }
    Ok(())
}

fn save<S, D>(session: &Session<S, D>, path: &Path, policy: SavePolicy) -> Result<()>
where
    S: FrameSource,
    D: DisplaySink,
{
    match session.save(path, policy) {
        Ok(()) => {
            tracing::info!("Ground truth saved to {}", path.display());
            Ok(())
        }
        Err(SessionError::Store(StoreError::IncompleteAnnotation { missing, total })) => {
            bail!(
                "{} of {} frames are not annotated; rerun with --allow-incomplete to save anyway",
                missing,
                total
            )
        }
        Err(err) => Err(err).context("Failed to save ground truth"),
    }
}

fn inspect(file: &Path, frames: Option<usize>) -> Result<()> {
    let rows = match frames {
        Some(rows) => rows,
        None => row_count(file)
            .with_context(|| format!("Failed to read {}", file.display()))?,
    };

    let mut store = GroundTruthStore::new(rows);
    store
        .load(file)
        .with_context(|| format!("Failed to load {}", file.display()))?;

    let missing = store.missing();
    tracing::info!("{}: {} frames", file.display(), store.len());
    tracing::info!("Annotated: {}", store.annotated_count());
    if missing.is_empty() {
        tracing::info!("All frames are annotated");
    } else {
        tracing::info!("Missing ({}): {:?}", missing.len(), missing);
    }
    Ok(())
}
