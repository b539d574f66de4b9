// fitboard - CLI for virtual try-on generation and realism enhancement

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use compositor::CollageTemplate;
use fitboard::config::{api_key, FitboardConfig};
use fitboard::tryon::types::MAX_OUTFITS;
use fitboard::tryon::{
    Asset, Exporter, Garment, Orchestrator, Outfit, RealismEnhancer, ResultBoard, RunEvent,
    RunState, StoryboardElement, TryOnSession,
};
use futures_util::future::join_all;
use gemini::GenerationService;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Virtual try-on generation with a multimodal model",
    long_about = None
)]
struct Args {
    /// Config file (defaults to ~/.config/fitboard/config.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the model wearing each outfit in five poses
    Generate {
        /// Photo of the person to dress
        #[arg(short, long)]
        model: PathBuf,

        /// Outfit as NAME=garment.png,garment2.png (repeatable, up to 3)
        #[arg(short, long)]
        outfit: Vec<String>,

        /// Hairstyle reference photo
        #[arg(long)]
        hairstyle: Option<PathBuf>,

        /// Blur faces in the hairstyle photo before using it
        #[arg(long, requires = "hairstyle")]
        blur_hairstyle_face: bool,

        /// Creative direction note (repeatable)
        #[arg(short, long)]
        note: Vec<String>,

        /// Allow facial features to drift from the model photo
        #[arg(long)]
        no_face_lock: bool,

        /// Also export a collage per outfit
        #[arg(long, value_enum)]
        collage: Option<CollageArg>,

        /// Output directory
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Hyper-realism pass over a single image
    Enhance {
        /// Image to enhance
        image: PathBuf,

        /// Output directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CollageArg {
    /// Four equal quadrants
    #[value(name = "2x2")]
    Grid,
    /// One tall panel left, two stacked right
    #[value(name = "3-panel")]
    ThreePanel,
}

impl From<CollageArg> for CollageTemplate {
    fn from(arg: CollageArg) -> Self {
        match arg {
            CollageArg::Grid => CollageTemplate::Grid2x2,
            CollageArg::ThreePanel => CollageTemplate::ThreePanel,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (for GEMINI_API_KEY)
    let dotenv = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    format!("fitboard={0},gemini={0},compositor={0}", log_level).into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = dotenv {
        tracing::debug!("Loaded .env file from: {}", path.display());
    }

    let config = FitboardConfig::load(args.config.as_deref()).context("Failed to load config")?;
    let client = config.build_client(api_key())?;
    let service: Arc<dyn GenerationService> = Arc::new(client);

    match args.command {
        Command::Generate {
            model,
            outfit,
            hairstyle,
            blur_hairstyle_face,
            note,
            no_face_lock,
            collage,
            out,
        } => {
            let out = out.unwrap_or_else(|| config.export.output_dir.clone());
            let mut session = TryOnSession::new();
            session.face_lock = config.generation.face_lock && !no_face_lock;

            session.model = Some(Asset::load(&model).await?);

            for (i, arg) in outfit.iter().enumerate() {
                let outfit = load_outfit(i, arg).await?;
                if !session.add_outfit(outfit) {
                    tracing::warn!(
                        "Only {} outfits are supported, ignoring {}",
                        MAX_OUTFITS,
                        arg
                    );
                }
            }

            if let Some(path) = hairstyle {
                session.set_hairstyle(Asset::load(&path).await?);
            }

            if blur_hairstyle_face {
                if let Some(hair) = session.hairstyle.as_mut() {
                    let model = &config.service.image_model;
                    if let Err(e) = hair.blur_face(service.as_ref(), model).await {
                        eprintln!("Could not blur the hairstyle photo, using it as is: {}", e);
                    }
                }
            }

            for (i, text) in note.into_iter().enumerate() {
                session
                    .storyboard
                    .push(StoryboardElement::note(format!("note-{}", i + 1), text));
            }

            generate(&config, service, &session, collage.map(Into::into), &out).await
        }
        Command::Enhance { image, out } => {
            let out = out.unwrap_or_else(|| config.export.output_dir.clone());
            let asset = Asset::load(&image).await?;

            let enhancer = RealismEnhancer::new(service, config.service.image_model.clone());
            let enhanced = enhancer.enhance(&asset).await?;

            tokio::fs::create_dir_all(&out).await?;
            let path = out.join(&enhanced.file_name);
            tokio::fs::write(&path, enhanced.bytes()).await?;
            println!("Enhanced image saved to: {}", path.display());
            Ok(())
        }
    }
}

/// Parse `NAME=a.png,b.png` and load its garments
async fn load_outfit(index: usize, arg: &str) -> anyhow::Result<Outfit> {
    let (name, files) = match arg.split_once('=') {
        Some((name, files)) if !name.trim().is_empty() => (name.trim().to_string(), files),
        Some((_, files)) => (format!("Outfit {}", index + 1), files),
        None => (format!("Outfit {}", index + 1), arg),
    };

    let id = format!("outfit-{}", index + 1);
    let paths: Vec<&str> = files.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();
    let assets = join_all(paths.iter().map(Asset::load)).await;

    let mut outfit = Outfit::new(&id, name);
    for (i, asset) in assets.into_iter().enumerate() {
        let garment = Garment::new(format!("{}-garment-{}", id, i + 1), asset?);
        if !outfit.add_garment(garment) {
            tracing::warn!(outfit = %outfit.name, "Outfit is full, dropping {}", paths[i]);
        }
    }
    Ok(outfit)
}

async fn generate(
    config: &FitboardConfig,
    service: Arc<dyn GenerationService>,
    session: &TryOnSession,
    collage: Option<CollageTemplate>,
    out: &Path,
) -> anyhow::Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let progress = tokio::spawn(async move {
        let mut board = ResultBoard::new();
        while let Some(event) = rx.recv().await {
            match &event {
                RunEvent::RunStarted { jobs } => println!("Generating {} look(s)...", jobs.len()),
                RunEvent::StateChanged(RunState::Synthesizing { job_id, pose }) => {
                    println!("  {} pose {}/5", job_id, pose + 1)
                }
                RunEvent::JobPublished { job_name, images, .. } => {
                    let failed = images.iter().filter(|i| i.image.is_placeholder()).count();
                    let total = images.len();
                    println!("✓ {} ready ({} of {} generated)", job_name, total - failed, total);
                }
                _ => {}
            }
            board.apply(&event);
        }
        board
    });

    let orchestrator = Orchestrator::new(service, config.settings()).with_events(tx);
    let run = orchestrator.generate(session).await;
    // Closing the sender ends the progress task
    drop(orchestrator);
    let board = progress.await?;
    let run = run?;

    let exporter = Exporter::new(config.badge_stamp()?);
    for job in &run.jobs {
        for image in &job.images {
            match exporter.export_single(&job.job.name, image).await {
                Ok(file) => {
                    let path = file.write_to(out).await?;
                    println!("Saved {}", path.display());
                }
                Err(e) => eprintln!("Export failed for {}: {}", image.id, e),
            }
        }

        if let Some(template) = collage {
            match exporter.export_collage(&job.job.name, template, &job.images).await {
                Ok(file) => {
                    let path = file.write_to(out).await?;
                    println!("Saved {}", path.display());
                }
                Err(e) => eprintln!("Collage export failed for {}: {}", job.job.name, e),
            }
        }
    }

    tokio::fs::create_dir_all(out).await?;
    let report_path = out.join("run.json");
    tokio::fs::write(&report_path, serde_json::to_vec_pretty(&run.report())?).await?;

    if let Some(name) = board.active_outfit_name() {
        tracing::info!("First look: {}", name);
    }
    println!("Run report saved to: {}", report_path.display());
    Ok(())
}
