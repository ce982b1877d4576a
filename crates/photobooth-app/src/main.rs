//! Command-line photobooth client.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use photobooth_app::{AppError, BoothApp, BoothConfig, app_version, context_source_for};
use photobooth_capture::{
    CameraDevice, CaptureObserver, CaptureState, PhotoReady, StillImageCamera, SyntheticCamera,
};
use photobooth_core::{ContextId, GuestDetails};
use photobooth_ui::{
    CreateEventForm, JoinEventForm, Navigator, Notifier, RegistrationForm,
};

#[derive(Parser, Debug)]
#[command(name = "photobooth", version = app_version(), about = "Photobooth backend client")]
struct Args {
    /// Path to config file (TOML format)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend origin, e.g. https://booth.example.org (overrides config and env)
    #[arg(long, global = true)]
    origin: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a host account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        /// Used for both password fields
        #[arg(long)]
        password: String,
    },
    /// List events of the signed-in host
    Events,
    /// Create an event
    CreateEvent {
        name: String,
        /// Base URL encoded into gallery QR codes
        #[arg(long, default_value = "")]
        qr_base_url: String,
    },
    /// Join an event by code
    Join { code: String },
    /// Show one gallery page of an event
    Gallery {
        event_id: String,
        #[arg(long, default_value = "1")]
        page: u32,
    },
    /// Show booth camera settings
    Settings,
    /// Run a headless booth session
    Booth {
        /// Event to attach photos to
        #[arg(long, conflicts_with = "session")]
        event: Option<String>,
        /// Legacy session to attach photos to
        #[arg(long)]
        session: Option<String>,
        /// Name shown for the booth operator in logs
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = "")]
        guest_name: String,
        #[arg(long, default_value = "")]
        guest_email: String,
        /// Serve this image instead of the synthetic test pattern
        #[arg(long)]
        image: Option<PathBuf>,
        /// Number of photos to take
        #[arg(long, default_value = "1")]
        shots: u32,
    },
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn show_error(&self, message: &str) {
        eprintln!("Error: {message}");
    }

    fn show_success(&self, message: &str) {
        println!("{message}");
    }
}

struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, url: &str) {
        println!("Continue at {url}");
    }
}

struct ConsoleObserver;

impl CaptureObserver for ConsoleObserver {
    fn on_state(&self, state: CaptureState) {
        log::debug!("booth state: {state:?}");
    }

    fn on_countdown_tick(&self, remaining: u32) {
        if remaining > 0 {
            println!("{remaining}...");
        }
    }

    fn on_flash(&self, _duration: Duration) {
        println!("*click*");
    }

    fn on_photo_count(&self, count: u64) {
        println!("Photos taken: {count}");
    }

    fn on_photo_ready(&self, photo: &PhotoReady) {
        println!("Photo {} saved", photo.photo_id);
        println!("  download: {}", photo.download_url);
        println!("  qr code:  {}", photo.qr_url);
    }

    fn on_error(&self, message: &str) {
        eprintln!("Error: {message}");
    }
}

fn load_config(args: &Args) -> Result<BoothConfig, AppError> {
    let mut config = BoothConfig::load(args.config.as_deref())?;
    config.apply_process_env()?;
    if let Some(origin) = &args.origin {
        config.origin = origin.clone();
    }
    Ok(config)
}

async fn run(args: Args) -> Result<(), AppError> {
    let config = load_config(&args)?;
    let app = BoothApp::connect(&config, Arc::new(ConsoleNotifier), Arc::new(ConsoleNavigator))?;

    match args.command {
        Command::Register {
            email,
            first_name,
            last_name,
            password,
        } => {
            let form = RegistrationForm {
                email,
                first_name,
                last_name,
                password1: password.clone(),
                password2: password,
            };
            app.registration().handle_registration(&form).await?;
        }
        Command::Events => {
            for event in app.api().list_events().await? {
                println!(
                    "{}\t{}\t{}\t{} photos{}",
                    event.id,
                    event.code.as_deref().unwrap_or("-"),
                    event.name,
                    event.photo_count,
                    if event.is_active { "" } else { " (closed)" }
                );
            }
        }
        Command::CreateEvent { name, qr_base_url } => {
            let form = CreateEventForm { name, qr_base_url };
            app.events().handle_create_event(&form).await?;
        }
        Command::Join { code } => {
            app.events()
                .handle_join_event(&JoinEventForm { code })
                .await?;
        }
        Command::Gallery { event_id, page } => {
            let gallery = app
                .api()
                .gallery_page(&ContextId::new(event_id), page)
                .await?;
            println!(
                "{}: page {} ({} photos total)",
                gallery.event.name, gallery.current_page, gallery.total_photos
            );
            for photo in &gallery.photos {
                println!(
                    "{}\t{}\t{}",
                    photo.id,
                    photo.taken_at.as_deref().unwrap_or("-"),
                    app.api().download_url(&photo.id)
                );
            }
        }
        Command::Settings => {
            let settings = app.api().camera_settings().await?;
            println!(
                "{}x{} @ {} fps, countdown {}s, quality {}",
                settings.resolution.width,
                settings.resolution.height,
                settings.fps,
                settings.countdown,
                settings.quality
            );
        }
        Command::Booth {
            event,
            session,
            name,
            guest_name,
            guest_email,
            image,
            shots,
        } => {
            let source = context_source_for(event.as_deref(), session.as_deref())?;
            let camera: Arc<dyn CameraDevice> = match image {
                Some(path) => Arc::new(StillImageCamera::new(path)),
                None => Arc::new(SyntheticCamera::new()),
            };
            log::info!(
                "starting booth {}",
                name.as_deref().unwrap_or("(unnamed)")
            );
            let workflow = app.workflow(camera, source, Arc::new(ConsoleObserver));
            let guest = GuestDetails::new(&guest_name, &guest_email);
            let photos = app.run_booth(workflow, &guest, shots).await?;
            log::info!("booth finished with {} photo(s)", photos.len());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("photobooth {}", app_version());

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("{error}");
            ExitCode::FAILURE
        }
    }
}
