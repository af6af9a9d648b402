use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use live_coach::session::{tip, CoachEvent, CoachingMode};
use live_coach::speech::{CommandSynthesizer, Recognizer, SpeechSynthesizer};
use live_coach::{
    create_router, AppState, Capability, CoachingSession, Config, HttpCoachingApi, Mood,
    PlaybackSink, Profile, ProfileClient, PushRecognizer, RecognitionFeed, SessionConfig,
    SpeechCaptureController,
};
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "live-coach", version, about = "Live sales conversation coach")]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(long, default_value = "config/live-coach")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the local control API
    Serve {
        /// LinkedIn profile the sessions are about
        #[arg(long)]
        linkedin_url: Option<String>,
    },
    /// Interactive terminal session; each typed line is one utterance
    Live {
        #[arg(long)]
        linkedin_url: Option<String>,
    },
    /// Look up a LinkedIn profile and print it as JSON
    Profile { linkedin_url: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("Live Coach v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);

    match cli.command {
        Command::Serve { linkedin_url } => serve(&cfg, linkedin_url).await,
        Command::Live { linkedin_url } => live(&cfg, linkedin_url).await,
        Command::Profile { linkedin_url } => {
            let profile = ProfileClient::new(cfg.endpoints.clone(), cfg.profile.clone())
                .lookup(&linkedin_url)
                .await?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
            Ok(())
        }
    }
}

/// Resolve the profile a session runs against; lookup failures fall back
/// to no profile
async fn load_profile(cfg: &Config, linkedin_url: Option<String>) -> Option<Profile> {
    let url = linkedin_url?;
    match ProfileClient::new(cfg.endpoints.clone(), cfg.profile.clone())
        .lookup(&url)
        .await
    {
        Ok(profile) => {
            info!("Coaching against {} ({})", profile.name, profile.company);
            Some(profile)
        }
        Err(e) => {
            warn!("Profile lookup failed, continuing without one: {}", e);
            None
        }
    }
}

fn build_session(cfg: &Config, profile: Option<Profile>) -> (CoachingSession, RecognitionFeed) {
    let session_config = SessionConfig::from(cfg);
    let recognizer = PushRecognizer::new();
    let feed = recognizer.feed();

    let recognizer: Arc<dyn Recognizer> = Arc::new(recognizer);
    let capture = SpeechCaptureController::new(
        Capability::Available(recognizer),
        session_config.recognition.clone(),
        session_config.subtitle_clear_delay,
    );

    let playback = match &cfg.speech.synthesizer_command {
        Some(program) => {
            let synthesizer: Arc<dyn SpeechSynthesizer> = Arc::new(
                CommandSynthesizer::new(program).with_args(cfg.speech.synthesizer_args.clone()),
            );
            PlaybackSink::new(Capability::Available(synthesizer))
        }
        None => PlaybackSink::unavailable(),
    };

    let session = CoachingSession::new(
        Arc::new(HttpCoachingApi::new(cfg.endpoints.clone())),
        capture,
        playback,
        profile,
        session_config,
    );
    (session, feed)
}

async fn serve(cfg: &Config, linkedin_url: Option<String>) -> Result<()> {
    let profile = load_profile(cfg, linkedin_url).await;
    let (session, feed) = build_session(cfg, profile);
    let app = create_router(AppState::new(session, feed));

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn live(cfg: &Config, linkedin_url: Option<String>) -> Result<()> {
    let profile = load_profile(cfg, linkedin_url).await;
    let coach_name = profile
        .as_ref()
        .and_then(Profile::first_name)
        .unwrap_or("Coach")
        .to_string();
    let (session, feed) = build_session(cfg, profile);

    let mut events = session.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                CoachEvent::StageChanged { stage } => println!("[{}]", stage),
                CoachEvent::SessionStarted { session_id } => {
                    println!("Session {} started. Type to speak.", session_id)
                }
                CoachEvent::Subtitle { text } => println!("{}: {}", coach_name, text),
                CoachEvent::Error { message } => println!("! {}", message),
                CoachEvent::ScorecardReady { scorecard } => println!(
                    "Score: {}/{} ({:.0}%)",
                    scorecard.total_score, scorecard.max_possible_score, scorecard.percentage
                ),
                CoachEvent::SummaryReady { summary } => {
                    println!("Summary: {}", summary.report.scenario_context);
                    for strength in &summary.report.strengths {
                        println!("  + {}", strength);
                    }
                    for area in &summary.report.areas_for_improvement {
                        println!("  - {}", area);
                    }
                }
                CoachEvent::MoodChanged { mood, tip } => println!("Mood: {} - {}", mood, tip),
                CoachEvent::ModeChanged { mode, tip } => println!("Mode: {} - {}", mode, tip),
                CoachEvent::TurnAppended { .. } | CoachEvent::Knowledge { .. } => {}
            }
        }
    });

    println!("Commands: /start /stop /mood <mood> /roleplay on|off /quit");
    println!("Tip: {}", tip(session.mood().await, CoachingMode::Coaching));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, arg) = line.split_once(' ').unwrap_or((line, ""));

        match command {
            "" => {}
            "/quit" => break,
            "/start" => {
                if let Err(e) = session.start_listening().await {
                    error!("{}", e);
                }
            }
            "/stop" => match session.stop_listening().await {
                Ok(outcome) => {
                    if let Some(artifacts) = outcome.artifacts {
                        let (summary, scorecard) =
                            tokio::join!(artifacts.summary, artifacts.scorecard);
                        if let Err(e) = summary {
                            warn!("Summary fetch task failed: {}", e);
                        }
                        if let Err(e) = scorecard {
                            warn!("Scorecard fetch task failed: {}", e);
                        }
                    }
                }
                Err(e) => error!("{}", e),
            },
            "/mood" => match Mood::from_str(arg.trim()) {
                Ok(mood) => session.set_mood(mood).await,
                Err(_) => println!("Unknown mood: {}", arg),
            },
            "/roleplay" => {
                let mode = if arg.trim() == "on" {
                    CoachingMode::RolePlay
                } else {
                    CoachingMode::Coaching
                };
                session.set_mode(mode).await;
            }
            _ => {
                if !feed.push_final(line) {
                    println!("Not listening, type /start first");
                }
            }
        }
    }

    session.stop_listening().await?;
    printer.abort();
    Ok(())
}
