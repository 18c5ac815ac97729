mod host;
mod sources;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use formats::validate_manifest;
use reqwest::Client;
use runtime::{Event, Frame};
use scene::Area;
use streaming::TransitionState;
use tour::{MANIFEST_URL_ENV, ManifestSource, ManifestTask, TourConfig, TourSession};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::host::TextureHost;
use crate::sources::AnySource;

#[derive(Parser, Debug)]
#[command(author, version, about = "Panorama tour manifest checker and walker")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and validate a manifest, then list its areas
    Check {
        /// Manifest URL or file path
        #[arg(env = MANIFEST_URL_ENV)]
        source: String,

        /// Print the normalized areas as JSON
        #[arg(long)]
        json: bool,
    },

    /// Navigate through areas, loading panoramas from disk
    Walk {
        /// Manifest URL or file path (built-in areas are used if it fails)
        source: String,

        /// Directory that site-absolute panorama paths resolve under
        #[arg(long, default_value = "public")]
        pano_root: PathBuf,

        /// Simulated frame rate
        #[arg(long, default_value_t = 60.0)]
        fps: f64,

        /// Give up on a transition after this many seconds
        #[arg(long, default_value_t = 10.0)]
        timeout_s: f64,

        /// Area ids to visit, in order
        #[arg(required = true)]
        areas: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let client = Client::new();

    match args.command {
        Command::Check { source, json } => check(&AnySource::parse(&source, &client), json).await?,
        Command::Walk {
            source,
            pano_root,
            fps,
            timeout_s,
            areas,
        } => {
            let source = AnySource::parse(&source, &client);
            let host = TextureHost::new(client, pano_root);
            walk(&source, host, fps, timeout_s, &areas).await?
        }
    }

    Ok(())
}

async fn check(source: &AnySource, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let payload = source.fetch().await?;
    let areas = validate_manifest(&payload)?;
    info!(source = %source.describe(), areas = areas.len(), "manifest valid");

    if json {
        println!("{}", serde_json::to_string_pretty(&areas)?);
    } else {
        print_areas(&areas);
    }
    Ok(())
}

fn print_areas(areas: &[Area]) {
    for area in areas {
        println!(
            "{}\t{}\t{}\tyaw {:+}",
            area.id, area.name, area.panorama_ref, area.yaw_offset
        );
        for hotspot in &area.hotspots {
            let known = areas.iter().any(|a| a.id == hotspot.target_area_id);
            println!(
                "  -> {}\t{}\tyaw {} pitch {} r {}{}",
                hotspot.target_area_id,
                hotspot.label,
                hotspot.normalized_yaw(),
                hotspot.pitch,
                hotspot.radius,
                if known { "" } else { "\t(dangling)" }
            );
        }
    }
}

async fn walk(
    source: &AnySource,
    mut host: TextureHost,
    fps: f64,
    timeout_s: f64,
    areas: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    if !(fps.is_finite() && fps > 0.0) {
        return Err(format!("--fps must be positive, got {fps}").into());
    }
    let dt = 1.0 / fps;
    let max_frames = (timeout_s.max(0.0) * fps).ceil() as u64;

    let config = TourConfig::from_env();
    let mut session = match ManifestTask::new().run(source).await {
        Some(manifest_areas) => TourSession::with_areas(config, manifest_areas),
        None => {
            warn!(source = %source.describe(), "manifest unusable; walking the built-in areas");
            TourSession::new(config)
        }
    };

    let mut frame = Frame::first(dt);
    for id in areas {
        if !session.select_area(id) {
            println!("{id}: unknown area, skipped");
            continue;
        }

        let mut frames = 0;
        loop {
            let commands = session.drain_texture_commands();
            for (ticket, result) in host.run(commands).await {
                session.complete_load(ticket, result);
            }
            session.on_frame(frame);
            frame = frame.next(dt);
            frames += 1;

            if session.textures().is_settled() || frames >= max_frames {
                break;
            }
        }

        log_events(session.drain_events());
        let textures = session.textures();
        match (textures.state(), textures.base()) {
            (TransitionState::Ready, Some(base)) => {
                println!("{id}: ready {} after {frames} frames", base.path)
            }
            (TransitionState::Failed, _) => {
                println!("{id}: failed, previous panorama kept")
            }
            (state, _) => println!("{id}: unsettled ({state:?}) after {frames} frames"),
        }
    }

    let commands = session.shutdown();
    host.run(commands).await;
    println!(
        "released {} textures, {} still live",
        host.disposed(),
        host.live()
    );
    Ok(())
}

fn log_events(events: Vec<Event>) {
    for event in events {
        info!(frame = event.frame_index, kind = ?event.kind, "{}", event.message);
    }
}
