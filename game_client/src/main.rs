//! Standalone client binary.
//!
//! Usage:
//!   cargo run -p game_client -- [--addr 127.0.0.1:40000] [--name Player] [--tick-hz 60]
//!
//! Connects to the server, logs in, reconciles sync/spawn messages into
//! an in-memory stage, and reports the local player's position when it
//! changes. Rendering is out of scope: the stage here only records
//! objects and logs what a real engine would draw, and the local player
//! walks a short scripted path so there is something to report.

use std::env;
use std::time::Duration;

use anyhow::Context;
use game_client::config::ClientConfig;
use game_client::queue::WorkQueue;
use game_client::report::PositionReporter;
use game_client::session::Session;
use game_client::world::{Prefab, Reconciler, Stage};
use game_protocol::math::Vec3;
use tracing::{debug, info};

/// Stage that records objects in memory. Handles are slot indices.
#[derive(Default)]
struct DemoStage {
    objects: Vec<Option<DemoObject>>,
}

struct DemoObject {
    name: String,
    position: Vec3,
}

impl DemoStage {
    fn position_of(&self, handle: usize) -> Option<Vec3> {
        self.objects.get(handle)?.as_ref().map(|o| o.position)
    }

    fn translate(&mut self, handle: usize, delta: Vec3) {
        if let Some(Some(obj)) = self.objects.get_mut(handle) {
            obj.position = Vec3::new(
                obj.position.x + delta.x,
                obj.position.y + delta.y,
                obj.position.z + delta.z,
            );
        }
    }

    fn live_count(&self) -> usize {
        self.objects.iter().flatten().count()
    }
}

impl Stage for DemoStage {
    type Handle = usize;

    fn create(&mut self, prefab: Prefab, name: String, position: Vec3) -> usize {
        info!(name = %name, ?prefab, ?position, "Created object");
        self.objects.push(Some(DemoObject { name, position }));
        self.objects.len() - 1
    }

    fn set_position(&mut self, handle: &usize, position: Vec3) {
        if let Some(Some(obj)) = self.objects.get_mut(*handle) {
            debug!(name = %obj.name, ?position, "Moved object");
            obj.position = position;
        }
    }

    fn destroy(&mut self, handle: usize) {
        if let Some(slot) = self.objects.get_mut(handle) {
            if let Some(obj) = slot.take() {
                info!(name = %obj.name, "Destroyed object");
            }
        }
    }
}

fn parse_args() -> ClientConfig {
    let mut cfg = ClientConfig::default();
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--addr" if i + 1 < args.len() => {
                cfg.server_addr = args[i + 1].clone();
                i += 2;
            }
            "--name" if i + 1 < args.len() => {
                cfg.player_name = args[i + 1].clone();
                i += 2;
            }
            "--tick-hz" if i + 1 < args.len() => {
                cfg.tick_hz = args[i + 1].parse().unwrap_or(cfg.tick_hz);
                i += 2;
            }
            _ => i += 1,
        }
    }
    cfg
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cfg = parse_args();
    info!(server = %cfg.server_addr, name = %cfg.player_name, "Starting client");

    let mut queue = WorkQueue::new();
    let mut session = Session::connect(&cfg, queue.handle())
        .await
        .context("connect")?;

    let mut world = Reconciler::new(DemoStage::default(), cfg.spawn_point);
    let mut reporter = PositionReporter::default();

    let tick_interval = Duration::from_secs_f32(1.0 / cfg.tick_hz as f32);
    let walk_step = Vec3::new(0.05, 0.0, 0.0);
    let mut frame: u64 = 0;

    loop {
        for rpc in queue.drain() {
            world.apply(rpc);
        }

        if let (Some(id), Some(&handle)) = (world.local_id(), world.local_player()) {
            // Scripted movement standing in for physics-driven input:
            // walk east for the first few seconds, then idle.
            if frame < 300 {
                world.stage_mut().translate(handle, walk_step);
            }

            if let Some(position) = world.stage().position_of(handle) {
                if let Some(update) = reporter.report(id, position) {
                    session.send(&update).await?;
                }
            }
        }

        if frame % 120 == 0 {
            info!(
                frame,
                objects = world.stage().live_count(),
                remote_players = world.remote_count(),
                "World"
            );
        }

        if session.is_closed() {
            info!("Session closed, shutting down");
            break;
        }

        tokio::time::sleep(tick_interval).await;
        frame += 1;
    }

    world.clear();
    session.close().await;
    Ok(())
}
