//! Full socket-based integration tests: session, work queue, and world
//! reconciliation against a scripted loopback server.

use std::time::{Duration, Instant};

use game_client::config::ClientConfig;
use game_client::queue::WorkQueue;
use game_client::report::PositionReporter;
use game_client::session::Session;
use game_client::world::{Prefab, Reconciler};
use game_protocol::math::Vec3;
use game_protocol::rpc::{
    ClientRpc, LoginResponsePayload, PingPayload, PlayerId, PlayerState, ServerRpc, SpawnPayload,
    SyncPayload,
};
use game_tests::{RecordingStage, StubServer};

fn init_logs() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_test_writer()
        .try_init();
}

fn test_config(addr: String) -> ClientConfig {
    ClientConfig {
        server_addr: addr,
        tick_hz: 60,
        player_name: "TestPlayer".to_string(),
        spawn_point: Vec3::new(0.0, 0.5, 0.0),
    }
}

fn sync(players: Vec<(i32, Vec3)>) -> ServerRpc {
    ServerRpc::Sync(SyncPayload {
        players: players
            .into_iter()
            .map(|(id, position)| PlayerState {
                id: PlayerId(id),
                position,
            })
            .collect(),
    })
}

/// Drains the queue until `n` messages arrived or the deadline passes.
async fn drain_at_least(queue: &mut WorkQueue<ServerRpc>, n: usize) -> Vec<ServerRpc> {
    let deadline = Instant::now() + Duration::from_secs(2);
    let mut batch = Vec::new();
    while batch.len() < n && Instant::now() < deadline {
        batch.extend(queue.drain());
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    batch
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn login_sync_and_spawn_reconcile_over_socket() -> anyhow::Result<()> {
    init_logs();

    let server = StubServer::bind().await?;
    let cfg = test_config(server.addr()?);

    let mut queue = WorkQueue::new();
    let mut session = Session::connect(&cfg, queue.handle()).await?;
    let mut conn = server.accept().await?;

    // The session logs in immediately after the transport connects.
    let login = conn.recv().await?;
    match login {
        ClientRpc::Login(p) => assert_eq!(p.name, "TestPlayer"),
        other => panic!("expected login first, got {other:?}"),
    }

    conn.send(&ServerRpc::LoginResponse(LoginResponsePayload {
        id: PlayerId(7),
    }))
    .await?;
    // Snapshot listing both the local player and a remote one.
    conn.send(&sync(vec![
        (7, Vec3::new(9.0, 9.0, 9.0)),
        (2, Vec3::new(1.0, 0.0, 1.0)),
    ]))
    .await?;
    // Neither of these may reach the work queue.
    conn.send_raw(r#"{"method":"unknown_method","payload":{}}"#)
        .await?;
    conn.send(&ServerRpc::Ping(PingPayload {
        message: "hello".to_string(),
    }))
    .await?;
    // Identical snapshot again, then an item spawn.
    conn.send(&sync(vec![(2, Vec3::new(1.0, 0.0, 1.0))])).await?;
    conn.send(&ServerRpc::Spawn(SpawnPayload {
        position: Vec3::new(3.0, 0.5, -2.0),
    }))
    .await?;

    let batch = drain_at_least(&mut queue, 4).await;
    assert_eq!(batch.len(), 4, "ping and unknown frames must not be queued");

    let mut world = Reconciler::new(RecordingStage::default(), cfg.spawn_point);
    for rpc in batch {
        world.apply(rpc);
    }

    // Local player was created at the configured spawn point.
    assert_eq!(world.local_id(), Some(PlayerId(7)));
    let local = &world.stage().objects[*world.local_player().unwrap()];
    assert_eq!(local.prefab, Prefab::Player);
    assert_eq!(local.position, Vec3::new(0.0, 0.5, 0.0));

    // The local id never enters the registry; the remote player does,
    // once, even after the duplicated snapshot.
    assert!(!world.has_remote(PlayerId(7)));
    assert!(world.has_remote(PlayerId(2)));
    assert_eq!(world.remote_count(), 1);
    let other = world
        .stage()
        .objects
        .iter()
        .find(|o| o.name == "Other2")
        .expect("remote player object");
    assert_eq!(other.position, Vec3::new(1.0, 0.0, 1.0));

    // The spawn produced one untracked item.
    let items: Vec<_> = world
        .stage()
        .objects
        .iter()
        .filter(|o| o.prefab == Prefab::Item)
        .collect();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].position, Vec3::new(3.0, 0.5, -2.0));

    session.close().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn position_updates_sent_only_on_change() -> anyhow::Result<()> {
    init_logs();

    let server = StubServer::bind().await?;
    let cfg = test_config(server.addr()?);

    let queue = WorkQueue::new();
    let mut session = Session::connect(&cfg, queue.handle()).await?;
    let mut conn = server.accept().await?;
    let _login = conn.recv().await?;

    let id = PlayerId(7);
    let mut reporter = PositionReporter::default();
    let a = Vec3::new(1.0, 0.5, 0.0);
    let b = Vec3::new(2.0, 0.5, 0.0);

    // Three frames at `a`, then one at `b`: exactly two sends.
    for current in [a, a, a, b] {
        if let Some(update) = reporter.report(id, current) {
            session.send(&update).await?;
        }
    }

    match conn.recv().await? {
        ClientRpc::PlayerUpdate(p) => assert_eq!(p.position, a),
        other => panic!("expected player_update, got {other:?}"),
    }
    match conn.recv().await? {
        ClientRpc::PlayerUpdate(p) => assert_eq!(p.position, b),
        other => panic!("expected player_update, got {other:?}"),
    }

    session.close().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn server_close_is_terminal_for_the_session() -> anyhow::Result<()> {
    init_logs();

    let server = StubServer::bind().await?;
    let cfg = test_config(server.addr()?);

    let mut queue = WorkQueue::new();
    let session = Session::connect(&cfg, queue.handle()).await?;
    let conn = server.accept().await?;
    drop(conn);

    let deadline = Instant::now() + Duration::from_secs(2);
    while !session.is_closed() && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(session.is_closed(), "session must observe the server close");
    assert!(queue.drain().is_empty());
    Ok(())
}
