//! Connection session.
//!
//! One session owns one outbound TCP connection for its whole life.
//! Frames are newline-delimited JSON envelopes. Inbound frames are
//! decoded on a reader task and pushed onto the work queue; the frame
//! loop applies them. There is no reconnect: once a session reaches
//! `Closed` it stays there.

use std::net::SocketAddr;

use anyhow::Context;
use game_protocol::rpc::{decode_frame, encode_frame, ClientRpc, InboundFrame, LoginPayload, ServerRpc};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream,
    },
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::queue::QueueHandle;

/// Session connection state.
///
/// `start` moves Disconnected -> Connecting, a successful transport
/// connect moves to Connected, and any close or transport error moves
/// to Closed. Closed is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
    Closed,
}

/// A live connection to the game server.
pub struct Session {
    writer: OwnedWriteHalf,
    reader: JoinHandle<()>,
    state: SessionState,
}

impl Session {
    /// Connects, wires the reader task to `queue`, and sends the login
    /// request with the configured player name.
    pub async fn connect(
        cfg: &ClientConfig,
        queue: QueueHandle<ServerRpc>,
    ) -> anyhow::Result<Self> {
        let addr: SocketAddr = cfg.server_addr.parse().context("parse server_addr")?;
        let stream = TcpStream::connect(addr).await.context("tcp connect")?;
        info!(server = %addr, "Connection opened");

        let (read_half, write_half) = stream.into_split();
        let reader = tokio::spawn(read_loop(read_half, queue));

        let mut session = Self {
            writer: write_half,
            reader,
            state: SessionState::Connected,
        };
        session
            .send(&ClientRpc::Login(LoginPayload {
                name: cfg.player_name.clone(),
            }))
            .await?;
        info!(name = %cfg.player_name, "Sent login");
        Ok(session)
    }

    /// Writes one outbound frame to the socket from the calling context.
    pub async fn send(&mut self, msg: &ClientRpc) -> anyhow::Result<()> {
        let mut line = encode_frame(msg)?;
        line.push('\n');
        self.writer
            .write_all(line.as_bytes())
            .await
            .context("socket write")?;
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True once the server side went away or `close` was called.
    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed || self.reader.is_finished()
    }

    /// Shuts the connection down. No in-flight work is drained.
    pub async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        if let Err(e) = self.writer.shutdown().await {
            debug!(error = %e, "Socket shutdown");
        }
        self.reader.abort();
        self.state = SessionState::Closed;
        info!("Connection closed");
    }
}

async fn read_loop(read_half: OwnedReadHalf, queue: QueueHandle<ServerRpc>) {
    let mut lines = BufReader::new(read_half).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => handle_frame(&line, &queue),
            Ok(None) => {
                info!("Connection closed by server");
                break;
            }
            Err(e) => {
                warn!(error = %e, "Socket read error");
                break;
            }
        }
    }
}

/// Dispatches one inbound frame from the read context.
///
/// Pings are observed here; everything else that the frame loop should
/// act on is queued. A frame that fails to decode is dropped, and the
/// session keeps reading.
fn handle_frame(line: &str, queue: &QueueHandle<ServerRpc>) {
    match decode_frame(line) {
        Ok(InboundFrame::Rpc(ServerRpc::Ping(ping))) => {
            info!(message = %ping.message, "Ping");
        }
        Ok(InboundFrame::Rpc(rpc)) => queue.push(rpc),
        Ok(InboundFrame::Unknown(method)) => {
            debug!(%method, "Dropped frame with unrecognized method");
        }
        Err(e) => {
            warn!(error = %e, "Dropped undecodable frame");
        }
    }
}
