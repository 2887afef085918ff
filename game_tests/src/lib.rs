//! Test support: a scriptable loopback server speaking the wire
//! protocol, plus a recording stage for world assertions.

use anyhow::Context;
use game_client::world::{Prefab, Stage};
use game_protocol::{
    math::Vec3,
    rpc::{encode_frame, ClientRpc, ServerRpc},
};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpListener,
    },
};

/// Loopback server bound to an ephemeral port.
pub struct StubServer {
    listener: TcpListener,
}

impl StubServer {
    pub async fn bind() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("tcp bind")?;
        Ok(Self { listener })
    }

    /// Address to put in the client config.
    pub fn addr(&self) -> anyhow::Result<String> {
        Ok(self.listener.local_addr().context("local_addr")?.to_string())
    }

    pub async fn accept(&self) -> anyhow::Result<StubConn> {
        let (stream, _) = self.listener.accept().await.context("tcp accept")?;
        let (read_half, write_half) = stream.into_split();
        Ok(StubConn {
            lines: BufReader::new(read_half).lines(),
            writer: write_half,
        })
    }
}

/// One accepted client connection, driven frame by frame by the test.
pub struct StubConn {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl StubConn {
    /// Reads the next frame the client sent.
    pub async fn recv(&mut self) -> anyhow::Result<ClientRpc> {
        let line = self
            .lines
            .next_line()
            .await
            .context("read client frame")?
            .context("client closed the connection")?;
        serde_json::from_str(&line).context("decode client frame")
    }

    /// Sends one server message.
    pub async fn send(&mut self, msg: &ServerRpc) -> anyhow::Result<()> {
        self.send_raw(&encode_frame(msg)?).await
    }

    /// Sends an arbitrary text frame, e.g. one with an unknown method.
    pub async fn send_raw(&mut self, frame: &str) -> anyhow::Result<()> {
        let mut line = frame.to_string();
        line.push('\n');
        self.writer
            .write_all(line.as_bytes())
            .await
            .context("write frame")?;
        Ok(())
    }
}

/// Stage that records every primitive call; handles are indices.
#[derive(Default)]
pub struct RecordingStage {
    pub objects: Vec<RecordedObject>,
    pub creates: usize,
    pub destroys: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedObject {
    pub prefab: Prefab,
    pub name: String,
    pub position: Vec3,
}

impl Stage for RecordingStage {
    type Handle = usize;

    fn create(&mut self, prefab: Prefab, name: String, position: Vec3) -> usize {
        self.creates += 1;
        self.objects.push(RecordedObject {
            prefab,
            name,
            position,
        });
        self.objects.len() - 1
    }

    fn set_position(&mut self, handle: &usize, position: Vec3) {
        self.objects[*handle].position = position;
    }

    fn destroy(&mut self, _handle: usize) {
        self.destroys += 1;
    }
}
