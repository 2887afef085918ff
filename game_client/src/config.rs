//! Configuration system.
//!
//! Loads client configuration from JSON strings/files (file IO left to app).

use game_protocol::math::Vec3;
use serde::{Deserialize, Serialize};

/// Root client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server address, e.g. `127.0.0.1:40000`.
    pub server_addr: String,
    /// Frame loop rate.
    pub tick_hz: u32,
    /// Name sent in the login request.
    #[serde(default = "default_player_name")]
    pub player_name: String,
    /// Where the local player object is created after login. The server
    /// does not send a spawn position in this protocol.
    #[serde(default = "default_spawn_point")]
    pub spawn_point: Vec3,
}

fn default_player_name() -> String {
    "Player".to_string()
}

fn default_spawn_point() -> Vec3 {
    Vec3::new(0.0, 0.5, 0.0)
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:40000".to_string(),
            tick_hz: 60,
            player_name: default_player_name(),
            spawn_point: default_spawn_point(),
        }
    }
}

impl ClientConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}
