//! Position reporting.
//!
//! The frame loop checks the local player's rendered position once per
//! frame and sends a `player_update` only when it changed since the
//! last one sent.

use game_protocol::{
    math::Vec3,
    rpc::{ClientRpc, PlayerId, PlayerUpdatePayload},
};

/// Remembers the last reported position between frames.
#[derive(Debug, Default)]
pub struct PositionReporter {
    last_sent: Option<Vec3>,
}

impl PositionReporter {
    /// Returns the update to send, or `None` if the position has not
    /// moved since the previous report.
    pub fn report(&mut self, id: PlayerId, current: Vec3) -> Option<ClientRpc> {
        if self.last_sent == Some(current) {
            return None;
        }
        self.last_sent = Some(current);
        Some(ClientRpc::PlayerUpdate(PlayerUpdatePayload {
            id,
            position: current,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_report_always_fires() {
        let mut reporter = PositionReporter::default();
        assert!(reporter.report(PlayerId(1), Vec3::new(0.0, 0.5, 0.0)).is_some());
    }

    #[test]
    fn unchanged_position_is_skipped() {
        let mut reporter = PositionReporter::default();
        let pos = Vec3::new(1.0, 0.5, 2.0);
        assert!(reporter.report(PlayerId(1), pos).is_some());
        assert!(reporter.report(PlayerId(1), pos).is_none());
        assert!(reporter.report(PlayerId(1), pos).is_none());
    }

    #[test]
    fn each_change_is_sent_exactly_once() {
        let mut reporter = PositionReporter::default();
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(2.0, 0.0, 0.0);

        assert!(reporter.report(PlayerId(1), a).is_some());
        assert!(reporter.report(PlayerId(1), a).is_none());
        let update = reporter.report(PlayerId(1), b);
        match update {
            Some(ClientRpc::PlayerUpdate(p)) => assert_eq!(p.position, b),
            other => panic!("unexpected report: {other:?}"),
        }
        assert!(reporter.report(PlayerId(1), b).is_none());
    }
}
