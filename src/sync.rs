//! Debounced scale/key sync
//!
//! [`SyncEngine`] owns the last state sent to the keyboard and decides, for
//! each [`HostSnapshot`], whether anything needs to go out. Frames are always
//! sent scale first, then key, so the keyboard never shows a new key on an
//! old scale.

use crate::blocks::{frame, key_command, scale_command, Command, CHROMATIC_SCALE, C_KEY};
use crate::host::{DeviceId, HostSnapshot};
use crate::midi_output::FrameSink;
use log::{debug, error, info};

/// What a sync pass decided to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    None,
    EmitDrum,
    EmitScale,
}

/// Last state sent to the keyboard. `None` fields have never been sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
    pub root: Option<u8>,
    pub scale_name: Option<String>,
    pub device: Option<DeviceId>,
    pub is_drum_rack: bool,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide what `snapshot` requires, without changing anything.
    pub fn action_for(&self, snapshot: &HostSnapshot) -> SyncAction {
        if snapshot.is_drum_rack {
            if snapshot.device != self.device {
                SyncAction::EmitDrum
            } else {
                SyncAction::None
            }
        } else if self.root != Some(snapshot.root)
            || self.scale_name.as_deref() != Some(snapshot.scale_name.as_str())
            || self.device != snapshot.device
        {
            SyncAction::EmitScale
        } else {
            SyncAction::None
        }
    }
}

pub struct SyncEngine<S: FrameSink> {
    state: SyncState,
    sink: S,
}

impl<S: FrameSink> SyncEngine<S> {
    pub fn new(sink: S) -> Self {
        SyncEngine {
            state: SyncState::new(),
            sink,
        }
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Forget everything sent so far; the next pass emits unconditionally.
    pub fn reset(&mut self) {
        info!("Sync state reset, next pass will resend");
        self.state = SyncState::new();
    }

    /// Run one sync pass for `snapshot` and return the action taken.
    ///
    /// State is only updated once every frame of the pass was sent, so a
    /// failed pass is retried on the next notification.
    pub fn sync(&mut self, snapshot: &HostSnapshot) -> SyncAction {
        let action = self.state.action_for(snapshot);

        match action {
            SyncAction::None => {
                debug!(
                    "No change (root={}, scale={:?}, device={:?}, drum={})",
                    snapshot.root, snapshot.scale_name, snapshot.device, snapshot.is_drum_rack
                );
            }
            SyncAction::EmitDrum => {
                info!(
                    "Drum Rack: {}",
                    snapshot.device_name.as_deref().unwrap_or("<unnamed>")
                );
                if self.emit(&[CHROMATIC_SCALE, C_KEY]) {
                    // Root and scale stay as last sent in scale mode
                    self.state.device = snapshot.device;
                    self.state.is_drum_rack = true;
                }
            }
            SyncAction::EmitScale => {
                info!("Scale: {}, Root: {}", snapshot.scale_name, snapshot.root);
                let sent = self.emit(&[
                    scale_command(&snapshot.scale_name),
                    key_command(snapshot.root),
                ]);
                if sent {
                    self.state.root = Some(snapshot.root);
                    self.state.scale_name = Some(snapshot.scale_name.clone());
                    self.state.device = snapshot.device;
                    self.state.is_drum_rack = false;
                }
            }
        }

        action
    }

    /// Send `commands` in order, stopping at the first failure.
    /// Returns `true` only if every frame went out.
    fn emit(&mut self, commands: &[Command]) -> bool {
        for command in commands {
            if let Err(e) = self.sink.send(&frame(command)) {
                error!("Failed to send BLOCKS command [{}]: {}", command, e);
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::Frame;
    use crate::midi_output::{MidiError, RecordingSink, Result};

    fn commands(engine: &mut SyncEngine<RecordingSink>) -> Vec<Command> {
        engine
            .sink_mut()
            .take()
            .iter()
            .map(Frame::command)
            .collect()
    }

    #[test]
    fn test_first_pass_always_emits() {
        let mut engine = SyncEngine::new(RecordingSink::new());
        let action = engine.sync(&HostSnapshot::scale(0, "", None));
        assert_eq!(action, SyncAction::EmitScale);
        assert_eq!(commands(&mut engine), vec![scale_command("major"), key_command(0)]);
    }

    #[test]
    fn test_action_for_does_not_mutate() {
        let state = SyncState::new();
        let snapshot = HostSnapshot::scale(3, "Minor", None);
        assert_eq!(state.action_for(&snapshot), SyncAction::EmitScale);
        assert_eq!(state, SyncState::new());
    }

    #[test]
    fn test_scale_emission_overwrites_all_keys() {
        let mut engine = SyncEngine::new(RecordingSink::new());
        engine.sync(&HostSnapshot::scale(9, "Blues", Some(DeviceId(4))));
        assert_eq!(
            engine.state(),
            &SyncState {
                root: Some(9),
                scale_name: Some("Blues".to_string()),
                device: Some(DeviceId(4)),
                is_drum_rack: false,
            }
        );
    }

    #[test]
    fn test_drum_emission_keeps_root_and_scale() {
        let mut engine = SyncEngine::new(RecordingSink::new());
        engine.sync(&HostSnapshot::scale(2, "Dorian", None));
        engine.sync(&HostSnapshot::drum_rack(DeviceId(11)));
        assert_eq!(engine.state().root, Some(2));
        assert_eq!(engine.state().scale_name.as_deref(), Some("Dorian"));
        assert_eq!(engine.state().device, Some(DeviceId(11)));
        assert!(engine.state().is_drum_rack);
    }

    #[test]
    fn test_reset_forces_resend() {
        let mut engine = SyncEngine::new(RecordingSink::new());
        let snapshot = HostSnapshot::scale(5, "Lydian", None);
        assert_eq!(engine.sync(&snapshot), SyncAction::EmitScale);
        assert_eq!(engine.sync(&snapshot), SyncAction::None);
        engine.reset();
        assert_eq!(engine.sync(&snapshot), SyncAction::EmitScale);
    }

    /// Fails every send once `fail_from` frames have gone out.
    struct FailingSink {
        fail_from: usize,
        attempts: usize,
        sent: Vec<Frame>,
    }

    impl FailingSink {
        fn new(fail_from: usize) -> Self {
            FailingSink {
                fail_from,
                attempts: 0,
                sent: Vec::new(),
            }
        }
    }

    impl FrameSink for FailingSink {
        fn send(&mut self, frame: &Frame) -> Result<()> {
            self.attempts += 1;
            if self.sent.len() >= self.fail_from {
                return Err(MidiError::SendError("port closed".to_string()));
            }
            self.sent.push(frame.clone());
            Ok(())
        }
    }

    #[test]
    fn test_send_failure_does_not_halt() {
        let mut engine = SyncEngine::new(FailingSink::new(0));
        let snapshot = HostSnapshot::scale(1, "Minor", None);
        assert_eq!(engine.sync(&snapshot), SyncAction::EmitScale);
        // Key frame is not sent after the scale frame failed
        assert_eq!(engine.sink().attempts, 1);
        assert_eq!(engine.state(), &SyncState::new());

        // Nothing was recorded, so the next pass tries again
        assert_eq!(engine.sync(&snapshot), SyncAction::EmitScale);
        assert_eq!(engine.sink().attempts, 2);
    }

    #[test]
    fn test_key_frame_failure_is_retried() {
        let mut engine = SyncEngine::new(FailingSink::new(1));
        let snapshot = HostSnapshot::scale(4, "Lydian", Some(DeviceId(2)));
        assert_eq!(engine.sync(&snapshot), SyncAction::EmitScale);
        assert_eq!(engine.sink().attempts, 2);
        assert_eq!(engine.sink().sent.len(), 1);
        assert_eq!(engine.state(), &SyncState::new());

        // Port recovers; the full pair goes out and is then debounced
        engine.sink_mut().fail_from = usize::MAX;
        engine.sink_mut().sent.clear();
        assert_eq!(engine.sync(&snapshot), SyncAction::EmitScale);
        let sent: Vec<Command> = engine.sink().sent.iter().map(Frame::command).collect();
        assert_eq!(sent, vec![scale_command("lydian"), key_command(4)]);
        assert_eq!(engine.state().root, Some(4));
        assert_eq!(engine.sync(&snapshot), SyncAction::None);
    }

    #[test]
    fn test_drum_failure_keeps_previous_device() {
        let mut engine = SyncEngine::new(FailingSink::new(2));
        engine.sync(&HostSnapshot::scale(0, "Major", None));

        let drum = HostSnapshot::drum_rack(DeviceId(6));
        assert_eq!(engine.sync(&drum), SyncAction::EmitDrum);
        assert_eq!(engine.state().device, None);
        assert!(!engine.state().is_drum_rack);

        engine.sink_mut().fail_from = usize::MAX;
        assert_eq!(engine.sync(&drum), SyncAction::EmitDrum);
        assert_eq!(engine.state().device, Some(DeviceId(6)));
    }
}
