pub mod blocks;
pub mod cli;
pub mod config;
pub mod console_host;
pub mod event_loop;
pub mod host;
pub mod logging;
pub mod midi_output;
pub mod sync;

pub use blocks::{checksum, frame, key_command, scale_command, Command, Frame};
pub use cli::{validate_device, Args};
pub use console_host::ConsoleHost;
pub use event_loop::{Control, EventLoop};
pub use host::{
    normalize, DeviceHandle, DeviceId, EventKind, HostSnapshot, NotificationSource, TrackHandle,
};
pub use midi_output::{DryRunSink, FrameSink, MidiError, MidiOutputManager, RecordingSink};
pub use sync::{SyncAction, SyncEngine, SyncState};

#[cfg(not(feature = "test-mock"))]
pub fn handle_device_list() -> Vec<String> {
    match MidiOutputManager::list_available_ports() {
        Ok(ports) => ports,
        Err(e) => {
            log::error!("Failed to list MIDI ports: {}", e);
            Vec::new()
        }
    }
}

#[cfg(feature = "test-mock")]
pub fn handle_device_list() -> Vec<String> {
    vec!["Mock Device 1".to_string(), "Mock Device 2".to_string()]
}
