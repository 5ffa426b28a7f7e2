//! A host driven by text commands, for running without a DAW.
//!
//! Each line is one command:
//!
//! ```text
//! root 2
//! scale Harmonic Minor
//! device 7 drum Drum Rack
//! device 8 Operator
//! track
//! none
//! resync
//! quit
//! ```

use crate::event_loop::Control;
use crate::host::{DeviceHandle, EventKind, NotificationSource, TrackHandle};
use crossbeam::channel::Sender;
use log::{debug, info, warn};
use std::io::BufRead;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Root(Option<i64>),
    Scale(String),
    Device(DeviceHandle),
    Track,
    NoTrack,
    Resync,
    Quit,
}

/// Parse one console line. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_lowercase().as_str() {
        "root" => ConsoleCommand::Root(rest.parse().ok()),
        "scale" => ConsoleCommand::Scale(rest.to_string()),
        "device" => parse_device(rest)?,
        "track" => ConsoleCommand::Track,
        "none" => ConsoleCommand::NoTrack,
        "resync" => ConsoleCommand::Resync,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(format!("unknown command '{}'", other)),
    };
    Ok(Some(command))
}

fn parse_device(args: &str) -> Result<ConsoleCommand, String> {
    let mut words = args.split_whitespace().peekable();
    let id = words
        .next()
        .ok_or("device needs an id")?
        .parse::<u64>()
        .map_err(|e| format!("bad device id: {}", e))?;

    let drum = words.peek().is_some_and(|w| w.eq_ignore_ascii_case("drum"));
    if drum {
        words.next();
    }
    let name = words.collect::<Vec<_>>().join(" ");

    let mut device = DeviceHandle::new(id, name);
    if drum {
        device.can_have_drum_pads = Some(true);
    }
    Ok(ConsoleCommand::Device(device))
}

#[derive(Default)]
struct HostValues {
    root: Option<i64>,
    scale: Option<String>,
    track: Option<TrackHandle>,
    subscribers: Vec<(EventKind, Sender<EventKind>)>,
}

impl HostValues {
    fn notify(&self, kind: EventKind) {
        for (_, tx) in self.subscribers.iter().filter(|(k, _)| *k == kind) {
            let _ = tx.send(kind);
        }
    }
}

/// Host state set from console commands. Clones share the same state.
#[derive(Clone, Default)]
pub struct ConsoleHost {
    values: Arc<Mutex<HostValues>>,
}

impl ConsoleHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a host-side command and notify subscribers.
    /// Returns `false` for commands that are not host changes.
    pub fn apply(&self, command: ConsoleCommand) -> bool {
        let Ok(mut values) = self.values.lock() else {
            return false;
        };

        let kind = match command {
            ConsoleCommand::Root(root) => {
                values.root = root;
                EventKind::RootNote
            }
            ConsoleCommand::Scale(name) => {
                values.scale = Some(name);
                EventKind::ScaleName
            }
            ConsoleCommand::Device(device) => {
                values.track = Some(TrackHandle {
                    selected_device: Some(device),
                });
                EventKind::SelectedTrack
            }
            ConsoleCommand::Track => {
                values.track = Some(TrackHandle::default());
                EventKind::SelectedTrack
            }
            ConsoleCommand::NoTrack => {
                values.track = None;
                EventKind::SelectedTrack
            }
            ConsoleCommand::Resync | ConsoleCommand::Quit => return false,
        };

        debug!("Console host changed: {:?}", kind);
        values.notify(kind);
        true
    }

    /// Read commands from `reader` on a new thread until `quit` or EOF.
    pub fn spawn_reader<R>(&self, reader: R, control: Sender<Control>) -> JoinHandle<()>
    where
        R: BufRead + Send + 'static,
    {
        let host = self.clone();
        thread::spawn(move || {
            info!("Console input thread started");
            for line in reader.lines() {
                let Ok(line) = line else { break };
                match parse_line(&line) {
                    Ok(Some(ConsoleCommand::Resync)) => {
                        let _ = control.send(Control::Resync);
                    }
                    Ok(Some(ConsoleCommand::Quit)) => break,
                    Ok(Some(command)) => {
                        host.apply(command);
                    }
                    Ok(None) => {}
                    Err(e) => warn!("Ignoring console input '{}': {}", line, e),
                }
            }
            info!("Console input finished");
            let _ = control.send(Control::Shutdown);
        })
    }
}

impl NotificationSource for ConsoleHost {
    fn root_note(&self) -> Option<i64> {
        self.values.lock().ok().and_then(|v| v.root)
    }

    fn scale_name(&self) -> Option<String> {
        self.values.lock().ok().and_then(|v| v.scale.clone())
    }

    fn selected_track(&self) -> Option<TrackHandle> {
        self.values.lock().ok().and_then(|v| v.track.clone())
    }

    fn subscribe(&mut self, kind: EventKind, tx: Sender<EventKind>) {
        if let Ok(mut values) = self.values.lock() {
            values.subscribers.push((kind, tx));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel::unbounded;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_line("root 4"), Ok(Some(ConsoleCommand::Root(Some(4)))));
        assert_eq!(parse_line("ROOT x"), Ok(Some(ConsoleCommand::Root(None))));
        assert_eq!(
            parse_line("scale  Harmonic Minor "),
            Ok(Some(ConsoleCommand::Scale("Harmonic Minor".to_string())))
        );
        assert_eq!(parse_line("track"), Ok(Some(ConsoleCommand::Track)));
        assert_eq!(parse_line("none"), Ok(Some(ConsoleCommand::NoTrack)));
        assert_eq!(parse_line("resync"), Ok(Some(ConsoleCommand::Resync)));
        assert_eq!(parse_line("quit"), Ok(Some(ConsoleCommand::Quit)));
        assert_eq!(parse_line("   "), Ok(None));
        assert_eq!(parse_line("# comment"), Ok(None));
        assert!(parse_line("tempo 120").is_err());
    }

    #[test]
    fn test_parse_device() {
        assert_eq!(
            parse_line("device 7 drum Drum Rack"),
            Ok(Some(ConsoleCommand::Device(DeviceHandle::drum_rack(
                7,
                "Drum Rack"
            ))))
        );
        assert_eq!(
            parse_line("device 8 Wavetable"),
            Ok(Some(ConsoleCommand::Device(DeviceHandle::new(
                8,
                "Wavetable"
            ))))
        );
        assert!(parse_line("device").is_err());
        assert!(parse_line("device seven").is_err());
    }

    #[test]
    fn test_apply_notifies_matching_subscribers() {
        let mut host = ConsoleHost::new();
        let (root_tx, root_rx) = unbounded();
        let (track_tx, track_rx) = unbounded();
        host.subscribe(EventKind::RootNote, root_tx);
        host.subscribe(EventKind::SelectedTrack, track_tx);

        assert!(host.apply(ConsoleCommand::Root(Some(3))));
        assert_eq!(host.root_note(), Some(3));
        assert_eq!(root_rx.try_recv(), Ok(EventKind::RootNote));
        assert!(track_rx.try_recv().is_err());

        assert!(host.apply(ConsoleCommand::Track));
        assert_eq!(host.selected_track(), Some(TrackHandle::default()));
        assert_eq!(track_rx.try_recv(), Ok(EventKind::SelectedTrack));

        assert!(!host.apply(ConsoleCommand::Quit));
    }

    #[test]
    fn test_reader_sends_shutdown_at_eof() {
        let host = ConsoleHost::new();
        let (tx, rx) = unbounded();
        let input = std::io::Cursor::new("root 2\nscale Dorian\nresync\nbogus\n");
        host.spawn_reader(input, tx).join().unwrap();

        assert_eq!(host.root_note(), Some(2));
        assert_eq!(host.scale_name().as_deref(), Some("Dorian"));
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![Control::Resync, Control::Shutdown]);
    }
}
