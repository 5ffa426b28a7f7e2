//! Host-side view of the DAW
//!
//! The sync engine never talks to the host directly. It sees the host
//! through [`NotificationSource`], which exposes the current root note,
//! scale and selection, and pushes an [`EventKind`] into a channel whenever
//! one of them changes. [`normalize`] turns whatever the host reports into
//! a [`HostSnapshot`] the engine can compare.

use crossbeam::channel::Sender;

/// Opaque identity of a device in the host's object model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub u64);

/// The device selected on a track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHandle {
    pub id: DeviceId,
    pub name: String,
    /// `None` when the host does not report the capability at all
    pub can_have_drum_pads: Option<bool>,
}

impl DeviceHandle {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        DeviceHandle {
            id: DeviceId(id),
            name: name.into(),
            can_have_drum_pads: None,
        }
    }

    pub fn drum_rack(id: u64, name: impl Into<String>) -> Self {
        DeviceHandle {
            can_have_drum_pads: Some(true),
            ..DeviceHandle::new(id, name)
        }
    }

    pub fn is_drum_rack(&self) -> bool {
        self.can_have_drum_pads.unwrap_or(false)
    }
}

/// The selected track and its selected device, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackHandle {
    pub selected_device: Option<DeviceHandle>,
}

/// Host values the engine reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    RootNote,
    ScaleName,
    SelectedTrack,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [
        EventKind::RootNote,
        EventKind::ScaleName,
        EventKind::SelectedTrack,
    ];
}

/// Capability the host exposes to the sync engine
pub trait NotificationSource {
    fn root_note(&self) -> Option<i64>;

    fn scale_name(&self) -> Option<String>;

    fn selected_track(&self) -> Option<TrackHandle>;

    /// Register interest in `kind`. The source sends `kind` on `tx` each
    /// time the corresponding value changes.
    fn subscribe(&mut self, kind: EventKind, tx: Sender<EventKind>);
}

/// Canonical state of the host at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSnapshot {
    pub root: u8,
    pub scale_name: String,
    pub device: Option<DeviceId>,
    pub device_name: Option<String>,
    pub is_drum_rack: bool,
}

impl HostSnapshot {
    pub fn scale(root: u8, scale_name: impl Into<String>, device: Option<DeviceId>) -> Self {
        HostSnapshot {
            root: root % 12,
            scale_name: scale_name.into(),
            device,
            device_name: None,
            is_drum_rack: false,
        }
    }

    pub fn drum_rack(device: DeviceId) -> Self {
        HostSnapshot {
            root: 0,
            scale_name: String::new(),
            device: Some(device),
            device_name: None,
            is_drum_rack: true,
        }
    }
}

/// Read the current host state into a [`HostSnapshot`].
///
/// Missing values collapse to defaults: root 0, empty scale name, no device.
/// Roots outside 0..=11 are folded into that range.
pub fn normalize<S: NotificationSource + ?Sized>(source: &S) -> HostSnapshot {
    let root = source
        .root_note()
        .map(|r| r.rem_euclid(12) as u8)
        .unwrap_or(0);
    let scale_name = source.scale_name().unwrap_or_default();
    let device = source.selected_track().and_then(|t| t.selected_device);

    HostSnapshot {
        root,
        scale_name,
        is_drum_rack: device.as_ref().is_some_and(DeviceHandle::is_drum_rack),
        device_name: device.as_ref().map(|d| d.name.clone()),
        device: device.map(|d| d.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeHost {
        root: Option<i64>,
        scale: Option<String>,
        track: Option<TrackHandle>,
    }

    impl NotificationSource for FakeHost {
        fn root_note(&self) -> Option<i64> {
            self.root
        }

        fn scale_name(&self) -> Option<String> {
            self.scale.clone()
        }

        fn selected_track(&self) -> Option<TrackHandle> {
            self.track.clone()
        }

        fn subscribe(&mut self, _kind: EventKind, _tx: Sender<EventKind>) {}
    }

    #[test]
    fn test_missing_values_use_defaults() {
        let snapshot = normalize(&FakeHost::default());
        assert_eq!(snapshot.root, 0);
        assert_eq!(snapshot.scale_name, "");
        assert_eq!(snapshot.device, None);
        assert!(!snapshot.is_drum_rack);
    }

    #[test]
    fn test_track_without_device() {
        let host = FakeHost {
            root: Some(5),
            scale: Some("Minor".to_string()),
            track: Some(TrackHandle::default()),
        };
        let snapshot = normalize(&host);
        assert_eq!(snapshot.root, 5);
        assert_eq!(snapshot.scale_name, "Minor");
        assert_eq!(snapshot.device, None);
        assert!(!snapshot.is_drum_rack);
    }

    #[test]
    fn test_drum_rack_detection() {
        let mut host = FakeHost {
            track: Some(TrackHandle {
                selected_device: Some(DeviceHandle::drum_rack(7, "Drum Rack")),
            }),
            ..FakeHost::default()
        };
        let snapshot = normalize(&host);
        assert_eq!(snapshot.device, Some(DeviceId(7)));
        assert_eq!(snapshot.device_name.as_deref(), Some("Drum Rack"));
        assert!(snapshot.is_drum_rack);

        // Capability absent or false means a plain instrument
        host.track = Some(TrackHandle {
            selected_device: Some(DeviceHandle::new(8, "Operator")),
        });
        assert!(!normalize(&host).is_drum_rack);

        let mut device = DeviceHandle::new(9, "Simpler");
        device.can_have_drum_pads = Some(false);
        host.track = Some(TrackHandle {
            selected_device: Some(device),
        });
        let snapshot = normalize(&host);
        assert!(!snapshot.is_drum_rack);
        assert_eq!(snapshot.device, Some(DeviceId(9)));
    }

    #[test]
    fn test_out_of_range_root_is_folded() {
        let host = FakeHost {
            root: Some(14),
            ..FakeHost::default()
        };
        assert_eq!(normalize(&host).root, 2);

        let host = FakeHost {
            root: Some(-1),
            ..FakeHost::default()
        };
        assert_eq!(normalize(&host).root, 11);
    }
}
