// event_loop.rs

use crate::host::{normalize, EventKind, NotificationSource};
use crate::midi_output::FrameSink;
use crate::sync::{SyncAction, SyncEngine};
use crossbeam::channel::{select, unbounded, Receiver, Sender};
use log::{debug, info};

/// Requests from outside the host, e.g. the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Resync,
    Shutdown,
}

/// Runs one sync pass per host notification, on the calling thread.
pub struct EventLoop<H: NotificationSource, S: FrameSink> {
    source: H,
    engine: SyncEngine<S>,
    events: Receiver<EventKind>,
    control_tx: Sender<Control>,
    control_rx: Receiver<Control>,
}

impl<H: NotificationSource, S: FrameSink> EventLoop<H, S> {
    pub fn new(mut source: H, engine: SyncEngine<S>) -> Self {
        let (event_tx, events) = unbounded();
        for kind in EventKind::ALL {
            source.subscribe(kind, event_tx.clone());
        }
        let (control_tx, control_rx) = unbounded();

        EventLoop {
            source,
            engine,
            events,
            control_tx,
            control_rx,
        }
    }

    pub fn control(&self) -> Sender<Control> {
        self.control_tx.clone()
    }

    pub fn engine(&self) -> &SyncEngine<S> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SyncEngine<S> {
        &mut self.engine
    }

    /// Read the host now and sync.
    pub fn sync_now(&mut self) -> SyncAction {
        let snapshot = normalize(&self.source);
        self.engine.sync(&snapshot)
    }

    /// Handle every notification already queued, one pass each.
    pub fn process_pending(&mut self) -> Vec<SyncAction> {
        let pending: Vec<EventKind> = self.events.try_iter().collect();
        pending
            .into_iter()
            .map(|kind| {
                debug!("Host notification: {:?}", kind);
                self.sync_now()
            })
            .collect()
    }

    pub fn run(&mut self) {
        info!("Event loop started, performing initial sync");
        self.sync_now();

        let events = self.events.clone();
        let control = self.control_rx.clone();
        loop {
            select! {
                recv(events) -> msg => match msg {
                    Ok(kind) => {
                        debug!("Host notification: {:?}", kind);
                        self.sync_now();
                    }
                    Err(_) => {
                        info!("Host notification channel closed");
                        break;
                    }
                },
                recv(control) -> msg => match msg {
                    Ok(Control::Resync) => {
                        self.engine.reset();
                        self.sync_now();
                    }
                    Ok(Control::Shutdown) | Err(_) => {
                        self.process_pending();
                        info!("Event loop stopping");
                        break;
                    }
                },
            }
        }
    }
}
