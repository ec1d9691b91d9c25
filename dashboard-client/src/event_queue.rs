//! Results from background tasks, handed back to the thread that owns the
//! document.

use std::sync::{
    mpsc::{channel, Receiver, Sender},
    Mutex,
};

use crate::health::HealthSnapshot;
use crate::monitoring::MonitoringState;
use crate::notifications::Notice;

#[derive(Debug, Clone)]
pub enum UiEvent {
    Health(HealthSnapshot),
    Monitoring(MonitoringState),
    Notify(Notice),
    /// A background failure for the global error handler.
    Error(String),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<UiEvent>,
}

impl EventSender {
    /// `false` once the queue has been dropped.
    pub fn send(&self, event: UiEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

#[derive(Debug)]
pub struct EventQueue {
    tx: Sender<UiEvent>,
    rx: Mutex<Receiver<UiEvent>>,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub fn new() -> Self {
        let (tx, rx) = channel::<UiEvent>();
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    /// Everything queued so far, oldest first.
    pub fn drain(&self) -> Vec<UiEvent> {
        match self.rx.lock() {
            Ok(rx) => rx.try_iter().collect(),
            Err(poisoned) => poisoned.into_inner().try_iter().collect(),
        }
    }
}
