//! Presentation seam.
//!
//! The controller hands every [`JobEvent`] to a [`Presenter`]; rendering is
//! entirely up to the implementation.

use tokio::sync::mpsc;

use vshot_models::JobEvent;

pub trait Presenter: Send {
    fn present(&mut self, event: &JobEvent);
}

/// Collects events in order.
impl Presenter for Vec<JobEvent> {
    fn present(&mut self, event: &JobEvent) {
        self.push(event.clone());
    }
}

/// Forwards events to another task (e.g. a UI loop). A closed receiver is
/// ignored.
impl Presenter for mpsc::UnboundedSender<JobEvent> {
    fn present(&mut self, event: &JobEvent) {
        let _ = self.send(event.clone());
    }
}
