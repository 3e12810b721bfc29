//! List/form controller shared by the book, librarian, member and student screens.

use std::future::Future;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::{ApiClient, Resource};

use super::Notice;

/// Buffer size for the per-screen result channel.
/// A screen rarely has more than a couple of requests in flight.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Results sent from request tasks back to the screen.
enum ScreenEvent<R: Resource> {
    /// Fresh copy of the collection
    Loaded(Vec<R::Record>),
    /// A create (`None`) or update (`Some(id)`) was accepted
    Saved(Option<i64>),
    /// A record was deleted on the server
    Deleted(i64),
    /// Something went wrong; already phrased for the user
    Failed(Notice),
    /// The task that sent the preceding events has ended
    Finished,
}

/// State of one CRUD screen.
///
/// Each user action spawns a task. Results are applied by `poll` or
/// `settle`. After `unmount` any result still arriving is dropped.
pub struct ResourceScreen<R: Resource> {
    api: ApiClient,
    records: Vec<R::Record>,
    notices: Vec<Notice>,
    loading: bool,
    in_flight: usize,
    tx: mpsc::Sender<ScreenEvent<R>>,
    rx: Option<mpsc::Receiver<ScreenEvent<R>>>,
}

impl<R: Resource> ResourceScreen<R> {
    pub fn new(api: ApiClient) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        Self {
            api,
            records: Vec::new(),
            notices: Vec::new(),
            loading: false,
            in_flight: 0,
            tx,
            rx: Some(rx),
        }
    }

    /// Create the screen and start loading the collection
    pub fn mount(api: ApiClient) -> Self {
        let mut screen = Self::new(api);
        screen.refresh();
        screen
    }

    pub fn records(&self) -> &[R::Record] {
        &self.records
    }

    pub fn find(&self, id: i64) -> Option<&R::Record> {
        self.records.iter().find(|r| R::record_id(r) == id)
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Remove and return all pending notices
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_mounted(&self) -> bool {
        self.rx.is_some()
    }

    /// Stop receiving results. Requests already sent are not cancelled.
    pub fn unmount(&mut self) {
        if self.rx.take().is_some() {
            debug!(resource = R::LABEL, in_flight = self.in_flight, "Screen unmounted");
        }
        self.in_flight = 0;
        self.loading = false;
    }

    // ===== Actions =====

    /// Reload the collection from the server
    pub fn refresh(&mut self) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        if self.spawn(async move {
            Self::load(&api, &tx).await;
        }) {
            self.loading = true;
        }
    }

    /// Create (`id == None`) or update a record, then reload the collection
    /// once the server has answered.
    pub fn save(&mut self, id: Option<i64>, form: R::Form) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.spawn(async move {
            let result = match id {
                Some(id) => api.update::<R>(id, &form).await,
                None => api.create::<R>(&form).await,
            };

            match result {
                Ok(_) => {
                    Self::send(&tx, ScreenEvent::Saved(id)).await;
                    Self::load(&api, &tx).await;
                }
                Err(e) => {
                    warn!(resource = R::LABEL, ?id, error = %e, "Save failed");
                    let notice = Notice::failure(format!("Failed to save {}", Self::noun()), &e);
                    Self::send(&tx, ScreenEvent::Failed(notice)).await;
                }
            }
        });
    }

    /// Delete a record; on success it is removed from the local list
    pub fn delete(&mut self, id: i64) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.spawn(async move {
            match api.delete::<R>(id).await {
                Ok(()) => Self::send(&tx, ScreenEvent::Deleted(id)).await,
                Err(e) => {
                    warn!(resource = R::LABEL, id, error = %e, "Delete failed");
                    let notice = Notice::failure(format!("Failed to delete {}", Self::noun()), &e);
                    Self::send(&tx, ScreenEvent::Failed(notice)).await;
                }
            }
        });
    }

    // ===== Result handling =====

    /// Apply every result that has already arrived. Returns how many were applied.
    pub fn poll(&mut self) -> usize {
        // Collect first to avoid borrowing the receiver while applying
        let events: Vec<ScreenEvent<R>> = match self.rx.as_mut() {
            Some(rx) => {
                let mut events = Vec::new();
                while let Ok(event) = rx.try_recv() {
                    events.push(event);
                }
                events
            }
            None => Vec::new(),
        };

        let count = events.len();
        for event in events {
            self.apply(event);
        }
        count
    }

    /// Wait until every action started so far has finished and been applied.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            let Some(rx) = self.rx.as_mut() else {
                return;
            };
            match rx.recv().await {
                Some(event) => self.apply(event),
                None => return,
            }
        }
    }

    fn apply(&mut self, event: ScreenEvent<R>) {
        match event {
            ScreenEvent::Loaded(records) => {
                debug!(resource = R::LABEL, count = records.len(), "Records loaded");
                self.records = records;
                self.loading = false;
            }
            ScreenEvent::Saved(id) => {
                let message = if id.is_some() {
                    R::updated_message()
                } else {
                    R::created_message()
                };
                self.notices.push(Notice::success(message));
            }
            ScreenEvent::Deleted(id) => {
                self.records.retain(|r| R::record_id(r) != id);
                self.notices.push(Notice::success(R::deleted_message()));
            }
            ScreenEvent::Failed(notice) => {
                self.notices.push(notice);
            }
            ScreenEvent::Finished => {
                self.in_flight = self.in_flight.saturating_sub(1);
                if self.in_flight == 0 {
                    self.loading = false;
                }
            }
        }
    }

    /// Run `task` in the background. Returns false if the screen is unmounted.
    fn spawn(&mut self, task: impl Future<Output = ()> + Send + 'static) -> bool {
        if !self.is_mounted() {
            debug!(resource = R::LABEL, "Ignoring action on unmounted screen");
            return false;
        }
        self.in_flight += 1;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            task.await;
            Self::send(&tx, ScreenEvent::Finished).await;
        });
        true
    }

    async fn load(api: &ApiClient, tx: &mpsc::Sender<ScreenEvent<R>>) {
        match api.list::<R>().await {
            Ok(records) => Self::send(tx, ScreenEvent::Loaded(records)).await,
            Err(e) => {
                warn!(resource = R::LABEL, error = %e, "Load failed");
                let notice =
                    Notice::failure(format!("Failed to load {} details", Self::noun()), &e);
                Self::send(tx, ScreenEvent::Failed(notice)).await;
            }
        }
    }

    /// Helper to send results; a closed channel means the screen is gone
    async fn send(tx: &mpsc::Sender<ScreenEvent<R>>, event: ScreenEvent<R>) {
        if tx.send(event).await.is_err() {
            debug!(resource = R::LABEL, "Screen unmounted, discarding result");
        }
    }

    fn noun() -> String {
        R::LABEL.to_lowercase()
    }
}
