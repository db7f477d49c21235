#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use believe_notify_lib::api::ReservationSource;
use believe_notify_lib::models::Reservation;
use believe_notify_lib::notifications::{NotificationEmitter, NotificationStore};
use believe_notify_lib::storage::MemoryStorage;
use believe_notify_lib::watcher::{EmailMemory, PollTiming, WatcherController};

pub enum Step {
    Ok(Vec<Reservation>),
    Fail(&'static str),
}

/// Plays back a fixed list of responses, then keeps repeating the last
/// successful one.
#[derive(Default)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<Step>>,
    last: Mutex<Vec<Reservation>>,
    emails: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(steps.into()),
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn emails(&self) -> Vec<String> {
        self.emails.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReservationSource for ScriptedSource {
    async fn reservations_by_email(&self, email: &str) -> Result<Vec<Reservation>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.emails.lock().unwrap().push(email.to_string());

        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Step::Ok(list)) => {
                *self.last.lock().unwrap() = list.clone();
                Ok(list)
            }
            Some(Step::Fail(reason)) => Err(anyhow!(reason)),
            None => Ok(self.last.lock().unwrap().clone()),
        }
    }
}

/// Never answers.
#[derive(Default)]
pub struct HangingSource {
    pub calls: AtomicUsize,
}

#[async_trait]
impl ReservationSource for HangingSource {
    async fn reservations_by_email(&self, _email: &str) -> Result<Vec<Reservation>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}

pub fn reservation(id: &str, status: &str) -> Reservation {
    Reservation {
        id: Some(id.into()),
        email: "client@example.com".into(),
        date: "2024-08-01".into(),
        time: "10:00".into(),
        status: Some(status.into()),
        ..Reservation::default()
    }
}

pub struct Harness {
    pub storage: Arc<MemoryStorage>,
    pub store: Arc<NotificationStore>,
    pub emails: EmailMemory,
    pub controller: WatcherController,
}

pub fn harness(source: Arc<dyn ReservationSource>) -> Harness {
    let storage = Arc::new(MemoryStorage::new());
    let store = Arc::new(NotificationStore::new(storage.clone()));
    let emails = EmailMemory::new(storage.clone());
    let controller = WatcherController::new(
        source,
        NotificationEmitter::new(store.clone()),
        emails.clone(),
        PollTiming::default(),
    );
    Harness {
        storage,
        store,
        emails,
        controller,
    }
}
