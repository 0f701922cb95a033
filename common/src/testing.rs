//! Test doubles for the controller.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;

use crate::confirm::Confirmation;
use crate::controller::{AdminController, EventSink};
use crate::notify::{Notification, Notifier};
use crate::store::RecordStore;
use crate::sync::SnapshotEvent;

#[derive(Clone, Default)]
pub struct NotificationLog {
    entries: Rc<RefCell<Vec<Notification>>>,
}

impl NotificationLog {
    pub fn messages(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }

    pub fn last(&self) -> Option<Notification> {
        self.entries.borrow().last().cloned()
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: Notification) {
        self.entries.borrow_mut().push(notification);
    }
}

/// Answers every prompt with a fixed choice and remembers the prompts.
pub struct ScriptedConfirmation {
    answer: bool,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedConfirmation {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Confirmation for ScriptedConfirmation {
    async fn confirm(&self, prompt: &str) -> bool {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.answer
    }
}

/// Queues snapshot events the way a UI message loop would.
#[derive(Clone, Default)]
pub struct Inbox {
    events: Rc<RefCell<VecDeque<SnapshotEvent>>>,
}

impl Inbox {
    pub fn sink(&self) -> EventSink {
        let events = self.events.clone();
        Rc::new(move |event: SnapshotEvent| events.borrow_mut().push_back(event))
    }

    /// Applies every queued event; returns how many changed the controller.
    pub fn pump<S, N>(&self, controller: &mut AdminController<S, N>) -> usize
    where
        S: RecordStore,
        N: Notifier + Clone + 'static,
    {
        let mut applied = 0;
        loop {
            let next = self.events.borrow_mut().pop_front();
            match next {
                Some(event) => {
                    if controller.apply_snapshot(event) {
                        applied += 1;
                    }
                }
                None => return applied,
            }
        }
    }
}
