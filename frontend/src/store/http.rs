//! Client for the actix backend: JSON over HTTP for reads and writes, and an
//! `EventSource` per subscribed partition for the live feed.
//!
//! The server may forget a store identity (expiry, restart). A `401` on any
//! call triggers one silent sign-in with the same token and a single retry;
//! a feed the browser gave up on is reopened the same way.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use async_trait::async_trait;
use gloo_console::{error, warn};
use gloo_net::http::{Request, Response};
use serde_json::{Map, Value};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventSource, MessageEvent};
use yew::platform::spawn_local;

use common::error::StoreError;
use common::requests::{InsertResponse, SignInRequest};
use common::store::{
    Partition, RecordStore, SnapshotResult, SnapshotSink, StoreIdentity, StoredDocument,
    Subscription,
};

const UNAUTHORIZED: u16 = 401;
/// Consecutive reopen attempts before a feed is left closed.
const MAX_FEED_REOPENS: u32 = 3;

#[derive(Clone)]
pub struct HttpStore {
    base_url: Rc<str>,
    /// Token of the last sign-in, replayed when the identity is rejected.
    token: Rc<RefCell<Option<String>>>,
    identity: Rc<RefCell<Option<StoreIdentity>>>,
}

impl HttpStore {
    /// `base_url` is prepended to every path; empty means same origin.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: Rc::from(base_url.trim_end_matches('/')),
            token: Rc::default(),
            identity: Rc::default(),
        }
    }

    fn partition_url(&self, partition: &Partition) -> String {
        format!("{}/api/{}", self.base_url, partition)
    }

    fn uid(&self) -> Result<String, StoreError> {
        self.identity
            .borrow()
            .as_ref()
            .map(|identity| identity.uid.clone())
            .ok_or_else(|| StoreError::network("sin identidad de acceso al almacén"))
    }

    fn feed_url(&self, partition: &Partition) -> Result<String, StoreError> {
        let uid = String::from(js_sys::encode_uri_component(&self.uid()?));
        Ok(format!("{}/feed?auth={}", self.partition_url(partition), uid))
    }

    /// Signs in again with the token of the previous sign-in.
    async fn reauthorize(&self) -> Result<StoreIdentity, StoreError> {
        let token = self.token.borrow().clone();
        warn!("Store identity rejected, signing in again");
        self.sign_in(token.as_deref()).await
    }

    /// Sends a request carrying the bearer uid. On `401` the identity is
    /// renewed and the request rebuilt and sent once more.
    async fn send_authorized<F>(&self, build: F) -> Result<Response, StoreError>
    where
        F: Fn(&str) -> Result<Request, gloo_net::Error>,
    {
        let response = dispatch(build(&format!("Bearer {}", self.uid()?))).await?;
        if response.status() != UNAUTHORIZED {
            return check(response);
        }
        let identity = self.reauthorize().await?;
        check(dispatch(build(&format!("Bearer {}", identity.uid))).await?)
    }
}

async fn dispatch(request: Result<Request, gloo_net::Error>) -> Result<Response, StoreError> {
    request
        .map_err(|e| StoreError::network(e.to_string()))?
        .send()
        .await
        .map_err(|e| StoreError::network(e.to_string()))
}

fn check(response: Response) -> Result<Response, StoreError> {
    if response.ok() {
        Ok(response)
    } else {
        Err(StoreError::network(format!(
            "HTTP {} {}",
            response.status(),
            response.status_text()
        )))
    }
}

fn decode_snapshot(data: Option<String>) -> SnapshotResult {
    let data = data.ok_or_else(|| StoreError::network("evento sin datos"))?;
    Ok(serde_json::from_str::<Vec<StoredDocument>>(&data)?)
}

/// One live subscription. The `EventSource` and its handlers are swapped
/// out whenever the feed has to be reopened.
struct Feed {
    store: HttpStore,
    partition: Partition,
    sink: SnapshotSink,
    source: Option<EventSource>,
    on_message: Option<Closure<dyn FnMut(MessageEvent)>>,
    on_error: Option<Closure<dyn FnMut(Event)>>,
    reopens: u32,
    cancelled: bool,
}

impl Feed {
    fn close_source(&mut self) {
        if let Some(source) = self.source.take() {
            source.set_onmessage(None);
            source.set_onerror(None);
            source.close();
        }
        self.on_message = None;
        self.on_error = None;
    }
}

/// Opens (or reopens) the `EventSource` of `feed`.
fn open_feed(feed: &Rc<RefCell<Feed>>) {
    let (url, sink) = {
        let inner = feed.borrow();
        (inner.store.feed_url(&inner.partition), inner.sink.clone())
    };
    let url = match url {
        Ok(url) => url,
        Err(e) => return sink(Err(e)),
    };
    let source = match EventSource::new(&url) {
        Ok(source) => source,
        Err(e) => {
            error!("EventSource", e);
            return sink(Err(StoreError::network("no se pudo abrir el feed")));
        }
    };

    let weak = Rc::downgrade(feed);
    let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
        if let Some(feed) = weak.upgrade() {
            let sink = {
                let mut inner = feed.borrow_mut();
                inner.reopens = 0;
                inner.sink.clone()
            };
            sink(decode_snapshot(event.data().as_string()));
        }
    });

    let weak = Rc::downgrade(feed);
    let on_error = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let closed = event
            .target()
            .and_then(|target| target.dyn_into::<EventSource>().ok())
            .is_some_and(|source| source.ready_state() == EventSource::CLOSED);
        if let Some(feed) = weak.upgrade() {
            let sink = feed.borrow().sink.clone();
            sink(Err(StoreError::network("feed interrumpido")));
            // The browser retries dropped connections itself but gives up
            // on a rejected one, typically a forgotten identity.
            if closed {
                reopen_later(Rc::downgrade(&feed));
            }
        }
    });

    source.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
    source.set_onerror(Some(on_error.as_ref().unchecked_ref()));

    let mut inner = feed.borrow_mut();
    inner.close_source();
    inner.source = Some(source);
    inner.on_message = Some(on_message);
    inner.on_error = Some(on_error);
}

/// Renews the identity and reopens the feed outside the error handler, so
/// the handler is never dropped while it runs.
fn reopen_later(feed: Weak<RefCell<Feed>>) {
    spawn_local(async move {
        let Some(strong) = feed.upgrade() else {
            return;
        };
        let store = {
            let mut inner = strong.borrow_mut();
            if inner.cancelled || inner.reopens >= MAX_FEED_REOPENS {
                return;
            }
            inner.reopens += 1;
            inner.store.clone()
        };
        drop(strong);

        let renewed = store.reauthorize().await;
        let Some(strong) = feed.upgrade() else {
            return;
        };
        if strong.borrow().cancelled {
            return;
        }
        match renewed {
            Ok(_) => open_feed(&strong),
            Err(e) => {
                let sink = strong.borrow().sink.clone();
                sink(Err(e));
            }
        }
    });
}

#[async_trait(?Send)]
impl RecordStore for HttpStore {
    async fn sign_in(&self, token: Option<&str>) -> Result<StoreIdentity, StoreError> {
        let body = SignInRequest {
            token: token.map(str::to_string),
        };
        *self.token.borrow_mut() = body.token.clone();
        let request = Request::post(&format!("{}/api/identity/sign_in", self.base_url)).json(&body);
        let identity: StoreIdentity = check(dispatch(request).await?)?
            .json()
            .await
            .map_err(|e| StoreError::network(e.to_string()))?;
        *self.identity.borrow_mut() = Some(identity.clone());
        Ok(identity)
    }

    fn subscribe(&self, partition: &Partition, sink: SnapshotSink) -> Subscription {
        let feed = Rc::new(RefCell::new(Feed {
            store: self.clone(),
            partition: partition.clone(),
            sink,
            source: None,
            on_message: None,
            on_error: None,
            reopens: 0,
            cancelled: false,
        }));
        open_feed(&feed);

        Subscription::new(move || {
            let mut inner = feed.borrow_mut();
            inner.cancelled = true;
            inner.close_source();
        })
    }

    async fn fetch(&self, partition: &Partition) -> Result<Vec<StoredDocument>, StoreError> {
        let url = self.partition_url(partition);
        self.send_authorized(|auth| Request::get(&url).header("Authorization", auth).build())
            .await?
            .json()
            .await
            .map_err(|e| StoreError::network(e.to_string()))
    }

    async fn insert(
        &self,
        partition: &Partition,
        fields: Map<String, Value>,
    ) -> Result<String, StoreError> {
        let url = self.partition_url(partition);
        let inserted: InsertResponse = self
            .send_authorized(|auth| {
                Request::post(&url)
                    .header("Authorization", auth)
                    .json(&fields)
            })
            .await?
            .json()
            .await
            .map_err(|e| StoreError::network(e.to_string()))?;
        Ok(inserted.id)
    }

    async fn update(
        &self,
        partition: &Partition,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let url = format!("{}/{}", self.partition_url(partition), id);
        self.send_authorized(|auth| {
            Request::put(&url)
                .header("Authorization", auth)
                .json(&fields)
        })
        .await
        .map(|_| ())
    }

    async fn delete(&self, partition: &Partition, id: &str) -> Result<(), StoreError> {
        let url = format!("{}/{}", self.partition_url(partition), id);
        self.send_authorized(|auth| Request::delete(&url).header("Authorization", auth).build())
            .await
            .map(|_| ())
    }
}
