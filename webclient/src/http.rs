use std::{sync::Arc, time::Duration};

use ::tokio::sync::Mutex;
use ::tokio::time::{Interval, MissedTickBehavior};
use serde::Serialize;

pub use ::reqwest::{IntoUrl, Request, Response, StatusCode};
pub type UrlGlob = ::glob::Pattern;

use crate::error::{Error, Result};

/// Thin wrapper of `reqwest::Client`.
/// Requests to URLs matching a registered glob are spaced by at least the registered interval.
#[derive(Clone)]
pub struct Client {
    inner: ::reqwest::Client,
    req_intervals: Arc<Vec<(UrlGlob, Mutex<Interval>)>>,
    timeout: Duration,
}

pub struct RequestBuilder {
    inner: ::reqwest::RequestBuilder,
    client: Client,
}

macro_rules! emit_request_fn {
    ($method:ident) => {
        pub fn $method(&self, u: impl IntoUrl) -> RequestBuilder {
            RequestBuilder::new(self.inner.$method(u), self.clone())
        }
    };
}

impl Client {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Must be called inside a tokio runtime when any non-zero interval is given.
    pub fn new(
        timeout: Duration,
        url_wise_req_interval: impl IntoIterator<Item = (UrlGlob, Duration)>,
    ) -> Result<Self> {
        let req_intervals = url_wise_req_interval
            .into_iter()
            .filter(|(_, dur)| !dur.is_zero())
            .map(|(pat, dur)| {
                let mut interval = ::tokio::time::interval(dur);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                (pat, Mutex::new(interval))
            })
            .collect();
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()?;
        Ok(Self {
            inner,
            req_intervals: Arc::new(req_intervals),
            timeout,
        })
    }

    /// Glob matching exactly the given URL and anything below it.
    pub fn url_prefix_glob(url: &str) -> UrlGlob {
        let pat = format!("{}*", UrlGlob::escape(url));
        UrlGlob::new(&pat).expect("escaped glob must be valid")
    }

    emit_request_fn!(get);
    emit_request_fn!(post);

    async fn execute_request(&self, req: Request) -> Result<Response> {
        let url_str = req.url().as_str();
        if let Some(interval) = self
            .req_intervals
            .iter()
            .find(|(pat, _)| pat.matches(url_str))
            .map(|(_, interval)| interval)
        {
            interval.lock().await.tick().await;
        }

        log::debug!("{} {}", req.method(), req.url());
        self.inner.execute(req).await.map_err(|e| {
            if e.is_timeout() {
                Error::TimedOut(self.timeout)
            } else {
                Error::Http(e)
            }
        })
    }
}

impl RequestBuilder {
    fn new(b: ::reqwest::RequestBuilder, client: Client) -> Self {
        Self { inner: b, client }
    }

    pub async fn send(self) -> Result<Response> {
        let req = self.inner.build()?;
        self.client.execute_request(req).await
    }

    pub fn json<T: Serialize + ?Sized>(mut self, json: &T) -> Self {
        self.inner = self.inner.json(json);
        self
    }

    pub fn query<T: Serialize + ?Sized>(mut self, query: &T) -> Self {
        self.inner = self.inner.query(query);
        self
    }
}
