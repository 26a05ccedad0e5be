use crate::dispatch::MapRefresh;
use crate::settings::MapFeedSettings;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

/// Decoded RGBA8 image ready for upload as a texture.
#[derive(Clone, PartialEq, Eq)]
pub struct MapImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for MapImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl MapImage {
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes).context("decode map image")?;
        let rgba = img.to_rgba8();
        Ok(Self {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        })
    }
}

/// A newly loaded map.
#[derive(Debug, Clone)]
pub struct MapUpdate {
    pub url: String,
    pub name: String,
    pub image: MapImage,
}

/// Where the current map comes from.
pub trait MapSource: Send {
    /// URL of the map currently advertised, if any.
    fn current_map_url(&self) -> Result<Option<String>>;

    fn fetch_image(&self, url: &str) -> Result<MapImage>;
}

static MAP_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<div[^>]*class="[^"]*\bdominant_coal\b[^"]*""#).expect("valid regex")
});
static MAP_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<a[^>]*href="([^"]*missionmapimages[^"]*)""#).expect("valid regex")
});

/// Find the map image link inside the `dominant_coal` block of the status
/// page and resolve it against `base`.
pub fn extract_map_url(html: &str, base: &url::Url) -> Option<String> {
    let block = MAP_BLOCK.find(html)?;
    let link = MAP_LINK.captures(&html[block.end()..])?.get(1)?.as_str();
    base.join(link).ok().map(String::from)
}

/// Last path segment without its extension.
pub fn map_name(url: &str) -> String {
    let file = url
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file.to_string(),
    }
}

/// Scrapes the server status page for the current map and downloads it.
pub struct ScrapedMapSource {
    client: Client,
    page_url: url::Url,
}

impl ScrapedMapSource {
    pub fn new(page_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("map-viewer")
            .build()?;
        let page_url = url::Url::parse(page_url).with_context(|| format!("parse {page_url}"))?;
        Ok(Self { client, page_url })
    }
}

impl MapSource for ScrapedMapSource {
    fn current_map_url(&self) -> Result<Option<String>> {
        let html = self
            .client
            .get(self.page_url.clone())
            .send()
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("fetch {}", self.page_url))?
            .text()
            .context("read status page")?;
        Ok(extract_map_url(&html, &self.page_url))
    }

    fn fetch_image(&self, url: &str) -> Result<MapImage> {
        let bytes = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("fetch {url}"))?
            .bytes()
            .context("read map image")?;
        MapImage::decode(&bytes)
    }
}

enum FeedCommand {
    Refresh,
    Shutdown,
}

/// Cloneable handle that asks the feed worker for an immediate check.
#[derive(Clone)]
pub struct FeedHandle {
    commands: Sender<FeedCommand>,
}

impl MapRefresh for FeedHandle {
    fn request_refresh(&self) {
        if self.commands.send(FeedCommand::Refresh).is_err() {
            tracing::debug!("map feed stopped; refresh ignored");
        }
    }
}

/// Background worker checking for a new map on an interval and on demand.
pub struct MapFeed {
    handle: FeedHandle,
    updates: Receiver<MapUpdate>,
    join: Option<JoinHandle<()>>,
}

impl MapFeed {
    /// Start the worker. `notify` runs after each delivered update so the
    /// UI can wake up.
    pub fn start(
        source: Box<dyn MapSource>,
        interval: Duration,
        notify: impl Fn() + Send + 'static,
    ) -> Self {
        let (cmd_tx, cmd_rx) = channel();
        let (update_tx, update_rx) = channel();
        let join = std::thread::spawn(move || {
            let mut worker = FeedWorker {
                source,
                current_url: None,
            };
            worker.check(false, &update_tx, &notify);
            loop {
                let force = match cmd_rx.recv_timeout(interval) {
                    Ok(FeedCommand::Refresh) => true,
                    Err(RecvTimeoutError::Timeout) => false,
                    Ok(FeedCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                };
                if !worker.check(force, &update_tx, &notify) {
                    break;
                }
            }
            tracing::debug!("map feed stopped");
        });
        Self {
            handle: FeedHandle { commands: cmd_tx },
            updates: update_rx,
            join: Some(join),
        }
    }

    pub fn from_settings(settings: &MapFeedSettings, notify: impl Fn() + Send + 'static) -> Result<Self> {
        let source = ScrapedMapSource::new(&settings.page_url)?;
        Ok(Self::start(
            Box::new(source),
            Duration::from_secs(settings.check_interval_secs.max(1)),
            notify,
        ))
    }

    pub fn handle(&self) -> FeedHandle {
        self.handle.clone()
    }

    /// Latest update delivered since the last call, if any.
    pub fn try_latest(&self) -> Option<MapUpdate> {
        self.updates.try_iter().last()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<MapUpdate> {
        self.updates.recv_timeout(timeout).ok()
    }
}

impl Drop for MapFeed {
    fn drop(&mut self) {
        let _ = self.handle.commands.send(FeedCommand::Shutdown);
        // A fetch in flight can take up to the client timeout; don't block
        // window close on it.
        drop(self.join.take());
    }
}

struct FeedWorker {
    source: Box<dyn MapSource>,
    current_url: Option<String>,
}

impl FeedWorker {
    /// Returns `false` once the receiving side is gone.
    fn check(&mut self, force: bool, updates: &Sender<MapUpdate>, notify: &dyn Fn()) -> bool {
        let url = match self.source.current_map_url() {
            Ok(Some(url)) => url,
            Ok(None) => {
                tracing::warn!("no map link found on status page");
                return true;
            }
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "map lookup failed");
                return true;
            }
        };
        if !force && self.current_url.as_deref() == Some(url.as_str()) {
            return true;
        }

        tracing::info!(%url, force, "loading map");
        match self.source.fetch_image(&url) {
            Ok(image) => {
                tracing::info!(width = image.width, height = image.height, "map loaded");
                self.current_url = Some(url.clone());
                let update = MapUpdate {
                    name: map_name(&url),
                    url,
                    image,
                };
                if updates.send(update).is_err() {
                    return false;
                }
                notify();
            }
            Err(err) => {
                tracing::warn!(%url, error = %format!("{err:#}"), "map download failed; keeping previous map");
            }
        }
        true
    }
}
