//! Main EmojiDataClient

use std::future::Future;
use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::ApiError;
use crate::error::Error;
use crate::locale;
use crate::model::EmojiData;
use crate::model::emojibase;
use crate::storage::InMemoryStorage;
use crate::storage::SESSION_METADATA_KEY;
use crate::storage::Storage;
use crate::storage::local_data_key;
use crate::support::AssumeSupported;
use crate::support::RenderProbe;
use crate::support::SessionMetadata;
use crate::transport::HttpResponse;
use crate::transport::ReqwestTransport;
use crate::transport::Transport;

/// Default Emojibase mirror.
pub const DEFAULT_BASE_URL: &str = "https://cdn.jsdelivr.net/npm/emojibase-data";

const DATA_FILE: &str = "data.json";
const MESSAGES_FILE: &str = "messages.json";

/// Cache validators of the two resources a snapshot was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// `ETag` of `data.json`.
    pub emojis_etag: Option<String>,
    /// `ETag` of `messages.json`.
    pub messages_etag: Option<String>,
    /// When the snapshot was fetched.
    pub cached_at: DateTime<Utc>,
}

/// Durable per-locale cache entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalEntry {
    /// The unfiltered snapshot.
    pub data: EmojiData,
    /// Validators for revalidation.
    pub metadata: CacheMetadata,
}

impl LocalEntry {
    fn is_valid_for(&self, locale: &str) -> bool {
        self.data.locale == locale && !self.data.emojis.is_empty() && !self.data.categories.is_empty()
    }
}

/// Client that loads, caches and filters Emojibase data.
///
/// This client is cheap to clone (uses `Arc` internally).
///
/// # Example
///
/// ```ignore
/// use emoji_lib::EmojiDataClient;
/// use tokio_util::sync::CancellationToken;
///
/// let client = EmojiDataClient::builder()
///     .local_storage(SqliteStorage::open("emoji.db").await?)
///     .build()?;
///
/// let data = client.get_emoji_data("en", None, &CancellationToken::new()).await?;
/// ```
#[derive(Clone)]
pub struct EmojiDataClient {
    inner: Arc<EmojiDataClientInner>,
}

struct EmojiDataClientInner {
    base_url: Url,
    transport: Arc<dyn Transport>,
    local: Storage,
    session: Storage,
    probe: Arc<dyn RenderProbe>,
}

impl std::fmt::Debug for EmojiDataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmojiDataClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl EmojiDataClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> EmojiDataClientBuilder {
        EmojiDataClientBuilder::new()
    }

    /// Returns the base URL resources are fetched from.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Returns the durable storage holding per-locale snapshots.
    pub fn local_storage(&self) -> &Storage {
        &self.inner.local
    }

    /// Returns the process-scoped storage holding the support marker.
    pub fn session_storage(&self) -> &Storage {
        &self.inner.session
    }

    /// Loads emoji data for a locale.
    ///
    /// Unsupported locales fall back to `en`. Cached snapshots are trusted
    /// outright once the session marker exists, revalidated with `HEAD`
    /// requests otherwise, and refetched when their validators changed. The
    /// result only keeps emojis up to `min(environment version, max_version)`
    /// and drops country flags when the environment can't render them.
    ///
    /// Returns [`Error::Cancelled`] as soon as `cancel` fires.
    pub async fn get_emoji_data(
        &self,
        locale: &str,
        max_version: Option<f64>,
        cancel: &CancellationToken,
    ) -> Result<EmojiData, Error> {
        let locale = locale::resolve(locale);
        let local_key = local_data_key(locale);

        let session: Option<SessionMetadata> = cancellable(
            cancel,
            self.inner
                .session
                .get(SESSION_METADATA_KEY, SessionMetadata::is_valid),
        )
        .await?;
        let cached: Option<LocalEntry> = cancellable(
            cancel,
            self.inner.local.get(&local_key, |entry: &LocalEntry| entry.is_valid_for(locale)),
        )
        .await?;

        let data = match (cached, session.is_some()) {
            (None, _) => {
                log::debug!("[emoji-data] no cached data for {locale}, fetching");
                self.fetch_and_store(locale, &local_key, cancel).await?
            }
            (Some(entry), true) => {
                log::debug!("[emoji-data] using cached data for {locale}");
                entry.data
            }
            (Some(entry), false) => self.revalidate(locale, &local_key, entry, cancel).await?,
        };

        let session = match session {
            Some(session) => session,
            None => {
                let detected = SessionMetadata::detect(self.inner.probe.as_ref());
                log::debug!(
                    "[emoji-data] environment supports emoji {} (country flags: {})",
                    detected.emoji_version,
                    detected.country_flags
                );
                let write = self.inner.session.set(SESSION_METADATA_KEY, &detected);
                if let Err(e) = cancellable(cancel, write).await? {
                    log::warn!("[emoji-data] failed to store session marker: {e}");
                }
                detected
            }
        };

        let max_version = match max_version {
            Some(max) => session.emoji_version.min(max),
            None => session.emoji_version,
        };

        Ok(data.filter_supported(max_version, session.country_flags))
    }

    /// Compares cached validators with the remote ones.
    ///
    /// Network failures keep the stale snapshot; changed or missing
    /// validators trigger a full refetch.
    async fn revalidate(
        &self,
        locale: &str,
        local_key: &str,
        entry: LocalEntry,
        cancel: &CancellationToken,
    ) -> Result<EmojiData, Error> {
        let (data_url, messages_url) = self.resource_urls(locale)?;
        let probes = futures::future::join(
            self.inner.transport.head(&data_url),
            self.inner.transport.head(&messages_url),
        );

        let (emojis, messages) = match cancellable(cancel, probes).await? {
            (Ok(emojis), Ok(messages)) => (emojis, messages),
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("[emoji-data] revalidation failed for {locale}, using cached data: {e}");
                return Ok(entry.data);
            }
        };

        let unchanged = emojis.is_success()
            && messages.is_success()
            && emojis.etag.is_some()
            && messages.etag.is_some()
            && emojis.etag == entry.metadata.emojis_etag
            && messages.etag == entry.metadata.messages_etag;

        if unchanged {
            log::debug!("[emoji-data] cached data for {locale} is up to date");
            return Ok(entry.data);
        }

        log::debug!("[emoji-data] cached data for {locale} is outdated, refetching");
        match self.fetch_and_store(locale, local_key, cancel).await {
            Ok(data) => Ok(data),
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(e) => {
                log::warn!("[emoji-data] refetch failed for {locale}, using cached data: {e}");
                Ok(entry.data)
            }
        }
    }

    /// Fetches both resources in parallel, merges them and caches the result.
    async fn fetch_and_store(
        &self,
        locale: &str,
        local_key: &str,
        cancel: &CancellationToken,
    ) -> Result<EmojiData, Error> {
        let (data_url, messages_url) = self.resource_urls(locale)?;
        let fetches = futures::future::try_join(
            self.fetch_json::<Vec<emojibase::RawEmoji>>(&data_url),
            self.fetch_json::<emojibase::RawMessages>(&messages_url),
        );
        let ((emojis, emojis_etag), (messages, messages_etag)) = cancellable(cancel, fetches).await??;

        let data = emojibase::normalize(locale, emojis, messages);
        log::debug!(
            "[emoji-data] fetched {} emojis for {locale} ({:?} per category)",
            data.emojis.len(),
            emojibase::category_histogram(&data)
        );

        let entry = LocalEntry {
            data,
            metadata: CacheMetadata {
                emojis_etag,
                messages_etag,
                cached_at: Utc::now(),
            },
        };

        if let Err(e) = cancellable(cancel, self.inner.local.set(local_key, &entry)).await? {
            log::warn!("[emoji-data] failed to cache data for {locale}: {e}");
        }

        Ok(entry.data)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &Url) -> Result<(T, Option<String>), ApiError> {
        let response = self.inner.transport.get(url).await?;
        if !response.is_success() {
            let message = String::from_utf8_lossy(&response.body).into_owned();
            return Err(ApiError::http(response.status, message));
        }
        let HttpResponse { etag, body, .. } = response;

        let value = serde_json::from_slice(&body).map_err(|e| {
            ApiError::parse_with_body(format!("{url}: {e}"), String::from_utf8_lossy(&body))
        })?;

        Ok((value, etag))
    }

    fn resource_urls(&self, locale: &str) -> Result<(Url, Url), ApiError> {
        Ok((
            self.resource_url(locale, DATA_FILE)?,
            self.resource_url(locale, MESSAGES_FILE)?,
        ))
    }

    fn resource_url(&self, locale: &str, file: &str) -> Result<Url, ApiError> {
        let raw = format!(
            "{}/{}/{}",
            self.inner.base_url.as_str().trim_end_matches('/'),
            locale,
            file
        );
        Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))
    }
}

/// Awaits `future` unless `cancel` fires first.
async fn cancellable<F: Future>(cancel: &CancellationToken, future: F) -> Result<F::Output, Error> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        output = future => Ok(output),
    }
}

/// Builder for constructing an [`EmojiDataClient`].
///
/// Every field has a default: the public Emojibase mirror, a `reqwest`
/// transport, in-memory storages and a probe that assumes every emoji
/// renders.
///
/// # Example
///
/// ```ignore
/// let client = EmojiDataClient::builder()
///     .base_url("https://example.com/emojibase-data")
///     .local_storage(SqliteStorage::open("emoji.db").await?)
///     .render_probe(FixedSupport { emoji_version: 15.0, country_flags: false })
///     .build()?;
/// ```
pub struct EmojiDataClientBuilder {
    base_url: String,
    transport: Option<Arc<dyn Transport>>,
    local: Option<Storage>,
    session: Option<Storage>,
    probe: Arc<dyn RenderProbe>,
}

impl Default for EmojiDataClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EmojiDataClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            transport: None,
            local: None,
            session: None,
            probe: Arc::new(AssumeSupported),
        }
    }

    /// Sets the base URL resources are fetched from.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the transport.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Sets a shared transport.
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the durable storage for per-locale snapshots.
    pub fn local_storage(mut self, storage: impl Into<Storage>) -> Self {
        self.local = Some(storage.into());
        self
    }

    /// Sets the process-scoped storage for the support marker.
    pub fn session_storage(mut self, storage: impl Into<Storage>) -> Self {
        self.session = Some(storage.into());
        self
    }

    /// Sets the render probe used to detect environment support.
    pub fn render_probe(mut self, probe: impl RenderProbe + 'static) -> Self {
        self.probe = Arc::new(probe);
        self
    }

    /// Builds the [`EmojiDataClient`].
    pub fn build(self) -> Result<EmojiDataClient, ApiError> {
        let base_url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", self.base_url)))?;

        Ok(EmojiDataClient {
            inner: Arc::new(EmojiDataClientInner {
                base_url,
                transport: self
                    .transport
                    .unwrap_or_else(|| Arc::new(ReqwestTransport::new())),
                local: self.local.unwrap_or_else(|| Storage::new(InMemoryStorage::new())),
                session: self.session.unwrap_or_else(|| Storage::new(InMemoryStorage::new())),
                probe: self.probe,
            }),
        })
    }
}
