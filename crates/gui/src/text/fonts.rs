//! Asynchronous font library.
//!
//! Fonts are fetched on the tokio runtime (HTTP for `http(s)://` references,
//! the local file system otherwise) and handed back to the UI thread through
//! a channel. Lookups never block: a miss starts a load and reports
//! `Pending` until `poll` ingests the result.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use super::{FontError, FontStatus, GlyphSource, Typeface};

/// A font offered in the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontChoice {
    pub label: &'static str,
    pub url: &'static str,
}

/// Fonts offered to the user
pub const FONT_CHOICES: &[FontChoice] = &[
    FontChoice {
        label: "Helvetiker",
        url: "https://threejs.org/examples/fonts/helvetiker_regular.typeface.json",
    },
    FontChoice {
        label: "Helvetiker Bold",
        url: "https://threejs.org/examples/fonts/helvetiker_bold.typeface.json",
    },
    FontChoice {
        label: "Optimer",
        url: "https://threejs.org/examples/fonts/optimer_regular.typeface.json",
    },
    FontChoice {
        label: "Optimer Bold",
        url: "https://threejs.org/examples/fonts/optimer_bold.typeface.json",
    },
    FontChoice {
        label: "Gentilis",
        url: "https://threejs.org/examples/fonts/gentilis_regular.typeface.json",
    },
    FontChoice {
        label: "Droid Sans",
        url: "https://threejs.org/examples/fonts/droid/droid_sans_regular.typeface.json",
    },
];

/// Display label for a font reference (the reference itself if it is custom)
pub fn font_label(reference: &str) -> &str {
    FONT_CHOICES
        .iter()
        .find(|c| c.url == reference)
        .map(|c| c.label)
        .unwrap_or(reference)
}

/// Delay before a failed font is fetched again on its own
pub const FONT_RETRY_BACKOFF: Duration = Duration::from_secs(10);

enum FontSlot {
    Loading,
    Ready(Arc<Typeface>),
    Failed { error: String, at: Instant },
}

type LoadResult = (String, Result<Typeface, FontError>);

/// Cache of fonts keyed by reference, loaded in the background
pub struct FontLibrary {
    runtime: Handle,
    http: reqwest::Client,
    slots: Mutex<HashMap<String, FontSlot>>,
    tx: mpsc::UnboundedSender<LoadResult>,
    rx: mpsc::UnboundedReceiver<LoadResult>,
    revision: u64,
    retry_backoff: Duration,
}

impl FontLibrary {
    pub fn new(runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            runtime,
            http: reqwest::Client::new(),
            slots: Mutex::new(HashMap::new()),
            tx,
            rx,
            revision: 0,
            retry_backoff: FONT_RETRY_BACKOFF,
        }
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Start loading `reference` unless it is loaded or already in flight.
    /// A previously failed font is fetched again.
    pub fn request(&self, reference: &str) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        match slots.get(reference) {
            Some(FontSlot::Loading | FontSlot::Ready(_)) => return,
            Some(FontSlot::Failed { .. }) => tracing::info!("retrying font {reference}"),
            None => tracing::info!("loading font {reference}"),
        }
        slots.insert(reference.to_string(), FontSlot::Loading);
        drop(slots);

        let http = self.http.clone();
        let tx = self.tx.clone();
        let reference = reference.to_string();
        self.runtime.spawn(async move {
            let result = load_typeface(&http, &reference).await;
            // Receiver gone means the app is shutting down
            let _ = tx.send((reference, result));
        });
    }

    /// Refetch `reference` when its last load failed longer than the backoff ago.
    pub fn retry_if_due(&self, reference: &str) -> bool {
        let due = matches!(
            self.slots.lock().unwrap_or_else(|e| e.into_inner()).get(reference),
            Some(FontSlot::Failed { at, .. }) if at.elapsed() >= self.retry_backoff
        );
        if due {
            self.request(reference);
        }
        due
    }

    /// Ingest finished loads. Returns the number of fonts that resolved.
    pub fn poll(&mut self) -> usize {
        let mut resolved = 0;
        while let Ok((reference, result)) = self.rx.try_recv() {
            let slot = match result {
                Ok(tf) => {
                    tracing::info!(
                        "font {reference} ready ({}, {} glyphs)",
                        tf.family,
                        tf.glyph_count()
                    );
                    FontSlot::Ready(Arc::new(tf))
                }
                Err(e) => {
                    tracing::warn!("font {reference} failed: {e}");
                    FontSlot::Failed {
                        error: e.to_string(),
                        at: Instant::now(),
                    }
                }
            };
            self.slots
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .insert(reference, slot);
            resolved += 1;
        }
        if resolved > 0 {
            self.revision += 1;
        }
        resolved
    }

    /// Bumped whenever a font resolves; cached geometry built before is stale.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Any load still outstanding
    pub fn is_loading(&self) -> bool {
        self.slots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .any(|s| matches!(s, FontSlot::Loading))
    }

    /// Loaded typeface for `reference`, without starting a load
    pub fn typeface(&self, reference: &str) -> Option<Arc<Typeface>> {
        match self.slots.lock().unwrap_or_else(|e| e.into_inner()).get(reference) {
            Some(FontSlot::Ready(tf)) => Some(Arc::clone(tf)),
            _ => None,
        }
    }

    /// Register an already parsed font
    pub fn insert(&mut self, reference: impl Into<String>, typeface: Typeface) {
        self.slots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(reference.into(), FontSlot::Ready(Arc::new(typeface)));
        self.revision += 1;
    }

    /// Load a font on the calling thread (headless export).
    ///
    /// Must not be called from within the runtime's own worker threads.
    pub fn load_blocking(&mut self, reference: &str) -> Result<(), FontError> {
        let typeface = self
            .runtime
            .block_on(load_typeface(&self.http, reference))?;
        self.insert(reference, typeface);
        Ok(())
    }
}

impl GlyphSource for FontLibrary {
    fn font_status(&self, reference: &str) -> FontStatus {
        let status = match self
            .slots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(reference)
        {
            Some(FontSlot::Ready(tf)) => return FontStatus::Ready(Arc::clone(tf)),
            Some(FontSlot::Failed { error, at }) if at.elapsed() < self.retry_backoff => {
                return FontStatus::Failed(error.clone())
            }
            Some(FontSlot::Failed { .. }) => FontStatus::Pending,
            Some(FontSlot::Loading) => FontStatus::Pending,
            None => FontStatus::Pending,
        };
        self.request(reference);
        status
    }
}

/// Fetch and parse a typeface JSON file.
pub async fn load_typeface(http: &reqwest::Client, reference: &str) -> Result<Typeface, FontError> {
    let json = if reference.starts_with("http://") || reference.starts_with("https://") {
        http.get(reference)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?
    } else {
        tokio::fs::read_to_string(reference).await?
    };
    Typeface::from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::block_typeface_json;
    use std::io::Write;

    fn wait_for(lib: &mut FontLibrary) {
        for _ in 0..200 {
            if lib.poll() > 0 {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("font load never completed");
    }

    #[test]
    fn loads_font_from_disk_after_pending() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(block_typeface_json().as_bytes()).unwrap();
        let path = file.path().to_string_lossy().to_string();

        let mut lib = FontLibrary::new(rt.handle().clone());
        assert!(matches!(lib.font_status(&path), FontStatus::Pending));
        assert!(lib.is_loading());
        let rev = lib.revision();

        wait_for(&mut lib);
        assert!(lib.revision() > rev);
        assert!(matches!(lib.font_status(&path), FontStatus::Ready(_)));
        assert!(!lib.is_loading());
    }

    #[test]
    fn missing_file_fails_soft() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut lib = FontLibrary::new(rt.handle().clone());
        let path = "/definitely/not/here.typeface.json";
        lib.request(path);
        wait_for(&mut lib);
        assert!(matches!(lib.font_status(path), FontStatus::Failed(_)));
    }

    #[test]
    fn failed_font_loads_once_selected_again() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.typeface.json");
        let path = path.to_string_lossy().to_string();

        let mut lib = FontLibrary::new(rt.handle().clone());
        lib.request(&path);
        wait_for(&mut lib);
        assert!(matches!(lib.font_status(&path), FontStatus::Failed(_)));
        // still inside the backoff window: no refetch
        assert!(!lib.is_loading());

        std::fs::write(&path, block_typeface_json()).unwrap();
        lib.request(&path);
        assert!(lib.is_loading());
        wait_for(&mut lib);
        assert!(matches!(lib.font_status(&path), FontStatus::Ready(_)));
    }

    #[test]
    fn failed_font_is_refetched_after_backoff() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.typeface.json");
        let path = path.to_string_lossy().to_string();

        let mut lib =
            FontLibrary::new(rt.handle().clone()).with_retry_backoff(Duration::from_millis(200));
        assert!(matches!(lib.font_status(&path), FontStatus::Pending));
        wait_for(&mut lib);
        assert!(matches!(lib.font_status(&path), FontStatus::Failed(_)));

        std::fs::write(&path, block_typeface_json()).unwrap();
        assert!(!lib.retry_if_due(&path));
        std::thread::sleep(Duration::from_millis(250));
        assert!(lib.retry_if_due(&path));
        assert!(matches!(lib.font_status(&path), FontStatus::Pending));
        wait_for(&mut lib);
        assert!(matches!(lib.font_status(&path), FontStatus::Ready(_)));
    }

    #[test]
    fn repeated_requests_do_not_duplicate_loads() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(block_typeface_json().as_bytes()).unwrap();
        let path = file.path().to_string_lossy().to_string();

        let mut lib = FontLibrary::new(rt.handle().clone());
        lib.request(&path);
        lib.request(&path);
        let _ = lib.font_status(&path);
        wait_for(&mut lib);
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(lib.poll(), 0);
    }

    #[test]
    fn load_blocking_registers_font() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(block_typeface_json().as_bytes()).unwrap();
        let path = file.path().to_string_lossy().to_string();

        let mut lib = FontLibrary::new(rt.handle().clone());
        assert!(lib.typeface(&path).is_none());
        lib.load_blocking(&path).unwrap();
        assert!(matches!(lib.font_status(&path), FontStatus::Ready(_)));
        assert_eq!(lib.typeface(&path).unwrap().family, "Block");
    }

    #[test]
    fn labels_for_known_and_custom_fonts() {
        assert_eq!(font_label(FONT_CHOICES[0].url), "Helvetiker");
        assert_eq!(font_label("/tmp/custom.json"), "/tmp/custom.json");
    }
}
