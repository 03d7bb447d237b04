use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc, OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
};
use ts_rs::TS;
use utoipa::ToSchema;

/// ViewDescriptor
///
/// What the rendering host needs to mount a screen: the component name and, for views
/// split into their own bundle, the chunk to fetch before mounting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ViewDescriptor {
    pub id: String,
    pub component: String,
    pub chunk: Option<String>,
}

/// How a view is brought in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum Loading {
    /// Loaded while the registry is being assembled.
    Eager,
    /// Loaded on the first navigation that needs it, then cached.
    Lazy,
}

pub type ViewLoader = Arc<dyn Fn() -> ViewDescriptor + Send + Sync>;

struct ViewEntry {
    loading: Loading,
    loader: ViewLoader,
    loaded: OnceLock<ViewDescriptor>,
    loads: AtomicUsize,
}

impl ViewEntry {
    fn get(&self) -> &ViewDescriptor {
        self.loaded.get_or_init(|| {
            self.loads.fetch_add(1, Ordering::Relaxed);
            (self.loader)()
        })
    }
}

/// ViewRegistry
///
/// The indirection between route definitions and renderable units. Routes only name a
/// view id; the registry turns that id into a [`ViewDescriptor`], running the loader at
/// most once per view.
#[derive(Default)]
pub struct ViewRegistry {
    views: HashMap<String, ViewEntry>,
}

impl fmt::Debug for ViewRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.views.keys().collect();
        ids.sort();
        f.debug_struct("ViewRegistry").field("views", &ids).finish()
    }
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a view bundled with the application shell.
    pub fn eager(mut self, id: &str, component: &str) -> Self {
        let descriptor = ViewDescriptor {
            id: id.to_string(),
            component: component.to_string(),
            chunk: None,
        };
        let entry = ViewEntry {
            loading: Loading::Eager,
            loader: Arc::new(move || descriptor.clone()),
            loaded: OnceLock::new(),
            loads: AtomicUsize::new(0),
        };
        entry.get();
        self.views.insert(id.to_string(), entry);
        self
    }

    /// Registers a view whose loader is deferred until first resolution.
    pub fn lazy<F>(mut self, id: &str, loader: F) -> Self
    where
        F: Fn() -> ViewDescriptor + Send + Sync + 'static,
    {
        let entry = ViewEntry {
            loading: Loading::Lazy,
            loader: Arc::new(loader),
            loaded: OnceLock::new(),
            loads: AtomicUsize::new(0),
        };
        self.views.insert(id.to_string(), entry);
        self
    }

    /// Shorthand for a lazily loaded view served from its own chunk.
    pub fn lazy_chunk(self, id: &str, component: &str, chunk: &str) -> Self {
        let descriptor = ViewDescriptor {
            id: id.to_string(),
            component: component.to_string(),
            chunk: Some(chunk.to_string()),
        };
        self.lazy(id, move || descriptor.clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.views.contains_key(id)
    }

    pub fn loading(&self, id: &str) -> Option<Loading> {
        self.views.get(id).map(|entry| entry.loading)
    }

    /// resolve
    ///
    /// Returns the descriptor for `id`, loading it first if it is lazy and has not been
    /// needed yet.
    pub fn resolve(&self, id: &str) -> Option<ViewDescriptor> {
        let entry = self.views.get(id)?;
        if entry.loaded.get().is_none() {
            tracing::debug!(view = id, "loading view");
        }
        Some(entry.get().clone())
    }

    /// Number of times the loader for `id` has run.
    pub fn load_count(&self, id: &str) -> usize {
        self.views
            .get(id)
            .map(|entry| entry.loads.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}
