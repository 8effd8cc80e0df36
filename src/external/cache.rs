use fxhash::FxHashMap;
use log::debug;

use super::{DiagramRenderer, RasterImage};
use crate::config::ChartTheme;

/// Memoized diagram renders for one export, keyed by theme and source.
///
/// Failures are cached as well, so a diagram that timed out once is not
/// retried within the same document.
#[derive(Debug, Default)]
pub struct DiagramCache {
    entries: FxHashMap<(ChartTheme, String), Option<RasterImage>>,
    hits: usize,
}

impl DiagramCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_render(
        &mut self,
        renderer: &dyn DiagramRenderer,
        source: &str,
        theme: ChartTheme,
    ) -> Option<RasterImage> {
        let key = (theme, source.to_string());
        if let Some(cached) = self.entries.get(&key) {
            self.hits += 1;
            debug!("diagram cache hit ({} bytes of source)", source.len());
            return cached.clone();
        }
        let rendered = renderer.render(source, theme);
        self.entries.insert(key, rendered.clone());
        rendered
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }
}
