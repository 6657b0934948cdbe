//! The rendering engine.
//!
//! An [`Engine`] owns its configuration and its caches. Rendering is
//! synchronous and runs on the caller's thread; share one engine between
//! threads behind `&Engine` or `Arc<Engine>`.
//!
//! # Pipeline
//!
//! ```text
//! render cache ──hit──────────────────────────────────────▶ output
//!      │ miss
//!      ▼
//! parse ──▶ resolve (accessor cache) ──▶ format ──▶ concat ──▶ output
//! ```
//!
//! Placeholders are resolved as the scanner reaches them, so the error
//! reported for a broken template is always the leftmost one.
//!
//! # Render Cache Modes
//!
//! See [`RenderCacheMode`]. In the default `Output` mode the cache key is
//! the template plus the *names* of the values, not the values themselves:
//!
//! ```
//! use fstring::{Engine, EngineConfig, RenderCacheMode, ValueMap};
//!
//! let engine = Engine::new();
//! let first = engine.render("{n}", &ValueMap::new().with("n", 1)).unwrap();
//! let second = engine.render("{n}", &ValueMap::new().with("n", 2)).unwrap();
//! assert_eq!((first.as_str(), second.as_str()), ("1", "1"));
//!
//! let engine = Engine::with_config(EngineConfig::new().render_cache(RenderCacheMode::Compiled));
//! let first = engine.render("{n}", &ValueMap::new().with("n", 1)).unwrap();
//! let second = engine.render("{n}", &ValueMap::new().with("n", 2)).unwrap();
//! assert_eq!((first.as_str(), second.as_str()), ("1", "2"));
//! ```

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{debug, trace};

use crate::cache::{AccessorCache, ShardedMap};
use crate::config::{EngineConfig, RenderCacheMode};
use crate::error::Result;
use crate::format::apply_format;
use crate::parser::{parse, Segment};
use crate::resolve::resolve;
use crate::value::{Value, ValueMap};

static GLOBAL: Lazy<Engine> = Lazy::new(Engine::new);

/// Renders `template` with the process-wide default engine.
///
/// The default engine uses [`EngineConfig::default`], so output caching
/// ignores values; use an [`Engine`] of your own for anything else.
///
/// ```
/// use fstring::{render, value_map};
///
/// let out = render("Hello, {name}!", &value_map! { "name" => "World" }).unwrap();
/// assert_eq!(out, "Hello, World!");
/// ```
pub fn render(template: &str, values: &ValueMap) -> Result<String> {
    Engine::global().render(template, values)
}

/// Output cache key: the template and the sorted value names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RenderKey {
    template: Box<str>,
    names: Box<[Box<str>]>,
}

impl RenderKey {
    fn new(template: &str, values: &ValueMap) -> Self {
        let mut names: Vec<Box<str>> = values.names().map(Box::from).collect();
        names.sort_unstable();
        RenderKey {
            template: template.into(),
            names: names.into_boxed_slice(),
        }
    }
}

/// Number of entries in each of an engine's caches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Rendered outputs (`Output` mode).
    pub rendered: usize,
    /// Parsed templates (`Compiled` mode).
    pub compiled: usize,
    /// Resolved accessors.
    pub accessors: usize,
}

/// Renders templates and owns the caches that speed that up.
pub struct Engine {
    config: EngineConfig,
    rendered: ShardedMap<RenderKey, String>,
    compiled: ShardedMap<Box<str>, Arc<[Segment<'static>]>>,
    accessors: AccessorCache,
}

impl Engine {
    /// An engine with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Engine {
            config,
            rendered: ShardedMap::new(),
            compiled: ShardedMap::new(),
            accessors: AccessorCache::new(),
        }
    }

    /// The process-wide default engine, created on first use.
    pub fn global() -> &'static Engine {
        &GLOBAL
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Renders `template`, substituting placeholders from `values`.
    ///
    /// # Example
    ///
    /// ```
    /// use fstring::{Engine, value_map};
    ///
    /// let engine = Engine::new();
    /// let values = value_map! { "item" => "tea", "price" => 2.5 };
    /// let out = engine.render("{{{item}}} {price:>6.2f}", &values).unwrap();
    /// assert_eq!(out, "{tea}   2.50");
    /// ```
    pub fn render(&self, template: &str, values: &ValueMap) -> Result<String> {
        match self.config.render_cache {
            RenderCacheMode::Output => self.render_output(template, values),
            RenderCacheMode::Compiled => self.render_compiled(template, values),
            RenderCacheMode::Disabled => self.evaluate(parse(template), template.len(), values),
        }
    }

    /// Like [`render`](Self::render), with optional inputs.
    ///
    /// A `None` template renders to `None` without touching any cache; a
    /// `None` value map is treated as empty.
    pub fn render_opt(
        &self,
        template: Option<&str>,
        values: Option<&ValueMap>,
    ) -> Result<Option<String>> {
        let Some(template) = template else {
            return Ok(None);
        };
        match values {
            Some(values) => self.render(template, values).map(Some),
            None => self.render(template, &ValueMap::new()).map(Some),
        }
    }

    /// Resolves a single path expression such as `user.name` without
    /// formatting it.
    pub fn resolve(&self, expression: &str, values: &ValueMap) -> Result<Value> {
        resolve(expression, values, &self.accessors, &self.config).map(|value| value.into_owned())
    }

    /// Current cache sizes.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            rendered: self.rendered.len(),
            compiled: self.compiled.len(),
            accessors: self.accessors.len(),
        }
    }

    fn render_output(&self, template: &str, values: &ValueMap) -> Result<String> {
        let key = RenderKey::new(template, values);
        if let Some(output) = self.rendered.get(&key) {
            trace!(template, "render cache hit");
            return Ok(output);
        }

        debug!(template, names = key.names.len(), "render cache miss");
        let output = self.evaluate(parse(template), template.len(), values)?;
        if !self.rendered.insert_if_absent(key, output.clone()) {
            debug!(template, "render cache entry already present, keeping it");
        }
        Ok(output)
    }

    fn render_compiled(&self, template: &str, values: &ValueMap) -> Result<String> {
        if let Some(segments) = self.compiled.get(template) {
            trace!(template, "compiled template hit");
            let borrowed = segments.iter().map(|segment| Ok(segment.as_borrowed()));
            return self.evaluate(borrowed, template.len(), values);
        }

        debug!(template, "compiled template miss");
        let segments: Arc<[Segment<'static>]> = match parse(template)
            .map(|segment| segment.map(Segment::into_owned))
            .collect::<Result<Vec<_>>>()
        {
            Ok(segments) => segments.into(),
            // A placeholder left of the scan error may fail first.
            Err(_) => return self.evaluate(parse(template), template.len(), values),
        };

        let borrowed = segments.iter().map(|segment| Ok(segment.as_borrowed()));
        let output = self.evaluate(borrowed, template.len(), values)?;
        if !self.compiled.insert_if_absent(template.into(), Arc::clone(&segments)) {
            debug!(template, "compiled template already present, keeping it");
        }
        Ok(output)
    }

    /// Runs segments through resolution and formatting, stopping at the
    /// first error.
    fn evaluate<'t, I>(&self, segments: I, size_hint: usize, values: &ValueMap) -> Result<String>
    where
        I: Iterator<Item = Result<Segment<'t>>>,
    {
        let mut output = String::with_capacity(size_hint + 16);
        for segment in segments {
            match segment? {
                Segment::Literal(text) => output.push_str(&text),
                Segment::Placeholder(spec) => {
                    let value = resolve(&spec.path, values, &self.accessors, &self.config)?;
                    match spec.format.as_deref() {
                        Some(format) => output.push_str(&apply_format(&value, format)?),
                        None => output.push_str(&value.to_string()),
                    }
                }
            }
        }
        Ok(output)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
