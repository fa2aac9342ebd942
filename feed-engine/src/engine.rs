use crate::config::{ConfigOverrides, FeedConfig};
use crate::context::RunContext;
use crate::hooks::FeedHooks;
use crate::runtime::FeedRuntime;
use crate::traits::{Sorter, Source, Stage};
use crate::types::{FeedError, FeedItem, Result, VideoRecord, WhyEntry};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

/// A registered feed pipeline: one source, ordered stages, optional sorter,
/// then decorators over the sorted list.
pub struct FeedDefinition {
    source: Box<dyn Source>,
    stages: Vec<Box<dyn Stage>>,
    sorter: Option<Box<dyn Sorter>>,
    decorators: Vec<Box<dyn Stage>>,
    hooks: FeedHooks,
    default_config: FeedConfig,
}

impl FeedDefinition {
    pub fn builder(source: impl Source + 'static) -> FeedDefinitionBuilder {
        FeedDefinitionBuilder::new(source)
    }
}

/// Builder for [`FeedDefinition`]; stage order is the order of `add_stage` calls.
pub struct FeedDefinitionBuilder {
    definition: FeedDefinition,
}

impl FeedDefinitionBuilder {
    pub fn new(source: impl Source + 'static) -> Self {
        Self {
            definition: FeedDefinition {
                source: Box::new(source),
                stages: Vec::new(),
                sorter: None,
                decorators: Vec::new(),
                hooks: FeedHooks::default(),
                default_config: FeedConfig::default(),
            },
        }
    }

    pub fn add_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.definition.stages.push(Box::new(stage));
        self
    }

    pub fn sorter(mut self, sorter: impl Sorter + 'static) -> Self {
        self.definition.sorter = Some(Box::new(sorter));
        self
    }

    pub fn add_decorator(mut self, decorator: impl Stage + 'static) -> Self {
        self.definition.decorators.push(Box::new(decorator));
        self
    }

    /// Hooks used when a run does not supply its own for the same key.
    pub fn hooks(mut self, hooks: FeedHooks) -> Self {
        self.definition.hooks = hooks;
        self
    }

    pub fn default_config(mut self, config: FeedConfig) -> Self {
        self.definition.default_config = config;
        self
    }

    pub fn build(self) -> FeedDefinition {
        self.definition
    }
}

/// Read-only description of a registered feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedDescriptor {
    pub name: String,
    pub source: String,
    pub stages: Vec<String>,
    pub has_sorter: bool,
    pub decorators: Vec<String>,
    pub config_defaults: FeedConfig,
}

/// Per-call inputs to [`FeedEngine::run_feed`].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub runtime: FeedRuntime,
    pub hooks: Option<FeedHooks>,
    pub config: Option<ConfigOverrides>,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_runtime(mut self, runtime: FeedRuntime) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_hooks(mut self, hooks: FeedHooks) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn with_config(mut self, config: ConfigOverrides) -> Self {
        self.config = Some(config);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    pub run_id: Uuid,
    pub why: Vec<WhyEntry>,
    pub config: FeedConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedRunResult {
    pub videos: Vec<VideoRecord>,
    pub items: Vec<FeedItem>,
    pub metadata: RunMetadata,
}

impl FeedRunResult {
    pub fn video_ids(&self) -> Vec<&str> {
        self.videos.iter().map(|video| video.id.as_str()).collect()
    }

    pub fn why(&self) -> &[WhyEntry] {
        &self.metadata.why
    }
}

struct FeedEntry {
    name: String,
    definition: FeedDefinition,
}

impl FeedEntry {
    fn descriptor(&self) -> FeedDescriptor {
        let definition = &self.definition;
        FeedDescriptor {
            name: self.name.clone(),
            source: definition.source.source_name(),
            stages: definition.stages.iter().map(|stage| stage.stage_name()).collect(),
            has_sorter: definition.sorter.is_some(),
            decorators: definition
                .decorators
                .iter()
                .map(|decorator| decorator.stage_name())
                .collect(),
            config_defaults: definition.default_config.clone(),
        }
    }
}

/// Registry and runner for named feeds.
///
/// Registration needs `&mut self`; running only needs `&self`, so any number of
/// runs can share one engine while the registry stays frozen.
#[derive(Default)]
pub struct FeedEngine {
    feeds: HashMap<String, FeedEntry>,
}

impl FeedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_feed(&mut self, name: impl Into<String>, definition: FeedDefinition) -> Result<FeedDescriptor> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(FeedError::InvalidFeedName);
        }
        if self.feeds.contains_key(&name) {
            return Err(FeedError::FeedAlreadyRegistered { name });
        }

        let entry = FeedEntry {
            name: name.clone(),
            definition,
        };
        let descriptor = entry.descriptor();
        info!(
            "Registered feed {} ({} stages, sorter: {})",
            name,
            descriptor.stages.len(),
            descriptor.has_sorter
        );
        self.feeds.insert(name, entry);
        Ok(descriptor)
    }

    pub fn has_feed(&self, name: &str) -> bool {
        self.feeds.contains_key(name)
    }

    pub fn feed_definition(&self, name: &str) -> Option<FeedDescriptor> {
        self.feeds.get(name).map(FeedEntry::descriptor)
    }

    pub fn list_feeds(&self) -> Vec<FeedDescriptor> {
        let mut feeds: Vec<_> = self.feeds.values().map(FeedEntry::descriptor).collect();
        feeds.sort_by(|a, b| a.name.cmp(&b.name));
        feeds
    }

    /// Run the named feed end to end.
    ///
    /// Any error from the source, a stage, a hook or a decorator aborts the run
    /// and is returned as is; there is no partial result.
    pub async fn run_feed(&self, name: &str, options: RunOptions) -> Result<FeedRunResult> {
        let entry = self.feeds.get(name).ok_or_else(|| FeedError::FeedNotFound {
            name: name.to_string(),
        })?;

        let RunOptions { runtime, hooks, config } = options;
        let definition = &entry.definition;
        let ctx = RunContext::new(
            &entry.name,
            &runtime,
            definition.default_config.merged(config.as_ref()),
            definition.hooks.merged(hooks),
        );

        let span = info_span!("feed_run", feed = %entry.name, run_id = %ctx.run_id());
        run_pipeline(definition, ctx).instrument(span).await
    }
}

async fn run_pipeline(definition: &FeedDefinition, mut ctx: RunContext<'_>) -> Result<FeedRunResult> {
    let mut items = definition.source.fetch(&ctx).await?;
    let candidates = items.len();
    debug!("Source {} produced {} items", definition.source.source_name(), candidates);

    for stage in &definition.stages {
        let before = items.len();
        items = stage.apply(items, &mut ctx).await?;
        debug!("Stage {} kept {}/{} items", stage.stage_name(), items.len(), before);
    }

    if let Some(sorter) = &definition.sorter {
        items = sorter.sort(items);
    }

    for decorator in &definition.decorators {
        items = decorator.apply(items, &mut ctx).await?;
    }

    let (run_id, config, why) = ctx.finish();
    info!(
        "Feed run produced {} of {} candidates ({} excluded)",
        items.len(),
        candidates,
        why.len()
    );

    Ok(FeedRunResult {
        videos: items.iter().map(|item| item.video.clone()).collect(),
        items,
        metadata: RunMetadata {
            run_id,
            why: why.into_entries(),
            config,
        },
    })
}
