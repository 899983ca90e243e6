//! Group registry and render orchestration.
//!
//! ```text
//! Pipeline::render(target)
//!   └─ per selected group, in insertion order
//!        ├─ combine()            production only; combinable units → one artifact per kind
//!        └─ per remaining unit   debug(): source href | render(): versioned artifact
//! ```
//!
//! A [`RenderedRegistry`] lives for exactly one `render()` call: a unit shared
//! by several groups is emitted by the first group that reaches it. Every
//! artifact written or reused during the call is kept out of stale collection
//! until the call returns.


use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::asset::{
    AssetError, AssetRoots, AssetUnit, DirectoryScan, EmittedArtifacts, RenderContext, RenderedRegistry,
    StaleCollector, combine,
};
use crate::freshness::CachePolicy;
use crate::transform::{Minifier, Transformer};

/// Group used when none is named.
pub const DEFAULT_GROUP: &str = "default";

/// What to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderTarget {
    All,
    /// Case-insensitive group name.
    Group(String),
}

impl From<&str> for RenderTarget {
    fn from(name: &str) -> Self {
        Self::Group(name.to_string())
    }
}

/// `None` renders every group.
impl From<Option<String>> for RenderTarget {
    fn from(name: Option<String>) -> Self {
        name.map_or(Self::All, Self::Group)
    }
}

/// Markup per group, in group insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    entries: Vec<(String, String)>,
}

impl Rendered {
    pub fn get(&self, group: &str) -> Option<&str> {
        let group = group.to_lowercase();
        self.entries
            .iter()
            .find(|(name, _)| *name == group)
            .map(|(_, markup)| markup.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, m)| (n.as_str(), m.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Rendered {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, markup) in &self.entries {
            map.serialize_entry(name, markup)?;
        }
        map.end()
    }
}

#[derive(Debug)]
struct Group {
    /// Lowercased.
    name: String,
    units: Vec<AssetUnit>,
}

/// Named groups of asset units and the collaborators that render them.
pub struct Pipeline {
    roots: AssetRoots,
    transformer: Box<dyn Transformer>,
    collector: Box<dyn StaleCollector>,
    policy: CachePolicy,
    groups: Vec<Group>,
    debug: bool,
}

impl Pipeline {
    /// Pipeline with the minifying transformer, directory-scan cleanup and
    /// the `exists` cache policy.
    pub fn new(roots: AssetRoots) -> Self {
        Self {
            roots,
            transformer: Box::new(Minifier),
            collector: Box::new(DirectoryScan),
            policy: CachePolicy::default(),
            groups: Vec::new(),
            debug: false,
        }
    }

    pub fn with_transformer(mut self, transformer: impl Transformer + 'static) -> Self {
        self.transformer = Box::new(transformer);
        self
    }

    pub fn with_boxed_transformer(mut self, transformer: Box<dyn Transformer>) -> Self {
        self.transformer = transformer;
        self
    }

    pub fn with_collector(mut self, collector: impl StaleCollector + 'static) -> Self {
        self.collector = Box::new(collector);
        self
    }

    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn roots(&self) -> &AssetRoots {
        &self.roots
    }

    /// Reference unaltered sources from now on.
    pub fn debug_on(&mut self) {
        self.debug = true;
    }

    pub fn debug_off(&mut self) {
        self.debug = false;
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Append `unit` to `group`, creating the group on first use.
    ///
    /// No uniqueness check: the registry keeps a unit added twice from being
    /// emitted twice.
    pub fn add_unit(&mut self, unit: AssetUnit, group: &str) {
        let name = group.to_lowercase();
        match self.groups.iter_mut().find(|g| g.name == name) {
            Some(existing) => existing.units.push(unit),
            None => self.groups.push(Group {
                name,
                units: vec![unit],
            }),
        }
    }

    /// Append `unit` to the default group.
    pub fn add(&mut self, unit: AssetUnit) {
        self.add_unit(unit, DEFAULT_GROUP);
    }

    /// Group names, lowercased, in insertion order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    /// Render one group or all of them.
    ///
    /// Fails with [`AssetError::UnknownGroup`] before touching the filesystem
    /// when the named group was never added. Any other error aborts the whole
    /// call; no partial markup is returned.
    pub fn render(&self, target: impl Into<RenderTarget>) -> Result<Rendered, AssetError> {
        let selected: Vec<&Group> = match target.into() {
            RenderTarget::All => self.groups.iter().collect(),
            RenderTarget::Group(name) => {
                let folded = name.to_lowercase();
                let group = self
                    .groups
                    .iter()
                    .find(|g| g.name == folded)
                    .ok_or(AssetError::UnknownGroup(name))?;
                vec![group]
            }
        };

        let emitted = EmittedArtifacts::new();
        let ctx = RenderContext {
            roots: &self.roots,
            transformer: self.transformer.as_ref(),
            collector: self.collector.as_ref(),
            emitted: &emitted,
            policy: self.policy,
        };
        let mut registry = RenderedRegistry::new();
        let mut rendered = Rendered::default();

        for group in selected {
            let markup = self.render_group(group, &ctx, &mut registry)?;
            rendered.entries.push((group.name.clone(), markup));
        }
        Ok(rendered)
    }

    fn render_group(
        &self,
        group: &Group,
        ctx: &RenderContext<'_>,
        registry: &mut RenderedRegistry,
    ) -> Result<String, AssetError> {
        let mut markup = if self.debug {
            String::new()
        } else {
            combine(&group.units, registry, ctx)?
        };

        for unit in &group.units {
            if registry.contains(unit.identity()) {
                continue;
            }
            if self.debug {
                markup.push_str(&unit.debug(&self.roots));
            } else {
                // Units carry per-render state; the configured one stays pristine
                let mut unit = unit.clone();
                markup.push_str(&unit.render(ctx)?);
            }
            registry.insert(unit.identity());
        }
        Ok(markup)
    }
}
