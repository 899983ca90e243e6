//! A single logical asset and its render steps.
//!
//! A unit's output moves through up to three steps, always in this order:
//!
//! ```text
//! lib/menu.js ──relocate──▶ cache/lib-menu.js ──version──▶ cache/lib-menu.v2.js
//!                                                   ──pack──▶ cache/lib-menu.v2.pack.js
//! ```
//!
//! The final location depends only on `(source, version, flags)`, so it is
//! known before any step runs. When it already holds a valid artifact the
//! steps are skipped entirely.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::collect::StaleCollector;
use super::error::AssetError;
use super::location::{AssetRoots, KindRoots, Location};
use super::markup::{Attrs, tag};
use super::registry::EmittedArtifacts;
use super::name::{artifact_name, artifact_pattern, is_valid_version, packed_name, versioned_name};
use super::{AssetKind, ProcessFlags};
use crate::freshness::CachePolicy;
use crate::transform::{TransformOptions, Transformer};
use crate::utils::fs::{atomic_copy, atomic_write, with_path_lock};
use crate::utils::path::{flatten_separators, split_stem, to_slash};
use crate::{debug, log};

/// Collaborators a render needs, borrowed from the pipeline.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub roots: &'a AssetRoots,
    pub transformer: &'a dyn Transformer,
    pub collector: &'a dyn StaleCollector,
    /// Shared by every unit and group of one render call.
    pub emitted: &'a EmittedArtifacts,
    pub policy: CachePolicy,
}

/// One source file with its version label and processing flags.
#[derive(Debug, Clone)]
pub struct AssetUnit {
    /// Relative to the kind's source root.
    source: PathBuf,
    identity: String,
    kind: AssetKind,
    version: String,
    flags: ProcessFlags,
    combine_requested: bool,
    attrs: Attrs,
    /// Where the unit's bytes currently live.
    output: Location,
    content: Option<Vec<u8>>,
}

impl AssetUnit {
    /// Unit with the kind inferred from the extension, all flags set, and
    /// combination requested.
    pub fn new(source: impl Into<PathBuf>, version: impl Into<String>) -> Result<Self, AssetError> {
        let source = source.into();
        let kind = AssetKind::from_path(&source).ok_or_else(|| AssetError::UnknownKind(source.clone()))?;
        Self::of_kind(source, version, kind)
    }

    /// Unit of an explicit kind, whatever the extension says.
    pub fn of_kind(
        source: impl Into<PathBuf>,
        version: impl Into<String>,
        kind: AssetKind,
    ) -> Result<Self, AssetError> {
        let source = source.into();
        let version = version.into();
        if !is_valid_version(&version) {
            return Err(AssetError::InvalidVersion {
                path: source,
                version,
            });
        }

        Ok(Self {
            identity: to_slash(&source),
            output: Location::source(&source),
            source,
            kind,
            version,
            flags: ProcessFlags::default(),
            combine_requested: true,
            attrs: Vec::new(),
            content: None,
        })
    }

    pub fn with_flags(mut self, flags: ProcessFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_combine(mut self, requested: bool) -> Self {
        self.combine_requested = requested;
        self
    }

    /// Append a markup attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    /// Change the flags of an existing unit.
    pub fn set_flags(&mut self, flags: ProcessFlags) {
        self.flags = flags;
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Dedup key: the source path, `/`-separated.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn flags(&self) -> ProcessFlags {
        self.flags
    }

    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    /// Requested *and* fully processed; only such units join a combined artifact.
    pub fn is_combinable(&self) -> bool {
        self.combine_requested && self.flags.is_full()
    }

    /// Source file stem, used in combined artifact names.
    pub fn basename(&self) -> &str {
        let name = self
            .source
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        split_stem(name).0
    }

    /// Current output location.
    pub fn output(&self) -> &Location {
        &self.output
    }

    /// Absolute path of the source file.
    pub fn source_path(&self, roots: &AssetRoots) -> PathBuf {
        roots.for_kind(self.kind).source.path(&self.source)
    }

    pub(crate) fn transform_options(&self, roots: &AssetRoots) -> TransformOptions {
        TransformOptions {
            origin: self.source_path(roots),
            import_root: roots.for_kind(self.kind).source.dir.clone(),
        }
    }

    /// Stem every generated name is built from.
    ///
    /// Relocated units live in the flat cache root, so their stem carries the
    /// flattened directory: `lib/menu.js` → `lib-menu`.
    fn stem(&self) -> String {
        if self.flags.relocated {
            let flat = flatten_separators(&self.source);
            split_stem(&flat).0.to_string()
        } else {
            self.basename().to_string()
        }
    }

    /// Where the output ends up after every enabled step.
    pub fn final_location(&self) -> Location {
        let flags = self.flags;
        if flags == ProcessFlags::NONE {
            return Location::source(&self.source);
        }

        let name = artifact_name(&self.stem(), &self.version, flags, self.kind);
        if flags.relocated {
            Location::cache(name)
        } else {
            Location::source(&self.source).with_file_name(&name)
        }
    }

    // ========================================================================
    // Steps
    // ========================================================================

    fn kind_roots<'a>(&self, roots: &'a AssetRoots) -> &'a KindRoots {
        roots.for_kind(self.kind)
    }

    /// Read the current output into the buffer.
    pub fn load(&mut self, roots: &AssetRoots) -> Result<(), AssetError> {
        let path = self.output.path(self.kind_roots(roots));
        let bytes = fs::read(&path).map_err(AssetError::read(&path))?;
        self.content = Some(bytes);
        Ok(())
    }

    /// Copy the output into the cache root under a flattened name.
    ///
    /// An existing destination is trusted unless the policy verifies content.
    pub fn relocate(&mut self, ctx: &RenderContext<'_>) -> Result<(), AssetError> {
        let roots = self.kind_roots(ctx.roots);
        let dest = self.staging_location();
        let dest_path = dest.path(roots);

        if !(ctx.policy.trusts_existing() && dest_path.is_file()) {
            let from = self.output.path(roots);
            copy_artifact(&from, &dest_path)?;
        }

        self.output = dest;
        Ok(())
    }

    /// Move (relocated) or copy (in place) the output to its versioned name.
    ///
    /// Returns `true` on a cache hit, when the versioned file already existed
    /// and was trusted.
    pub fn apply_version(&mut self, ctx: &RenderContext<'_>) -> Result<bool, AssetError> {
        let roots = self.kind_roots(ctx.roots);
        let target = self
            .output
            .with_file_name(&versioned_name(&self.output.file_name(), &self.version, self.kind));
        let target_path = target.path(roots);

        let hit = ctx.policy.trusts_existing() && target_path.is_file();
        if !hit {
            let from = self.output.path(roots);
            if self.flags.relocated {
                fs::rename(&from, &target_path).map_err(AssetError::write(&target_path))?;
            } else {
                copy_artifact(&from, &target_path)?;
            }
        }

        self.output = target;
        Ok(hit)
    }

    /// Run the transformer over the buffer, loading it first if empty.
    pub fn transform(&mut self, ctx: &RenderContext<'_>) -> Result<(), AssetError> {
        let input = match self.content.take() {
            Some(bytes) => bytes,
            None => {
                self.load(ctx.roots)?;
                self.content.take().unwrap_or_default()
            }
        };
        let options = self.transform_options(ctx.roots);
        let output = ctx
            .transformer
            .transform(&input, self.kind, &options)
            .map_err(|e| AssetError::Transform(options.origin.clone(), e))?;
        self.content = Some(output);
        Ok(())
    }

    /// Write the buffer to the current output, consuming it.
    pub fn persist(&mut self, roots: &AssetRoots) -> Result<(), AssetError> {
        let path = self.output.path(self.kind_roots(roots));
        let bytes = self.content.take().unwrap_or_default();
        atomic_write(&path, &bytes).map_err(AssetError::write(&path))
    }

    /// Unversioned copy in the cache root, shared by every version of the source.
    fn staging_location(&self) -> Location {
        Location::cache(format!("{}.{}", self.stem(), self.kind.extension()))
    }

    /// Remove earlier versions of this unit's artifact next to the current output.
    pub fn cleanup(&self, ctx: &RenderContext<'_>) -> usize {
        let current = self.output.path(self.kind_roots(ctx.roots));
        ctx.emitted.insert(&current);

        let pattern = match artifact_pattern(&self.stem(), self.flags, self.kind) {
            Ok(Some(pattern)) => pattern,
            Ok(None) => return 0,
            Err(e) => {
                debug!("clean"; "no pattern for {}: {}", self.identity, e);
                return 0;
            }
        };
        let Some(dir) = current.parent() else {
            return 0;
        };
        ctx.collector.collect(dir, &pattern, ctx.emitted)
    }

    // ========================================================================
    // Render
    // ========================================================================

    /// Produce (or reuse) the unit's artifact and return its reference tag.
    pub fn render(&mut self, ctx: &RenderContext<'_>) -> Result<String, AssetError> {
        self.output = Location::source(&self.source);
        self.content = None;

        let roots = self.kind_roots(ctx.roots);
        let target = self.final_location();
        let target_path = target.path(roots);

        if self.flags != ProcessFlags::NONE {
            with_path_lock(&target_path, || self.generate(ctx, &target_path))?;
        }

        self.output = target;
        self.cleanup(ctx);
        Ok(tag(self.kind, &self.output.href(roots), &self.attrs))
    }

    fn generate(&mut self, ctx: &RenderContext<'_>, target_path: &Path) -> Result<(), AssetError> {
        let sources = [self.source_path(ctx.roots)];
        if ctx.policy.is_fresh(target_path, &sources) {
            debug!("render"; "reused {}", self.identity);
            return Ok(());
        }

        if self.flags.relocated {
            // Versions of one source stage through the same cache file.
            let staging = self.staging_location().path(self.kind_roots(ctx.roots));
            if staging == target_path {
                self.stage(ctx)?;
            } else {
                with_path_lock(&staging, || self.stage(ctx))?;
            }
        } else {
            self.stage(ctx)?;
        }
        if self.flags.packed {
            let intermediate = self.output.clone();
            self.load(ctx.roots)?;
            self.transform(ctx)?;
            self.output = self
                .output
                .with_file_name(&packed_name(&self.output.file_name(), self.kind));
            self.persist(ctx.roots)?;

            if self.flags.relocated && self.flags.versioned {
                let _ = fs::remove_file(intermediate.path(self.kind_roots(ctx.roots)));
            }
        }

        ctx.policy
            .record(target_path, &sources)
            .map_err(AssetError::write(target_path))?;
        log!("render"; "{} -> {}", self.identity, to_slash(&self.output.rel));
        Ok(())
    }

    /// Relocate and version, as the flags ask.
    fn stage(&mut self, ctx: &RenderContext<'_>) -> Result<(), AssetError> {
        if self.flags.relocated {
            self.relocate(ctx)?;
        }
        if self.flags.versioned {
            let staged = self.output.clone();
            if self.apply_version(ctx)? && self.flags.relocated {
                let _ = fs::remove_file(staged.path(self.kind_roots(ctx.roots)));
            }
        }
        Ok(())
    }

    /// Reference the unaltered source. No filesystem access.
    pub fn debug(&self, roots: &AssetRoots) -> String {
        let href = self.kind_roots(roots).source.href(&self.source);
        tag(self.kind, &href, &self.attrs)
    }
}

/// Copy with the read and write failures told apart.
fn copy_artifact(from: &Path, to: &Path) -> Result<(), AssetError> {
    if !from.is_file() {
        return Err(AssetError::SourceNotFound(
            from.to_path_buf(),
            io::Error::from(io::ErrorKind::NotFound),
        ));
    }
    atomic_copy(from, to).map_err(AssetError::write(to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::collect::DirectoryScan;
    use crate::transform::testing::{Recording, failing};
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        roots: AssetRoots,
        recorder: Recording,
        emitted: EmittedArtifacts,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let roots = AssetRoots::under(dir.path());
            fs::create_dir_all(&roots.scripts.source.dir).unwrap();
            fs::create_dir_all(&roots.styles.source.dir).unwrap();
            Self {
                _dir: dir,
                roots,
                recorder: Recording::default(),
                emitted: EmittedArtifacts::new(),
            }
        }

        fn ctx(&self) -> RenderContext<'_> {
            self.ctx_with(CachePolicy::Exists)
        }

        /// Each context starts a new render call.
        fn ctx_with(&self, policy: CachePolicy) -> RenderContext<'_> {
            self.emitted.clear();
            RenderContext {
                roots: &self.roots,
                transformer: &self.recorder,
                collector: &DirectoryScan,
                emitted: &self.emitted,
                policy,
            }
        }

        fn script(&self, rel: &str, content: &str) {
            let path = self.roots.scripts.source.path(Path::new(rel));
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        fn cache(&self, name: &str) -> PathBuf {
            self.roots.scripts.cache.path(Path::new(name))
        }

        fn source(&self, rel: &str) -> PathBuf {
            self.roots.scripts.source.path(Path::new(rel))
        }
    }

    #[test]
    fn test_new_infers_kind() {
        assert_eq!(AssetUnit::new("a.css", "1").unwrap().kind(), AssetKind::Style);
        assert!(matches!(
            AssetUnit::new("a.txt", "1").unwrap_err(),
            AssetError::UnknownKind(_)
        ));
        assert!(matches!(
            AssetUnit::new("a.js", "1.0").unwrap_err(),
            AssetError::InvalidVersion { .. }
        ));
    }

    #[test]
    fn test_combinable_requires_all_flags() {
        let mut unit = AssetUnit::new("x.js", "1").unwrap();
        assert!(unit.is_combinable());

        unit.set_flags(ProcessFlags::from_mode(6).unwrap());
        assert!(!unit.is_combinable());

        unit.set_flags(ProcessFlags::ALL);
        assert!(unit.is_combinable());

        let declined = AssetUnit::new("x.js", "1").unwrap().with_combine(false);
        assert!(!declined.is_combinable());
    }

    #[test]
    fn test_final_location() {
        let unit = AssetUnit::new("lib/menu.js", "2").unwrap();
        assert_eq!(unit.final_location(), Location::cache("lib-menu.v2.pack.js"));

        let in_place = unit.clone().with_flags(ProcessFlags::from_mode(2).unwrap());
        assert_eq!(in_place.final_location(), Location::source("lib/menu.v2.js"));

        let untouched = unit.with_flags(ProcessFlags::NONE);
        assert_eq!(untouched.final_location(), Location::source("lib/menu.js"));
    }

    #[test]
    fn test_render_full_pipeline() {
        let fx = Fixture::new();
        fx.script("lib/menu.js", "menu()");
        let mut unit = AssetUnit::new("lib/menu.js", "2").unwrap().with_attr("defer", "defer");

        let markup = unit.render(&fx.ctx()).unwrap();

        assert_eq!(
            markup,
            "<script type=\"text/javascript\" src=\"/scripts/cache/lib-menu.v2.pack.js\" defer=\"defer\"></script>\n"
        );
        assert_eq!(fs::read_to_string(fx.cache("lib-menu.v2.pack.js")).unwrap(), "MENU()");
        assert!(!fx.cache("lib-menu.js").exists());
        assert!(!fx.cache("lib-menu.v2.js").exists());
        assert_eq!(fs::read_to_string(fx.source("lib/menu.js")).unwrap(), "menu()");
        assert_eq!(fx.recorder.calls(), 1);
    }

    #[test]
    fn test_render_reuses_existing_artifact() {
        let fx = Fixture::new();
        fx.script("app.js", "app()");
        let mut unit = AssetUnit::new("app.js", "1").unwrap();
        unit.render(&fx.ctx()).unwrap();

        // Hand-edited artifact stays: existence is validity
        fs::write(fx.cache("app.v1.pack.js"), "kept").unwrap();
        let mut again = AssetUnit::new("app.js", "1").unwrap();
        again.render(&fx.ctx()).unwrap();

        assert_eq!(fx.recorder.calls(), 1);
        assert_eq!(fs::read_to_string(fx.cache("app.v1.pack.js")).unwrap(), "kept");
    }

    #[test]
    fn test_content_policy_regenerates_on_change() {
        let fx = Fixture::new();
        fx.script("app.js", "one()");
        let ctx = fx.ctx_with(CachePolicy::Content);

        AssetUnit::new("app.js", "1").unwrap().render(&ctx).unwrap();
        AssetUnit::new("app.js", "1").unwrap().render(&ctx).unwrap();
        assert_eq!(fx.recorder.calls(), 1);

        fx.script("app.js", "two()");
        AssetUnit::new("app.js", "1").unwrap().render(&ctx).unwrap();

        assert_eq!(fx.recorder.calls(), 2);
        assert_eq!(fs::read_to_string(fx.cache("app.v1.pack.js")).unwrap(), "TWO()");
    }

    #[test]
    fn test_render_version_only_in_place() {
        let fx = Fixture::new();
        fx.script("z.js", "z()");
        let mut unit = AssetUnit::new("z.js", "2")
            .unwrap()
            .with_flags(ProcessFlags::from_mode(2).unwrap());

        let markup = unit.render(&fx.ctx()).unwrap();

        assert!(markup.contains("src=\"/scripts/z.v2.js\""));
        assert_eq!(fs::read_to_string(fx.source("z.v2.js")).unwrap(), "z()");
        assert!(fx.source("z.js").exists());
        assert_eq!(fx.recorder.calls(), 0);
    }

    #[test]
    fn test_render_cleans_previous_version() {
        let fx = Fixture::new();
        fx.script("main.js", "main()");
        fx.script("main2.js", "main2()");
        AssetUnit::new("main.js", "1").unwrap().render(&fx.ctx()).unwrap();
        AssetUnit::new("main2.js", "1").unwrap().render(&fx.ctx()).unwrap();

        AssetUnit::new("main.js", "2").unwrap().render(&fx.ctx()).unwrap();

        assert!(!fx.cache("main.v1.pack.js").exists());
        assert!(fx.cache("main.v2.pack.js").exists());
        assert!(fx.cache("main2.v1.pack.js").exists());
    }

    #[test]
    fn test_render_missing_source() {
        let fx = Fixture::new();
        let err = AssetUnit::new("gone.js", "1").unwrap().render(&fx.ctx()).unwrap_err();
        assert!(matches!(err, AssetError::SourceNotFound(..)));
    }

    #[test]
    fn test_render_transform_failure() {
        let fx = Fixture::new();
        fx.script("bad.js", "bad(");
        let ctx = RenderContext {
            transformer: &failing,
            ..fx.ctx()
        };

        let err = AssetUnit::new("bad.js", "1").unwrap().render(&ctx).unwrap_err();
        assert!(matches!(err, AssetError::Transform(..)));
        assert!(!fx.cache("bad.v1.pack.js").exists());
    }

    #[test]
    fn test_relocate_trusts_existing_copy() {
        let fx = Fixture::new();
        fx.script("lib/a.js", "fresh");
        fs::create_dir_all(&fx.roots.scripts.cache.dir).unwrap();
        fs::write(fx.cache("lib-a.js"), "old copy").unwrap();
        let mut unit = AssetUnit::new("lib/a.js", "1").unwrap();

        unit.relocate(&fx.ctx()).unwrap();
        assert_eq!(fs::read_to_string(fx.cache("lib-a.js")).unwrap(), "old copy");

        unit.output = Location::source("lib/a.js");
        unit.relocate(&fx.ctx_with(CachePolicy::Content)).unwrap();
        assert_eq!(fs::read_to_string(fx.cache("lib-a.js")).unwrap(), "fresh");
    }

    #[test]
    fn test_apply_version_reports_hit() {
        let fx = Fixture::new();
        fx.script("a.js", "a");
        let mut unit = AssetUnit::new("a.js", "1")
            .unwrap()
            .with_flags(ProcessFlags::from_mode(2).unwrap());

        assert!(!unit.apply_version(&fx.ctx()).unwrap());
        unit.output = Location::source("a.js");
        assert!(unit.apply_version(&fx.ctx()).unwrap());
    }

    #[test]
    fn test_version_hit_drops_relocated_copy() {
        let fx = Fixture::new();
        fx.script("lib/a.js", "a()");
        fs::create_dir_all(&fx.roots.scripts.cache.dir).unwrap();
        fs::write(fx.cache("lib-a.v3.js"), "a()").unwrap();

        AssetUnit::new("lib/a.js", "3").unwrap().render(&fx.ctx()).unwrap();

        assert_eq!(fs::read_to_string(fx.cache("lib-a.v3.pack.js")).unwrap(), "A()");
        assert!(!fx.cache("lib-a.js").exists());
        assert!(!fx.cache("lib-a.v3.js").exists());
    }

    #[test]
    fn test_relocate_only_writes_final_artifact() {
        let fx = Fixture::new();
        fx.script("lib/a.js", "a()");
        let mut unit = AssetUnit::new("lib/a.js", "3")
            .unwrap()
            .with_flags(ProcessFlags::from_mode(ProcessFlags::MOVE).unwrap());

        let markup = unit.render(&fx.ctx()).unwrap();

        assert!(markup.contains("src=\"/scripts/cache/lib-a.js\""));
        assert_eq!(fs::read_to_string(fx.cache("lib-a.js")).unwrap(), "a()");
    }

    #[test]
    fn test_render_records_emitted_artifact() {
        let fx = Fixture::new();
        fx.script("app.js", "app()");
        let ctx = fx.ctx();

        AssetUnit::new("app.js", "4").unwrap().render(&ctx).unwrap();

        assert!(fx.emitted.contains(&fx.cache("app.v4.pack.js")));
    }

    #[test]
    fn test_debug_has_no_side_effects() {
        let fx = Fixture::new();
        let unit = AssetUnit::new("lib/menu.js", "9").unwrap();

        let markup = unit.debug(&fx.roots);

        assert!(markup.contains("src=\"/scripts/lib/menu.js\""));
        assert!(!fx.roots.scripts.cache.dir.exists());
        assert_eq!(fx.recorder.calls(), 0);
    }
}
