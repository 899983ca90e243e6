//! Combining a group's units into one artifact per kind.
//!
//! Members are the combinable units not yet emitted in this render. Their
//! ordered `(basename, version)` pairs name the artifact, so a new member, a
//! reordering, or a version bump produces a new file; an unchanged group finds
//! its artifact already on disk and does no work.

use std::fs;
use std::path::PathBuf;

use super::error::AssetError;
use super::location::Location;
use super::markup::tag;
use super::name::{combined_name, combined_pattern};
use super::registry::RenderedRegistry;
use super::unit::{AssetUnit, RenderContext};
use super::AssetKind;
use crate::utils::fs::{atomic_write, with_path_lock};
use crate::{debug, log};

/// Combine the eligible units of one group, returning the markup for every
/// artifact produced (empty when no unit is eligible).
///
/// Members are registered so the per-unit pass skips them.
pub fn combine(
    units: &[AssetUnit],
    registry: &mut RenderedRegistry,
    ctx: &RenderContext<'_>,
) -> Result<String, AssetError> {
    let mut markup = String::new();

    for kind in kinds_in_order(units) {
        // Within one batch the same identity joins once
        let mut batch = RenderedRegistry::new();
        let members: Vec<&AssetUnit> = units
            .iter()
            .filter(|u| u.kind() == kind && u.is_combinable() && !registry.contains(u.identity()))
            .filter(|u| batch.insert(u.identity()))
            .collect();
        if members.is_empty() {
            continue;
        }

        markup.push_str(&combine_kind(kind, &members, ctx)?);
        for member in &members {
            registry.insert(member.identity());
        }
    }

    Ok(markup)
}

/// Kinds of combinable units, in order of first appearance.
fn kinds_in_order(units: &[AssetUnit]) -> Vec<AssetKind> {
    let mut kinds = Vec::with_capacity(2);
    for unit in units.iter().filter(|u| u.is_combinable()) {
        if !kinds.contains(&unit.kind()) {
            kinds.push(unit.kind());
        }
    }
    kinds
}

fn combine_kind(
    kind: AssetKind,
    members: &[&AssetUnit],
    ctx: &RenderContext<'_>,
) -> Result<String, AssetError> {
    let roots = ctx.roots.for_kind(kind);
    let pairs: Vec<(&str, &str)> = members.iter().map(|u| (u.basename(), u.version())).collect();
    let name = combined_name(&pairs, kind);
    let location = Location::cache(&name);
    let path = location.path(roots);
    let sources: Vec<PathBuf> = members.iter().map(|u| u.source_path(ctx.roots)).collect();

    with_path_lock(&path, || -> Result<(), AssetError> {
        if ctx.policy.is_fresh(&path, &sources) {
            debug!("combine"; "reused {}", name);
            return Ok(());
        }

        let mut out = Vec::new();
        for (index, (unit, source)) in members.iter().zip(&sources).enumerate() {
            let bytes = fs::read(source).map_err(AssetError::read(source))?;
            let transformed = ctx
                .transformer
                .transform(&bytes, kind, &unit.transform_options(ctx.roots))
                .map_err(|e| AssetError::Transform(source.clone(), e))?;
            if index > 0 {
                out.extend_from_slice(kind.separator().as_bytes());
            }
            out.extend_from_slice(&transformed);
        }

        atomic_write(&path, &out).map_err(AssetError::write(&path))?;
        ctx.policy
            .record(&path, &sources)
            .map_err(AssetError::write(&path))?;
        log!("combine"; "{} ({} files)", name, members.len());
        Ok(())
    })?;

    ctx.emitted.insert(&path);
    let basenames: Vec<&str> = pairs.iter().map(|(basename, _)| *basename).collect();
    match combined_pattern(&basenames, kind) {
        Ok(pattern) => {
            ctx.collector.collect(&roots.cache.dir, &pattern, ctx.emitted);
        }
        Err(e) => debug!("clean"; "no pattern for {}: {}", name, e),
    }

    Ok(tag(kind, &location.href(roots), &[]))
}
