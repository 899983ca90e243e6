//! `vanish render`: generate artifacts and print their markup.

use anyhow::{Context, Result};

use super::RenderArgs;
use crate::config::VanishConfig;
use crate::pipeline::{RenderTarget, Rendered};
use crate::{debug, log};

/// Render the selected groups and return what is printed to stdout.
pub fn render(args: &RenderArgs, config: &VanishConfig) -> Result<String> {
    let mut pipeline = config
        .build_pipeline()
        .context("Failed to build asset pipeline")?;
    if args.debug {
        pipeline.debug_on();
    }
    debug!("render"; "groups: {}", pipeline.group_names().collect::<Vec<_>>().join(", "));

    let target = RenderTarget::from(args.group.clone());
    let single = matches!(target, RenderTarget::Group(_));
    let rendered = pipeline.render(target)?;

    if pipeline.is_debug() {
        log!("render"; "debug mode, referencing sources");
    }

    if args.json {
        Ok(serde_json::to_string_pretty(&rendered)?)
    } else {
        Ok(format_plain(&rendered, single))
    }
}

/// Markup as-is for a single group; each group headed by a comment otherwise.
fn format_plain(rendered: &Rendered, single: bool) -> String {
    if single {
        return rendered.iter().map(|(_, markup)| markup).collect();
    }

    let mut out = String::new();
    for (group, markup) in rendered.iter() {
        out.push_str(&format!("<!-- {group} -->\n"));
        out.push_str(markup);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AssetEntry, ModeSetting};
    use std::fs;
    use tempfile::TempDir;

    fn site() -> (TempDir, VanishConfig) {
        let dir = TempDir::new().unwrap();
        let mut config = VanishConfig::default();
        config.scripts.source.dir = dir.path().join("scripts");
        config.styles.source.dir = dir.path().join("styles");
        fs::create_dir_all(&config.scripts.source.dir).unwrap();
        fs::create_dir_all(&config.styles.source.dir).unwrap();
        fs::write(config.scripts.source.dir.join("app.js"), "var app = 1;").unwrap();
        fs::write(config.styles.source.dir.join("site.css"), "a { color: red }").unwrap();

        let mut app = AssetEntry::new("app.js", "3");
        app.mode = ModeSetting::Mode(0);
        app.group = "head".into();
        let mut style = AssetEntry::new("site.css", "1");
        style.mode = ModeSetting::Mode(0);
        config.assets = vec![app, style];
        (dir, config)
    }

    fn args(group: Option<&str>, json: bool) -> RenderArgs {
        RenderArgs {
            group: group.map(String::from),
            debug: false,
            json,
        }
    }

    #[test]
    fn test_render_single_group_plain() {
        let (_dir, config) = site();
        let out = render(&args(Some("HEAD"), false), &config).unwrap();
        assert_eq!(
            out,
            "<script type=\"text/javascript\" src=\"/scripts/app.js\"></script>\n"
        );
    }

    #[test]
    fn test_render_all_groups_plain() {
        let (_dir, config) = site();
        let out = render(&args(None, false), &config).unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "<!-- head -->");
        assert!(lines[1].contains("/scripts/app.js"));
        assert_eq!(lines[2], "<!-- default -->");
        assert!(lines[3].contains("/styles/site.css"));
    }

    #[test]
    fn test_render_json_keeps_group_order() {
        let (_dir, config) = site();
        let out = render(&args(None, true), &config).unwrap();

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["head", "default"]);
    }

    #[test]
    fn test_render_debug_flag() {
        let (dir, mut config) = site();
        config.assets[0].mode = ModeSetting::Mode(7);
        let mut args = args(Some("head"), false);
        args.debug = true;

        let out = render(&args, &config).unwrap();

        assert!(out.contains("/scripts/app.js"));
        assert!(!dir.path().join("scripts/cache").exists());
    }

    #[test]
    fn test_render_unknown_group() {
        let (_dir, config) = site();
        let err = render(&args(Some("footer"), false), &config).unwrap_err();
        assert!(err.to_string().contains("footer"));
    }
}
