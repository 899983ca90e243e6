//! Minification for JS and CSS.
//!
//! Uses oxc for JavaScript and lightningcss for CSS.

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier as OxcMinifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use super::{TransformError, TransformOptions, Transformer, decode, import::inline_imports};
use crate::asset::AssetKind;

/// Default transformer: minifies scripts and stylesheets, inlining stylesheet
/// imports first.
#[derive(Debug, Default, Clone, Copy)]
pub struct Minifier;

impl Transformer for Minifier {
    fn transform(
        &self,
        input: &[u8],
        kind: AssetKind,
        options: &TransformOptions,
    ) -> Result<Vec<u8>, TransformError> {
        let source = decode(input)?;
        let code = match kind {
            AssetKind::Script => minify_js(source)?,
            AssetKind::Style => minify_css(&inline_imports(source, options))?,
        };
        Ok(code.into_bytes())
    }
}

/// Minify JavaScript source code.
///
/// Parsed as a classic script: top-level bindings are globals shared between
/// the members of a combined artifact, so they are never mangled.
pub fn minify_js(source: &str) -> Result<String, TransformError> {
    let allocator = Allocator::default();
    let source_type = SourceType::mjs().with_module(false);
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        let message = ret
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(TransformError::Script(message));
    }

    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = OxcMinifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

/// Minify CSS source code.
pub fn minify_css(source: &str) -> Result<String, TransformError> {
    let mut stylesheet = StyleSheet::parse(source, ParserOptions::default())
        .map_err(|e| TransformError::Style(e.to_string()))?;
    stylesheet
        .minify(MinifyOptions::default())
        .map_err(|e| TransformError::Style(e.to_string()))?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| TransformError::Style(e.to_string()))?;
    Ok(result.code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_minify_js() {
        let source = "function greet(name) {\n    // say hi\n    return 'Hello, ' + name;\n}\n";
        let minified = minify_js(source).unwrap();
        assert!(minified.len() < source.len());
        assert!(!minified.contains("say hi"));
        assert!(minified.contains("greet"));
    }

    #[test]
    fn test_minify_js_rejects_invalid() {
        assert!(matches!(
            minify_js("function (").unwrap_err(),
            TransformError::Script(_)
        ));
    }

    #[test]
    fn test_minify_css() {
        let source = "body {\n    margin: 0px;\n    color: #ff0000;\n}\n";
        let minified = minify_css(source).unwrap();
        assert!(minified.len() < source.len());
        assert!(minified.starts_with("body{"));
    }

    #[test]
    fn test_minify_css_rejects_invalid() {
        assert!(matches!(
            minify_css("a[ { color: red }").unwrap_err(),
            TransformError::Style(_)
        ));
    }

    #[test]
    fn test_minifier_inlines_imports() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("reset.css"), "p { margin: 0 }").unwrap();
        let options = TransformOptions {
            origin: dir.path().join("site.css"),
            import_root: dir.path().to_path_buf(),
        };

        let out = Minifier
            .transform(b"@import url(\"reset.css\");\na { color: red }", AssetKind::Style, &options)
            .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("p{margin:0}"));
        assert!(!out.contains("@import"));
    }

    #[test]
    fn test_minifier_rejects_non_utf8() {
        let err = Minifier
            .transform(&[0xff, 0xfe], AssetKind::Script, &TransformOptions::default())
            .unwrap_err();
        assert!(matches!(err, TransformError::Encoding(_)));
    }
}
