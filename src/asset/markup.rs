//! Reference tags for rendered artifacts.

use super::AssetKind;
use crate::utils::html::escape_attr;

/// Ordered extra attributes of a reference tag.
pub type Attrs = Vec<(String, String)>;

/// Build the reference tag for `href`, newline-terminated.
///
/// ```text
/// <script type="text/javascript" src="/js/app.js" defer="defer"></script>
/// <link href="/css/site.css" rel="stylesheet" type="text/css" media="screen"/>
/// ```
pub fn tag(kind: AssetKind, href: &str, attrs: &[(String, String)]) -> String {
    let extra = render_attrs(attrs);
    let href = escape_attr(href);
    match kind {
        AssetKind::Script => {
            format!("<script type=\"text/javascript\" src=\"{href}\"{extra}></script>\n")
        }
        AssetKind::Style => {
            format!("<link href=\"{href}\" rel=\"stylesheet\" type=\"text/css\"{extra}/>\n")
        }
    }
}

fn render_attrs(attrs: &[(String, String)]) -> String {
    let mut out = String::new();
    for (name, value) in attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    out
}
