//! Final document assembly by literal marker substitution.

use std::path::PathBuf;

const DEFAULT_TEMPLATE: &str = include_str!("../../assets/template.html");
const STYLESHEET: &str = include_str!("../../assets/diffpage.css");
const UI_SCRIPT: &str = include_str!("../../assets/diffpage-ui.js");

/// Marker replaced with the inlined stylesheet.
pub const CSS_MARKER: &str = "<!--diffpage-css-->";
/// Marker replaced with the inlined UI script.
pub const JS_MARKER: &str = "<!--diffpage-js-ui-->";
/// Marker replaced with the file list toggle statement.
pub const FILE_LIST_MARKER: &str = "//diffpage-file-list";
/// Marker replaced with the synchronised scroll statement.
pub const SYNC_SCROLL_MARKER: &str = "//diffpage-sync-scroll";
/// Marker replaced with the rendered diff fragment.
pub const DIFF_MARKER: &str = "<!--diffpage-diff-->";

/// Where the wrapper template text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// The template compiled into the binary.
    Bundled,
    /// A user-supplied template file, validated to exist.
    File(PathBuf),
}

/// The template compiled into the binary.
#[must_use]
pub fn default_template() -> &'static str {
    DEFAULT_TEMPLATE
}

/// Substitute the five markers in `template`, each at most once.
///
/// Substitution is literal string replacement with no placeholder syntax.
/// Markers absent from a custom template are simply left out. The diff
/// body goes in last so its content can never feed the other
/// substitutions, and the bundled payloads contain no marker text, so
/// assembling an already-assembled document changes nothing.
#[must_use]
pub fn assemble(
    template: &str,
    diff_body: &str,
    show_files_open: bool,
    synchronised_scroll: bool,
) -> String {
    template
        .replacen(
            CSS_MARKER,
            &format!("<style>\n{}\n</style>", STYLESHEET),
            1,
        )
        .replacen(
            JS_MARKER,
            &format!("<script>\n{}\n</script>", UI_SCRIPT),
            1,
        )
        .replacen(
            FILE_LIST_MARKER,
            &format!("diffpageUi.fileListCloseable(\"#diff\", {});", show_files_open),
            1,
        )
        .replacen(
            SYNC_SCROLL_MARKER,
            &format!(
                "diffpageUi.synchronisedScroll(\"#diff\", {});",
                synchronised_scroll
            ),
            1,
        )
        .replacen(DIFF_MARKER, diff_body, 1)
}
