//! End-to-end pipeline tests on the public API, no git involved.

use diffpage::core::{resolve, DiffInput, RawDiff};
use diffpage::render::{json_model, render, RenderError, RenderOptions};

const SAMPLE_DIFF: &str = "\
diff --git a/src/app.rs b/src/app.rs
index 1111111..2222222 100644
--- a/src/app.rs
+++ b/src/app.rs
@@ -1,3 +1,3 @@
 fn start() {
-    boot_slow();
+    boot_fast();
 }
diff --git a/README.md b/README.md
index 3333333..4444444 100644
--- a/README.md
+++ b/README.md
@@ -1 +1,2 @@
 # App
+Now faster.
";

fn write_diff_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("changes.diff");
    std::fs::write(&path, SAMPLE_DIFF).unwrap();
    path
}

#[test]
fn file_input_to_json_is_the_serialized_model() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_diff_file(&dir);

    let raw = resolve(&DiffInput::File(path)).unwrap();
    let options = RenderOptions {
        format: "json".to_string(),
        ..RenderOptions::default()
    };
    let output = render(&options, &raw).unwrap();

    assert_eq!(output, serde_json::to_string(&json_model(&raw)).unwrap());

    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 2);
    assert_eq!(value[0]["newPath"], "src/app.rs");
    assert_eq!(value[1]["newPath"], "README.md");
    assert_eq!(value[1]["additions"], 1);
}

#[test]
fn side_by_side_with_hidden_summary_renders_as_asked() {
    let raw = RawDiff::new(SAMPLE_DIFF);
    let options = RenderOptions {
        style: "side".to_string(),
        summary: "hidden".to_string(),
        ..RenderOptions::default()
    };
    let page = render(&options, &raw).unwrap();

    assert!(page.contains("dp-split-view"));
    assert!(!page.contains("dp-file-list"));
    // A complete page: no marker survives assembly.
    assert!(!page.contains("<!--diffpage-"));
    assert!(!page.contains("//diffpage-"));
}

#[test]
fn default_page_inlines_styles_and_script() {
    let page = render(&RenderOptions::default(), &RawDiff::new(SAMPLE_DIFF)).unwrap();

    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("<style>"));
    assert!(page.contains("dp-wrapper"));
    assert!(page.contains("diffpageUi.fileListCloseable(\"#diff\", false);"));
    assert!(page.contains("diffpageUi.synchronisedScroll(\"#diff\", false);"));
}

#[test]
fn open_summary_and_sync_scroll_reach_the_page() {
    let options = RenderOptions {
        style: "side".to_string(),
        summary: "open".to_string(),
        sync_scroll: "enabled".to_string(),
        ..RenderOptions::default()
    };
    let page = render(&options, &RawDiff::new(SAMPLE_DIFF)).unwrap();

    assert!(page.contains("<details class=\"dp-file-list\" open>"));
    assert!(page.contains("diffpageUi.fileListCloseable(\"#diff\", true);"));
    assert!(page.contains("diffpageUi.synchronisedScroll(\"#diff\", true);"));
}

#[test]
fn custom_template_wraps_the_fragment() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("minimal.html");
    std::fs::write(
        &template,
        "<html><head><!--diffpage-css--></head><body><!--diffpage-diff--></body></html>",
    )
    .unwrap();

    let options = RenderOptions {
        template: Some(template),
        ..RenderOptions::default()
    };
    let page = render(&options, &RawDiff::new(SAMPLE_DIFF)).unwrap();

    assert!(page.contains("<style>"));
    assert!(page.contains("dp-wrapper"));
    // Markers this template never had are not required.
    assert!(!page.contains("<script>\n"));
}

#[test]
fn missing_template_fails_before_rendering() {
    let options = RenderOptions {
        template: Some(std::path::PathBuf::from("/definitely/not/here.html")),
        ..RenderOptions::default()
    };
    let err = render(&options, &RawDiff::new(SAMPLE_DIFF)).unwrap_err();
    assert!(matches!(err, RenderError::TemplateNotFound(_)));
    assert!(err.to_string().contains("/definitely/not/here.html"));
}

#[test]
fn unknown_format_is_a_terminal_error() {
    let options = RenderOptions {
        format: "markdown".to_string(),
        ..RenderOptions::default()
    };
    let err = render(&options, &RawDiff::new(SAMPLE_DIFF)).unwrap_err();
    assert!(err.to_string().contains("markdown"));
}

#[test]
fn empty_diff_still_produces_a_complete_page() {
    let page = render(&RenderOptions::default(), &RawDiff::new("")).unwrap();
    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("Files changed (0)"));

    let options = RenderOptions {
        format: "json".to_string(),
        ..RenderOptions::default()
    };
    assert_eq!(render(&options, &RawDiff::new("")).unwrap(), "[]");
}
