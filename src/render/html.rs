//! HTML fragment rendering of the diff model.

use similar::{ChangeTag, TextDiff};

use crate::render::{DiffLine, DiffModel, FileDiff, Hunk, LayoutStyle, LineKind, RenderConfig};

/// Render the diff model as an HTML fragment.
///
/// The fragment carries only `dp-` prefixed classes and is styled by the
/// stylesheet injected during document assembly. All file content is
/// escaped, so the fragment can never introduce markup of its own.
#[must_use]
pub fn pretty_html(model: &DiffModel, config: &RenderConfig) -> String {
    let mut out = String::new();
    out.push_str("<div class=\"dp-wrapper\">\n");
    if config.show_files {
        render_file_list(&mut out, model, config.show_files_open);
    }
    for (idx, file) in model.files.iter().enumerate() {
        match config.output_format {
            LayoutStyle::LineByLine => render_file_unified(&mut out, idx, file, config),
            LayoutStyle::SideBySide => render_file_split(&mut out, idx, file, config),
        }
    }
    out.push_str("</div>\n");
    out
}

fn render_file_list(out: &mut String, model: &DiffModel, open: bool) {
    out.push_str(if open {
        "<details class=\"dp-file-list\" open>\n"
    } else {
        "<details class=\"dp-file-list\">\n"
    });
    out.push_str(&format!(
        "<summary>Files changed ({}) <span class=\"dp-added\">+{}</span> <span class=\"dp-deleted\">-{}</span></summary>\n<ul>\n",
        model.files.len(),
        model.additions(),
        model.deletions()
    ));
    for (idx, file) in model.files.iter().enumerate() {
        out.push_str(&format!(
            "<li><a href=\"#dp-file-{}\">{}</a> <span class=\"dp-added\">+{}</span> <span class=\"dp-deleted\">-{}</span></li>\n",
            idx,
            escape_html(&file.display_name()),
            file.additions,
            file.deletions
        ));
    }
    out.push_str("</ul>\n</details>\n");
}

fn render_file_header(out: &mut String, idx: usize, file: &FileDiff, split: bool) {
    let class = if split { "dp-file dp-split" } else { "dp-file" };
    out.push_str(&format!(
        "<div class=\"{}\" id=\"dp-file-{}\">\n",
        class, idx
    ));
    out.push_str(&format!(
        "<div class=\"dp-file-header\"><span class=\"dp-file-name\">{}</span><span class=\"dp-file-stats\"><span class=\"dp-added\">+{}</span> <span class=\"dp-deleted\">-{}</span></span></div>\n",
        escape_html(&file.display_name()),
        file.additions,
        file.deletions
    ));
}

/// Notice shown instead of hunks for files with nothing to render.
fn placeholder_notice(file: &FileDiff) -> Option<&'static str> {
    if file.is_binary {
        Some("Binary file (no preview)")
    } else if file.hunks.is_empty() {
        Some("No visible content changes")
    } else {
        None
    }
}

fn render_file_unified(out: &mut String, idx: usize, file: &FileDiff, config: &RenderConfig) {
    render_file_header(out, idx, file, false);
    out.push_str("<table class=\"dp-diff-table\">\n<tbody>\n");
    if let Some(notice) = placeholder_notice(file) {
        out.push_str(&format!(
            "<tr class=\"dp-meta\"><td class=\"dp-num\"></td><td class=\"dp-num\"></td><td class=\"dp-code\">{}</td></tr>\n",
            notice
        ));
    } else {
        for hunk in &file.hunks {
            render_hunk_unified(out, hunk, config);
        }
    }
    out.push_str("</tbody>\n</table>\n</div>\n");
}

fn render_hunk_unified(out: &mut String, hunk: &Hunk, config: &RenderConfig) {
    out.push_str(&format!(
        "<tr class=\"dp-hunk\"><td class=\"dp-num\"></td><td class=\"dp-num\"></td><td class=\"dp-code\">{}</td></tr>\n",
        escape_html(&hunk.header)
    ));

    let lines = &hunk.lines;
    let mut i = 0;
    while i < lines.len() {
        let line = &lines[i];
        match line.kind {
            LineKind::Context => {
                if line.old_number.is_none() && line.new_number.is_none() {
                    out.push_str(&format!(
                        "<tr class=\"dp-meta\"><td class=\"dp-num\"></td><td class=\"dp-num\"></td><td class=\"dp-code\">{}</td></tr>\n",
                        escape_html(&line.content)
                    ));
                } else {
                    unified_row(out, "dp-ctx", line, ' ', &escape_html(&line.content));
                }
                i += 1;
            }
            LineKind::Delete | LineKind::Insert => {
                // Collect the whole run of consecutive changes, then emit
                // deletes before inserts with paired highlighting.
                let mut deletes: Vec<&DiffLine> = Vec::new();
                let mut inserts: Vec<&DiffLine> = Vec::new();
                while i < lines.len() {
                    match lines[i].kind {
                        LineKind::Delete => deletes.push(&lines[i]),
                        LineKind::Insert => inserts.push(&lines[i]),
                        LineKind::Context => break,
                    }
                    i += 1;
                }

                let pairs = highlighted_pairs(&deletes, &inserts, config);
                for (j, del) in deletes.iter().enumerate() {
                    let body = pairs
                        .get(j)
                        .map_or_else(|| escape_html(&del.content), |p| p.0.clone());
                    unified_row(out, "dp-del", del, '-', &body);
                }
                for (j, ins) in inserts.iter().enumerate() {
                    let body = pairs
                        .get(j)
                        .map_or_else(|| escape_html(&ins.content), |p| p.1.clone());
                    unified_row(out, "dp-ins", ins, '+', &body);
                }
            }
        }
    }
}

fn unified_row(out: &mut String, class: &str, line: &DiffLine, sign: char, body: &str) {
    out.push_str(&format!(
        "<tr class=\"{}\"><td class=\"dp-num\">{}</td><td class=\"dp-num\">{}</td><td class=\"dp-code\">{}{}</td></tr>\n",
        class,
        number_cell(line.old_number),
        number_cell(line.new_number),
        sign,
        body
    ));
}

fn render_file_split(out: &mut String, idx: usize, file: &FileDiff, config: &RenderConfig) {
    render_file_header(out, idx, file, true);

    if let Some(notice) = placeholder_notice(file) {
        out.push_str(&format!(
            "<div class=\"dp-split-view\"><div class=\"dp-side\"><table class=\"dp-diff-table\">\n<tbody>\n<tr class=\"dp-meta\"><td class=\"dp-num\"></td><td class=\"dp-code\">{}</td></tr>\n</tbody>\n</table></div></div>\n</div>\n",
            notice
        ));
        return;
    }

    let mut left = String::new();
    let mut right = String::new();
    for hunk in &file.hunks {
        render_hunk_split(&mut left, &mut right, hunk, config);
    }

    out.push_str("<div class=\"dp-split-view\">\n");
    out.push_str(&format!(
        "<div class=\"dp-side\"><table class=\"dp-diff-table\">\n<tbody>\n{}</tbody>\n</table></div>\n",
        left
    ));
    out.push_str(&format!(
        "<div class=\"dp-side\"><table class=\"dp-diff-table\">\n<tbody>\n{}</tbody>\n</table></div>\n",
        right
    ));
    out.push_str("</div>\n</div>\n");
}

/// Emit one hunk into the two side buffers. Both sides always receive the
/// same number of rows so they stay visually aligned.
fn render_hunk_split(left: &mut String, right: &mut String, hunk: &Hunk, config: &RenderConfig) {
    let hunk_row = format!(
        "<tr class=\"dp-hunk\"><td class=\"dp-num\"></td><td class=\"dp-code\">{}</td></tr>\n",
        escape_html(&hunk.header)
    );
    left.push_str(&hunk_row);
    right.push_str(&hunk_row);

    let lines = &hunk.lines;
    let mut i = 0;
    while i < lines.len() {
        let line = &lines[i];
        match line.kind {
            LineKind::Context => {
                if line.old_number.is_none() && line.new_number.is_none() {
                    let row = format!(
                        "<tr class=\"dp-meta\"><td class=\"dp-num\"></td><td class=\"dp-code\">{}</td></tr>\n",
                        escape_html(&line.content)
                    );
                    left.push_str(&row);
                    right.push_str(&row);
                } else {
                    let body = escape_html(&line.content);
                    left.push_str(&split_row("dp-ctx", line.old_number, &body));
                    right.push_str(&split_row("dp-ctx", line.new_number, &body));
                }
                i += 1;
            }
            LineKind::Delete | LineKind::Insert => {
                let mut deletes: Vec<&DiffLine> = Vec::new();
                let mut inserts: Vec<&DiffLine> = Vec::new();
                while i < lines.len() {
                    match lines[i].kind {
                        LineKind::Delete => deletes.push(&lines[i]),
                        LineKind::Insert => inserts.push(&lines[i]),
                        LineKind::Context => break,
                    }
                    i += 1;
                }

                let pairs = highlighted_pairs(&deletes, &inserts, config);
                for j in 0..deletes.len().max(inserts.len()) {
                    match deletes.get(j) {
                        Some(del) => {
                            let body = pairs
                                .get(j)
                                .map_or_else(|| escape_html(&del.content), |p| p.0.clone());
                            left.push_str(&split_row("dp-del", del.old_number, &body));
                        }
                        None => left.push_str(EMPTY_SPLIT_ROW),
                    }
                    match inserts.get(j) {
                        Some(ins) => {
                            let body = pairs
                                .get(j)
                                .map_or_else(|| escape_html(&ins.content), |p| p.1.clone());
                            right.push_str(&split_row("dp-ins", ins.new_number, &body));
                        }
                        None => right.push_str(EMPTY_SPLIT_ROW),
                    }
                }
            }
        }
    }
}

const EMPTY_SPLIT_ROW: &str =
    "<tr class=\"dp-empty\"><td class=\"dp-num\"></td><td class=\"dp-code\"></td></tr>\n";

fn split_row(class: &str, number: Option<usize>, body: &str) -> String {
    format!(
        "<tr class=\"{}\"><td class=\"dp-num\">{}</td><td class=\"dp-code\">{}</td></tr>\n",
        class,
        number_cell(number),
        body
    )
}

fn number_cell(number: Option<usize>) -> String {
    number.map(|n| n.to_string()).unwrap_or_default()
}

/// Intra-line markup for positionally paired delete/insert lines. Empty
/// when the configured granularity is whole lines.
fn highlighted_pairs(
    deletes: &[&DiffLine],
    inserts: &[&DiffLine],
    config: &RenderConfig,
) -> Vec<(String, String)> {
    if !config.word_by_word && !config.char_by_char {
        return Vec::new();
    }
    deletes
        .iter()
        .zip(inserts.iter())
        .map(|(del, ins)| inline_highlight(&del.content, &ins.content, config))
        .collect()
}

/// Diff a paired line at the configured granularity, wrapping changed
/// tokens in `<del>` on the old side and `<ins>` on the new side.
fn inline_highlight(old: &str, new: &str, config: &RenderConfig) -> (String, String) {
    let diff = if config.char_by_char {
        TextDiff::from_graphemes(old, new)
    } else {
        TextDiff::from_unicode_words(old, new)
    };

    let mut old_html = String::new();
    let mut new_html = String::new();
    for change in diff.iter_all_changes() {
        let token = escape_html(change.value());
        match change.tag() {
            ChangeTag::Equal => {
                old_html.push_str(&token);
                new_html.push_str(&token);
            }
            ChangeTag::Delete => {
                old_html.push_str("<del>");
                old_html.push_str(&token);
                old_html.push_str("</del>");
            }
            ChangeTag::Insert => {
                new_html.push_str("<ins>");
                new_html.push_str(&token);
                new_html.push_str("</ins>");
            }
        }
    }
    (old_html, new_html)
}

/// Escape text for use in HTML element content and attribute values.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
