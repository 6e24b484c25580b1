//! Response Formatter
//!
//! Model replies are shown as HTML. A reply that looks tabular (contains a
//! `|` and a `---`) has its markdown tables turned into `<table>` markup;
//! anything else is escaped wholesale. The tabular check is purely
//! lexical, so a stray pipe and dash run will still select table rendering.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyKind {
    Table,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedReply {
    pub kind: ReplyKind,
    pub html: String,
}

/// Heuristic markdown-table detector
pub fn looks_tabular(text: &str) -> bool {
    text.contains('|') && text.contains("---")
}

pub fn format_reply(text: &str) -> FormattedReply {
    if looks_tabular(text) {
        FormattedReply {
            kind: ReplyKind::Table,
            html: format!(
                "<div style='overflow-x: auto;'>{}</div>",
                markdown_tables_to_html(text)
            ),
        }
    } else {
        FormattedReply {
            kind: ReplyKind::Text,
            html: escape_html(text),
        }
    }
}

/// Escape `& < > " '` for safe display.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Default,
    Left,
    Center,
    Right,
}

impl Align {
    fn style(&self) -> &'static str {
        match self {
            Align::Default => "",
            Align::Left => " style=\"text-align: left;\"",
            Align::Center => " style=\"text-align: center;\"",
            Align::Right => " style=\"text-align: right;\"",
        }
    }
}

/// Cells of one table row. `\|` is a literal pipe inside a cell.
fn split_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = trimmed.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                cell.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut cell)),
            _ => cell.push(c),
        }
    }
    // A closing pipe ends the last cell rather than opening an empty one.
    if !trimmed.ends_with('|') || trimmed.ends_with("\\|") {
        cells.push(cell);
    }
    cells.into_iter().map(|cell| cell.trim().to_string()).collect()
}

/// Parse a delimiter row such as `|:---|---:|`. Every cell needs at least
/// three dashes.
fn parse_delimiter(line: &str) -> Option<Vec<Align>> {
    if !line.contains('|') {
        return None;
    }
    split_row(line)
        .iter()
        .map(|cell| {
            let left = cell.starts_with(':');
            let right = cell.ends_with(':');
            let dashes = cell.trim_start_matches(':').trim_end_matches(':');
            if dashes.len() < 3 || !dashes.chars().all(|c| c == '-') {
                return None;
            }
            Some(match (left, right) {
                (true, true) => Align::Center,
                (true, false) => Align::Left,
                (false, true) => Align::Right,
                (false, false) => Align::Default,
            })
        })
        .collect()
}

fn is_row(line: &str) -> bool {
    !line.trim().is_empty() && line.contains('|')
}

fn render_table(header: &[String], aligns: &[Align], body: &[Vec<String>]) -> String {
    let cell = |tag: &str, idx: usize, text: &str| {
        let align = aligns.get(idx).copied().unwrap_or(Align::Default);
        format!("<{tag}{}>{}</{tag}>", align.style(), escape_html(text))
    };

    let mut html = String::from("<table>\n<thead>\n<tr>\n");
    for (idx, text) in header.iter().enumerate() {
        html.push_str(&cell("th", idx, text));
        html.push('\n');
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");
    for row in body {
        html.push_str("<tr>\n");
        // Rows are cut or padded to the header width.
        for idx in 0..header.len() {
            let text = row.get(idx).map(String::as_str).unwrap_or("");
            html.push_str(&cell("td", idx, text));
            html.push('\n');
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>");
    html
}

fn render_paragraph(lines: &[&str]) -> String {
    let text = lines
        .iter()
        .map(|line| escape_html(line.trim()))
        .collect::<Vec<_>>()
        .join("\n");
    format!("<p>{}</p>", text)
}

/// Convert markdown table blocks to HTML tables and every other non-blank
/// block to an escaped paragraph.
pub fn markdown_tables_to_html(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut blocks: Vec<String> = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        let delimiter = if is_row(line) {
            lines.get(i + 1).and_then(|next| parse_delimiter(next))
        } else {
            None
        };

        if let Some(aligns) = delimiter {
            if !paragraph.is_empty() {
                blocks.push(render_paragraph(&paragraph));
                paragraph.clear();
            }

            let header = split_row(line);
            let mut body = Vec::new();
            i += 2;
            while i < lines.len() && is_row(lines[i]) {
                body.push(split_row(lines[i]));
                i += 1;
            }
            blocks.push(render_table(&header, &aligns, &body));
            continue;
        }

        if line.trim().is_empty() {
            if !paragraph.is_empty() {
                blocks.push(render_paragraph(&paragraph));
                paragraph.clear();
            }
        } else {
            paragraph.push(line);
        }
        i += 1;
    }

    if !paragraph.is_empty() {
        blocks.push(render_paragraph(&paragraph));
    }

    blocks.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_table_becomes_html_table() {
        let reply = format_reply("| a | b |\n|---|---|\n| 1 | 2 |");
        assert_eq!(reply.kind, ReplyKind::Table);
        assert!(reply.html.starts_with("<div style='overflow-x: auto;'>"));
        assert!(reply.html.contains("<table>"));
        assert!(reply.html.contains("<th>a</th>"));
        assert!(reply.html.contains("<th>b</th>"));
        assert!(reply.html.contains("<td>1</td>"));
        assert!(reply.html.contains("<td>2</td>"));
        assert!(reply.html.ends_with("</div>"));
    }

    #[test]
    fn test_plain_reply_is_escaped() {
        let reply = format_reply("Use <b>bold</b> & \"quotes\" isn't it");
        assert_eq!(reply.kind, ReplyKind::Text);
        assert_eq!(
            reply.html,
            "Use &lt;b&gt;bold&lt;/b&gt; &amp; &quot;quotes&quot; isn&#x27;t it"
        );
    }

    #[test]
    fn test_pipe_without_dashes_is_text() {
        let reply = format_reply("a | b");
        assert_eq!(reply.kind, ReplyKind::Text);
        assert_eq!(reply.html, "a | b");
    }

    #[test]
    fn test_false_positive_still_renders_as_table_kind() {
        let reply = format_reply("Use a | b --- not a table <here>");
        assert_eq!(reply.kind, ReplyKind::Table);
        assert!(!reply.html.contains("<table>"));
        assert!(reply.html.contains("&lt;here&gt;"));
    }

    #[test]
    fn test_surrounding_prose_and_alignment() {
        let text = "Here are the totals:\n\n| Item | Qty |\n|:----|----:|\n| chai | 2 |\n| <b>vada</b> | 3 |\n\nTotal five.";
        let html = markdown_tables_to_html(text);

        assert!(html.starts_with("<p>Here are the totals:</p>"));
        assert!(html.contains("<th style=\"text-align: left;\">Item</th>"));
        assert!(html.contains("<th style=\"text-align: right;\">Qty</th>"));
        assert!(html.contains("<td style=\"text-align: left;\">&lt;b&gt;vada&lt;/b&gt;</td>"));
        assert!(html.ends_with("<p>Total five.</p>"));
        assert_eq!(html.matches("<tr>").count(), 3);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let html = markdown_tables_to_html("| a | b | c |\n| --- | --- | --- |\n| 1 |");
        assert_eq!(html.matches("<td>").count(), 3);
    }

    #[test]
    fn test_two_dash_delimiter_is_not_a_table() {
        assert!(parse_delimiter("|--|--|").is_none());
        assert_eq!(
            parse_delimiter("| :---: | --- |"),
            Some(vec![Align::Center, Align::Default])
        );
    }

    #[test]
    fn test_escaped_pipe_stays_in_its_cell() {
        let html = markdown_tables_to_html("| a | b |\n|---|---|\n| 1 \\| 2 | 3 |");
        assert!(html.contains("<td>1 | 2</td>"));
        assert!(html.contains("<td>3</td>"));
        assert_eq!(html.matches("<td>").count(), 2);

        assert_eq!(split_row("| x | y \\|"), ["x", "y |"]);
        assert_eq!(split_row("| x | y |"), ["x", "y"]);
    }
}
