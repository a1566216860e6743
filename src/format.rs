//! Rounded boxes for terminal output
//!
//! ```text
//!
//!  ╭─ title ──────╮
//!  │              │
//!  │ hello        │
//!  │              │
//!  ╰──────────────╯
//!
//! ```
use console::measure_text_width;

const PADDING_X: usize = 1;
const PADDING_Y: usize = 1;
const MARGIN: &str = " ";

const TOP_LEFT: char = '╭';
const TOP_RIGHT: char = '╮';
const BOTTOM_LEFT: char = '╰';
const BOTTOM_RIGHT: char = '╯';
const HORIZONTAL: char = '─';
const VERTICAL: char = '│';

/// Wrap `text` in a rounded border.
pub fn format(text: &str) -> String {
    render(text, None)
}

/// Wrap `text` in a rounded border with `title` set into the top edge.
pub fn format_titled(text: &str, title: &str) -> String {
    render(text, Some(title))
}

fn render(text: &str, title: Option<&str>) -> String {
    let lines: Vec<&str> = if text.is_empty() {
        vec![""]
    } else {
        text.lines().collect()
    };

    let content_width = lines
        .iter()
        .map(|line| measure_text_width(line))
        .max()
        .unwrap_or(0);
    // "─ title ─" needs the title plus two spaces and a dash either side
    let title_width = title.map(|t| measure_text_width(t) + 4).unwrap_or(0);
    let inner_width = (content_width + 2 * PADDING_X).max(title_width);

    let mut out = String::from("\n");

    out.push_str(MARGIN);
    out.push(TOP_LEFT);
    match title {
        Some(title) => {
            let label = format!("{} {} ", HORIZONTAL, title);
            out.push_str(&label);
            out.push_str(&horizontal(inner_width - measure_text_width(&label)));
        }
        None => out.push_str(&horizontal(inner_width)),
    }
    out.push(TOP_RIGHT);
    out.push('\n');

    let blank = " ".repeat(inner_width);
    for _ in 0..PADDING_Y {
        push_row(&mut out, &blank);
    }
    for line in &lines {
        let fill = inner_width - PADDING_X - measure_text_width(line);
        let row = format!("{}{}{}", " ".repeat(PADDING_X), line, " ".repeat(fill));
        push_row(&mut out, &row);
    }
    for _ in 0..PADDING_Y {
        push_row(&mut out, &blank);
    }

    out.push_str(MARGIN);
    out.push(BOTTOM_LEFT);
    out.push_str(&horizontal(inner_width));
    out.push(BOTTOM_RIGHT);
    out.push('\n');

    out
}

fn push_row(out: &mut String, row: &str) {
    out.push_str(MARGIN);
    out.push(VERTICAL);
    out.push_str(row);
    out.push(VERTICAL);
    out.push('\n');
}

fn horizontal(width: usize) -> String {
    HORIZONTAL.to_string().repeat(width)
}
