#![allow(clippy::module_inception)]

use std::rc::Rc;

pub mod ast;
pub mod config;
pub mod errors;
pub mod type_checker;

#[derive(Debug, Clone, PartialEq)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn null() -> Self {
        Span {
            start: Position::null(),
            end: Position::null(),
        }
    }
}

/// Finds the line holding the byte offset `position`.
///
/// Returns the 1-based line number, the line text and the offset of
/// `position` inside that line, or `None` when the offset lies past the end.
pub fn get_line_at_position(content: &str, position: u32) -> Option<(usize, String, usize)> {
    let pos = position as usize;

    if pos >= content.len() {
        return None;
    }

    let mut start = 0;
    let mut line_number = 1;

    for line in content.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            let line_pos = pos - start;
            return Some((line_number, line.to_string(), line_pos));
        }

        start = end;
        line_number += 1;
    }

    None
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let start = string.chars().take_while(|c| *c == ' ').count();

    (String::from(&string[start..]), start)
}

/// Renders a single source line with a caret under `line_pos`.
///
/// ```text
///    |
/// 20 | let a = #;
///    | --------^
/// ```
pub(crate) fn render_source_line(line: usize, line_text: &str, line_pos: usize) -> String {
    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(line_text);
    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;

    format!(
        "{:>padding$}\n{} | {}\n{:>padding$} {:->arrows$}",
        "|",
        line_string,
        line_text_removed.trim(),
        "|",
        "^"
    )
}
