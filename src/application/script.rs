//! Line-oriented edit scripts.
//!
//! ```text
//! # comment
//! add <parent-id> <group|rule>
//! modify <node-id> <field> [value ...]
//! remove <node-id>
//! ```
//!
//! The value of `modify` is the rest of the line and may be empty or
//! contain spaces.

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::NodeKind;

/// One mutation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { parent_id: String, kind: NodeKind },
    Modify {
        node_id: String,
        field: String,
        value: String,
    },
    Remove { node_id: String },
}

pub fn parse_script(text: &str) -> ApplicationResult<Vec<Command>> {
    let mut commands = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if let Some(command) = parse_line(line, i + 1)? {
            commands.push(command);
        }
    }
    Ok(commands)
}

/// Parses a single line; blank lines and `#` comments yield None.
pub fn parse_line(line: &str, line_no: usize) -> ApplicationResult<Option<Command>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let err = |message: String| ApplicationError::Script {
        line: line_no,
        message,
    };

    let (verb, rest) = next_token(trimmed);
    let command = match verb {
        "add" => {
            let (parent_id, rest) = next_token(rest);
            let (kind, rest) = next_token(rest);
            if parent_id.is_empty() || kind.is_empty() {
                return Err(err("usage: add <parent-id> <group|rule>".into()));
            }
            if !rest.is_empty() {
                return Err(err(format!("unexpected trailing input: {}", rest)));
            }
            let kind = kind.parse::<NodeKind>().map_err(|e| err(e.to_string()))?;
            Command::Add {
                parent_id: parent_id.to_string(),
                kind,
            }
        }
        "modify" => {
            let (node_id, rest) = next_token(rest);
            let (field, value) = next_token(rest);
            if node_id.is_empty() || field.is_empty() {
                return Err(err("usage: modify <node-id> <field> [value]".into()));
            }
            Command::Modify {
                node_id: node_id.to_string(),
                field: field.to_string(),
                value: value.to_string(),
            }
        }
        "remove" => {
            let (node_id, rest) = next_token(rest);
            if node_id.is_empty() {
                return Err(err("usage: remove <node-id>".into()));
            }
            if !rest.is_empty() {
                return Err(err(format!("unexpected trailing input: {}", rest)));
            }
            Command::Remove {
                node_id: node_id.to_string(),
            }
        }
        other => return Err(err(format!("unknown command: {}", other))),
    };
    Ok(Some(command))
}

/// Splits off the first whitespace-delimited token.
fn next_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest.trim_start()),
        None => (s, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_value_with_spaces_when_parsing_modify_then_kept_whole() {
        let cmd = parse_line("modify r-0 value twitter twitter", 1).unwrap();
        assert_eq!(
            cmd,
            Some(Command::Modify {
                node_id: "r-0".into(),
                field: "value".into(),
                value: "twitter twitter".into(),
            })
        );
    }

    #[test]
    fn given_modify_without_value_when_parsing_then_empty_value() {
        let cmd = parse_line("modify r-0 operator", 1).unwrap();
        assert!(matches!(cmd, Some(Command::Modify { value, .. }) if value.is_empty()));
    }

    #[test]
    fn given_comment_and_blank_when_parsing_then_skipped() {
        assert_eq!(parse_line("   ", 1).unwrap(), None);
        assert_eq!(parse_line("# add g-0 rule", 2).unwrap(), None);
    }
}
