//! Parsers for the solver's bracket-delimited text responses.
//!
//! Every response body (after the `~` frame delimiters are stripped) is a
//! sequence of `[...]` fields or a plain line of text. Parsing is done by
//! tokenizing on the brackets and then splitting each field into a name and
//! a value, so field widths never matter, only their order and names.

use thiserror::Error;

use super::entities::{ActionPath, ActionStrategy, Card, NodeData, PotStacks, RangeEntry, Role, RoleRange};
use crate::net::messages::START_OF_TREE;

/// Reasons a solver response failed to match its expected grammar.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("reply is not valid UTF-8")]
    InvalidUtf8,

    #[error("unknown action: {0:?}")]
    UnknownAction(String),

    #[error("unbalanced brackets")]
    UnbalancedBrackets,

    #[error("text outside of brackets: {0:?}")]
    Unbracketed(String),

    #[error("expected {expected} bracketed segments, found {found}")]
    SegmentCount { expected: usize, found: usize },

    #[error("expected field {expected:?}, found {found:?}")]
    UnexpectedField { expected: &'static str, found: String },

    #[error("missing {0}")]
    MissingField(&'static str),

    #[error("invalid number: {0:?}")]
    InvalidNumber(String),

    #[error("invalid card code: {0:?}")]
    InvalidCard(String),

    #[error("unknown role: {0:?}")]
    UnknownRole(String),

    #[error("invalid range metadata: {0:?}")]
    InvalidMetadata(String),

    #[error("role {0} appears twice")]
    DuplicateRole(Role),

    #[error("{role} declares {declared} hands but lists {found}")]
    HandCountMismatch {
        role: Role,
        declared: usize,
        found: usize,
    },

    #[error("hand {hand} has {found} columns, expected {expected}")]
    ColumnCount {
        hand: String,
        expected: usize,
        found: usize,
    },

    #[error("both roles claim to be next to act")]
    BothActing,

    #[error("neither role claims to be next to act")]
    NoneActing,

    #[error("acting role declares {declared} actions but action data lists {labels}")]
    ActionCountMismatch { declared: usize, labels: usize },
}

pub type Result<T> = std::result::Result<T, ParseError>;

/// Splits `[a][b][c]` into `["a", "b", "c"]`.
///
/// Whitespace between fields is ignored; any other text outside of a field
/// is an error, as are nested or unterminated brackets.
pub fn bracket_fields(text: &str) -> Result<Vec<&str>> {
    let mut fields = Vec::new();
    let mut open: Option<usize> = None;
    let mut outside_start = 0;
    for (i, c) in text.char_indices() {
        match (c, open) {
            ('[', None) => {
                let outside = text[outside_start..i].trim();
                if !outside.is_empty() {
                    return Err(ParseError::Unbracketed(outside.to_string()));
                }
                open = Some(i + 1);
            }
            (']', Some(start)) => {
                fields.push(&text[start..i]);
                open = None;
                outside_start = i + 1;
            }
            ('[', Some(_)) | (']', None) => return Err(ParseError::UnbalancedBrackets),
            _ => {}
        }
    }
    if open.is_some() {
        return Err(ParseError::UnbalancedBrackets);
    }
    let trailing = text[outside_start..].trim();
    if !trailing.is_empty() {
        return Err(ParseError::Unbracketed(trailing.to_string()));
    }
    Ok(fields)
}

/// Returns the value of a `Name: value` field, checking the name.
fn field_value<'a>(field: &'a str, name: &'static str) -> Result<&'a str> {
    match field.split_once(':') {
        Some((key, value)) if key.trim() == name => Ok(value.trim()),
        _ => Err(ParseError::UnexpectedField {
            expected: name,
            found: field.to_string(),
        }),
    }
}

fn parse_number(token: &str) -> Result<f64> {
    token
        .trim()
        .trim_end_matches('%')
        .parse()
        .map_err(|_| ParseError::InvalidNumber(token.to_string()))
}

/// Parses a board value such as `2d2c2h3d3c` into cards, in order.
pub fn parse_board(value: &str) -> Result<Vec<Card>> {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    if !compact.is_ascii() || compact.len() % 2 != 0 {
        return Err(ParseError::InvalidCard(compact));
    }
    compact
        .as_bytes()
        .chunks(2)
        .map(|code| {
            // Chunks of an ASCII string are valid UTF-8.
            std::str::from_utf8(code)
                .map_err(|_| ParseError::InvalidCard(compact.clone()))?
                .parse::<Card>()
        })
        .collect()
}

/// Parses `[header][Pot: N][OOP Stack: N][IP Stack: N]`.
pub fn parse_pot_stacks(text: &str) -> Result<PotStacks> {
    let fields = bracket_fields(text)?;
    let [_header, pot, oop_stack, ip_stack] = fields.as_slice() else {
        return Err(ParseError::SegmentCount {
            expected: 4,
            found: fields.len(),
        });
    };
    Ok(PotStacks {
        pot: parse_number(field_value(pot, "Pot")?)?,
        oop_stack: parse_number(field_value(oop_stack, "OOP Stack")?)?,
        ip_stack: parse_number(field_value(ip_stack, "IP Stack")?)?,
    })
}

/// Parses the reply to `Request action data` into ordered action labels.
///
/// The reply looks like `[Actions: Bet 1,Check]`; everything after the first
/// `: ` is the comma-separated label list.
pub fn parse_action_data(text: &str) -> Result<Vec<String>> {
    let text = text.trim();
    let text = text.strip_suffix(']').unwrap_or(text);
    let (_, labels) = text.split_once(": ").ok_or(ParseError::MissingField("action list"))?;
    Ok(labels
        .split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect())
}

/// Parses the reply to `Request current line`.
pub fn parse_current_line(text: &str) -> ActionPath {
    let text = text.trim();
    if text == START_OF_TREE {
        return ActionPath::root();
    }
    text.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>()
        .into()
}

/// Metadata line of a role block: `OOP, 3 hands[, 2 actions]`.
fn parse_metadata(line: &str) -> Result<(Role, usize, Option<usize>)> {
    let invalid = || ParseError::InvalidMetadata(line.to_string());
    let counted = |part: &str, noun: &str| -> Result<usize> {
        let mut tokens = part.split_whitespace();
        match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(n), Some(word), None) if word.trim_end_matches('s') == noun => {
                n.parse().map_err(|_| invalid())
            }
            _ => Err(invalid()),
        }
    };

    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [role, hands] => Ok((role.parse()?, counted(hands, "hand")?, None)),
        [role, hands, actions] => Ok((
            role.parse()?,
            counted(hands, "hand")?,
            Some(counted(actions, "action")?),
        )),
        _ => Err(invalid()),
    }
}

/// Parses one role block.
///
/// The block is a metadata line, a column header line (ignored; columns are
/// positional) and one `HAND COMBOS EQUITY [FREQ_1..FREQ_k EV_1..EV_k]` line
/// per holding. Strategy columns are only present for the acting role and map
/// by index onto `actions`.
pub fn parse_role_range(block: &str, actions: &[String]) -> Result<RoleRange> {
    let mut lines = block.lines().map(str::trim).filter(|line| !line.is_empty());
    let metadata = lines.next().ok_or(ParseError::MissingField("range metadata"))?;
    let (role, declared_hands, action_count) = parse_metadata(metadata)?;
    let _header = lines.next();

    let k = match action_count {
        Some(k) if k != actions.len() => {
            return Err(ParseError::ActionCountMismatch {
                declared: k,
                labels: actions.len(),
            });
        }
        Some(k) => k,
        None => 0,
    };

    let mut entries = Vec::new();
    for line in lines {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let expected = 3 + 2 * k;
        if tokens.len() != expected {
            return Err(ParseError::ColumnCount {
                hand: tokens.first().copied().unwrap_or_default().to_string(),
                expected,
                found: tokens.len(),
            });
        }
        let (frequencies, evs) = tokens[3..].split_at(k);
        let strategy = actions
            .iter()
            .take(k)
            .zip(frequencies.iter().zip(evs))
            .map(|(action, (frequency, ev))| {
                Ok(ActionStrategy {
                    action: action.clone(),
                    frequency: parse_number(frequency)?,
                    ev: parse_number(ev)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        entries.push(RangeEntry {
            hand: tokens[0].to_string(),
            combos: parse_number(tokens[1])?,
            equity: parse_number(tokens[2])?,
            strategy,
        });
    }

    if entries.len() != declared_hands {
        return Err(ParseError::HandCountMismatch {
            role,
            declared: declared_hands,
            found: entries.len(),
        });
    }

    Ok(RoleRange {
        role,
        action_count,
        entries,
    })
}

/// Parses `[GTO+ export][Board: ...][ROLE1 block][ROLE2 block]`.
///
/// `actions` must come from `Request action data` issued at the same node;
/// the acting role's strategy columns are matched to it by index.
pub fn parse_node_data(text: &str, actions: &[String]) -> Result<NodeData> {
    let fields = bracket_fields(text)?;
    let [_export, board, first, second] = fields.as_slice() else {
        return Err(ParseError::SegmentCount {
            expected: 4,
            found: fields.len(),
        });
    };
    let board = parse_board(field_value(board, "Board")?)?;

    let first = parse_role_range(first, actions)?;
    let second = parse_role_range(second, actions)?;
    let (oop, ip) = match (first.role, second.role) {
        (Role::Oop, Role::Ip) => (first, second),
        (Role::Ip, Role::Oop) => (second, first),
        (role, _) => return Err(ParseError::DuplicateRole(role)),
    };

    let next_to_act = match (oop.is_acting(), ip.is_acting()) {
        (true, false) => Role::Oop,
        (false, true) => Role::Ip,
        (true, true) => return Err(ParseError::BothActing),
        (false, false) => return Err(ParseError::NoneActing),
    };

    Ok(NodeData {
        board,
        next_to_act,
        actions: actions.to_vec(),
        oop,
        ip,
    })
}
