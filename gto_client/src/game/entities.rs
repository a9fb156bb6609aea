use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::parser::ParseError;

/// Card suits as GTO+ writes them (`c`, `d`, `h`, `s`).
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Diamond,
    Heart,
    Spade,
}

impl Suit {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'c' => Some(Self::Club),
            'd' => Some(Self::Diamond),
            'h' => Some(Self::Heart),
            's' => Some(Self::Spade),
            _ => None,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "c",
            Self::Diamond => "d",
            Self::Heart => "h",
            Self::Spade => "s",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values.
pub type Value = u8;

/// A card is a tuple of a value (deuce=2u8 ... ace=14u8) and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self.0 {
            10 => "T",
            11 => "J",
            12 => "Q",
            13 => "K",
            14 => "A",
            v => &v.to_string(),
        };
        write!(f, "{value}{}", self.1)
    }
}

impl FromStr for Card {
    type Err = ParseError;

    /// Parses a two-character card code such as `2d` or `Ah`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(value), Some(suit), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(ParseError::InvalidCard(s.to_string()));
        };
        let value = match value {
            '2'..='9' => value as u8 - b'0',
            'T' | 't' => 10,
            'J' | 'j' => 11,
            'Q' | 'q' => 12,
            'K' | 'k' => 13,
            'A' | 'a' => 14,
            _ => return Err(ParseError::InvalidCard(s.to_string())),
        };
        let suit = Suit::from_char(suit).ok_or_else(|| ParseError::InvalidCard(s.to_string()))?;
        Ok(Self(value, suit))
    }
}

/// The two seats of a heads-up solve.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Out of position.
    Oop,
    /// In position.
    Ip,
}

impl Role {
    pub fn other(self) -> Self {
        match self {
            Self::Oop => Self::Ip,
            Self::Ip => Self::Oop,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Oop => "oop",
            Self::Ip => "ip",
        };
        write!(f, "{repr}")
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "OOP" | "oop" => Ok(Self::Oop),
            "IP" | "ip" => Ok(Self::Ip),
            other => Err(ParseError::UnknownRole(other.to_string())),
        }
    }
}

/// How the acting role plays one combo for one action.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ActionStrategy {
    /// Action label, as reported by `Request action data`.
    pub action: String,
    /// Strategy frequency, in percent.
    pub frequency: f64,
    /// Expected value of taking the action with this combo.
    pub ev: f64,
}

/// One holding in a role's range at the current node.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RangeEntry {
    /// Two-card combo code, e.g. `AhKd`.
    pub hand: String,
    /// Number of combos (weight) of this holding in the range.
    pub combos: f64,
    /// Equity against the opposing range, in percent.
    pub equity: f64,
    /// Per-action strategy, in action order. Empty unless this role is next to act.
    pub strategy: Vec<ActionStrategy>,
}

impl RangeEntry {
    /// Strategy for the given action label, if this role is acting.
    pub fn strategy(&self, action: &str) -> Option<&ActionStrategy> {
        self.strategy.iter().find(|s| s.action == action)
    }
}

/// A role's whole range as exported for the current node.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RoleRange {
    pub role: Role,
    /// Number of actions announced in the metadata line; only the acting role has one.
    pub action_count: Option<usize>,
    pub entries: Vec<RangeEntry>,
}

impl RoleRange {
    pub fn is_acting(&self) -> bool {
        self.action_count.is_some()
    }

    /// Total combos across the range.
    pub fn total_combos(&self) -> f64 {
        self.entries.iter().map(|e| e.combos).sum()
    }

    pub fn entry(&self, hand: &str) -> Option<&RangeEntry> {
        self.entries.iter().find(|e| e.hand == hand)
    }
}

/// Snapshot of the node the solver is currently sitting on.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct NodeData {
    pub board: Vec<Card>,
    pub next_to_act: Role,
    /// Legal actions, in the index order `Take action` expects.
    pub actions: Vec<String>,
    pub oop: RoleRange,
    pub ip: RoleRange,
}

impl NodeData {
    pub fn range(&self, role: Role) -> &RoleRange {
        match role {
            Role::Oop => &self.oop,
            Role::Ip => &self.ip,
        }
    }

    pub fn acting_range(&self) -> &RoleRange {
        self.range(self.next_to_act)
    }

    /// Index of an action label, usable with `take_action`.
    pub fn action_index(&self, label: &str) -> Option<usize> {
        self.actions.iter().position(|a| a == label)
    }
}

/// Pot and effective stacks at the current node.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct PotStacks {
    pub pot: f64,
    pub oop_stack: f64,
    pub ip_stack: f64,
}

/// Actions taken from the root of the tree to the current node.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ActionPath(pub Vec<String>);

impl ActionPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for ActionPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_root() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.0.join(" > "))
        }
    }
}

impl From<Vec<String>> for ActionPath {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}
