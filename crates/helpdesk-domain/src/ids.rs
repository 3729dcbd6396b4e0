use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Server-issued ticket identifier. Drafts carry no id until their first save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(u64);

impl TicketId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TicketId {
    type Err = std::num::ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.trim().parse().map(Self)
    }
}

impl From<u64> for TicketId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.trim().parse().map(Self)
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{TicketId, UserId};

    #[test]
    fn ticket_id_serializes_as_bare_number() {
        let serialized = serde_json::to_string(&TicketId::new(42)).expect("serialize ticket id");
        assert_eq!(serialized, "42");
    }

    #[test]
    fn ids_parse_from_route_strings() {
        assert_eq!("42".parse::<TicketId>().expect("parse"), TicketId::new(42));
        assert_eq!(" 7 ".parse::<UserId>().expect("parse"), UserId::new(7));
        assert!("new".parse::<TicketId>().is_err());
    }
}
