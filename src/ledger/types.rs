use std::fmt;

use serde::{Deserialize, Serialize};

/// Ledger party identifier. Opaque to this client; aliases are a display
/// concern layered on top (see `session::context`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Party(String);

impl Party {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Party {
    fn from(id: &str) -> Self {
        Party::new(id)
    }
}

/// Human-chosen label naming one game between two parties.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameLabel(String);

impl GameLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque ledger-assigned contract reference. Stable for the lifetime of
/// one phase contract and distinct across phases of the same game, so it
/// must never be used as a cross-phase join key; that is `GameKey`'s job.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractRef(String);

impl ContractRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Join key identifying one logical game across every phase stream.
///
/// Derived as `proposer + opponent + label`, order-sensitive: proposer and
/// opponent occupy fixed slots regardless of which party is viewing, so
/// both parties derive the identical key for the same game.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameKey(String);

impl GameKey {
    pub fn derive(proposer: &Party, opponent: &Party, label: &GameLabel) -> Self {
        Self(format!(
            "{}{}{}",
            proposer.as_str(),
            opponent.as_str(),
            label.as_str()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_key_is_order_sensitive() {
        let alice = Party::new("alice");
        let bob = Party::new("bob");
        let label = GameLabel::new("g1");
        let forward = GameKey::derive(&alice, &bob, &label);
        let reversed = GameKey::derive(&bob, &alice, &label);
        assert_ne!(forward, reversed);
        assert_eq!(forward.as_str(), "alicebobg1");
    }

    #[test]
    fn game_key_is_stable_across_viewers() {
        let alice = Party::new("alice");
        let bob = Party::new("bob");
        let label = GameLabel::new("rematch");
        // Both parties derive the key from the same fixed slots.
        assert_eq!(
            GameKey::derive(&alice, &bob, &label),
            GameKey::derive(&alice, &bob, &label)
        );
    }

    #[test]
    fn identifiers_round_trip_with_serde() {
        let party: Party = serde_json::from_str("\"alice\"").unwrap();
        assert_eq!(party, Party::new("alice"));
        assert_eq!(serde_json::to_string(&party).unwrap(), "\"alice\"");

        let cref = ContractRef::new("#12:0");
        let json = serde_json::to_string(&cref).unwrap();
        assert_eq!(serde_json::from_str::<ContractRef>(&json).unwrap(), cref);
    }
}
