use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ledger::types::Party;

/// Display aliases for ledger parties. Lookup falls back to the raw party
/// identifier so an unknown party still renders.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AliasMap {
    aliases: HashMap<Party, String>,
}

impl AliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, party: Party, alias: impl Into<String>) {
        self.aliases.insert(party, alias.into());
    }

    pub fn to_alias(&self, party: &Party) -> String {
        self.aliases
            .get(party)
            .cloned()
            .unwrap_or_else(|| party.as_str().to_string())
    }
}

impl FromIterator<(Party, String)> for AliasMap {
    fn from_iter<I: IntoIterator<Item = (Party, String)>>(iter: I) -> Self {
        Self {
            aliases: iter.into_iter().collect(),
        }
    }
}

/// Who is looking at the session. Passed explicitly into the reconciler
/// and move engine constructors; there is no ambient current-party state.
#[derive(Clone, Debug)]
pub struct PlayerContext {
    pub party: Party,
    pub aliases: AliasMap,
}

impl PlayerContext {
    pub fn new(party: Party, aliases: AliasMap) -> Self {
        Self { party, aliases }
    }

    pub fn is_self(&self, party: &Party) -> bool {
        &self.party == party
    }

    pub fn alias_of(&self, party: &Party) -> String {
        self.aliases.to_alias(party)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_lookup_falls_back_to_party_id() {
        let mut aliases = AliasMap::new();
        aliases.insert(Party::new("party-1"), "Alice");
        assert_eq!(aliases.to_alias(&Party::new("party-1")), "Alice");
        assert_eq!(aliases.to_alias(&Party::new("party-2")), "party-2");
    }

    #[test]
    fn context_identifies_its_own_party() {
        let ctx = PlayerContext::new(Party::new("party-1"), AliasMap::new());
        assert!(ctx.is_self(&Party::new("party-1")));
        assert!(!ctx.is_self(&Party::new("party-2")));
    }
}
