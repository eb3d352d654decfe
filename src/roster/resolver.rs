//! Name resolution against the channel's membership.

use serde::{Deserialize, Serialize};

use super::model::CategoryTiers;

/// Snapshot of one guild member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: u64,
    /// Nickname if set, otherwise the global or user name.
    pub display_name: String,
    /// Account user name.
    pub username: String,
    /// Names of the roles the member holds.
    pub roles: Vec<String>,
}

/// Outcome of resolving one name token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub identity_id: Option<u64>,
    /// Tier label, `None` for the catch-all.
    pub category: Option<String>,
}

/// Find the first member whose display or user name equals `token`,
/// ignoring case.
pub fn find_member<'a>(token: &str, members: &'a [Identity]) -> Option<&'a Identity> {
    let needle = token.to_lowercase();
    members.iter().find(|m| {
        m.display_name.to_lowercase() == needle || m.username.to_lowercase() == needle
    })
}

/// Highest-priority tier the member holds a role for.
pub fn member_tier(member: &Identity, tiers: &CategoryTiers) -> Option<String> {
    tiers
        .tiers()
        .iter()
        .find(|tier| member.roles.iter().any(|r| r == *tier))
        .cloned()
}

/// Map a name token to an identity and category.
pub fn resolve(token: &str, members: &[Identity], tiers: &CategoryTiers) -> Resolution {
    match find_member(token, members) {
        Some(member) => Resolution {
            identity_id: Some(member.id),
            category: member_tier(member, tiers),
        },
        None => {
            tracing::debug!("No member matches '{}', using catch-all", token);
            Resolution {
                identity_id: None,
                category: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: u64, display: &str, user: &str, roles: &[&str]) -> Identity {
        Identity {
            id,
            display_name: display.to_string(),
            username: user.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn matches_display_or_user_name_case_insensitive() {
        let members = vec![
            member(1, "Dr. Felix", "felix_w", &["Arzt"]),
            member(2, "Mira", "mira", &[]),
        ];
        let tiers = CategoryTiers::default();

        let r = resolve("dr. felix", &members, &tiers);
        assert_eq!(r.identity_id, Some(1));
        assert_eq!(r.category.as_deref(), Some("Arzt"));

        let r = resolve("FELIX_W", &members, &tiers);
        assert_eq!(r.identity_id, Some(1));
    }

    #[test]
    fn first_match_wins() {
        let members = vec![
            member(1, "Sam", "sam1", &["Praktikant"]),
            member(2, "sam", "sam2", &["Chefarzt"]),
        ];
        let r = resolve("SAM", &members, &CategoryTiers::default());
        assert_eq!(r.identity_id, Some(1));
        assert_eq!(r.category.as_deref(), Some("Praktikant"));
    }

    #[test]
    fn highest_priority_tier_is_chosen() {
        let members = vec![member(1, "Lea", "lea", &["Ausbildung", "Praxisleitung", "Gast"])];
        let r = resolve("Lea", &members, &CategoryTiers::default());
        assert_eq!(r.category.as_deref(), Some("Praxisleitung"));
    }

    #[test]
    fn role_names_match_exactly() {
        let members = vec![member(1, "Lea", "lea", &["arzt"])];
        let r = resolve("Lea", &members, &CategoryTiers::default());
        assert_eq!(r.identity_id, Some(1));
        assert_eq!(r.category, None);
    }

    #[test]
    fn unknown_name_is_catch_all() {
        let r = resolve("Nobody", &[], &CategoryTiers::default());
        assert_eq!(
            r,
            Resolution {
                identity_id: None,
                category: None
            }
        );
    }
}
