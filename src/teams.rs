use crate::config::{TeamConfig, DEFAULT_TEAM};

/// Team rosters in configuration order.
#[derive(Debug, Clone, Default)]
pub struct Rosters {
    teams: Vec<(String, Vec<String>)>,
}

impl Rosters {
    pub fn from_config(teams: &[TeamConfig]) -> Self {
        Self {
            teams: teams
                .iter()
                .map(|t| (t.name.clone(), t.members.clone()))
                .collect(),
        }
    }

    /// Members of `team`, falling back to the General roster when the team is
    /// unknown or has nobody on it.
    pub fn members(&self, team: &str) -> &[String] {
        let lookup = |name: &str| {
            self.teams
                .iter()
                .find(|(t, _)| t.eq_ignore_ascii_case(name))
                .map(|(_, m)| m.as_slice())
                .filter(|m| !m.is_empty())
        };
        lookup(team).or_else(|| lookup(DEFAULT_TEAM)).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(name: &str, members: &[&str]) -> TeamConfig {
        TeamConfig {
            name: name.into(),
            skills: String::new(),
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn members_lookup_is_case_insensitive() {
        let rosters = Rosters::from_config(&[team("QA", &["q@x.com"])]);
        assert_eq!(rosters.members("qa"), ["q@x.com".to_string()]);
    }

    #[test]
    fn empty_or_unknown_team_falls_back_to_general() {
        let rosters = Rosters::from_config(&[
            team("Security", &[]),
            team("General", &["g@x.com"]),
        ]);
        assert_eq!(rosters.members("Security"), ["g@x.com".to_string()]);
        assert_eq!(rosters.members("Nope"), ["g@x.com".to_string()]);
    }

    #[test]
    fn no_general_roster_means_nobody() {
        let rosters = Rosters::from_config(&[team("QA", &[])]);
        assert!(rosters.members("QA").is_empty());
    }
}
