// ─── Rule Evaluation ───
// One allow/disallow algorithm shared by libraries and argument groups.

use serde::{Deserialize, Serialize};

use super::platform::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

/// `{ "name": "windows" }` style OS constraint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OsRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub action: RuleAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<OsRule>,
}

impl Rule {
    pub fn allow() -> Self {
        Self {
            action: RuleAction::Allow,
            os: None,
        }
    }

    pub fn disallow_on(os_name: &str) -> Self {
        Self {
            action: RuleAction::Disallow,
            os: Some(OsRule {
                name: Some(os_name.to_string()),
            }),
        }
    }

    pub fn allow_on(os_name: &str) -> Self {
        Self {
            action: RuleAction::Allow,
            os: Some(OsRule {
                name: Some(os_name.to_string()),
            }),
        }
    }

    /// The platform this rule is scoped to, if any.
    pub fn platform_constraint(&self) -> Option<Platform> {
        self.os
            .as_ref()
            .and_then(|os| os.name.as_deref())
            .map(Platform::from_os_name)
    }

    /// A rule without a constraint applies everywhere.
    fn applies_to(&self, platform: Platform) -> bool {
        match self.platform_constraint() {
            None => true,
            Some(constraint) => constraint == platform,
        }
    }
}

/// Decide whether a subject guarded by `rules` is active on `platform`.
///
/// - No rules: allowed.
/// - Otherwise the whole list is scanned. Any `allow` rule (scoped or not)
///   establishes inclusion; any `disallow` rule that applies to `platform`
///   carves it back out, wherever it sits in the list.
pub fn is_allowed(rules: &[Rule], platform: Platform) -> bool {
    if rules.is_empty() {
        return true;
    }

    let mut allow_seen = false;
    let mut disallow_matched = false;

    for rule in rules {
        match rule.action {
            RuleAction::Allow => allow_seen = true,
            RuleAction::Disallow => {
                if rule.applies_to(platform) {
                    disallow_matched = true;
                }
            }
        }
    }

    allow_seen && !disallow_matched
}

/// Anything selected or rejected as a unit by a rule list.
pub trait Gated {
    fn rules(&self) -> &[Rule];

    fn is_allowed_on(&self, platform: Platform) -> bool {
        is_allowed(self.rules(), platform)
    }
}
