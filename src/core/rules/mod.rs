pub mod evaluator;
pub mod platform;

pub use evaluator::{is_allowed, Gated, OsRule, Rule, RuleAction};
pub use platform::Platform;
