// ─── Launch Profile ───
// Library and argument descriptors consumed by the launch resolver.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::rules::{Gated, Platform, Rule};

/// Static library + argument descriptor document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchProfile {
    #[serde(default)]
    pub main_class: Option<String>,
    #[serde(default)]
    pub libraries: Vec<Library>,
    #[serde(default)]
    pub arguments: Arguments,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Arguments {
    #[serde(default)]
    pub jvm: Vec<ArgumentGroup>,
    #[serde(default)]
    pub game: Vec<ArgumentGroup>,
}

impl LaunchProfile {
    pub fn from_json_str(raw: &str) -> LauncherResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub async fn load(path: &Path) -> LauncherResult<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LauncherError::io(path, e))?;
        let profile = Self::from_json_str(&raw)?;
        info!(
            "Loaded launch profile {:?}: {} libraries, {} jvm / {} game argument groups",
            path,
            profile.libraries.len(),
            profile.arguments.jvm.len(),
            profile.arguments.game.len()
        );
        Ok(profile)
    }
}

// ─── Libraries ───

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(rename = "sha1")]
    pub hash: String,
    #[serde(rename = "size")]
    pub size_bytes: u64,
    #[serde(rename = "path")]
    pub relative_path: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    pub name: String,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub artifact: Option<Artifact>,
    /// OS name -> classifier name, e.g. `{"windows": "natives-windows-${arch}"}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natives: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifiers: Option<BTreeMap<String, Artifact>>,
}

impl Gated for Library {
    fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

const NATIVES_CLASSIFIER_PREFIX: &str = "natives-";

impl Library {
    /// Classifier name for `platform` from the `natives` map, with `${arch}`
    /// filled in.
    pub fn native_classifier(&self, platform: Platform) -> Option<String> {
        let natives = self.natives.as_ref()?;
        natives
            .iter()
            .find(|(os, _)| Platform::from_os_name(os) == platform)
            .map(|(_, classifier)| classifier.replace("${arch}", arch_bits()))
    }

    /// Second inclusion gate, independent of the rule list: a library that
    /// ships platform-specific natives must ship them for `platform`.
    pub fn supports_platform(&self, platform: Platform) -> bool {
        if self.natives.is_some() {
            return self.native_classifier(platform).is_some();
        }

        let Some(classifiers) = &self.classifiers else {
            return true;
        };

        let mut native_platforms = classifiers
            .keys()
            .filter_map(|key| key.strip_prefix(NATIVES_CLASSIFIER_PREFIX))
            .map(Platform::from_os_name)
            .peekable();

        if native_platforms.peek().is_none() {
            return true;
        }
        native_platforms.any(|p| p == platform)
    }

    /// The native artifact to pair with this library on `platform`.
    pub fn native_artifact(&self, platform: Platform) -> Option<&Artifact> {
        let classifiers = self.classifiers.as_ref()?;

        if let Some(classifier) = self.native_classifier(platform) {
            return classifiers.get(&classifier);
        }

        classifiers
            .iter()
            .filter_map(|(key, artifact)| {
                key.strip_prefix(NATIVES_CLASSIFIER_PREFIX)
                    .map(|os| (os, artifact))
            })
            .find(|(os, _)| Platform::from_os_name(os) == platform)
            .map(|(_, artifact)| artifact)
    }
}

fn arch_bits() -> &'static str {
    if cfg!(target_pointer_width = "64") {
        "64"
    } else {
        "32"
    }
}

// ─── Argument groups ───

/// Tokens contributed together when the rules allow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawArgument")]
pub struct ArgumentGroup {
    pub values: Vec<String>,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl ArgumentGroup {
    pub fn plain(values: &[&str]) -> Self {
        Self {
            values: values.iter().map(|v| v.to_string()).collect(),
            rules: Vec::new(),
        }
    }

    pub fn with_rules(values: &[&str], rules: Vec<Rule>) -> Self {
        Self {
            values: values.iter().map(|v| v.to_string()).collect(),
            rules,
        }
    }
}

impl Gated for ArgumentGroup {
    fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// Accepted wire shapes: a bare string, or an object with `values`
/// (or `value`) holding a string or an array of strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawArgument {
    Plain(String),
    Group {
        #[serde(default, alias = "value")]
        values: RawValues,
        #[serde(default)]
        rules: Vec<Rule>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValues {
    One(String),
    Many(Vec<String>),
}

impl Default for RawValues {
    fn default() -> Self {
        RawValues::Many(Vec::new())
    }
}

impl From<RawArgument> for ArgumentGroup {
    fn from(raw: RawArgument) -> Self {
        match raw {
            RawArgument::Plain(value) => ArgumentGroup {
                values: vec![value],
                rules: Vec::new(),
            },
            RawArgument::Group { values, rules } => ArgumentGroup {
                values: match values {
                    RawValues::One(v) => vec![v],
                    RawValues::Many(vs) => vs,
                },
                rules,
            },
        }
    }
}
