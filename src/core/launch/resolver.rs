// ─── Launch Resolver ───
// Selects libraries and argument tokens for the current platform.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};

use crate::core::manifest::{ArgumentGroup, Artifact, LaunchProfile, Library};
use crate::core::rules::{Gated, Platform};

use super::arguments::{join_arguments, resolve_arguments};
use super::classpath::{build_classpath, path_str};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLibrary {
    pub name: String,
    pub artifact: Option<Artifact>,
    /// Platform native jar, when the library ships one.
    pub native: Option<Artifact>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub selected_libraries: Vec<ResolvedLibrary>,
    pub arguments: Vec<String>,
    pub argument_string: String,
}

/// Libraries active on `platform`, in input order. Both gates must pass:
/// the rule list, and native support for the platform when natives are
/// declared.
pub fn select_libraries(libraries: &[Library], platform: Platform) -> Vec<ResolvedLibrary> {
    libraries
        .iter()
        .filter(|lib| {
            let allowed = lib.is_allowed_on(platform) && lib.supports_platform(platform);
            if !allowed {
                debug!("Skipping library on {}: {}", platform, lib.name);
            }
            allowed
        })
        .map(|lib| ResolvedLibrary {
            name: lib.name.clone(),
            artifact: lib.artifact.clone(),
            native: lib.native_artifact(platform).cloned(),
        })
        .collect()
}

pub fn resolve(
    libraries: &[Library],
    argument_groups: &[ArgumentGroup],
    variables: &HashMap<String, String>,
    platform: Platform,
) -> Resolution {
    let selected_libraries = select_libraries(libraries, platform);
    let arguments = resolve_arguments(argument_groups, variables, platform);
    let argument_string = join_arguments(&arguments);

    Resolution {
        selected_libraries,
        arguments,
        argument_string,
    }
}

/// Everything needed to spawn the game process.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedLaunch {
    pub libraries: Vec<ResolvedLibrary>,
    pub classpath: String,
    pub main_class: Option<String>,
    pub jvm_args: Vec<String>,
    pub game_args: Vec<String>,
    /// `jvm_args`, main class, `game_args`, as one string.
    pub argument_string: String,
}

pub struct LaunchResolver {
    platform: Platform,
    libraries_dir: PathBuf,
    natives_dir: PathBuf,
    extra_classpath: Vec<PathBuf>,
}

impl LaunchResolver {
    pub fn new(
        platform: Platform,
        libraries_dir: impl Into<PathBuf>,
        natives_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            platform,
            libraries_dir: libraries_dir.into(),
            natives_dir: natives_dir.into(),
            extra_classpath: Vec::new(),
        }
    }

    /// Classpath entries appended after the libraries, e.g. the client jar.
    pub fn with_extra_classpath(mut self, entries: Vec<PathBuf>) -> Self {
        self.extra_classpath = entries;
        self
    }

    /// Resolve a full profile. The variables `classpath`,
    /// `classpath_separator`, `natives_directory` and `library_directory`
    /// are provided unless the caller already set them.
    pub fn resolve_profile(
        &self,
        profile: &LaunchProfile,
        variables: &HashMap<String, String>,
    ) -> ResolvedLaunch {
        let libraries = select_libraries(&profile.libraries, self.platform);
        let classpath = build_classpath(
            &libraries,
            &self.libraries_dir,
            &self.extra_classpath,
            self.platform,
        );

        let mut variables = variables.clone();
        let builtins = [
            ("classpath", classpath.clone()),
            (
                "classpath_separator",
                self.platform.classpath_separator().to_string(),
            ),
            ("natives_directory", path_str(&self.natives_dir)),
            ("library_directory", path_str(&self.libraries_dir)),
        ];
        for (name, value) in builtins {
            variables.entry(name.to_string()).or_insert(value);
        }

        let jvm_args = resolve_arguments(&profile.arguments.jvm, &variables, self.platform);
        let game_args = resolve_arguments(&profile.arguments.game, &variables, self.platform);

        let mut all = jvm_args.clone();
        all.extend(profile.main_class.iter().cloned());
        all.extend(game_args.iter().cloned());
        let argument_string = join_arguments(&all);

        info!(
            "Resolved launch for {}: {} of {} libraries, {} jvm / {} game args",
            self.platform,
            libraries.len(),
            profile.libraries.len(),
            jvm_args.len(),
            game_args.len()
        );

        ResolvedLaunch {
            libraries,
            classpath,
            main_class: profile.main_class.clone(),
            jvm_args,
            game_args,
            argument_string,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rules::Rule;
    use std::path::Path;

    fn library(name: &str, rules: Vec<Rule>) -> Library {
        Library {
            name: name.to_string(),
            rules,
            artifact: Some(Artifact {
                hash: "h".into(),
                size_bytes: 1,
                relative_path: format!("{name}.jar"),
                url: format!("https://libs.example.com/{name}.jar"),
            }),
            natives: None,
            classifiers: None,
        }
    }

    fn profile() -> LaunchProfile {
        LaunchProfile::from_json_str(
            r#"{
                "mainClass": "com.example.Main",
                "libraries": [
                    {"name": "core", "artifact": {"sha1": "h", "size": 1, "path": "core.jar", "url": "u"}},
                    {"name": "win-only", "rules": [{"action": "allow", "os": {"name": "windows"}}, {"action": "disallow", "os": {"name": "linux"}}],
                     "artifact": {"sha1": "h", "size": 1, "path": "win.jar", "url": "u"}},
                    {"name": "natives", "natives": {"linux": "natives-linux"},
                     "classifiers": {"natives-linux": {"sha1": "h", "size": 1, "path": "nat-linux.jar", "url": "u"}}}
                ],
                "arguments": {
                    "jvm": ["-Djava.library.path=${natives_directory}", "-cp", "${classpath}"],
                    "game": ["--username", "${auth_player_name}", "--token", "${auth_access_token}"]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn selection_preserves_manifest_order() {
        let libs = vec![
            library("c", Vec::new()),
            library("a", vec![Rule::allow(), Rule::disallow_on("osx")]),
            library("b", Vec::new()),
        ];
        let names: Vec<_> = select_libraries(&libs, Platform::Linux)
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);

        let names: Vec<_> = select_libraries(&libs, Platform::Osx)
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["c", "b"]);
    }

    #[test]
    fn natives_gate_is_independent_of_rules() {
        let p = profile();
        let linux = select_libraries(&p.libraries, Platform::Linux);
        let windows = select_libraries(&p.libraries, Platform::Windows);

        let linux_names: Vec<_> = linux.iter().map(|l| l.name.as_str()).collect();
        let windows_names: Vec<_> = windows.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(linux_names, vec!["core", "natives"]);
        assert_eq!(windows_names, vec!["core", "win-only"]);
        assert_eq!(
            linux[1].native.as_ref().unwrap().relative_path,
            "nat-linux.jar"
        );
    }

    #[test]
    fn resolve_combines_libraries_and_arguments() {
        let libs = vec![library("a", Vec::new())];
        let groups = vec![
            ArgumentGroup::plain(&["--name", "${player}"]),
            ArgumentGroup::with_rules(&["--win"], vec![Rule::allow(), Rule::disallow_on("linux")]),
        ];
        let mut vars = HashMap::new();
        vars.insert("player".to_string(), "Steve".to_string());

        let res = resolve(&libs, &groups, &vars, Platform::Linux);
        assert_eq!(res.selected_libraries.len(), 1);
        assert_eq!(res.arguments, vec!["--name", "Steve"]);
        assert_eq!(res.argument_string, "--name Steve");
    }

    #[test]
    fn profile_resolution_injects_builtin_variables() {
        let resolver = LaunchResolver::new(Platform::Linux, "/data/libraries", "/data/natives")
            .with_extra_classpath(vec![PathBuf::from("/data/client.jar")]);
        let mut vars = HashMap::new();
        vars.insert("auth_player_name".to_string(), "Alex".to_string());

        let launch = resolver.resolve_profile(&profile(), &vars);

        let expected_cp = [
            path_str(&Path::new("/data/libraries").join("core.jar")),
            "/data/client.jar".to_string(),
        ]
        .join(":");
        assert_eq!(launch.classpath, expected_cp);
        assert_eq!(
            launch.jvm_args,
            vec![
                "-Djava.library.path=/data/natives".to_string(),
                "-cp".to_string(),
                expected_cp.clone()
            ]
        );
        assert_eq!(
            launch.game_args,
            vec!["--username", "Alex", "--token", "${auth_access_token}"]
        );
        assert!(launch
            .argument_string
            .contains(" com.example.Main --username Alex --token ${auth_access_token}"));
    }

    #[test]
    fn caller_variables_win_over_builtins() {
        let resolver = LaunchResolver::new(Platform::Linux, "/libs", "/natives");
        let mut vars = HashMap::new();
        vars.insert("natives_directory".to_string(), "/custom".to_string());

        let launch = resolver.resolve_profile(&profile(), &vars);
        assert_eq!(launch.jvm_args[0], "-Djava.library.path=/custom");
    }
}
