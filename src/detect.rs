use crate::recommend::ConfigFileStatus;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl PackageManager {
    /// Lockfile-based detection, most specific manager first.
    pub fn detect(dir: &Path) -> Self {
        if dir.join("pnpm-lock.yaml").exists() {
            PackageManager::Pnpm
        } else if dir.join("yarn.lock").exists() {
            PackageManager::Yarn
        } else if dir.join("bun.lockb").exists() {
            PackageManager::Bun
        } else {
            PackageManager::Npm
        }
    }

    pub fn run_command(&self, script: &str) -> Vec<String> {
        match self {
            PackageManager::Npm => vec!["npm".into(), "run".into(), script.into()],
            PackageManager::Yarn => vec!["yarn".into(), script.into()],
            PackageManager::Pnpm => vec!["pnpm".into(), script.into()],
            PackageManager::Bun => vec!["bun".into(), "run".into(), script.into()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    NextJs,
    Nuxt,
    Vite,
    CreateReactApp,
    Angular,
    SvelteKit,
    Unknown,
}

impl Framework {
    /// Name handed to the parser registry's keyword matching.
    pub fn name(&self) -> &'static str {
        match self {
            Framework::NextJs => "next",
            Framework::Nuxt => "nuxt",
            Framework::Vite => "vite",
            Framework::CreateReactApp => "create-react-app",
            Framework::Angular => "angular",
            Framework::SvelteKit => "sveltekit",
            Framework::Unknown => "unknown",
        }
    }

    /// Configuration files a healthy project of this framework carries.
    pub fn expected_config_files(&self) -> &'static [&'static str] {
        match self {
            Framework::NextJs => &["next.config.js", "tsconfig.json"],
            Framework::Nuxt => &["nuxt.config.ts"],
            Framework::Vite => &["vite.config.ts", "tsconfig.json"],
            Framework::CreateReactApp => &["tsconfig.json"],
            Framework::Angular => &["angular.json", "tsconfig.json"],
            Framework::SvelteKit => &["svelte.config.js", "vite.config.ts"],
            Framework::Unknown => &[],
        }
    }

    /// Map dependency names to a framework. Meta-frameworks are checked
    /// before the bundlers they sit on.
    fn from_dependencies(deps: &HashMap<String, String>) -> Self {
        if deps.contains_key("next") {
            Framework::NextJs
        } else if deps.contains_key("nuxt") {
            Framework::Nuxt
        } else if deps.contains_key("@sveltejs/kit") {
            Framework::SvelteKit
        } else if deps.contains_key("@angular/core") {
            Framework::Angular
        } else if deps.contains_key("react-scripts") {
            Framework::CreateReactApp
        } else if deps.contains_key("vite") {
            Framework::Vite
        } else {
            Framework::Unknown
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    #[serde(default)]
    dependencies: HashMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: HashMap<String, String>,
    #[serde(default)]
    scripts: HashMap<String, String>,
}

/// Everything detection learned about the project under analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub package_manager: PackageManager,
    pub framework: Framework,
    pub dev_command: Vec<String>,
    pub config_files: Vec<ConfigFileStatus>,
}

/// Inspect a project directory: lockfiles for the package manager,
/// package.json dependencies for the framework, scripts for the dev command,
/// and a presence snapshot of the framework's expected config files.
pub fn detect_project(dir: &Path) -> anyhow::Result<ProjectInfo> {
    let package_json_path = dir.join("package.json");
    let content = std::fs::read_to_string(&package_json_path)
        .with_context(|| format!("Failed to read {}", package_json_path.display()))?;
    let package: PackageJson = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", package_json_path.display()))?;

    let mut deps = package.dependencies;
    deps.extend(package.dev_dependencies);

    let package_manager = PackageManager::detect(dir);
    let framework = Framework::from_dependencies(&deps);

    let script = if package.scripts.contains_key("dev") {
        "dev"
    } else if package.scripts.contains_key("start") {
        "start"
    } else {
        "dev"
    };
    let dev_command = package_manager.run_command(script);

    let config_files = framework
        .expected_config_files()
        .iter()
        .map(|path| ConfigFileStatus {
            path: path.to_string(),
            exists: dir.join(path).exists(),
        })
        .collect();

    log::debug!(
        "Detected package_manager={package_manager:?} framework={framework:?} dev_command={dev_command:?}"
    );

    Ok(ProjectInfo {
        package_manager,
        framework,
        dev_command,
        config_files,
    })
}
