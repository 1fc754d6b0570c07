//! App name resolution - converts spoken app names to launch commands

use ahash::AHashMap;

use crate::effectors::LaunchSpec;

/// Result of resolving a spoken app name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppResolution {
    pub spec: LaunchSpec,
    pub match_reason: MatchReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchReason {
    /// From the `[apps]` config table
    Configured,
    /// From the built-in table
    BuiltIn,
    /// Unknown name, launched literally
    Literal,
}

/// Spoken names (all lowercase) mapped to a platform command line
type BuiltIn = (&'static [&'static str], &'static str);

#[cfg(target_os = "windows")]
const BUILT_IN_APPS: &[BuiltIn] = &[
    (&["notepad"], "notepad.exe"),
    (&["calculator", "calc"], "calc.exe"),
    (&["word", "word processor"], "winword.exe"),
    (&["excel", "spreadsheet"], "excel.exe"),
    (&["file explorer", "file browser", "files", "explorer"], "explorer.exe"),
    (&["chrome", "browser", "default browser", "web browser"], "chrome.exe"),
];

#[cfg(target_os = "macos")]
const BUILT_IN_APPS: &[BuiltIn] = &[
    (&["notepad", "text editor"], "open -a TextEdit"),
    (&["calculator", "calc"], "open -a Calculator"),
    (&["word", "word processor"], "open -a Pages"),
    (&["excel", "spreadsheet"], "open -a Numbers"),
    (&["file explorer", "file browser", "files", "finder"], "open -a Finder"),
    (&["chrome", "browser", "default browser", "web browser"], "open -a Safari"),
];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const BUILT_IN_APPS: &[BuiltIn] = &[
    (&["notepad", "text editor"], "gedit"),
    (&["calculator", "calc"], "gnome-calculator"),
    (&["word", "word processor"], "libreoffice --writer"),
    (&["excel", "spreadsheet"], "libreoffice --calc"),
    (&["file explorer", "file browser", "files"], "xdg-open ."),
    (&["chrome", "browser", "default browser", "web browser"], "x-www-browser"),
];

/// Resolves spoken app names; built once at startup and read-only afterwards
#[derive(Debug, Clone)]
pub struct AppResolver {
    configured: AHashMap<String, LaunchSpec>,
    built_in: AHashMap<&'static str, &'static str>,
}

impl Default for AppResolver {
    fn default() -> Self {
        Self::new(&AHashMap::new())
    }
}

impl AppResolver {
    /// Build from the `[apps]` config table; configured names win over built-ins
    pub fn new(overrides: &AHashMap<String, String>) -> Self {
        let configured = overrides
            .iter()
            .filter_map(|(name, command_line)| {
                let spec = LaunchSpec::parse(command_line);
                if spec.is_none() {
                    tracing::warn!("Ignoring empty launch command for app {:?}", name);
                }
                spec.map(|spec| (normalize(name), spec))
            })
            .collect();

        let built_in = BUILT_IN_APPS
            .iter()
            .flat_map(|&(names, command_line)| names.iter().map(move |&n| (n, command_line)))
            .collect();

        Self {
            configured,
            built_in,
        }
    }

    /// Resolve a spoken app name to a launch command
    pub fn resolve(&self, app_name: &str) -> AppResolution {
        let key = normalize(app_name);

        if let Some(spec) = self.configured.get(&key) {
            return AppResolution {
                spec: spec.clone(),
                match_reason: MatchReason::Configured,
            };
        }

        if let Some(spec) = self
            .built_in
            .get(key.as_str())
            .and_then(|command_line| LaunchSpec::parse(command_line))
        {
            return AppResolution {
                spec,
                match_reason: MatchReason::BuiltIn,
            };
        }

        AppResolution {
            spec: LaunchSpec::new(app_name.trim()),
            match_reason: MatchReason::Literal,
        }
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
