use glob::Pattern;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, error, warn};

use super::descriptor::{HandlerDescriptor, HandlerManifest};
use super::error::ManifestError;

/// Requesting this name disables the proxy no matter what else is requested.
pub const NO_PROXY: &str = "noproxy";

/// On-disk naming of handler directories (`<handler_type>-<name>/<manifest_file>`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandlerLayout {
    pub handler_type: String,
    pub manifest_file: String,
    pub handler_script: String,
}

impl Default for HandlerLayout {
    fn default() -> Self {
        Self {
            handler_type: "start".to_string(),
            manifest_file: "info.json".to_string(),
            handler_script: "run".to_string(),
        }
    }
}

/// Requested names split by whether they are installed.
///
/// Both lists are deduplicated and keep first-seen order for log output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub valid: Vec<String>,
    pub invalid: Vec<String>,
}

/// Requested handlers grouped by execution mode, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Executions {
    pub sync: Vec<HandlerDescriptor>,
    pub background: Vec<HandlerDescriptor>,
}

impl Executions {
    pub fn is_empty(&self) -> bool {
        self.sync.is_empty() && self.background.is_empty()
    }
}

/// Outcome of scanning a handlers directory.
#[derive(Debug)]
pub struct ScanReport {
    pub registry: HandlerRegistry,
    pub rejected: Vec<ManifestError>,
}

/// Registry of installed, public handlers keyed by name
#[derive(Clone, Debug, Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<String, HandlerDescriptor>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Insert a descriptor, replacing any previous one with the same name.
    pub fn register(&mut self, descriptor: HandlerDescriptor) -> Option<HandlerDescriptor> {
        self.handlers.insert(descriptor.name().to_string(), descriptor)
    }

    /// Scan and report failures to the log, one error per rejected manifest.
    pub fn load(handlers_dir: &Path, layout: &HandlerLayout) -> Self {
        let report = Self::scan(handlers_dir, layout);
        for rejected in &report.rejected {
            error!(path = %rejected.path().display(), "{rejected}");
        }
        report.registry
    }

    /// Build a registry from every `<handler_type>-<name>/<manifest_file>`
    /// under `handlers_dir`.
    ///
    /// Entries are visited in file-name order and a later entry with the same
    /// name wins. Non-public handlers are dropped. A missing directory yields
    /// an empty registry.
    pub fn scan(handlers_dir: &Path, layout: &HandlerLayout) -> ScanReport {
        let mut registry = Self::new();
        let mut rejected = Vec::new();

        if !handlers_dir.is_dir() {
            warn!(
                dir = %handlers_dir.display(),
                "Handlers directory not found, no handlers installed"
            );
            return ScanReport { registry, rejected };
        }

        let Some(dir) = handlers_dir.to_str() else {
            warn!(dir = %handlers_dir.display(), "Handlers directory path is not valid UTF-8");
            return ScanReport { registry, rejected };
        };
        let pattern = format!(
            "{}/{}-*/{}",
            Pattern::escape(dir),
            Pattern::escape(&layout.handler_type),
            Pattern::escape(&layout.manifest_file)
        );

        let paths = match glob::glob(&pattern) {
            Ok(paths) => paths,
            Err(e) => {
                warn!(pattern = %pattern, error = %e, "Invalid handler search pattern");
                return ScanReport { registry, rejected };
            }
        };

        // glob yields paths in sorted order.
        let prefix = format!("{}-", layout.handler_type);
        let candidates = paths.flatten().filter(|path| path.is_file()).filter_map(|path| {
            let dir_name = path.parent()?.file_name()?.to_str()?;
            let name = dir_name.strip_prefix(&prefix)?;
            (!name.is_empty()).then(|| (name.to_string(), path.clone()))
        });

        for (name, manifest_path) in candidates {
            let manifest = match fs::read_to_string(&manifest_path) {
                Ok(contents) => HandlerManifest::parse(&manifest_path, &contents),
                Err(source) => Err(ManifestError::Io {
                    path: manifest_path.clone(),
                    source,
                }),
            };

            let manifest = match manifest {
                Ok(manifest) => manifest,
                Err(e) => {
                    rejected.push(e);
                    continue;
                }
            };

            if !manifest.is_public() {
                debug!(handler = %name, "Skipping non-public handler");
                continue;
            }

            let descriptor = HandlerDescriptor::new(
                handlers_dir,
                &layout.handler_type,
                name,
                &manifest,
                &layout.handler_script,
            );
            if let Some(previous) = registry.register(descriptor) {
                debug!(handler = previous.name(), "Replaced earlier handler entry");
            }
        }

        ScanReport { registry, rejected }
    }

    pub fn get(&self, name: &str) -> Option<&HandlerDescriptor> {
        self.handlers.get(name)
    }

    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn validate<S: AsRef<str>>(&self, requested: &[S]) -> Validation {
        let mut validation = Validation::default();
        for name in requested {
            let name: &str = name.as_ref();
            let bucket = if self.has_handler(name) {
                &mut validation.valid
            } else {
                &mut validation.invalid
            };
            if !bucket.iter().any(|seen| seen == name) {
                bucket.push(name.to_string());
            }
        }
        validation
    }

    /// Whether any requested handler needs the proxy.
    ///
    /// [`NO_PROXY`] anywhere in `requested` forces `false`. Unknown names
    /// contribute nothing.
    pub fn proxy_required<S: AsRef<str>>(&self, requested: &[S]) -> bool {
        if requested.iter().any(|name| name.as_ref() == NO_PROXY) {
            return false;
        }
        requested
            .iter()
            .filter_map(|name| self.get(name.as_ref()))
            .any(HandlerDescriptor::proxy_required)
    }

    pub fn partition<S: AsRef<str>>(&self, requested: &[S]) -> Executions {
        let mut executions = Executions::default();
        for descriptor in requested.iter().filter_map(|name| self.get(name.as_ref())) {
            if descriptor.background() {
                executions.background.push(descriptor.clone());
            } else {
                executions.sync.push(descriptor.clone());
            }
        }
        executions
    }
}
