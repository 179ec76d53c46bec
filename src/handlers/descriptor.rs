use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use super::error::ManifestError;

pub const PUBLIC: &str = "public";
pub const PROXY_REQUIRED: &str = "proxy_required";
pub const BACKGROUND: &str = "background";

/// Optional boolean manifest field.
///
/// Absence is kept distinct from an explicit value so each policy can apply
/// its own default (see [`HandlerManifest`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Flag {
    #[default]
    Absent,
    Enabled,
    Disabled,
}

impl Flag {
    pub fn resolve(self, default: bool) -> bool {
        match self {
            Flag::Absent => default,
            Flag::Enabled => true,
            Flag::Disabled => false,
        }
    }

    /// Accepts JSON booleans and the strings "true"/"false"; `null` is absent.
    fn from_value(value: Option<&Value>) -> Result<Self, Value> {
        match value {
            None | Some(Value::Null) => Ok(Flag::Absent),
            Some(Value::Bool(true)) => Ok(Flag::Enabled),
            Some(Value::Bool(false)) => Ok(Flag::Disabled),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(Flag::Enabled),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(Flag::Disabled),
            Some(other) => Err(other.clone()),
        }
    }
}

/// Parsed `info.json` of one handler.
///
/// | key              | default |
/// |------------------|---------|
/// | `public`         | true    |
/// | `proxy_required` | true    |
/// | `background`     | false   |
///
/// Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerManifest {
    pub public: Flag,
    pub proxy_required: Flag,
    pub background: Flag,
}

impl HandlerManifest {
    pub fn parse(path: &Path, contents: &str) -> Result<Self, ManifestError> {
        let value: Value =
            serde_json::from_str(contents).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let Value::Object(fields) = value else {
            return Err(ManifestError::NotAnObject {
                path: path.to_path_buf(),
            });
        };

        let public = flag(path, &fields, PUBLIC)?;
        // A hidden handler is discarded, so its other flags are never read.
        if !public.resolve(true) {
            return Ok(Self {
                public,
                ..Self::default()
            });
        }

        Ok(Self {
            public,
            proxy_required: flag(path, &fields, PROXY_REQUIRED)?,
            background: flag(path, &fields, BACKGROUND)?,
        })
    }

    pub fn is_public(&self) -> bool {
        self.public.resolve(true)
    }

    pub fn proxy_required(&self) -> bool {
        self.proxy_required.resolve(true)
    }

    pub fn background(&self) -> bool {
        self.background.resolve(false)
    }
}

fn flag(path: &Path, fields: &Map<String, Value>, key: &'static str) -> Result<Flag, ManifestError> {
    Flag::from_value(fields.get(key)).map_err(|value| ManifestError::InvalidFlag {
        path: path.to_path_buf(),
        key,
        value,
    })
}

/// An installed, visible handler. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerDescriptor {
    name: String,
    proxy_required: bool,
    background: bool,
    start_command: PathBuf,
}

impl HandlerDescriptor {
    /// Start command is `<base_dir>/<handler_type>-<name>/<script>`.
    pub fn new(
        base_dir: &Path,
        handler_type: &str,
        name: impl Into<String>,
        manifest: &HandlerManifest,
        script: &str,
    ) -> Self {
        let name = name.into();
        let start_command = base_dir
            .join(format!("{handler_type}-{name}"))
            .join(script);

        Self {
            name,
            proxy_required: manifest.proxy_required(),
            background: manifest.background(),
            start_command,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn proxy_required(&self) -> bool {
        self.proxy_required
    }

    pub fn background(&self) -> bool {
        self.background
    }

    pub fn start_command(&self) -> &Path {
        &self.start_command
    }
}
