//! Build configuration
//!
//! `.srcdoc.yaml` in the project root names the inputs and the output.
//! Loading validates everything up front: configuration problems
//! surface synchronously as a [`SyntaxError`] return, never through
//! the diagnostic bus.

use semver::Version;
use serde::{Deserialize, Serialize};
use srcdoc_core::{version, ErrorKind, Location, Range, SyntaxError, Uri};
use srcdoc_lang::registry;
use walkdir::WalkDir;

use crate::input::Input;
use crate::output::Output;

/// Accepted configuration file names, in lookup order
pub const CONFIG_FILENAMES: &[&str] = &[".srcdoc.yaml", ".srcdoc.yml"];

/// The build configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// The srcdoc version the project targets; must be major-compatible
    pub version: String,

    /// Source trees to scan
    #[serde(default)]
    pub inputs: Vec<Input>,

    /// Where the merged document goes
    #[serde(default)]
    pub output: Output,

    #[serde(skip)]
    dir: Uri,
}

fn config_error(uri: &Uri, field: &str, kind: ErrorKind) -> SyntaxError {
    SyntaxError::new(Location::new(uri.clone(), Range::default()), field, kind)
}

impl Config {
    /// Load and sanitize the configuration found in `dir`
    ///
    /// Remote directories are rejected; a missing configuration file is
    /// a `Required` error on the file name.
    pub fn load(dir: &Uri) -> Result<Config, SyntaxError> {
        if let Some(scheme) = dir.scheme() {
            if scheme != "file" {
                return Err(config_error(dir, "dir", ErrorKind::InvalidUriScheme));
            }
        }

        for name in CONFIG_FILENAMES {
            let uri = dir.join(name);
            if !uri.exists() {
                continue;
            }
            let data = uri.read_bytes().map_err(|e| {
                config_error(&uri, "", ErrorKind::InvalidValue).with_args([e.to_string()])
            })?;
            let mut cfg: Config = serde_yaml::from_slice(&data).map_err(|e| {
                config_error(&uri, "", ErrorKind::InvalidFormat).with_args([e.to_string()])
            })?;
            cfg.sanitize(dir)?;
            return Ok(cfg);
        }

        Err(config_error(dir, CONFIG_FILENAMES[0], ErrorKind::Required))
    }

    /// Build a configuration by detecting the languages present in `dir`
    pub fn detect(dir: &Uri, recursive: bool) -> Result<Config, SyntaxError> {
        let root = dir
            .to_file_path()
            .map_err(|_| config_error(dir, "dir", ErrorKind::InvalidUriScheme))?;
        if !root.exists() {
            return Err(config_error(dir, "dir", ErrorKind::DirNotExists));
        }

        let max_depth = if recursive { usize::MAX } else { 1 };
        let mut exts: Vec<String> = Vec::new();
        for entry in WalkDir::new(&root)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(idx) = name.rfind('.') {
                let ext = name[idx..].to_string();
                if !exts.contains(&ext) {
                    exts.push(ext);
                }
            }
        }

        let mut inputs = Vec::new();
        for language in registry::languages() {
            if language.exts.iter().any(|e| exts.iter().any(|x| x == e)) {
                inputs.push(Input {
                    lang: language.id.to_string(),
                    dir: dir.clone(),
                    recursive,
                    ..Input::default()
                });
            }
        }
        if inputs.is_empty() {
            return Err(config_error(dir, "inputs", ErrorKind::UnsupportedLang));
        }

        Ok(Config {
            version: version::VERSION.to_string(),
            inputs,
            output: Output {
                path: dir.join("srcdoc.xml"),
                ..Output::default()
            },
            dir: dir.clone(),
        })
    }

    /// Write the configuration to `dir`
    pub fn save(&self, dir: &Uri) -> Result<(), SyntaxError> {
        let text = serde_yaml::to_string(self).map_err(|e| {
            config_error(dir, "", ErrorKind::InvalidFormat).with_args([e.to_string()])
        })?;
        let uri = dir.join(CONFIG_FILENAMES[0]);
        uri.write_all(text.as_bytes()).map_err(|e| {
            config_error(&uri, "", ErrorKind::InvalidValue).with_args([e.to_string()])
        })
    }

    /// Validate every field, resolving relative paths against `dir`
    pub fn sanitize(&mut self, dir: &Uri) -> Result<(), SyntaxError> {
        if self.version.is_empty() {
            return Err(config_error(dir, "version", ErrorKind::Required));
        }
        let v = Version::parse(&self.version)
            .map_err(|_| config_error(dir, "version", ErrorKind::InvalidFormat))?;
        if !version::compatible(&v) {
            return Err(config_error(dir, "version", ErrorKind::VersionIncompatible));
        }

        if self.inputs.is_empty() {
            return Err(config_error(dir, "inputs", ErrorKind::Required));
        }
        for input in &mut self.inputs {
            input.sanitize(dir)?;
        }
        self.output.sanitize(dir)?;

        self.dir = dir.clone();
        Ok(())
    }

    /// The directory the configuration was loaded from
    pub fn dir(&self) -> &Uri {
        &self.dir
    }
}
