use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{GAME_PREFIX, MOD_PREFIX};

use super::errors::{Error, ErrorKind, Result};

/// Which root a mod-authored path resolves against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PathRoot {
    /// Resolved against the configured target/game directory.
    Game,
    /// Resolved against the owning mod's cache directory.
    Mod,
}

/// A prefixed, validated path as authored in a mod package.
///
/// Every path an action references must start with `[GAME]` or `[MOD]`
/// (case-insensitive); anything else is a load-time validation error. The
/// relative remainder is normalized and must not escape its root.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModPath {
    root: PathRoot,
    rel: PathBuf,
}

impl ModPath {
    /// Build a `ModPath` from a root selector and an already-relative path.
    pub fn new(root: PathRoot, rel: impl AsRef<Path>) -> Result<Self> {
        let rel = normalize_rel(rel.as_ref())?;
        Ok(Self { root, rel })
    }

    #[must_use]
    pub const fn root(&self) -> PathRoot {
        self.root
    }

    #[must_use]
    pub fn rel(&self) -> &Path {
        &self.rel
    }

    /// Resolve to a physical path given the game root and the owning mod's
    /// cache directory.
    #[must_use]
    pub fn resolve(&self, game_root: &Path, mod_root: &Path) -> PathBuf {
        match self.root {
            PathRoot::Game => game_root.join(&self.rel),
            PathRoot::Mod => mod_root.join(&self.rel),
        }
    }
}

fn normalize_rel(candidate: &Path) -> Result<PathBuf> {
    let mut rel = PathBuf::new();
    for seg in candidate.components() {
        match seg {
            Component::CurDir => {}
            Component::Normal(p) => rel.push(p),
            Component::ParentDir => {
                return Err(Error {
                    kind: ErrorKind::InvalidPath,
                    msg: "dotdot".into(),
                });
            }
            _ => {
                return Err(Error {
                    kind: ErrorKind::InvalidPath,
                    msg: "unsupported component".into(),
                });
            }
        }
    }
    Ok(rel)
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(s[prefix.len()..].trim_start_matches(['/', '\\']))
    } else {
        None
    }
}

impl FromStr for ModPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        // Mod manifests are authored on both Windows and Unix; accept either
        // separator and store the Unix form.
        if let Some(rest) = strip_prefix_ci(s, GAME_PREFIX) {
            return Self::new(PathRoot::Game, rest.replace('\\', "/"));
        }
        if let Some(rest) = strip_prefix_ci(s, MOD_PREFIX) {
            return Self::new(PathRoot::Mod, rest.replace('\\', "/"));
        }
        Err(Error {
            kind: ErrorKind::InvalidPath,
            msg: format!("path must begin with {GAME_PREFIX} or {MOD_PREFIX}: {s}"),
        })
    }
}

impl fmt::Display for ModPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.root {
            PathRoot::Game => GAME_PREFIX,
            PathRoot::Mod => MOD_PREFIX,
        };
        write!(f, "{}/{}", prefix, self.rel.display())
    }
}

impl Serialize for ModPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ModPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
