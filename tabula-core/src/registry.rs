//! Command registry for the search bar.
//!
//! A command is a short key ("y", "gh", "0") mapping to a navigation target,
//! optionally search-capable (via a `{}` template) or aliased to another
//! command. The registry is built once from configuration, validated, and
//! read-only for the rest of the program's lifetime.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ConfigError;

/// Upper bound on alias chain length walked during validation. Any chain
/// longer than this is treated as a cycle.
const MAX_ALIAS_DEPTH: usize = 16;

/// A single registered command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandDescriptor {
    /// Short unique key typed before a delimiter, e.g. "y" or "gh".
    pub key: String,
    /// Display label. Commands without one are navigation-only and excluded
    /// from the dashboard's command listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Base destination URL. Required unless `alias` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Path template with a `{}` placeholder for the encoded search term.
    /// Absent means the command has no search mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_template: Option<String>,
    /// Static suggestions shown for this command before any remote results.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    /// Key of another command this one resolves through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl CommandDescriptor {
    /// Whether this command shows up in "list all commands" rendering.
    pub fn is_listed(&self) -> bool {
        self.name.is_some() && self.url.is_some()
    }
}

/// Ordered, validated command set with O(1) key lookup.
#[derive(Debug)]
pub struct CommandRegistry {
    commands: Vec<CommandDescriptor>,
    index: HashMap<String, usize>,
}

impl CommandRegistry {
    /// Build a registry from configured descriptors, validating that keys are
    /// unique, every non-alias command has a url, alias targets exist, and
    /// alias chains are acyclic. Validation happens here and only here; the
    /// resolver assumes a well-formed registry.
    pub fn new(commands: Vec<CommandDescriptor>) -> Result<Self, ConfigError> {
        let mut index = HashMap::with_capacity(commands.len());
        for (i, cmd) in commands.iter().enumerate() {
            if index.insert(cmd.key.clone(), i).is_some() {
                return Err(ConfigError::DuplicateKey {
                    key: cmd.key.clone(),
                });
            }
            if cmd.url.is_none() && cmd.alias.is_none() {
                return Err(ConfigError::MissingUrl {
                    key: cmd.key.clone(),
                });
            }
        }

        let registry = Self { commands, index };
        registry.validate_aliases()?;
        Ok(registry)
    }

    /// Build the registry shipped with a fresh install.
    pub fn with_defaults() -> Self {
        // The default set is known-good; new() cannot fail on it.
        Self::new(default_commands()).expect("default command set must validate")
    }

    fn validate_aliases(&self) -> Result<(), ConfigError> {
        for cmd in &self.commands {
            let mut current = cmd;
            let mut depth = 0;
            while let Some(target) = &current.alias {
                depth += 1;
                if depth > MAX_ALIAS_DEPTH {
                    return Err(ConfigError::AliasCycle {
                        key: cmd.key.clone(),
                    });
                }
                current = self.lookup(target).ok_or_else(|| ConfigError::UnknownAlias {
                    key: current.key.clone(),
                    target: target.clone(),
                })?;
                if current.key == cmd.key {
                    return Err(ConfigError::AliasCycle {
                        key: cmd.key.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Look up a command by its exact key.
    pub fn lookup(&self, key: &str) -> Option<&CommandDescriptor> {
        self.index.get(key).map(|&i| &self.commands[i])
    }

    /// All commands in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.iter()
    }

    /// Commands eligible for the dashboard listing (named, with a url).
    pub fn listed(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.iter().filter(|c| c.is_listed())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// The command set shipped by default, mirroring a typical start page.
pub fn default_commands() -> Vec<CommandDescriptor> {
    fn plain(key: &str, name: &str, url: &str) -> CommandDescriptor {
        CommandDescriptor {
            key: key.to_string(),
            name: Some(name.to_string()),
            url: Some(url.to_string()),
            search_template: None,
            suggestions: Vec::new(),
            alias: None,
        }
    }

    let mut commands = vec![
        plain("d", "Drive", "https://drive.google.com"),
        plain("c", "Calendar", "https://calendar.google.com"),
        plain("k", "Keep", "https://keep.google.com"),
        plain("n", "Notion", "https://www.notion.so"),
        plain("m", "Proton", "https://mail.proton.me/u/0/inbox"),
        plain("f", "Figma", "https://www.figma.com"),
        plain("o", "Coursera", "https://www.coursera.org"),
    ];

    // Nameless navigation-only shortcut, excluded from the dashboard listing.
    commands.push(CommandDescriptor {
        key: "p".to_string(),
        name: None,
        url: Some("file:///home/cade/pomodoro/index.html".to_string()),
        search_template: None,
        suggestions: Vec::new(),
        alias: None,
    });

    commands.push(CommandDescriptor {
        key: "y".to_string(),
        name: Some("YouTube".to_string()),
        url: Some("https://youtube.com/feed/subscriptions".to_string()),
        search_template: Some("/results?search_query={}".to_string()),
        suggestions: Vec::new(),
        alias: None,
    });
    commands.push(plain("r", "Reddit", "https://reddit.com"));
    commands.push(CommandDescriptor {
        key: "v".to_string(),
        name: Some("Vercel".to_string()),
        url: Some("https://vercel.com/dashboard".to_string()),
        search_template: None,
        suggestions: vec!["sdk.vercel.ai".to_string()],
        alias: None,
    });
    commands.push(plain("g", "GitHub", "https://github.com"));
    commands.push(CommandDescriptor {
        key: "0".to_string(),
        name: Some("local".to_string()),
        url: Some("http://localhost:3000".to_string()),
        search_template: Some(":{}".to_string()),
        suggestions: vec!["0 54323".to_string(), "0 54324".to_string()],
        alias: None,
    });

    commands
}
