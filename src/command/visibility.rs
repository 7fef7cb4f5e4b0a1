// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command visibility on the local and cloud channels.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, ErrorCode};

/// The channels a command is visible on.
///
/// Parsed from a comma separated list of `none`, `local`, `cloud` and `all`.
///
/// # Examples
///
/// ```
/// use devcap_lib::command::CommandVisibility;
///
/// let visibility: CommandVisibility = "local,cloud".parse().unwrap();
/// assert_eq!(visibility, CommandVisibility::ALL);
/// assert_eq!(visibility.to_string(), "all");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandVisibility {
    /// Visible to local clients.
    pub local: bool,
    /// Visible to the cloud.
    pub cloud: bool,
}

impl CommandVisibility {
    /// Not visible anywhere.
    pub const NONE: Self = Self::new(false, false);
    /// Local clients only.
    pub const LOCAL: Self = Self::new(true, false);
    /// Cloud only.
    pub const CLOUD: Self = Self::new(false, true);
    /// Local clients and cloud.
    pub const ALL: Self = Self::new(true, true);

    /// Creates a visibility from its two flags.
    #[must_use]
    pub const fn new(local: bool, cloud: bool) -> Self {
        Self { local, cloud }
    }

    /// Returns the canonical name: `none`, `local`, `cloud` or `all`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match (self.local, self.cloud) {
            (false, false) => "none",
            (true, false) => "local",
            (false, true) => "cloud",
            (true, true) => "all",
        }
    }
}

impl Default for CommandVisibility {
    fn default() -> Self {
        Self::ALL
    }
}

impl fmt::Display for CommandVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandVisibility {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut visibility = Self::NONE;
        for token in s.split(',').map(str::trim) {
            match token {
                "none" => {}
                "local" => visibility.local = true,
                "cloud" => visibility.cloud = true,
                "all" => visibility = Self::ALL,
                _ => {
                    return Err(Error::commands(
                        ErrorCode::InvalidPropValue,
                        format!("Invalid command visibility value '{token}'"),
                    ));
                }
            }
        }
        Ok(visibility)
    }
}
