// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Caller privilege levels.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, ErrorCode};

/// The privilege level of a caller.
///
/// Roles are ordered: `Viewer < User < Manager < Owner`. A command can be
/// invoked by any caller whose role is at least the command's minimal role.
///
/// # Examples
///
/// ```
/// use devcap_lib::command::UserRole;
///
/// let role: UserRole = "manager".parse().unwrap();
/// assert!(role > UserRole::User);
/// assert_eq!(UserRole::default(), UserRole::User);
/// assert_eq!(UserRole::Owner.to_string(), "owner");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum UserRole {
    /// May only observe.
    Viewer,
    /// Regular user.
    #[default]
    User,
    /// May manage the device.
    Manager,
    /// Full control.
    Owner,
}

impl UserRole {
    /// Returns the role name used in command definitions.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::User => "user",
            Self::Manager => "manager",
            Self::Owner => "owner",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewer" => Ok(Self::Viewer),
            "user" => Ok(Self::User),
            "manager" => Ok(Self::Manager),
            "owner" => Ok(Self::Owner),
            _ => Err(Error::commands(
                ErrorCode::InvalidPropValue,
                format!("Invalid role: '{s}'"),
            )),
        }
    }
}
