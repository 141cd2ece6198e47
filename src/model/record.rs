// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ids::{MenuId, RecordId};

/// A server-owned menu item.
///
/// Records are flat: tree shape lives only in `parent_id` + `order`. Fields this crate does not
/// interpret are kept in `extra` and carried through saves untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(rename = "parent", default)]
    pub parent_id: RecordId,
    #[serde(rename = "menu_order", default)]
    pub order: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub xfn: Vec<String>,
    #[serde(default)]
    pub status: RecordStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menus: Option<MenuId>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    pub fn new(id: RecordId, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id,
            parent_id: RecordId::ROOT,
            order: 0,
            title: title.into(),
            url: url.into(),
            classes: Vec::new(),
            xfn: Vec::new(),
            status: RecordStatus::Draft,
            menus: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: RecordId) -> Self {
        self.parent_id = parent_id;
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    pub fn with_menu(mut self, menu_id: MenuId) -> Self {
        self.menus = Some(menu_id);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Draft,
    Publish,
}

impl RecordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Publish => "publish",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRecordStatusError {
    value: String,
}

impl fmt::Display for ParseRecordStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown record status {:?} (expected draft|publish)", self.value)
    }
}

impl std::error::Error for ParseRecordStatusError {}

impl FromStr for RecordStatus {
    type Err = ParseRecordStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "publish" => Ok(Self::Publish),
            _ => Err(ParseRecordStatusError { value: s.to_owned() }),
        }
    }
}

/// Body of a "create placeholder record" request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderItem {
    pub title: String,
    pub url: String,
    #[serde(rename = "menu_order")]
    pub order: i64,
}

impl Default for PlaceholderItem {
    fn default() -> Self {
        Self { title: "Placeholder".to_owned(), url: "Placeholder".to_owned(), order: 0 }
    }
}
