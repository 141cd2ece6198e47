// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ids::MenuId;

/// Page size meaning "every item".
pub const ALL_ITEMS: i64 = -1;

/// Scope key for everything this crate keeps per navigation tree.
///
/// Keys compare by value, so two independently built queries for the same menu address the
/// same mapping, record cache and processing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MenuQuery {
    pub menus: MenuId,
    pub per_page: i64,
}

impl MenuQuery {
    pub fn new(menus: MenuId) -> Self {
        Self { menus, per_page: ALL_ITEMS }
    }

    pub fn with_per_page(mut self, per_page: i64) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn menu_id(&self) -> MenuId {
        self.menus
    }
}

impl fmt::Display for MenuQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "menus={} per_page={}", self.menus, self.per_page)
    }
}
