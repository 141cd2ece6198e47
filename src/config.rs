// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{PlaceholderItem, ALL_ITEMS};
use crate::queue::DEFAULT_CONCURRENCY;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Upper bound on create calls in flight per menu.
    pub creation_concurrency: usize,
    /// Page size used when fetching a menu's items. Negative means all of them.
    pub per_page: i64,
    pub placeholder: PlaceholderItem,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            creation_concurrency: DEFAULT_CONCURRENCY,
            per_page: ALL_ITEMS,
            placeholder: PlaceholderItem::default(),
        }
    }
}

impl EditorConfig {
    /// `limit` is clamped to at least 1.
    pub fn with_creation_concurrency(mut self, limit: usize) -> Self {
        self.creation_concurrency = limit.max(1);
        self
    }

    pub fn with_per_page(mut self, per_page: i64) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn with_placeholder(mut self, placeholder: PlaceholderItem) -> Self {
        self.placeholder = placeholder;
        self
    }
}
