// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Navsync keeps an editable navigation tree in sync with a flat, server-owned list of menu
//! items.
//!
//! The tree is built from records ([`tree`]), new nodes get records created for them through a
//! bounded queue ([`reconcile`], [`queue`]), and saves flatten the tree back into records one
//! cycle at a time per menu ([`save`]). [`session`] ties these together per open menu.

pub mod config;
pub mod model;
pub mod notice;
pub mod queue;
pub mod reconcile;
pub mod render;
pub mod save;
pub mod session;
pub mod store;
pub mod tree;

pub use config::EditorConfig;
pub use session::{MenuSession, NavigationEditor, SyncError};
