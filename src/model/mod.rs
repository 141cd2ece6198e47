// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Server-owned flat `Record`s, the client-owned `Node` tree, and the per-menu `Mapping`
//! between the two identity spaces.

pub mod ids;
pub mod mapping;
pub mod node;
pub mod query;
pub mod record;

pub use ids::{Id, IdError, LocalId, MenuId, RecordId};
pub use mapping::Mapping;
pub use node::{Node, NodeAttributes, NodeKind, TreeEditError};
pub use query::{MenuQuery, ALL_ITEMS};
pub use record::{ParseRecordStatusError, PlaceholderItem, Record, RecordStatus};
