// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Converting flat records into a navigation tree, and walking trees back out.

pub mod build;
pub mod walk;

pub use build::{build_navigation_tree, BuiltTree};
pub use walk::{local_ids, walk_tree, Visit};
