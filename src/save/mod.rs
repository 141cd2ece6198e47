// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Serialized save pipeline.
//!
//! [`flatten_tree`] turns the navigation tree back into one entry per record, and
//! [`ExclusiveRunner`] keeps save and creation cycles for one menu from overlapping.

pub mod exclusive;
pub mod flatten;
pub mod payload;

pub use exclusive::{Cycle, CycleFuture, CycleId, ExclusiveOutcome, ExclusiveRunner};
pub use flatten::{flatten_tree, FlattenError, RecordUpdate, SaveEntry};
pub use payload::{customized_payload, item_key, SaveRequest};
