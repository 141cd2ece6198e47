// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Storage capabilities.
//!
//! [`MenuItemsApi`] is the server side, [`EditorStore`] the client-side cache of records and
//! mappings, and [`MemoryBackend`] an in-process server backed by a JSON records file.

pub mod api;
pub mod memory;
pub mod records_file;
pub mod state;

pub use api::{ApiError, MenuItemsApi, SaveResponse};
pub use memory::{MemoryBackend, SaveOutcome};
pub use records_file::{load_records, write_records, StoreError};
pub use state::EditorStore;
