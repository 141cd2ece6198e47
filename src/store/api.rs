// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{MenuQuery, PlaceholderItem, Record};
use crate::save::SaveRequest;

/// Server side of menu item storage.
///
/// Implementations own transport, timeouts and retries. Every call may suspend.
#[async_trait]
pub trait MenuItemsApi: Send + Sync {
    /// Creates one record from `placeholder` and returns it with its server-assigned id.
    async fn create_menu_item(&self, placeholder: &PlaceholderItem) -> Result<Record, ApiError>;

    async fn fetch_menu_items(&self, query: &MenuQuery) -> Result<Vec<Record>, ApiError>;

    /// Applies every entry of `request` or none of them.
    async fn submit_save(&self, request: &SaveRequest) -> Result<SaveResponse, ApiError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SaveResponse {
    pub fn accepted() -> Self {
        Self { success: true, message: None }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self { success: false, message: Some(message.into()) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response.
    Transport(String),
    Status { code: u16, message: String },
    /// The response could not be read as the expected shape.
    Decode(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "transport error: {message}"),
            Self::Status { code, message } => write!(f, "server returned {code}: {message}"),
            Self::Decode(message) => write!(f, "cannot decode response: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
