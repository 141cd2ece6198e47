// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! User-facing notifications about save results.

use std::sync::{Mutex, MutexGuard};

use tracing::{info, warn};

pub const SAVED_MESSAGE: &str = "Navigation saved.";
pub const ERROR_MESSAGE: &str = "There was an error.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    /// Shown as a transient snackbar rather than a persistent banner.
    pub snackbar: bool,
}

impl Notice {
    pub fn saved() -> Self {
        Self { kind: NoticeKind::Success, message: SAVED_MESSAGE.to_owned(), snackbar: true }
    }

    pub fn error() -> Self {
        Self { kind: NoticeKind::Error, message: ERROR_MESSAGE.to_owned(), snackbar: true }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Success => info!(snackbar = notice.snackbar, "{}", notice.message),
            NoticeKind::Error => warn!(snackbar = notice.snackbar, "{}", notice.message),
        }
    }
}

/// Keeps every notice it receives.
#[derive(Debug, Default)]
pub struct NoticeLog {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|notice| notice.message.clone()).collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Notice>> {
        self.notices.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, notice: Notice) {
        self.lock().push(notice);
    }
}
