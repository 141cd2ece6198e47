// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

// Deterministic record fixtures (no RNG).

use navsync::model::{MenuId, Record, RecordId};

#[derive(Debug, Clone, Copy)]
pub enum Case {
    /// 40 items, three levels.
    Small,
    /// 1 000 items, fan-out 10.
    Medium,
    /// 2 000 items directly under the root.
    Wide,
    /// A single 500-item chain.
    Deep,
}

impl Case {
    pub fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Wide => "wide",
            Self::Deep => "deep",
        }
    }
}

pub fn records(case: Case) -> Vec<Record> {
    match case {
        Case::Small => fan_out(40, 4),
        Case::Medium => fan_out(1_000, 10),
        Case::Wide => fan_out(2_000, usize::MAX),
        Case::Deep => fan_out(500, 1),
    }
}

/// Record `i` (1-based) hangs under record `(i - 1) / fan_out` in breadth-first order, so every
/// parent gets `fan_out` children. Records are emitted in reverse to make the builder sort.
fn fan_out(count: usize, fan_out: usize) -> Vec<Record> {
    let menu = MenuId::new(1);
    let mut records: Vec<_> = (1..=count)
        .map(|i| {
            let parent = if fan_out == usize::MAX { 0 } else { (i - 1) / fan_out };
            let order = if fan_out == usize::MAX { i } else { (i - 1) % fan_out + 1 };
            Record::new(RecordId::new(i as u64), format!("Item {i}"), format!("/item-{i}"))
                .with_parent(RecordId::new(parent as u64))
                .with_order(order as i64)
                .with_menu(menu)
        })
        .collect();
    records.reverse();
    records
}
