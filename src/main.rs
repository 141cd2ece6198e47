// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Navsync CLI entrypoint.
//!
//! Loads menu item records from a JSON file (or a built-in demo menu), opens one menu and prints
//! its navigation tree. `--demo` also runs a scripted edit and saves it.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use navsync::model::{MenuId, Node, Record, RecordId};
use navsync::notice::LogNotifier;
use navsync::render::render_outline;
use navsync::save::customized_payload;
use navsync::store::MemoryBackend;
use navsync::{EditorConfig, MenuSession, NavigationEditor};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_MENU_ID: u64 = 1;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} <records.json> [--menu <id>] [--concurrency <n>] [--payload] [--out <file>]\n  {program} --demo [--menu <id>] [--concurrency <n>] [--payload] [--out <file>]\n\nPrints the navigation tree of one menu. The menu defaults to the first one found in the\nrecords, or {DEFAULT_MENU_ID}.\n--payload also prints the customizer payload the current tree would save.\n--demo uses a built-in menu, adds and nests a link, and saves it.\n--out writes the resulting records back as JSON.\n\nLogging is controlled by RUST_LOG (default: info)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    records: Option<String>,
    menu: Option<u64>,
    concurrency: Option<usize>,
    payload: bool,
    demo: bool,
    out: Option<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--demo" => {
                if options.demo {
                    return Err(());
                }
                options.demo = true;
            }
            "--payload" => {
                if options.payload {
                    return Err(());
                }
                options.payload = true;
            }
            "--menu" => {
                if options.menu.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                options.menu = Some(raw.parse().map_err(|_| ())?);
            }
            "--concurrency" => {
                if options.concurrency.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let limit: usize = raw.parse().map_err(|_| ())?;
                if limit == 0 {
                    return Err(());
                }
                options.concurrency = Some(limit);
            }
            "--out" => {
                if options.out.is_some() {
                    return Err(());
                }
                options.out = Some(args.next().ok_or(())?);
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.records.is_some() {
                    return Err(());
                }
                options.records = Some(arg);
            }
        }
    }

    if options.demo == options.records.is_some() {
        return Err(());
    }

    Ok(options)
}

fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn demo_records() -> Vec<Record> {
    let menu = MenuId::new(DEFAULT_MENU_ID);
    vec![
        Record::new(RecordId::new(1), "Home", "/").with_order(1).with_menu(menu),
        Record::new(RecordId::new(2), "Blog", "/blog").with_order(2).with_menu(menu),
        Record::new(RecordId::new(3), "Hello world", "/blog/hello-world")
            .with_parent(RecordId::new(2))
            .with_order(1)
            .with_menu(menu),
        Record::new(RecordId::new(4), "About", "/about").with_order(3).with_menu(menu),
    ]
}

fn print_tree(heading: &str, session: &MenuSession) {
    println!("{heading} (menu {})", session.menu_id());
    print!("{}", render_outline(&session.tree(), &session.mapping()));
}

/// Adds a "Contact" link and nests it under the last top-level item.
async fn run_demo_edit(session: &MenuSession) -> Result<(), Box<dyn Error>> {
    let contact = Node::link("Contact", "/contact");
    let contact_id = contact.local_id().clone();
    let (parent, _) = session.edit(|root| {
        let parent = root.children().last().map(|node| node.local_id().clone());
        root.push_child(contact);
        parent
    });
    let (moved, _) = session.edit(|root| match parent {
        Some(parent) => root.move_node(&contact_id, &parent, usize::MAX),
        None => Ok(()),
    });
    moved?;

    session.save().await?;
    session.idle().await;
    Ok(())
}

async fn run(
    options: &CliOptions,
    backend: Arc<MemoryBackend>,
    config: EditorConfig,
    menu_id: MenuId,
) -> Result<(), Box<dyn Error>> {
    let editor = NavigationEditor::new(backend, Arc::new(LogNotifier), config);
    let session = editor.open(menu_id).await?;
    print_tree("Navigation", &session);

    if options.demo {
        run_demo_edit(&session).await?;
        println!();
        print_tree("Saved navigation", &session);
    }

    if options.payload {
        let payload = customized_payload(session.menu_id(), &session.pending_entries()?);
        println!();
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }

    Ok(())
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "navsync".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        init_tracing();

        let backend = match &options.records {
            Some(path) => MemoryBackend::load(Path::new(path))?,
            None => MemoryBackend::with_records(demo_records()),
        };
        let backend = Arc::new(backend);

        let menu_id = options
            .menu
            .map(MenuId::new)
            .or_else(|| backend.records().iter().find_map(|record| record.menus))
            .unwrap_or(MenuId::new(DEFAULT_MENU_ID));

        let mut config = EditorConfig::default();
        if let Some(limit) = options.concurrency {
            config = config.with_creation_concurrency(limit);
        }

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        runtime.block_on(run(&options, backend.clone(), config, menu_id))?;

        if let Some(out) = &options.out {
            backend.write(Path::new(out))?;
        }
        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("navsync: {err}");
        std::process::exit(1);
    }
}
