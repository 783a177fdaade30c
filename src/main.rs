//! pixelprism replay driver
//!
//! Runs a script of entry intents (see `pixelprism::cli`) against one color
//! entry and prints the resulting state.

use std::io::Read;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use pixelprism::cli::{parse_script, CliArgs, Step};
use pixelprism::clipboard::{
    HeadlessHost, SelectionClipboard, SelectionHost, Slot, SurfaceId, SystemHost,
};
use pixelprism::config::EntryConfig;
use pixelprism::editable::{EditSession, EntryEvent, EntryMsg};
use pixelprism::tracing::EntrySnapshot;

const ENTRY_SURFACE: SurfaceId = SurfaceId(1);
const FOREIGN_SURFACE: SurfaceId = SurfaceId(2);

/// Hosts the replay can drive
trait ReplayHost: SelectionHost {
    /// Let another client own `slot`. False when the host cannot simulate it.
    fn foreign_claim(&mut self, slot: Slot, text: &str) -> bool;
}

impl ReplayHost for HeadlessHost {
    fn foreign_claim(&mut self, slot: Slot, text: &str) -> bool {
        self.serve_foreign(slot, FOREIGN_SURFACE, text);
        true
    }
}

impl ReplayHost for SystemHost {
    fn foreign_claim(&mut self, _slot: Slot, _text: &str) -> bool {
        false
    }
}

#[derive(Serialize)]
struct Report<'a> {
    step: usize,
    event: Option<&'a EntryEvent>,
    entry: EntrySnapshot,
}

struct Replay<H: SelectionHost> {
    clipboard: SelectionClipboard<H>,
    session: EditSession,
    /// Virtual clock advanced by `tick`
    now: Instant,
}

impl<H: ReplayHost> Replay<H> {
    fn step(&mut self, step: &Step) -> Option<EntryEvent> {
        match step {
            Step::Intent(EntryMsg::Commit) => {
                let event = self.session.commit_at(self.now);
                self.session.ensure_cursor_visible();
                event
            }
            Step::Intent(msg) => self.session.update(msg.clone(), &mut self.clipboard),
            Step::Type(text) => {
                let mut last = None;
                for ch in text.chars() {
                    last = self
                        .session
                        .update(EntryMsg::InsertChar(ch), &mut self.clipboard)
                        .or(last);
                }
                last
            }
            Step::SetText(text) => {
                self.session.set_text(text);
                None
            }
            Step::Foreign { slot, text } => {
                if !self.clipboard.host_mut().foreign_claim(*slot, text) {
                    tracing::warn!("foreign owners need the headless clipboard, step ignored");
                }
                None
            }
            Step::Pump => {
                self.clipboard.pump();
                self.session.pump()
            }
            Step::Tick(elapsed) => {
                self.now += *elapsed;
                self.clipboard.expire(self.now);
                self.session.tick(self.now);
                self.session.pump()
            }
        }
    }
}

fn print_report(report: &Report, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string(report).context("Failed to serialize snapshot")?
        );
        return Ok(());
    }

    let entry = &report.entry;
    print!(
        "[{}] {:?} cursor={} selection={}..{} state={:?}",
        report.step, entry.text, entry.cursor, entry.selection.0, entry.selection.1, entry.state
    );
    match report.event {
        Some(event) => println!(" event={:?}", event),
        None => println!(),
    }
    Ok(())
}

fn run<H: ReplayHost>(
    host: H,
    args: &CliArgs,
    config: &EntryConfig,
    steps: &[Step],
) -> Result<()> {
    let mut replay = Replay {
        clipboard: config.clipboard(host),
        session: config.session(ENTRY_SURFACE, args.kind.policy()),
        now: Instant::now(),
    };
    if let Some(initial) = &args.initial {
        replay.session.set_text(initial);
    }

    let mut last_event = None;
    for (i, step) in steps.iter().enumerate() {
        let before = EntrySnapshot::from_session(&replay.session);
        let event = replay.step(step);
        let after = EntrySnapshot::from_session(&replay.session);
        if let Some(diff) = before.diff(&after) {
            tracing::debug!(step = i + 1, "{}", diff);
        }

        if args.verbose {
            print_report(
                &Report {
                    step: i + 1,
                    event: event.as_ref(),
                    entry: after,
                },
                args.json,
            )?;
        }
        if event.is_some() {
            last_event = event;
        }
    }

    if !args.verbose {
        print_report(
            &Report {
                step: steps.len(),
                event: last_event.as_ref(),
                entry: EntrySnapshot::from_session(&replay.session),
            },
            args.json,
        )?;
    }

    replay.session.close(&mut replay.clipboard);
    Ok(())
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    pixelprism::tracing::init();

    let config = match &args.config {
        Some(path) => EntryConfig::load_from(path),
        None => EntryConfig::load(),
    };

    let source = match &args.script {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?,
        None => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read script from stdin")?;
            source
        }
    };
    let steps = parse_script(&source)?;

    if args.system_clipboard {
        run(SystemHost::new(), &args, &config, &steps)
    } else {
        run(HeadlessHost::new(), &args, &config, &steps)
    }
}
