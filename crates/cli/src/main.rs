mod logger;

use anyhow::Context;
use cerealbox_core::{
    top_tier, AutoPlayer, AutoStep, Binder, BoxDef, Event, EventBus, RarityTable, ResolvedCard, RngState,
    Session, Stage, Timing,
};
use cerealbox_data::{
    builtin_catalog, default_state_dir, load_catalog, load_persisted_state, save_persisted_state,
    FileStore, PersistedState,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

const DEFAULT_AUTO_PACKS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    seed: Option<u64>,
    assets: Option<PathBuf>,
    save_dir: Option<PathBuf>,
    box_key: Option<String>,
    auto_packs: Option<u64>,
    timing: Timing,
    help: bool,
}

fn parse_cli_options(args: &[String]) -> CliOptions {
    let mut seed = None;
    let mut assets = None;
    let mut save_dir = None;
    let mut box_key = None;
    let mut auto_packs = None;
    let mut timing = Timing::default();
    let mut help = false;
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--seed" => {
                if let Some(value) = args.get(idx + 1) {
                    seed = value.parse::<u64>().ok();
                    idx += 1;
                }
            }
            "--assets" => {
                if let Some(value) = args.get(idx + 1) {
                    assets = Some(PathBuf::from(value));
                    idx += 1;
                }
            }
            "--save" => {
                if let Some(value) = args.get(idx + 1) {
                    save_dir = Some(PathBuf::from(value));
                    idx += 1;
                }
            }
            "--box" => {
                if let Some(value) = args.get(idx + 1) {
                    box_key = Some(value.clone());
                    idx += 1;
                }
            }
            "--auto" => {
                auto_packs = Some(DEFAULT_AUTO_PACKS);
                if let Some(packs) = args.get(idx + 1).and_then(|v| v.parse::<u64>().ok()) {
                    auto_packs = Some(packs);
                    idx += 1;
                }
            }
            "--reduced-motion" => timing = Timing::reduced_motion(),
            "--fast" => timing = Timing::instant(),
            "--help" | "-h" => help = true,
            other => log::warn!("ignoring unknown argument {other}"),
        }
        idx += 1;
    }
    CliOptions {
        seed,
        assets,
        save_dir: save_dir.or_else(default_state_dir),
        box_key,
        auto_packs,
        timing,
        help,
    }
}

fn main() {
    logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_cli_options(&args);
    if options.help {
        print_usage();
        return;
    }
    if let Err(err) = run(options) {
        eprintln!("cerealbox error: {err:#}");
        std::process::exit(1);
    }
}

fn run(options: CliOptions) -> anyhow::Result<()> {
    let mut app = App::open(&options)?;
    if let Some(packs) = options.auto_packs {
        if packs == 0 {
            anyhow::bail!("--auto needs a positive pack count");
        }
        run_auto(&mut app, packs)?;
        app.print_binder();
        return Ok(());
    }
    run_repl(&mut app)
}

struct App {
    session: Session,
    events: EventBus,
    store: Option<FileStore>,
    timing: Timing,
}

impl App {
    fn open(options: &CliOptions) -> anyhow::Result<Self> {
        let catalog = match &options.assets {
            Some(dir) => load_catalog(dir)?,
            None => builtin_catalog()?,
        };
        let rng = match options.seed {
            Some(seed) => RngState::from_seed(seed),
            None => RngState::from_entropy(),
        };
        let mut session = Session::with_rng(catalog, rng);
        let store = options.save_dir.clone().map(FileStore::new);
        match &store {
            Some(store) => {
                load_persisted_state(store, session.catalog().rarities())
                    .restore_into(&mut session);
                log::info!("state directory {}", store.root().display());
            }
            None => log::warn!("no state directory; progress will not be saved"),
        }
        let mut events = EventBus::default();
        if let Some(key) = &options.box_key {
            session
                .select_box(key, &mut events)
                .with_context(|| format!("select box {key}"))?;
            // selection at startup is not worth a line of output
            events.drain().for_each(drop);
        }
        Ok(Self {
            session,
            events,
            store,
            timing: options.timing,
        })
    }

    fn save(&mut self) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        let state = PersistedState::capture(&self.session);
        save_persisted_state(store, &state);
    }

    /// Prints queued events and saves when the collection changed.
    fn flush_events(&mut self) {
        let events: Vec<Event> = self.events.drain().collect();
        let mut dirty = false;
        for event in events {
            match event {
                Event::BoxSelected { key } => {
                    if let Some(item) = self.session.catalog().box_by_key(&key) {
                        println!("selected {}", format_box_title(item));
                    }
                }
                Event::BoxSpawned { key, slots } => {
                    let title = self
                        .session
                        .catalog()
                        .box_by_key(&key)
                        .map(format_box_title)
                        .unwrap_or(key);
                    println!("{title} is on the table ({slots} cards inside)");
                }
                Event::BoxBroken { cards, .. } => {
                    println!("box broken, {cards} cards face down");
                }
                Event::CardRevealed {
                    index,
                    rarity,
                    name,
                    count,
                } => {
                    let rarities = self.session.catalog().rarities();
                    let card = ResolvedCard { rarity, name };
                    println!(
                        "  #{} {}  (x{count})",
                        index + 1,
                        format_card(&card, rarities)
                    );
                    dirty = true;
                }
                Event::PackFinished {
                    opened, featured, ..
                } => {
                    match featured {
                        Some(card) => println!(
                            "pack #{opened} done, featured {}",
                            format_card(&card, self.session.catalog().rarities())
                        ),
                        None => println!("pack #{opened} done, nothing inside"),
                    }
                    dirty = true;
                }
            }
        }
        if dirty {
            self.save();
        }
    }

    fn print_boxes(&self) {
        let catalog = self.session.catalog();
        let current = &self.session.current_box().key;
        for item in catalog.boxes() {
            let marker = if &item.key == current { "*" } else { " " };
            let top = top_tier(item, catalog.rarities())
                .map(|key| format_rarity(key.as_str(), catalog.rarities()))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{marker} {:<10} {:<28} {} cards, top {top}",
                item.key,
                format_box_title(item),
                item.slot_count()
            );
            if !item.description.is_empty() {
                println!("    {}", item.description);
            }
        }
    }

    fn print_binder(&self) {
        let rarities = self.session.catalog().rarities();
        let binder = self.session.binder();
        println!("Binder ({} packs opened)", self.session.opened());
        for (key, count) in binder_rows(binder, rarities) {
            println!("  {:<24} {count}", format_rarity(key, rarities));
        }
        println!("  {:<24} {}", "total", binder.total());
    }

    fn print_status(&self) {
        let item = self.session.current_box();
        println!("box: {} ({})", format_box_title(item), item.key);
        println!("stage: {}", stage_label(self.session.stage()));
        if let Some(pack) = self.session.pack() {
            println!("face down: {}", pack.remaining());
        }
        println!("opened: {}", self.session.opened());
        println!("seed: {}", self.session.seed());
        match &self.store {
            Some(store) => println!("saving to: {}", store.root().display()),
            None => println!("saving to: nowhere"),
        }
    }

    fn print_summary(&self) {
        let Some(summary) = self.session.summary() else {
            return;
        };
        let rarities = self.session.catalog().rarities();
        println!("pulled:");
        for card in &summary.cards {
            println!("  {}", format_card(card, rarities));
        }
    }
}

/// Drives auto-play on the wall clock until `packs` packs are finished.
fn run_auto(app: &mut App, packs: u64) -> anyhow::Result<()> {
    let clock = Instant::now();
    let mut player = AutoPlayer::new(app.timing).with_pack_limit(packs);
    player.start(elapsed_ms(clock));
    while player.is_running() {
        let Some(due) = player.next_due() else {
            break;
        };
        let now = elapsed_ms(clock);
        if due > now {
            thread::sleep(Duration::from_millis(due - now));
        }
        let step = player
            .poll(elapsed_ms(clock), &mut app.session, &mut app.events)
            .context("auto-play step");
        app.flush_events();
        if pack_finished(step.as_ref().ok().and_then(Option::as_ref)) {
            app.print_summary();
        }
        step?;
    }
    println!("auto-play finished {} packs", player.packs_finished());
    Ok(())
}

fn pack_finished(step: Option<&AutoStep>) -> bool {
    match step {
        Some(AutoStep::Revealed(reveal)) => reveal.finished,
        Some(AutoStep::Broken { cards }) => *cards == 0,
        _ => false,
    }
}

fn elapsed_ms(clock: Instant) -> u64 {
    u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn run_repl(app: &mut App) -> anyhow::Result<()> {
    println!("Cereal Box. Type `help` for commands.");
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush().context("flush stdout")?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line).context("read stdin")? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let mut parts = input.split_whitespace();
        let Some(cmd) = parts.next() else {
            continue;
        };
        match cmd {
            "help" | "h" | "?" => print_help(),
            "quit" | "exit" | "q" => break,
            "boxes" | "ls" => app.print_boxes(),
            "box" => match parts.next() {
                Some(key) => {
                    if let Err(err) = app.session.select_box(key, &mut app.events) {
                        println!("error: {err}");
                    }
                }
                None => println!("usage: box <key>"),
            },
            "open" | "o" => {
                if let Err(err) = app.session.spawn_box(&mut app.events) {
                    println!("error: {err} (finish revealing first)");
                }
            }
            "break" | "b" => match app.session.break_box(&mut app.events) {
                Ok(0) => {
                    app.flush_events();
                    app.print_summary();
                    continue;
                }
                Ok(_) => {}
                Err(err) => println!("error: {err} (open a box first)"),
            },
            "reveal" | "r" => match app.session.reveal_next(&mut app.events) {
                Ok(reveal) if reveal.finished => {
                    app.flush_events();
                    app.print_summary();
                    continue;
                }
                Ok(_) => {}
                Err(err) => println!("error: {err} (nothing face down)"),
            },
            "all" => match app.session.open_all(&mut app.events) {
                Ok(_) => {
                    app.flush_events();
                    app.print_summary();
                    continue;
                }
                Err(err) => println!("error: {err}"),
            },
            "auto" | "a" => {
                let packs = match parts.next() {
                    Some(raw) => match raw.parse::<u64>() {
                        Ok(value) if value > 0 => value,
                        _ => {
                            println!("usage: auto [packs]");
                            continue;
                        }
                    },
                    None => DEFAULT_AUTO_PACKS,
                };
                if let Err(err) = run_auto(app, packs) {
                    println!("error: {err:#}");
                }
            }
            "binder" | "bd" => app.print_binder(),
            "status" | "s" => app.print_status(),
            _ => println!("unknown command, type `help`"),
        }
        app.flush_events();
    }
    app.save();
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  help|h|?          show help");
    println!("  boxes|ls          list boxes and their top tier");
    println!("  box <key>         select the box to open next");
    println!("  open|o            put a fresh box on the table");
    println!("  break|b           break the box open");
    println!("  reveal|r          flip the next card");
    println!("  all               open a whole box in one go");
    println!("  auto|a [packs]    auto-play packs (default {DEFAULT_AUTO_PACKS})");
    println!("  binder|bd         show collected counts");
    println!("  status|s          show box, stage and save location");
    println!("  quit|exit|q       save and leave");
}

fn print_usage() {
    println!("Usage: cerealbox [options]");
    println!("  --seed <u64>        seed the card draws");
    println!("  --assets <dir>      load rarities.json, boxes.json and names.json from dir");
    println!("  --save <dir>        state directory (default $CEREALBOX_SAVE or ~/.cerealbox)");
    println!("  --box <key>         start with this box selected");
    println!("  --auto [packs]      open packs unattended, then print the binder");
    println!("  --reduced-motion    short auto-play delays");
    println!("  --fast              no auto-play delays");
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Idle => "idle",
        Stage::BoxSpawned => "box on table",
        Stage::Revealing => "revealing",
        Stage::SummaryShown => "summary",
    }
}

fn format_box_title(item: &BoxDef) -> String {
    if item.icon.is_empty() {
        item.title.clone()
    } else {
        format!("{} {}", item.icon, item.title)
    }
}

fn format_rarity(key: &str, rarities: &RarityTable) -> String {
    match rarities.get(key) {
        Some(rarity) => format!("{} {}", rarity.symbol(), rarity.label),
        None => key.to_string(),
    }
}

fn format_card(card: &ResolvedCard, rarities: &RarityTable) -> String {
    format!(
        "[{}] {}",
        format_rarity(card.rarity.as_str(), rarities),
        card.name
    )
}

/// Highest rarity first, unknown stored keys last.
fn binder_rows<'a>(binder: &'a Binder, rarities: &RarityTable) -> Vec<(&'a str, u64)> {
    let mut rows: Vec<(&str, u64)> = binder
        .iter()
        .map(|(key, count)| (key.as_str(), count))
        .collect();
    rows.sort_by_key(|(key, _)| std::cmp::Reverse(rarities.sort_rank(key)));
    rows
}
