mod render;

use std::io::{self, BufRead, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Result};
use brandkit_contracts::brand::compose_style_guide;
use brandkit_contracts::catalog::{Industry, Tone, Touchpoint};
use brandkit_contracts::events::SessionEvent;
use brandkit_contracts::form::{FlowError, FormController, View};
use brandkit_contracts::i18n::Language;
use brandkit_contracts::session::{help_lines, parse_command, SessionCommand};
use brandkit_engine::BrandEngine;
use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};

use render::{export_style_guide, render_view};

#[derive(Debug, Parser)]
#[command(name = "brandkit", version, about = "Brand identity style guide generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive form session driven by slash commands.
    Session(SessionArgs),
    /// Fill the form from flags and generate one style guide.
    Generate(GenerateArgs),
}

#[derive(Debug, Parser)]
struct SessionArgs {
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    events: Option<PathBuf>,
    #[arg(long)]
    text_model: Option<String>,
    #[arg(long, default_value = "en")]
    lang: String,
}

#[derive(Debug, Parser)]
struct GenerateArgs {
    #[arg(long)]
    brand_name: String,
    #[arg(long)]
    industry: String,
    #[arg(long)]
    touchpoint: String,
    /// Repeat for several tones.
    #[arg(long = "tone", required = true)]
    tones: Vec<String>,
    #[arg(long)]
    avoid: Option<String>,
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    events: Option<PathBuf>,
    #[arg(long)]
    text_model: Option<String>,
    #[arg(long, default_value = "en")]
    lang: String,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("brandkit error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Session(args) => run_session(args),
        Command::Generate(args) => run_generate(args),
    }
}

fn parse_language(raw: &str) -> Result<Language> {
    match Language::parse(raw) {
        Some(language) => Ok(language),
        None => bail!("unknown language '{raw}' (expected en or ko)"),
    }
}

fn run_session(args: SessionArgs) -> Result<i32> {
    let events_path = args
        .events
        .clone()
        .unwrap_or_else(|| args.out.join("events.jsonl"));
    let engine = BrandEngine::new(&args.out, &events_path, args.text_model.clone())?;
    let mut controller = FormController::new();
    controller.set_language(parse_language(&args.lang)?);
    let mut session = Session::new(controller, engine, args.out.clone());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();
    writeln!(stdout, "{}", render_view(&session.controller, Instant::now()))?;
    writeln!(stdout, "Type /help for commands.")?;

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        line.clear();
        let read = match stdin.lock().read_line(&mut line) {
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        if read == 0 {
            break;
        }

        let command = parse_command(line.trim_end_matches(['\n', '\r']));
        if session.handle(command, &mut stdout)? == Flow::Quit {
            break;
        }
    }

    session.finish()?;
    Ok(0)
}

fn run_generate(args: GenerateArgs) -> Result<i32> {
    let events_path = args
        .events
        .clone()
        .unwrap_or_else(|| args.out.join("events.jsonl"));
    let engine = BrandEngine::new(&args.out, &events_path, args.text_model.clone())?;
    let mut controller = FormController::new();
    controller.set_language(parse_language(&args.lang)?);

    let Some(industry) = Industry::parse(&args.industry) else {
        bail!("unknown industry '{}'", args.industry);
    };
    let Some(touchpoint) = Touchpoint::parse(&args.touchpoint) else {
        bail!("unknown touchpoint '{}'", args.touchpoint);
    };
    let mut tones = Vec::new();
    for raw in &args.tones {
        let Some(tone) = Tone::parse(raw) else {
            bail!("unknown tone '{raw}'");
        };
        tones.push(tone);
    }

    controller.start()?;
    controller.set_brand_name(&args.brand_name)?;
    controller.set_industry(industry)?;
    controller.set_touchpoint(touchpoint)?;
    controller.next()?;
    for tone in tones {
        controller.toggle_tone(tone)?;
    }
    controller.next()?;
    if let Some(avoid) = args.avoid.as_deref() {
        controller.set_negative_preference(avoid)?;
    }

    let mut session = Session::new(controller, engine, args.out.clone());
    let mut stdout = io::stdout();
    session.handle(SessionCommand::Generate, &mut stdout)?;
    session.finish()?;
    Ok(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// One interactive session: the controller plus the engine that records it.
struct Session {
    controller: FormController,
    engine: BrandEngine,
    out_dir: PathBuf,
    last_view: String,
}

impl Session {
    fn new(controller: FormController, engine: BrandEngine, out_dir: PathBuf) -> Self {
        let last_view = view_label(controller.view());
        Self {
            controller,
            engine,
            out_dir,
            last_view,
        }
    }

    fn handle(&mut self, command: SessionCommand, out: &mut impl Write) -> Result<Flow> {
        let result = match command {
            SessionCommand::Noop => return Ok(Flow::Continue),
            SessionCommand::Quit => return Ok(Flow::Quit),
            SessionCommand::Help => {
                for line in help_lines() {
                    writeln!(out, "{line}")?;
                }
                return Ok(Flow::Continue);
            }
            SessionCommand::Show => Ok(()),
            SessionCommand::Text(_) => {
                writeln!(out, "Commands start with '/'. Type /help for the list.")?;
                return Ok(Flow::Continue);
            }
            SessionCommand::Invalid { command, reason } => {
                writeln!(out, "/{command}: {reason}")?;
                return Ok(Flow::Continue);
            }
            SessionCommand::Unknown { command, .. } => {
                writeln!(out, "Unknown command /{command}. Type /help for the list.")?;
                return Ok(Flow::Continue);
            }
            SessionCommand::Start => self.controller.start(),
            SessionCommand::SetBrandName(name) => self.controller.set_brand_name(&name),
            SessionCommand::SetIndustry(industry) => self.controller.set_industry(industry),
            SessionCommand::SetTouchpoint(touchpoint) => {
                self.controller.set_touchpoint(touchpoint)
            }
            SessionCommand::SetNegativePreference(text) => {
                self.controller.set_negative_preference(&text)
            }
            SessionCommand::ToggleTones(tones) => tones
                .into_iter()
                .try_for_each(|tone| self.controller.toggle_tone(tone).map(|_| ())),
            SessionCommand::Next => self.controller.next().map(|_| ()),
            SessionCommand::Back => self.controller.back(),
            SessionCommand::Edit => self.controller.edit(),
            SessionCommand::Home => {
                self.controller.go_home();
                Ok(())
            }
            SessionCommand::SetLanguage(language) => {
                let language = language.unwrap_or_else(|| self.controller.language().toggled());
                self.controller.set_language(language);
                Ok(())
            }
            SessionCommand::Generate => return self.generate(out),
            SessionCommand::Export(dir) => {
                let dir = dir.map(PathBuf::from).unwrap_or_else(|| self.out_dir.clone());
                if let Some(path) = self.export(&dir)? {
                    writeln!(out, "Exported to {}", path.display())?;
                } else {
                    writeln!(out, "Nothing to export yet; finish the form and /generate first.")?;
                }
                return Ok(Flow::Continue);
            }
        };

        if let Err(err) = result {
            self.report(&err, out)?;
        }
        self.note_view_change()?;
        writeln!(out, "{}", render_view(&self.controller, Instant::now()))?;
        Ok(Flow::Continue)
    }

    fn generate(&mut self, out: &mut impl Write) -> Result<Flow> {
        let input = match self.controller.begin_generation() {
            Ok(input) => input,
            Err(err) => {
                self.report(&err, out)?;
                self.note_view_change()?;
                writeln!(out, "{}", render_view(&self.controller, Instant::now()))?;
                return Ok(Flow::Continue);
            }
        };
        self.note_view_change()?;
        writeln!(out, "{}", render_view(&self.controller, Instant::now()))?;

        let controller = &mut self.controller;
        let outcome = self.engine.generate(&input, |_| {
            if controller.advance_status().is_ok() {
                if let Some(message) = controller.status_message() {
                    let _ = writeln!(out, "{}", message.get(controller.language()));
                }
            }
        })?;
        self.controller.finish_generation(outcome)?;
        self.note_view_change()?;

        let exported = self.export(&self.out_dir.clone())?;
        writeln!(out, "{}", render_view(&self.controller, Instant::now()))?;
        if let Some(path) = exported {
            writeln!(out, "Style guide written to {}", path.display())?;
        }
        Ok(Flow::Continue)
    }

    /// Writes the current result in the active language. `None` when there
    /// is no result to export.
    fn export(&mut self, dir: &Path) -> Result<Option<PathBuf>> {
        let View::Result { input, outcome } = self.controller.view() else {
            return Ok(None);
        };
        let guide = compose_style_guide(input, outcome, self.controller.language());
        let paths = export_style_guide(dir, &guide)?;
        for path in [&paths.json, &paths.html, &paths.palette] {
            self.engine.record_export(path);
        }
        self.engine.emit_event(
            SessionEvent::StyleGuideWritten,
            json_object(json!({
                "language": guide.language.code(),
                "degraded": guide.degraded,
                "json_path": paths.json.to_string_lossy().to_string(),
                "html_path": paths.html.to_string_lossy().to_string(),
                "palette_path": paths.palette.to_string_lossy().to_string(),
            })),
        )?;
        Ok(Some(paths.html))
    }

    fn report(&self, err: &FlowError, out: &mut impl Write) -> Result<()> {
        let language = self.controller.language();
        match err {
            FlowError::Validation(validation) => {
                let message = validation.message();
                self.engine.emit_event(
                    SessionEvent::ValidationNotice,
                    json_object(json!({
                        "view": self.controller.view().name(),
                        "message": message.en,
                    })),
                )?;
                writeln!(out, "! {}", message.get(language))?;
            }
            FlowError::InvalidTransition { .. } => {
                writeln!(out, "{err}")?;
            }
        }
        Ok(())
    }

    fn note_view_change(&mut self) -> Result<()> {
        let label = view_label(self.controller.view());
        if label != self.last_view {
            self.engine.emit_event(
                SessionEvent::ViewChanged,
                json_object(json!({ "from": self.last_view, "to": label })),
            )?;
            self.last_view = label;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.engine.finish(self.controller.view().name())
    }
}

fn view_label(view: &View) -> String {
    match view {
        View::Form { step, .. } => format!("form:{}", step.number()),
        other => other.name().to_string(),
    }
}

fn json_object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}
