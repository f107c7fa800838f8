use crate::catalog::{Industry, Tone, Touchpoint};
use crate::i18n::Language;

use super::command_registry::{find_spec, ArgShape, CommandSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Noop,
    Start,
    SetBrandName(String),
    SetIndustry(Industry),
    SetTouchpoint(Touchpoint),
    ToggleTones(Vec<Tone>),
    SetNegativePreference(String),
    Next,
    Back,
    Generate,
    Edit,
    Home,
    /// `None` flips between the two languages.
    SetLanguage(Option<Language>),
    Show,
    Export(Option<String>),
    Help,
    Quit,
    /// Bare text outside a slash command.
    Text(String),
    Invalid {
        command: String,
        reason: String,
    },
    Unknown {
        command: String,
        arg: String,
    },
}

fn split_args(arg: &str) -> Vec<String> {
    if arg.trim().is_empty() {
        return Vec::new();
    }
    match shell_words::split(arg) {
        Ok(parts) => parts
            .into_iter()
            .filter(|value| !value.is_empty())
            .collect(),
        Err(_) => arg.split_whitespace().map(str::to_string).collect(),
    }
}

fn single_arg(arg: &str) -> String {
    split_args(arg).join(" ")
}

/// Reads `arg` the way the command's [`ArgShape`] says. `Err` carries the
/// usage complaint.
fn shaped_args(spec: &CommandSpec, arg: &str) -> Result<Vec<String>, String> {
    match spec.arg {
        ArgShape::None if arg.is_empty() => Ok(Vec::new()),
        ArgShape::None => Err(format!("{} takes no arguments", spec.usage)),
        ArgShape::Raw => Ok(vec![arg.to_string()]),
        ArgShape::Optional => {
            let value = single_arg(arg);
            Ok(if value.is_empty() { Vec::new() } else { vec![value] })
        }
        ArgShape::Choice => match single_arg(arg) {
            value if value.is_empty() => Err(format!("usage: {}", spec.usage)),
            value => Ok(vec![value]),
        },
        ArgShape::List => match split_args(arg) {
            values if values.is_empty() => Err(format!("usage: {}", spec.usage)),
            values => Ok(values),
        },
    }
}

fn invalid(command: &str, reason: impl Into<String>) -> SessionCommand {
    SessionCommand::Invalid {
        command: command.to_string(),
        reason: reason.into(),
    }
}

pub fn parse_command(text: &str) -> SessionCommand {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return SessionCommand::Noop;
    }
    let Some(slash_tail) = trimmed.strip_prefix('/') else {
        return SessionCommand::Text(trimmed.to_string());
    };

    let command_len = slash_tail
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .count();
    if command_len == 0 {
        return SessionCommand::Text(trimmed.to_string());
    }
    let command = slash_tail[..command_len].to_ascii_lowercase();
    let arg = slash_tail[command_len..].trim();

    let Some(spec) = find_spec(&command) else {
        return SessionCommand::Unknown {
            command,
            arg: arg.to_string(),
        };
    };

    let values = match shaped_args(spec, arg) {
        Ok(values) => values,
        Err(reason) => return invalid(spec.command, reason),
    };
    let first = values.first().cloned().unwrap_or_default();

    match spec.command {
        "start" => SessionCommand::Start,
        "name" => SessionCommand::SetBrandName(first),
        "avoid" => SessionCommand::SetNegativePreference(first),
        "industry" => match Industry::parse(&first) {
            Some(industry) => SessionCommand::SetIndustry(industry),
            None => invalid(spec.command, format!("unknown industry '{first}'")),
        },
        "touchpoint" => match Touchpoint::parse(&first) {
            Some(touchpoint) => SessionCommand::SetTouchpoint(touchpoint),
            None => invalid(spec.command, format!("unknown touchpoint '{first}'")),
        },
        "tone" => {
            let mut tones = Vec::new();
            for value in values {
                match Tone::parse(&value) {
                    Some(tone) => tones.push(tone),
                    None => return invalid(spec.command, format!("unknown tone '{value}'")),
                }
            }
            SessionCommand::ToggleTones(tones)
        }
        "lang" if values.is_empty() => SessionCommand::SetLanguage(None),
        "lang" => match Language::parse(&first) {
            Some(language) => SessionCommand::SetLanguage(Some(language)),
            None => invalid(spec.command, format!("unknown language '{first}'")),
        },
        "export" => SessionCommand::Export(values.into_iter().next()),
        "next" => SessionCommand::Next,
        "back" => SessionCommand::Back,
        "generate" => SessionCommand::Generate,
        "edit" => SessionCommand::Edit,
        "home" => SessionCommand::Home,
        "show" => SessionCommand::Show,
        "help" => SessionCommand::Help,
        "quit" => SessionCommand::Quit,
        _ => SessionCommand::Unknown {
            command,
            arg: arg.to_string(),
        },
    }
}
