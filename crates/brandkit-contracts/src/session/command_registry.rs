/// How a slash command reads the text after its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgShape {
    None,
    /// Whole remainder kept verbatim (may be empty).
    Raw,
    /// Exactly one catalog value, quoting allowed.
    Choice,
    /// One or more values, shell-style quoting.
    List,
    /// Zero or one value.
    Optional,
}

#[derive(Clone, Copy, Debug)]
pub struct CommandSpec {
    pub command: &'static str,
    pub arg: ArgShape,
    pub usage: &'static str,
    pub summary: &'static str,
}

pub const SESSION_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "start",
        arg: ArgShape::None,
        usage: "/start",
        summary: "open the form with empty answers",
    },
    CommandSpec {
        command: "name",
        arg: ArgShape::Raw,
        usage: "/name <brand name>",
        summary: "set the brand name",
    },
    CommandSpec {
        command: "industry",
        arg: ArgShape::Choice,
        usage: "/industry <industry>",
        summary: "pick the industry",
    },
    CommandSpec {
        command: "touchpoint",
        arg: ArgShape::Choice,
        usage: "/touchpoint <touchpoint>",
        summary: "pick the main customer touchpoint",
    },
    CommandSpec {
        command: "tone",
        arg: ArgShape::List,
        usage: "/tone <tone> [tone ...]",
        summary: "select or deselect tone keywords",
    },
    CommandSpec {
        command: "avoid",
        arg: ArgShape::Raw,
        usage: "/avoid <text>",
        summary: "describe what the brand must never be",
    },
    CommandSpec {
        command: "next",
        arg: ArgShape::None,
        usage: "/next",
        summary: "validate this step and continue",
    },
    CommandSpec {
        command: "back",
        arg: ArgShape::None,
        usage: "/back",
        summary: "return to the previous step",
    },
    CommandSpec {
        command: "generate",
        arg: ArgShape::None,
        usage: "/generate",
        summary: "build the style guide",
    },
    CommandSpec {
        command: "edit",
        arg: ArgShape::None,
        usage: "/edit",
        summary: "revise the answers behind the current guide",
    },
    CommandSpec {
        command: "home",
        arg: ArgShape::None,
        usage: "/home",
        summary: "discard everything and return to the landing page",
    },
    CommandSpec {
        command: "lang",
        arg: ArgShape::Optional,
        usage: "/lang [en|ko]",
        summary: "switch display language",
    },
    CommandSpec {
        command: "show",
        arg: ArgShape::None,
        usage: "/show",
        summary: "print the current view",
    },
    CommandSpec {
        command: "export",
        arg: ArgShape::Optional,
        usage: "/export [dir]",
        summary: "write the style guide as HTML, JSON and PNG",
    },
    CommandSpec {
        command: "help",
        arg: ArgShape::None,
        usage: "/help",
        summary: "list commands",
    },
    CommandSpec {
        command: "quit",
        arg: ArgShape::None,
        usage: "/quit",
        summary: "end the session",
    },
];

pub(crate) const ALIASES: &[(&str, &str)] = &[("exit", "quit"), ("q", "quit"), ("language", "lang")];

pub(crate) fn find_spec(command: &str) -> Option<&'static CommandSpec> {
    let canonical = ALIASES
        .iter()
        .find(|(alias, _)| *alias == command)
        .map(|(_, target)| *target)
        .unwrap_or(command);
    SESSION_COMMANDS
        .iter()
        .find(|spec| spec.command == canonical)
}

pub fn help_lines() -> Vec<String> {
    let width = SESSION_COMMANDS
        .iter()
        .map(|spec| spec.usage.len())
        .max()
        .unwrap_or(0);
    SESSION_COMMANDS
        .iter()
        .map(|spec| format!("{:<width$}  {}", spec.usage, spec.summary))
        .collect()
}
