//! User-facing terminal lines for the `openz` binary.
//! Stdout carries results, stderr carries warnings and errors. Prefixes are
//! colored only when the corresponding stream is a TTY.

use owo_colors::OwoColorize;

#[derive(Clone, Copy)]
enum Tag {
    Info,
    Ok,
    Warn,
    Error,
}

impl Tag {
    fn label(self) -> &'static str {
        match self {
            Tag::Info => "info:",
            Tag::Ok => "ok:",
            Tag::Warn => "warn:",
            Tag::Error => "error:",
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Tag::Warn | Tag::Error)
    }
}

fn render(tag: Tag, msg: &str, color: bool) -> String {
    if !color {
        return format!("{} {}", tag.label(), msg);
    }
    let label = tag.label();
    let prefix = match tag {
        Tag::Info => label.cyan().bold().to_string(),
        Tag::Ok => label.green().bold().to_string(),
        Tag::Warn => label.yellow().bold().to_string(),
        Tag::Error => label.red().bold().to_string(),
    };
    format!("{prefix} {msg}")
}

fn emit(tag: Tag, msg: &str) {
    if tag.to_stderr() {
        eprintln!("{}", render(tag, msg, atty::is(atty::Stream::Stderr)));
    } else {
        println!("{}", render(tag, msg, atty::is(atty::Stream::Stdout)));
    }
}

pub fn print_info(msg: &str) {
    emit(Tag::Info, msg);
}

pub fn print_success(msg: &str) {
    emit(Tag::Ok, msg);
}

pub fn print_warn(msg: &str) {
    emit(Tag::Warn, msg);
}

pub fn print_error(msg: &str) {
    emit(Tag::Error, msg);
}
