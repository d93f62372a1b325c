//! Line-oriented intents typed at the prompt.

use shared::domain::{Language, MessageId, UnknownLanguage};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Submit(String),
    Retry,
    OpenSource(String),
    CloseSource(String),
    SourceLanguage { source: String, language: Language },
    Summary(String),
    Translate(Option<MessageId>),
    TranslateLanguage(Language),
    TranslateGo,
    TranslateClose,
    Dismiss,
    Languages,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command ':{0}' (try :help)")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error(transparent)]
    Language(#[from] UnknownLanguage),
    #[error("invalid message id '{0}'")]
    MessageId(String),
}

pub const HELP: &str = "\
<statement>               fact-check a statement
:retry                    resend the last statement
:open <source>            open the summary menu for a source
:lang <source> <language> pick the summary language for a source
:summary <source>         summarize a source in its picked language
:close <source>           close a source's summary menu
:translate [message-id]   translate an explanation (latest by default)
:tlang <language>         pick the translation language
:tgo                      run the translation
:tclose                   close the translate menu
:dismiss                  close the result dialog
:languages                list supported languages
:quit                     leave";

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let Some(rest) = line.trim_start().strip_prefix(':') else {
        return Ok(Command::Submit(line.to_string()));
    };
    let rest = rest.trim();
    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    match name {
        "retry" => Ok(Command::Retry),
        "open" => required(args, ":open <source>").map(Command::OpenSource),
        "close" => required(args, ":close <source>").map(Command::CloseSource),
        "summary" => required(args, ":summary <source>").map(Command::Summary),
        "lang" => {
            const USAGE: &str = ":lang <source> <language>";
            let (source, language) = args
                .rsplit_once(char::is_whitespace)
                .ok_or(CommandError::Usage(USAGE))?;
            let source = required(source, USAGE)?;
            Ok(Command::SourceLanguage {
                source,
                language: language.parse()?,
            })
        }
        "translate" => {
            if args.is_empty() {
                return Ok(Command::Translate(None));
            }
            let id = args
                .trim_start_matches('#')
                .parse::<u64>()
                .map_err(|_| CommandError::MessageId(args.to_string()))?;
            Ok(Command::Translate(Some(MessageId(id))))
        }
        "tlang" => {
            let language = required(args, ":tlang <language>")?;
            Ok(Command::TranslateLanguage(language.parse()?))
        }
        "tgo" => Ok(Command::TranslateGo),
        "tclose" => Ok(Command::TranslateClose),
        "dismiss" => Ok(Command::Dismiss),
        "languages" => Ok(Command::Languages),
        "help" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn required(args: &str, usage: &'static str) -> Result<String, CommandError> {
    let args = args.trim();
    if args.is_empty() {
        Err(CommandError::Usage(usage))
    } else {
        Ok(args.to_string())
    }
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
