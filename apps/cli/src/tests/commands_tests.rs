use shared::domain::{Language, MessageId};

use crate::commands::{parse_command, Command, CommandError};

#[test]
fn plain_lines_are_statements() {
    assert_eq!(
        parse_command("The earth is flat"),
        Ok(Command::Submit("The earth is flat".into()))
    );
    // Blank input is forwarded as-is; the session ignores it.
    assert_eq!(parse_command("   "), Ok(Command::Submit("   ".into())));
}

#[test]
fn source_commands_keep_multi_word_sources() {
    assert_eq!(
        parse_command(":open New York Times"),
        Ok(Command::OpenSource("New York Times".into()))
    );
    assert_eq!(
        parse_command(":lang New York Times spanish"),
        Ok(Command::SourceLanguage {
            source: "New York Times".into(),
            language: Language::Spanish,
        })
    );
    assert_eq!(
        parse_command(":summary nasa.gov"),
        Ok(Command::Summary("nasa.gov".into()))
    );
    assert_eq!(
        parse_command(":close nasa.gov"),
        Ok(Command::CloseSource("nasa.gov".into()))
    );
}

#[test]
fn translate_commands() {
    assert_eq!(parse_command(":translate"), Ok(Command::Translate(None)));
    assert_eq!(
        parse_command(":translate #4"),
        Ok(Command::Translate(Some(MessageId(4))))
    );
    assert_eq!(
        parse_command(":tlang Portuguese"),
        Ok(Command::TranslateLanguage(Language::Portuguese))
    );
    assert_eq!(parse_command(":tgo"), Ok(Command::TranslateGo));
    assert_eq!(parse_command(":tclose"), Ok(Command::TranslateClose));
}

#[test]
fn rejects_bad_arguments() {
    assert_eq!(
        parse_command(":open"),
        Err(CommandError::Usage(":open <source>"))
    );
    assert_eq!(
        parse_command(":lang nasa.gov"),
        Err(CommandError::Usage(":lang <source> <language>"))
    );
    assert!(matches!(
        parse_command(":lang nasa.gov Klingon"),
        Err(CommandError::Language(_))
    ));
    assert_eq!(
        parse_command(":translate latest"),
        Err(CommandError::MessageId("latest".into()))
    );
    assert_eq!(
        parse_command(":frobnicate"),
        Err(CommandError::Unknown("frobnicate".into()))
    );
}

#[test]
fn simple_commands() {
    assert_eq!(parse_command(":retry"), Ok(Command::Retry));
    assert_eq!(parse_command("  :dismiss "), Ok(Command::Dismiss));
    assert_eq!(parse_command(":languages"), Ok(Command::Languages));
    assert_eq!(parse_command(":help"), Ok(Command::Help));
    assert_eq!(parse_command(":q"), Ok(Command::Quit));
}
