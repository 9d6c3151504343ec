//! The `@name(arg, ...)` scanner.
//!
//! A directive starts at an `@` that is not preceded by a backslash, takes
//! everything up to the next `(` as its name and everything up to the next
//! `)` as its argument list. When either delimiter is missing the `@` is
//! ordinary text and scanning resumes one byte later. Arguments are split on
//! commas and trimmed, so `@name()` carries one empty argument.

use std::fmt;
use std::ops::Range;

/// One directive found in a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub arguments: Vec<String>,
    /// Byte range from the `@` to one past the closing `)`.
    pub range: Range<usize>,
}

impl Command {
    #[must_use]
    pub fn new(name: &str, arguments: &[&str], range: Range<usize>) -> Self {
        Self {
            name: name.to_owned(),
            arguments: arguments.iter().map(|&a| a.to_owned()).collect(),
            range,
        }
    }

    /// True for `@name()` and `@name(  )`.
    #[must_use]
    pub fn has_no_arguments(&self) -> bool {
        matches!(self.arguments.as_slice(), [only] if only.is_empty())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}({})", self.name, self.arguments.join(", "))
    }
}

/// Every directive in `input`, in order of appearance.
#[must_use]
pub fn parse_commands(input: &str) -> Vec<Command> {
    let bytes = input.as_bytes();
    let mut commands = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'@' && !(i > 0 && bytes[i - 1] == b'\\') {
            if let Some(command) = parse_at(input, i) {
                i = command.range.end;
                commands.push(command);
                continue;
            }
        }
        i += 1;
    }
    commands
}

/// `start` indexes an ASCII `@`, so every slice below lands on a char
/// boundary.
fn parse_at(input: &str, start: usize) -> Option<Command> {
    let rest = &input[start + 1..];
    let open = rest.find('(')?;
    let after_open = &rest[open + 1..];
    let close = after_open.find(')')?;

    let arguments = after_open[..close]
        .split(',')
        .map(|arg| arg.trim().to_owned())
        .collect();

    Some(Command {
        name: rest[..open].to_owned(),
        arguments,
        range: start..start + open + close + 3,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_text_has_no_commands() {
        assert!(parse_commands("no commands").is_empty());
        assert!(parse_commands("").is_empty());
    }

    #[test]
    fn backslash_suppresses_a_directive() {
        assert!(parse_commands("\\@attach-file(file.txt)").is_empty());
        assert_eq!(
            parse_commands("@attach-file(file.txt) \\@attach-link(example.com)"),
            vec![Command::new("attach-file", &["file.txt"], 0..22)]
        );
    }

    #[test]
    fn ranges_cover_at_sign_through_closing_paren() {
        let input = "file: @attach-file(file.txt) link: @attach-link(example.com)";
        let commands = parse_commands(input);
        assert_eq!(
            commands,
            vec![
                Command::new("attach-file", &["file.txt"], 6..28),
                Command::new("attach-link", &["example.com"], 35..60),
            ]
        );
        assert_eq!(&input[6..28], "@attach-file(file.txt)");
        assert_eq!(&input[35..60], "@attach-link(example.com)");
    }

    #[test]
    fn arguments_are_split_and_trimmed() {
        let input = "file: @attach-file(file.txt, image.png)\nlink: @attach-link(example.com, google.com)";
        assert_eq!(
            parse_commands(input),
            vec![
                Command::new("attach-file", &["file.txt", "image.png"], 6..39),
                Command::new("attach-link", &["example.com", "google.com"], 46..83),
            ]
        );
    }

    #[test]
    fn unknown_names_are_still_scanned() {
        let input = "
Hey here's some files @attach-file(image.png, main.go, test.c)
And here's some urls @attach-link(example.com, wikipedia.com)
and here's a markdown file @attach-markdown(input.md).
";
        assert_eq!(
            parse_commands(input),
            vec![
                Command::new("attach-file", &["image.png", "main.go", "test.c"], 23..63),
                Command::new("attach-link", &["example.com", "wikipedia.com"], 85..125),
                Command::new("attach-markdown", &["input.md"], 153..179),
            ]
        );
    }

    #[test]
    fn empty_argument_list_is_one_empty_argument() {
        let commands = parse_commands("@text()");
        assert_eq!(commands, vec![Command::new("text", &[""], 0..7)]);
        assert!(commands[0].has_no_arguments());
        assert!(!Command::new("file", &["a"], 0..8).has_no_arguments());
    }

    #[test]
    fn malformed_directives_are_skipped() {
        assert!(parse_commands("mail me @ home").is_empty());
        assert!(parse_commands("@file(unclosed").is_empty());
        assert_eq!(
            parse_commands("@@text(x)"),
            vec![Command::new("@text", &["x"], 0..9)]
        );
    }

    #[test]
    fn scanning_resumes_after_a_command() {
        // The `@` inside the arguments belongs to the first command.
        assert_eq!(
            parse_commands("@text(a@b) @text(c)"),
            vec![
                Command::new("text", &["a@b"], 0..10),
                Command::new("text", &["c"], 11..19),
            ]
        );
    }

    #[test]
    fn ranges_are_byte_offsets() {
        let input = "héllo @text(wörld)";
        let commands = parse_commands(input);
        assert_eq!(commands.len(), 1);
        assert_eq!(&input[commands[0].range.clone()], "@text(wörld)");
    }

    #[test]
    fn display_rejoins_arguments() {
        let commands = parse_commands("@attach-file( file.txt ,image.png )");
        assert_eq!(commands[0].to_string(), "@attach-file(file.txt, image.png)");
        assert_eq!(
            Command::new("text", &[""], 0..7).to_string(),
            "@text()"
        );
    }
}
