//! Fuzzy-finder subprocess that picks rendered lines.

use crate::error::GistError;
use std::collections::HashMap;
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    commands: Vec<Vec<String>>,
}

impl Selector {
    /// Parses a colon-separated list of commands, e.g.
    /// `"fzf-tmux --multi:fzf --multi:peco"`. The first one that can be
    /// started wins.
    pub fn parse(source: &str) -> Self {
        let commands = source
            .split(':')
            .map(|cmd| cmd.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .filter(|argv| !argv.is_empty())
            .collect();
        Self {
            source: source.to_string(),
            commands,
        }
    }

    /// Feeds `lines` to the selector and returns the indices of the chosen
    /// lines, in the order the selector printed them.
    ///
    /// Lines are matched by text, so when several lines are identical any of
    /// them maps to the first one's index. Render with a column that tells
    /// the rows apart (such as `{{.Filename}}`) to avoid that.
    pub fn select(&self, lines: &[String]) -> Result<Vec<usize>, GistError> {
        if lines.is_empty() {
            return Err(GistError::NoSelection);
        }
        let output = self.run(&lines.join("\n"))?;
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(lines.len());
        for (i, line) in lines.iter().enumerate() {
            index.entry(line.as_str()).or_insert(i);
        }
        let picked: Vec<usize> = output
            .lines()
            .filter_map(|line| index.get(line).copied())
            .collect();
        if picked.is_empty() {
            return Err(GistError::NoSelection);
        }
        Ok(picked)
    }

    fn run(&self, input: &str) -> Result<String, GistError> {
        for argv in &self.commands {
            let (program, args) = match argv.split_first() {
                Some(split) => split,
                None => continue,
            };
            let mut child = match Command::new(program)
                .args(args)
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::inherit())
                .spawn()
            {
                Ok(child) => child,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    #[cfg(feature = "logging")]
                    tracing::debug!("Selector '{}' not found, trying next", program);
                    continue;
                }
                Err(e) => return Err(GistError::spawn(program, e)),
            };
            let stdin = child.stdin.take();
            // The writer runs beside the reader so a selector that streams
            // its output cannot fill the stdout pipe and stall the input.
            let (written, output) = std::thread::scope(|scope| {
                let writer = scope.spawn(move || match stdin {
                    Some(mut stdin) => stdin.write_all(input.as_bytes()),
                    None => Ok(()),
                });
                let output = child.wait_with_output();
                (writer.join(), output)
            });
            let output = output.map_err(|e| GistError::spawn(program, e))?;
            match written {
                // A selector may exit before reading everything.
                Ok(Err(e)) if e.kind() != ErrorKind::BrokenPipe => {
                    return Err(GistError::spawn(program, e));
                }
                Err(_) => {
                    return Err(GistError::spawn(
                        program,
                        std::io::Error::other("stdin writer panicked"),
                    ));
                }
                _ => {}
            }
            if !output.status.success() {
                return Err(GistError::NoSelection);
            }
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }
        Err(GistError::SelectorUnavailable(self.source.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fallback_commands() {
        let s = Selector::parse("fzf-tmux --multi:fzf --multi: :peco");
        assert_eq!(
            s.commands,
            vec![
                vec!["fzf-tmux".to_string(), "--multi".to_string()],
                vec!["fzf".to_string(), "--multi".to_string()],
                vec!["peco".to_string()],
            ]
        );
    }
}
