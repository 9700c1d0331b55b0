use std::io::{self, BufRead, StdinLock, Stdout, Write};

use crate::algorithm::remesh_alg::BuildReport;
use crate::error::{RemeshError, Result};
use crate::interactive::EventSource;
use crate::params::defaults::{ACTION, CHECK};
use crate::params::ParameterStore;

const CONSOLE: &str = "<console>";

const HELP: &str = "commands:
  check                 rebuild the mesh with the current parameters
  set NAME = VALUE      change a parameter
  get NAME              show a parameter
  list                  show all parameters
  quit                  leave";

/// Line-oriented event source reading commands from a terminal
pub struct ConsoleSource<R: BufRead, W: Write> {
    input: R,
    output: W,
    open: bool,
}

impl ConsoleSource<StdinLock<'static>, Stdout> {
    pub fn stdio() -> ConsoleSource<StdinLock<'static>, Stdout> {
        ConsoleSource::new(io::stdin().lock(), io::stdout())
    }
}

fn write_err(e: io::Error) -> RemeshError {
    RemeshError::output(CONSOLE, e)
}

impl<R: BufRead, W: Write> ConsoleSource<R, W> {
    pub fn new(input: R, output: W) -> ConsoleSource<R, W> {
        ConsoleSource {
            input,
            output,
            open: true,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn handle(&mut self, line: &str, params: &mut ParameterStore) -> Result<()> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "check" => params.set_string(ACTION, CHECK)?,
            "quit" | "exit" => self.open = false,
            "help" => writeln!(self.output, "{}", HELP).map_err(write_err)?,
            "list" => {
                let text = serde_json::to_string_pretty(&params.to_json())
                    .map_err(|e| RemeshError::output(CONSOLE, e))?;
                writeln!(self.output, "{}", text).map_err(write_err)?;
            }
            "get" => match params.get(rest) {
                Ok(value) => writeln!(self.output, "{} = {}", rest, value).map_err(write_err)?,
                Err(e) => writeln!(self.output, "{}", e).map_err(write_err)?,
            },
            "set" => match rest.split_once('=') {
                Some((name, value)) => {
                    let name = name.trim();
                    match params.set_from_str(name, value) {
                        Ok(()) => writeln!(self.output, "{} = {}", name, params.get(name)?)
                            .map_err(write_err)?,
                        Err(e) => writeln!(self.output, "{}", e).map_err(write_err)?,
                    }
                }
                None => writeln!(self.output, "usage: set NAME = VALUE").map_err(write_err)?,
            },
            other => writeln!(self.output, "unknown command `{}`, try `help`", other).map_err(write_err)?,
        }
        Ok(())
    }
}

impl<R: BufRead, W: Write> EventSource for ConsoleSource<R, W> {
    fn is_open(&self) -> bool {
        self.open
    }

    fn wait_for_signal(&mut self, params: &mut ParameterStore) -> Result<()> {
        write!(self.output, "> ").map_err(write_err)?;
        self.output.flush().map_err(write_err)?;

        // invalid UTF-8 is replaced, only end of input closes the console
        let mut line = Vec::new();
        let nb_read = self
            .input
            .read_until(b'\n', &mut line)
            .map_err(|e| RemeshError::input(CONSOLE, e))?;
        if nb_read == 0 {
            self.open = false;
            return Ok(());
        }
        let line = String::from_utf8_lossy(&line);
        self.handle(&line, params)
    }

    fn redraw(&mut self, report: &BuildReport) {
        let s = &report.summary;
        let res = writeln!(
            self.output,
            "{}: {} nodes, {} elements, {} tetrahedra, {} surface patch(es), {}",
            report.output.display(),
            s.nb_nodes,
            s.nb_elements(),
            s.nb_tetrahedra(),
            s.nb_entities(2),
            report.size
        );
        if let Err(e) = res {
            log::warn!("cannot redraw: {}", e);
        }
    }

    fn report_error(&mut self, error: &RemeshError) {
        if let Err(e) = writeln!(self.output, "rebuild failed: {}", error) {
            log::warn!("cannot report error: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::defaults::{self, ANGLE};
    use std::io::Cursor;

    fn run_lines(text: &str, params: &mut ParameterStore) -> (String, bool) {
        let mut source = ConsoleSource::new(Cursor::new(text.as_bytes().to_vec()), Vec::new());
        while source.is_open() {
            source.wait_for_signal(params).unwrap();
        }
        let open = source.is_open();
        (String::from_utf8(source.into_output()).unwrap(), open)
    }

    #[test]
    fn check_sets_the_action_token() {
        let mut params = defaults::field_parameters().unwrap();
        let mut source = ConsoleSource::new(Cursor::new(b"check\n".to_vec()), Vec::new());
        source.wait_for_signal(&mut params).unwrap();
        assert_eq!(params.get_string(ACTION).unwrap(), CHECK);
        assert!(source.is_open());
        source.wait_for_signal(&mut params).unwrap();
        assert!(!source.is_open());
    }

    #[test]
    fn set_validates_and_reports() {
        let mut params = defaults::field_parameters().unwrap();
        let text = format!("set {} = 55\nset {} = 500\nquit\nset {} = 60\n", ANGLE, ANGLE, ANGLE);
        let (out, open) = run_lines(&text, &mut params);
        assert!(!open);
        assert_eq!(params.get_number(ANGLE).unwrap(), 55.0);
        assert!(out.contains("= 55"));
        assert!(out.contains("above maximum"));
    }

    #[test]
    fn unknown_names_and_commands_are_reported() {
        let mut params = defaults::sized_parameters().unwrap();
        let (out, _) = run_lines("get Parameters/Nope\nfrobnicate\nset missing-equals\n", &mut params);
        assert!(out.contains("not declared"));
        assert!(out.contains("unknown command `frobnicate`"));
        assert!(out.contains("usage: set NAME = VALUE"));
    }

    #[test]
    fn invalid_utf8_line_keeps_the_console_open() {
        let mut params = defaults::field_parameters().unwrap();
        let mut input = vec![0xff, b'\n'];
        input.extend_from_slice(b"check\n");
        let mut source = ConsoleSource::new(Cursor::new(input), Vec::new());

        source.wait_for_signal(&mut params).unwrap();
        assert!(source.is_open());
        source.wait_for_signal(&mut params).unwrap();
        assert_eq!(params.get_string(ACTION).unwrap(), CHECK);

        let out = String::from_utf8(source.into_output()).unwrap();
        assert!(out.contains("unknown command"));
    }

    #[test]
    fn list_prints_json() {
        let mut params = defaults::field_parameters().unwrap();
        let (out, _) = run_lines("list\n", &mut params);
        assert!(out.contains("\"Parameters/Apply funny mesh size field?\""));
        assert!(out.contains("\"ONELAB/Action\""));
    }
}
