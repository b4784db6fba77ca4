use std::fmt;
use std::io::{self, stdin, stdout, BufRead, Write};
use std::process::exit;

use clap::{App, Arg, ArgMatches};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use scicalc::convert::conversions;
use scicalc::{AngleUnit, ErrorKind, Mode, Session, SessionConfig, SessionState};

const PROMPT: &str = "[]> ";

const HELP: &str = "\
commands:
  :mode <basic|advanced|metric>  switch mode (clears the expression)
  :angle                         toggle degrees / radians
  :ms  :mr  :mc                  store, recall, clear memory
  :memory                        show the memory register
  :history                       list successful calculations
  :units                         list conversion phrases
  :clear                         discard the pending expression
  exit                           leave";

pub enum RuntimeError {
    Calc(ErrorKind),
    Config(String),
    IO(io::Error),
    Readline(ReadlineError),
}

impl From<ErrorKind> for RuntimeError {
    fn from(data: ErrorKind) -> RuntimeError {
        RuntimeError::Calc(data)
    }
}

impl From<io::Error> for RuntimeError {
    fn from(data: io::Error) -> RuntimeError {
        RuntimeError::IO(data)
    }
}

impl From<ReadlineError> for RuntimeError {
    fn from(data: ReadlineError) -> RuntimeError {
        RuntimeError::Readline(data)
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RuntimeError::Calc(ref c) => write!(f, "scicalc: {}", c),
            RuntimeError::Config(ref c) => write!(f, "scicalc: {}", c),
            RuntimeError::IO(ref e) => write!(f, "scicalc: {}", e),
            RuntimeError::Readline(ref e) => write!(f, "scicalc: {}", e),
        }
    }
}

enum Step {
    Continue,
    Exit,
}

fn config(matches: &ArgMatches) -> Result<SessionConfig, RuntimeError> {
    let mode = matches
        .value_of("mode")
        .unwrap_or("basic")
        .parse::<Mode>()
        .map_err(RuntimeError::Config)?;
    let angle_unit = if matches.is_present("radians") {
        AngleUnit::Radians
    } else {
        AngleUnit::Degrees
    };
    let history_limit = match matches.value_of("history-limit") {
        Some(n) => Some(
            n.parse::<usize>()
                .map_err(|e| RuntimeError::Config(format!("history limit '{}': {}", n, e)))?,
        ),
        None => None,
    };
    Ok(SessionConfig {
        mode,
        angle_unit,
        history_limit,
    })
}

fn command<W: Write>(session: &mut Session, cmd: &str, out: &mut W) -> io::Result<()> {
    let mut words = cmd.split_whitespace();
    match (words.next().unwrap_or(""), words.next()) {
        ("mode", Some(name)) => match name.parse::<Mode>() {
            Ok(mode) => {
                session.change_mode(mode);
                writeln!(out, "mode: {}", mode)
            }
            Err(e) => writeln!(out, "{}", e),
        },
        ("mode", None) => writeln!(out, "mode: {}", session.mode()),
        ("angle", _) => {
            session.toggle_angle_unit();
            writeln!(out, "angle unit: {}", session.angle_unit())
        }
        ("ms", _) => {
            session.store_memory();
            match session.memory() {
                Some(m) => writeln!(out, "M = {}", m),
                None => writeln!(out, "no result to store"),
            }
        }
        ("mr", _) => {
            if session.state() != SessionState::HasInput {
                session.clear();
            }
            session.recall_memory();
            writeln!(out, "{}", session.expression())
        }
        ("mc", _) => {
            session.clear_memory();
            Ok(())
        }
        ("memory", _) => writeln!(out, "{}", session.memory().unwrap_or("no value stored")),
        ("history", _) => {
            for (i, entry) in session.history().iter().enumerate() {
                writeln!(out, "{:>4}  {}", i + 1, entry)?;
            }
            Ok(())
        }
        ("units", _) => {
            for phrase in conversions() {
                writeln!(out, "{}", phrase)?;
            }
            Ok(())
        }
        ("clear", _) => {
            session.clear();
            Ok(())
        }
        ("help", _) => writeln!(out, "{}", HELP),
        (other, _) => writeln!(out, "unknown command ':{}', try :help", other),
    }
}

fn handle_line<W: Write>(session: &mut Session, line: &str, out: &mut W) -> io::Result<Step> {
    match line.trim() {
        "" => Ok(Step::Continue),
        "exit" | "quit" => Ok(Step::Exit),
        s if s.starts_with(':') => {
            command(session, &s[1..], out)?;
            Ok(Step::Continue)
        }
        s => {
            // a recalled memory value stays pending and is extended
            if session.state() != SessionState::HasInput {
                session.clear();
            }
            session.append(s);
            match session.submit() {
                Ok(result) => writeln!(out, "{}", result)?,
                Err(kind) => writeln!(out, "{}", kind)?,
            }
            Ok(Step::Continue)
        }
    }
}

fn interactive(session: &mut Session) -> Result<(), RuntimeError> {
    let stdout = stdout();
    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                editor.add_history_entry(line.as_str())?;
                if let Step::Exit = handle_line(session, &line, &mut stdout.lock())? {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => session.clear(),
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn piped(session: &mut Session) -> Result<(), RuntimeError> {
    let stdout = stdout();
    let mut stdout = stdout.lock();
    let stdin = stdin();
    for line in stdin.lock().lines() {
        if let Step::Exit = handle_line(session, &line?, &mut stdout)? {
            break;
        }
    }
    Ok(())
}

pub fn calc(matches: &ArgMatches) -> Result<(), RuntimeError> {
    let mut session = Session::new(config(matches)?);

    if let Some(words) = matches.values_of("expression") {
        session.append(&words.collect::<Vec<_>>().join(" "));
        let result = session.submit()?;
        let stdout = stdout();
        writeln!(stdout.lock(), "{}", result)?;
    } else if atty::is(atty::Stream::Stdin) {
        interactive(&mut session)?;
    } else {
        piped(&mut session)?;
    }
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("SCICALC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_logging();

    let matches = App::new("scicalc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Scientific calculator with trigonometry and unit conversion")
        .arg(
            Arg::with_name("mode")
                .short("m")
                .long("mode")
                .takes_value(true)
                .possible_values(&["basic", "advanced", "metric"])
                .default_value("basic")
                .help("Evaluation mode"),
        )
        .arg(
            Arg::with_name("radians")
                .short("r")
                .long("radians")
                .help("Read trigonometric angles in radians instead of degrees"),
        )
        .arg(
            Arg::with_name("history-limit")
                .long("history-limit")
                .takes_value(true)
                .value_name("N")
                .help("Keep at most N history entries"),
        )
        .arg(
            Arg::with_name("expression")
                .multiple(true)
                .help("Expression to evaluate; starts a prompt when omitted"),
        )
        .get_matches();

    let code = match calc(&matches) {
        Ok(()) => 0,
        Err(e) => {
            println!("{}", e);
            1
        }
    };
    exit(code)
}
