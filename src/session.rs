use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::convert;
use crate::error::{CalcError, ErrorKind};
use crate::scope::{AngleUnit, EmptyScope, ScientificScope};
use crate::value::Value;

/// Selects which part of the engine resolves an expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Plain arithmetic, no identifiers.
    Basic,
    /// Arithmetic plus the scientific function table.
    Advanced,
    /// Arithmetic with an optional unit conversion phrase.
    Metric,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Basic
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Mode::Basic => write!(f, "basic"),
            Mode::Advanced => write!(f, "advanced"),
            Mode::Metric => write!(f, "metric"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(Mode::Basic),
            "advanced" => Ok(Mode::Advanced),
            "metric" => Ok(Mode::Metric),
            _ => Err(format!("unknown mode '{}'", s)),
        }
    }
}

/// Evaluate `input` the way a session in `mode` would, without touching
/// any session state.
pub fn evaluate(mode: Mode, unit: AngleUnit, input: &str) -> Result<Value, CalcError> {
    match mode {
        Mode::Basic => crate::eval_with_env(input, &EmptyScope),
        Mode::Advanced => crate::eval_with_env(input, &ScientificScope::new(unit)),
        Mode::Metric => convert::convert(input),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    HasInput,
    HasResult,
    HasError,
}

/// A successful calculation, kept in submission order.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    expression: String,
    result: String,
}

impl HistoryEntry {
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn result(&self) -> &str {
        &self.result
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} = {}", self.expression, self.result)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SessionConfig {
    pub mode: Mode,
    pub angle_unit: AngleUnit,
    /// Oldest entries are dropped once the history grows past this.
    /// `None` keeps every entry.
    pub history_limit: Option<usize>,
}

/// A calculator session: the expression being edited, the outcome of the
/// last submission, the memory register and the history log.
///
/// The session expects a single caller; share it across threads only
/// behind a lock.
#[derive(Debug)]
pub struct Session {
    mode: Mode,
    angle_unit: AngleUnit,
    history_limit: Option<usize>,
    state: SessionState,
    expression: String,
    result: Option<String>,
    error: Option<ErrorKind>,
    memory: Option<String>,
    history: VecDeque<HistoryEntry>,
}

impl Default for Session {
    fn default() -> Self {
        Session::new(SessionConfig::default())
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Session {
            mode: config.mode,
            angle_unit: config.angle_unit,
            history_limit: config.history_limit,
            state: SessionState::Idle,
            expression: String::new(),
            result: None,
            error: None,
            memory: None,
            history: VecDeque::new(),
        }
    }

    pub fn append(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.expression.push_str(text);
        self.error = None;
        self.state = SessionState::HasInput;
    }

    pub fn backspace(&mut self) {
        self.expression.pop();
        if self.state == SessionState::HasInput && self.expression.is_empty() {
            self.state = SessionState::Idle;
        }
    }

    /// Reset the expression and last outcome. Memory and history survive.
    pub fn clear(&mut self) {
        self.expression.clear();
        self.result = None;
        self.error = None;
        self.state = SessionState::Idle;
    }

    pub fn change_mode(&mut self, mode: Mode) {
        debug!(from = %self.mode, to = %mode, "mode change");
        self.clear();
        self.mode = mode;
    }

    pub fn toggle_angle_unit(&mut self) {
        self.angle_unit = self.angle_unit.toggled();
        debug!(unit = %self.angle_unit, "angle unit toggled");
    }

    /// Evaluate the current expression under the current mode.
    ///
    /// On success the formatted result is recorded in the history; on
    /// failure only the error slot changes.
    pub fn submit(&mut self) -> Result<String, ErrorKind> {
        debug!(mode = %self.mode, expression = %self.expression, "submit");
        match evaluate(self.mode, self.angle_unit, &self.expression) {
            Ok(value) => {
                let text = value.to_string();
                self.record(HistoryEntry {
                    expression: self.expression.clone(),
                    result: text.clone(),
                });
                self.result = Some(text.clone());
                self.error = None;
                self.state = SessionState::HasResult;
                Ok(text)
            }
            Err(e) => {
                let kind = e.kind();
                debug!(error = %e, kind = ?kind, "evaluation failed");
                self.result = None;
                self.error = Some(kind);
                self.state = SessionState::HasError;
                Err(kind)
            }
        }
    }

    fn record(&mut self, entry: HistoryEntry) {
        self.history.push_back(entry);
        if let Some(limit) = self.history_limit {
            while self.history.len() > limit {
                self.history.pop_front();
            }
        }
    }

    /// Copy the last result into memory. Ignored unless a result is showing.
    pub fn store_memory(&mut self) {
        if self.state == SessionState::HasResult {
            self.memory = self.result.clone();
        }
    }

    /// Append the stored value to the expression, if there is one.
    pub fn recall_memory(&mut self) {
        if let Some(stored) = self.memory.clone() {
            self.append(&stored);
        }
    }

    pub fn clear_memory(&mut self) {
        self.memory = None;
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn error(&self) -> Option<ErrorKind> {
        self.error
    }

    pub fn history(&self) -> &VecDeque<HistoryEntry> {
        &self.history
    }

    pub fn memory(&self) -> Option<&str> {
        self.memory.as_deref()
    }

    pub fn angle_unit(&self) -> AngleUnit {
        self.angle_unit
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submit_in(mode: Mode, input: &str) -> Session {
        let mut session = Session::new(SessionConfig {
            mode,
            ..SessionConfig::default()
        });
        session.append(input);
        let _ = session.submit();
        session
    }

    #[test]
    fn editing() {
        let mut session = Session::default();
        assert_eq!(session.state(), SessionState::Idle);
        session.append("1");
        session.append("2");
        assert_eq!(session.expression(), "12");
        assert_eq!(session.state(), SessionState::HasInput);
        session.backspace();
        assert_eq!(session.expression(), "1");
        assert_eq!(session.state(), SessionState::HasInput);
        session.backspace();
        assert_eq!(session.expression(), "");
        assert_eq!(session.state(), SessionState::Idle);
        session.backspace();
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn outcomes() {
        let session = submit_in(Mode::Basic, "2+3*4");
        assert_eq!(session.result(), Some("14"));
        assert_eq!(session.error(), None);
        assert_eq!(session.state(), SessionState::HasResult);

        let session = submit_in(Mode::Basic, "10/0");
        assert_eq!(session.result(), None);
        assert_eq!(session.error(), Some(ErrorKind::DivisionByZero));
        assert_eq!(session.state(), SessionState::HasError);
        assert_eq!(session.expression(), "10/0");
        assert!(session.history().is_empty());

        let session = submit_in(Mode::Basic, "2+");
        assert_eq!(session.error(), Some(ErrorKind::SyntaxError));

        let session = submit_in(Mode::Basic, "sqrt(4)");
        assert_eq!(session.error(), Some(ErrorKind::GenericError));
    }

    #[test]
    fn empty_submission_is_a_syntax_error() {
        for mode in [Mode::Basic, Mode::Advanced, Mode::Metric].iter() {
            let session = submit_in(*mode, "");
            assert_eq!(session.error(), Some(ErrorKind::SyntaxError), "{}", mode);
            assert_eq!(session.state(), SessionState::HasError);
            assert!(session.history().is_empty());
        }
    }

    #[test]
    fn append_clears_error() {
        let mut session = submit_in(Mode::Basic, "2+");
        session.append("1");
        assert_eq!(session.error(), None);
        assert_eq!(session.state(), SessionState::HasInput);
        assert_eq!(session.submit(), Ok("3".to_string()));
    }

    #[test]
    fn mode_change_resets_input_only() {
        let mut session = submit_in(Mode::Basic, "1+1");
        session.store_memory();
        session.append("+");
        session.change_mode(Mode::Advanced);
        assert_eq!(session.mode(), Mode::Advanced);
        assert_eq!(session.expression(), "");
        assert_eq!(session.result(), None);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.memory(), Some("2"));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn memory_register() {
        let mut session = Session::default();
        session.store_memory();
        assert_eq!(session.memory(), None);

        session.append("0.5*3");
        let _ = session.submit();
        session.store_memory();
        session.clear();
        session.append("2+");
        session.recall_memory();
        assert_eq!(session.expression(), "2+1.5");

        session.clear_memory();
        session.recall_memory();
        assert_eq!(session.expression(), "2+1.5");
        assert_eq!(session.memory(), None);
    }

    #[test]
    fn store_requires_result() {
        let mut session = submit_in(Mode::Basic, "4*4");
        session.store_memory();
        session.append("/0");
        let _ = session.submit();
        session.store_memory();
        assert_eq!(session.memory(), Some("16"));
    }

    #[test]
    fn history_limit() {
        let mut session = Session::new(SessionConfig {
            history_limit: Some(2),
            ..SessionConfig::default()
        });
        for input in &["1", "2", "3"] {
            session.clear();
            session.append(input);
            let _ = session.submit();
        }
        let kept: Vec<String> = session.history().iter().map(|e| e.to_string()).collect();
        assert_eq!(kept, vec!["2 = 2", "3 = 3"]);
    }

    #[test]
    fn mode_names() {
        assert_eq!("Metric".parse::<Mode>(), Ok(Mode::Metric));
        assert!("scientific".parse::<Mode>().is_err());
        assert_eq!(Mode::Advanced.to_string(), "advanced");
    }
}
