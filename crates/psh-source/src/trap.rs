//! Trap table.
//!
//! Pure data model: a mapping from signal names (and the pseudo-signals
//! `EXIT`, `DEBUG`, `ERR`) to action text. Signal *delivery* lives outside
//! the core; a host that receives signals asynchronously queues them and
//! calls [`TrapManager::execute_trap`] between commands on the core
//! thread.

use std::collections::BTreeMap;
use std::io::Write;

use phf::{Map, phf_map};
use thiserror::Error;

use crate::traits::Executor;

/// Signal names to numbers (Linux numbering).
static SIGNAL_NUMBERS: Map<&'static str, u32> = phf_map! {
    "HUP" => 1, "INT" => 2, "QUIT" => 3, "ILL" => 4, "TRAP" => 5,
    "ABRT" => 6, "BUS" => 7, "FPE" => 8, "KILL" => 9, "USR1" => 10,
    "SEGV" => 11, "USR2" => 12, "PIPE" => 13, "ALRM" => 14, "TERM" => 15,
    "STKFLT" => 16, "CHLD" => 17, "CONT" => 18, "STOP" => 19, "TSTP" => 20,
    "TTIN" => 21, "TTOU" => 22, "URG" => 23, "XCPU" => 24, "XFSZ" => 25,
    "VTALRM" => 26, "PROF" => 27, "WINCH" => 28, "IO" => 29, "PWR" => 30,
    "SYS" => 31,
};

const PSEUDO_SIGNALS: &[&str] = &["EXIT", "DEBUG", "ERR"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrapError {
    #[error("trap: {0}: invalid signal specification")]
    InvalidSignal(String),
}

/// Process-wide trap handler table.
///
/// Keys are canonical signal names (`INT`, `EXIT`, …) or decimal signal
/// numbers as strings when the signal was specified numerically. Values
/// are action text; an empty string means "ignore", absence means unset.
#[derive(Debug, Default)]
pub struct TrapManager {
    handlers: BTreeMap<String, String>,
}

impl TrapManager {
    pub fn new() -> Self {
        TrapManager::default()
    }

    /// Canonicalizes a signal spec: case-insensitive names with an
    /// optional `SIG` prefix, pseudo-signals, or decimal numbers.
    pub fn canonical_signal(&self, spec: &str) -> Result<String, TrapError> {
        let upper = spec.to_uppercase();
        let name = upper.strip_prefix("SIG").unwrap_or(&upper);
        if SIGNAL_NUMBERS.contains_key(name) || PSEUDO_SIGNALS.contains(&name) {
            return Ok(name.to_string());
        }
        match name.parse::<u32>() {
            Ok(number) if (1..=31).contains(&number) => Ok(number.to_string()),
            _ => Err(TrapError::InvalidSignal(spec.to_string())),
        }
    }

    /// Sets, ignores (empty action), or resets (`-`) traps for `signals`.
    pub fn set_trap(&mut self, action: &str, signals: &[String]) -> Result<(), TrapError> {
        for spec in signals {
            let signal = self.canonical_signal(spec)?;
            if action == "-" {
                self.handlers.remove(&signal);
            } else {
                self.handlers.insert(signal, action.to_string());
            }
        }
        Ok(())
    }

    /// Resets traps to default behavior.
    pub fn remove_trap(&mut self, signals: &[String]) -> Result<(), TrapError> {
        self.set_trap("-", signals)
    }

    /// The currently set action for a signal, if any.
    pub fn get(&self, signal: &str) -> Option<&str> {
        self.handlers.get(signal).map(String::as_str)
    }

    /// `trap -- '<action>' NAME` lines in sorted signal order, optionally
    /// filtered. Unknown filter entries are skipped silently.
    pub fn show_traps(&self, signals: Option<&[String]>) -> String {
        let selected: Vec<&String> = match signals {
            None => self.handlers.keys().collect(),
            Some(filter) => {
                let wanted: Vec<String> = filter
                    .iter()
                    .filter_map(|spec| self.canonical_signal(spec).ok())
                    .collect();
                self.handlers.keys().filter(|k| wanted.contains(*k)).collect()
            }
        };
        let mut lines = Vec::with_capacity(selected.len());
        for signal in selected {
            if let Some(action) = self.handlers.get(signal) {
                lines.push(format!("trap -- '{action}' {signal}"));
            }
        }
        lines.join("\n")
    }

    /// `N) SIGNAME` lines (pseudo-signals get ` -)`), sorted.
    pub fn list_signals(&self) -> Vec<String> {
        let mut lines: Vec<String> = SIGNAL_NUMBERS
            .entries()
            .map(|(name, number)| format!("{number:2}) SIG{name}"))
            .collect();
        for pseudo in PSEUDO_SIGNALS {
            lines.push(format!(" -) {pseudo}"));
        }
        lines.sort();
        lines
    }

    /// Runs the action for `signal` through the executor with history
    /// disabled. The saved exit code is restored afterwards for every
    /// signal except `EXIT`. Action failures are logged, never propagated.
    pub fn execute_trap(
        &self,
        signal: &str,
        executor: &mut dyn Executor,
        last_exit_code: &mut i32,
        stderr: &mut dyn Write,
    ) {
        let Some(action) = self.handlers.get(signal) else { return };
        if action.is_empty() {
            return;
        }
        let saved = *last_exit_code;
        match executor.run_command(action, false) {
            Ok(code) => {
                *last_exit_code = if signal == "EXIT" { code } else { saved };
            }
            Err(error) => {
                let _ = writeln!(stderr, "trap: error executing trap for {signal}: {error}");
            }
        }
    }

    pub fn execute_exit_trap(
        &self,
        executor: &mut dyn Executor,
        last_exit_code: &mut i32,
        stderr: &mut dyn Write,
    ) {
        self.execute_trap("EXIT", executor, last_exit_code, stderr);
    }

    /// Fires before each command when a DEBUG trap is set.
    pub fn execute_debug_trap(
        &self,
        executor: &mut dyn Executor,
        last_exit_code: &mut i32,
        stderr: &mut dyn Write,
    ) {
        self.execute_trap("DEBUG", executor, last_exit_code, stderr);
    }

    /// Fires only when the previous command failed.
    pub fn execute_err_trap(
        &self,
        exit_code: i32,
        executor: &mut dyn Executor,
        last_exit_code: &mut i32,
        stderr: &mut dyn Write,
    ) {
        if exit_code != 0 {
            self.execute_trap("ERR", executor, last_exit_code, stderr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ExecError;
    use psh_ast::{StatementList, TopLevel};

    /// Records commands it was asked to run.
    #[derive(Default)]
    struct RecordingExecutor {
        commands: Vec<String>,
        exit_code: i32,
        fail: bool,
    }

    impl Executor for RecordingExecutor {
        fn execute_toplevel(&mut self, _ast: &TopLevel) -> Result<i32, ExecError> {
            Ok(self.exit_code)
        }

        fn execute_command_list(&mut self, _list: &StatementList) -> Result<i32, ExecError> {
            Ok(self.exit_code)
        }

        fn run_command(&mut self, source: &str, add_to_history: bool) -> Result<i32, ExecError> {
            assert!(!add_to_history, "trap actions must not reach history");
            if self.fail {
                return Err(ExecError::Failure("boom".to_string()));
            }
            self.commands.push(source.to_string());
            Ok(self.exit_code)
        }
    }

    #[test]
    fn canonicalizes_names_numbers_and_case() {
        let traps = TrapManager::new();
        assert_eq!(traps.canonical_signal("INT").unwrap(), "INT");
        assert_eq!(traps.canonical_signal("int").unwrap(), "INT");
        assert_eq!(traps.canonical_signal("SIGTERM").unwrap(), "TERM");
        assert_eq!(traps.canonical_signal("15").unwrap(), "15");
        assert_eq!(traps.canonical_signal("exit").unwrap(), "EXIT");
        assert!(traps.canonical_signal("NOPE").is_err());
        assert!(traps.canonical_signal("99").is_err());
    }

    #[test]
    fn set_reset_and_ignore() {
        let mut traps = TrapManager::new();
        traps.set_trap("echo bye", &["EXIT".into(), "INT".into()]).unwrap();
        assert_eq!(traps.get("EXIT"), Some("echo bye"));

        traps.set_trap("", &["INT".into()]).unwrap();
        assert_eq!(traps.get("INT"), Some(""));

        traps.set_trap("-", &["EXIT".into()]).unwrap();
        assert_eq!(traps.get("EXIT"), None);
    }

    #[test]
    fn invalid_signal_rejects_whole_spec() {
        let mut traps = TrapManager::new();
        let err = traps.set_trap("x", &["WAT".into()]).unwrap_err();
        assert_eq!(err.to_string(), "trap: WAT: invalid signal specification");
    }

    #[test]
    fn show_traps_sorted_and_quoted() {
        let mut traps = TrapManager::new();
        traps.set_trap("echo int", &["INT".into()]).unwrap();
        traps.set_trap("cleanup", &["EXIT".into()]).unwrap();
        traps.set_trap("", &["HUP".into()]).unwrap();
        assert_eq!(
            traps.show_traps(None),
            "trap -- '' HUP\ntrap -- 'cleanup' EXIT\ntrap -- 'echo int' INT"
        );
        assert_eq!(
            traps.show_traps(Some(&["INT".to_string()])),
            "trap -- 'echo int' INT"
        );
    }

    #[test]
    fn list_signals_includes_pseudo_signals() {
        let traps = TrapManager::new();
        let listing = traps.list_signals();
        assert!(listing.contains(&" -) EXIT".to_string()));
        assert!(listing.contains(&" 2) SIGINT".to_string()));
        assert!(listing.contains(&"15) SIGTERM".to_string()));
        // Pseudo-signals sort before numbered signals.
        assert!(listing[0].starts_with(" -)"));
    }

    #[test]
    fn execute_trap_restores_exit_code_except_for_exit() {
        let mut traps = TrapManager::new();
        traps.set_trap("handler", &["INT".into(), "EXIT".into()]).unwrap();

        let mut executor = RecordingExecutor { exit_code: 7, ..Default::default() };
        let mut last = 42;
        let mut err = Vec::new();

        traps.execute_trap("INT", &mut executor, &mut last, &mut err);
        assert_eq!(last, 42);
        assert_eq!(executor.commands, vec!["handler"]);

        traps.execute_exit_trap(&mut executor, &mut last, &mut err);
        assert_eq!(last, 7);
    }

    #[test]
    fn empty_and_missing_actions_do_nothing() {
        let mut traps = TrapManager::new();
        traps.set_trap("", &["INT".into()]).unwrap();
        let mut executor = RecordingExecutor::default();
        let mut last = 0;
        let mut err = Vec::new();
        traps.execute_trap("INT", &mut executor, &mut last, &mut err);
        traps.execute_trap("TERM", &mut executor, &mut last, &mut err);
        assert!(executor.commands.is_empty());
    }

    #[test]
    fn action_failures_are_logged_not_propagated() {
        let mut traps = TrapManager::new();
        traps.set_trap("explode", &["TERM".into()]).unwrap();
        let mut executor = RecordingExecutor { fail: true, ..Default::default() };
        let mut last = 0;
        let mut err = Vec::new();
        traps.execute_trap("TERM", &mut executor, &mut last, &mut err);
        let logged = String::from_utf8(err).unwrap();
        assert!(logged.contains("trap: error executing trap for TERM"));
    }

    #[test]
    fn err_trap_fires_only_on_failure() {
        let mut traps = TrapManager::new();
        traps.set_trap("on_error", &["ERR".into()]).unwrap();
        let mut executor = RecordingExecutor::default();
        let mut last = 0;
        let mut err = Vec::new();

        traps.execute_err_trap(0, &mut executor, &mut last, &mut err);
        assert!(executor.commands.is_empty());

        traps.execute_err_trap(1, &mut executor, &mut last, &mut err);
        assert_eq!(executor.commands, vec!["on_error"]);
    }

    #[test]
    fn numeric_signals_round_trip() {
        let mut traps = TrapManager::new();
        traps.set_trap("handler", &["2".into()]).unwrap();
        assert_eq!(traps.get("2"), Some("handler"));
        assert_eq!(traps.show_traps(None), "trap -- 'handler' 2");
    }
}
