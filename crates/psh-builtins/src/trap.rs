//! `trap` builtin surface over the trap table.

use std::io::Write;

use psh_source::TrapManager;

/// `trap [-lp] [[ACTION] SIGNAL…]`
///
/// - no arguments: print all traps
/// - `-l`: list signal names with numbers
/// - `-p [NAME…]`: print currently set traps (filtered)
/// - `ACTION NAME…`: set (`-` resets, empty string ignores)
/// - `--` ends option processing
///
/// Exit codes: 0 on success, 1 on invalid signal, 2 on usage errors.
pub fn trap_builtin(
    args: &[String],
    traps: &mut TrapManager,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> i32 {
    let mut operands: Vec<&String> = Vec::new();
    let mut list_signals = false;
    let mut print_traps = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-l" => list_signals = true,
            "-p" => print_traps = true,
            "--" => {
                operands.extend(args[i + 1..].iter());
                i = args.len();
                break;
            }
            // A lone `-` is the reset action, caught by the operand arm.
            option if option.starts_with('-') && option.len() > 1 => {
                let _ = writeln!(err, "trap: {option}: invalid option");
                let _ = writeln!(err, "trap: usage: trap [-lp] [[arg] signal_spec ...]");
                return 2;
            }
            _ => {
                operands.extend(args[i..].iter());
                i = args.len();
                break;
            }
        }
        i += 1;
    }

    if list_signals {
        for line in traps.list_signals() {
            let _ = writeln!(out, "{line}");
        }
        return 0;
    }

    if print_traps {
        let filter: Vec<String> = operands.iter().map(|s| (*s).clone()).collect();
        let listing = if filter.is_empty() {
            traps.show_traps(None)
        } else {
            traps.show_traps(Some(&filter))
        };
        if !listing.is_empty() {
            let _ = writeln!(out, "{listing}");
        }
        return 0;
    }

    if operands.is_empty() {
        let listing = traps.show_traps(None);
        if !listing.is_empty() {
            let _ = writeln!(out, "{listing}");
        }
        return 0;
    }

    if operands.len() < 2 {
        let _ = writeln!(err, "trap: usage: trap [-lp] [[arg] signal_spec ...]");
        return 2;
    }

    let action = operands[0].as_str();
    let signals: Vec<String> = operands[1..].iter().map(|s| (*s).clone()).collect();
    match traps.set_trap(action, &signals) {
        Ok(()) => 0,
        Err(error) => {
            let _ = writeln!(err, "{error}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(traps: &mut TrapManager, args: &[&str]) -> (i32, String, String) {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = trap_builtin(&args, traps, &mut out, &mut err);
        (code, String::from_utf8_lossy(&out).to_string(), String::from_utf8_lossy(&err).to_string())
    }

    #[test]
    fn set_and_print_traps() {
        let mut traps = TrapManager::new();
        let (code, _, _) = call(&mut traps, &["trap", "echo bye", "EXIT"]);
        assert_eq!(code, 0);

        let (code, out, _) = call(&mut traps, &["trap"]);
        assert_eq!(code, 0);
        assert_eq!(out.trim_end(), "trap -- 'echo bye' EXIT");
    }

    #[test]
    fn double_dash_ends_options() {
        let mut traps = TrapManager::new();
        let (code, _, _) = call(&mut traps, &["trap", "--", "echo hi", "INT"]);
        assert_eq!(code, 0);
        assert_eq!(traps.get("INT"), Some("echo hi"));
    }

    #[test]
    fn dash_action_resets() {
        let mut traps = TrapManager::new();
        call(&mut traps, &["trap", "echo x", "INT"]);
        let (code, _, _) = call(&mut traps, &["trap", "-", "INT"]);
        assert_eq!(code, 0);
        assert_eq!(traps.get("INT"), None);
    }

    #[test]
    fn empty_action_ignores() {
        let mut traps = TrapManager::new();
        let (code, _, _) = call(&mut traps, &["trap", "", "HUP"]);
        assert_eq!(code, 0);
        assert_eq!(traps.get("HUP"), Some(""));
    }

    #[test]
    fn list_option_prints_signals() {
        let mut traps = TrapManager::new();
        let (code, out, _) = call(&mut traps, &["trap", "-l"]);
        assert_eq!(code, 0);
        assert!(out.contains("2) SIGINT"));
        assert!(out.contains("-) EXIT"));
    }

    #[test]
    fn print_option_filters() {
        let mut traps = TrapManager::new();
        call(&mut traps, &["trap", "a", "INT"]);
        call(&mut traps, &["trap", "b", "TERM"]);
        let (code, out, _) = call(&mut traps, &["trap", "-p", "TERM"]);
        assert_eq!(code, 0);
        assert_eq!(out.trim_end(), "trap -- 'b' TERM");
    }

    #[test]
    fn invalid_signal_exits_one() {
        let mut traps = TrapManager::new();
        let (code, _, err) = call(&mut traps, &["trap", "echo", "BOGUS"]);
        assert_eq!(code, 1);
        assert_eq!(err.trim_end(), "trap: BOGUS: invalid signal specification");
    }

    #[test]
    fn usage_errors_exit_two() {
        let mut traps = TrapManager::new();
        let (code, _, err) = call(&mut traps, &["trap", "-x"]);
        assert_eq!(code, 2);
        assert!(err.contains("usage"));

        let (code, _, _) = call(&mut traps, &["trap", "lonely-action"]);
        assert_eq!(code, 2);
    }
}
