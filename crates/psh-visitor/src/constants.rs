//! Shared static tables for the analysis visitors.

use phf::{Map, Set, phf_map, phf_set};

/// Commands considered dangerous by both validator tiers and the security
/// visitor.
pub static DANGEROUS_COMMANDS: Map<&'static str, &'static str> = phf_map! {
    "eval" => "Dynamic code execution - high risk of injection",
    "source" => "Loading external scripts - verify source is trusted",
    "." => "Loading external scripts - verify source is trusted",
    "exec" => "Process replacement - ensure arguments are validated",
};

/// Commands that modify system state in sensitive ways.
pub static SENSITIVE_COMMANDS: Map<&'static str, &'static str> = phf_map! {
    "chmod" => "File permission changes",
    "chown" => "File ownership changes",
    "rm" => "File deletion",
    "dd" => "Low-level disk operations",
    "mkfs" => "Filesystem creation",
    "fdisk" => "Disk partitioning",
};

/// Shell builtin commands.
pub static SHELL_BUILTINS: Set<&'static str> = phf_set! {
    // I/O
    "echo", "printf", "read",
    // Navigation
    "cd", "pwd", "dirs", "pushd", "popd",
    // Variables
    "export", "unset", "set", "declare", "typeset", "local", "readonly",
    "shift", "getopts",
    // Control
    "exit", "return", "break", "continue", "eval", "exec",
    "source", ".", "true", "false", ":",
    // Job control
    "jobs", "fg", "bg", "wait", "kill", "disown", "suspend",
    // History
    "history", "fc",
    // Aliases
    "alias", "unalias",
    // Completion
    "complete", "compgen", "compopt",
    // Introspection
    "command", "builtin", "enable", "help", "type", "hash",
    // Signals / limits
    "trap", "umask", "ulimit", "times",
    // Test
    "test", "[", "[[", "]]",
    // Other
    "shopt", "caller", "bind", "let", "logout",
};

/// Common command typos and their likely intent.
pub static COMMON_TYPOS: Map<&'static str, &'static str> = phf_map! {
    // grep typos
    "gerp" => "grep", "grpe" => "grep", "rgep" => "grep",

    // Basic commands
    "sl" => "ls", "l" => "ls", "ll" => "ls -l",
    "mr" => "rm", "r" => "rm",
    "vm" => "mv", "v" => "mv",
    "pc" => "cp", "c" => "cp",
    "dc" => "cd",

    // echo/cat
    "ech" => "echo", "ehco" => "echo", "eho" => "echo",
    "cta" => "cat", "ca" => "cat",

    // Programming languages
    "pyton" => "python", "pythn" => "python", "phyton" => "python",
    "pyhton" => "python", "pytho" => "python",
    "noed" => "node", "ndoe" => "node",
    "jaav" => "java", "jva" => "java",

    // Package managers
    "atp" => "apt", "apt-gte" => "apt-get",
    "ymu" => "yum", "ym" => "yum",
    "nmp" => "npm", "npn" => "npm",
    "ppi" => "pip", "ipp" => "pip",

    // Git
    "gti" => "git", "gi" => "git", "got" => "git",

    // Make
    "maek" => "make", "mkae" => "make",
};

/// Deprecated commands with a modern replacement.
pub static DEPRECATED_COMMANDS: Map<&'static str, &'static str> = phf_map! {
    "which" => "Consider using 'command -v' or 'type' instead of 'which'",
    "ifconfig" => "Consider using 'ip' instead of deprecated 'ifconfig'",
    "netstat" => "Consider using 'ss' instead of deprecated 'netstat'",
    "service" => "Consider using 'systemctl' instead of 'service' on systemd systems",
};

/// Variables that are always considered defined.
pub static SPECIAL_VARIABLES: Set<&'static str> = phf_set! {
    "?", "$", "!", "#", "@", "*", "-", "_", "0",
    "HOME", "PATH", "PWD", "OLDPWD", "SHELL", "USER",
    "HOSTNAME", "HOSTTYPE", "OSTYPE", "MACHTYPE",
    "RANDOM", "LINENO", "SECONDS", "HISTCMD",
    "BASH_VERSION", "BASH", "IFS", "PS1", "PS2", "PS3", "PS4",
    "PPID", "UID", "EUID", "GROUPS", "SHELLOPTS",
    "PIPESTATUS", "FUNCNAME", "BASH_SOURCE", "BASH_LINENO",
    "REPLY", "HISTFILE", "HISTSIZE", "HISTFILESIZE",
    "LANG", "LC_ALL", "LC_COLLATE", "LC_CTYPE", "LC_MESSAGES",
    "TERM", "COLUMNS", "LINES",
};

/// Commands whose arguments commonly contain intentional glob patterns.
pub static GLOBBING_COMMANDS: Set<&'static str> = phf_set! {
    "ls", "rm", "cp", "mv", "find", "chmod", "chown",
};

/// Shells that execute their argument or stdin as code.
pub static SHELL_INTERPRETERS: Set<&'static str> = phf_set! {
    "sh", "bash", "zsh", "ksh",
};

/// Root-level paths that make `rm -rf` catastrophic.
pub static DANGEROUS_RM_TARGETS: Set<&'static str> = phf_set! {
    "/", "/*", "/bin", "/usr", "/etc", "/var", "/home",
};

/// Files whose modification usually signals an attack or a mistake.
pub static SENSITIVE_FILES: Set<&'static str> = phf_set! {
    "/etc/passwd", "/etc/shadow", "/etc/sudoers",
};
