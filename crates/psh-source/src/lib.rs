//! Script and interactive source processing for the shell front end.
//!
//! [`SourceProcessor`] turns a stream of input lines into parsed,
//! executable trees: it buffers lines until the parser stops asking for
//! more input, expands aliases, collects here-document bodies, emits
//! debug dumps, and dispatches to the host's [`Executor`]. The crate also
//! owns the [`TrapManager`] data model and the collaborator traits hosts
//! implement.

mod input;
mod preflight;
mod processor;
mod trap;
mod traits;

pub use input::{FileInput, InputSource, ReaderInput, StringInput};
pub use preflight::{PreflightError, check_script_file};
pub use processor::{ProcessorConfig, SourceProcessor, format_ast};
pub use trap::{TrapError, TrapManager};
pub use traits::{AliasExpander, ExecError, Executor, HistorySink, NoAliases, NoHistory};
