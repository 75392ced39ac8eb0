//! Command scripts: reading lines, macros and variable substitution.
//!
//! A script is line-oriented text:
//!
//! | Line | Meaning |
//! |------|---------|
//! | `# text` | Comment, skipped |
//! | blank | Skipped |
//! | `@prompt <regex>` | Add a prompt pattern before connecting |
//! | `@sleep <seconds>` | Pause between commands |
//! | `@exit` | Stop the run |
//! | anything else | Sent to the device, after `<NAME>` substitution |

mod macros;
mod reader;
mod variables;

pub use macros::{Macro, MacroInvocation, Mode};
pub use reader::{ScriptLine, ScriptLines, ScriptReader};
pub use variables::{Substitution, VariableStore, IMAGE, URL, VMNAME};
