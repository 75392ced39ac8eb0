//! EndaceProbe appliance platform.
//!
//! Covers the probe CLI itself, the CMS that manages fleets of probes, and
//! the serial console of VMs hosted on a probe (reached with
//! `vm console <name>`, which prints the telnet-style escape banner).
//!
//! # Prompt Examples
//!
//! ```text
//! probe1 >                                   # standard mode
//! probe1 #                                   # enable mode
//! probe1 (config) #                          # configuration mode
//! Escape character is: 'Ctrl ^'              # VM console attached
//! ...leave configuration mode anyway:        # CMS-managed change guard
//! % Unrecognized command "shw".              # inline error
//! ```

use crate::platform::PlatformDefinition;

/// Platform name.
pub const NAME: &str = "endace_probe";

/// Create the EndaceProbe platform definition.
pub fn platform() -> PlatformDefinition {
    PlatformDefinition::new(NAME)
        .with_prompt(r".*{host}\s[#>]\s")
        .with_prompt(r".*{host}\s\(config\)")
        .with_prompt(r"Escape\scharacter\sis:\s'Ctrl\s\^'")
        .with_confirmation(r".*configuration\smode\sanyway:\s")
        .with_error_pattern(r"(?P<error>\n%\s.*)\n")
        // enable / configure terminal
        .with_profile_passthrough(r"^(?:en|co\st)")
        .with_terminal_size(80, 40)
}
