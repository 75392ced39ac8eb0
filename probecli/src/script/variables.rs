//! Placeholder variables substituted into script lines.

use indexmap::IndexMap;
use log::info;

/// Location of the VM image volume.
pub const URL: &str = "URL";

/// Name of the VM on the appliance.
pub const VMNAME: &str = "VMNAME";

/// Image file name, derived from [`URL`].
pub const IMAGE: &str = "IMAGE";

/// Default VM name when none is given.
pub const DEFAULT_VMNAME: &str = "default-vm";

/// Result of substituting variables into one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// The line with every defined placeholder replaced.
    pub line: String,

    /// Placeholders present in the line that had no value.
    pub missing: Vec<String>,
}

/// Named placeholder values, in a fixed substitution order.
#[derive(Debug, Clone)]
pub struct VariableStore {
    vars: IndexMap<String, Option<String>>,
}

impl Default for VariableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableStore {
    /// Create a store holding the known variables with their defaults.
    pub fn new() -> Self {
        let mut vars = IndexMap::new();
        vars.insert(URL.to_string(), None);
        vars.insert(VMNAME.to_string(), Some(DEFAULT_VMNAME.to_string()));
        vars.insert(IMAGE.to_string(), None);
        Self { vars }
    }

    /// Set (or clear, with `None`) a variable's value.
    pub fn set(&mut self, name: impl Into<String>, value: Option<String>) {
        self.vars.insert(name.into(), value);
    }

    /// Set `URL` and derive `IMAGE` from its last path segment.
    pub fn set_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        let image = url
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self.set(URL, Some(url));
        self.set(IMAGE, image);
    }

    /// Get a variable's value. `None` if unknown or undefined.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).and_then(|v| v.as_deref())
    }

    /// Names of all known variables.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    /// Replace every `<NAME>` placeholder in `line`.
    ///
    /// A placeholder whose variable has no value is left in place and
    /// reported; the other placeholders in the line are still replaced.
    pub fn substitute(&self, line: &str) -> Substitution {
        let mut out = line.to_string();
        let mut missing = Vec::new();

        for (name, value) in &self.vars {
            let token = format!("<{}>", name);
            if !out.contains(&token) {
                continue;
            }
            match value {
                Some(value) => out = out.replace(&token, value),
                None => {
                    info!(
                        "Found line with variable {} but no replacement value defined",
                        name
                    );
                    missing.push(name.clone());
                }
            }
        }

        Substitution { line: out, missing }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let vars = VariableStore::new();
        assert_eq!(vars.get(VMNAME), Some(DEFAULT_VMNAME));
        assert_eq!(vars.get(URL), None);
        assert_eq!(vars.names().collect::<Vec<_>>(), vec![URL, VMNAME, IMAGE]);
    }

    #[test]
    fn test_substitute_all_occurrences() {
        let mut vars = VariableStore::new();
        vars.set(VMNAME, Some("probe1".into()));
        let sub = vars.substitute("vm <VMNAME> rename <VMNAME>-old");
        assert_eq!(sub.line, "vm probe1 rename probe1-old");
        assert!(sub.missing.is_empty());
    }

    #[test]
    fn test_url_derives_image() {
        let mut vars = VariableStore::new();
        vars.set_url("http://files.lab/images/pan-vm-10.1.qcow2");
        assert_eq!(vars.get(IMAGE), Some("pan-vm-10.1.qcow2"));

        let sub = vars.substitute("vm volume fetch url <URL> filename <IMAGE>");
        assert_eq!(
            sub.line,
            "vm volume fetch url http://files.lab/images/pan-vm-10.1.qcow2 filename pan-vm-10.1.qcow2"
        );
    }

    #[test]
    fn test_missing_variable_does_not_block_others() {
        let vars = VariableStore::new();
        let sub = vars.substitute("vm create <VMNAME> image <IMAGE>");
        assert_eq!(sub.line, "vm create default-vm image <IMAGE>");
        assert_eq!(sub.missing, vec![IMAGE.to_string()]);
    }

    #[test]
    fn test_unknown_placeholders_untouched() {
        let vars = VariableStore::new();
        let sub = vars.substitute("echo <OTHER>");
        assert_eq!(sub.line, "echo <OTHER>");
        assert!(sub.missing.is_empty());
    }
}
