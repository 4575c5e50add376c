//! Application-wide constants.
//!
//! This module defines the application name plus the fixed identifiers of the
//! FS Copilot definition format and the TFDi MD-11 data layout.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "MD-11 Definition Generator";

/// The binary name of the application (used in command examples).
pub const APP_BINARY_NAME: &str = "defgen";

/// Namespace token that prefixes every aircraft state variable.
pub const VARIABLE_NAMESPACE: &str = "MD11_";

/// Scope prefix of a local (L:) variable reference.
pub const LOCAL_VARIABLE_SCOPE: &str = "L:";

/// File name of the known-variable set inside the data directory.
pub const VARIABLES_FILE: &str = "variables.json";

/// File name of the main aircraft definition document.
pub const AIRCRAFT_FILE: &str = "TFDi_Design_MD-11.yaml";

/// Directory holding module documents, relative to the aircraft document.
pub const MODULES_SUBDIR: &str = "modules/tfdi-md11";

/// File name prefix of every generated module document.
pub const MODULE_FILE_PREFIX: &str = "TFDi_MD11_";

/// Marker appended to bare-string events that are present in a definition file.
pub const PRESENT_MARKER: &str = " // present";

/// Header written when the aircraft document is created from scratch.
pub const DEFAULT_AIRCRAFT_HEADER: &str = "# TFDi Design MD-11 Configuration File for FS Copilot\n\
# Events reference: https://docs.tfdidesign.com/md11/integration-guide/events\n\
# Variables reference: https://docs.tfdidesign.com/md11/integration-guide/variables";

/// Reference lines that follow the title of a module document header.
pub const MODULE_HEADER_REFERENCES: &str = "# Events reference: https://docs.tfdidesign.com/md11/integration-guide/events\n\
# Variables reference: https://docs.tfdidesign.com/md11/integration-guide/variables";

/// Returns the include path of a module document, as listed in the aircraft document.
#[must_use]
pub fn module_include_path(name: &str) -> String {
    format!("{MODULES_SUBDIR}/{}", module_file_name(name))
}

/// Returns the file name of a module document.
#[must_use]
pub fn module_file_name(name: &str) -> String {
    format!("{MODULE_FILE_PREFIX}{name}.yaml")
}
