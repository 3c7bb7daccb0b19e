//! Finding catalogue.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use skims_core::constants::DESCRIPTION_KEY_PREFIX;
use skims_core::errors::QueryError;

/// A vulnerability class the engine can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Finding {
    F001,
    F004,
    F008,
    F034,
    F042,
    F052,
    F063,
    F073,
    F117,
}

impl Finding {
    pub const ALL: [Finding; 9] = [
        Finding::F001,
        Finding::F004,
        Finding::F008,
        Finding::F034,
        Finding::F042,
        Finding::F052,
        Finding::F063,
        Finding::F073,
        Finding::F117,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Finding::F001 => "F001",
            Finding::F004 => "F004",
            Finding::F008 => "F008",
            Finding::F034 => "F034",
            Finding::F042 => "F042",
            Finding::F052 => "F052",
            Finding::F063 => "F063",
            Finding::F073 => "F073",
            Finding::F117 => "F117",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Finding::F001 => "SQL injection",
            Finding::F004 => "Remote command execution",
            Finding::F008 => "Reflected cross-site scripting",
            Finding::F034 => "Insecure generation of random numbers",
            Finding::F042 => "Insecurely generated cookies",
            Finding::F052 => "Insecure encryption algorithm",
            Finding::F063 => "Lack of data validation - Path traversal",
            Finding::F073 => "Improper authorization control - Switch without default",
            Finding::F117 => "Insecure exceptions",
        }
    }

    pub fn cwe(&self) -> u32 {
        match self {
            Finding::F001 => 89,
            Finding::F004 => 78,
            Finding::F008 => 79,
            Finding::F034 => 330,
            Finding::F042 => 614,
            Finding::F052 => 310,
            Finding::F063 => 22,
            Finding::F073 => 478,
            Finding::F117 => 396,
        }
    }

    /// Translation key of the human-readable description.
    pub fn description_key(&self) -> String {
        format!("{DESCRIPTION_KEY_PREFIX}.{}.description", &self.code()[1..])
    }

    /// Findings that trace user input into a sink.
    pub fn is_injection(&self) -> bool {
        matches!(
            self,
            Finding::F001 | Finding::F004 | Finding::F008 | Finding::F063
        )
    }

    /// Findings for which a variable declared with a request type, or a
    /// parameter bound from the request, is dangerous on its own.
    pub fn distrusts_request_bindings(&self) -> bool {
        matches!(
            self,
            Finding::F001 | Finding::F004 | Finding::F042 | Finding::F063
        )
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Finding {
    type Err = QueryError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Finding::ALL
            .into_iter()
            .find(|f| f.code().eq_ignore_ascii_case(code.trim()))
            .ok_or_else(|| QueryError::UnknownFinding(code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_from_str() {
        for finding in Finding::ALL {
            assert_eq!(finding.code().parse::<Finding>().ok(), Some(finding));
        }
        assert!("F999".parse::<Finding>().is_err());
    }

    #[test]
    fn description_keys_drop_the_prefix_letter() {
        assert_eq!(Finding::F004.description_key(), "criteria.vulns.004.description");
    }

    #[test]
    fn request_bindings_are_distrusted_for_cookie_findings() {
        assert!(Finding::F042.distrusts_request_bindings());
        assert!(Finding::F063.distrusts_request_bindings());
        assert!(!Finding::F034.distrusts_request_bindings());
        assert!(!Finding::F117.distrusts_request_bindings());
    }
}
