//! Names of the queries, as reported on each vulnerability.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::finding::Finding;
use crate::scanner::language_detect::Language;

/// How a vulnerability was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Technique {
    /// Static analysis of source code.
    #[serde(rename = "BSAST")]
    Bsast,
    /// Analysis of a running application.
    #[serde(rename = "ASAST")]
    Asast,
}

/// One query over the GraphDB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Method {
    JavaInsecureExceptions,
    CSharpInsecureExceptions,
    PythonInsecureExceptions,
    JavaSwitchWithoutDefault,
    CSharpSwitchWithoutDefault,
    JavascriptSwitchWithoutDefault,
    TypescriptSwitchWithoutDefault,
    GoSwitchWithoutDefault,
    JavaSqlInjection,
    CSharpSqlInjection,
    JavaCommandInjection,
    CSharpCommandInjection,
    JavaReflectedXss,
    JavaInsecureRandom,
    JavaInsecureCookie,
    JavaPathTraversal,
    CSharpPathTraversal,
    JavaInsecureCipher,
    KotlinInsecureCipher,
    CSharpInsecureCipher,
}

impl Method {
    pub const ALL: [Method; 20] = [
        Method::JavaInsecureExceptions,
        Method::CSharpInsecureExceptions,
        Method::PythonInsecureExceptions,
        Method::JavaSwitchWithoutDefault,
        Method::CSharpSwitchWithoutDefault,
        Method::JavascriptSwitchWithoutDefault,
        Method::TypescriptSwitchWithoutDefault,
        Method::GoSwitchWithoutDefault,
        Method::JavaSqlInjection,
        Method::CSharpSqlInjection,
        Method::JavaCommandInjection,
        Method::CSharpCommandInjection,
        Method::JavaReflectedXss,
        Method::JavaInsecureRandom,
        Method::JavaInsecureCookie,
        Method::JavaPathTraversal,
        Method::CSharpPathTraversal,
        Method::JavaInsecureCipher,
        Method::KotlinInsecureCipher,
        Method::CSharpInsecureCipher,
    ];

    pub fn finding(&self) -> Finding {
        match self {
            Self::JavaInsecureExceptions
            | Self::CSharpInsecureExceptions
            | Self::PythonInsecureExceptions => Finding::F117,
            Self::JavaSwitchWithoutDefault
            | Self::CSharpSwitchWithoutDefault
            | Self::JavascriptSwitchWithoutDefault
            | Self::TypescriptSwitchWithoutDefault
            | Self::GoSwitchWithoutDefault => Finding::F073,
            Self::JavaSqlInjection | Self::CSharpSqlInjection => Finding::F001,
            Self::JavaCommandInjection | Self::CSharpCommandInjection => Finding::F004,
            Self::JavaReflectedXss => Finding::F008,
            Self::JavaInsecureRandom => Finding::F034,
            Self::JavaInsecureCookie => Finding::F042,
            Self::JavaPathTraversal | Self::CSharpPathTraversal => Finding::F063,
            Self::JavaInsecureCipher | Self::KotlinInsecureCipher | Self::CSharpInsecureCipher => {
                Finding::F052
            }
        }
    }

    pub fn language(&self) -> Language {
        match self {
            Self::CSharpInsecureExceptions
            | Self::CSharpSwitchWithoutDefault
            | Self::CSharpSqlInjection
            | Self::CSharpCommandInjection
            | Self::CSharpPathTraversal
            | Self::CSharpInsecureCipher => Language::CSharp,
            Self::PythonInsecureExceptions => Language::Python,
            Self::JavascriptSwitchWithoutDefault => Language::JavaScript,
            Self::TypescriptSwitchWithoutDefault => Language::TypeScript,
            Self::GoSwitchWithoutDefault => Language::Go,
            Self::KotlinInsecureCipher => Language::Kotlin,
            _ => Language::Java,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::JavaInsecureExceptions => "java_insecure_exceptions",
            Self::CSharpInsecureExceptions => "c_sharp_insecure_exceptions",
            Self::PythonInsecureExceptions => "python_insecure_exceptions",
            Self::JavaSwitchWithoutDefault => "java_switch_without_default",
            Self::CSharpSwitchWithoutDefault => "c_sharp_switch_without_default",
            Self::JavascriptSwitchWithoutDefault => "javascript_switch_without_default",
            Self::TypescriptSwitchWithoutDefault => "typescript_switch_without_default",
            Self::GoSwitchWithoutDefault => "go_switch_without_default",
            Self::JavaSqlInjection => "java_sql_injection",
            Self::CSharpSqlInjection => "c_sharp_sql_injection",
            Self::JavaCommandInjection => "java_remote_command_execution",
            Self::CSharpCommandInjection => "c_sharp_remote_command_execution",
            Self::JavaReflectedXss => "java_reflected_xss",
            Self::JavaInsecureRandom => "java_insecure_random",
            Self::JavaInsecureCookie => "java_insecure_cookie",
            Self::JavaPathTraversal => "java_path_traversal",
            Self::CSharpPathTraversal => "c_sharp_path_traversal",
            Self::JavaInsecureCipher => "java_insecure_cipher",
            Self::KotlinInsecureCipher => "kotlin_insecure_cipher",
            Self::CSharpInsecureCipher => "c_sharp_insecure_cipher",
        }
    }

    /// `module.query` identifier carried in report metadata.
    pub fn source_method(&self) -> String {
        let module = match self.language() {
            Language::CSharp => "c_sharp",
            other => other.name(),
        };
        format!("{module}.{}", self.name())
    }

    pub fn technique(&self) -> Technique {
        Technique::Bsast
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        let mut names: Vec<&str> = Method::ALL.iter().map(Method::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Method::ALL.len());
    }

    #[test]
    fn source_method_is_module_qualified() {
        assert_eq!(
            Method::JavaInsecureExceptions.source_method(),
            "java.java_insecure_exceptions"
        );
        assert_eq!(Method::JavaCommandInjection.finding(), Finding::F004);
    }
}
