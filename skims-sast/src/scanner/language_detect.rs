//! Language detection from file extension.

use serde::{Deserialize, Serialize};

/// Languages the engine recognizes.
///
/// `Swift` and `Hcl` are recognized so their files can be reported, but
/// there is no grammar for them and parsing fails with `UnsupportedLanguage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    Java,
    CSharp,
    Go,
    JavaScript,
    TypeScript,
    Kotlin,
    Python,
    /// CloudFormation templates written in YAML.
    Yaml,
    /// CloudFormation templates written in JSON.
    Json,
    Swift,
    Hcl,
}

impl Language {
    /// Every language, in a stable order.
    pub const ALL: [Language; 11] = [
        Language::Java,
        Language::CSharp,
        Language::Go,
        Language::JavaScript,
        Language::TypeScript,
        Language::Kotlin,
        Language::Python,
        Language::Yaml,
        Language::Json,
        Language::Swift,
        Language::Hcl,
    ];

    /// Detect language from a file extension string.
    pub fn from_extension(ext: Option<&str>) -> Option<Language> {
        match ext? {
            "java" => Some(Language::Java),
            "cs" => Some(Language::CSharp),
            "go" => Some(Language::Go),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "ts" | "tsx" | "mts" | "cts" => Some(Language::TypeScript),
            "kt" | "kts" => Some(Language::Kotlin),
            "py" => Some(Language::Python),
            "yaml" | "yml" => Some(Language::Yaml),
            "json" | "template" => Some(Language::Json),
            "swift" => Some(Language::Swift),
            "tf" | "hcl" => Some(Language::Hcl),
            _ => None,
        }
    }

    /// Detect language from a path.
    pub fn from_path(path: &std::path::Path) -> Option<Language> {
        Self::from_extension(path.extension().and_then(|e| e.to_str()))
    }

    /// Returns all file extensions associated with this language.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Java => &["java"],
            Language::CSharp => &["cs"],
            Language::Go => &["go"],
            Language::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Language::TypeScript => &["ts", "tsx", "mts", "cts"],
            Language::Kotlin => &["kt", "kts"],
            Language::Python => &["py"],
            Language::Yaml => &["yaml", "yml"],
            Language::Json => &["json", "template"],
            Language::Swift => &["swift"],
            Language::Hcl => &["tf", "hcl"],
        }
    }

    /// Lowercase name used in config files and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Language::Java => "java",
            Language::CSharp => "csharp",
            Language::Go => "go",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Kotlin => "kotlin",
            Language::Python => "python",
            Language::Yaml => "yaml",
            Language::Json => "json",
            Language::Swift => "swift",
            Language::Hcl => "hcl",
        }
    }

    /// Class-based languages get package/class/method metadata.
    pub fn is_class_based(&self) -> bool {
        matches!(self, Language::Java | Language::CSharp | Language::Kotlin)
    }

    /// Languages whose `switch` cases fall through into the next case.
    pub fn switch_falls_through(&self) -> bool {
        matches!(
            self,
            Language::Java | Language::JavaScript | Language::TypeScript
        )
    }

    /// Get the tree-sitter grammar for this language, when one exists.
    pub fn ts_language(&self) -> Option<tree_sitter::Language> {
        match self {
            Language::Java => Some(tree_sitter_java::LANGUAGE.into()),
            Language::CSharp => Some(tree_sitter_c_sharp::LANGUAGE.into()),
            Language::Go => Some(tree_sitter_go::LANGUAGE.into()),
            Language::JavaScript => Some(tree_sitter_javascript::LANGUAGE.into()),
            Language::TypeScript => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
            Language::Kotlin => Some(tree_sitter_kotlin_sg::LANGUAGE.into()),
            Language::Python => Some(tree_sitter_python::LANGUAGE.into()),
            Language::Yaml | Language::Json | Language::Swift | Language::Hcl => None,
        }
    }

    /// Get the tree-sitter grammar, with TSX handling for .tsx files.
    pub fn ts_language_for_ext(&self, ext: Option<&str>) -> Option<tree_sitter::Language> {
        if matches!(self, Language::TypeScript) && ext == Some("tsx") {
            Some(tree_sitter_typescript::LANGUAGE_TSX.into())
        } else {
            self.ts_language()
        }
    }

    /// Parse a config-file language name.
    pub fn from_name(name: &str) -> Option<Language> {
        Self::ALL
            .into_iter()
            .find(|l| l.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
