//! `grammar_adapter!`: unit-struct adapters for languages whose grammar
//! comes from [`Language::ts_language_for_ext`].
//!
//! [`Language::ts_language_for_ext`]: crate::scanner::language_detect::Language::ts_language_for_ext

/// Declare a grammar-backed adapter for one [`Language`] variant.
///
/// The grammar is chosen per file extension, so one adapter covers dialects
/// such as `.ts` and `.tsx`.
///
/// ```ignore
/// grammar_adapter!(JavaParser => Java);
/// ```
///
/// [`Language`]: crate::scanner::language_detect::Language
#[macro_export]
macro_rules! grammar_adapter {
    ($(#[$meta:meta])* $adapter:ident => $variant:ident) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $adapter;

        impl $adapter {
            pub fn new() -> Self {
                Self
            }
        }

        impl $crate::parsers::traits::LanguageParser for $adapter {
            fn language(&self) -> $crate::scanner::language_detect::Language {
                $crate::scanner::language_detect::Language::$variant
            }

            fn parse(
                &self,
                source: &[u8],
                path: &std::path::Path,
            ) -> Result<$crate::parsers::types::ParseResult, skims_core::errors::ParseError> {
                let language = self.language();
                let ext = path.extension().and_then(|e| e.to_str());
                let grammar = language.ts_language_for_ext(ext).ok_or_else(|| {
                    skims_core::errors::ParseError::UnsupportedLanguage {
                        path: path.to_path_buf(),
                    }
                })?;
                $crate::parsers::languages::parse_with_language(source, path, language, grammar)
            }
        }
    };
}
