//! The language registry
//!
//! A static table mapping language ids to display names, default file
//! extensions, and the ordered blocker list the scanner runs. String
//! blockers come first so comment openers inside string bodies never
//! start a block; within each group, longer openers precede their
//! prefixes.

use crate::blocker::{BlockComment, Blocker, LineComment, PascalString, StringBlock};
use crate::php::PhpDocBlock;

/// A registered source language
pub struct Language {
    /// Stable identifier used in configuration (`lang: go`)
    pub id: &'static str,

    /// Human-readable name for listings
    pub display_name: &'static str,

    /// Default file extensions, leading dot included
    pub exts: &'static [&'static str],

    blockers: fn() -> Vec<Box<dyn Blocker>>,
}

impl Language {
    /// A fresh blocker list for scanning one file
    ///
    /// Blockers may carry per-scan state, so every file gets its own
    /// instances.
    pub fn blockers(&self) -> Vec<Box<dyn Blocker>> {
        (self.blockers)()
    }
}

fn c_style() -> Vec<Box<dyn Blocker>> {
    vec![
        Box::new(StringBlock::new("\"", "\"", Some("\\"))),
        Box::new(StringBlock::new("'", "'", Some("\\"))),
        Box::new(LineComment::new("//")),
        Box::new(BlockComment::new("/*", "*/")),
    ]
}

fn go_style() -> Vec<Box<dyn Blocker>> {
    vec![
        Box::new(StringBlock::new("\"", "\"", Some("\\"))),
        Box::new(StringBlock::new("'", "'", Some("\\"))),
        Box::new(StringBlock::new("`", "`", None)),
        Box::new(LineComment::new("//")),
        Box::new(BlockComment::new("/*", "*/")),
    ]
}

fn script_style() -> Vec<Box<dyn Blocker>> {
    vec![
        Box::new(StringBlock::new("\"", "\"", Some("\\"))),
        Box::new(StringBlock::new("'", "'", Some("\\"))),
        Box::new(StringBlock::new("`", "`", Some("\\"))),
        Box::new(LineComment::new("//")),
        Box::new(BlockComment::new("/*", "*/")),
    ]
}

fn nested_c_style() -> Vec<Box<dyn Blocker>> {
    vec![
        Box::new(StringBlock::new("\"", "\"", Some("\\"))),
        Box::new(LineComment::new("//")),
        Box::new(BlockComment::nested("/*", "*/")),
    ]
}

fn pascal_style() -> Vec<Box<dyn Blocker>> {
    vec![
        Box::new(PascalString::new("'", "''")),
        Box::new(LineComment::new("//")),
        Box::new(BlockComment::new("{", "}")),
        Box::new(BlockComment::new("(*", "*)")),
    ]
}

fn perl_style() -> Vec<Box<dyn Blocker>> {
    vec![
        Box::new(StringBlock::new("\"", "\"", Some("\\"))),
        Box::new(StringBlock::new("'", "'", Some("\\"))),
        Box::new(LineComment::new("#")),
        Box::new(BlockComment::new("=pod", "=cut")),
    ]
}

fn php_style() -> Vec<Box<dyn Blocker>> {
    vec![
        Box::new(PhpDocBlock::new()),
        Box::new(StringBlock::new("\"", "\"", Some("\\"))),
        Box::new(StringBlock::new("'", "'", Some("\\"))),
        Box::new(LineComment::new("//")),
        Box::new(LineComment::new("#")),
        Box::new(BlockComment::new("/*", "*/")),
    ]
}

fn python_style() -> Vec<Box<dyn Blocker>> {
    vec![
        // Triple quotes before plain quotes, or the plain blocker
        // would claim the first quote character.
        Box::new(BlockComment::new("'''", "'''")),
        Box::new(BlockComment::new("\"\"\"", "\"\"\"")),
        Box::new(StringBlock::new("\"", "\"", Some("\\"))),
        Box::new(StringBlock::new("'", "'", Some("\\"))),
        Box::new(LineComment::new("#")),
    ]
}

fn ruby_style() -> Vec<Box<dyn Blocker>> {
    vec![
        Box::new(StringBlock::new("\"", "\"", Some("\\"))),
        Box::new(StringBlock::new("'", "'", Some("\\"))),
        Box::new(LineComment::new("#")),
        Box::new(BlockComment::new("=begin", "=end")),
    ]
}

static LANGUAGES: &[Language] = &[
    Language {
        id: "c",
        display_name: "C",
        exts: &[".c", ".h"],
        blockers: c_style,
    },
    Language {
        id: "cpp",
        display_name: "C++",
        exts: &[".cpp", ".cxx", ".hpp", ".hh"],
        blockers: c_style,
    },
    Language {
        id: "csharp",
        display_name: "C#",
        exts: &[".cs"],
        blockers: c_style,
    },
    Language {
        id: "d",
        display_name: "D",
        exts: &[".d"],
        blockers: c_style,
    },
    Language {
        id: "dart",
        display_name: "Dart",
        exts: &[".dart"],
        blockers: script_style,
    },
    Language {
        id: "go",
        display_name: "Go",
        exts: &[".go"],
        blockers: go_style,
    },
    Language {
        id: "groovy",
        display_name: "Groovy",
        exts: &[".groovy"],
        blockers: c_style,
    },
    Language {
        id: "java",
        display_name: "Java",
        exts: &[".java"],
        blockers: c_style,
    },
    Language {
        id: "javascript",
        display_name: "JavaScript",
        exts: &[".js", ".jsx", ".mjs"],
        blockers: script_style,
    },
    Language {
        id: "kotlin",
        display_name: "Kotlin",
        exts: &[".kt", ".kts"],
        blockers: c_style,
    },
    Language {
        id: "pascal",
        display_name: "Pascal/Delphi",
        exts: &[".pas", ".pp"],
        blockers: pascal_style,
    },
    Language {
        id: "perl",
        display_name: "Perl",
        exts: &[".perl", ".prl", ".pl"],
        blockers: perl_style,
    },
    Language {
        id: "php",
        display_name: "PHP",
        exts: &[".php"],
        blockers: php_style,
    },
    Language {
        id: "python",
        display_name: "Python",
        exts: &[".py"],
        blockers: python_style,
    },
    Language {
        id: "ruby",
        display_name: "Ruby",
        exts: &[".rb"],
        blockers: ruby_style,
    },
    Language {
        id: "rust",
        display_name: "Rust",
        exts: &[".rs"],
        blockers: nested_c_style,
    },
    Language {
        id: "scala",
        display_name: "Scala",
        exts: &[".scala"],
        blockers: c_style,
    },
    Language {
        id: "swift",
        display_name: "Swift",
        exts: &[".swift"],
        blockers: nested_c_style,
    },
    Language {
        id: "typescript",
        display_name: "TypeScript",
        exts: &[".ts", ".tsx"],
        blockers: script_style,
    },
];

/// Look a language up by id
pub fn get(id: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.id == id)
}

/// Look a language up by file extension (leading dot included)
pub fn get_by_ext(ext: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.exts.contains(&ext))
}

/// All registered languages, in listing order
pub fn languages() -> &'static [Language] {
    LANGUAGES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_known_language() {
        let go = get("go").unwrap();
        assert_eq!(go.display_name, "Go");
        assert!(go.exts.contains(&".go"));
        assert!(!go.blockers().is_empty());
    }

    #[test]
    fn test_get_unknown_language() {
        assert!(get("cobol").is_none());
    }

    #[test]
    fn test_get_by_ext() {
        assert_eq!(get_by_ext(".rs").unwrap().id, "rust");
        assert_eq!(get_by_ext(".tsx").unwrap().id, "typescript");
        assert!(get_by_ext(".xyz").is_none());
        assert!(get_by_ext("rs").is_none()); // callers pre-normalize
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<_> = languages().iter().map(|l| l.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), languages().len());
    }

    #[test]
    fn test_exts_carry_leading_dot() {
        for lang in languages() {
            for ext in lang.exts {
                assert!(ext.starts_with('.'), "{} ext {}", lang.id, ext);
            }
        }
    }

    #[test]
    fn test_blockers_are_fresh_instances() {
        let php = get("php").unwrap();
        let a = php.blockers();
        let b = php.blockers();
        assert_eq!(a.len(), b.len());
    }
}
