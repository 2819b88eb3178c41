//! Entry filtering and classification.
//!
//! Decides, per cached directory entry, whether it shows up in the listing
//! and in which section. Rules apply to the file name only and the first one
//! that matches hides the entry:
//!
//! 1. the entry's stat failed
//! 2. `hide-dotfiles` and the name starts with `.`
//! 3. `hide-tildefiles` and the name ends with `~`
//! 4. the name ends with one of `exclude-suffix`
//! 5. the name starts with one of `exclude-prefix`
//! 6. it is a directory and `hide-directories` is set
//!
//! Surviving directories and files keep the order the stat cache gave them.
//!
//! `HEADER.txt` and `README.txt` are special only as files: a directory with
//! one of those names is listed like any other directory. For the files, the
//! `include-*` option decides whether their content is spliced into the page
//! (only if the cached size is non-zero and below [`MAX_INCLUDE_FILE_SIZE`]),
//! and the `hide-*` option independently drops their row from the table.

use crate::config::ListingConfig;
use crate::include::MAX_INCLUDE_FILE_SIZE;
use crate::types::DirEntrySnapshot;

pub const HEADER_FILE: &str = "HEADER.txt";
pub const README_FILE: &str = "README.txt";

/// Visible entries, as indices into the snapshot slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    pub directories: Vec<usize>,
    pub files: Vec<usize>,
    pub has_header: bool,
    pub has_readme: bool,
}

pub fn classify(entries: &[DirEntrySnapshot], config: &ListingConfig) -> Classified {
    let mut out = Classified {
        directories: Vec::with_capacity(16),
        files: Vec::with_capacity(entries.len()),
        ..Classified::default()
    };

    for (i, entry) in entries.iter().enumerate() {
        if is_hidden(entry, config) {
            continue;
        }

        if entry.kind.is_dir() {
            if !config.hide_directories {
                out.directories.push(i);
            }
            continue;
        }

        let name = entry.name.as_str();
        if (config.include_header || config.hide_header) && name == HEADER_FILE {
            if config.include_header && includable(entry.size) {
                out.has_header = true;
            }
            if config.hide_header {
                continue;
            }
        } else if (config.include_readme || config.hide_readme) && name == README_FILE {
            if config.include_readme && includable(entry.size) {
                out.has_readme = true;
            }
            if config.hide_readme {
                continue;
            }
        }
        out.files.push(i);
    }

    out
}

/// Rules 1–5; they apply to directories and files alike.
fn is_hidden(entry: &DirEntrySnapshot, config: &ListingConfig) -> bool {
    let name = entry.name.as_str();
    entry.failed
        || (config.hide_dotfiles && name.starts_with('.'))
        || (config.hide_tildefiles && name.ends_with('~'))
        || config.exclude_suffix.iter().any(|s| name.ends_with(s.as_str()))
        || config.exclude_prefix.iter().any(|p| name.starts_with(p.as_str()))
}

fn includable(size: u64) -> bool {
    size > 0 && size < MAX_INCLUDE_FILE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{dir, failed, file, names};

    fn run(entries: &[DirEntrySnapshot], config: &ListingConfig) -> (Vec<String>, Vec<String>) {
        let c = classify(entries, config);
        (names(entries, &c.directories), names(entries, &c.files))
    }

    #[test]
    fn separates_directories_from_files_in_order() {
        let entries = vec![file("b", 1), dir("z"), file("a", 1), dir("m")];
        let (dirs, files) = run(&entries, &ListingConfig::default());
        assert_eq!(dirs, vec!["z", "m"]);
        assert_eq!(files, vec!["b", "a"]);
    }

    #[test]
    fn failed_entries_are_always_hidden() {
        let config = ListingConfig {
            hide_dotfiles: false,
            hide_tildefiles: false,
            ..ListingConfig::default()
        };
        let entries = vec![failed("gone"), file("kept", 1), failed(".x")];
        let (dirs, files) = run(&entries, &config);
        assert!(dirs.is_empty());
        assert_eq!(files, vec!["kept"]);
    }

    #[test]
    fn dotfiles_and_tildefiles_hidden_by_default() {
        let entries = vec![
            file(".hidden", 1),
            dir(".git"),
            file("z~", 1),
            file("a~b", 1),
            file("shown", 1),
        ];
        let (dirs, files) = run(&entries, &ListingConfig::default());
        assert!(dirs.is_empty());
        assert_eq!(files, vec!["a~b", "shown"]);
    }

    #[test]
    fn dotfiles_and_tildefiles_shown_when_disabled() {
        let config = ListingConfig {
            hide_dotfiles: false,
            hide_tildefiles: false,
            ..ListingConfig::default()
        };
        let entries = vec![file(".hidden", 1), file("z~", 1)];
        let (_, files) = run(&entries, &config);
        assert_eq!(files, vec![".hidden", "z~"]);
    }

    #[test]
    fn exclude_suffix_matches_at_the_end_only() {
        let config = ListingConfig {
            exclude_suffix: vec![".bak".into()],
            ..ListingConfig::default()
        };
        let entries = vec![
            file("a.bak", 1),
            file("a.bakX", 1),
            file("a.BAK", 1),
            dir("old.bak"),
        ];
        let (dirs, files) = run(&entries, &config);
        assert!(dirs.is_empty());
        assert_eq!(files, vec!["a.bakX", "a.BAK"]);
    }

    #[test]
    fn exclude_prefix_matches_at_the_start_only() {
        let config = ListingConfig {
            exclude_prefix: vec!["tmp".into(), "_".into()],
            ..ListingConfig::default()
        };
        let entries = vec![
            file("tmpfile", 1),
            file("my-tmp", 1),
            file("_draft", 1),
            file("Tmp", 1),
        ];
        let (_, files) = run(&entries, &config);
        assert_eq!(files, vec!["my-tmp", "Tmp"]);
    }

    #[test]
    fn hide_directories() {
        let config = ListingConfig {
            hide_directories: true,
            ..ListingConfig::default()
        };
        let entries = vec![dir("sub"), file("f", 1)];
        let (dirs, files) = run(&entries, &config);
        assert!(dirs.is_empty());
        assert_eq!(files, vec!["f"]);
    }

    #[test]
    fn header_directory_is_a_plain_directory() {
        let config = ListingConfig {
            include_header: true,
            hide_header: true,
            ..ListingConfig::default()
        };
        let entries = vec![dir("HEADER.txt")];
        let c = classify(&entries, &config);
        assert_eq!(c.directories, vec![0]);
        assert!(c.files.is_empty());
        assert!(!c.has_header);
    }

    #[test]
    fn header_included_and_hidden() {
        let config = ListingConfig {
            include_header: true,
            hide_header: true,
            ..ListingConfig::default()
        };
        let entries = vec![file("HEADER.txt", 10), file("a", 1)];
        let c = classify(&entries, &config);
        assert!(c.has_header);
        assert_eq!(names(&entries, &c.files), vec!["a"]);
    }

    #[test]
    fn header_included_but_listed() {
        let config = ListingConfig {
            include_header: true,
            ..ListingConfig::default()
        };
        let entries = vec![file("HEADER.txt", 10)];
        let c = classify(&entries, &config);
        assert!(c.has_header);
        assert_eq!(c.files, vec![0]);
    }

    #[test]
    fn header_hidden_without_include() {
        let config = ListingConfig {
            hide_header: true,
            ..ListingConfig::default()
        };
        let entries = vec![file("HEADER.txt", 10)];
        let c = classify(&entries, &config);
        assert!(!c.has_header);
        assert!(c.files.is_empty());
    }

    #[test]
    fn header_size_limits() {
        let config = ListingConfig {
            include_header: true,
            ..ListingConfig::default()
        };
        for size in [0, MAX_INCLUDE_FILE_SIZE, MAX_INCLUDE_FILE_SIZE + 1] {
            let entries = vec![file("HEADER.txt", size)];
            let c = classify(&entries, &config);
            assert!(!c.has_header, "size {size}");
            assert_eq!(c.files, vec![0], "size {size}");
        }
        let entries = vec![file("HEADER.txt", MAX_INCLUDE_FILE_SIZE - 1)];
        assert!(classify(&entries, &config).has_header);
    }

    #[test]
    fn header_name_is_case_sensitive() {
        let config = ListingConfig {
            include_header: true,
            hide_header: true,
            ..ListingConfig::default()
        };
        let entries = vec![file("header.txt", 10)];
        let c = classify(&entries, &config);
        assert!(!c.has_header);
        assert_eq!(c.files, vec![0]);
    }

    #[test]
    fn readme_included_by_default() {
        let entries = vec![file("README.txt", 100)];
        let c = classify(&entries, &ListingConfig::default());
        assert!(c.has_readme);
        assert_eq!(c.files, vec![0]);
    }

    #[test]
    fn readme_hidden_and_not_included() {
        let config = ListingConfig {
            include_readme: false,
            hide_readme: true,
            ..ListingConfig::default()
        };
        let entries = vec![file("README.txt", 100)];
        let c = classify(&entries, &config);
        assert!(!c.has_readme);
        assert!(c.files.is_empty());
    }

    #[test]
    fn exclusion_rules_win_over_special_files() {
        let config = ListingConfig {
            include_header: true,
            exclude_suffix: vec![".txt".into()],
            ..ListingConfig::default()
        };
        let entries = vec![file("HEADER.txt", 10), file("README.txt", 10)];
        let c = classify(&entries, &config);
        assert!(!c.has_header);
        assert!(!c.has_readme);
        assert!(c.files.is_empty());
    }

    #[test]
    fn no_entry_in_both_sections() {
        let entries = vec![dir("a"), file("a", 1), dir("b"), file("c", 3)];
        let c = classify(&entries, &ListingConfig::default());
        for d in &c.directories {
            assert!(!c.files.contains(d));
        }
        assert_eq!(c.directories.len() + c.files.len(), 4);
    }
}
