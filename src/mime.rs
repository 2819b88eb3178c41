//! MIME type lookup for the listing's Type column.

/// Maps a file name to a MIME type.
///
/// Hosts with their own `mimetype.assign` table implement this; everyone
/// else gets [`GuessMime`].
pub trait MimeLookup {
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Extension-based lookup backed by `mime_guess`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuessMime;

impl MimeLookup for GuessMime {
    fn lookup(&self, name: &str) -> Option<String> {
        mime_guess::from_path(name).first_raw().map(str::to_string)
    }
}

impl<F> MimeLookup for F
where
    F: Fn(&str) -> Option<String>,
{
    fn lookup(&self, name: &str) -> Option<String> {
        self(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_by_extension() {
        assert_eq!(GuessMime.lookup("a.txt").as_deref(), Some("text/plain"));
        assert_eq!(GuessMime.lookup("index.html").as_deref(), Some("text/html"));
        assert_eq!(GuessMime.lookup("photo.PNG").as_deref(), Some("image/png"));
    }

    #[test]
    fn unknown_extension_is_none() {
        assert_eq!(GuessMime.lookup("blob.zzzunknown"), None);
        assert_eq!(GuessMime.lookup("Makefile"), None);
    }

    #[test]
    fn closures_are_lookups() {
        let fixed = |_: &str| Some("x/y".to_string());
        assert_eq!(fixed.lookup("anything").as_deref(), Some("x/y"));
    }
}
