use std::path::{Path, PathBuf};

/// Locations Windows only lets administrators write to.
pub fn protected_dirs() -> Vec<PathBuf> {
    protected_dirs_from(|name| std::env::var(name).ok())
}

pub fn protected_dirs_from(lookup: impl Fn(&str) -> Option<String>) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    for name in ["PROGRAMFILES", "PROGRAMFILES(X86)"] {
        if let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) {
            dirs.push(PathBuf::from(value));
        }
    }
    if let Some(windir) = lookup("WINDIR").filter(|v| !v.trim().is_empty()) {
        dirs.push(PathBuf::from(format!("{windir}\\system32")));
    }
    dirs
}

/// Case-insensitive string prefix test of `dir` against each protected location.
pub fn is_protected(dir: &Path, protected: &[PathBuf]) -> bool {
    let dir = dir.to_string_lossy().to_lowercase();
    protected.iter().any(|p| {
        let prefix = p.to_string_lossy().to_lowercase();
        !prefix.is_empty() && dir.starts_with(&prefix)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn protected_dirs_reads_program_files_and_system32() {
        let dirs = protected_dirs_from(env(&[
            ("PROGRAMFILES", r"C:\Program Files"),
            ("PROGRAMFILES(X86)", r"C:\Program Files (x86)"),
            ("WINDIR", r"C:\Windows"),
        ]));
        assert_eq!(
            dirs,
            vec![
                PathBuf::from(r"C:\Program Files"),
                PathBuf::from(r"C:\Program Files (x86)"),
                PathBuf::from(r"C:\Windows\system32"),
            ]
        );
    }

    #[test]
    fn protected_dirs_skips_unset_and_empty() {
        let dirs = protected_dirs_from(env(&[("PROGRAMFILES", ""), ("WINDIR", r"C:\Windows")]));
        assert_eq!(dirs, vec![PathBuf::from(r"C:\Windows\system32")]);
    }

    #[test]
    fn is_protected_ignores_case() {
        let protected = vec![PathBuf::from(r"C:\Program Files")];
        assert!(is_protected(Path::new(r"c:\PROGRAM FILES\Foo"), &protected));
        assert!(!is_protected(Path::new(r"C:\Apps\Foo"), &protected));
    }

    #[test]
    fn is_protected_with_no_locations_is_false() {
        assert!(!is_protected(Path::new(r"C:\Program Files\Foo"), &[]));
        assert!(!is_protected(Path::new(r"C:\Apps"), &[PathBuf::new()]));
    }
}
