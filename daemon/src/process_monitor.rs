use sysinfo::{Process, ProcessesToUpdate, System};

use crate::config::ConfigTable;

/// Source of the executable identifiers of every running process.
pub trait ProcessLister {
    fn running_executables(&mut self) -> Vec<String>;
}

/// Lists processes through `sysinfo`, refreshing the snapshot on every call.
pub struct SysinfoProcessLister {
    sys: System,
}

impl SysinfoProcessLister {
    pub fn new() -> Self {
        Self { sys: System::new() }
    }
}

impl Default for SysinfoProcessLister {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessLister for SysinfoProcessLister {
    fn running_executables(&mut self) -> Vec<String> {
        self.sys.refresh_processes(ProcessesToUpdate::All, true);
        self.sys.processes().values().map(executable_name).collect()
    }
}

/// File name of the process image (e.g. "game.exe"). Falls back to the kernel's
/// process name, which some platforms truncate, when the image path is hidden.
fn executable_name(p: &Process) -> String {
    p.exe()
        .and_then(|path| path.file_name())
        .unwrap_or_else(|| p.name())
        .to_string_lossy()
        .into_owned()
}

/// Returns the configured target whose executable is currently running.
///
/// Matching is exact and case-sensitive. If several configured targets are
/// running at once, whichever the lister reports first wins. The result is
/// never cached: call this once per tip.
pub fn resolve<P: ProcessLister + ?Sized>(table: &ConfigTable, lister: &mut P) -> Option<String> {
    lister
        .running_executables()
        .into_iter()
        .find(|exe| table.contains(exe))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::load_all;

    /// Fixed process list.
    pub(crate) struct StaticProcesses(pub Vec<String>);

    impl StaticProcesses {
        pub(crate) fn of(names: &[&str]) -> Self {
            Self(names.iter().map(|s| s.to_string()).collect())
        }
    }

    impl ProcessLister for StaticProcesses {
        fn running_executables(&mut self) -> Vec<String> {
            self.0.clone()
        }
    }

    fn table(files: &[(&str, &str)]) -> ConfigTable {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        load_all(dir.path(), ".config").unwrap().table
    }

    #[test]
    fn resolve_finds_running_target() {
        let table = table(&[("g.config", "game.exe\n5:ka")]);
        let mut procs = StaticProcesses::of(&["explorer.exe", "game.exe", "obs64.exe"]);
        assert_eq!(resolve(&table, &mut procs), Some("game.exe".to_string()));
    }

    #[test]
    fn resolve_none_when_nothing_matches() {
        let table = table(&[("g.config", "game.exe\n5:ka")]);
        let mut procs = StaticProcesses::of(&["explorer.exe", "obs64.exe"]);
        assert_eq!(resolve(&table, &mut procs), None);
    }

    #[test]
    fn resolve_is_case_sensitive() {
        let table = table(&[("g.config", "game.exe\n5:ka")]);
        let mut procs = StaticProcesses::of(&["Game.exe", "GAME.EXE"]);
        assert_eq!(resolve(&table, &mut procs), None);
    }

    #[test]
    fn resolve_first_listed_target_wins() {
        let table = table(&[
            ("a.config", "alpha.exe\n1:ka"),
            ("b.config", "beta.exe\n1:kb"),
        ]);
        let mut procs = StaticProcesses::of(&["beta.exe", "alpha.exe"]);
        assert_eq!(resolve(&table, &mut procs), Some("beta.exe".to_string()));
    }

    #[test]
    fn resolve_twice_is_stable() {
        let table = table(&[("g.config", "game.exe\n5:ka")]);
        let mut procs = StaticProcesses::of(&["game.exe"]);
        let first = resolve(&table, &mut procs);
        let second = resolve(&table, &mut procs);
        assert_eq!(first, second);
    }

    #[test]
    fn resolve_empty_table() {
        let mut procs = StaticProcesses::of(&["game.exe"]);
        assert_eq!(resolve(&ConfigTable::default(), &mut procs), None);
    }

    #[test]
    fn sysinfo_lister_sees_this_process() {
        let mut lister = SysinfoProcessLister::new();
        assert!(!lister.running_executables().is_empty());
    }
}
