#![allow(dead_code)]

use std::path::PathBuf;
use tempfile::TempDir;

pub const CONFIG_ENV: &str = "DUELYARD_CONFIG";
pub const SEED_ENV: &str = "DUELYARD_SEED";
pub const HISTORY_CAPACITY_ENV: &str = "DUELYARD_HISTORY_CAPACITY";

#[derive(Debug)]
pub struct CliResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

pub fn run_cli(args: &[&str]) -> CliResult {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let argv = std::iter::once("duelyard").chain(args.iter().copied());
    let exit_code = duelyard_cli::run(argv, &mut out, &mut err);
    CliResult {
        exit_code,
        stdout: String::from_utf8_lossy(&out).into_owned(),
        stderr: String::from_utf8_lossy(&err).into_owned(),
    }
}

/// Sets or removes environment variables and restores them on drop.
pub struct EnvGuard {
    restores: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    pub fn clean() -> Self {
        let mut guard = Self {
            restores: Vec::new(),
        };
        for key in [CONFIG_ENV, SEED_ENV, HISTORY_CAPACITY_ENV] {
            guard.remove(key);
        }
        guard
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.restores.push((key.to_string(), std::env::var(key).ok()));
        unsafe {
            std::env::set_var(key, value);
        }
    }

    fn remove(&mut self, key: &str) {
        self.restores.push((key.to_string(), std::env::var(key).ok()));
        unsafe {
            std::env::remove_var(key);
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, previous) in self.restores.iter().rev() {
            unsafe {
                match previous {
                    Some(val) => std::env::set_var(key, val),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}

/// Temporary directory holding deck and config files for one test.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    pub fn file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("write file");
        path
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Two players with mixed decks, enough for several rounds.
pub const MIXED_DECKS: &str = r#"
[[players]]
username = "kienboec"

[[players.cards]]
id = "k1"
name = "WaterGoblin"
damage = 10.0

[[players.cards]]
id = "k2"
name = "FireSpell"
damage = 25.0

[[players.cards]]
id = "k3"
name = "Knight"
damage = 40.0

[[players.cards]]
id = "k4"
name = "Dragon"
damage = 50.0

[[players]]
username = "altenhof"

[[players.cards]]
id = "a1"
name = "WaterSpell"
damage = 30.0

[[players.cards]]
id = "a2"
name = "Kraken"
damage = 35.0

[[players.cards]]
id = "a3"
name = "FireElf"
damage = 20.0

[[players.cards]]
id = "a4"
name = "Ork"
damage = 45.0
"#;
