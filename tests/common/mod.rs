//! Shared fixtures: a scratch operator directory and a stub `cast` script

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub const STUB_KEY: &str = "0xABABABABABABABABABABABABABABABABABABABABABABABABABABABABABABABAB";

/// Temporary operator directory holding `.env`, the keystore directory and the stub CLI
pub struct Workspace {
    pub dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new(env_contents: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".env"), env_contents).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn env_path(&self) -> PathBuf {
        self.root().join(".env")
    }

    pub fn env_contents(&self) -> String {
        fs::read_to_string(self.env_path()).unwrap()
    }

    pub fn keystore_dir(&self) -> PathBuf {
        self.root().join("lagrange-zk")
    }

    /// File the stub appends one line per invocation to
    pub fn invocation_log(&self) -> PathBuf {
        self.root().join("cast.log")
    }

    pub fn invocations(&self) -> Vec<String> {
        fs::read_to_string(self.invocation_log())
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Write an executable stub wallet CLI.
    ///
    /// Every invocation is logged with its arguments. `wallet new` prints
    /// `new_output` and exits with `new_exit`; `wallet import` refuses to run
    /// while the target keystore still exists, then writes a placeholder keystore.
    pub fn stub_cast(&self, new_output: &str, new_exit: i32) -> PathBuf {
        let path = self.root().join("cast");
        let script = format!(
            r#"#!/bin/sh
echo "$*" >> '{log}'
case "$1 $2" in
  "wallet new")
    printf '%s\n' '{output}'
    exit {exit}
    ;;
  "wallet import")
    if [ -e "$4/$6" ]; then
      echo "keystore already exists" >&2
      exit 9
    fi
    mkdir -p "$4"
    echo '{{}}' > "$4/$6"
    echo "keystore saved"
    ;;
  *)
    exit 64
    ;;
esac
"#,
            log = self.invocation_log().display(),
            output = new_output,
            exit = new_exit,
        );
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Stub that prints a well-formed `wallet new` response
    pub fn working_cast(&self) -> PathBuf {
        self.stub_cast(
            &format!(
                "Successfully created new keypair.\nAddress:     0x0000000000000000000000000000000000000000\nPrivate key: {}",
                STUB_KEY
            ),
            0,
        )
    }
}
