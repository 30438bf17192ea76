use std::fs;
use std::path::{Path, PathBuf};

use clap::CommandFactory;

// cli.rs only depends on clap + clap_complete, both build-dependencies.
#[path = "src/cli.rs"]
mod cli;

fn main() {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let out_dir: PathBuf =
        std::env::var_os("OUT_DIR").expect("OUT_DIR not set by Cargo").into();
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("failed to create man output directory");

    generate_manpages(cli::Cli::command(), &man_dir);
}

/// Write `OUT_DIR/man/*.1`: `pairwire.1` with the global inventory flags,
/// `pairwire-provision.1` with the location/device-type/role inputs, and
/// one page per `config` action (`pairwire-config-show.1`, ...).
fn generate_manpages(root: clap::Command, dir: &Path) {
    let mut pending = vec![root];
    while let Some(cmd) = pending.pop() {
        let name = cmd.get_name().to_owned();
        let path = dir.join(format!("{name}.1"));

        let mut page = Vec::new();
        clap_mangen::Man::new(cmd.clone())
            .render(&mut page)
            .unwrap_or_else(|e| panic!("rendering man page `{name}`: {e}"));
        fs::write(&path, page).unwrap_or_else(|e| panic!("writing {}: {e}", path.display()));

        pending.extend(
            cmd.get_subcommands()
                .filter(|sub| !sub.is_hide_set() && sub.get_name() != "help")
                .map(|sub| sub.clone().name(format!("{name}-{}", sub.get_name()))),
        );
    }
}
