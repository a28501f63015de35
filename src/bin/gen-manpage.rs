//! Writes bs81x man pages
//!
//! One page for the tool and one per subcommand (`bs81x-watch.1`, ...).
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use clap::{Command, CommandFactory};
use clap_mangen::Man;

#[path = "../cli.rs"]
mod cli;

/// File name and command of every page to write
fn pages(root: Command) -> Vec<(String, Command)> {
    let name = root.get_name().to_string();
    let mut pages: Vec<(String, Command)> = root
        .get_subcommands()
        .filter(|sub| sub.get_name() != "help")
        .map(|sub| (format!("{}-{}", name, sub.get_name()), sub.clone()))
        .collect();
    pages.insert(0, (name, root));
    pages
}

fn main() -> std::io::Result<()> {
    let dir = std::env::args().nth(1).unwrap_or_else(|| "man".to_string());
    let dir = Path::new(&dir);
    fs::create_dir_all(dir)?;

    for (title, cmd) in pages(cli::Cli::command()) {
        let path = dir.join(format!("{}.1", title));
        let mut out = BufWriter::new(File::create(&path)?);
        Man::new(cmd).title(title.to_uppercase()).render(&mut out)?;
        println!("wrote {}", path.display());
    }

    println!("view with: man -l {}", dir.join("bs81x.1").display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_page_per_subcommand() {
        let names: Vec<String> = pages(cli::Cli::command())
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names[0], "bs81x");
        assert!(names.contains(&"bs81x-watch".to_string()));
        assert!(names.contains(&"bs81x-list-transports".to_string()));
        assert!(!names.iter().any(|n| n.ends_with("-help")));
    }

    #[test]
    fn test_page_renders_options() {
        let (_, watch) = pages(cli::Cli::command())
            .into_iter()
            .find(|(name, _)| name == "bs81x-watch")
            .unwrap();
        let mut buf = Vec::new();
        Man::new(watch).render(&mut buf).unwrap();
        let page = String::from_utf8(buf).unwrap();
        assert!(page.contains("interval"));
    }
}
