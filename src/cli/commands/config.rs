use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::sync::SourceKind;
use crate::errors::AppResult;
use crate::ui::messages::{error, success, warning};
use crate::utils::table::Table;
use std::process::Command;

fn default_editor() -> String {
    std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(target_os = "windows") {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        })
}

fn edit_with(editor: &str, path: &std::path::Path) -> bool {
    Command::new(editor)
        .arg(path)
        .status()
        .is_ok_and(|s| s.success())
}

/// Effective feed, interval and epoch of every source.
fn source_table(cfg: &Config) -> Table {
    let mut table = Table::new(&["Source", "Feed", "Every", "Epoch"]);
    for kind in SourceKind::ALL {
        let src = cfg.source(kind);
        let feed = src
            .feed_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "--".to_string());
        table.add_row(vec![
            kind.to_string(),
            feed,
            format!("{}s", src.interval_secs),
            src.epoch.clone().unwrap_or_else(|| "--".to_string()),
        ]);
    }
    table
}

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        edit_config,
        editor,
    } = cmd
    {
        let path = Config::config_file();

        if *print_config {
            println!("📄 Current configuration:\n");
            println!("{}", serde_yaml::to_string(cfg)?);
            println!("{}", source_table(cfg).render());
        }

        if *edit_config {
            let fallback = default_editor();
            let editor_to_use = editor.clone().unwrap_or_else(|| fallback.clone());

            if edit_with(&editor_to_use, &path) {
                success(format!(
                    "Configuration file edited successfully using '{editor_to_use}'"
                ));
            } else {
                warning(format!(
                    "Editor '{editor_to_use}' not available, falling back to '{fallback}'"
                ));
                if edit_with(&fallback, &path) {
                    success(format!(
                        "Configuration file edited successfully using fallback '{fallback}'"
                    ));
                } else {
                    error(format!(
                        "Failed to edit configuration file using fallback '{fallback}'"
                    ));
                }
            }
        }
    }

    Ok(())
}
