//! Players command - who recorded these replays.

use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};

use crate::Settings;
use crate::cli::args::PlayersArgs;
use crate::dataset::{PlayerAlias, local_player_aliases};

use super::{build_scanner, resolve_dirs};

/// Run players command.
pub fn run_players(args: &PlayersArgs, settings: &Settings) -> anyhow::Result<()> {
    let dirs = resolve_dirs(&args.dirs, settings)?;
    let report = build_scanner(settings, args.no_cache).scan(&dirs);
    let records: Vec<_> = report.into_records();
    let aliases = local_player_aliases(&records);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&aliases)?);
    } else if aliases.is_empty() {
        println!("No matches found.");
    } else {
        println!("{}", render_table(&aliases));
    }
    Ok(())
}

fn render_table(aliases: &[PlayerAlias]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(
        ["Player ID", "Names", "Matches"]
            .into_iter()
            .map(|h| Cell::new(h).fg(Color::Cyan)),
    );
    for alias in aliases {
        table.add_row(vec![
            Cell::new(&alias.value),
            Cell::new(&alias.label),
            Cell::new(alias.matches),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table_lists_every_alias() {
        let aliases = vec![
            PlayerAlias {
                label: "Alpha".to_string(),
                value: "10".to_string(),
                matches: 4,
            },
            PlayerAlias {
                label: "Yankee, Zulu".to_string(),
                value: "20".to_string(),
                matches: 1,
            },
        ];

        let rendered = render_table(&aliases).to_string();
        assert!(rendered.contains("Player ID"));
        assert!(rendered.contains("Yankee, Zulu"));
        assert_eq!(render_table(&aliases).row_count(), 2);
    }
}
