//! Binary entry point: load the config, open the library database, attach the
//! projector terminal and drive the Ratatui event loop until the operator
//! quits.
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use worship_projector::{
    ensure_schema, logging, open_in_memory, run_app, seed_if_empty, App, AppConfig,
    ProjectorSetup,
};

#[derive(Parser, Debug)]
#[command(name = "worship-projector")]
#[command(about = "Project hymns, praises and Bible verses onto a second terminal")]
#[command(version)]
struct Cli {
    /// Config file. Defaults to $WORSHIP_PROJECTOR_CONFIG, then the platform
    /// config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// SQLite library file, or `:memory:` for a throwaway session.
    #[arg(long)]
    database: Option<PathBuf>,

    /// Terminal device for the projection, e.g. /dev/pts/3 (run `tty` there).
    #[arg(long)]
    projector: Option<PathBuf>,

    /// Projector size as COLSxROWS.
    #[arg(long, value_parser = parse_size)]
    projector_size: Option<(u16, u16)>,

    /// Do not fill empty tables with the sample library.
    #[arg(long)]
    no_seed: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

fn parse_size(raw: &str) -> Result<(u16, u16), String> {
    let (cols, rows) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected COLSxROWS, got '{raw}'"))?;
    let cols = cols
        .trim()
        .parse::<u16>()
        .map_err(|_| format!("invalid column count '{cols}'"))?;
    let rows = rows
        .trim()
        .parse::<u16>()
        .map_err(|_| format!("invalid row count '{rows}'"))?;
    if cols == 0 || rows == 0 {
        return Err("projector size must be at least 1x1".to_string());
    }
    Ok((cols, rows))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.database_path = Some(database);
    }
    if let Some(output) = cli.projector {
        config.projector.output = Some(output);
    }
    if let Some((columns, rows)) = cli.projector_size {
        config.projector.columns = columns;
        config.projector.rows = rows;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    logging::init(&config.log_path()?, &config.log_level)?;
    log::info!("starting worship-projector {}", env!("CARGO_PKG_VERSION"));

    let db_path = config.database_path()?;
    let mut conn = if db_path == Path::new(":memory:") {
        open_in_memory()?
    } else {
        ensure_schema(&db_path)?
    };

    if !cli.no_seed {
        let report = seed_if_empty(&mut conn).context("failed to seed the library")?;
        if report.hymns + report.praises + report.verses > 0 {
            log::info!(
                "seeded {} hymns, {} praises, {} verses",
                report.hymns,
                report.praises,
                report.verses
            );
        }
    }

    let setup = ProjectorSetup::open(
        config.projector.output.as_deref(),
        config.projector.columns,
        config.projector.rows,
    );
    if let ProjectorSetup::Ready(projector) = &setup {
        log::info!("projecting into {}", projector.output().display());
    }

    let mut app = App::new(conn, config, setup)?;
    let result = run_app(&mut app);
    if let Err(err) = &result {
        log::error!("terminal session failed: {err:#}");
    }
    log::info!("shutting down");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projector_size_parses_cols_by_rows() {
        assert_eq!(parse_size("120x40"), Ok((120, 40)));
        assert_eq!(parse_size("80X24"), Ok((80, 24)));
        assert!(parse_size("80").is_err());
        assert!(parse_size("0x24").is_err());
        assert!(parse_size("wide x tall").is_err());
    }
}
