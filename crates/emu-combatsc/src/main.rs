//! Combat School board tool.
//!
//! Lists and verifies ROM sets, boots a set to report its board state,
//! writes a power-on save state, or serves the board over MCP.

use std::path::PathBuf;
use std::process;

use emu_combatsc::mcp::McpServer;
use emu_combatsc::{Board, CombatSchoolConfig, DirectorySource, Variant, romset};
use emu_core::Stateful;

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

struct CliArgs {
    set: Option<String>,
    rom_dir: Option<PathBuf>,
    verify: bool,
    list: bool,
    strict: bool,
    dips: Vec<(String, String)>,
    snapshot_path: Option<PathBuf>,
    mcp: bool,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        set: None,
        rom_dir: None,
        verify: false,
        list: false,
        strict: false,
        dips: Vec::new(),
        snapshot_path: None,
        mcp: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--set" => {
                i += 1;
                cli.set = args.get(i).cloned();
            }
            "--rom-dir" => {
                i += 1;
                cli.rom_dir = args.get(i).map(PathBuf::from);
            }
            "--verify" => {
                cli.verify = true;
            }
            "--list" => {
                cli.list = true;
            }
            "--strict" => {
                cli.strict = true;
            }
            "--dip" => {
                i += 1;
                match args.get(i).and_then(|s| s.split_once('=')) {
                    Some((name, setting)) => {
                        cli.dips.push((name.trim().to_string(), setting.trim().to_string()));
                    }
                    None => {
                        eprintln!("--dip expects <name>=<setting>");
                        process::exit(1);
                    }
                }
            }
            "--snapshot" => {
                i += 1;
                cli.snapshot_path = args.get(i).map(PathBuf::from);
            }
            "--mcp" => {
                cli.mcp = true;
            }
            "--help" | "-h" => {
                eprintln!("Usage: emu-combatsc [OPTIONS]");
                eprintln!();
                eprintln!("Options:");
                eprintln!("  --set <name>              ROM set (see --list) [default: combatsc]");
                eprintln!("  --rom-dir <dir>           Directory holding the set's ROM files");
                eprintln!("  --verify                  Check ROM sizes and checksums, then exit");
                eprintln!("  --list                    List supported sets, then exit");
                eprintln!("  --strict                  Refuse to boot with bad or missing ROMs");
                eprintln!("  --dip <name>=<setting>    Override a DIP switch (repeatable)");
                eprintln!("  --snapshot <file>         Write the power-on save state to a file");
                eprintln!("  --mcp                     Run as MCP server (JSON-RPC over stdio)");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn list_sets() {
    for v in Variant::ALL {
        let parent = v.parent().map_or("", Variant::name);
        let status = if v.status().is_good() { "" } else { " (imperfect)" };
        println!(
            "{:<10} {:<10} {} {:<8} {}{status}",
            v.name(),
            parent,
            v.year(),
            v.manufacturer(),
            v.description()
        );
    }
}

fn variant(cli: &CliArgs) -> Variant {
    let name = cli.set.as_deref().unwrap_or("combatsc");
    Variant::from_name(name).unwrap_or_else(|| {
        eprintln!("Unknown set: {name}. Use --list to see supported sets.");
        process::exit(1);
    })
}

fn rom_source(cli: &CliArgs) -> DirectorySource {
    let dir = cli.rom_dir.clone().unwrap_or_else(|| {
        eprintln!("No ROM directory specified. Use --rom-dir <dir>");
        process::exit(1);
    });
    DirectorySource::new(dir).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    })
}

fn verify(cli: &CliArgs) {
    let variant = variant(cli);
    let report = romset::verify(variant, &rom_source(cli));
    for issue in &report.issues {
        eprintln!("  {issue}");
    }
    eprintln!(
        "{}: {} good, {} bad, {} not dumped",
        report.set,
        report.good,
        report.issues.len(),
        report.no_dump
    );
    if report.degraded() {
        process::exit(1);
    }
}

fn make_board(cli: &CliArgs) -> Board {
    let variant = variant(cli);
    let mut config = CombatSchoolConfig::new(variant);
    config.strict_roms = cli.strict;
    config.dips.clone_from(&cli.dips);

    match Board::load(&config, &rom_source(cli)) {
        Ok(board) => {
            eprintln!("Loaded set: {} ({})", variant.name(), variant.description());
            for issue in &board.rom_report().issues {
                eprintln!("  {issue}");
            }
            if board.degraded() {
                eprintln!("Running with missing or bad ROMs");
            }
            board
        }
        Err(e) => {
            eprintln!("Failed to load set: {e}");
            process::exit(1);
        }
    }
}

fn report_board(board: &Board) {
    eprintln!("Board: {:?}, bank {}", board.kind(), board.bank.bank());
    for switch in board.input.dips.switches() {
        eprintln!(
            "  {:<28} {}",
            switch.name,
            board.input.dips.current(switch.name).unwrap_or("?")
        );
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let cli = parse_args();

    if cli.list {
        list_sets();
        return;
    }

    if cli.verify {
        verify(&cli);
        return;
    }

    if cli.mcp {
        let mut server = McpServer::new();
        if let Some(ref dir) = cli.rom_dir {
            server.set_rom_dir(dir.clone());
            if cli.set.is_some() {
                server.set_board(make_board(&cli));
            }
        }
        server.run();
        return;
    }

    let board = make_board(&cli);
    report_board(&board);

    if let Some(ref path) = cli.snapshot_path {
        let bytes = board.snapshot().to_bytes();
        if let Err(e) = std::fs::write(path, bytes) {
            eprintln!("Failed to write {}: {e}", path.display());
            process::exit(1);
        }
        eprintln!("Snapshot saved to {}", path.display());
    }
}
