// heaptty: watch a boundary-tag heap allocator work, step by step

use std::fs;
use std::io;
use std::path::Path;

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use heaptty::script::{self, Session};
use heaptty::ui::App;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("heaptty");

    let mut batch = false;
    let mut file_arg = None;
    for arg in &args[1..] {
        if arg == "--batch" {
            batch = true;
        } else {
            file_arg = Some(arg.clone());
        }
    }

    let Some(trace_file) = file_arg else {
        eprintln!("Error: No trace script provided");
        eprintln!();
        eprintln!("Usage: {} [--batch] <file.trace>", program_name);
        eprintln!();
        eprintln!("Examples:");
        eprintln!(
            "  {} demos/tour.trace          # Step through the full tour",
            program_name
        );
        eprintln!(
            "  {} demos/double_free.trace   # Watch a double free get rejected",
            program_name
        );
        eprintln!(
            "  {} --batch demos/tour.trace  # Print the session log and exit",
            program_name
        );
        std::process::exit(1);
    };

    if !Path::new(&trace_file).exists() {
        eprintln!("Error: File '{}' not found", trace_file);
        eprintln!("Usage: {} [--batch] <file.trace>", program_name);
        std::process::exit(1);
    }

    // Read and parse the trace script
    let source = fs::read_to_string(&trace_file)?;

    let steps = match script::parse_script(&source) {
        Ok(steps) => steps,
        Err(e) => {
            eprintln!("Parse error in {}: {}", trace_file, e);
            std::process::exit(1);
        }
    };

    if steps.is_empty() {
        eprintln!("Error: '{}' contains no commands", trace_file);
        std::process::exit(1);
    }

    // Execute the whole script up front, building the snapshot history
    let session = Session::run(steps);

    if batch {
        for entry in &session.last().log {
            println!("{}", entry.text);
        }
        return Ok(());
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create and run app
    let mut app = App::new(session, source);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
