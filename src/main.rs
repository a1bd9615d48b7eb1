use clap::Parser;
use notewall::cli::{
    handle_add, handle_browse, handle_delete, handle_edit, handle_export, handle_init,
    handle_list, handle_palette, handle_select, handle_show, Cli, Commands,
};
use notewall::config::{defaults, env_vars};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_env(env_vars::LOG)
        .unwrap_or_else(|_| EnvFilter::new(defaults::LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => handle_init(),
        Commands::Add {
            title,
            tasks,
            background,
            text,
            background_type,
            json,
        } => handle_add(title, tasks, background, text, background_type, json),
        Commands::List { json } => handle_list(json),
        Commands::Show { id, json } => handle_show(id, json),
        Commands::Edit {
            id,
            title,
            tasks,
            set_tasks,
            add_tasks,
            remove_tasks,
            background,
            text,
            background_type,
            json,
        } => handle_edit(
            id,
            title,
            tasks,
            set_tasks,
            add_tasks,
            remove_tasks,
            background,
            text,
            background_type,
            json,
        ),
        Commands::Delete { id, force } => handle_delete(id, force),
        Commands::Select { id, clear } => handle_select(id, clear),
        Commands::Export {
            id,
            download,
            open,
            output,
            scale,
            json,
        } => handle_export(id, download, open, output, scale, json, cli.quiet),
        Commands::Browse {
            id,
            next,
            prev,
            json,
        } => handle_browse(id, next, prev, json),
        Commands::Palette { json } => handle_palette(json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
