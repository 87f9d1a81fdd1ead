//! `xsurvey` - CLI for xiaoxian-survey
//!
//! Fills in questionnaires, stores them locally and prints the dashboard.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

use xiaoxian_survey::cli::{
    AverageCommand, Cli, Command, ConfigCommand, DashboardCommand, ListCommand, OutputFormat,
    SeedCommand, ShareCommand, SubmitCommand,
};
use xiaoxian_survey::{
    init_logging, mock, report, stats, Config, Dashboard, FormSession, ResponseStore, ShareLink,
    Storage,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // These must work even when the active configuration is broken
    if let Command::Config(ConfigCommand::Path | ConfigCommand::Validate { .. }) = &cli.command {
        return handle_config_file(cli.command, cli.config);
    }

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Fill => handle_fill(&config),
        Command::Submit(cmd) => handle_submit(&config, &cmd),
        Command::Dashboard(cmd) => handle_dashboard(&config, &cmd),
        Command::Average(cmd) => handle_average(&config, &cmd),
        Command::List(cmd) => handle_list(&config, &cmd),
        Command::Seed(cmd) => handle_seed(&config, &cmd),
        Command::Share(cmd) => handle_share(&config, &cmd),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Config(cmd) => handle_config_show(&config, &cmd),
    }
}

fn open_store(config: &Config) -> anyhow::Result<ResponseStore> {
    let path = config.database_path();
    let storage = Storage::open(&path)
        .with_context(|| format!("opening database {}", path.display()))?;
    Ok(ResponseStore::open(storage, config.storage.slot_key.as_str())?)
}

fn handle_fill(config: &Config) -> anyhow::Result<()> {
    let mut store = open_store(config)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    let response = FormSession::new(stdin.lock(), stdout.lock()).run()?;
    store.submit(response).context("saving response")?;
    println!("已保存，共 {} 份问卷。", store.len());
    Ok(())
}

fn handle_submit(config: &Config, cmd: &SubmitCommand) -> anyhow::Result<()> {
    let json = if cmd.file.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(&cmd.file)
            .with_context(|| format!("reading {}", cmd.file.display()))?
    };

    let response = xiaoxian_survey::form::response_from_json(&json)
        .with_context(|| format!("invalid answers in {}", cmd.file.display()))?;
    let id = response.id();

    let mut store = open_store(config)?;
    store.submit(response).context("saving response")?;
    println!("Submitted {id} ({} responses total)", store.len());
    Ok(())
}

fn handle_dashboard(config: &Config, cmd: &DashboardCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let dashboard = Dashboard::from_responses(store.responses(), config.dashboard.latest_comments);
    match cmd.format {
        OutputFormat::Plain => print!("{}", report::render_plain(&dashboard)),
        OutputFormat::Json => println!("{}", report::render_json(&dashboard)?),
    }
    Ok(())
}

fn handle_average(config: &Config, cmd: &AverageCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let value = stats::average(store.responses(), &cmd.fields);
    println!("{value:.1}");
    Ok(())
}

fn handle_list(config: &Config, cmd: &ListCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let responses = store.responses();
    let shown = match cmd.last {
        Some(n) => &responses[responses.len().saturating_sub(n)..],
        None => responses,
    };
    match cmd.format {
        OutputFormat::Plain => print!("{}", report::render_list_plain(shown)),
        OutputFormat::Json => println!("{}", report::render_list_json(shown)?),
    }
    Ok(())
}

fn handle_seed(config: &Config, cmd: &SeedCommand) -> anyhow::Result<()> {
    let count = cmd.count.unwrap_or(config.mock.count);
    if count == 0 {
        bail!("count must be greater than 0");
    }

    let mut store = open_store(config)?;
    let added = store
        .extend(mock::generate(count, &mut rand::thread_rng()))
        .context("saving demonstration data")?;
    println!("已生成 {added} 条模拟数据，共 {} 份问卷。", store.len());
    Ok(())
}

fn handle_share(config: &Config, cmd: &ShareCommand) -> anyhow::Result<()> {
    let mut link = ShareLink::new(config.share.url.as_deref());
    if let Some(url) = &cmd.url {
        link.set_url(url);
    }

    println!("扫码参与调研：{}", link.url());
    if !cmd.no_qr {
        println!("{}", link.render_terminal()?);
    }

    if let Some(path) = &cmd.svg {
        link.save_svg(
            path,
            &config.share.qr_dark_color,
            &config.share.qr_light_color,
            config.share.qr_size,
        )
        .with_context(|| format!("saving QR code to {}", path.display()))?;
        println!("Saved QR code to {}", path.display());
    }

    if cmd.copy {
        link.copy_to_clipboard()?;
        println!("链接已复制");
    }
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let status = store.status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("xsurvey status");
        println!("--------------");
        println!("Database:      {}", status.database_path.display());
        println!("Slot:          {}", status.slot_key);
        println!("Responses:     {}", status.responses);
        println!("Slots:         {}", status.slot_keys.join(", "));
        println!("Stored data:   {} bytes", status.value_bytes);
        println!(
            "Last write:    {}",
            status
                .last_write
                .map_or_else(|| "never".to_string(), |t| t.to_rfc3339())
        );
        println!("Database size: {} bytes", status.db_size_bytes);
    }
    Ok(())
}

fn handle_config_show(config: &Config, cmd: &ConfigCommand) -> anyhow::Result<()> {
    let ConfigCommand::Show { json } = cmd else {
        return Ok(());
    };

    if *json {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        println!("Current Configuration");
        println!("=====================");
        println!();
        println!("[Storage]");
        println!("  Database path:      {}", config.database_path().display());
        println!("  Slot key:           {}", config.storage.slot_key);
        println!();
        println!("[Share]");
        println!(
            "  URL:                {}",
            config.share.url.as_deref().unwrap_or("(not set)")
        );
        println!("  QR dark colour:     {}", config.share.qr_dark_color);
        println!("  QR light colour:    {}", config.share.qr_light_color);
        println!("  QR size:            {}", config.share.qr_size);
        println!();
        println!("[Dashboard]");
        println!("  Latest comments:    {}", config.dashboard.latest_comments);
        println!();
        println!("[Mock]");
        println!("  Count:              {}", config.mock.count);
    }
    Ok(())
}

fn handle_config_file(cmd: Command, cli_config: Option<PathBuf>) -> anyhow::Result<()> {
    match cmd {
        Command::Config(ConfigCommand::Path) => {
            println!("{}", Config::default_config_path().display());
        }
        Command::Config(ConfigCommand::Validate { file }) => {
            let path = file
                .or(cli_config)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("Configuration error: {e}"),
            }
        }
        _ => {}
    }
    Ok(())
}
